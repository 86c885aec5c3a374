//! Bulk volume, mute and visibility changes.

use crate::audio::{DeviceRole, DeviceSource, DeviceState};
use crate::defaults;
use crate::pattern;
use crate::registry::DeviceRegistry;
use rand::Rng;
use tracing::{debug, info, warn};

/// Outcome counts for a batch operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationSummary {
    /// Devices selected by the pattern
    pub matched: usize,

    /// Devices whose volume and mute were written
    pub written: usize,

    /// Selected devices left alone because they were not active
    pub skipped_inactive: usize,

    /// Individual platform calls that failed
    pub failures: usize,
}

/// Set volume and mute on every device whose name matches `pattern`
/// (or does not match, with `invert`).
///
/// Every device scanned is made visible first, selected or not and whatever
/// its state. Volume and mute are only written to selected devices that are
/// active afterwards.
pub fn apply(
    registry: &mut DeviceRegistry,
    source: &dyn DeviceSource,
    volume_scalar: f32,
    mute: bool,
    pattern: &str,
    invert: bool,
) -> MutationSummary {
    let mut summary = MutationSummary::default();

    for index in 0..registry.len() {
        let name = registry.devices()[index].name.clone();

        if let Err(e) = registry.write_visible(index, source, true) {
            warn!("Could not enable {}: {}", name, e);
            summary.failures += 1;
        }

        let is_match = pattern::matches(pattern, &name) != invert;
        if !is_match {
            continue;
        }
        summary.matched += 1;

        if registry.refresh_state(index, source) != DeviceState::Active {
            debug!("{} is not active, leaving volume alone", name);
            summary.skipped_inactive += 1;
            continue;
        }

        let mut ok = true;
        if let Err(e) = registry.write_volume_scalar(index, source, volume_scalar) {
            warn!("{}", e);
            summary.failures += 1;
            ok = false;
        }
        if let Err(e) = registry.write_mute(index, source, mute) {
            warn!("{}", e);
            summary.failures += 1;
            ok = false;
        }
        if ok {
            debug!("Set {} to volume {} mute {}", name, volume_scalar, mute);
            summary.written += 1;
        }
    }

    info!(
        "Pattern {:?}{}: {} matched, {} written, {} inactive",
        pattern,
        if invert { " (inverted)" } else { "" },
        summary.matched,
        summary.written,
        summary.skipped_inactive
    );
    summary
}

/// Enable or disable every device.
pub fn set_all_visible(
    registry: &mut DeviceRegistry,
    source: &dyn DeviceSource,
    visible: bool,
) -> MutationSummary {
    let mut summary = MutationSummary::default();

    for index in 0..registry.len() {
        summary.matched += 1;
        match registry.write_visible(index, source, visible) {
            Ok(()) => summary.written += 1,
            Err(e) => {
                warn!("{}", e);
                summary.failures += 1;
            }
        }
        registry.refresh_state(index, source);
    }

    info!(
        "{} {} of {} devices",
        if visible { "Enabled" } else { "Disabled" },
        summary.written,
        summary.matched
    );
    summary
}

/// Scramble volume, mute, defaults and visibility of every device.
///
/// Each device gets a uniform volume and a coin-flip mute. It becomes the
/// default for each role with probability 1/4, and ends up visible only if
/// it was muted.
pub fn randomize<R: Rng>(
    registry: &mut DeviceRegistry,
    source: &dyn DeviceSource,
    rng: &mut R,
) -> MutationSummary {
    let mut summary = MutationSummary::default();

    for index in 0..registry.len() {
        summary.matched += 1;

        let scalar: f32 = rng.gen();
        let mute = rng.gen::<f32>() >= 0.5;
        let make_default = rng.gen::<f32>() < 0.25;
        let make_default_communications = rng.gen::<f32>() < 0.25;

        let mut ok = true;
        if let Err(e) = registry.write_volume_scalar(index, source, scalar) {
            warn!("{}", e);
            summary.failures += 1;
            ok = false;
        }
        if let Err(e) = registry.write_mute(index, source, mute) {
            warn!("{}", e);
            summary.failures += 1;
            ok = false;
        }

        let (name, direction) = {
            let device = &registry.devices()[index];
            (device.name.clone(), device.direction)
        };
        // Names double as patterns here, so the first device with this name wins.
        if make_default {
            defaults::assign(registry, source, DeviceRole::Console, direction, &name);
        }
        if make_default_communications {
            defaults::assign(registry, source, DeviceRole::Communications, direction, &name);
        }

        if let Err(e) = registry.write_visible(index, source, mute) {
            warn!("{}", e);
            summary.failures += 1;
            ok = false;
        }
        registry.refresh_state(index, source);

        if ok {
            summary.written += 1;
        }
    }

    info!("Randomized {} devices", summary.written);
    summary
}

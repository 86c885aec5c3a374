//! Default endpoint assignment by name pattern.

use crate::audio::{DeviceRole, DeviceSource, Direction};
use crate::pattern;
use crate::registry::DeviceRegistry;
use tracing::{debug, warn};

/// Make the first device of `direction` whose name matches `pattern` the
/// default for `role`.
///
/// Returns false if no device qualifies. A request that the platform
/// rejects still counts as issued.
pub fn assign(
    registry: &mut DeviceRegistry,
    source: &dyn DeviceSource,
    role: DeviceRole,
    direction: Direction,
    pattern: &str,
) -> bool {
    let Some(index) = registry
        .iter()
        .position(|d| d.direction == direction && pattern::matches(pattern, &d.name))
    else {
        debug!("No {:?} device matches {:?}", direction, pattern);
        return false;
    };

    let name = registry.devices()[index].name.clone();
    match registry.write_default(index, source, role) {
        Ok(()) => debug!("Requested {} as default {:?} device", name, role),
        Err(e) => warn!("{}", e),
    }
    true
}

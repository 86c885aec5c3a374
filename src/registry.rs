//! Per-run snapshot of every audio endpoint.
//!
//! Built once from a [`DeviceSource`], kept in enumeration order. Order is
//! significant: first-match lookups walk it front to back.

use crate::audio::{AudioError, Device, DeviceRole, DeviceSource, DeviceState, Direction};
use thiserror::Error;
use tracing::{debug, warn};

/// Maximum number of endpoints a registry accepts.
pub const MAX_DEVICES: usize = 256;

/// Registry build errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Too many devices: {count} found, at most {capacity} supported")]
    TooManyDevices { count: usize, capacity: usize },

    #[error(transparent)]
    Audio(#[from] AudioError),
}

/// Ordered collection of devices for one invocation.
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    devices: Vec<Device>,
}

/// Current default IDs, one per direction/role pair.
#[derive(Debug, Default)]
struct DefaultIds {
    ids: Vec<(Direction, DeviceRole, String)>,
}

impl DefaultIds {
    fn query(source: &dyn DeviceSource) -> Self {
        let mut ids = Vec::new();
        for direction in Direction::ALL {
            for role in DeviceRole::ALL {
                match source.current_default(direction, role) {
                    Ok(Some(id)) => ids.push((direction, role, id)),
                    Ok(None) => debug!("No default {:?} {:?} endpoint", direction, role),
                    Err(e) => warn!("Could not query default {:?} {:?}: {}", direction, role, e),
                }
            }
        }
        Self { ids }
    }

    fn is_default(&self, device: &Device, role: DeviceRole) -> bool {
        self.ids
            .iter()
            .any(|(d, r, id)| *d == device.direction && *r == role && *id == device.id)
    }
}

impl DeviceRegistry {
    /// Enumerate every endpoint and read its current attributes.
    pub fn build(source: &dyn DeviceSource) -> Result<Self, RegistryError> {
        Self::build_with_capacity(source, MAX_DEVICES)
    }

    /// Like [`DeviceRegistry::build`] with an explicit endpoint limit.
    pub fn build_with_capacity(
        source: &dyn DeviceSource,
        capacity: usize,
    ) -> Result<Self, RegistryError> {
        let endpoints = source.enumerate_endpoints()?;
        debug!("Enumerated {} endpoints", endpoints.len());

        if endpoints.len() > capacity {
            return Err(RegistryError::TooManyDevices {
                count: endpoints.len(),
                capacity,
            });
        }

        let defaults = DefaultIds::query(source);

        let devices = endpoints
            .into_iter()
            .map(|info| {
                let mut device = Device::new(info);
                device.is_default_console = defaults.is_default(&device, DeviceRole::Console);
                device.is_default_communications =
                    defaults.is_default(&device, DeviceRole::Communications);
                read_levels(source, &mut device);
                device
            })
            .collect();

        Ok(Self { devices })
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn get(&self, index: usize) -> Option<&Device> {
        self.devices.get(index)
    }

    /// Devices of one direction, in registry order.
    pub fn by_direction(&self, direction: Direction) -> impl Iterator<Item = &Device> {
        self.devices.iter().filter(move |d| d.direction == direction)
    }

    /// Index of the first device named exactly `name`.
    pub fn position_by_name(&self, name: &str) -> Option<usize> {
        self.devices.iter().position(|d| d.name == name)
    }

    /// Re-read a device's state. Keeps the previous state if the read fails.
    pub fn refresh_state(&mut self, index: usize, source: &dyn DeviceSource) -> DeviceState {
        let device = &mut self.devices[index];
        match source.state(&device.id) {
            Ok(state) => device.state = state,
            Err(e) => warn!("Could not read state of {}: {}", device.name, e),
        }
        device.state
    }

    /// Re-read a device's volume scalar, level and mute.
    pub fn refresh_levels(&mut self, index: usize, source: &dyn DeviceSource) {
        read_levels(source, &mut self.devices[index]);
    }

    /// Write the volume scalar and mirror it on success.
    pub fn write_volume_scalar(
        &mut self,
        index: usize,
        source: &dyn DeviceSource,
        scalar: f32,
    ) -> Result<(), AudioError> {
        let device = &mut self.devices[index];
        source.set_volume_scalar(&device.id, scalar)?;
        device.volume_scalar = scalar.clamp(0.0, 1.0);
        Ok(())
    }

    /// Write the native volume level and mirror it on success.
    pub fn write_volume_level(
        &mut self,
        index: usize,
        source: &dyn DeviceSource,
        level: f32,
    ) -> Result<(), AudioError> {
        let device = &mut self.devices[index];
        source.set_volume_level(&device.id, level)?;
        device.volume_level = level;
        Ok(())
    }

    /// Write the mute state and mirror it on success.
    pub fn write_mute(
        &mut self,
        index: usize,
        source: &dyn DeviceSource,
        muted: bool,
    ) -> Result<(), AudioError> {
        let device = &mut self.devices[index];
        source.set_mute(&device.id, muted)?;
        device.is_muted = muted;
        Ok(())
    }

    /// Enable or disable the endpoint. The cached state is left for
    /// [`DeviceRegistry::refresh_state`] to update.
    pub fn write_visible(
        &self,
        index: usize,
        source: &dyn DeviceSource,
        visible: bool,
    ) -> Result<(), AudioError> {
        source.set_visible(&self.devices[index].id, visible)
    }

    /// Request default assignment and update the role flags of the device's
    /// direction on success.
    pub fn write_default(
        &mut self,
        index: usize,
        source: &dyn DeviceSource,
        role: DeviceRole,
    ) -> Result<(), AudioError> {
        source.set_default(&self.devices[index].id, role)?;

        let direction = self.devices[index].direction;
        for (i, device) in self.devices.iter_mut().enumerate() {
            if device.direction != direction {
                continue;
            }
            let flag = i == index;
            match role {
                DeviceRole::Console => device.is_default_console = flag,
                DeviceRole::Communications => device.is_default_communications = flag,
            }
        }
        Ok(())
    }
}

fn read_levels(source: &dyn DeviceSource, device: &mut Device) {
    match source.volume_scalar(&device.id) {
        Ok(v) => device.volume_scalar = v,
        Err(e) => debug!("{}", e),
    }
    match source.volume_level(&device.id) {
        Ok(v) => device.volume_level = v,
        Err(e) => debug!("{}", e),
    }
    match source.mute(&device.id) {
        Ok(v) => device.is_muted = v,
        Err(e) => debug!("{}", e),
    }
}

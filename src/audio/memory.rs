//! In-process device source.
//!
//! Holds endpoints in memory and records every write in a journal, so
//! engine behaviour can be checked without audio hardware.

use super::device::{AudioError, DeviceRole, DeviceState, Direction, EndpointInfo};
use super::source::DeviceSource;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// A write issued against the source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceCall {
    SetVolumeScalar { device_id: String, scalar: f32 },
    SetVolumeLevel { device_id: String, level: f32 },
    SetMute { device_id: String, muted: bool },
    SetVisible { device_id: String, visible: bool },
    SetDefault { device_id: String, role: DeviceRole },
}

impl SourceCall {
    pub fn device_id(&self) -> &str {
        match self {
            SourceCall::SetVolumeScalar { device_id, .. }
            | SourceCall::SetVolumeLevel { device_id, .. }
            | SourceCall::SetMute { device_id, .. }
            | SourceCall::SetVisible { device_id, .. }
            | SourceCall::SetDefault { device_id, .. } => device_id,
        }
    }
}

/// Operations that can be made to fail for a given device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailOp {
    ReadVolume,
    WriteVolume,
    WriteMute,
    SetVisible,
    SetDefault,
}

#[derive(Debug, Clone)]
struct Endpoint {
    info: EndpointInfo,
    volume_scalar: f32,
    volume_level: f32,
    muted: bool,
}

#[derive(Debug, Default)]
struct Inner {
    endpoints: Vec<Endpoint>,
    defaults: HashMap<(Direction, DeviceRole), String>,
    failures: HashSet<(String, FailOp)>,
    failed_queries: HashSet<(Direction, DeviceRole)>,
    journal: Vec<SourceCall>,
}

/// Memory-backed [`DeviceSource`].
#[derive(Debug, Default)]
pub struct MemorySource {
    inner: RefCell<Inner>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an endpoint at the end of the enumeration order.
    pub fn add(&self, info: EndpointInfo, volume_scalar: f32, volume_level: f32, muted: bool) {
        self.inner.borrow_mut().endpoints.push(Endpoint {
            info,
            volume_scalar,
            volume_level,
            muted,
        });
    }

    /// Builder form of [`MemorySource::add`] with full volume, unmuted.
    pub fn with(self, info: EndpointInfo) -> Self {
        self.add(info, 1.0, 0.0, false);
        self
    }

    /// Mark `device_id` as the current default for a direction and role.
    pub fn set_current_default(&self, direction: Direction, role: DeviceRole, device_id: &str) {
        self.inner
            .borrow_mut()
            .defaults
            .insert((direction, role), device_id.to_string());
    }

    /// Make `op` fail for `device_id` from now on.
    pub fn fail(&self, device_id: &str, op: FailOp) {
        self.inner
            .borrow_mut()
            .failures
            .insert((device_id.to_string(), op));
    }

    /// Make the current-default query for a direction and role fail.
    pub fn fail_default_query(&self, direction: Direction, role: DeviceRole) {
        self.inner
            .borrow_mut()
            .failed_queries
            .insert((direction, role));
    }

    /// Change an endpoint's state behind the engine's back.
    pub fn set_state(&self, device_id: &str, state: DeviceState) {
        if let Some(ep) = self.inner.borrow_mut().find_mut(device_id) {
            ep.info.state = state;
        }
    }

    /// Change an endpoint's volume and mute behind the engine's back.
    pub fn set_levels(&self, device_id: &str, volume_scalar: f32, volume_level: f32, muted: bool) {
        if let Some(ep) = self.inner.borrow_mut().find_mut(device_id) {
            ep.volume_scalar = volume_scalar;
            ep.volume_level = volume_level;
            ep.muted = muted;
        }
    }

    /// Every write issued so far, in order.
    pub fn journal(&self) -> Vec<SourceCall> {
        self.inner.borrow().journal.clone()
    }

    /// Writes issued for a single device.
    pub fn calls_for(&self, device_id: &str) -> Vec<SourceCall> {
        self.inner
            .borrow()
            .journal
            .iter()
            .filter(|c| c.device_id() == device_id)
            .cloned()
            .collect()
    }

    pub fn clear_journal(&self) {
        self.inner.borrow_mut().journal.clear();
    }

    /// Current (scalar, level, muted) of an endpoint.
    pub fn levels(&self, device_id: &str) -> Option<(f32, f32, bool)> {
        self.inner
            .borrow()
            .find(device_id)
            .map(|ep| (ep.volume_scalar, ep.volume_level, ep.muted))
    }

    pub fn current_state(&self, device_id: &str) -> Option<DeviceState> {
        self.inner.borrow().find(device_id).map(|ep| ep.info.state)
    }

    pub fn default_for(&self, direction: Direction, role: DeviceRole) -> Option<String> {
        self.inner.borrow().defaults.get(&(direction, role)).cloned()
    }
}

impl Inner {
    fn find(&self, device_id: &str) -> Option<&Endpoint> {
        self.endpoints.iter().find(|ep| ep.info.id == device_id)
    }

    fn find_mut(&mut self, device_id: &str) -> Option<&mut Endpoint> {
        self.endpoints.iter_mut().find(|ep| ep.info.id == device_id)
    }

    fn get(&self, device_id: &str) -> Result<&Endpoint, AudioError> {
        self.find(device_id).ok_or_else(|| AudioError::DeviceNotFound {
            device_id: device_id.to_string(),
        })
    }

    fn get_mut(&mut self, device_id: &str) -> Result<&mut Endpoint, AudioError> {
        self.find_mut(device_id)
            .ok_or_else(|| AudioError::DeviceNotFound {
                device_id: device_id.to_string(),
            })
    }

    fn check(&self, device_id: &str, op: FailOp, what: &'static str) -> Result<(), AudioError> {
        if self.failures.contains(&(device_id.to_string(), op)) {
            let reason = "injected failure".to_string();
            return Err(match op {
                FailOp::ReadVolume => AudioError::ReadFailed {
                    device_id: device_id.to_string(),
                    what,
                    reason,
                },
                FailOp::SetDefault => AudioError::SetDefaultFailed {
                    device_id: device_id.to_string(),
                    reason,
                },
                _ => AudioError::WriteFailed {
                    device_id: device_id.to_string(),
                    what,
                    reason,
                },
            });
        }
        Ok(())
    }
}

impl DeviceSource for MemorySource {
    fn enumerate_endpoints(&self) -> Result<Vec<EndpointInfo>, AudioError> {
        Ok(self
            .inner
            .borrow()
            .endpoints
            .iter()
            .map(|ep| ep.info.clone())
            .collect())
    }

    fn current_default(
        &self,
        direction: Direction,
        role: DeviceRole,
    ) -> Result<Option<String>, AudioError> {
        if self
            .inner
            .borrow()
            .failed_queries
            .contains(&(direction, role))
        {
            return Err(AudioError::EnumerationFailed(format!(
                "injected failure querying default {:?} {:?}",
                direction, role
            )));
        }
        Ok(self.default_for(direction, role))
    }

    fn state(&self, device_id: &str) -> Result<DeviceState, AudioError> {
        Ok(self.inner.borrow().get(device_id)?.info.state)
    }

    fn volume_scalar(&self, device_id: &str) -> Result<f32, AudioError> {
        let inner = self.inner.borrow();
        inner.check(device_id, FailOp::ReadVolume, "volume scalar")?;
        Ok(inner.get(device_id)?.volume_scalar)
    }

    fn volume_level(&self, device_id: &str) -> Result<f32, AudioError> {
        let inner = self.inner.borrow();
        inner.check(device_id, FailOp::ReadVolume, "volume level")?;
        Ok(inner.get(device_id)?.volume_level)
    }

    fn mute(&self, device_id: &str) -> Result<bool, AudioError> {
        let inner = self.inner.borrow();
        inner.check(device_id, FailOp::ReadVolume, "mute")?;
        Ok(inner.get(device_id)?.muted)
    }

    fn set_volume_scalar(&self, device_id: &str, scalar: f32) -> Result<(), AudioError> {
        let mut inner = self.inner.borrow_mut();
        inner.journal.push(SourceCall::SetVolumeScalar {
            device_id: device_id.to_string(),
            scalar,
        });
        inner.check(device_id, FailOp::WriteVolume, "volume scalar")?;
        inner.get_mut(device_id)?.volume_scalar = scalar.clamp(0.0, 1.0);
        Ok(())
    }

    fn set_volume_level(&self, device_id: &str, level: f32) -> Result<(), AudioError> {
        let mut inner = self.inner.borrow_mut();
        inner.journal.push(SourceCall::SetVolumeLevel {
            device_id: device_id.to_string(),
            level,
        });
        inner.check(device_id, FailOp::WriteVolume, "volume level")?;
        inner.get_mut(device_id)?.volume_level = level;
        Ok(())
    }

    fn set_mute(&self, device_id: &str, muted: bool) -> Result<(), AudioError> {
        let mut inner = self.inner.borrow_mut();
        inner.journal.push(SourceCall::SetMute {
            device_id: device_id.to_string(),
            muted,
        });
        inner.check(device_id, FailOp::WriteMute, "mute")?;
        inner.get_mut(device_id)?.muted = muted;
        Ok(())
    }

    fn set_visible(&self, device_id: &str, visible: bool) -> Result<(), AudioError> {
        let mut inner = self.inner.borrow_mut();
        inner.journal.push(SourceCall::SetVisible {
            device_id: device_id.to_string(),
            visible,
        });
        inner.check(device_id, FailOp::SetVisible, "visibility")?;
        let ep = inner.get_mut(device_id)?;
        // Unplugged and missing endpoints keep their state; only the policy flag flips.
        match (ep.info.state, visible) {
            (DeviceState::Disabled, true) => ep.info.state = DeviceState::Active,
            (DeviceState::Active, false) => ep.info.state = DeviceState::Disabled,
            _ => {}
        }
        Ok(())
    }

    fn set_default(&self, device_id: &str, role: DeviceRole) -> Result<(), AudioError> {
        let mut inner = self.inner.borrow_mut();
        inner.journal.push(SourceCall::SetDefault {
            device_id: device_id.to_string(),
            role,
        });
        inner.check(device_id, FailOp::SetDefault, "default")?;
        let direction = inner.get(device_id)?.info.direction;
        inner
            .defaults
            .insert((direction, role), device_id.to_string());
        Ok(())
    }
}

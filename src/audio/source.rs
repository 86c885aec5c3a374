//! Platform boundary for endpoint enumeration and control.

use super::device::{AudioError, DeviceRole, DeviceState, Direction, EndpointInfo};

/// Everything the engine needs from the platform audio stack.
///
/// Calls are blocking and individually fallible. Callers treat a failure as
/// affecting only the device it names.
pub trait DeviceSource {
    /// All endpoints, in the platform's enumeration order.
    fn enumerate_endpoints(&self) -> Result<Vec<EndpointInfo>, AudioError>;

    /// ID of the current default endpoint for a direction and role, if any.
    fn current_default(
        &self,
        direction: Direction,
        role: DeviceRole,
    ) -> Result<Option<String>, AudioError>;

    fn state(&self, device_id: &str) -> Result<DeviceState, AudioError>;

    fn volume_scalar(&self, device_id: &str) -> Result<f32, AudioError>;

    fn volume_level(&self, device_id: &str) -> Result<f32, AudioError>;

    fn mute(&self, device_id: &str) -> Result<bool, AudioError>;

    fn set_volume_scalar(&self, device_id: &str, scalar: f32) -> Result<(), AudioError>;

    fn set_volume_level(&self, device_id: &str, level: f32) -> Result<(), AudioError>;

    fn set_mute(&self, device_id: &str, muted: bool) -> Result<(), AudioError>;

    /// Enable (`true`) or disable (`false`) the endpoint at the policy layer.
    fn set_visible(&self, device_id: &str, visible: bool) -> Result<(), AudioError>;

    /// Request that the endpoint become the default for `role`.
    fn set_default(&self, device_id: &str, role: DeviceRole) -> Result<(), AudioError>;
}

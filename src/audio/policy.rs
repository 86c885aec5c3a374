use super::device::{AudioError, DeviceRole};
use windows::core::*;
use windows::Win32::Media::Audio::{eCommunications, eConsole, eMultimedia, ERole};
use windows::Win32::System::Com::*;

/// IPolicyConfig COM interface (undocumented but stable)
/// Used to set the default audio device and endpoint visibility
#[windows::core::interface("F8679F50-850A-41CF-9C72-430F290290C8")]
pub unsafe trait IPolicyConfig: IUnknown {
    // Reserved methods to maintain vtable order
    fn reserved1(&self) -> HRESULT;
    fn reserved2(&self) -> HRESULT;
    fn reserved3(&self) -> HRESULT;
    fn reserved4(&self) -> HRESULT;
    fn reserved5(&self) -> HRESULT;
    fn reserved6(&self) -> HRESULT;
    fn reserved7(&self) -> HRESULT;
    fn reserved8(&self) -> HRESULT;
    fn reserved9(&self) -> HRESULT;
    fn reserved10(&self) -> HRESULT;

    fn SetDefaultEndpoint(&self, device_id: PCWSTR, role: u32) -> HRESULT;
    fn SetEndpointVisibility(&self, device_id: PCWSTR, visible: i32) -> HRESULT;
}

// PolicyConfigClient CLSID
const CLSID_POLICY_CONFIG_CLIENT: GUID = GUID::from_u128(0x870af99c_171d_4f9e_af0d_e63df40c2bc9);

/// Platform roles written for each logical role.
/// Console also covers Multimedia so the two never drift apart.
pub fn platform_roles(role: DeviceRole) -> &'static [ERole] {
    match role {
        DeviceRole::Console => &[eConsole, eMultimedia],
        DeviceRole::Communications => &[eCommunications],
    }
}

/// Wrapper around the policy client, created once per run.
pub struct PolicyConfig {
    inner: IPolicyConfig,
}

impl PolicyConfig {
    /// Create the policy client. COM must already be initialized.
    pub fn new() -> std::result::Result<Self, AudioError> {
        unsafe {
            let inner: IPolicyConfig =
                CoCreateInstance(&CLSID_POLICY_CONFIG_CLIENT, None, CLSCTX_ALL)
                    .map_err(|e| AudioError::ServiceUnavailable(e.to_string()))?;
            Ok(Self { inner })
        }
    }

    /// Sets the specified device as the default for the given role
    pub fn set_default_endpoint(
        &self,
        device_id: &str,
        role: DeviceRole,
    ) -> std::result::Result<(), AudioError> {
        let device_id_wide = to_wide(device_id);
        for erole in platform_roles(role) {
            unsafe {
                self.inner
                    .SetDefaultEndpoint(PCWSTR(device_id_wide.as_ptr()), erole.0 as u32)
                    .ok()
                    .map_err(|e| AudioError::SetDefaultFailed {
                        device_id: device_id.to_string(),
                        reason: e.to_string(),
                    })?;
            }
        }
        Ok(())
    }

    /// Enables or disables the endpoint in Windows Sound settings
    pub fn set_endpoint_visibility(
        &self,
        device_id: &str,
        visible: bool,
    ) -> std::result::Result<(), AudioError> {
        let device_id_wide = to_wide(device_id);
        unsafe {
            self.inner
                .SetEndpointVisibility(PCWSTR(device_id_wide.as_ptr()), visible as i32)
                .ok()
                .map_err(|e| AudioError::WriteFailed {
                    device_id: device_id.to_string(),
                    what: "visibility",
                    reason: e.to_string(),
                })
        }
    }
}

pub(crate) fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

//! Device enumeration using Windows MMDevice API.
//!
//! Provides COM initialization and the Windows [`DeviceSource`].

use super::device::{AudioError, DeviceRole, DeviceState, Direction, EndpointInfo};
use super::policy::{to_wide, PolicyConfig};
use super::source::DeviceSource;
use super::volume::VolumeController;
use windows::core::{Interface, PCWSTR};
use windows::Win32::Devices::Properties::DEVPKEY_Device_FriendlyName;
use windows::Win32::Media::Audio::{
    eAll, eCapture, eCommunications, eMultimedia, eRender, EDataFlow, IMMDevice,
    IMMDeviceEnumerator, IMMEndpoint, MMDeviceEnumerator, DEVICE_STATE, DEVICE_STATE_ACTIVE,
    DEVICE_STATE_DISABLED,
};
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoUninitialize, CLSCTX_ALL, COINIT_APARTMENTTHREADED, STGM,
};
use windows::Win32::UI::Shell::PropertiesSystem::{IPropertyStore, PROPERTYKEY};

/// COM initialization guard that uninitializes COM on drop.
pub struct ComGuard {
    _private: (),
}

impl ComGuard {
    /// Initialize COM for the current thread.
    pub fn new() -> Result<Self, AudioError> {
        unsafe {
            CoInitializeEx(None, COINIT_APARTMENTTHREADED)
                .ok()
                .map_err(|e| AudioError::ServiceUnavailable(e.to_string()))?;
        }
        Ok(Self { _private: () })
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        unsafe {
            CoUninitialize();
        }
    }
}

/// Device source backed by the MMDevice API and the policy config client.
pub struct WindowsDeviceSource {
    enumerator: IMMDeviceEnumerator,
    policy: PolicyConfig,
}

impl WindowsDeviceSource {
    /// Create a new WindowsDeviceSource.
    ///
    /// Note: COM must be initialized before calling this function.
    pub fn new() -> Result<Self, AudioError> {
        unsafe {
            let enumerator: IMMDeviceEnumerator =
                CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL)
                    .map_err(|e| AudioError::ServiceUnavailable(e.to_string()))?;

            Ok(Self {
                enumerator,
                policy: PolicyConfig::new()?,
            })
        }
    }

    /// Look up an endpoint by ID.
    fn device(&self, device_id: &str) -> Result<IMMDevice, AudioError> {
        let device_id_wide = to_wide(device_id);
        unsafe {
            self.enumerator
                .GetDevice(PCWSTR::from_raw(device_id_wide.as_ptr()))
                .map_err(|_| AudioError::DeviceNotFound {
                    device_id: device_id.to_string(),
                })
        }
    }

    fn volume(&self, device_id: &str) -> Result<VolumeController, AudioError> {
        VolumeController::new(&self.device(device_id)?, device_id)
    }

    /// Convert an IMMDevice to enumeration data.
    fn endpoint_info(&self, device: &IMMDevice) -> Result<EndpointInfo, AudioError> {
        unsafe {
            let id = device
                .GetId()
                .map_err(|e| AudioError::EnumerationFailed(e.to_string()))?;
            let id_string = id
                .to_string()
                .map_err(|e| AudioError::StringConversion(e.to_string()))?;

            let props: IPropertyStore = device
                .OpenPropertyStore(STGM(0))
                .map_err(|e| AudioError::EnumerationFailed(e.to_string()))?;

            let name = get_device_name(&props).unwrap_or_else(|| "Unknown".to_string());

            let flow = device
                .cast::<IMMEndpoint>()
                .and_then(|endpoint| endpoint.GetDataFlow())
                .map_err(|e| AudioError::EnumerationFailed(e.to_string()))?;

            let state = device
                .GetState()
                .map(convert_state)
                .unwrap_or(DeviceState::Unknown);

            Ok(EndpointInfo {
                id: id_string,
                name,
                direction: convert_flow(flow),
                state,
            })
        }
    }
}

impl DeviceSource for WindowsDeviceSource {
    fn enumerate_endpoints(&self) -> Result<Vec<EndpointInfo>, AudioError> {
        unsafe {
            let mask = DEVICE_STATE(DEVICE_STATE_ACTIVE.0 | DEVICE_STATE_DISABLED.0);
            let collection = self
                .enumerator
                .EnumAudioEndpoints(eAll, mask)
                .map_err(|e| AudioError::EnumerationFailed(e.to_string()))?;

            let count = collection
                .GetCount()
                .map_err(|e| AudioError::EnumerationFailed(e.to_string()))?;

            let mut endpoints = Vec::with_capacity(count as usize);

            for i in 0..count {
                let device = collection
                    .Item(i)
                    .map_err(|e| AudioError::EnumerationFailed(e.to_string()))?;

                match self.endpoint_info(&device) {
                    Ok(info) => endpoints.push(info),
                    Err(e) => tracing::warn!("Skipping endpoint {}: {}", i, e),
                }
            }

            Ok(endpoints)
        }
    }

    fn current_default(
        &self,
        direction: Direction,
        role: DeviceRole,
    ) -> Result<Option<String>, AudioError> {
        let flow = match direction {
            Direction::Playback => eRender,
            Direction::Capture => eCapture,
        };
        let erole = match role {
            DeviceRole::Console => eMultimedia,
            DeviceRole::Communications => eCommunications,
        };

        unsafe {
            let device = match self.enumerator.GetDefaultAudioEndpoint(flow, erole) {
                Ok(d) => d,
                Err(_) => return Ok(None),
            };

            let id = device
                .GetId()
                .map_err(|e| AudioError::EnumerationFailed(e.to_string()))?;
            let id_string = id
                .to_string()
                .map_err(|e| AudioError::StringConversion(e.to_string()))?;

            Ok(Some(id_string))
        }
    }

    fn state(&self, device_id: &str) -> Result<DeviceState, AudioError> {
        let device = self.device(device_id)?;
        unsafe {
            device
                .GetState()
                .map(convert_state)
                .map_err(|e| AudioError::ReadFailed {
                    device_id: device_id.to_string(),
                    what: "state",
                    reason: e.to_string(),
                })
        }
    }

    fn volume_scalar(&self, device_id: &str) -> Result<f32, AudioError> {
        self.volume(device_id)?.get_volume_scalar()
    }

    fn volume_level(&self, device_id: &str) -> Result<f32, AudioError> {
        self.volume(device_id)?.get_volume_level()
    }

    fn mute(&self, device_id: &str) -> Result<bool, AudioError> {
        self.volume(device_id)?.get_mute()
    }

    fn set_volume_scalar(&self, device_id: &str, scalar: f32) -> Result<(), AudioError> {
        self.volume(device_id)?.set_volume_scalar(scalar)
    }

    fn set_volume_level(&self, device_id: &str, level: f32) -> Result<(), AudioError> {
        self.volume(device_id)?.set_volume_level(level)
    }

    fn set_mute(&self, device_id: &str, muted: bool) -> Result<(), AudioError> {
        self.volume(device_id)?.set_mute(muted)
    }

    fn set_visible(&self, device_id: &str, visible: bool) -> Result<(), AudioError> {
        self.policy.set_endpoint_visibility(device_id, visible)
    }

    fn set_default(&self, device_id: &str, role: DeviceRole) -> Result<(), AudioError> {
        self.policy.set_default_endpoint(device_id, role)
    }
}

/// Get the friendly name of a device from its property store.
fn get_device_name(props: &IPropertyStore) -> Option<String> {
    unsafe {
        // Convert DEVPROPKEY to PROPERTYKEY
        let key = PROPERTYKEY {
            fmtid: DEVPKEY_Device_FriendlyName.fmtid,
            pid: DEVPKEY_Device_FriendlyName.pid,
        };

        let prop = props.GetValue(&key).ok()?;

        let s = prop.to_string();
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    }
}

fn convert_flow(flow: EDataFlow) -> Direction {
    if flow == eCapture {
        Direction::Capture
    } else {
        Direction::Playback
    }
}

fn convert_state(state: DEVICE_STATE) -> DeviceState {
    DeviceState::from_code(state.0 as i32)
}

//! Volume control using IAudioEndpointVolume.
//!
//! Provides volume and mute control for one endpoint.

use super::device::AudioError;
use windows::Win32::Media::Audio::{Endpoints::IAudioEndpointVolume, IMMDevice};
use windows::Win32::System::Com::CLSCTX_ALL;

/// Volume controller for a specific device.
pub struct VolumeController {
    device_id: String,
    endpoint_volume: IAudioEndpointVolume,
}

impl VolumeController {
    /// Activate the endpoint volume interface of `device`.
    pub fn new(device: &IMMDevice, device_id: &str) -> Result<Self, AudioError> {
        unsafe {
            let endpoint_volume: IAudioEndpointVolume = device
                .Activate(CLSCTX_ALL, None)
                .map_err(|_| AudioError::VolumeNotAvailable {
                    device_id: device_id.to_string(),
                })?;

            Ok(Self {
                device_id: device_id.to_string(),
                endpoint_volume,
            })
        }
    }

    fn read_error(&self, what: &'static str, e: windows::core::Error) -> AudioError {
        AudioError::ReadFailed {
            device_id: self.device_id.clone(),
            what,
            reason: e.to_string(),
        }
    }

    fn write_error(&self, what: &'static str, e: windows::core::Error) -> AudioError {
        AudioError::WriteFailed {
            device_id: self.device_id.clone(),
            what,
            reason: e.to_string(),
        }
    }

    /// Get the current mute state.
    pub fn get_mute(&self) -> Result<bool, AudioError> {
        unsafe {
            let muted = self
                .endpoint_volume
                .GetMute()
                .map_err(|e| self.read_error("mute", e))?;
            Ok(muted.as_bool())
        }
    }

    /// Set the mute state.
    pub fn set_mute(&self, muted: bool) -> Result<(), AudioError> {
        unsafe {
            self.endpoint_volume
                .SetMute(muted, std::ptr::null())
                .map_err(|e| self.write_error("mute", e))?;
            Ok(())
        }
    }

    /// Get the current volume as a scalar (0.0 to 1.0).
    pub fn get_volume_scalar(&self) -> Result<f32, AudioError> {
        unsafe {
            self.endpoint_volume
                .GetMasterVolumeLevelScalar()
                .map_err(|e| self.read_error("volume scalar", e))
        }
    }

    /// Set the volume as a scalar (0.0 to 1.0).
    pub fn set_volume_scalar(&self, scalar: f32) -> Result<(), AudioError> {
        let scalar = scalar.clamp(0.0, 1.0);
        unsafe {
            self.endpoint_volume
                .SetMasterVolumeLevelScalar(scalar, std::ptr::null())
                .map_err(|e| self.write_error("volume scalar", e))?;
            Ok(())
        }
    }

    /// Get the current volume in decibels.
    pub fn get_volume_level(&self) -> Result<f32, AudioError> {
        unsafe {
            self.endpoint_volume
                .GetMasterVolumeLevel()
                .map_err(|e| self.read_error("volume level", e))
        }
    }

    /// Set the volume in decibels.
    pub fn set_volume_level(&self, level: f32) -> Result<(), AudioError> {
        unsafe {
            self.endpoint_volume
                .SetMasterVolumeLevel(level, std::ptr::null())
                .map_err(|e| self.write_error("volume level", e))?;
            Ok(())
        }
    }
}

//! Console listing of the registry.

use crate::audio::{Device, DeviceRole, Direction};
use crate::registry::DeviceRegistry;
use std::fmt;

fn yes_no(b: bool) -> &'static str {
    if b {
        "True"
    } else {
        "False"
    }
}

/// Playback devices first, then recording devices, each in registry order.
pub struct DeviceListing<'a>(pub &'a DeviceRegistry);

impl fmt::Display for DeviceListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for direction in Direction::ALL {
            writeln!(f, "------------ {} Devices ------------", direction.label())?;
            for device in self.0.by_direction(direction) {
                write_device(f, device)?;
            }
        }
        Ok(())
    }
}

fn write_device(f: &mut fmt::Formatter<'_>, device: &Device) -> fmt::Result {
    writeln!(f, "{}", device.name)?;
    writeln!(f, "\tVolume: {:.6}", device.volume_scalar)?;
    writeln!(f, "\tLevel: {:.6}", device.volume_level)?;
    writeln!(f, "\tIsMute: {}", yes_no(device.is_muted))?;
    writeln!(f, "\tType: {}", device.direction.label())?;
    writeln!(f, "\tState: {:?}", device.state)?;
    writeln!(
        f,
        "\tIsDefault: {}",
        yes_no(device.is_default_for(DeviceRole::Console))
    )?;
    writeln!(
        f,
        "\tIsDefaultCommunication: {}",
        yes_no(device.is_default_for(DeviceRole::Communications))
    )?;
    writeln!(f)
}

//! Audio module: endpoint model and the platform boundary.
//!
//! The Windows Core Audio backend lives here too; other targets only get
//! the in-memory source.

pub mod device;
pub mod memory;
pub mod source;

#[cfg(target_os = "windows")]
pub mod enumerator;
#[cfg(target_os = "windows")]
pub mod policy;
#[cfg(target_os = "windows")]
pub mod volume;

pub use device::{AudioError, Device, DeviceRole, DeviceState, Direction, EndpointInfo};
pub use memory::{FailOp, MemorySource, SourceCall};
pub use source::DeviceSource;

#[cfg(target_os = "windows")]
pub use enumerator::{ComGuard, WindowsDeviceSource};

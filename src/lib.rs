//! Audio Switch - Library
//!
//! Bulk control of a machine's audio endpoints.
//!
//! ## Features
//!
//! - List every playback and recording device with volume, mute and defaults
//! - Mute or unmute devices selected by a wildcard name pattern
//! - Pick default Console and Communications devices by pattern
//! - Enable or disable every device
//! - Save all device state to a text file and restore it later

pub mod audio;
pub mod cli;
pub mod codec;
pub mod config;
pub mod defaults;
pub mod mutate;
pub mod pattern;
pub mod presets;
pub mod registry;
pub mod report;

pub use audio::{AudioError, Device, DeviceRole, DeviceSource, DeviceState, Direction};
pub use codec::{CodecError, ConfigRecord, LoadSummary};
pub use mutate::MutationSummary;
pub use presets::Preset;
pub use registry::{DeviceRegistry, RegistryError};

//! Audio endpoint data models.
//!
//! Defines the core data structures for representing playback and capture
//! endpoints, their direction, state and default roles.

use thiserror::Error;

/// An audio endpoint with its current state.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    /// Unique platform endpoint ID (opaque, stable for the endpoint)
    pub id: String,

    /// Human-readable device name, used for pattern matching and save files
    pub name: String,

    /// Playback (render) or capture (record)
    pub direction: Direction,

    /// Last known endpoint state
    pub state: DeviceState,

    /// Volume as normalized scalar (0.0 to 1.0)
    pub volume_scalar: f32,

    /// Volume in the device-native unit (usually dB, may be negative)
    pub volume_level: f32,

    /// Current mute state
    pub is_muted: bool,

    /// Whether this is the default device for the Console role in its direction
    pub is_default_console: bool,

    /// Whether this is the default device for the Communications role in its direction
    pub is_default_communications: bool,
}

impl Device {
    /// Create a new Device from enumeration data with default volume values.
    pub fn new(info: EndpointInfo) -> Self {
        Self {
            id: info.id,
            name: info.name,
            direction: info.direction,
            state: info.state,
            volume_scalar: 1.0,
            volume_level: 0.0,
            is_muted: false,
            is_default_console: false,
            is_default_communications: false,
        }
    }

    /// True if the endpoint is enabled and present.
    pub fn is_active(&self) -> bool {
        self.state == DeviceState::Active
    }

    /// Default flag for the given role.
    pub fn is_default_for(&self, role: DeviceRole) -> bool {
        match role {
            DeviceRole::Console => self.is_default_console,
            DeviceRole::Communications => self.is_default_communications,
        }
    }
}

/// What the platform reports for each endpoint during enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointInfo {
    pub id: String,
    pub name: String,
    pub direction: Direction,
    pub state: DeviceState,
}

impl EndpointInfo {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        direction: Direction,
        state: DeviceState,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            direction,
            state,
        }
    }
}

/// Data flow direction of an endpoint (maps to Windows EDataFlow).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Render endpoints: speakers, headphones
    Playback,

    /// Capture endpoints: microphones, line-in
    Capture,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Playback, Direction::Capture];

    /// Label used in listings.
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Playback => "Playback",
            Direction::Capture => "Recording",
        }
    }
}

/// Audio device role for default assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceRole {
    /// Games, system sounds, music and most general applications
    Console,

    /// Teams, Zoom, Discord, and other VoIP applications
    Communications,
}

impl DeviceRole {
    pub const ALL: [DeviceRole; 2] = [DeviceRole::Console, DeviceRole::Communications];
}

/// Endpoint state flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceState {
    /// Device is active and available for use
    Active,

    /// Device is disabled in Windows Sound settings
    Disabled,

    /// Device is not present (driver issue)
    NotPresent,

    /// Device is unplugged (for pluggable devices)
    Unplugged,

    /// State could not be determined
    #[default]
    Unknown,
}

impl DeviceState {
    /// Numeric code as stored in save files (matches DEVICE_STATE_* bit values).
    pub fn code(&self) -> i32 {
        match self {
            DeviceState::Active => 1,
            DeviceState::Disabled => 2,
            DeviceState::NotPresent => 4,
            DeviceState::Unplugged => 8,
            DeviceState::Unknown => 0,
        }
    }

    pub fn from_code(code: i32) -> Self {
        match code {
            1 => DeviceState::Active,
            2 => DeviceState::Disabled,
            4 => DeviceState::NotPresent,
            8 => DeviceState::Unplugged,
            _ => DeviceState::Unknown,
        }
    }
}

/// Audio service error types.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Device not found: {device_id}")]
    DeviceNotFound { device_id: String },

    #[error("Platform audio services unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Failed to enumerate devices: {0}")]
    EnumerationFailed(String),

    #[error("Failed to read {what} of {device_id}: {reason}")]
    ReadFailed {
        device_id: String,
        what: &'static str,
        reason: String,
    },

    #[error("Failed to write {what} of {device_id}: {reason}")]
    WriteFailed {
        device_id: String,
        what: &'static str,
        reason: String,
    },

    #[error("Failed to set default device {device_id}: {reason}")]
    SetDefaultFailed { device_id: String, reason: String },

    #[error("Volume control not available for device {device_id}")]
    VolumeNotAvailable { device_id: String },

    #[error("String conversion error: {0}")]
    StringConversion(String),
}

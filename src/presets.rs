//! Named hardware presets.
//!
//! A preset picks default devices for all four direction/role pairs by
//! pattern, then unmutes its devices at full volume.

use crate::audio::{DeviceRole, DeviceSource, Direction};
use crate::defaults;
use crate::mutate;
use crate::registry::DeviceRegistry;
use clap::ValueEnum;

/// Known presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// Astro MixAmp: separate "Game" and "Voice" endpoints
    Astro,

    /// TC-Helicon GoXLR: "System", "Chat" and "Mic" endpoints
    #[value(alias = "tc", alias = "tchelicon")]
    TcHelicon,
}

/// One default assignment of a preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub role: DeviceRole,
    pub direction: Direction,
    pub pattern: &'static str,
}

/// Result of one assignment, for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentOutcome {
    pub assignment: Assignment,
    pub found: bool,
}

impl AssignmentOutcome {
    /// Human-readable outcome line, naming the preset's vendor.
    pub fn message(&self, vendor: &str) -> String {
        let what = match (self.assignment.direction, self.assignment.role) {
            (Direction::Playback, DeviceRole::Console) => "Playback Device",
            (Direction::Playback, DeviceRole::Communications) => "Playback Communication Device",
            (Direction::Capture, DeviceRole::Console) => "Recording Device",
            (Direction::Capture, DeviceRole::Communications) => "Recording Communication Device",
        };
        if self.found {
            format!("Set {} Default {}", vendor, what)
        } else {
            format!(
                "Unable to find {} {}. Did not set Default {}.",
                vendor, what, what
            )
        }
    }
}

const fn assignment(role: DeviceRole, direction: Direction, pattern: &'static str) -> Assignment {
    Assignment {
        role,
        direction,
        pattern,
    }
}

const ASTRO_GAME: &str = "*Astro*Game*";
const ASTRO_VOICE: &str = "*Astro*Voice*";

const TC_SYSTEM: &str = "*System*TC-Helicon*";
const TC_CHAT: &str = "*Chat*TC-Helicon*";
const TC_MIC: &str = "*Mic*TC-Helicon*";

impl Preset {
    /// Vendor name used in messages.
    pub fn vendor(&self) -> &'static str {
        match self {
            Preset::Astro => "Astro",
            Preset::TcHelicon => "TC-Helicon",
        }
    }

    /// Default assignments, in the order they are issued.
    pub fn assignments(&self) -> [Assignment; 4] {
        use DeviceRole::{Communications, Console};
        use Direction::{Capture, Playback};
        match self {
            Preset::Astro => [
                assignment(Console, Playback, ASTRO_GAME),
                assignment(Communications, Playback, ASTRO_VOICE),
                assignment(Console, Capture, ASTRO_VOICE),
                assignment(Communications, Capture, ASTRO_VOICE),
            ],
            Preset::TcHelicon => [
                assignment(Console, Playback, TC_SYSTEM),
                assignment(Communications, Playback, TC_CHAT),
                assignment(Console, Capture, TC_MIC),
                assignment(Communications, Capture, TC_MIC),
            ],
        }
    }

    /// Patterns unmuted at full volume after the assignments.
    pub fn unmute_patterns(&self) -> &'static [&'static str] {
        match self {
            Preset::Astro => &[ASTRO_GAME, ASTRO_VOICE],
            Preset::TcHelicon => &[TC_SYSTEM, TC_CHAT, TC_MIC],
        }
    }

    /// Run the preset against the registry.
    pub fn apply(
        &self,
        registry: &mut DeviceRegistry,
        source: &dyn DeviceSource,
    ) -> Vec<AssignmentOutcome> {
        let outcomes = self
            .assignments()
            .into_iter()
            .map(|a| AssignmentOutcome {
                assignment: a,
                found: defaults::assign(registry, source, a.role, a.direction, a.pattern),
            })
            .collect();

        for pattern in self.unmute_patterns() {
            mutate::apply(registry, source, 1.0, false, pattern, false);
        }

        outcomes
    }
}

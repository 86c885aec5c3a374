//! Command-line interface.

use crate::audio::DeviceSource;
use crate::codec;
use crate::config::{DEFAULT_LOG_LEVEL, DEFAULT_STATE_FILE, LOG_LEVEL_ENV, STATE_FILE_ENV};
use crate::mutate;
use crate::presets::Preset;
use crate::registry::DeviceRegistry;
use crate::report::DeviceListing;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing::warn;

/// Bulk volume, mute, enable and default-device control for audio endpoints
#[derive(Parser, Debug)]
#[command(name = "audio-switch", author, version, about, long_about = None)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = LOG_LEVEL_ENV, default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List all playback and recording devices
    List,

    /// Enable every device
    EnableAll,

    /// Disable every device
    DisableAll,

    /// Save volume, mute, default and state of every device
    Save {
        /// State file to write
        #[arg(short, long, env = STATE_FILE_ENV, default_value = DEFAULT_STATE_FILE)]
        file: PathBuf,
    },

    /// Restore devices from a saved state file
    Load {
        /// State file to read
        #[arg(short, long, env = STATE_FILE_ENV, default_value = DEFAULT_STATE_FILE)]
        file: PathBuf,
    },

    /// Randomize mute, volume, default and default communication devices
    Randomize,

    /// Set default devices to a known hardware setup
    Preset {
        /// Preset name
        #[arg(value_enum, ignore_case = true)]
        preset: Preset,
    },

    /// Mute and zero the volume of all devices matching a pattern
    ///
    /// Every device is enabled first, including disabled devices the
    /// pattern does not select.
    Mute {
        /// Name pattern, `*` matches anything
        pattern: String,

        /// Act on devices NOT matching the pattern
        #[arg(long)]
        non_matching: bool,
    },

    /// Unmute and max the volume of all devices matching a pattern
    ///
    /// Every device is enabled first, including disabled devices the
    /// pattern does not select.
    Unmute {
        /// Name pattern, `*` matches anything
        pattern: String,

        /// Act on devices NOT matching the pattern
        #[arg(long)]
        non_matching: bool,
    },
}

/// Execute `command` against a built registry, writing user output to `out`.
pub fn run<W: Write>(
    command: &Command,
    registry: &mut DeviceRegistry,
    source: &dyn DeviceSource,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::List => {
            write!(out, "{}", DeviceListing(registry))?;
        }
        Command::EnableAll => {
            let summary = mutate::set_all_visible(registry, source, true);
            writeln!(out, "Enabled {} of {} devices", summary.written, summary.matched)?;
        }
        Command::DisableAll => {
            let summary = mutate::set_all_visible(registry, source, false);
            writeln!(out, "Disabled {} of {} devices", summary.written, summary.matched)?;
        }
        Command::Save { file } => match codec::save(registry, source, file) {
            Ok(count) => writeln!(out, "Saved {} devices to {}", count, file.display())?,
            Err(e) => {
                warn!("Save failed: {}", e);
                writeln!(out, "Unable to save devices: {}", e)?;
            }
        },
        Command::Load { file } => match codec::load(registry, source, file) {
            Ok(summary) => {
                writeln!(
                    out,
                    "Restored {} devices from {}",
                    summary.records_matched,
                    file.display()
                )?;
                for name in &summary.unknown_names {
                    writeln!(out, "No device named \"{}\", skipped", name)?;
                }
            }
            Err(e) => {
                warn!("Load failed: {}", e);
                writeln!(out, "Unable to load devices: {}", e)?;
            }
        },
        Command::Randomize => {
            let summary = mutate::randomize(registry, source, &mut rand::thread_rng());
            writeln!(out, "Randomized {} devices", summary.written)?;
        }
        Command::Preset { preset } => {
            for outcome in preset.apply(registry, source) {
                writeln!(out, "{}", outcome.message(preset.vendor()))?;
            }
        }
        Command::Mute {
            pattern,
            non_matching,
        } => {
            let summary = mutate::apply(registry, source, 0.0, true, pattern, *non_matching);
            writeln!(out, "Muted {} devices", summary.written)?;
        }
        Command::Unmute {
            pattern,
            non_matching,
        } => {
            let summary = mutate::apply(registry, source, 1.0, false, pattern, *non_matching);
            writeln!(out, "Unmuted {} devices", summary.written)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{DeviceState, Direction, EndpointInfo, MemorySource};
    use clap::CommandFactory;

    fn source() -> MemorySource {
        MemorySource::new()
            .with(EndpointInfo::new("s", "Speakers", Direction::Playback, DeviceState::Active))
            .with(EndpointInfo::new("m", "Mic", Direction::Capture, DeviceState::Active))
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_mute_non_matching() {
        let cli =
            Cli::try_parse_from(["audio-switch", "mute", "*Mic*", "--non-matching"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Mute {
                pattern: "*Mic*".to_string(),
                non_matching: true
            }
        );
    }

    #[test]
    fn test_parse_preset() {
        let cli = Cli::try_parse_from(["audio-switch", "preset", "tc-helicon"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Preset {
                preset: Preset::TcHelicon
            }
        );
        let cli = Cli::try_parse_from(["audio-switch", "preset", "TC"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Preset {
                preset: Preset::TcHelicon
            }
        );
        assert!(Cli::try_parse_from(["audio-switch", "preset", "goxlr"]).is_err());
    }

    #[test]
    fn test_missing_arguments_rejected() {
        assert!(Cli::try_parse_from(["audio-switch"]).is_err());
        assert!(Cli::try_parse_from(["audio-switch", "mute"]).is_err());
    }

    #[test]
    fn test_run_mute() {
        let source = source();
        let mut registry = DeviceRegistry::build(&source).unwrap();
        let mut out = Vec::new();

        let command = Command::Mute {
            pattern: "*Mic*".to_string(),
            non_matching: false,
        };
        run(&command, &mut registry, &source, &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "Muted 1 devices\n");
        assert_eq!(source.levels("m"), Some((0.0, 0.0, true)));
        assert_eq!(source.levels("s"), Some((1.0, 0.0, false)));
    }

    #[test]
    fn test_run_save_then_load() {
        let source = source();
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("state.cfg");
        let mut registry = DeviceRegistry::build(&source).unwrap();
        let mut out = Vec::new();

        run(&Command::Save { file: file.clone() }, &mut registry, &source, &mut out).unwrap();
        source.set_levels("s", 0.1, -30.0, true);
        run(&Command::Load { file }, &mut registry, &source, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Saved 2 devices to "));
        assert!(text.contains("Restored 2 devices from "));
        assert_eq!(source.levels("s"), Some((1.0, 0.0, false)));
    }

    #[test]
    fn test_run_load_missing_file_is_reported() {
        let source = source();
        let mut registry = DeviceRegistry::build(&source).unwrap();
        let mut out = Vec::new();
        let command = Command::Load {
            file: PathBuf::from("/nonexistent/state.cfg"),
        };

        run(&command, &mut registry, &source, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Unable to load devices: "));
        assert!(source.journal().is_empty());
    }

    #[test]
    fn test_run_save_to_bad_path_is_reported() {
        let source = source();
        let mut registry = DeviceRegistry::build(&source).unwrap();
        let mut out = Vec::new();
        let command = Command::Save {
            file: PathBuf::from("/nonexistent/dir/state.cfg"),
        };

        run(&command, &mut registry, &source, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Unable to save devices: "));
    }
}

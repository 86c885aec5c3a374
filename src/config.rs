//! Runtime settings shared by the binary and library users.

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable overriding the state file path.
pub const STATE_FILE_ENV: &str = "AUDIO_SWITCH_STATE";

/// State file used when neither `--file` nor the environment names one.
pub const DEFAULT_STATE_FILE: &str = "audio-devices.cfg";

/// Environment variable for the log level.
pub const LOG_LEVEL_ENV: &str = "AUDIO_SWITCH_LOG";

pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Install the stderr subscriber. `RUST_LOG` wins over `level`.
pub fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()?;

    Ok(())
}

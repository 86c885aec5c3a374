use anyhow::Result;
use audio_switch_rs::cli::Cli;
use audio_switch_rs::config;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.print()?;
            return Ok(());
        }
        Err(_) => {
            // Bad arguments are not a failure: show usage and exit cleanly.
            println!("Unknown or missing arguments.\n");
            Cli::command().print_help()?;
            return Ok(());
        }
    };

    config::init_logging(&cli.log_level)?;

    run_platform(&cli)
}

#[cfg(target_os = "windows")]
fn run_platform(cli: &Cli) -> Result<()> {
    use anyhow::Context;
    use audio_switch_rs::audio::{ComGuard, WindowsDeviceSource};
    use audio_switch_rs::registry::DeviceRegistry;

    let _com = ComGuard::new().context("COM initialization failed")?;
    let source = WindowsDeviceSource::new().context("Audio services unavailable")?;
    let mut registry =
        DeviceRegistry::build(&source).context("Failed to enumerate audio devices")?;
    tracing::info!("Found {} audio endpoints", registry.len());

    audio_switch_rs::cli::run(&cli.command, &mut registry, &source, &mut std::io::stdout().lock())
}

#[cfg(not(target_os = "windows"))]
fn run_platform(cli: &Cli) -> Result<()> {
    tracing::debug!("Requested {:?}", cli.command);
    anyhow::bail!("No audio device backend for this platform; audio-switch requires Windows")
}

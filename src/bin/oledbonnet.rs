//! oledbonnet - button monitor and display control for the OLED Bonnet
//!
//! # Usage
//!
//! ```bash
//! # Show button presses on the panel until Ctrl+C
//! oledbonnet button
//!
//! # Switch the panel off and back on
//! oledbonnet display off
//! oledbonnet display on
//!
//! # Use another bus and enable debug logging
//! OLEDBONNET_I2C_BUS=/dev/i2c-3 RUST_LOG=bonnet=debug oledbonnet button
//!
//! # Read device paths from a file
//! oledbonnet --config ./bonnet.toml button
//! ```
//!
//! # Signal Handling
//!
//! - SIGTERM/SIGINT: graceful shutdown of `button`, panel cleared and halted

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use bonnet::display_control::{apply_display_action, DisplayAction};
use bonnet::hardware::Bonnet;
use bonnet::lifecycle::spawn_shutdown_listener;
use bonnet::{BonnetConfig, ButtonMonitor};

/// Adafruit 128x64 OLED Bonnet tool
#[derive(Parser, Debug)]
#[command(name = "oledbonnet", version, about)]
struct Args {
    /// Config file (defaults to the per-user config, if present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show button presses on the panel until terminated
    Button,
    /// Turn the panel on or off
    Display {
        /// on | off
        action: DisplayAction,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("oledbonnet=info".parse()?)
                .add_directive("bonnet=info".parse()?)
                .add_directive("bonnet_core=info".parse()?),
        )
        .init();

    let config = BonnetConfig::load(args.config.as_deref()).context("Failed to load config")?;

    let result = match args.command {
        Command::Button => run_buttons(config),
        Command::Display { action } => run_display(&config, action),
    };

    if let Err(e) = &result {
        error!(error = %format_args!("{e:#}"), "oledbonnet failed");
    }
    result
}

/// Runs the button monitor (async entry point).
#[tokio::main]
async fn run_buttons(config: BonnetConfig) -> Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        bus = %config.i2c_bus.display(),
        "Starting button monitor"
    );

    let bonnet = Bonnet::open(&config).context("Failed to open the Bonnet")?;
    let (tracker, display) = bonnet.into_parts();

    let cancel_token = CancellationToken::new();
    let _listener = spawn_shutdown_listener(cancel_token.clone(), || println!("Terminating..."))
        .context("Failed to register signal handlers")?;

    ButtonMonitor::new(tracker, display, io::stdout())
        .run(cancel_token)
        .await
        .context("Button monitor failed")?;

    Ok(())
}

fn run_display(config: &BonnetConfig, action: DisplayAction) -> Result<()> {
    println!("Turning display {action}");

    let mut display = Bonnet::open_display(config).context("Failed to open the display")?;
    apply_display_action(&mut display, action)
        .with_context(|| format!("Failed to turn display {action}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_is_a_top_level_option() {
        let args = Args::try_parse_from(["oledbonnet", "--config", "bonnet.toml", "button"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("bonnet.toml")));
        assert!(matches!(args.command, Command::Button));
    }

    #[test]
    fn test_button_takes_no_flags() {
        assert!(Args::try_parse_from(["oledbonnet", "button", "--config", "bonnet.toml"]).is_err());
    }

    #[test]
    fn test_display_action_parsing() {
        let args = Args::try_parse_from(["oledbonnet", "display", "off"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Display {
                action: DisplayAction::Off
            }
        ));
        assert!(Args::try_parse_from(["oledbonnet", "display", "dim"]).is_err());
        assert!(Args::try_parse_from(["oledbonnet", "display"]).is_err());
    }
}

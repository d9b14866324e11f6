use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;

use system_volume::{BackendPreference, Config, VolumeController, select_backend};

#[derive(Parser)]
#[command(name = "system-volume")]
#[command(about = "Cross-platform system volume control with smooth transitions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,

    /// Force a specific Linux backend instead of probing
    #[arg(short, long, value_enum)]
    backend: Option<BackendPreference>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show backend, output device, volume and mute state
    Status,
    /// Print the current volume percentage
    Get,
    /// Set the volume to an exact percentage
    Set {
        /// Volume percentage in 0-100
        level: u8,
    },
    /// Raise the volume by a percentage step
    Up {
        #[arg(default_value_t = 5)]
        step: u8,
    },
    /// Lower the volume by a percentage step
    Down {
        #[arg(default_value_t = 5)]
        step: u8,
    },
    /// Mute the output
    Mute,
    /// Unmute the output
    Unmute,
    /// Toggle the mute state
    Toggle,
    /// Fade the volume smoothly to a target percentage
    Fade {
        /// Target volume percentage in 0-100
        level: u8,
        /// Fade duration in milliseconds (defaults to the configured value)
        #[arg(short, long)]
        duration_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("system_volume={log_level}"))
        .init();

    // Load configuration
    let config = Config::load(cli.config.as_deref())?;

    // Pick the backend for this host
    let preference = cli.backend.unwrap_or(config.general.backend);
    let selected = select_backend(preference).await?;
    info!("using {} backend", selected.kind);
    let controller = VolumeController::new(selected.adapter);

    match cli.command {
        Commands::Status => {
            println!("Backend: {}", controller.backend_name());
            println!(
                "Device:  {}",
                controller.current_device().as_deref().unwrap_or("(unknown)")
            );
            println!("Volume:  {}%", controller.volume()?);
            println!(
                "Muted:   {}",
                if controller.is_muted()? { "yes" } else { "no" }
            );
        }
        Commands::Get => {
            println!("{}", controller.volume()?);
        }
        Commands::Set { level } => {
            controller.set_volume(level)?;
        }
        Commands::Up { step } => {
            println!("{}", controller.increase_volume(step)?);
        }
        Commands::Down { step } => {
            println!("{}", controller.decrease_volume(step)?);
        }
        Commands::Mute => {
            controller.mute()?;
        }
        Commands::Unmute => {
            controller.unmute()?;
        }
        Commands::Toggle => {
            let muted = controller.toggle_mute()?;
            println!("{}", if muted { "muted" } else { "unmuted" });
        }
        Commands::Fade { level, duration_ms } => {
            let duration = duration_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| config.fade_duration());

            // Ctrl-C stops the fade mid-flight instead of killing the process
            let cancel = CancellationToken::new();
            let ctrlc = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    ctrlc.cancel();
                }
            });

            controller.set_volume_smooth(level, duration, cancel).await?;
            println!("{}", controller.volume()?);
        }
    }

    Ok(())
}

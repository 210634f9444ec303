//! Console binary for the Guildhall hero simulation.
//!
//! # Startup Sequence
//!
//! 1. Load `guildhall-config.yaml` (or the path given as the first
//!    argument; defaults when the file is absent)
//! 2. Initialize structured logging (tracing), `RUST_LOG` first, then the
//!    configured level
//! 3. Build the supervisor (store, world, party) and start the run
//! 4. Read commands from stdin until `quit`, end of input, or the run
//!    ending on its own
//! 5. Shut down and print final statistics

mod cli;
mod error;

use std::path::PathBuf;

use guildhall_core::{SimulationConfig, Supervisor};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, HELP, ReportView, StatusView};
use crate::error::EngineError;

/// Config file read when no path is given.
const DEFAULT_CONFIG_PATH: &str = "guildhall-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the run cannot be
/// built, or the console cannot be read.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let config = SimulationConfig::load(&config_path).map_err(EngineError::from)?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging.level);
    info!(
        path = %config_path.display(),
        found = config_path.exists(),
        world = config.world.name,
        heroes = config.heroes.len(),
        "configuration loaded"
    );

    // 3. Build and start the run.
    let supervisor = Supervisor::new(config).map_err(EngineError::from)?;
    supervisor.start().await.map_err(EngineError::from)?;
    println!("{HELP}");

    // 4. Console loop.
    if let Err(e) = console(&supervisor).await {
        warn!(error = %e, "console closed with an error");
    }

    // 5. Shut down.
    let report = supervisor.shutdown().await.map_err(EngineError::from)?;
    println!("{}", ReportView(&report));
    info!("guildhall-engine exiting");
    Ok(())
}

fn init_tracing(configured_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured_level)),
        )
        .with_target(true)
        .init();
}

/// Run commands until `quit`, end of input, or the end of the run.
async fn console(supervisor: &Supervisor) -> Result<(), EngineError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            reason = supervisor.wait_for_end() => {
                println!("The run has ended: {reason}.");
                return Ok(());
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("end of input; shutting down");
                    return Ok(());
                };
                match Command::parse(&line) {
                    Ok(Some(Command::Quit)) => return Ok(()),
                    Ok(Some(command)) => execute(supervisor, command).await?,
                    Ok(None) => {}
                    Err(e) => eprintln!("{e}"),
                }
            }
        }
    }
}

async fn execute(supervisor: &Supervisor, command: Command) -> Result<(), EngineError> {
    match command {
        Command::Status { json: false } => println!("{}", StatusView(&supervisor.status().await)),
        Command::Status { json: true } => {
            println!("{}", serde_json::to_string_pretty(&supervisor.status().await)?);
        }
        Command::Pause => match supervisor.pause().await {
            Ok(()) => println!("paused"),
            Err(e) => eprintln!("{e}"),
        },
        Command::Resume => match supervisor.resume().await {
            Ok(()) => println!("resumed"),
            Err(e) => eprintln!("{e}"),
        },
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn default_config_path_is_the_project_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join(DEFAULT_CONFIG_PATH);
        if path.exists() {
            assert!(SimulationConfig::load(&path).is_ok());
        }
    }
}

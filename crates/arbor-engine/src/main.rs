//! Demo engine for Arbor.
//!
//! Builds the in-memory demo farm, restores its pending replants from disk,
//! and ticks it until `engine.max_ticks` is reached or Ctrl-C is pressed.
//!
//! # Startup Sequence
//!
//! 1. Load configuration (first argument, else `arbor-config.yaml`)
//! 2. Initialize structured logging (tracing)
//! 3. Open the pending replant storage root
//! 4. Run the tick loop
//! 5. Log the result

mod error;
mod runner;

use std::path::{Path, PathBuf};

use anyhow::Context;
use arbor_core::ArborConfig;
use arbor_core::config::LoggingConfig;
use arbor_db::FileStorage;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Config file read when no path is given on the command line.
const DEFAULT_CONFIG_PATH: &str = "arbor-config.yaml";

/// Application entry point for the demo engine.
///
/// # Errors
///
/// Returns an error if configuration, storage, or the tick loop fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration.
    let config_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let (config, from_file) = load_config(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("arbor-engine starting");
    if from_file {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }

    // 3. Open storage. A root we cannot write to is fatal.
    let storage = FileStorage::open(&config.storage.root)
        .map_err(EngineError::from)
        .context("opening pending replant storage")?;

    // 4. Run.
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Ctrl-C handler unavailable; running until max_ticks");
            std::future::pending::<()>().await;
        }
    };
    let (summary, _) = runner::run(&config, &storage, shutdown)
        .await
        .context("running the demo farm")?;

    // 5. Log the result.
    info!(
        reason = ?summary.end_reason,
        ticks = summary.ticks,
        harvests = summary.harvests,
        planted = summary.planted,
        dropped = summary.dropped,
        abandoned = summary.abandoned,
        "arbor-engine finished"
    );
    Ok(())
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist. The flag reports whether the file was read.
fn load_config(path: &Path) -> Result<(ArborConfig, bool), EngineError> {
    if path.exists() {
        Ok((ArborConfig::from_file(path)?, true))
    } else {
        let mut config = ArborConfig::default();
        config.storage.apply_env_overrides();
        Ok((config, false))
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `logging.level`.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

// ABOUTME: Global tracing subscriber installation
// ABOUTME: Composes the level filter with the configured output layers

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{prelude::*, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::layers::{env_filter, output_layers};

/// Keeps the file writer flushing until dropped
#[must_use = "dropping the guard stops writes to the log file"]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_subscriber(config: &LoggingConfig) -> Result<LoggingGuard> {
    let filter = env_filter(config)?;
    let (layers, file_guard) = output_layers(config)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(layers)
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    tracing::debug!(
        filter = %config.filter_directives(),
        console = ?config.console,
        file = ?config.file,
        "Logging initialized"
    );
    Ok(LoggingGuard { _file: file_guard })
}

// ABOUTME: Structured logging for the arbor crates on top of tokio-tracing
// ABOUTME: Re-exports the tracing macros and installs the configured subscriber

pub mod config;
pub mod layers;
pub mod subscriber;

// Re-export tracing macros for convenience
pub use tracing::{Level, Span, debug, error, info, instrument, span, trace, warn};

pub use config::{ConsoleFormat, LogLevel, LoggingConfig};
pub use subscriber::{LoggingGuard, init_subscriber};

use anyhow::Result;

/// Install logging configured only from the environment
pub fn init_logging() -> Result<LoggingGuard> {
    init_subscriber(&LoggingConfig::from_env()?)
}

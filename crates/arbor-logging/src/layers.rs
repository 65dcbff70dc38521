// ABOUTME: Output layers for the configured console format and log file
// ABOUTME: Builds the level filter from the configuration's directives

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::Subscriber;
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, Layer, fmt, registry::LookupSpan};

use crate::config::{ConsoleFormat, LoggingConfig};

pub type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Layers for every enabled output, plus the guard that flushes the file writer
pub fn output_layers<S>(config: &LoggingConfig) -> Result<(Vec<BoxedLayer<S>>, Option<WorkerGuard>)>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let mut layers = Vec::new();

    match config.console {
        ConsoleFormat::Off => {}
        ConsoleFormat::Compact => layers.push(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .compact()
                .boxed(),
        ),
        ConsoleFormat::Json => layers.push(
            fmt::layer()
                .with_writer(std::io::stderr)
                .json()
                .with_current_span(true)
                .boxed(),
        ),
    }

    let guard = match &config.file {
        Some(path) => {
            let (layer, guard) = file_layer(path)?;
            layers.push(layer);
            Some(guard)
        }
        None => None,
    };

    Ok((layers, guard))
}

fn file_layer<S>(path: &Path) -> Result<(BoxedLayer<S>, WorkerGuard)>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let directory = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    fs::create_dir_all(directory)
        .with_context(|| format!("could not create log directory {}", directory.display()))?;
    let file_name = path
        .file_name()
        .with_context(|| format!("log file path {} has no file name", path.display()))?;

    let (writer, guard) = non_blocking(rolling::daily(directory, file_name));
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .boxed();
    Ok((layer, guard))
}

pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let directives = config.filter_directives();
    EnvFilter::try_new(&directives).with_context(|| format!("invalid log filter '{directives}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;
    use tempfile::tempdir;
    use tracing::Level;
    use tracing_subscriber::Registry;

    #[test]
    fn test_layers_follow_config() {
        let temp_dir = tempdir().unwrap();
        let config = LoggingConfig {
            file: Some(temp_dir.path().join("logs").join("explorer.log")),
            ..Default::default()
        };

        let (layers, guard) = output_layers::<Registry>(&config).unwrap();
        assert_eq!(layers.len(), 2);
        assert!(guard.is_some());
        assert!(temp_dir.path().join("logs").is_dir());

        let quiet = LoggingConfig {
            console: ConsoleFormat::Off,
            file: None,
            ..Default::default()
        };
        let (layers, guard) = output_layers::<Registry>(&quiet).unwrap();
        assert!(layers.is_empty());
        assert!(guard.is_none());
    }

    #[test]
    fn test_env_filter_includes_modules() {
        let mut config = LoggingConfig {
            level: LogLevel(Level::WARN),
            ..Default::default()
        };
        config
            .modules
            .insert("arbor_explorer::cache".to_string(), LogLevel(Level::TRACE));

        let rendered = env_filter(&config).unwrap().to_string().to_lowercase();
        assert!(rendered.contains("arbor_explorer::cache=trace"), "{rendered}");
        assert!(rendered.contains("warn"), "{rendered}");
    }
}

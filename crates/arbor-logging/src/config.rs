// ABOUTME: Logging configuration read from the `[logging]` settings table and the environment
// ABOUTME: Levels, per-module directives, console format and the optional log file

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::Level;

/// A tracing level that round-trips through its lowercase name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LogLevel(pub Level);

impl FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(name: &str) -> Result<Self> {
        let level = match name.trim().to_ascii_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" | "warning" => Level::WARN,
            "error" => Level::ERROR,
            _ => bail!("unknown log level '{name}', expected trace, debug, info, warn or error"),
        };
        Ok(LogLevel(level))
    }
}

impl TryFrom<String> for LogLevel {
    type Error = anyhow::Error;

    fn try_from(name: String) -> Result<Self> {
        name.parse()
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.to_string()
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.as_str().to_ascii_lowercase())
    }
}

/// How events are written to stderr
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConsoleFormat {
    Off,
    #[default]
    Compact,
    Json,
}

impl FromStr for ConsoleFormat {
    type Err = anyhow::Error;

    fn from_str(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(ConsoleFormat::Off),
            "compact" | "text" => Ok(ConsoleFormat::Compact),
            "json" => Ok(ConsoleFormat::Json),
            _ => bail!("unknown console format '{name}', expected off, compact or json"),
        }
    }
}

/// Logging configuration, usually the `[logging]` table of the settings file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LoggingConfig {
    pub level: LogLevel,

    /// Per-module overrides such as `arbor_explorer::refresh = "trace"`
    pub modules: BTreeMap<String, LogLevel>,

    pub console: ConsoleFormat,

    /// Daily-rolled log file, `None` to keep everything on the console
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel(Level::INFO),
            modules: BTreeMap::new(),
            console: ConsoleFormat::default(),
            file: default_log_file(),
        }
    }
}

impl LoggingConfig {
    /// Defaults overridden by the process environment
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `ARBOR_LOG`, `ARBOR_LOG_FORMAT` and `ARBOR_LOG_FILE` overrides.
    ///
    /// `ARBOR_LOG` takes `RUST_LOG` style directives and falls back to `RUST_LOG`
    /// itself. `ARBOR_LOG_FILE=off` disables the file sink.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(directives) = lookup("ARBOR_LOG").or_else(|| lookup("RUST_LOG")) {
            self.apply_directives(&directives)?;
        }

        if let Some(format) = lookup("ARBOR_LOG_FORMAT") {
            self.console = format.parse().context("invalid ARBOR_LOG_FORMAT")?;
        }

        match lookup("ARBOR_LOG_FILE").as_deref() {
            None => {}
            Some("") | Some("off") => self.file = None,
            Some(path) => self.file = Some(PathBuf::from(path)),
        }

        Ok(())
    }

    /// Merge directives like `warn,arbor_explorer::reveal=debug` into this config
    pub fn apply_directives(&mut self, directives: &str) -> Result<()> {
        for directive in directives.split(',').map(str::trim) {
            if directive.is_empty() {
                continue;
            }
            match directive.split_once('=') {
                Some((module, level)) => {
                    let level = level
                        .parse()
                        .with_context(|| format!("invalid level for module '{module}'"))?;
                    self.modules.insert(module.trim().to_string(), level);
                }
                None => self.level = directive.parse()?,
            }
        }
        Ok(())
    }

    /// Render as an `EnvFilter` directive string
    pub fn filter_directives(&self) -> String {
        std::iter::once(self.level.to_string())
            .chain(
                self.modules
                    .iter()
                    .map(|(module, level)| format!("{module}={level}")),
            )
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn default_log_file() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("arbor").join("explorer.log"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_level_names() {
        assert_eq!("TRACE".parse::<LogLevel>().unwrap(), LogLevel(Level::TRACE));
        assert_eq!(" warning ".parse::<LogLevel>().unwrap(), LogLevel(Level::WARN));
        assert!("verbose".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel(Level::DEBUG).to_string(), "debug");
    }

    #[test]
    fn test_settings_table() {
        let config: LoggingConfig = toml::from_str(
            r#"
level = "debug"
console = "json"
file = "/tmp/arbor/explorer.log"

[modules]
"arbor_explorer::cache" = "trace"
"#,
        )
        .unwrap();

        assert_eq!(config.level, LogLevel(Level::DEBUG));
        assert_eq!(config.console, ConsoleFormat::Json);
        assert_eq!(config.file, Some(PathBuf::from("/tmp/arbor/explorer.log")));
        assert_eq!(
            config.filter_directives(),
            "debug,arbor_explorer::cache=trace"
        );
    }

    #[test]
    fn test_bad_level_in_table_rejected() {
        assert!(toml::from_str::<LoggingConfig>("level = \"loud\"").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = LoggingConfig::default();
        config
            .apply_env(env(&[
                ("ARBOR_LOG", "warn,arbor_explorer::reveal=debug"),
                ("RUST_LOG", "trace"),
                ("ARBOR_LOG_FORMAT", "off"),
                ("ARBOR_LOG_FILE", "off"),
            ]))
            .unwrap();

        assert_eq!(config.level, LogLevel(Level::WARN));
        assert_eq!(
            config.modules.get("arbor_explorer::reveal"),
            Some(&LogLevel(Level::DEBUG))
        );
        assert_eq!(config.console, ConsoleFormat::Off);
        assert_eq!(config.file, None);
    }

    #[test]
    fn test_rust_log_fallback() {
        let mut config = LoggingConfig::default();
        config.apply_env(env(&[("RUST_LOG", "error")])).unwrap();
        assert_eq!(config.level, LogLevel(Level::ERROR));
        assert_eq!(config.console, ConsoleFormat::Compact);
    }

    #[test]
    fn test_bad_module_directive_rejected() {
        let mut config = LoggingConfig::default();
        assert!(config.apply_directives("arbor_explorer=loud").is_err());
        assert!(
            config
                .apply_env(env(&[("ARBOR_LOG_FORMAT", "xml")]))
                .is_err()
        );
    }
}

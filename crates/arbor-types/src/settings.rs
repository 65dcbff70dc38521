// ABOUTME: Explorer settings read on demand from the editor configuration
// ABOUTME: Sync-with-active-file, resource filtering and refresh debounce delay

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound for the refresh debounce delay
pub const MAX_REFRESH_DELAY_MS: u64 = 60_000;

/// Settings consulted by the project explorer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExplorerSettings {
    /// Reveal the active editor's file in the explorer automatically
    pub sync_with_active_file: bool,

    /// Show non-Java resources (plain folders and files) in the tree
    pub show_non_java_resources: bool,

    /// Debounce window for coalesced tree refreshes, in milliseconds
    pub refresh_delay_ms: u64,
}

impl Default for ExplorerSettings {
    fn default() -> Self {
        Self {
            sync_with_active_file: true,
            show_non_java_resources: true,
            refresh_delay_ms: 2000,
        }
    }
}

impl ExplorerSettings {
    /// Parse settings from a TOML table, filling missing keys with defaults
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<(), String> {
        if self.refresh_delay_ms > MAX_REFRESH_DELAY_MS {
            return Err(format!(
                "Refresh delay of {}ms exceeds the maximum of {}ms",
                self.refresh_delay_ms, MAX_REFRESH_DELAY_MS
            ));
        }
        Ok(())
    }

    /// Get a sanitized copy with the delay clamped into range
    pub fn sanitized(&self) -> Self {
        let mut settings = self.clone();
        settings.refresh_delay_ms = settings.refresh_delay_ms.min(MAX_REFRESH_DELAY_MS);
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ExplorerSettings::default();
        assert!(settings.sync_with_active_file);
        assert!(settings.show_non_java_resources);
        assert_eq!(settings.refresh_delay(), Duration::from_millis(2000));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings = ExplorerSettings::from_toml_str(
            r#"
sync-with-active-file = false
refresh-delay-ms = 250
"#,
        )
        .expect("Failed to parse settings");

        assert!(!settings.sync_with_active_file);
        assert!(settings.show_non_java_resources);
        assert_eq!(settings.refresh_delay_ms, 250);
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(ExplorerSettings::from_toml_str("refresh-delay-ms = \"soon\"").is_err());
    }

    #[test]
    fn test_validation_and_sanitizing() {
        let settings = ExplorerSettings {
            refresh_delay_ms: 120_000,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let sanitized = settings.sanitized();
        assert!(sanitized.validate().is_ok());
        assert_eq!(sanitized.refresh_delay_ms, MAX_REFRESH_DELAY_MS);
    }
}

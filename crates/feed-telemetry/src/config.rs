//! Telemetry configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Default service name attached to every log line.
pub const DEFAULT_SERVICE_NAME: &str = "agent-feed";

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name for logs
    pub service_name: String,

    /// Log level filter directive (`info`, `feed_core=debug,warn`, ...)
    pub log_level: String,

    /// Write log lines at all
    pub console_output: bool,

    /// JSON lines instead of human-readable output
    pub json_logs: bool,

    /// Append to this file instead of stderr
    pub log_file: Option<PathBuf>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            log_file: None,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `FEED_SERVICE_NAME`: Service name (default: agent-feed)
    /// - `FEED_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `FEED_CONSOLE_OUTPUT`: Enable log output (default: true)
    /// - `FEED_JSON_LOGS`: Enable JSON logs (default: false)
    /// - `FEED_LOG_FILE`: Write logs to this file instead of stderr
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            service_name: var("FEED_SERVICE_NAME")
                .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),

            log_level: var("FEED_LOG_LEVEL")
                .or_else(|| var("RUST_LOG"))
                .unwrap_or_else(|| "info".to_string()),

            console_output: var("FEED_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),

            json_logs: var("FEED_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false),

            log_file: var("FEED_LOG_FILE")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }

    /// Configuration for one binary, still honouring the environment.
    pub fn for_tool(name: &str) -> Self {
        let mut config = Self::from_env();
        config.service_name = name.to_string();
        config
    }

    /// Send logs to `path`, e.g. when the terminal belongs to a renderer.
    #[must_use]
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "agent-feed");
        assert_eq!(config.log_level, "info");
        assert!(config.console_output);
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_empty_environment_matches_default() {
        assert_eq!(
            TelemetryConfig::from_vars(lookup(&[])),
            TelemetryConfig::default()
        );
    }

    #[test]
    fn test_variables_applied() {
        let config = TelemetryConfig::from_vars(lookup(&[
            ("FEED_SERVICE_NAME", "feed-tui"),
            ("RUST_LOG", "debug"),
            ("FEED_JSON_LOGS", "1"),
            ("FEED_CONSOLE_OUTPUT", "false"),
            ("FEED_LOG_FILE", "/tmp/feed.log"),
        ]));
        assert_eq!(config.service_name, "feed-tui");
        assert_eq!(config.log_level, "debug");
        assert!(config.json_logs);
        assert!(!config.console_output);
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/feed.log")));
    }

    #[test]
    fn test_feed_log_level_wins_over_rust_log() {
        let config = TelemetryConfig::from_vars(lookup(&[
            ("FEED_LOG_LEVEL", "warn"),
            ("RUST_LOG", "trace"),
        ]));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_with_log_file() {
        let config = TelemetryConfig::default().with_log_file("feed.log");
        assert_eq!(config.log_file, Some(PathBuf::from("feed.log")));
    }
}

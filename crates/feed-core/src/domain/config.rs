//! Broker connection configuration with validation.
//!
//! # Config File Format
//!
//! ```toml
//! url = "ws://supos-ce-instance4.supos.app:8083/mqtt"
//! topics = [
//!     "yangzhi/line1/agent/output/message",
//!     "yangzhi/line2/agent/output/message",
//! ]
//! client_id_prefix = "agent_feed"
//! clean_session = true
//! connect_timeout = "4s"
//! keep_alive = "60s"
//! reconnect_interval = "1s"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

/// Default broker endpoint.
pub const DEFAULT_BROKER_URL: &str = "ws://supos-ce-instance4.supos.app:8083/mqtt";

/// Topics for the three production lines.
pub const THREE_LINE_TOPICS: [&str; 3] = [
    "yangzhi/line1/agent/output/message",
    "yangzhi/line2/agent/output/message",
    "yangzhi/line3/agent/output/message",
];

/// Topic for the single-line variant.
pub const SINGLE_LINE_TOPICS: [&str; 1] = ["yangzhi/line1/agent/output/message"];

/// Prefix for generated client identities.
pub const DEFAULT_CLIENT_ID_PREFIX: &str = "agent_feed";

/// Bound on the initial connect.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(4000);

pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(60);

/// Fixed delay between reconnect attempts.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_millis(1000);

/// Broker session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// WebSocket endpoint (`ws://` or `wss://`)
    pub url: String,
    /// Fixed subscription set
    pub topics: Vec<String>,
    /// Prefix of the per-session client identity
    pub client_id_prefix: String,
    /// Request a clean session from the broker
    pub clean_session: bool,
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub keep_alive: Duration,
    #[serde(with = "humantime_serde")]
    pub reconnect_interval: Duration,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BROKER_URL.to_string(),
            topics: THREE_LINE_TOPICS.iter().map(|t| t.to_string()).collect(),
            client_id_prefix: DEFAULT_CLIENT_ID_PREFIX.to_string(),
            clean_session: true,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            keep_alive: DEFAULT_KEEP_ALIVE,
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
        }
    }
}

impl BrokerConfig {
    /// Default configuration subscribed to the single-line topic only.
    #[must_use]
    pub fn single_line() -> Self {
        Self {
            topics: SINGLE_LINE_TOPICS.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string. Missing keys take defaults.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply environment overrides.
    ///
    /// # Environment Variables
    ///
    /// - `FEED_BROKER_URL`: broker endpoint
    /// - `FEED_TOPICS`: comma separated topic list
    /// - `FEED_CLIENT_ID_PREFIX`: client identity prefix
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = env::var("FEED_BROKER_URL") {
            self.url = url;
        }

        if let Ok(topics) = env::var("FEED_TOPICS") {
            self.topics = split_topics(&topics);
        }

        if let Ok(prefix) = env::var("FEED_CLIENT_ID_PREFIX") {
            self.client_id_prefix = prefix;
        }

        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.parsed_url()?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(ConfigError::UnsupportedScheme(url.scheme().to_string()));
        }

        if self.topics.is_empty() {
            return Err(ConfigError::NoTopics);
        }

        let mut seen = HashSet::new();
        for topic in &self.topics {
            if topic.trim().is_empty() {
                return Err(ConfigError::EmptyTopic);
            }
            if !seen.insert(topic.as_str()) {
                return Err(ConfigError::DuplicateTopic(topic.clone()));
            }
        }

        if self.connect_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "connect_timeout cannot be 0".into(),
            ));
        }

        if self.reconnect_interval.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "reconnect_interval cannot be 0".into(),
            ));
        }

        if self.keep_alive < Duration::from_secs(1) {
            return Err(ConfigError::InvalidTimeout(
                "keep_alive must be at least 1s".into(),
            ));
        }

        Ok(())
    }

    /// Port of the endpoint, falling back to the scheme default.
    pub fn endpoint_port(&self) -> Result<u16, ConfigError> {
        let url = self.parsed_url()?;
        url.port_or_known_default().ok_or_else(|| ConfigError::InvalidUrl {
            url: self.url.clone(),
            reason: "no port".into(),
        })
    }

    /// Host name of the endpoint.
    pub fn endpoint_host(&self) -> Result<String, ConfigError> {
        let url = self.parsed_url()?;
        url.host_str()
            .map(str::to_string)
            .ok_or_else(|| ConfigError::InvalidUrl {
                url: self.url.clone(),
                reason: "no host".into(),
            })
    }

    /// Whether the endpoint uses TLS (`wss://`).
    pub fn is_secure(&self) -> bool {
        self.url.starts_with("wss://")
    }

    fn parsed_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.url).map_err(|e| ConfigError::InvalidUrl {
            url: self.url.clone(),
            reason: e.to_string(),
        })
    }
}

fn split_topics(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

//! Error types for the live feed.
//!
//! None of these ever escape to the host as a panic. The connection manager
//! turns transport failures into display strings; configuration errors are
//! reported before a session is opened.

use thiserror::Error;

/// Errors raised at the broker transport boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The transport needs a tokio runtime to drive its event loop.
    #[error("no async runtime available to drive the broker connection")]
    NoRuntime,

    #[error("connect failed: {0}")]
    Connect(String),

    #[error("subscribe to {topic} failed: {reason}")]
    Subscribe { topic: String, reason: String },

    /// The session handle was already closed.
    #[error("session closed")]
    Closed,
}

/// Errors from loading or validating a [`BrokerConfig`](crate::BrokerConfig).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {error}")]
    Io { path: String, error: String },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid broker url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unsupported url scheme {0} (expected ws or wss)")]
    UnsupportedScheme(String),

    #[error("at least one topic is required")]
    NoTopics,

    #[error("topic names cannot be empty")]
    EmptyTopic,

    #[error("duplicate topic: {0}")]
    DuplicateTopic(String),

    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
}

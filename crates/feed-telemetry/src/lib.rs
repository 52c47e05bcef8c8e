//! # Feed Telemetry
//!
//! Logging setup shared by the agent feed binaries.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use feed_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = TelemetryConfig::for_tool("feed-tui").with_log_file("feed-tui.log");
//!     let _guard = init_telemetry(config)?;
//!
//!     // Application code here
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `FEED_SERVICE_NAME` | `agent-feed` | Service name in logs |
//! | `FEED_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter directive |
//! | `FEED_JSON_LOGS` | `false` | JSON lines output |
//! | `FEED_CONSOLE_OUTPUT` | `true` | Emit logs at all |
//! | `FEED_LOG_FILE` | unset | Append logs to this file instead of stderr |

mod config;
mod logging;
mod tracing_setup;

pub use config::{TelemetryConfig, DEFAULT_SERVICE_NAME};
pub use tracing_setup::{env_filter, log_sink, LogSink, TracingGuard};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracerInit(String),

    #[error("Failed to open log file {path}: {error}")]
    LogFile { path: String, error: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging.
///
/// Returns a guard that should be held for the lifetime of the application.
///
/// # Errors
///
/// Fails if the filter directive is invalid, the log file cannot be opened,
/// or a global subscriber is already installed.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let tracing = tracing_setup::init_tracing(&config)?;

    Ok(TelemetryGuard {
        service_name: config.service_name,
        tracing,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    service_name: String,
    tracing: TracingGuard,
}

impl TelemetryGuard {
    pub fn sink(&self) -> &LogSink {
        self.tracing.sink()
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry...");
    }
}

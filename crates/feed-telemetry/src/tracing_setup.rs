//! tracing-subscriber setup.
//!
//! One registry with an `EnvFilter` and a single fmt layer. The layer is JSON
//! or human-readable, and writes to stderr or to a file.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::{TelemetryConfig, TelemetryError};

/// Where log lines end up once tracing is initialised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    Stderr,
    File(PathBuf),
    Disabled,
}

/// Guard returned by [`init_tracing`]; reports where logs went.
pub struct TracingGuard {
    sink: LogSink,
}

impl TracingGuard {
    pub fn sink(&self) -> &LogSink {
        &self.sink
    }
}

/// Build the filter from the configured directive.
pub fn env_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::Config(format!("log level {:?}: {}", config.log_level, e)))
}

fn open_log_file(path: &Path) -> Result<File, TelemetryError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| TelemetryError::LogFile {
            path: path.display().to_string(),
            error: e.to_string(),
        })
}

/// Resolve the sink for a configuration. A log file wins over stderr.
pub fn log_sink(config: &TelemetryConfig) -> LogSink {
    match (&config.log_file, config.console_output) {
        (Some(path), _) => LogSink::File(path.clone()),
        (None, true) => LogSink::Stderr,
        (None, false) => LogSink::Disabled,
    }
}

/// Install the global subscriber.
pub fn init_tracing(config: &TelemetryConfig) -> Result<TracingGuard, TelemetryError> {
    let env_filter = env_filter(config)?;
    let sink = log_sink(config);

    let (writer, ansi) = match &sink {
        LogSink::File(path) => (BoxMakeWriter::new(Mutex::new(open_log_file(path)?)), false),
        LogSink::Stderr | LogSink::Disabled => (BoxMakeWriter::new(std::io::stderr), true),
    };

    let fmt_layer = if config.json_logs {
        // JSON output for log shipping
        fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(writer)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(ansi)
            .with_writer(writer)
            .boxed()
    };
    let fmt_layer = (sink != LogSink::Disabled).then_some(fmt_layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| TelemetryError::TracerInit(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        sink = ?sink,
        "Tracing initialized"
    );

    Ok(TracingGuard { sink })
}

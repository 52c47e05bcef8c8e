//! Metrics hooks for the connection manager and feed store.
//!
//! ## Usage
//!
//! ```ignore
//! use feed_core::metrics::{Metrics, MetricsRecorder};
//! use std::sync::Arc;
//!
//! let metrics = Arc::new(Metrics::new());
//! let feed = LiveFeed::new(config, transport).with_metrics(metrics.clone());
//!
//! // later, e.g. in the dashboard footer
//! let snapshot = metrics.snapshot();
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for connection and feed activity.
#[derive(Default)]
pub struct Metrics {
    /// Sessions opened by `start()`
    pub connect_attempts: AtomicU64,
    /// Successful connects, reconnects included
    pub connections_established: AtomicU64,
    pub connection_errors: AtomicU64,
    pub reconnect_attempts: AtomicU64,
    pub subscribe_failures: AtomicU64,
    pub messages_received: AtomicU64,
    /// Payloads that decoded to plain text
    pub decode_fallbacks: AtomicU64,
    /// Events dropped because their session was already torn down
    pub late_events_dropped: AtomicU64,
    pub feed_clears: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connect_attempts: self.connect_attempts.load(Ordering::Relaxed),
            connections_established: self.connections_established.load(Ordering::Relaxed),
            connection_errors: self.connection_errors.load(Ordering::Relaxed),
            reconnect_attempts: self.reconnect_attempts.load(Ordering::Relaxed),
            subscribe_failures: self.subscribe_failures.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            decode_fallbacks: self.decode_fallbacks.load(Ordering::Relaxed),
            late_events_dropped: self.late_events_dropped.load(Ordering::Relaxed),
            feed_clears: self.feed_clears.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        for counter in [
            &self.connect_attempts,
            &self.connections_established,
            &self.connection_errors,
            &self.reconnect_attempts,
            &self.subscribe_failures,
            &self.messages_received,
            &self.decode_fallbacks,
            &self.late_events_dropped,
            &self.feed_clears,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub connect_attempts: u64,
    pub connections_established: u64,
    pub connection_errors: u64,
    pub reconnect_attempts: u64,
    pub subscribe_failures: u64,
    pub messages_received: u64,
    pub decode_fallbacks: u64,
    pub late_events_dropped: u64,
    pub feed_clears: u64,
}

/// Trait for custom metrics recording implementations
pub trait MetricsRecorder: Send + Sync {
    fn record_connect_attempt(&self);
    fn record_connected(&self);
    fn record_connection_error(&self);
    fn record_reconnect(&self);
    fn record_subscribe_failure(&self);
    fn record_message(&self);
    fn record_decode_fallback(&self);
    fn record_late_event(&self);
    fn record_clear(&self);
}

/// No-op metrics recorder for when metrics are disabled
#[derive(Default)]
pub struct NoOpMetrics;

impl MetricsRecorder for NoOpMetrics {
    fn record_connect_attempt(&self) {}
    fn record_connected(&self) {}
    fn record_connection_error(&self) {}
    fn record_reconnect(&self) {}
    fn record_subscribe_failure(&self) {}
    fn record_message(&self) {}
    fn record_decode_fallback(&self) {}
    fn record_late_event(&self) {}
    fn record_clear(&self) {}
}

impl MetricsRecorder for Metrics {
    fn record_connect_attempt(&self) {
        self.connect_attempts.fetch_add(1, Ordering::Relaxed);
    }

    fn record_connected(&self) {
        self.connections_established.fetch_add(1, Ordering::Relaxed);
    }

    fn record_connection_error(&self) {
        self.connection_errors.fetch_add(1, Ordering::Relaxed);
    }

    fn record_reconnect(&self) {
        self.reconnect_attempts.fetch_add(1, Ordering::Relaxed);
    }

    fn record_subscribe_failure(&self) {
        self.subscribe_failures.fetch_add(1, Ordering::Relaxed);
    }

    fn record_message(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    fn record_decode_fallback(&self) {
        self.decode_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    fn record_late_event(&self) {
        self.late_events_dropped.fetch_add(1, Ordering::Relaxed);
    }

    fn record_clear(&self) {
        self.feed_clears.fetch_add(1, Ordering::Relaxed);
    }
}

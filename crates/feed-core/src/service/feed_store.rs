//! Append-only feed of normalized messages.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::{DecodedPayload, FeedEntry, InboundRecord};
use crate::metrics::{MetricsRecorder, NoOpMetrics};

/// Ordered log of received messages.
///
/// Every record handed to [`append`](Self::append) becomes exactly one entry,
/// at the end. There is no cap, no dedup and no reordering; only
/// [`clear`](Self::clear) removes entries.
pub struct FeedStore {
    entries: Vec<FeedEntry>,
    metrics: Arc<dyn MetricsRecorder>,
}

impl FeedStore {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            metrics: Arc::new(NoOpMetrics),
        }
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Normalize and append a record, stamped with the current time.
    pub fn append(&mut self, record: &InboundRecord) -> &FeedEntry {
        self.append_at(record, Utc::now())
    }

    /// Normalize and append a record with an explicit capture time.
    pub fn append_at(&mut self, record: &InboundRecord, received_at: DateTime<Utc>) -> &FeedEntry {
        let decoded = DecodedPayload::decode(&record.payload_text());
        if decoded.is_primitive() {
            debug!(topic = %record.topic, "Payload decoded as plain text");
            self.metrics.record_decode_fallback();
        }

        self.metrics.record_message();
        let index = self.entries.len();
        self.entries.push(FeedEntry::from_decoded(
            record.topic.clone(),
            decoded,
            received_at,
        ));
        &self.entries[index]
    }

    pub fn entries(&self) -> &[FeedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&FeedEntry> {
        self.entries.last()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        debug!(dropped = self.entries.len(), "Feed cleared");
        self.entries.clear();
        self.metrics.record_clear();
    }
}

impl Default for FeedStore {
    fn default() -> Self {
        Self::new()
    }
}

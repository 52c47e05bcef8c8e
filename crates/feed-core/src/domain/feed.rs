//! Feed entries.

use chrono::{DateTime, Local, Utc};

use super::events::InboundRecord;
use super::payload::{DecodedPayload, FeedValue};

/// One received message, as displayed.
///
/// Entries are immutable once created. `received_at` is the capture time on
/// this client, never a timestamp taken from the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    received_at: DateTime<Utc>,
    topic: String,
    output: FeedValue,
    input: Option<FeedValue>,
}

impl FeedEntry {
    /// Normalize an inbound record into an entry.
    pub fn from_record(record: &InboundRecord, received_at: DateTime<Utc>) -> Self {
        Self::from_decoded(
            record.topic.clone(),
            DecodedPayload::decode(&record.payload_text()),
            received_at,
        )
    }

    pub(crate) fn from_decoded(
        topic: String,
        decoded: DecodedPayload,
        received_at: DateTime<Utc>,
    ) -> Self {
        let (output, input) = decoded.into_output_input();
        Self {
            received_at,
            topic,
            output,
            input,
        }
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn output(&self) -> &FeedValue {
        &self.output
    }

    pub fn input(&self) -> Option<&FeedValue> {
        self.input.as_ref()
    }

    /// Local wall-clock capture time as `HH:MM:SS.mmm`.
    pub fn time_label(&self) -> String {
        self.received_at
            .with_timezone(&Local)
            .format("%H:%M:%S%.3f")
            .to_string()
    }
}

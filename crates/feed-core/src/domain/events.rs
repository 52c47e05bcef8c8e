//! Events emitted by a broker transport.

use bytes::Bytes;

use super::session::SessionId;

/// A lifecycle or data event from one broker session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportEvent {
    /// Session that produced the event.
    pub session: SessionId,
    pub kind: TransportEventKind,
}

impl TransportEvent {
    pub fn new(session: SessionId, kind: TransportEventKind) -> Self {
        Self { session, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEventKind {
    /// The broker accepted the connection (first connect or reconnect).
    Connected,
    /// A publish arrived on `topic`.
    Message { topic: String, payload: Bytes },
    /// The broker acknowledged a subscription.
    Subscribed { topic: String },
    /// The broker rejected a subscription.
    SubscribeFailed { topic: String, reason: String },
    /// Transport failure; the transport keeps retrying.
    Error(String),
    /// The connection was lost.
    Offline,
    /// A reconnect attempt is starting.
    Reconnecting,
    /// The session was closed and will not reconnect.
    Closed,
}

impl TransportEventKind {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            TransportEventKind::Connected => "connect",
            TransportEventKind::Message { .. } => "message",
            TransportEventKind::Subscribed { .. } => "suback",
            TransportEventKind::SubscribeFailed { .. } => "subscribe_error",
            TransportEventKind::Error(_) => "error",
            TransportEventKind::Offline => "offline",
            TransportEventKind::Reconnecting => "reconnect",
            TransportEventKind::Closed => "close",
        }
    }
}

/// One arrived (topic, payload) pair, handed to the normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundRecord {
    pub topic: String,
    pub payload: Bytes,
}

impl InboundRecord {
    pub fn new(topic: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }

    /// Payload as text. Invalid UTF-8 is replaced rather than rejected.
    pub fn payload_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

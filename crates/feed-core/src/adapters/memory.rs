//! In-memory broker.
//!
//! A scripted stand-in for a real broker: the test (or the demo publisher)
//! decides when a connect completes, what gets published and when the
//! connection drops. Sessions, subscriptions and closes are recorded so they
//! can be asserted on afterwards.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::debug;

use crate::domain::{SessionId, TransportEvent, TransportEventKind};
use crate::error::TransportError;
use crate::ports::{BrokerSession, BrokerTransport, ConnectOptions, EventSender};

struct SessionRecord {
    options: ConnectOptions,
    events: EventSender,
    subscriptions: Vec<String>,
    connected: bool,
    closed: bool,
}

impl SessionRecord {
    fn emit(&self, kind: TransportEventKind) {
        // The receiver may already be gone; a real broker would not notice either.
        let _ = self
            .events
            .send(TransportEvent::new(self.options.session, kind));
    }
}

#[derive(Default)]
struct BrokerState {
    sessions: Vec<SessionRecord>,
    auto_connect: bool,
    connect_failure: Option<String>,
    /// Topics whose subscribe request fails locally
    failing_topics: HashSet<String>,
    /// Topics the broker refuses in its SUBACK, with the reason
    rejected_topics: HashMap<String, String>,
    messages_published: u64,
}

impl BrokerState {
    fn session(&self, id: SessionId) -> Option<&SessionRecord> {
        self.sessions.iter().find(|s| s.options.session == id)
    }

    fn session_mut(&mut self, id: SessionId) -> Option<&mut SessionRecord> {
        self.sessions.iter_mut().find(|s| s.options.session == id)
    }

    /// Most recently opened session that has not been closed.
    fn live_mut(&mut self) -> Option<&mut SessionRecord> {
        self.sessions.iter_mut().rev().find(|s| !s.closed)
    }
}

/// Scripted in-memory broker implementing [`BrokerTransport`].
///
/// Cheap to clone; clones share the same broker.
#[derive(Clone, Default)]
pub struct InMemoryTransport {
    state: Arc<Mutex<BrokerState>>,
}

impl InMemoryTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A broker that accepts every connect immediately.
    #[must_use]
    pub fn with_auto_connect() -> Self {
        let transport = Self::new();
        transport.state.lock().auto_connect = true;
        transport
    }

    /// Accept the pending connect (or reconnect) of the live session.
    ///
    /// Returns `false` if there is no live session.
    pub fn complete_connect(&self) -> bool {
        let mut state = self.state.lock();
        let Some(session) = state.live_mut() else {
            return false;
        };
        session.connected = true;
        session.subscriptions.clear();
        session.emit(TransportEventKind::Connected);
        true
    }

    /// Deliver a message to every connected session subscribed to `topic`.
    ///
    /// Returns the number of sessions it was delivered to.
    pub fn publish(&self, topic: &str, payload: impl Into<Bytes>) -> usize {
        let payload = payload.into();
        let mut state = self.state.lock();
        state.messages_published += 1;

        let mut delivered = 0;
        for session in state
            .sessions
            .iter()
            .filter(|s| s.connected && !s.closed && s.subscriptions.iter().any(|t| t == topic))
        {
            session.emit(TransportEventKind::Message {
                topic: topic.to_string(),
                payload: payload.clone(),
            });
            delivered += 1;
        }
        debug!(topic, delivered, "In-memory publish");
        delivered
    }

    /// Simulate an unexpected loss of the live connection.
    ///
    /// Emits the same sequence a real transport would: `Error`, `Offline`,
    /// then `Reconnecting`. The session stays open; call
    /// [`complete_connect`](Self::complete_connect) to let the reconnect succeed.
    pub fn drop_connection(&self, reason: &str) -> bool {
        let mut state = self.state.lock();
        let Some(session) = state.live_mut() else {
            return false;
        };
        session.connected = false;
        session.subscriptions.clear();
        session.emit(TransportEventKind::Error(reason.to_string()));
        session.emit(TransportEventKind::Offline);
        session.emit(TransportEventKind::Reconnecting);
        true
    }

    /// Make the next `connect` call fail with `reason`.
    pub fn fail_next_connect(&self, reason: &str) {
        self.state.lock().connect_failure = Some(reason.to_string());
    }

    /// Make subscribe requests for `topic` fail before reaching the broker.
    pub fn fail_subscribe(&self, topic: &str) {
        self.state.lock().failing_topics.insert(topic.to_string());
    }

    /// Make the broker refuse `topic` in its subscription acknowledgement.
    pub fn reject_topic(&self, topic: &str, reason: &str) {
        self.state
            .lock()
            .rejected_topics
            .insert(topic.to_string(), reason.to_string());
    }

    /// Push an arbitrary event as if it came from session `id`, closed or not.
    ///
    /// This is how late callbacks from a torn-down session are simulated.
    pub fn inject(&self, id: SessionId, kind: TransportEventKind) -> bool {
        let state = self.state.lock();
        match state.session(id) {
            Some(session) => {
                session.emit(kind);
                true
            }
            None => false,
        }
    }

    /// Number of `connect` calls that produced a session.
    pub fn connect_count(&self) -> usize {
        self.state.lock().sessions.len()
    }

    /// Sessions not yet closed.
    pub fn open_sessions(&self) -> usize {
        self.state
            .lock()
            .sessions
            .iter()
            .filter(|s| !s.closed)
            .count()
    }

    /// Id of the most recently opened session.
    pub fn last_session(&self) -> Option<SessionId> {
        self.state
            .lock()
            .sessions
            .last()
            .map(|s| s.options.session)
    }

    pub fn connect_options(&self, id: SessionId) -> Option<ConnectOptions> {
        self.state.lock().session(id).map(|s| s.options.clone())
    }

    /// Topics session `id` subscribed to since its last connect, in request order.
    pub fn subscriptions(&self, id: SessionId) -> Vec<String> {
        self.state
            .lock()
            .session(id)
            .map(|s| s.subscriptions.clone())
            .unwrap_or_default()
    }

    pub fn is_closed(&self, id: SessionId) -> bool {
        self.state.lock().session(id).is_some_and(|s| s.closed)
    }

    pub fn messages_published(&self) -> u64 {
        self.state.lock().messages_published
    }
}

impl BrokerTransport for InMemoryTransport {
    fn connect(
        &self,
        options: ConnectOptions,
        events: EventSender,
    ) -> Result<Box<dyn BrokerSession>, TransportError> {
        let mut state = self.state.lock();
        if let Some(reason) = state.connect_failure.take() {
            return Err(TransportError::Connect(reason));
        }

        let id = options.session;
        debug!(session = %id, client_id = %options.client_id, "In-memory connect");
        let record = SessionRecord {
            options,
            events,
            subscriptions: Vec::new(),
            connected: state.auto_connect,
            closed: false,
        };
        if record.connected {
            record.emit(TransportEventKind::Connected);
        }
        state.sessions.push(record);

        Ok(Box::new(InMemorySession {
            id,
            state: self.state.clone(),
        }))
    }
}

struct InMemorySession {
    id: SessionId,
    state: Arc<Mutex<BrokerState>>,
}

impl BrokerSession for InMemorySession {
    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if state.failing_topics.contains(topic) {
            return Err(TransportError::Subscribe {
                topic: topic.to_string(),
                reason: "request rejected".to_string(),
            });
        }
        let rejection = state.rejected_topics.get(topic).cloned();

        let session = state.session_mut(self.id).ok_or(TransportError::Closed)?;
        if session.closed {
            return Err(TransportError::Closed);
        }

        match rejection {
            Some(reason) => session.emit(TransportEventKind::SubscribeFailed {
                topic: topic.to_string(),
                reason,
            }),
            None => {
                session.subscriptions.push(topic.to_string());
                session.emit(TransportEventKind::Subscribed {
                    topic: topic.to_string(),
                });
            }
        }
        Ok(())
    }

    fn close(&mut self, force: bool) {
        let mut state = self.state.lock();
        if let Some(session) = state.session_mut(self.id) {
            if session.closed {
                return;
            }
            session.closed = true;
            session.connected = false;
            if !force {
                session.emit(TransportEventKind::Closed);
            }
        }
    }
}

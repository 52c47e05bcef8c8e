//! Broker session lifecycle.
//!
//! The manager owns at most one live [`Session`]. Transports report back on
//! an event channel; the owner of the channel feeds every event to
//! [`ConnectionManager::handle_event`] on one task, in arrival order. Events
//! tagged with any other session id than the live one are dropped, which is
//! what keeps a late callback from a torn-down session out of the feed.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::{
    generate_client_id, BrokerConfig, InboundRecord, LifecycleState, Session, SessionId,
    TransportEvent, TransportEventKind,
};
use crate::metrics::{MetricsRecorder, NoOpMetrics};
use crate::ports::{BrokerSession, BrokerTransport, ConnectOptions, EventSender};

/// Outcome of [`ConnectionManager::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new session was opened.
    Started(SessionId),
    /// A session was already live or connecting; nothing was done.
    AlreadyActive(SessionId),
    /// The transport refused to open a session. See `last_error`.
    Failed,
}

/// A session together with the transport handle that drives it.
struct ActiveSession {
    session: Session,
    handle: Box<dyn BrokerSession>,
}

/// Maintains exactly one broker session for the lifetime of a view.
pub struct ConnectionManager<T: BrokerTransport> {
    config: BrokerConfig,
    transport: T,
    events: EventSender,
    active: Option<ActiveSession>,
    state: LifecycleState,
    last_error: Option<String>,
    metrics: Arc<dyn MetricsRecorder>,
}

impl<T: BrokerTransport> ConnectionManager<T> {
    /// Create a manager. No connection is made until [`start`](Self::start).
    pub fn new(config: BrokerConfig, transport: T, events: EventSender) -> Self {
        Self {
            config,
            transport,
            events,
            active: None,
            state: LifecycleState::Disconnected,
            last_error: None,
            metrics: Arc::new(NoOpMetrics),
        }
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Open a session unless one is already live or connecting.
    ///
    /// Never fails upward: a refused connect leaves the manager
    /// `Disconnected` with `last_error` set.
    pub fn start(&mut self) -> StartOutcome {
        if let Some(active) = &self.active {
            debug!(session = %active.session.id(), "Session already active, start ignored");
            return StartOutcome::AlreadyActive(active.session.id());
        }

        let session = Session::new(
            generate_client_id(&self.config.client_id_prefix),
            self.config.url.clone(),
            self.config.topics.clone(),
        );
        let options = ConnectOptions {
            session: session.id(),
            endpoint: self.config.url.clone(),
            client_id: session.client_id().to_string(),
            clean_session: self.config.clean_session,
            connect_timeout: self.config.connect_timeout,
            keep_alive: self.config.keep_alive,
            reconnect_interval: self.config.reconnect_interval,
        };

        self.state = LifecycleState::Connecting;
        self.last_error = None;
        self.metrics.record_connect_attempt();

        match self.transport.connect(options, self.events.clone()) {
            Ok(handle) => {
                let id = session.id();
                info!(
                    session = %id,
                    client_id = %session.client_id(),
                    endpoint = %session.endpoint(),
                    "Connecting to broker"
                );
                self.active = Some(ActiveSession { session, handle });
                StartOutcome::Started(id)
            }
            Err(e) => {
                warn!(error = %e, "Failed to connect");
                self.state = LifecycleState::Disconnected;
                self.last_error = Some(format!("Failed to establish connection: {}", e));
                self.metrics.record_connection_error();
                StartOutcome::Failed
            }
        }
    }

    /// Force-close the live session, if any.
    ///
    /// Afterwards no event from that session is accepted, and the next
    /// [`start`](Self::start) opens a clean session.
    pub fn stop(&mut self) {
        if let Some(mut active) = self.active.take() {
            info!(session = %active.session.id(), "Closing broker session");
            active.handle.close(true);
        }
        self.state = LifecycleState::Disconnected;
    }

    /// Apply one transport event.
    ///
    /// Returns the record to hand to the normalizer when the event is a
    /// message of the live session.
    pub fn handle_event(&mut self, event: TransportEvent) -> Option<InboundRecord> {
        let Some(active) = self.active.as_mut() else {
            debug!(session = %event.session, kind = event.kind.name(), "No live session, event dropped");
            self.metrics.record_late_event();
            return None;
        };

        if active.session.id() != event.session {
            debug!(
                session = %event.session,
                live = %active.session.id(),
                kind = event.kind.name(),
                "Event from stale session dropped"
            );
            self.metrics.record_late_event();
            return None;
        }

        match event.kind {
            TransportEventKind::Connected => {
                info!(session = %event.session, "Connected to broker");
                active.session.mark_connected();
                self.state = LifecycleState::Connected;
                self.metrics.record_connected();

                for topic in active.session.topics() {
                    if let Err(e) = active.handle.subscribe(topic) {
                        warn!(topic = %topic, error = %e, "Subscription request failed");
                        self.last_error = Some(format!("Subscription failed: {}", e));
                        self.metrics.record_subscribe_failure();
                    }
                }
                None
            }
            TransportEventKind::Subscribed { topic } => {
                info!(topic = %topic, "Subscribed");
                active.session.mark_subscribed(&topic);
                None
            }
            TransportEventKind::SubscribeFailed { topic, reason } => {
                warn!(topic = %topic, reason = %reason, "Subscription rejected");
                self.last_error = Some(format!("Subscription failed: {}: {}", topic, reason));
                self.metrics.record_subscribe_failure();
                None
            }
            TransportEventKind::Message { topic, payload } => {
                debug!(topic = %topic, bytes = payload.len(), "Received message");
                Some(InboundRecord { topic, payload })
            }
            TransportEventKind::Error(message) => {
                warn!(error = %message, "Broker connection error");
                active.session.mark_lost(LifecycleState::Disconnected);
                self.state = LifecycleState::Disconnected;
                self.last_error = Some(format!("Connection error: {}", message));
                self.metrics.record_connection_error();
                None
            }
            TransportEventKind::Offline => {
                info!("Broker connection offline");
                active.session.mark_lost(LifecycleState::Disconnected);
                self.state = LifecycleState::Disconnected;
                None
            }
            TransportEventKind::Reconnecting => {
                info!("Reconnecting to broker");
                active.session.set_state(LifecycleState::Connecting);
                self.state = LifecycleState::Connecting;
                self.metrics.record_reconnect();
                None
            }
            TransportEventKind::Closed => {
                info!("Broker session closed");
                active.session.mark_lost(LifecycleState::Disconnected);
                self.state = LifecycleState::Disconnected;
                None
            }
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// The live session, if one is open.
    pub fn session(&self) -> Option<&Session> {
        self.active.as_ref().map(|a| &a.session)
    }

    /// Whether a session is live or connecting.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }
}

impl<T: BrokerTransport> Drop for ConnectionManager<T> {
    fn drop(&mut self) {
        self.stop();
    }
}

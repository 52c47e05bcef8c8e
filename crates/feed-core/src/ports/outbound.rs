//! Outbound Ports (Driven Ports)
//!
//! The publish/subscribe client capability the connection manager depends on.
//! Implementations run their own I/O and report back through an
//! [`EventSender`]; they never call into the manager directly.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::domain::{SessionId, TransportEvent};
use crate::error::TransportError;

/// Channel on which a transport reports session events.
///
/// Unbounded: messages are never dropped or throttled on the way in.
pub type EventSender = mpsc::UnboundedSender<TransportEvent>;

/// Receiving half of [`EventSender`].
pub type EventReceiver = mpsc::UnboundedReceiver<TransportEvent>;

/// Everything a transport needs to open one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Id to tag every emitted event with
    pub session: SessionId,
    pub endpoint: String,
    /// Unique per session
    pub client_id: String,
    pub clean_session: bool,
    /// Bound on the initial connect only
    pub connect_timeout: Duration,
    pub keep_alive: Duration,
    /// Fixed delay before each reconnect attempt
    pub reconnect_interval: Duration,
}

/// Broker client factory (Driven Port).
pub trait BrokerTransport: Send + Sync {
    /// Open a session against `options.endpoint`.
    ///
    /// Returns as soon as the attempt is under way; the outcome arrives as a
    /// `Connected` or `Error` event on `events`. Reconnects after unexpected
    /// loss are the transport's job.
    fn connect(
        &self,
        options: ConnectOptions,
        events: EventSender,
    ) -> Result<Box<dyn BrokerSession>, TransportError>;
}

/// Handle to one open session.
pub trait BrokerSession: Send {
    /// Request a subscription. The broker's answer arrives as a
    /// `Subscribed` or `SubscribeFailed` event.
    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError>;

    /// Close the session. With `force` the connection is dropped without
    /// waiting for in-flight work. No events are emitted after this returns
    /// except, at most, one `Closed`.
    fn close(&mut self, force: bool);
}

impl<T: BrokerTransport + ?Sized> BrokerTransport for Box<T> {
    fn connect(
        &self,
        options: ConnectOptions,
        events: EventSender,
    ) -> Result<Box<dyn BrokerSession>, TransportError> {
        (**self).connect(options, events)
    }
}

impl<T: BrokerTransport + ?Sized> BrokerTransport for std::sync::Arc<T> {
    fn connect(
        &self,
        options: ConnectOptions,
        events: EventSender,
    ) -> Result<Box<dyn BrokerSession>, TransportError> {
        (**self).connect(options, events)
    }
}

//! The live feed: connection manager, feed store and the channel between them.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::{BrokerConfig, FeedEntry, LifecycleState, Session, TransportEvent};
use crate::metrics::MetricsRecorder;
use crate::ports::{BrokerTransport, EventReceiver, FeedView};

use super::connection_manager::{ConnectionManager, StartOutcome};
use super::feed_store::FeedStore;

/// A broker-backed, append-only message feed.
///
/// All state changes happen on the task that owns the `LiveFeed`: the
/// transport only pushes events onto the channel, and
/// [`drain_events`](Self::drain_events) or [`next_event`](Self::next_event)
/// applies them one at a time in arrival order.
pub struct LiveFeed<T: BrokerTransport> {
    manager: ConnectionManager<T>,
    store: FeedStore,
    events: EventReceiver,
}

impl<T: BrokerTransport> LiveFeed<T> {
    pub fn new(config: BrokerConfig, transport: T) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            manager: ConnectionManager::new(config, transport, tx),
            store: FeedStore::new(),
            events: rx,
        }
    }

    /// Share one recorder between the manager and the store.
    #[must_use]
    pub fn with_metrics(self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        Self {
            manager: self.manager.with_metrics(metrics.clone()),
            store: self.store.with_metrics(metrics),
            events: self.events,
        }
    }

    /// Open the session. A no-op while one is live or connecting.
    pub fn start(&mut self) -> StartOutcome {
        self.manager.start()
    }

    /// Force-close the session. Queued events from it will be discarded.
    pub fn stop(&mut self) {
        self.manager.stop();
    }

    /// Tear the session down and open a clean one.
    pub fn restart(&mut self) -> StartOutcome {
        self.manager.stop();
        self.manager.start()
    }

    /// Apply one event. Returns `true` if it appended a feed entry.
    pub fn handle_event(&mut self, event: TransportEvent) -> bool {
        match self.manager.handle_event(event) {
            Some(record) => {
                self.store.append(&record);
                true
            }
            None => false,
        }
    }

    /// Apply every event already queued without waiting.
    ///
    /// Returns the number of entries appended.
    pub fn drain_events(&mut self) -> usize {
        let mut appended = 0;
        while let Ok(event) = self.events.try_recv() {
            if self.handle_event(event) {
                appended += 1;
            }
        }
        if appended > 0 {
            debug!(appended, total = self.store.len(), "Drained transport events");
        }
        appended
    }

    /// Wait for the next event and apply it.
    ///
    /// Returns `None` only if every sender is gone, which cannot happen while
    /// the manager is alive.
    pub async fn next_event(&mut self) -> Option<bool> {
        let event = self.events.recv().await?;
        Some(self.handle_event(event))
    }

    pub fn manager(&self) -> &ConnectionManager<T> {
        &self.manager
    }

    pub fn store(&self) -> &FeedStore {
        &self.store
    }
}

impl<T: BrokerTransport> FeedView for LiveFeed<T> {
    fn entries(&self) -> &[FeedEntry] {
        self.store.entries()
    }

    fn status(&self) -> LifecycleState {
        self.manager.state()
    }

    fn last_error(&self) -> Option<&str> {
        self.manager.last_error()
    }

    fn session(&self) -> Option<&Session> {
        self.manager.session()
    }

    fn endpoint(&self) -> &str {
        &self.manager.config().url
    }

    fn topics(&self) -> &[String] {
        &self.manager.config().topics
    }

    fn clear(&mut self) {
        self.store.clear();
        self.manager.clear_error();
    }
}

//! Cross-module flows: connection manager, normalizer and feed store driven
//! together through the event channel, against the in-memory broker.

pub mod feed_flows;
pub mod telemetry_init;

use feed_core::{BrokerConfig, FeedView, InMemoryTransport, LiveFeed};

/// A feed on the default three-line config, connected and subscribed.
pub fn connected_feed() -> (LiveFeed<InMemoryTransport>, InMemoryTransport) {
    connected_feed_with(BrokerConfig::default())
}

pub fn connected_feed_with(
    config: BrokerConfig,
) -> (LiveFeed<InMemoryTransport>, InMemoryTransport) {
    let broker = InMemoryTransport::new();
    let mut feed = LiveFeed::new(config, broker.clone());
    feed.start();
    broker.complete_connect();
    feed.drain_events();
    debug_assert!(feed.session().is_some());
    (feed, broker)
}

//! Service layer: the connection manager, the feed store and the live feed
//! that wires them together.

pub mod connection_manager;
pub mod feed_store;
pub mod live_feed;

pub use connection_manager::{ConnectionManager, StartOutcome};
pub use feed_store::FeedStore;
pub use live_feed::LiveFeed;

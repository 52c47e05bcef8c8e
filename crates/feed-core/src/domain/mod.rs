//! Domain layer: pure types, no I/O.

pub mod config;
pub mod events;
pub mod feed;
pub mod payload;
pub mod session;

pub use config::{
    BrokerConfig, DEFAULT_BROKER_URL, DEFAULT_CLIENT_ID_PREFIX, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_KEEP_ALIVE, DEFAULT_RECONNECT_INTERVAL, SINGLE_LINE_TOPICS, THREE_LINE_TOPICS,
};
pub use events::{InboundRecord, TransportEvent, TransportEventKind};
pub use feed::FeedEntry;
pub use payload::{DecodedPayload, FeedValue, StructuredPayload};
pub use session::{generate_client_id, LifecycleState, Session, SessionId};

//! # Feed Core
//!
//! Live agent message feed: one broker session, a payload normalizer and an
//! append-only feed for presentation.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure types, no I/O
//!   - `BrokerConfig`: Endpoint, topic set and timeouts, with validation
//!   - `Session` / `SessionId` / `LifecycleState`: Connection identity and status
//!   - `DecodedPayload`: Tagged decode result (primitive or structured)
//!   - `FeedEntry`: Immutable, user-visible feed unit
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `FeedView`: Driving port (presentation boundary)
//!   - `BrokerTransport` / `BrokerSession`: Driven port (publish/subscribe client)
//!
//! - **Service Layer** (`service/`): Orchestration
//!   - `ConnectionManager`: Single-session lifecycle, late-event guard
//!   - `FeedStore`: Normalize and append
//!   - `LiveFeed`: Wires both to the event channel, implements `FeedView`
//!
//! - **Adapters Layer** (`adapters/`): External connections
//!   - `MqttTransport`: MQTT over `ws://` / `wss://`
//!   - `InMemoryTransport`: Scripted broker for tests and demos
//!
//! ## Invariants
//!
//! - At most one live session per manager; `start()` is idempotent.
//! - Every message of the live session becomes exactly one feed entry, in
//!   arrival order. Nothing is deduplicated, capped or reordered.
//! - After `stop()`, no event of the closed session reaches the feed.
//! - Transport and decode failures never panic; they surface as status and
//!   `last_error` text, or as a plain-text entry.
//!
//! ## Usage Example
//!
//! ```ignore
//! use feed_core::{BrokerConfig, FeedView, LiveFeed, MqttTransport};
//!
//! let config = BrokerConfig::default().with_env_overrides();
//! config.validate()?;
//!
//! let mut feed = LiveFeed::new(config, MqttTransport::new());
//! feed.start();
//!
//! loop {
//!     feed.next_event().await;
//!     for entry in feed.entries() {
//!         println!("{} {}", entry.time_label(), entry.output().render());
//!     }
//! }
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports for convenience
pub use adapters::{InMemoryTransport, MqttTransport};
pub use domain::{
    generate_client_id, BrokerConfig, DecodedPayload, FeedEntry, FeedValue, InboundRecord,
    LifecycleState, Session, SessionId, StructuredPayload, TransportEvent, TransportEventKind,
    DEFAULT_BROKER_URL, SINGLE_LINE_TOPICS, THREE_LINE_TOPICS,
};
pub use error::{ConfigError, TransportError};
pub use metrics::{Metrics, MetricsRecorder, MetricsSnapshot, NoOpMetrics};
pub use ports::{
    BrokerSession, BrokerTransport, ConnectOptions, EventReceiver, EventSender, FeedView,
};
pub use service::{ConnectionManager, FeedStore, LiveFeed, StartOutcome};

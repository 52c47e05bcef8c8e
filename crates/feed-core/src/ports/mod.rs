//! Ports layer: trait seams between the live feed and the outside world.

pub mod inbound;
pub mod outbound;

pub use inbound::FeedView;
pub use outbound::{BrokerSession, BrokerTransport, ConnectOptions, EventReceiver, EventSender};

//! Adapters layer: concrete broker transports.
//!
//! - `mqtt`: MQTT over WebSocket via `rumqttc`
//! - `memory`: scripted in-process broker for tests and demo mode

pub mod memory;
pub mod mqtt;

pub use memory::InMemoryTransport;
pub use mqtt::MqttTransport;

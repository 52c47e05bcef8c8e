//! Demo mode: an in-process broker fed with sample agent messages.

use std::time::Duration;

use feed_core::InMemoryTransport;
use serde_json::json;
use tokio::task::JoinHandle;
use tracing::info;

/// Every this many messages the demo broker drops the connection once.
const DROP_EVERY: u64 = 25;

/// Sample payload number `seq`, cycling through the shapes a real agent sends.
pub fn demo_payload(seq: u64) -> String {
    match seq % 4 {
        0 => json!({
            "raw_output": format!("Step {}: reading line sensors", seq),
            "input": "check throughput",
        })
        .to_string(),
        1 => json!({
            "raw_output": {
                "thought": "throughput below target",
                "action": "inspect_station",
                "station": seq % 7,
            },
            "input": { "query": "why is line slow?", "turn": seq },
        })
        .to_string(),
        2 => json!({ "status": "idle", "seq": seq }).to_string(),
        _ => format!("plain text heartbeat {}", seq),
    }
}

/// Publish a sample message to the topics in turn every `interval`.
///
/// Now and then the connection is dropped and re-established, so the
/// reconnect path shows up on screen too.
pub fn spawn_publisher(
    broker: InMemoryTransport,
    topics: Vec<String>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(topics = topics.len(), "Demo publisher started");
        let mut ticker = tokio::time::interval(interval);
        let mut seq: u64 = 0;

        loop {
            ticker.tick().await;
            if topics.is_empty() {
                continue;
            }

            if seq > 0 && seq % DROP_EVERY == 0 {
                broker.drop_connection("demo: simulated network loss");
                ticker.tick().await;
                broker.complete_connect();
                ticker.tick().await;
            }

            let topic = &topics[(seq as usize) % topics.len()];
            broker.publish(topic, demo_payload(seq));
            seq += 1;
        }
    })
}

//! # Agent Feed Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | Normalizer | Decode structured, plain-text and unknown-object payloads |
//! | Feed Store | Append throughput |
//! | Live Feed | Publish, drain and append through the event channel |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use feed_core::{
    BrokerConfig, DecodedPayload, FeedStore, FeedView, InMemoryTransport, InboundRecord, LiveFeed,
    THREE_LINE_TOPICS,
};
use serde_json::json;
use std::time::Duration;

fn sample_payloads() -> Vec<(&'static str, String)> {
    vec![
        (
            "structured",
            json!({
                "raw_output": {"thought": "throughput below target", "steps": [1, 2, 3]},
                "input": {"query": "why is line 2 slow?"},
            })
            .to_string(),
        ),
        (
            "text_fields",
            json!({"raw_output": "checking sensors", "input": "status"}).to_string(),
        ),
        ("plain_text", "agent heartbeat, nothing to report".to_string()),
        ("unknown_object", json!({"status": "idle", "seq": 42}).to_string()),
    ]
}

// ============================================================================
// Normalizer
// ============================================================================

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalizer-decode");
    group.measurement_time(Duration::from_secs(5));

    for (name, payload) in sample_payloads() {
        group.bench_with_input(BenchmarkId::new("decode", name), &payload, |b, p| {
            b.iter(|| black_box(DecodedPayload::decode(p).into_output_input()))
        });
    }

    group.finish();
}

// ============================================================================
// Feed Store
// ============================================================================

fn bench_store_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("feed-store-append");

    let records: Vec<InboundRecord> = sample_payloads()
        .into_iter()
        .cycle()
        .take(1_000)
        .enumerate()
        .map(|(i, (_, p))| InboundRecord::new(THREE_LINE_TOPICS[i % 3], p))
        .collect();

    for size in [100usize, 1_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("append", size), &size, |b, &size| {
            b.iter(|| {
                let mut store = FeedStore::new();
                for record in &records[..size] {
                    store.append(record);
                }
                black_box(store.len())
            })
        });
    }

    group.finish();
}

// ============================================================================
// Live Feed
// ============================================================================

fn bench_live_feed_pump(c: &mut Criterion) {
    let mut group = c.benchmark_group("live-feed-pump");
    let payload = sample_payloads()[1].1.clone();

    for batch in [10usize, 500] {
        group.throughput(Throughput::Elements(batch as u64));
        group.bench_with_input(BenchmarkId::new("publish_drain", batch), &batch, |b, &batch| {
            let broker = InMemoryTransport::new();
            let mut feed = LiveFeed::new(BrokerConfig::default(), broker.clone());
            feed.start();
            broker.complete_connect();
            feed.drain_events();

            b.iter(|| {
                for i in 0..batch {
                    broker.publish(THREE_LINE_TOPICS[i % 3], payload.clone());
                }
                let appended = feed.drain_events();
                feed.clear();
                black_box(appended)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_decode,
    bench_store_append,
    bench_live_feed_pump
);
criterion_main!(benches);

//! # Feed Flows
//!
//! End-to-end behaviour of the live feed against the in-memory broker:
//!
//! 1. **Delivery**: every message of the live session becomes one entry, in order
//! 2. **Single session**: repeated `start()` never opens a second session
//! 3. **Normalization**: structured, plain-text and unknown-object payloads
//! 4. **Clear**: empties the feed, keeps the session
//! 5. **Teardown**: nothing from a stopped session reaches the feed
//! 6. **Failures**: connect, transport and subscribe errors stay non-fatal

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use bytes::Bytes;
    use serde_json::json;
    use tokio::time::timeout;

    use feed_core::{
        BrokerConfig, FeedValue, FeedView, InMemoryTransport, LifecycleState, LiveFeed, Metrics,
        MetricsRecorder, StartOutcome, TransportEventKind, THREE_LINE_TOPICS,
    };

    use crate::integration::{connected_feed, connected_feed_with};

    const LINE1: &str = "yangzhi/line1/agent/output/message";
    const LINE2: &str = "yangzhi/line2/agent/output/message";

    // =============================================================================
    // DELIVERY
    // =============================================================================

    #[test]
    fn test_entry_count_and_order_match_delivery() {
        let (mut feed, broker) = connected_feed();

        let mut delivered = Vec::new();
        for i in 0..300 {
            let topic = THREE_LINE_TOPICS[i % 3];
            let payload = format!("message {}", i);
            assert_eq!(broker.publish(topic, payload.clone()), 1);
            delivered.push((topic.to_string(), payload));

            // drain at irregular points; batching must not matter
            if i % 7 == 0 {
                feed.drain_events();
            }
        }
        feed.drain_events();

        let entries = feed.entries();
        assert_eq!(entries.len(), delivered.len());
        for (entry, (topic, payload)) in entries.iter().zip(&delivered) {
            assert_eq!(entry.topic(), topic);
            assert_eq!(entry.output(), &FeedValue::Text(payload.clone()));
        }
    }

    #[test]
    fn test_duplicate_payloads_are_not_collapsed() {
        let (mut feed, broker) = connected_feed();
        for _ in 0..5 {
            broker.publish(LINE1, r#"{"raw_output": "same"}"#);
        }
        feed.drain_events();
        assert_eq!(feed.entries().len(), 5);
    }

    #[test]
    fn test_capture_time_is_monotonic() {
        let (mut feed, broker) = connected_feed();
        for i in 0..20 {
            broker.publish(LINE2, json!({"raw_output": i, "timestamp": 0}).to_string());
        }
        feed.drain_events();

        let times: Vec<_> = feed.entries().iter().map(|e| e.received_at()).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_no_topic_filtering() {
        let (mut feed, broker) = connected_feed();
        let live = feed.session().unwrap().id();

        broker.inject(
            live,
            TransportEventKind::Message {
                topic: "some/other/topic".into(),
                payload: Bytes::from_static(b"stray"),
            },
        );
        feed.drain_events();
        assert_eq!(feed.entries()[0].topic(), "some/other/topic");
    }

    // =============================================================================
    // SINGLE SESSION
    // =============================================================================

    #[test]
    fn test_double_start_yields_one_session() {
        let broker = InMemoryTransport::new();
        let mut feed = LiveFeed::new(BrokerConfig::default(), broker.clone());

        let first = feed.start();
        let second = feed.start();
        let StartOutcome::Started(id) = first else {
            panic!("first start must open a session");
        };
        assert_eq!(second, StartOutcome::AlreadyActive(id));

        broker.complete_connect();
        feed.drain_events();
        // start again while connected
        feed.start();
        feed.drain_events();

        assert_eq!(broker.connect_count(), 1);
        assert_eq!(broker.subscriptions(id).len(), 3);

        broker.publish(LINE1, "once");
        feed.drain_events();
        assert_eq!(feed.entries().len(), 1);
    }

    #[test]
    fn test_every_session_gets_fresh_identity() {
        let broker = InMemoryTransport::new();
        let mut feed = LiveFeed::new(BrokerConfig::default(), broker.clone());

        let mut client_ids = Vec::new();
        for _ in 0..5 {
            feed.restart();
            let id = broker.last_session().unwrap();
            client_ids.push(broker.connect_options(id).unwrap().client_id);
        }
        client_ids.sort();
        client_ids.dedup();
        assert_eq!(client_ids.len(), 5);
        assert_eq!(broker.open_sessions(), 1);
    }

    #[test]
    fn test_connect_options_follow_config() {
        let config = BrokerConfig {
            connect_timeout: Duration::from_millis(4000),
            reconnect_interval: Duration::from_millis(1000),
            ..BrokerConfig::default()
        };
        let (feed, broker) = connected_feed_with(config);
        let opts = broker
            .connect_options(feed.session().unwrap().id())
            .unwrap();

        assert!(opts.clean_session);
        assert_eq!(opts.connect_timeout, Duration::from_millis(4000));
        assert_eq!(opts.reconnect_interval, Duration::from_millis(1000));
        assert_eq!(opts.keep_alive, Duration::from_secs(60));
        assert!(opts.client_id.starts_with("agent_feed_"));
    }

    // =============================================================================
    // NORMALIZATION
    // =============================================================================

    #[test]
    fn test_structured_round_trip() {
        let (mut feed, broker) = connected_feed();
        broker.publish(LINE2, r#"{"raw_output": "x", "input": "y"}"#);
        feed.drain_events();

        let entry = &feed.entries()[0];
        assert_eq!(entry.topic(), "yangzhi/line2/agent/output/message");
        assert_eq!(entry.output(), &FeedValue::Text("x".into()));
        assert_eq!(entry.input(), Some(&FeedValue::Text("y".into())));
    }

    #[test]
    fn test_plain_text_fallback() {
        let (mut feed, broker) = connected_feed();
        broker.publish(LINE1, "plain text");
        feed.drain_events();

        let entry = &feed.entries()[0];
        assert_eq!(entry.output(), &FeedValue::Text("plain text".into()));
        assert!(entry.input().is_none());
    }

    #[test]
    fn test_unknown_object_fallback() {
        let (mut feed, broker) = connected_feed();
        broker.publish(LINE1, r#"{"foo": 1}"#);
        feed.drain_events();

        let entry = &feed.entries()[0];
        assert_eq!(entry.output(), &FeedValue::Structured(json!({"foo": 1})));
        assert!(entry.input().is_none());
    }

    #[test]
    fn test_empty_fields_fall_back_to_whole_object() {
        let (mut feed, broker) = connected_feed();
        broker.publish(LINE1, r#"{"raw_output": "", "input": ""}"#);
        feed.drain_events();

        let entry = &feed.entries()[0];
        assert_eq!(
            entry.output(),
            &FeedValue::Structured(json!({"raw_output": "", "input": ""}))
        );
        assert!(entry.input().is_none());
    }

    #[test]
    fn test_nested_values_kept_whole() {
        let (mut feed, broker) = connected_feed();
        let payload = json!({
            "raw_output": {"plan": ["a", "b"], "depth": {"n": 2}},
            "input": {"messages": [{"role": "user", "content": "hi"}]},
            "extra": true,
        });
        broker.publish(LINE1, payload.to_string());
        feed.drain_events();

        let entry = &feed.entries()[0];
        assert_eq!(
            entry.output(),
            &FeedValue::Structured(payload["raw_output"].clone())
        );
        assert_eq!(
            entry.input(),
            Some(&FeedValue::Structured(payload["input"].clone()))
        );
    }

    #[test]
    fn test_invalid_utf8_still_appends() {
        let (mut feed, broker) = connected_feed();
        broker.publish(LINE1, vec![0xF0, 0x28, 0x8C, 0x28]);
        feed.drain_events();

        assert_eq!(feed.entries().len(), 1);
        assert!(!feed.entries()[0].output().is_structured());
        assert!(feed.last_error().is_none());
    }

    // =============================================================================
    // CLEAR
    // =============================================================================

    #[test]
    fn test_clear_resets_feed_but_not_session() {
        let (mut feed, broker) = connected_feed();
        for i in 0..10 {
            broker.publish(LINE1, format!("m{}", i));
        }
        feed.drain_events();
        let session = feed.session().unwrap().id();

        feed.clear();
        assert!(feed.entries().is_empty());
        assert_eq!(feed.session().unwrap().id(), session);
        assert_eq!(feed.status(), LifecycleState::Connected);
        assert!(!broker.is_closed(session));

        broker.publish(LINE1, "after clear");
        feed.drain_events();
        assert_eq!(feed.entries().len(), 1);
        assert_eq!(
            feed.entries()[0].output(),
            &FeedValue::Text("after clear".into())
        );
    }

    #[test]
    fn test_clear_dismisses_error_banner() {
        let broker = InMemoryTransport::new();
        broker.reject_topic(LINE2, "not authorized");
        let mut feed = LiveFeed::new(BrokerConfig::default(), broker.clone());
        feed.start();
        broker.complete_connect();
        feed.drain_events();
        assert!(feed.last_error().is_some());

        feed.clear();
        assert!(feed.last_error().is_none());
    }

    // =============================================================================
    // TEARDOWN
    // =============================================================================

    #[test]
    fn test_no_appends_after_stop() {
        let metrics = Arc::new(Metrics::new());
        let broker = InMemoryTransport::new();
        let mut feed = LiveFeed::new(BrokerConfig::default(), broker.clone())
            .with_metrics(metrics.clone() as Arc<dyn MetricsRecorder>);
        feed.start();
        broker.complete_connect();
        feed.drain_events();
        let old = feed.session().unwrap().id();

        // queued before stop, delivered after
        broker.publish(LINE1, "in flight");
        feed.stop();
        assert!(broker.is_closed(old));
        assert_eq!(broker.publish(LINE1, "after close"), 0);

        // a late callback from the torn-down session
        broker.inject(
            old,
            TransportEventKind::Message {
                topic: LINE1.into(),
                payload: Bytes::from_static(b"late"),
            },
        );
        broker.inject(old, TransportEventKind::Connected);
        feed.drain_events();

        assert!(feed.entries().is_empty());
        assert_eq!(feed.status(), LifecycleState::Disconnected);
        assert!(feed.session().is_none());
        assert_eq!(metrics.snapshot().late_events_dropped, 3);
    }

    #[test]
    fn test_restart_ignores_previous_session() {
        let (mut feed, broker) = connected_feed();
        let old = feed.session().unwrap().id();

        feed.restart();
        let new = feed.session().unwrap().id();
        broker.inject(old, TransportEventKind::Connected);
        broker.inject(old, TransportEventKind::Error("stale".into()));
        broker.inject(
            old,
            TransportEventKind::Message {
                topic: LINE1.into(),
                payload: Bytes::from_static(b"stale"),
            },
        );
        feed.drain_events();

        assert_eq!(feed.status(), LifecycleState::Connecting);
        assert!(feed.last_error().is_none());
        assert!(feed.entries().is_empty());

        broker.complete_connect();
        feed.drain_events();
        assert_eq!(feed.status(), LifecycleState::Connected);
        assert_eq!(broker.subscriptions(new).len(), 3);
    }

    #[test]
    fn test_drop_closes_session() {
        let (feed, broker) = connected_feed();
        let id = feed.session().unwrap().id();
        assert!(!broker.is_closed(id));

        drop(feed);
        assert!(broker.is_closed(id));
        assert_eq!(broker.open_sessions(), 0);
    }

    // =============================================================================
    // FAILURES
    // =============================================================================

    #[test]
    fn test_connect_failure_is_reported_not_thrown() {
        let broker = InMemoryTransport::new();
        broker.fail_next_connect("connection refused");
        let mut feed = LiveFeed::new(BrokerConfig::default(), broker.clone());

        assert_eq!(feed.start(), StartOutcome::Failed);
        assert_eq!(feed.status(), LifecycleState::Disconnected);
        assert_eq!(
            feed.last_error(),
            Some("Failed to establish connection: connect failed: connection refused")
        );

        // the guard was released; the next start opens a session
        assert!(matches!(feed.start(), StartOutcome::Started(_)));
    }

    #[test]
    fn test_transport_loss_and_recovery() {
        let (mut feed, broker) = connected_feed();
        broker.publish(LINE1, "before");
        broker.drop_connection("network unreachable");
        feed.drain_events();

        // error, offline, reconnecting: ends in connecting, error kept
        assert_eq!(feed.status(), LifecycleState::Connecting);
        assert_eq!(
            feed.last_error(),
            Some("Connection error: network unreachable")
        );
        assert!(feed.session().unwrap().subscribed().is_empty());

        broker.complete_connect();
        feed.drain_events();
        assert_eq!(feed.status(), LifecycleState::Connected);
        assert_eq!(feed.session().unwrap().subscribed().len(), 3);

        broker.publish(LINE1, "after");
        feed.drain_events();
        assert_eq!(feed.entries().len(), 2);
    }

    #[test]
    fn test_subscribe_failure_is_per_topic() {
        let broker = InMemoryTransport::new();
        broker.reject_topic(LINE2, "not authorized");
        let mut feed = LiveFeed::new(BrokerConfig::default(), broker.clone());
        feed.start();
        broker.complete_connect();
        feed.drain_events();

        let session = feed.session().unwrap();
        assert_eq!(session.subscribed().len(), 2);
        assert!(!session.subscribed().contains(LINE2));
        assert_eq!(feed.status(), LifecycleState::Connected);
        assert!(feed.last_error().unwrap().contains(LINE2));

        broker.publish(LINE1, "still flowing");
        feed.drain_events();
        assert_eq!(feed.entries().len(), 1);
    }

    // =============================================================================
    // ASYNC PUMP
    // =============================================================================

    #[tokio::test]
    async fn test_publisher_task_feeds_next_event() {
        let (mut feed, broker) = connected_feed();

        let publisher = tokio::spawn(async move {
            for i in 0..50 {
                broker.publish(THREE_LINE_TOPICS[i % 3], format!("{}", i));
                tokio::task::yield_now().await;
            }
        });

        let collected = timeout(Duration::from_secs(5), async {
            while feed.entries().len() < 50 {
                feed.next_event().await;
            }
        })
        .await;
        assert!(collected.is_ok());
        publisher.await.unwrap();

        let outputs: Vec<_> = feed
            .entries()
            .iter()
            .map(|e| e.output().render())
            .collect();
        let expected: Vec<_> = (0..50).map(|i| i.to_string()).collect();
        assert_eq!(outputs, expected);
    }
}

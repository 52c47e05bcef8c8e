//! Global subscriber installation.
//!
//! Only this module installs a subscriber in the test binary; it can happen
//! once per process.

#[cfg(test)]
mod tests {
    use feed_core::{BrokerConfig, FeedView, InMemoryTransport, LiveFeed};
    use feed_telemetry::{init_telemetry, log_feed_event, LogSink, TelemetryConfig};

    #[test]
    fn test_file_logging_captures_feed_activity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.log");

        let mut config = TelemetryConfig::default().with_log_file(&path);
        config.log_level = "debug".to_string();
        let guard = init_telemetry(config).unwrap();
        assert_eq!(guard.sink(), &LogSink::File(path.clone()));

        let broker = InMemoryTransport::new();
        let mut feed = LiveFeed::new(BrokerConfig::single_line(), broker.clone());
        feed.start();
        broker.complete_connect();
        feed.drain_events();
        broker.publish("yangzhi/line1/agent/output/message", "hello");
        feed.drain_events();
        log_feed_event!(info, "dashboard", "Rendered", entries = feed.entries().len());

        // a second install must fail rather than replace the first
        assert!(init_telemetry(TelemetryConfig::default()).is_err());

        let logged = std::fs::read_to_string(&path).unwrap();
        assert!(logged.contains("Connected to broker"));
        assert!(logged.contains("Subscribed"));
        assert!(logged.contains("Received message"));
        assert!(logged.contains("component=\"dashboard\""));
    }
}

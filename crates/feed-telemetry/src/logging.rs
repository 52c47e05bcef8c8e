//! Structured log helpers.
//!
//! Every line logged through these macros carries a `component` field
//! (`connection`, `feed`, `dashboard`, ...) so JSON logs can be filtered
//! per component.

/// Log with a `component` field.
///
/// ```rust,ignore
/// log_feed_event!(info, "connection", "Subscribed", topic = %topic);
/// ```
#[macro_export]
macro_rules! log_feed_event {
    ($level:ident, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a session-related event with the session id attached.
#[macro_export]
macro_rules! log_session_event {
    ($level:ident, $component:expr, $msg:expr, $session:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            session = %$session,
            $($($field)*,)?
            $msg
        )
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_macros_expand_without_subscriber() {
        let topic = "yangzhi/line1/agent/output/message";
        log_feed_event!(info, "connection", "Subscribed", topic = %topic);
        log_feed_event!(debug, "feed", "Cleared");
        log_session_event!(warn, "connection", "Session lost", "3f2a9c1e", reason = "timeout");
    }
}

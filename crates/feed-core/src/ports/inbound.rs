//! Inbound Ports (Driving Ports)
//!
//! What the presentation layer may do with a live feed: read the entries,
//! the connection status and the last error, and ask for the feed to be
//! cleared. Nothing else flows back into the core.

use crate::domain::{FeedEntry, LifecycleState, Session};

/// Presentation boundary of the live feed.
pub trait FeedView {
    /// Entries in arrival order.
    fn entries(&self) -> &[FeedEntry];

    fn status(&self) -> LifecycleState;

    /// Text for the error banner, if any.
    fn last_error(&self) -> Option<&str>;

    /// The live session, if one is open.
    fn session(&self) -> Option<&Session>;

    /// Configured broker endpoint.
    fn endpoint(&self) -> &str;

    /// Configured topic set.
    fn topics(&self) -> &[String];

    /// Empty the feed and the error banner. The session stays open.
    fn clear(&mut self);
}

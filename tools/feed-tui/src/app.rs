//! Application state management.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use feed_core::{BrokerTransport, FeedView, LiveFeed, Metrics, MetricsSnapshot, StartOutcome};
use feed_telemetry::{log_feed_event, log_session_event};

use crate::ui::format;

/// Lines moved by PgUp / PgDn.
const PAGE_LINES: usize = 10;

/// Dashboard state: the live feed plus view-only scroll state.
pub struct App<T: BrokerTransport> {
    /// The feed; the only thing this app sends back into it is `clear`.
    pub feed: LiveFeed<T>,

    /// Shared counters, shown in the footer.
    metrics: Arc<Metrics>,

    /// Broker port for the info panel.
    pub port: Option<u16>,

    /// Lines scrolled back from the newest entry. Zero means follow.
    pub scroll_back: usize,

    /// Whether the app should quit.
    pub should_quit: bool,

    /// Application start time.
    pub start_time: Instant,
}

impl<T: BrokerTransport> App<T> {
    /// Create a new application instance.
    pub fn new(feed: LiveFeed<T>, metrics: Arc<Metrics>, port: Option<u16>) -> Self {
        Self {
            feed,
            metrics,
            port,
            scroll_back: 0,
            should_quit: false,
            start_time: Instant::now(),
        }
    }

    /// Open the broker session.
    pub fn connect(&mut self) {
        match self.feed.start() {
            StartOutcome::Started(session) | StartOutcome::AlreadyActive(session) => {
                log_session_event!(info, "dashboard", "Feed session opened", session);
            }
            StartOutcome::Failed => {
                log_feed_event!(
                    warn,
                    "dashboard",
                    "Feed session could not be opened",
                    error = ?self.feed.last_error()
                );
            }
        }
    }

    /// Pull queued transport events into the feed.
    ///
    /// While the operator is scrolled back, the view is kept on the same
    /// lines by growing the offset with the newly appended entries.
    pub fn tick(&mut self) -> usize {
        let before = self.feed.entries().len();
        let appended = self.feed.drain_events();

        if self.scroll_back > 0 {
            self.scroll_back += self.feed.entries()[before..]
                .iter()
                .map(format::entry_height)
                .sum::<usize>();
        }
        appended
    }

    pub fn following(&self) -> bool {
        self.scroll_back == 0
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Get uptime duration.
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Format uptime as human-readable string.
    pub fn uptime_str(&self) -> String {
        let secs = self.uptime().as_secs();
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;

        if hours > 0 {
            format!("{}h {}m", hours, mins)
        } else {
            format!("{}m {}s", mins, secs % 60)
        }
    }

    /// Handle key press events.
    pub fn on_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                log_feed_event!(
                    info,
                    "dashboard",
                    "Feed cleared by operator",
                    entries = self.feed.entries().len()
                );
                self.feed.clear();
                self.scroll_back = 0;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll_back = self.scroll_back.saturating_add(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll_back = self.scroll_back.saturating_sub(1);
            }
            KeyCode::PageUp => {
                self.scroll_back = self.scroll_back.saturating_add(PAGE_LINES);
            }
            KeyCode::PageDown => {
                self.scroll_back = self.scroll_back.saturating_sub(PAGE_LINES);
            }
            KeyCode::End => {
                self.scroll_back = 0;
            }
            _ => {}
        }
    }

    /// Clamp the scroll offset to what the last frame could show.
    pub fn clamp_scroll(&mut self, max_offset: usize) {
        self.scroll_back = self.scroll_back.min(max_offset);
    }
}

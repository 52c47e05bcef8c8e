//! feed-tui: terminal dashboard for the live agent message feed.
//!
//! Subscribes to the agent output topics on the broker and renders each
//! message as it arrives. The dashboard only reads the feed; the one command
//! it sends back is "clear".
//!
//! ## Usage
//!
//! ```bash
//! # Default broker, three production lines
//! feed-tui
//!
//! # Single line, custom broker
//! feed-tui --single-line --url ws://broker.local:8083/mqtt
//!
//! # No broker at all: in-process sample messages
//! feed-tui --demo
//! ```

mod app;
mod demo;
mod ui;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use feed_core::{
    BrokerConfig, BrokerTransport, InMemoryTransport, LiveFeed, Metrics, MetricsRecorder,
    MqttTransport, SINGLE_LINE_TOPICS,
};
use feed_telemetry::{init_telemetry, TelemetryConfig};
use ratatui::prelude::*;
use tracing::info;

use app::App;

/// Live agent message feed
#[derive(Parser, Debug)]
#[command(name = "feed-tui")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Broker WebSocket URL (ws:// or wss://)
    #[arg(long)]
    url: Option<String>,

    /// Topic to subscribe to; repeat for several. Replaces the default set.
    #[arg(long = "topic")]
    topics: Vec<String>,

    /// Subscribe to the single-line topic only
    #[arg(long, conflicts_with = "topics")]
    single_line: bool,

    /// TOML file with broker settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run against an in-process broker publishing sample messages
    #[arg(long)]
    demo: bool,

    /// UI refresh interval in milliseconds
    #[arg(long, default_value = "100")]
    tick_ms: u64,

    /// Log file (the terminal belongs to the dashboard)
    #[arg(long, default_value = "feed-tui.log")]
    log_file: PathBuf,
}

impl Args {
    /// Resolve the broker configuration: file or defaults, then environment,
    /// then command-line flags.
    fn broker_config(&self) -> Result<BrokerConfig> {
        let mut config = match &self.config {
            Some(path) => BrokerConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => BrokerConfig::default(),
        }
        .with_env_overrides();

        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        if self.single_line {
            config.topics = SINGLE_LINE_TOPICS.iter().map(|t| t.to_string()).collect();
        } else if !self.topics.is_empty() {
            config.topics = self.topics.clone();
        }

        config.validate().context("invalid broker configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.broker_config()?;

    let _telemetry = init_telemetry(
        TelemetryConfig::for_tool("feed-tui").with_log_file(args.log_file.clone()),
    )?;
    info!(endpoint = %config.url, topics = ?config.topics, demo = args.demo, "Starting feed-tui");

    let tick = Duration::from_millis(args.tick_ms.max(10));
    let metrics = Arc::new(Metrics::new());
    let port = config.endpoint_port().ok();

    if args.demo {
        let broker = InMemoryTransport::with_auto_connect();
        let publisher =
            demo::spawn_publisher(broker.clone(), config.topics.clone(), Duration::from_millis(1500));
        let feed = LiveFeed::new(config, broker)
            .with_metrics(metrics.clone() as Arc<dyn MetricsRecorder>);
        let result = run(App::new(feed, metrics, port), tick).await;
        publisher.abort();
        result
    } else {
        let feed = LiveFeed::new(config, MqttTransport::new())
            .with_metrics(metrics.clone() as Arc<dyn MetricsRecorder>);
        run(App::new(feed, metrics, port), tick).await
    }
}

/// Own the terminal for the lifetime of the dashboard.
async fn run<T: BrokerTransport>(mut app: App<T>, tick: Duration) -> Result<()> {
    // Setup terminal with panic hook for cleanup
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        // Attempt terminal cleanup on panic
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.connect();

    // Run the app
    let result = run_app(&mut terminal, &mut app, tick).await;

    // Close the session before giving the terminal back
    app.feed.stop();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        eprintln!("Error: {}", e);
    }
    info!(entries = app.metrics().messages_received, "feed-tui stopped");

    result
}

/// Main application loop.
async fn run_app<B: Backend, T: BrokerTransport>(
    terminal: &mut Terminal<B>,
    app: &mut App<T>,
    tick: Duration,
) -> Result<()> {
    loop {
        // Apply transport events (non-blocking)
        app.tick();

        // Draw UI
        terminal.draw(|frame| ui::render(frame, app))?;

        // Handle terminal events with timeout
        handle_terminal_events(app, tick)?;

        if app.should_quit {
            return Ok(());
        }

        // Let the broker event loop run between frames
        tokio::task::yield_now().await;
    }
}

/// Handle terminal key events.
fn handle_terminal_events<T: BrokerTransport>(app: &mut App<T>, poll_timeout: Duration) -> Result<()> {
    if !event::poll(poll_timeout)? {
        return Ok(());
    }

    let Event::Key(key) = event::read()? else {
        return Ok(());
    };

    if key.kind != KeyEventKind::Press {
        return Ok(());
    }

    app.on_key(key.code);
    Ok(())
}

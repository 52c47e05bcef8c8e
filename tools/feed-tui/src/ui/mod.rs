//! UI module for TUI rendering.

pub mod feed;
pub mod format;

use feed_core::{BrokerTransport, FeedView};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;

/// Render the dashboard.
pub fn render<T: BrokerTransport>(frame: &mut Frame, app: &mut App<T>) {
    let error_height = if app.feed.last_error().is_some() { 3 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                  // Header
            Constraint::Length(5),                  // Connection info
            Constraint::Length(error_height),       // Error banner
            Constraint::Min(6),                     // Messages
            Constraint::Length(3),                  // Footer
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_connection_info(frame, app, chunks[1]);
    if let Some(error) = app.feed.last_error() {
        render_error(frame, error, chunks[2]);
    }
    feed::render_messages(frame, app, chunks[3]);
    render_footer(frame, app, chunks[4]);
}

/// Render the header bar.
fn render_header<T: BrokerTransport>(frame: &mut Frame, app: &App<T>, area: Rect) {
    let state = app.feed.status();

    let header = Paragraph::new(Line::from(vec![
        Span::raw(" Status: "),
        Span::styled(
            format!("{} {}", format::status_symbol(state), state.label()),
            Style::default()
                .fg(format::status_color(state))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("    Uptime: "),
        Span::styled(app.uptime_str(), Style::default().fg(Color::Cyan)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", format::TITLE)),
    );

    frame.render_widget(header, area);
}

/// Render broker URL, port and topics.
fn render_connection_info<T: BrokerTransport>(frame: &mut Frame, app: &App<T>, area: Rect) {
    let port = app
        .port
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string());
    let session = app
        .feed
        .session()
        .map(|s| format!("{} ({})", s.client_id(), s.id().short()))
        .unwrap_or_else(|| "none".to_string());

    let text = vec![
        Line::from(vec![
            Span::raw(" Broker:  "),
            Span::styled(app.feed.endpoint().to_string(), Style::default().fg(Color::White)),
            Span::raw("   Port: "),
            Span::styled(port, Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            Span::raw(" Topics:  "),
            Span::styled(app.feed.topics().join(", "), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(vec![
            Span::raw(" Client:  "),
            Span::styled(session, Style::default().fg(Color::DarkGray)),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" CONNECTION ")
        .border_style(Style::default().fg(Color::Blue));

    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn render_error(frame: &mut Frame, error: &str, area: Rect) {
    let banner = Paragraph::new(Line::from(Span::styled(
        format!(" {}", format::error_banner(error)),
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );

    frame.render_widget(banner, area);
}

/// Render the footer bar.
fn render_footer<T: BrokerTransport>(frame: &mut Frame, app: &App<T>, area: Rect) {
    let metrics = app.metrics();
    let follow = if app.following() { "following" } else { "paused" };

    let footer = Paragraph::new(Line::from(vec![
        Span::styled(" [C] ", Style::default().fg(Color::Yellow)),
        Span::raw("Clear  "),
        Span::styled("[↑↓/PgUp/PgDn] ", Style::default().fg(Color::Yellow)),
        Span::raw("Scroll  "),
        Span::styled("[End] ", Style::default().fg(Color::Yellow)),
        Span::raw("Follow  "),
        Span::styled("[Q] ", Style::default().fg(Color::Yellow)),
        Span::raw("Quit  "),
        Span::raw("│ "),
        Span::styled(
            format!(
                "{}  reconnects {}  errors {}",
                follow, metrics.reconnect_attempts, metrics.connection_errors
            ),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}

//! Message panel.

use feed_core::{BrokerTransport, FeedView};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::format;
use crate::app::App;

/// Render the feed, newest at the bottom.
///
/// In follow mode the panel shows the last lines; otherwise it is offset
/// upwards by `scroll_back` lines, clamped to the content.
pub fn render_messages<T: BrokerTransport>(frame: &mut Frame, app: &mut App<T>, area: Rect) {
    let entries = app.feed.entries();
    let title = format!(" MESSAGES ─ {} ", format::message_count_label(entries.len()));
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::Green));

    if entries.is_empty() {
        let placeholder = Paragraph::new(Line::from(Span::styled(
            format!(" {}", format::EMPTY_FEED),
            Style::default().fg(Color::DarkGray),
        )))
        .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let lines: Vec<Line<'static>> = entries
        .iter()
        .enumerate()
        .flat_map(|(i, entry)| format::entry_lines(i, entry))
        .collect();

    let visible = usize::from(area.height.saturating_sub(2));
    let max_offset = lines.len().saturating_sub(visible);
    app.clamp_scroll(max_offset);
    let offset = max_offset - app.scroll_back;

    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((u16::try_from(offset).unwrap_or(u16::MAX), 0));
    frame.render_widget(paragraph, area);
}

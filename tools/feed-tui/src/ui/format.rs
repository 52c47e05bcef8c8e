//! Text shaping for feed entries.
//!
//! Kept free of terminal state so the layout of an entry can be computed (and
//! tested) without a frame.

use feed_core::{FeedEntry, FeedValue, LifecycleState};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

pub const TITLE: &str = "Agent Thinking Protocol";
pub const EMPTY_FEED: &str = "Waiting for agent messages...";
pub const OUTPUT_LABEL: &str = "RAW OUTPUT";
pub const INPUT_LABEL: &str = "INPUT";

/// Indicator colour for a connection state.
pub fn status_color(state: LifecycleState) -> Color {
    match state {
        LifecycleState::Connected => Color::Green,
        LifecycleState::Connecting => Color::Yellow,
        LifecycleState::Disconnected => Color::Red,
    }
}

pub fn status_symbol(state: LifecycleState) -> &'static str {
    match state {
        LifecycleState::Connected => "●",
        LifecycleState::Connecting => "◐",
        LifecycleState::Disconnected => "○",
    }
}

/// `"N message(s) received"`
pub fn message_count_label(count: usize) -> String {
    format!("{} message(s) received", count)
}

/// `"Error: <text>"`
pub fn error_banner(error: &str) -> String {
    format!("Error: {}", error)
}

/// Display lines of a value: strings verbatim, structured values as
/// indented JSON. Always at least one line.
pub fn value_lines(value: &FeedValue) -> Vec<String> {
    let rendered = value.render();
    let lines: Vec<String> = rendered.lines().map(str::to_string).collect();
    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}

/// Lines for one entry, separator included.
///
/// `index` is zero-based; the header shows it one-based.
pub fn entry_lines(index: usize, entry: &FeedEntry) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!(" {} ", entry.time_label()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("#{}", index + 1),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(entry.topic().to_string(), Style::default().fg(Color::Cyan)),
    ])];

    push_block(&mut lines, OUTPUT_LABEL, Color::Green, entry.output());
    if let Some(input) = entry.input() {
        push_block(&mut lines, INPUT_LABEL, Color::Blue, input);
    }

    lines.push(Line::from(""));
    lines
}

fn push_block(lines: &mut Vec<Line<'static>>, label: &str, color: Color, value: &FeedValue) {
    lines.push(Line::from(Span::styled(
        format!("   {}", label),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )));
    let style = if value.is_structured() {
        Style::default().fg(Color::Gray)
    } else {
        Style::default()
    };
    lines.extend(
        value_lines(value)
            .into_iter()
            .map(|l| Line::from(Span::styled(format!("   │ {}", l), style))),
    );
}

/// Number of lines [`entry_lines`] produces for `entry`.
pub fn entry_height(entry: &FeedEntry) -> usize {
    // header, output label, output lines, separator
    let mut height = 3 + value_lines(entry.output()).len();
    if let Some(input) = entry.input() {
        height += 1 + value_lines(input).len();
    }
    height
}

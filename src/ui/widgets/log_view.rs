// src/ui/widgets/log_view.rs

use crate::app::App;
use ratatui::{
    prelude::*,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation},
};

/// Splits a log line into its `DATE TIME` prefix and the rest.
fn split_timestamp(line: &str) -> Option<(String, &str)> {
    let mut parts = line.splitn(3, ' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(date), Some(time), Some(rest)) => Some((format!("{} {}", date, time), rest)),
        _ => None,
    }
}

fn level_color(rest: &str) -> Color {
    match rest.split_whitespace().next() {
        Some("ERROR") => Color::Red,
        Some("WARN") => Color::Yellow,
        Some("DEBUG") | Some("TRACE") => Color::DarkGray,
        _ => Color::Reset,
    }
}

/// Renders the tail of the log file with a horizontal scrollbar for long lines.
pub fn render_log_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .title("Logs (scroll with ← →)")
        .borders(Borders::ALL);
    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let max_width = app
        .log_content
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0);
    app.log_horizontal_scroll_state = app.log_horizontal_scroll_state.content_length(max_width);

    // Newest lines at the bottom; keep only what fits.
    let visible = inner_area.height.saturating_sub(1) as usize;
    let start = app.log_content.len().saturating_sub(visible);

    let log_lines: Vec<Line> = app.log_content[start..]
        .iter()
        .map(|line_str| match split_timestamp(line_str) {
            Some((timestamp, rest)) => Line::from(vec![
                Span::styled(timestamp, Style::default().fg(Color::DarkGray)),
                Span::styled(format!(" {}", rest), Style::default().fg(level_color(rest))),
            ]),
            None => Line::from(line_str.as_str()),
        })
        .collect();

    let log_paragraph = Paragraph::new(log_lines).scroll((0, app.log_horizontal_scroll as u16));
    frame.render_widget(log_paragraph, inner_area);

    let scrollbar = Scrollbar::new(ScrollbarOrientation::HorizontalBottom).thumb_symbol("■");
    let scrollbar_area = Rect {
        x: inner_area.x,
        y: inner_area.y + inner_area.height.saturating_sub(1),
        width: inner_area.width,
        height: 1,
    };
    frame.render_stateful_widget(
        scrollbar,
        scrollbar_area,
        &mut app.log_horizontal_scroll_state,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_is_split_from_message() {
        let (ts, rest) = split_timestamp("2026-10-17 09:15:02  INFO Scan complete.").unwrap();
        assert_eq!(ts, "2026-10-17 09:15:02");
        assert_eq!(rest, " INFO Scan complete.");
        assert_eq!(level_color(rest), Color::Reset);
        assert!(split_timestamp("garbage").is_none());
    }

    #[test]
    fn levels_are_colored() {
        assert_eq!(level_color(" ERROR boom"), Color::Red);
        assert_eq!(level_color("WARN careful"), Color::Yellow);
    }
}

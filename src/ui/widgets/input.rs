// src/ui/widgets/input.rs

use crate::app::{App, AppState};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

/// Renders the target input box.
pub fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let title = match &app.ports {
        Some(ports) => format!("Target Host ({} ports)", ports.len()),
        None => format!("Target Host ({} default ports)", app.config.default_ports.len()),
    };
    let input_block = Block::default().borders(Borders::ALL).title(title);
    let input_paragraph = Paragraph::new(app.input.as_str())
        .block(input_block)
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(input_paragraph, area);

    // Cursor only while typing.
    if app.state == AppState::Idle {
        frame.set_cursor_position((area.x + app.input.chars().count() as u16 + 1, area.y + 1));
    }
}

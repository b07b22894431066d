// src/ui/layout.rs

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Screen regions of the terminal UI.
pub struct AppLayout {
    pub input: Rect,
    pub report: Rect,
    pub summary: Rect,
    pub footer: Rect,
    pub log_panel: Rect,
}

/// Splits the frame into input bar, content row and footer.
///
/// The content row holds the findings view and the summary, plus the log
/// panel when it is toggled on. `log_panel` is an empty `Rect` otherwise.
pub fn create_layout(frame_size: Rect, show_logs: bool) -> AppLayout {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame_size);

    let content_constraints = if show_logs {
        vec![
            Constraint::Percentage(45),
            Constraint::Percentage(22),
            Constraint::Percentage(33),
        ]
    } else {
        vec![Constraint::Percentage(68), Constraint::Percentage(32)]
    };

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(content_constraints)
        .split(main_chunks[1]);

    AppLayout {
        input: main_chunks[0],
        report: content_chunks[0],
        summary: content_chunks[1],
        log_panel: if show_logs { content_chunks[2] } else { Rect::default() },
        footer: main_chunks[2],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_panel_only_when_toggled() {
        let area = Rect::new(0, 0, 120, 40);
        let hidden = create_layout(area, false);
        assert_eq!(hidden.log_panel, Rect::default());
        assert_eq!(hidden.input.height, 3);
        assert_eq!(hidden.footer.height, 1);

        let shown = create_layout(area, true);
        assert!(shown.log_panel.width > 0);
        assert!(shown.report.width < hidden.report.width);
    }
}

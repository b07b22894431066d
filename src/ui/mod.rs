// src/ui/mod.rs

use crate::app::App;
use ratatui::prelude::*;

mod layout;
mod widgets;

pub fn render(app: &mut App, frame: &mut Frame) {
    let layout = layout::create_layout(frame.area(), app.show_logs);

    widgets::input::render_input(frame, app, layout.input);
    widgets::findings_view::render_findings_view(frame, app, layout.report);
    widgets::summary::render_summary(frame, app, layout.summary);
    if app.show_logs {
        widgets::log_view::render_log_view(frame, app, layout.log_panel);
    }
    widgets::footer::render_footer(frame, app, layout.footer);
}

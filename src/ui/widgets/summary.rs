// src/ui/widgets/summary.rs

use super::risk_color;
use crate::app::{App, AppState};
use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, Gauge, Paragraph},
};

/// Score at which the gauge is full; anything above is CRITICAL anyway.
const GAUGE_CEILING: f64 = 10.0;

/// Renders the overall score, risk level, loss estimate and level counts.
///
/// Nothing is drawn inside the panel until a scan has finished.
pub fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let summary_container = Block::default().borders(Borders::ALL).title("Summary");
    frame.render_widget(summary_container, area);

    let summary_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Score & level
            Constraint::Length(1), // Gauge
            Constraint::Length(1), // Spacer
            Constraint::Length(4), // Exposure
            Constraint::Length(1), // Spacer
            Constraint::Min(0),    // Ports by level
        ])
        .split(area);

    if app.state != AppState::Finished {
        return;
    }

    if let Some(error) = &app.scan_error {
        let text = Text::from(vec![
            Line::from("SCAN FAILED".bold().fg(Color::Red)),
            Line::from(""),
            Line::from(error.as_str()),
        ]);
        frame.render_widget(
            Paragraph::new(text).wrap(ratatui::widgets::Wrap { trim: true }),
            summary_chunks[0].union(summary_chunks[5]),
        );
        return;
    }

    let summary = &app.summary;
    let level_style = Style::default().fg(risk_color(summary.overall_risk_level)).bold();

    // --- Score & Level ---
    let score_text = Text::from(vec![
        Line::from("Overall Risk".bold()),
        Line::from(vec![
            Span::styled(summary.overall_risk_level.to_string(), level_style),
            Span::raw(format!("  ({:.2})", summary.overall_score)),
        ]),
    ]);
    frame.render_widget(
        Paragraph::new(score_text).alignment(Alignment::Center),
        summary_chunks[0],
    );

    let ratio = (summary.overall_score / GAUGE_CEILING).clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .ratio(ratio)
        .label("")
        .style(Style::default().fg(risk_color(summary.overall_risk_level)));
    frame.render_widget(gauge, summary_chunks[1]);

    // --- Exposure ---
    let loss = &summary.loss_range;
    let exposure = Text::from(vec![
        Line::from(vec![
            Span::raw("Open ports: "),
            Span::styled(summary.open_ports.to_string(), Style::default().bold()),
        ]),
        Line::from(vec![Span::raw("Est. loss:  "), Span::raw(loss.label.clone())]),
        Line::from(format!(
            "  ${:.0} - ${:.0}",
            loss.loss_usd.min, loss.loss_usd.max
        )),
    ]);
    frame.render_widget(
        Paragraph::new(exposure).block(Block::default().title("EXPOSURE".bold())),
        summary_chunks[3],
    );

    // --- Ports by Level ---
    let count_lines: Vec<Line> = summary
        .level_counts
        .iter()
        .rev()
        .map(|(level, count)| {
            Line::from(vec![
                Span::styled(
                    format!("{:<9}", level.to_string()),
                    Style::default().fg(risk_color(*level)),
                ),
                Span::raw(count.to_string()),
            ])
        })
        .collect();
    frame.render_widget(
        Paragraph::new(count_lines).block(Block::default().title("PORTS BY LEVEL".bold())),
        summary_chunks[5],
    );
}

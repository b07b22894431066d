// src/ui/widgets/findings_view.rs

use super::risk_color;
use crate::app::{App, AppState, SPINNER_CHARS};
use crate::core::models::ScanFinding;
use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

pub fn render_findings_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let main_block = Block::default()
        .borders(Borders::ALL)
        .title("Findings (Navigate with ↑ ↓)");

    if app.state != AppState::Finished || app.scan_error.is_some() {
        let content = match app.state {
            AppState::Idle => Paragraph::new("Enter a host and press Enter to start the scan.")
                .alignment(Alignment::Center),
            AppState::Scanning => {
                let spinner_char = SPINNER_CHARS[app.spinner_frame];
                Paragraph::new(Line::from(vec![
                    Span::styled(format!("{} ", spinner_char), Style::default().fg(Color::Cyan)),
                    Span::raw("Probing ports and fingerprinting services..."),
                ]))
                .alignment(Alignment::Center)
            }
            AppState::Finished => Paragraph::new("No report available.")
                .alignment(Alignment::Center),
        };
        frame.render_widget(content.block(main_block), area);
        return;
    }

    let inner_area = main_block.inner(area);
    frame.render_widget(main_block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(35), Constraint::Min(0)])
        .split(inner_area);

    let items: Vec<ListItem> = app
        .findings()
        .iter()
        .map(|f| {
            let level_style = Style::default().fg(risk_color(f.risk_level));
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<9}", f.risk_level.to_string()), level_style),
                Span::raw(format!("{:>5}/tcp ", f.port)),
                Span::styled(format!("{:<12}", f.service), Style::default().fg(Color::DarkGray)),
                Span::raw(format!("score {:.2}", f.score)),
            ]))
        })
        .collect();

    let findings_list = List::new(items)
        .block(Block::default())
        .highlight_style(Style::new().bg(Color::DarkGray).add_modifier(Modifier::BOLD));
    frame.render_stateful_widget(findings_list, chunks[0], &mut app.findings_list_state);

    let detail_block = Block::default().borders(Borders::TOP).title("Details");
    match app.selected_finding() {
        Some(finding) => {
            let p = Paragraph::new(detail_text(finding))
                .wrap(Wrap { trim: true })
                .block(detail_block);
            frame.render_widget(p, chunks[1]);
        }
        None => render_placeholder_details(frame, detail_block, chunks[1]),
    }
}

fn detail_text(finding: &ScanFinding) -> Text<'_> {
    let b = &finding.breakdown;
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                finding.risk_level.to_string(),
                Style::default().fg(risk_color(finding.risk_level)).bold(),
            ),
            Span::raw(format!(
                "  port {} ({})  est. loss {}",
                finding.port, finding.service, finding.loss_range.label
            )),
        ]),
        Line::from(format!(
            "score {:.2} = port {:.2} + headers {:.2} + disclosure {:.2} + rules {:.2}",
            finding.score, b.port, b.headers, b.disclosure, b.findings
        ))
        .fg(Color::DarkGray),
        Line::from(""),
    ];

    lines.push(Line::from("WHY:".yellow().bold()));
    if finding.reasons.is_empty() {
        lines.push(Line::from("  No rule matched this service."));
    }
    for reason in &finding.reasons {
        lines.push(Line::from(format!("  - {}", reason)));
    }

    if !finding.recommendations.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from("HOW TO FIX:".yellow().bold()));
        for rec in &finding.recommendations {
            lines.push(Line::from(format!("  * {}", rec.title)).bold());
            lines.push(Line::from(format!("    {}", rec.fix)));
            for reference in rec.references {
                lines.push(Line::from(format!("    {}", reference)).fg(Color::Blue));
            }
        }
    }

    Text::from(lines)
}

fn render_placeholder_details(frame: &mut Frame, block: Block, area: Rect) {
    let placeholder_text = Text::from(vec![
        Line::from(""),
        Line::from("✓ NO OPEN PORTS".bold().fg(Color::Green)),
        Line::from(""),
        Line::from("None of the probed ports accepted a connection."),
    ]);

    let p = Paragraph::new(placeholder_text)
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(p, area);
}

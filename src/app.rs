// src/app.rs

use crate::config::RiskConfig;
use crate::core::error::RedinkError;
use crate::core::models::{LossRange, RiskLevel, ScanFinding, ScanReport};
use crate::logging;
use ratatui::widgets::{ListState, ScrollbarState};
use std::sync::Arc;

pub const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Lines of the log file kept in the log panel.
const LOG_TAIL_LINES: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Idle,
    Scanning,
    Finished,
}

/// Figures shown in the summary panel, derived once per finished report.
#[derive(Debug, Clone)]
pub struct ScanSummary {
    pub overall_score: f64,
    pub overall_risk_level: RiskLevel,
    pub loss_range: LossRange,
    pub open_ports: usize,
    pub level_counts: [(RiskLevel, usize); 4],
}

impl Default for ScanSummary {
    fn default() -> Self {
        Self {
            overall_score: 0.0,
            overall_risk_level: RiskLevel::None,
            loss_range: LossRange::unknown(),
            open_ports: 0,
            level_counts: [
                (RiskLevel::Low, 0),
                (RiskLevel::Medium, 0),
                (RiskLevel::High, 0),
                (RiskLevel::Critical, 0),
            ],
        }
    }
}

pub struct App {
    pub should_quit: bool,
    pub state: AppState,
    pub input: String,
    pub config: Arc<RiskConfig>,
    pub ports: Option<Vec<u16>>,
    pub scan_report: Option<ScanReport>,
    pub scan_error: Option<String>,
    pub summary: ScanSummary,
    pub findings_list_state: ListState,
    pub spinner_frame: usize,
    pub show_logs: bool,
    pub log_content: Vec<String>,
    pub log_horizontal_scroll: usize,
    pub log_horizontal_scroll_state: ScrollbarState,
}

impl App {
    pub fn new(config: Arc<RiskConfig>, ports: Option<Vec<u16>>) -> Self {
        Self {
            should_quit: false,
            state: AppState::Idle,
            input: String::new(),
            config,
            ports,
            scan_report: None,
            scan_error: None,
            summary: ScanSummary::default(),
            findings_list_state: ListState::default(),
            spinner_frame: 0,
            show_logs: false,
            log_content: Vec::new(),
            log_horizontal_scroll: 0,
            log_horizontal_scroll_state: ScrollbarState::default(),
        }
    }

    /// Marks the scan as started and returns the target to scan, or `None`
    /// when the input is blank.
    pub fn start_scan(&mut self) -> Option<String> {
        let target = self.input.trim().to_string();
        if target.is_empty() {
            return None;
        }
        self.state = AppState::Scanning;
        self.scan_report = None;
        self.scan_error = None;
        Some(target)
    }

    pub fn finish_scan(&mut self, outcome: Result<ScanReport, RedinkError>) {
        match outcome {
            Ok(report) => {
                self.findings_list_state
                    .select(if report.findings.is_empty() { None } else { Some(0) });
                self.scan_report = Some(report);
                self.scan_error = None;
            }
            Err(e) => {
                self.findings_list_state.select(None);
                self.scan_report = None;
                self.scan_error = Some(e.to_string());
            }
        }
        self.state = AppState::Finished;
        self.update_summary();
        self.refresh_logs();
    }

    pub fn update_summary(&mut self) {
        self.summary = match &self.scan_report {
            Some(report) => ScanSummary {
                overall_score: report.overall_score,
                overall_risk_level: report.overall_risk_level,
                loss_range: report.overall_loss_range.clone(),
                open_ports: report.open_port_count,
                level_counts: report.level_counts(),
            },
            None => ScanSummary::default(),
        };
    }

    pub fn findings(&self) -> &[ScanFinding] {
        self.scan_report
            .as_ref()
            .map(|r| r.findings.as_slice())
            .unwrap_or(&[])
    }

    pub fn selected_finding(&self) -> Option<&ScanFinding> {
        self.findings_list_state
            .selected()
            .and_then(|i| self.findings().get(i))
    }

    pub fn select_next(&mut self) {
        let len = self.findings().len();
        if len == 0 {
            return;
        }
        let next = match self.findings_list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            Some(_) => 0,
            None => 0,
        };
        self.findings_list_state.select(Some(next));
    }

    pub fn select_previous(&mut self) {
        let len = self.findings().len();
        if len == 0 {
            return;
        }
        let previous = match self.findings_list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.findings_list_state.select(Some(previous));
    }

    pub fn toggle_logs(&mut self) {
        self.show_logs = !self.show_logs;
        if self.show_logs {
            self.refresh_logs();
        }
    }

    pub fn refresh_logs(&mut self) {
        if self.show_logs {
            self.log_content = logging::tail_log(LOG_TAIL_LINES);
        }
    }

    pub fn scroll_logs_left(&mut self) {
        self.log_horizontal_scroll = self.log_horizontal_scroll.saturating_sub(4);
        self.log_horizontal_scroll_state = self
            .log_horizontal_scroll_state
            .position(self.log_horizontal_scroll);
    }

    pub fn scroll_logs_right(&mut self) {
        self.log_horizontal_scroll = self.log_horizontal_scroll.saturating_add(4);
        self.log_horizontal_scroll_state = self
            .log_horizontal_scroll_state
            .position(self.log_horizontal_scroll);
    }

    pub fn on_tick(&mut self) {
        if self.state == AppState::Scanning {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_CHARS.len();
            self.refresh_logs();
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn reset(&mut self) {
        self.state = AppState::Idle;
        self.input = String::new();
        self.scan_report = None;
        self.scan_error = None;
        self.summary = ScanSummary::default();
        self.findings_list_state = ListState::default();
        self.spinner_frame = 0;
        self.log_horizontal_scroll = 0;
        self.log_horizontal_scroll_state = ScrollbarState::default();
    }
}

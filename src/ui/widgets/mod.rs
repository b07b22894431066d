// src/ui/widgets/mod.rs

pub mod findings_view; // Per-port findings list and detail pane.
pub mod footer;
pub mod input;
pub mod log_view;
pub mod summary;

use crate::core::models::RiskLevel;
use ratatui::style::Color;

/// Color used for a risk level everywhere in the UI.
pub fn risk_color(level: RiskLevel) -> Color {
    match level {
        RiskLevel::None => Color::Green,
        RiskLevel::Low => Color::Cyan,
        RiskLevel::Medium => Color::Yellow,
        RiskLevel::High => Color::LightRed,
        RiskLevel::Critical => Color::Red,
        RiskLevel::Unknown => Color::DarkGray,
    }
}

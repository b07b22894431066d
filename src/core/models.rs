// src/core/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::IpAddr;
use strum::{Display, EnumIter, EnumString};

use crate::core::knowledge_base::Recommendation;

// --- Port Probing ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PortStatus {
    Open,
    Closed,
}

/// Outcome of one connection attempt against one candidate port.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PortProbeResult {
    pub port: u16,
    pub status: PortStatus,
}

impl PortProbeResult {
    pub fn is_open(&self) -> bool {
        self.status == PortStatus::Open
    }
}

// --- Fingerprinting ---

/// Evidence gathered from one open port.
///
/// `headers` only ever holds the security-relevant subset of the HTTP response
/// headers, keyed by their canonical names. `error` is set when fingerprinting
/// the port failed and the evidence is therefore empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceFingerprint {
    pub port: u16,
    pub service: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceFingerprint {
    pub fn new(port: u16, service: impl Into<String>) -> Self {
        Self {
            port,
            service: service.into(),
            headers: BTreeMap::new(),
            server: None,
            status_code: None,
            banner: None,
            error: None,
        }
    }

    /// Case-insensitive header presence check.
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.keys().any(|h| h.eq_ignore_ascii_case(name))
    }
}

// --- Rule Output ---

/// Evidence that one rule matched one fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Finding {
    pub rule_id: String,
    pub service: String,
    pub evidence: String,
}

impl Finding {
    pub fn new(rule_id: &str, service: &str, evidence: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            service: service.to_string(),
            evidence: evidence.into(),
        }
    }
}

// --- Risk Classification ---

/// Ordinal risk classification derived from a numeric score.
///
/// `None` is reserved for a report with no open ports and `Unknown` for a
/// score that could not be classified.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum RiskLevel {
    #[serde(rename = "none")]
    #[strum(serialize = "none")]
    None,
    #[serde(rename = "LOW")]
    #[strum(serialize = "LOW")]
    Low,
    #[serde(rename = "MEDIUM")]
    #[strum(serialize = "MEDIUM")]
    Medium,
    #[serde(rename = "HIGH")]
    #[strum(serialize = "HIGH")]
    High,
    #[serde(rename = "CRITICAL")]
    #[strum(serialize = "CRITICAL")]
    Critical,
    #[serde(rename = "unknown")]
    #[strum(serialize = "unknown")]
    Unknown,
}

impl RiskLevel {
    /// Key used to look the level up in the `risk_ranges` table.
    pub fn key(&self) -> String {
        self.to_string().to_lowercase()
    }

    /// Position on the LOW..CRITICAL scale; `None` ranks below everything and
    /// `Unknown` has no rank.
    pub fn rank(&self) -> Option<u8> {
        match self {
            RiskLevel::None => Some(0),
            RiskLevel::Low => Some(1),
            RiskLevel::Medium => Some(2),
            RiskLevel::High => Some(3),
            RiskLevel::Critical => Some(4),
            RiskLevel::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct LossAmount {
    pub min: f64,
    pub max: f64,
}

/// A labeled monetary estimate associated with a risk level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LossRange {
    pub label: String,
    pub loss_usd: LossAmount,
}

impl LossRange {
    pub fn new(label: &str, min: f64, max: f64) -> Self {
        Self {
            label: label.to_string(),
            loss_usd: LossAmount { min, max },
        }
    }

    /// Placeholder returned for levels missing from the configuration.
    pub fn unknown() -> Self {
        Self::new("Unknown", 0.0, 0.0)
    }
}

// --- Scoring Output ---

/// The four contributions folded into a finding's total score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ScoreBreakdown {
    pub port: f64,
    pub headers: f64,
    pub disclosure: f64,
    pub findings: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.port + self.headers + self.disclosure + self.findings
    }
}

/// Scored, classified result for one open port.
#[derive(Debug, Clone, Serialize)]
pub struct ScanFinding {
    pub port: u16,
    pub service: String,
    pub score: f64,
    pub risk_level: RiskLevel,
    pub loss_range: LossRange,
    pub breakdown: ScoreBreakdown,
    pub triggered_rule_ids: Vec<String>,
    pub reasons: Vec<String>,
    pub recommendations: Vec<Recommendation>,
}

// --- Main Report ---

/// Aggregate report for one target. Built through
/// [`ReportBuilder`](crate::core::engine::ReportBuilder) and immutable once
/// finished.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_address: Option<IpAddr>,
    pub scanned_at: DateTime<Utc>,
    pub findings: Vec<ScanFinding>,
    pub open_port_count: usize,
    pub overall_score: f64,
    pub overall_risk_level: RiskLevel,
    pub overall_loss_range: LossRange,
}

impl ScanReport {
    /// Number of per-port findings at each classified level, in LOW..CRITICAL order.
    pub fn level_counts(&self) -> [(RiskLevel, usize); 4] {
        let count = |level: RiskLevel| self.findings.iter().filter(|f| f.risk_level == level).count();
        [
            (RiskLevel::Low, count(RiskLevel::Low)),
            (RiskLevel::Medium, count(RiskLevel::Medium)),
            (RiskLevel::High, count(RiskLevel::High)),
            (RiskLevel::Critical, count(RiskLevel::Critical)),
        ]
    }
}

/// Rounds to two decimal places, the precision every reported score uses.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn risk_level_round_trips_through_its_display_name() {
        assert_eq!(RiskLevel::Medium.to_string(), "MEDIUM");
        assert_eq!(RiskLevel::None.to_string(), "none");
        assert_eq!(RiskLevel::from_str("critical").unwrap(), RiskLevel::Critical);
        assert_eq!(RiskLevel::High.key(), "high");
    }

    #[test]
    fn risk_level_serializes_like_the_report_surface() {
        let json = serde_json::to_string(&RiskLevel::Low).unwrap();
        assert_eq!(json, "\"LOW\"");
        let json = serde_json::to_string(&RiskLevel::None).unwrap();
        assert_eq!(json, "\"none\"");
    }

    #[test]
    fn header_presence_ignores_case() {
        let mut fp = ServiceFingerprint::new(80, "http");
        fp.headers
            .insert("Content-Security-Policy".into(), "default-src 'self'".into());
        assert!(fp.has_header("content-security-policy"));
        assert!(!fp.has_header("x-frame-options"));
    }

    #[test]
    fn round2_truncates_float_noise() {
        assert_eq!(round2(3.499999999), 3.5);
        assert_eq!(round2(2.0 / 3.0), 0.67);
    }
}

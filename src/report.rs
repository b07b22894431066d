// src/report.rs

//! Headless report rendering.

use crate::core::error::RedinkError;
use crate::core::models::{LossRange, ScanReport};
use std::fmt::Write;

const RULE: &str = "======================================================================";
const THIN_RULE: &str = "----------------------------------------------------------------------";

fn format_usd(amount: f64) -> String {
    let digits = format!("{:.0}", amount.max(0.0));
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("${}", grouped)
}

fn format_loss(range: &LossRange) -> String {
    format!(
        "{} - {} ({})",
        format_usd(range.loss_usd.min),
        format_usd(range.loss_usd.max),
        range.label
    )
}

/// Plain-text report for the terminal.
pub fn render_console(report: &ScanReport) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_console(&mut out, report);
    out
}

fn write_console(out: &mut String, report: &ScanReport) -> std::fmt::Result {
    writeln!(out, "{}", RULE)?;
    writeln!(out, "[ redink ] Risk Assessment Report")?;
    writeln!(out, "{}", RULE)?;
    writeln!(out)?;
    writeln!(out, "Target               : {}", report.target)?;
    if let Some(ip) = report.resolved_address {
        writeln!(out, "Resolved address     : {}", ip)?;
    }
    writeln!(
        out,
        "Scanned at           : {}",
        report.scanned_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(out, "Open ports detected  : {}", report.open_port_count)?;
    writeln!(out, "Overall risk score   : {:.2}", report.overall_score)?;
    writeln!(out, "Overall risk level   : {}", report.overall_risk_level)?;
    writeln!(out, "Estimated loss       : {}", format_loss(&report.overall_loss_range))?;

    writeln!(out)?;
    writeln!(out, "{}", THIN_RULE)?;
    writeln!(out, "Findings")?;
    writeln!(out, "{}", THIN_RULE)?;

    if report.findings.is_empty() {
        writeln!(out)?;
        writeln!(out, "No open ports found. Nothing to assess.")?;
    }

    for finding in &report.findings {
        writeln!(out)?;
        writeln!(out, "[ Port {} | {} ]", finding.port, finding.service)?;
        writeln!(out, "  Risk level     : {}", finding.risk_level)?;
        writeln!(
            out,
            "  Risk score     : {:.2}  (port {:.2} + headers {:.2} + disclosure {:.2} + rules {:.2})",
            finding.score,
            finding.breakdown.port,
            finding.breakdown.headers,
            finding.breakdown.disclosure,
            finding.breakdown.findings
        )?;
        writeln!(out, "  Estimated loss : {}", format_loss(&finding.loss_range))?;

        if !finding.reasons.is_empty() {
            writeln!(out, "  Reasons:")?;
            for reason in &finding.reasons {
                writeln!(out, "   - {}", reason)?;
            }
        }

        if !finding.recommendations.is_empty() {
            writeln!(out, "  Recommendations:")?;
            for rec in &finding.recommendations {
                writeln!(out, "   * {}", rec.title)?;
                writeln!(out, "     Fix: {}", rec.fix)?;
                if !rec.references.is_empty() {
                    writeln!(out, "     Reference: {}", rec.references.join(", "))?;
                }
            }
        }
    }

    writeln!(out)?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "Note:")?;
    writeln!(out, "Estimated losses are indicative ranges based on industry benchmarks.")?;
    writeln!(out, "This report does not represent actual financial damage.")?;
    writeln!(out, "{}", RULE)
}

pub fn render_json(report: &ScanReport) -> Result<String, RedinkError> {
    serde_json::to_string_pretty(report)
        .map_err(|e| RedinkError::Internal(format!("cannot serialize report: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RiskConfig;
    use crate::core::engine::RiskEngine;
    use crate::core::models::ServiceFingerprint;
    use std::sync::Arc;

    fn sample_report() -> ScanReport {
        let engine = RiskEngine::new(Arc::new(RiskConfig::default().normalized()));
        let mut ssh = ServiceFingerprint::new(22, "ssh");
        ssh.banner = Some("SSH-2.0-OpenSSH_9.6".into());
        engine.generate_risk_report(
            "example.com",
            Some("93.184.216.34".parse().unwrap()),
            &[ServiceFingerprint::new(80, "http"), ssh],
        )
    }

    #[test]
    fn usd_amounts_are_grouped() {
        assert_eq!(format_usd(0.0), "$0");
        assert_eq!(format_usd(950.0), "$950");
        assert_eq!(format_usd(10_000.0), "$10,000");
        assert_eq!(format_usd(1_000_000.0), "$1,000,000");
    }

    #[test]
    fn console_report_lists_every_port() {
        let text = render_console(&sample_report());
        assert!(text.contains("Target               : example.com"));
        assert!(text.contains("[ Port 80 | http ]"));
        assert!(text.contains("[ Port 22 | ssh ]"));
        assert!(text.contains("SSH Exposed to the Network"));
        assert!(text.contains("Open ports detected  : 2"));
    }

    #[test]
    fn empty_report_says_so() {
        let engine = RiskEngine::new(Arc::new(RiskConfig::default()));
        let report = engine.generate_risk_report("10.0.0.1", None, &[]);
        let text = render_console(&report);
        assert!(text.contains("No open ports found."));
        assert!(text.contains("Overall risk level   : none"));
    }

    #[test]
    fn json_report_uses_level_names() {
        let json = render_json(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["target"], "example.com");
        assert_eq!(value["open_port_count"], 2);
        assert_eq!(value["findings"][0]["port"], 80);
        assert!(value["findings"][1]["triggered_rule_ids"]
            .as_array()
            .unwrap()
            .iter()
            .any(|id| id == "open_ssh"));
    }
}

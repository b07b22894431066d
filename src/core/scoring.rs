// src/core/scoring.rs

//! Severity-weighted scoring and ordinal risk classification.
//!
//! Everything here is a pure function of its inputs and the injected
//! [`RiskConfig`]; scoring the same fingerprint twice gives the same result.

use crate::config::{RiskConfig, DEFAULT_SEVERITY};
use crate::core::error::RedinkError;
use crate::core::models::{Finding, LossRange, RiskLevel, ScoreBreakdown, ServiceFingerprint};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Separator that marks a version in a server string (`nginx/1.25`).
const VERSION_SEPARATOR: char = '/';

/// Weight for ports in the commonly-risky set. Port 0 is logged and scores 0.
pub fn score_port(port: u16, config: &RiskConfig) -> f64 {
    if port == 0 {
        warn!(port, "Invalid port, excluded from port scoring.");
        return 0.0;
    }
    if config.common_risky_ports.contains(&port) {
        config.weights.risky_port
    } else {
        0.0
    }
}

/// Weight per required security header absent from `headers`.
pub fn score_security_headers(headers: &BTreeMap<String, String>, config: &RiskConfig) -> f64 {
    let missing = config
        .required_security_headers
        .iter()
        .filter(|required| !headers.keys().any(|h| h.eq_ignore_ascii_case(required)))
        .count();
    missing as f64 * config.weights.missing_header
}

/// Disclosure weight when the server string carries a version (`nginx/1.25`).
pub fn score_server_disclosure(server: &str, config: &RiskConfig) -> f64 {
    if server.contains(VERSION_SEPARATOR) {
        config.weights.server_disclosure
    } else {
        0.0
    }
}

/// Severity weight of one finding: rule id → severity (default `low`) → weight.
pub fn score_finding(finding: &Finding, config: &RiskConfig) -> Result<f64, RedinkError> {
    let rule_id = finding.rule_id.trim().to_lowercase();
    if rule_id.is_empty() {
        return Err(RedinkError::RuleEvaluation {
            rule_id: finding.rule_id.clone(),
            reason: "finding has an empty rule id".to_string(),
        });
    }

    let severity = config
        .rule_severity
        .get(&rule_id)
        .map(String::as_str)
        .unwrap_or(DEFAULT_SEVERITY);

    config
        .severity_weights
        .get(severity)
        .copied()
        .ok_or_else(|| {
            RedinkError::InvalidConfiguration(format!(
                "severity '{}' not found in severity_weights",
                severity
            ))
        })
}

/// Folds the four score contributions for one fingerprint.
pub fn score_fingerprint(
    fingerprint: &ServiceFingerprint,
    findings: &[Finding],
    config: &RiskConfig,
) -> ScoreBreakdown {
    let mut breakdown = ScoreBreakdown {
        port: score_port(fingerprint.port, config),
        headers: score_security_headers(&fingerprint.headers, config),
        disclosure: score_server_disclosure(fingerprint.server.as_deref().unwrap_or(""), config),
        findings: 0.0,
    };

    for finding in findings {
        match score_finding(finding, config) {
            Ok(weight) => breakdown.findings += weight,
            Err(e) => warn!(rule_id = %finding.rule_id, error = %e, "Finding could not be scored."),
        }
    }

    debug!(port = fingerprint.port, ?breakdown, total = breakdown.total(), "Fingerprint scored.");
    breakdown
}

/// Maps a score onto LOW / MEDIUM / HIGH / CRITICAL.
///
/// Thresholds are inclusive upper bounds: `<= 2` LOW, `<= 5` MEDIUM, `<= 8`
/// HIGH, above that CRITICAL. Negative and non-finite scores are rejected.
pub fn classify_risk(score: f64) -> Result<RiskLevel, RedinkError> {
    if !score.is_finite() || score < 0.0 {
        return Err(RedinkError::InvalidScore(score));
    }
    Ok(if score <= 2.0 {
        RiskLevel::Low
    } else if score <= 5.0 {
        RiskLevel::Medium
    } else if score <= 8.0 {
        RiskLevel::High
    } else {
        RiskLevel::Critical
    })
}

/// Loss range for a risk level name; unrecognized names get the zero-range
/// `Unknown` placeholder.
pub fn risk_to_loss_range(risk_level: &str, config: &RiskConfig) -> LossRange {
    config
        .risk_ranges
        .get(&risk_level.trim().to_lowercase())
        .cloned()
        .unwrap_or_else(LossRange::unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_config() -> RiskConfig {
        let mut config = RiskConfig::default();
        config.required_security_headers = ["Content-Security-Policy", "X-Frame-Options"]
            .into_iter()
            .map(String::from)
            .collect();
        config.normalized()
    }

    #[test]
    fn classifier_boundaries() {
        let cases = [
            (0.0, RiskLevel::Low),
            (2.0, RiskLevel::Low),
            (2.01, RiskLevel::Medium),
            (5.0, RiskLevel::Medium),
            (5.01, RiskLevel::High),
            (8.0, RiskLevel::High),
            (8.01, RiskLevel::Critical),
            (1000.0, RiskLevel::Critical),
        ];
        for (score, expected) in cases {
            assert_eq!(classify_risk(score).unwrap(), expected, "score {}", score);
        }
    }

    #[test]
    fn classifier_is_monotonic() {
        let mut previous = 0;
        for step in 0..=1200 {
            let score = step as f64 / 100.0;
            let rank = classify_risk(score).unwrap().rank().unwrap();
            assert!(rank >= previous, "rank dropped at {}", score);
            previous = rank;
        }
    }

    #[test]
    fn classifier_rejects_out_of_domain_scores() {
        assert!(matches!(classify_risk(-0.5), Err(RedinkError::InvalidScore(_))));
        assert!(classify_risk(f64::NAN).is_err());
        assert!(classify_risk(f64::INFINITY).is_err());
    }

    #[test]
    fn unknown_level_gets_zero_placeholder() {
        let config = RiskConfig::default();
        let range = risk_to_loss_range("catastrophic", &config);
        assert_eq!(range, LossRange::new("Unknown", 0.0, 0.0));

        let high = risk_to_loss_range("HIGH", &config);
        assert_eq!(high.label, "High Risk");
        assert!(high.loss_usd.max > high.loss_usd.min);
    }

    #[test]
    fn port_weight_only_for_risky_ports() {
        let config = RiskConfig::default();
        assert_eq!(score_port(80, &config), 0.5);
        assert_eq!(score_port(443, &config), 0.0);
        assert_eq!(score_port(0, &config), 0.0);
    }

    #[test]
    fn header_weight_counts_missing_required_headers() {
        let config = scenario_config();
        let mut headers = BTreeMap::new();
        assert_eq!(score_security_headers(&headers, &config), 1.0);
        headers.insert("x-frame-options".to_string(), "DENY".to_string());
        assert_eq!(score_security_headers(&headers, &config), 0.5);
    }

    #[test]
    fn server_disclosure_needs_version_separator() {
        let config = RiskConfig::default();
        assert_eq!(score_server_disclosure("Apache/2.4.58", &config), 1.0);
        assert_eq!(score_server_disclosure("cloudflare", &config), 0.0);
        assert_eq!(score_server_disclosure("", &config), 0.0);
    }

    #[test]
    fn unmapped_rule_defaults_to_low() {
        let config = RiskConfig::default().normalized();
        let finding = Finding::new("  Missing_CSP ", "http", "x");
        assert_eq!(score_finding(&finding, &config).unwrap(), 1.0);

        let mapped = Finding::new("sensitive_port_exposed", "generic", "x");
        assert_eq!(score_finding(&mapped, &config).unwrap(), 4.0);

        let empty = Finding::new("  ", "generic", "x");
        assert!(score_finding(&empty, &config).is_err());
    }

    #[test]
    fn scenario_a_web_port_without_headers_is_medium() {
        let config = scenario_config();
        let fp = ServiceFingerprint::new(80, "http");
        let findings = vec![
            Finding::new("missing_csp", "http", "Content-Security-Policy header not present"),
            Finding::new("missing_x_frame_options", "http", "X-Frame-Options header not present"),
        ];

        let breakdown = score_fingerprint(&fp, &findings, &config);
        assert_eq!(breakdown.port, 0.5);
        assert_eq!(breakdown.headers, 1.0);
        assert_eq!(breakdown.disclosure, 0.0);
        assert_eq!(breakdown.findings, 2.0);
        assert_eq!(breakdown.total(), 3.5);
        assert_eq!(classify_risk(breakdown.total()).unwrap(), RiskLevel::Medium);
    }

    #[test]
    fn scoring_is_idempotent() {
        let config = scenario_config();
        let mut fp = ServiceFingerprint::new(443, "https");
        fp.server = Some("nginx/1.18.0".into());
        let findings = vec![Finding::new("missing_hsts", "https", "x")];

        let first = score_fingerprint(&fp, &findings, &config);
        let second = score_fingerprint(&fp, &findings, &config);
        assert_eq!(first, second);
        assert_eq!(
            classify_risk(first.total()).unwrap(),
            classify_risk(second.total()).unwrap()
        );
    }
}

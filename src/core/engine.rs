// src/core/engine.rs

//! Turns fingerprints into scored findings and folds them into a report.

use crate::config::RiskConfig;
use crate::core::knowledge_base::get_recommendations;
use crate::core::models::{
    round2, RiskLevel, ScanFinding, ScanReport, ServiceFingerprint,
};
use crate::core::rules::RuleRegistry;
use crate::core::scoring::{classify_risk, risk_to_loss_range, score_fingerprint};
use chrono::Utc;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{error, info};

/// Rule registry plus the configuration it was built from. Built once per scan.
pub struct RiskEngine {
    config: Arc<RiskConfig>,
    rules: RuleRegistry,
}

impl RiskEngine {
    pub fn new(config: Arc<RiskConfig>) -> Self {
        let rules = RuleRegistry::new(&config);
        Self { config, rules }
    }

    /// Rules, scoring, classification and recommendations for one open port.
    pub fn evaluate_service(&self, fingerprint: &ServiceFingerprint) -> ScanFinding {
        let findings = self.rules.evaluate(fingerprint);
        let breakdown = score_fingerprint(fingerprint, &findings, &self.config);
        let total = breakdown.total();
        let score = round2(total);

        // Classify the exact total; rounding is for display only.
        let risk_level = classify_risk(total).unwrap_or_else(|e| {
            error!(port = fingerprint.port, total, error = %e, "Could not classify score.");
            RiskLevel::Unknown
        });
        let loss_range = risk_to_loss_range(&risk_level.key(), &self.config);

        let mut reasons = Vec::new();
        let mut recommendations = Vec::new();
        for finding in &findings {
            if !finding.evidence.is_empty() {
                reasons.push(finding.evidence.clone());
            }
            recommendations.extend(get_recommendations(
                Some(&finding.rule_id),
                Some(&finding.service),
            ));
        }
        if let Some(e) = &fingerprint.error {
            reasons.push(format!("Fingerprinting failed: {}", e));
        }

        info!(
            port = fingerprint.port,
            service = %fingerprint.service,
            score,
            risk_level = %risk_level,
            "Service evaluated."
        );

        ScanFinding {
            port: fingerprint.port,
            service: fingerprint.service.clone(),
            score,
            risk_level,
            loss_range,
            breakdown,
            triggered_rule_ids: findings.iter().map(|f| f.rule_id.clone()).collect(),
            reasons,
            recommendations,
        }
    }

    /// Evaluates every fingerprint in order and aggregates the report.
    pub fn generate_risk_report(
        &self,
        target: &str,
        resolved_address: Option<IpAddr>,
        fingerprints: &[ServiceFingerprint],
    ) -> ScanReport {
        info!(target, services = fingerprints.len(), "Evaluating risks...");
        let mut builder = ReportBuilder::new(target, resolved_address);
        for fingerprint in fingerprints {
            builder.add(self.evaluate_service(fingerprint));
        }
        builder.finish(&self.config)
    }
}

/// Append-only accumulator for a [`ScanReport`].
#[derive(Debug)]
pub struct ReportBuilder {
    target: String,
    resolved_address: Option<IpAddr>,
    findings: Vec<ScanFinding>,
}

impl ReportBuilder {
    pub fn new(target: &str, resolved_address: Option<IpAddr>) -> Self {
        Self {
            target: target.to_string(),
            resolved_address,
            findings: Vec::new(),
        }
    }

    pub fn add(&mut self, finding: ScanFinding) {
        self.findings.push(finding);
    }

    /// Computes the summary and seals the report.
    ///
    /// The overall score is the mean of the per-port scores. With no findings
    /// the report is scored 0.0 and classified `none`.
    pub fn finish(self, config: &RiskConfig) -> ScanReport {
        let open_port_count = self.findings.len();

        let (overall_score, overall_risk_level) = if self.findings.is_empty() {
            (0.0, RiskLevel::None)
        } else {
            let total: f64 = self.findings.iter().map(|f| f.score).sum();
            let mean = total / open_port_count as f64;
            let level = classify_risk(mean).unwrap_or_else(|e| {
                error!(score = mean, error = %e, "Could not classify overall score.");
                RiskLevel::Unknown
            });
            (round2(mean), level)
        };
        let overall_loss_range = risk_to_loss_range(&overall_risk_level.key(), config);

        info!(
            target = %self.target,
            open_port_count,
            overall_score,
            overall_risk_level = %overall_risk_level,
            "Report summary computed."
        );

        ScanReport {
            target: self.target,
            resolved_address: self.resolved_address,
            scanned_at: Utc::now(),
            findings: self.findings,
            open_port_count,
            overall_score,
            overall_risk_level,
            overall_loss_range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{LossRange, ScoreBreakdown};

    fn scenario_engine() -> RiskEngine {
        let mut config = RiskConfig::default();
        config.required_security_headers = ["Content-Security-Policy", "X-Frame-Options"]
            .into_iter()
            .map(String::from)
            .collect();
        RiskEngine::new(Arc::new(config.normalized()))
    }

    fn scored(port: u16, score: f64) -> ScanFinding {
        ScanFinding {
            port,
            service: "unknown".into(),
            score,
            risk_level: classify_risk(score).unwrap(),
            loss_range: LossRange::unknown(),
            breakdown: ScoreBreakdown::default(),
            triggered_rule_ids: vec![],
            reasons: vec![],
            recommendations: vec![],
        }
    }

    #[test]
    fn scenario_a_single_web_port() {
        let engine = scenario_engine();
        let finding = engine.evaluate_service(&ServiceFingerprint::new(80, "http"));

        assert_eq!(finding.score, 3.5);
        assert_eq!(finding.risk_level, RiskLevel::Medium);
        assert_eq!(finding.loss_range.label, "Medium Risk");
        assert_eq!(
            finding.triggered_rule_ids,
            vec!["missing_csp", "missing_x_frame_options"]
        );
        assert_eq!(finding.reasons.len(), 2);
        let titles: Vec<&str> = finding.recommendations.iter().map(|r| r.title).collect();
        assert_eq!(
            titles,
            vec!["Content-Security-Policy Missing", "X-Frame-Options Missing"]
        );
    }

    #[test]
    fn scenario_b_no_open_ports() {
        let engine = scenario_engine();
        let report = engine.generate_risk_report("10.0.0.1", None, &[]);
        assert_eq!(report.open_port_count, 0);
        assert_eq!(report.overall_score, 0.0);
        assert_eq!(report.overall_risk_level, RiskLevel::None);
        assert_eq!(report.overall_loss_range.label, "No Exposure");
        assert!(report.findings.is_empty());
    }

    #[test]
    fn scenario_c_overall_is_mean_of_findings() {
        let config = RiskConfig::default();
        let mut builder = ReportBuilder::new("example.com", None);
        builder.add(scored(22, 5.0));
        builder.add(scored(80, 2.0));
        let report = builder.finish(&config);

        assert_eq!(report.open_port_count, 2);
        assert_eq!(report.overall_score, 3.5);
        assert_eq!(report.overall_risk_level, RiskLevel::Medium);
        assert_eq!(report.overall_loss_range.label, "Medium Risk");
    }

    #[test]
    fn findings_keep_input_order() {
        let engine = scenario_engine();
        let fingerprints = vec![
            ServiceFingerprint::new(3306, "mysql"),
            ServiceFingerprint::new(22, "ssh"),
            ServiceFingerprint::new(80, "http"),
        ];
        let report = engine.generate_risk_report("host", None, &fingerprints);
        let ports: Vec<u16> = report.findings.iter().map(|f| f.port).collect();
        assert_eq!(ports, vec![3306, 22, 80]);
    }

    #[test]
    fn failed_fingerprint_still_yields_a_finding() {
        let engine = scenario_engine();
        let mut fp = ServiceFingerprint::new(8080, "http-alt");
        fp.error = Some("connection reset".into());
        let finding = engine.evaluate_service(&fp);
        assert!(finding.reasons.iter().any(|r| r.contains("connection reset")));
        assert_ne!(finding.risk_level, RiskLevel::Unknown);
    }

    #[test]
    fn sensitive_database_port_is_high() {
        let engine = scenario_engine();
        let finding = engine.evaluate_service(&ServiceFingerprint::new(3306, "mysql"));
        // risky port 0.5 + headers 1.0 + sensitive_port_exposed (high) 4.0
        assert_eq!(finding.score, 5.5);
        assert_eq!(finding.risk_level, RiskLevel::High);
        assert_eq!(finding.triggered_rule_ids, vec!["sensitive_port_exposed"]);
        assert_eq!(finding.recommendations.len(), 1);
    }

    #[test]
    fn classification_uses_unrounded_total() {
        let mut config = RiskConfig::default();
        config.weights.risky_port = 2.004;
        config.required_security_headers.clear();
        let engine = RiskEngine::new(Arc::new(config.normalized()));

        // smtp on 25 triggers no rules, so the total is the port weight alone.
        let finding = engine.evaluate_service(&ServiceFingerprint::new(25, "smtp"));
        assert!(finding.triggered_rule_ids.is_empty());
        assert_eq!(finding.breakdown.total(), 2.004);
        assert_eq!(finding.score, 2.0);
        assert_eq!(finding.risk_level, RiskLevel::Medium);
        assert_eq!(finding.loss_range.label, "Medium Risk");
    }

    #[test]
    fn overall_level_uses_unrounded_mean() {
        let config = RiskConfig::default();
        let mut builder = ReportBuilder::new("example.com", None);
        builder.add(scored(25, 2.0));
        builder.add(scored(80, 2.01));
        let report = builder.finish(&config);

        // mean 2.005 sits just above the LOW ceiling of 2.0
        assert_eq!(report.overall_risk_level, RiskLevel::Medium);
    }
}

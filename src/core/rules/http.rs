// src/core/rules/http.rs

use super::{Rule, RuleOutcome, ServiceScope};
use crate::core::models::{Finding, ServiceFingerprint};
use crate::core::scanner::fingerprint_scanner::HTTP_FAMILY;
use tracing::warn;

/// Flags a web port whose response lacks one security header.
#[derive(Debug, Clone)]
pub struct MissingHeaderRule {
    pub rule_id: &'static str,
    pub service: &'static str,
    pub header: &'static str,
    pub ports: &'static [u16],
    pub scope: &'static [&'static str],
    pub evidence: &'static str,
}

static HEADER_RULES: &[MissingHeaderRule] = &[
    MissingHeaderRule {
        rule_id: "missing_csp",
        service: "http",
        header: "content-security-policy",
        ports: &[80, 443],
        scope: HTTP_FAMILY,
        evidence: "Content-Security-Policy header not present",
    },
    MissingHeaderRule {
        rule_id: "missing_x_frame_options",
        service: "http",
        header: "x-frame-options",
        ports: &[80, 443],
        scope: HTTP_FAMILY,
        evidence: "X-Frame-Options header not present",
    },
    MissingHeaderRule {
        rule_id: "missing_hsts",
        service: "https",
        header: "strict-transport-security",
        ports: &[443],
        scope: &["https"],
        evidence: "Strict-Transport-Security header not present on HTTPS service",
    },
];

pub fn header_rules() -> Vec<MissingHeaderRule> {
    HEADER_RULES.to_vec()
}

impl Rule for MissingHeaderRule {
    fn id(&self) -> &str {
        self.rule_id
    }

    fn scope(&self) -> ServiceScope {
        ServiceScope::Services(self.scope)
    }

    fn evaluate(&self, fingerprint: &ServiceFingerprint) -> RuleOutcome {
        if !self.ports.contains(&fingerprint.port) {
            return Ok(None);
        }
        if fingerprint.has_header(self.header) {
            return Ok(None);
        }
        warn!(port = fingerprint.port, header = self.header, "HTTP security header missing.");
        Ok(Some(Finding::new(self.rule_id, self.service, self.evidence)))
    }
}

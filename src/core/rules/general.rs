// src/core/rules/general.rs

use super::{Rule, RuleOutcome, ServiceScope};
use crate::core::error::RedinkError;
use crate::core::models::{Finding, ServiceFingerprint};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

// Product token followed by a dotted version, e.g. `OpenSSH_8.9`, `vsFTPd 3.0.3`, `Redis/7.2`.
static RE_VERSION_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z][\w.-]*[/_ -]v?\d+(\.\d+)+").unwrap());

/// Reports any port listed in the configured sensitive-port table.
pub struct SensitivePortRule {
    ports: BTreeMap<u16, String>,
}

impl SensitivePortRule {
    pub fn new(ports: BTreeMap<u16, String>) -> Self {
        Self { ports }
    }
}

impl Rule for SensitivePortRule {
    fn id(&self) -> &str {
        "sensitive_port_exposed"
    }

    fn scope(&self) -> ServiceScope {
        ServiceScope::Any
    }

    fn evaluate(&self, fingerprint: &ServiceFingerprint) -> RuleOutcome {
        if fingerprint.port == 0 {
            return Err(RedinkError::RuleEvaluation {
                rule_id: self.id().to_string(),
                reason: "fingerprint carries port 0".to_string(),
            });
        }
        let Some(service_name) = self.ports.get(&fingerprint.port) else {
            return Ok(None);
        };
        Ok(Some(Finding::new(
            self.id(),
            "generic",
            format!(
                "Sensitive service port {} ({}) is exposed and may allow unauthorized access.",
                fingerprint.port, service_name
            ),
        )))
    }
}

/// Reports protocols that carry credentials in cleartext.
pub struct UnencryptedServiceRule;

impl Rule for UnencryptedServiceRule {
    fn id(&self) -> &str {
        "unencrypted_service"
    }

    fn scope(&self) -> ServiceScope {
        ServiceScope::Services(&["ftp", "telnet", "pop3", "imap"])
    }

    fn evaluate(&self, fingerprint: &ServiceFingerprint) -> RuleOutcome {
        Ok(Some(Finding::new(
            self.id(),
            "generic",
            format!(
                "{} on port {} transmits data and credentials without encryption.",
                fingerprint.service.to_uppercase(),
                fingerprint.port
            ),
        )))
    }
}

/// Reports raw service banners that reveal a product version.
///
/// HTTP `Server` headers are left to the disclosure weight of the scorer.
pub struct VersionDisclosureRule;

impl Rule for VersionDisclosureRule {
    fn id(&self) -> &str {
        "service_version_disclosure"
    }

    fn scope(&self) -> ServiceScope {
        ServiceScope::Any
    }

    fn evaluate(&self, fingerprint: &ServiceFingerprint) -> RuleOutcome {
        let Some(banner) = fingerprint.banner.as_deref() else {
            return Ok(None);
        };
        Ok(RE_VERSION_TOKEN.find(banner).map(|token| {
            Finding::new(
                self.id(),
                "generic",
                format!("Service banner discloses version '{}'", token.as_str()),
            )
        }))
    }
}

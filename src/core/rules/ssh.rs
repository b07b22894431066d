// src/core/rules/ssh.rs

use super::{Rule, RuleOutcome, ServiceScope};
use crate::core::models::{Finding, ServiceFingerprint};

/// Header whose absence marks the port as an exposed interactive service. An
/// SSH fingerprint never carries HTTP headers, so any SSH service on port 22
/// is reported.
const TRANSPORT_POLICY_HEADER: &str = "strict-transport-security";

pub struct OpenSshRule;

impl Rule for OpenSshRule {
    fn id(&self) -> &str {
        "open_ssh"
    }

    fn scope(&self) -> ServiceScope {
        ServiceScope::Services(&["ssh"])
    }

    fn evaluate(&self, fingerprint: &ServiceFingerprint) -> RuleOutcome {
        if fingerprint.port != 22 || fingerprint.has_header(TRANSPORT_POLICY_HEADER) {
            return Ok(None);
        }
        let evidence = match &fingerprint.banner {
            Some(banner) => format!("SSH remote access service exposed on port 22 ({})", banner),
            None => "SSH remote access service exposed on port 22".to_string(),
        };
        Ok(Some(Finding::new(self.id(), "ssh", evidence)))
    }
}

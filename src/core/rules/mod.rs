// src/core/rules/mod.rs

//! Rule engine: independent checks that inspect one fingerprint and may emit a
//! [`Finding`]. Rules are registered once per scan in a [`RuleRegistry`] keyed
//! by service label.

pub mod general;
pub mod http;
pub mod ssh;

use crate::config::RiskConfig;
use crate::core::error::RedinkError;
use crate::core::models::{Finding, ServiceFingerprint};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error};

/// Which service labels a rule is evaluated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceScope {
    Services(&'static [&'static str]),
    Any,
}

pub type RuleOutcome = Result<Option<Finding>, RedinkError>;

pub trait Rule: Send + Sync {
    fn id(&self) -> &str;

    fn scope(&self) -> ServiceScope;

    /// `Ok(None)` when the rule does not apply or its condition is not met.
    fn evaluate(&self, fingerprint: &ServiceFingerprint) -> RuleOutcome;
}

/// Service label → ordered rule list, plus wildcard rules run for every label.
pub struct RuleRegistry {
    by_service: HashMap<String, Vec<Arc<dyn Rule>>>,
    wildcard: Vec<Arc<dyn Rule>>,
}

impl RuleRegistry {
    /// The built-in catalog, wired to the given configuration.
    pub fn new(config: &RiskConfig) -> Self {
        let mut rules: Vec<Arc<dyn Rule>> = http::header_rules()
            .into_iter()
            .map(|r| Arc::new(r) as Arc<dyn Rule>)
            .collect();
        rules.push(Arc::new(ssh::OpenSshRule));
        rules.push(Arc::new(general::SensitivePortRule::new(
            config.sensitive_ports.clone(),
        )));
        rules.push(Arc::new(general::UnencryptedServiceRule));
        rules.push(Arc::new(general::VersionDisclosureRule));
        Self::from_rules(rules)
    }

    pub fn from_rules(rules: Vec<Arc<dyn Rule>>) -> Self {
        let mut by_service: HashMap<String, Vec<Arc<dyn Rule>>> = HashMap::new();
        let mut wildcard = Vec::new();
        for rule in rules {
            match rule.scope() {
                ServiceScope::Any => wildcard.push(rule),
                ServiceScope::Services(services) => {
                    for service in services {
                        by_service
                            .entry(service.to_string())
                            .or_default()
                            .push(Arc::clone(&rule));
                    }
                }
            }
        }
        Self { by_service, wildcard }
    }

    /// Rules applicable to `service`: its own list first, then the wildcards.
    pub fn rules_for<'a>(&'a self, service: &str) -> impl Iterator<Item = &'a Arc<dyn Rule>> + 'a {
        self.by_service
            .get(service)
            .map(|rules| rules.as_slice())
            .unwrap_or(&[])
            .iter()
            .chain(self.wildcard.iter())
    }

    /// Runs every applicable rule in order and collects the findings.
    ///
    /// A rule that fails is logged and skipped; its siblings still run.
    pub fn evaluate(&self, fingerprint: &ServiceFingerprint) -> Vec<Finding> {
        let mut findings = Vec::new();
        for rule in self.rules_for(&fingerprint.service) {
            match rule.evaluate(fingerprint) {
                Ok(Some(finding)) => {
                    debug!(rule_id = rule.id(), port = fingerprint.port, "Rule triggered.");
                    findings.push(finding);
                }
                Ok(None) => {}
                Err(e) => {
                    error!(rule_id = rule.id(), port = fingerprint.port, error = %e, "Rule evaluation failed, skipping.");
                }
            }
        }
        findings
    }
}

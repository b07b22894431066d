// src/config.rs

//! Static risk configuration: port tables, header requirements, severity
//! weights and loss ranges. Loaded once at startup, validated, and then shared
//! read-only (behind an `Arc`) by every pipeline stage.

use crate::core::error::RedinkError;
use crate::core::models::LossRange;
use crate::logging::project_directory;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Severity bucket used for rule ids absent from `rule_severity`.
pub const DEFAULT_SEVERITY: &str = "low";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringWeights {
    pub risky_port: f64,
    pub missing_header: f64,
    pub server_disclosure: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            risky_port: 0.5,
            missing_header: 0.5,
            server_disclosure: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScanSettings {
    pub probe_timeout_ms: u64,
    pub fingerprint_timeout_ms: u64,
    pub concurrency: usize,
    pub banner_bytes: usize,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            probe_timeout_ms: 1000,
            fingerprint_timeout_ms: 5000,
            concurrency: 100,
            banner_bytes: 1024,
        }
    }
}

impl ScanSettings {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn fingerprint_timeout(&self) -> Duration {
        Duration::from_millis(self.fingerprint_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiskConfig {
    pub default_ports: Vec<u16>,
    pub services: BTreeMap<u16, String>,
    pub common_risky_ports: BTreeSet<u16>,
    pub sensitive_ports: BTreeMap<u16, String>,
    pub required_security_headers: BTreeSet<String>,
    pub rule_severity: BTreeMap<String, String>,
    pub severity_weights: BTreeMap<String, f64>,
    pub risk_ranges: BTreeMap<String, LossRange>,
    pub weights: ScoringWeights,
    pub scan: ScanSettings,
}

fn port_table(entries: &[(u16, &str)]) -> BTreeMap<u16, String> {
    entries.iter().map(|(p, s)| (*p, s.to_string())).collect()
}

fn string_table(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            default_ports: vec![
                21, 22, 23, 25, 53, 80, 110, 143, 443, 445, 1433, 3306, 3389, 5432, 5900, 6379,
                8080, 8443, 9200, 27017,
            ],
            services: port_table(&[
                (21, "ftp"),
                (22, "ssh"),
                (23, "telnet"),
                (25, "smtp"),
                (53, "dns"),
                (80, "http"),
                (110, "pop3"),
                (143, "imap"),
                (443, "https"),
                (445, "smb"),
                (1433, "mssql"),
                (3306, "mysql"),
                (3389, "rdp"),
                (5432, "postgresql"),
                (5900, "vnc"),
                (6379, "redis"),
                (8080, "http-alt"),
                (8443, "https"),
                (9200, "elasticsearch"),
                (27017, "mongodb"),
            ]),
            common_risky_ports: [
                21, 22, 23, 25, 80, 110, 139, 445, 1433, 3306, 3389, 5432, 5900, 6379, 8080, 27017,
            ]
            .into_iter()
            .collect(),
            sensitive_ports: port_table(&[
                (21, "FTP"),
                (23, "Telnet"),
                (445, "SMB"),
                (1433, "MSSQL"),
                (3306, "MySQL"),
                (3389, "RDP"),
                (5432, "PostgreSQL"),
                (5900, "VNC"),
                (6379, "Redis"),
                (9200, "Elasticsearch"),
                (27017, "MongoDB"),
            ]),
            required_security_headers: [
                "Content-Security-Policy",
                "X-Frame-Options",
                "Strict-Transport-Security",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            rule_severity: string_table(&[
                ("missing_hsts", "medium"),
                ("open_ssh", "medium"),
                ("sensitive_port_exposed", "high"),
                ("unencrypted_service", "high"),
                ("service_version_disclosure", "low"),
            ]),
            severity_weights: [("low", 1.0), ("medium", 2.5), ("high", 4.0), ("critical", 6.0)]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            risk_ranges: [
                ("none", LossRange::new("No Exposure", 0.0, 0.0)),
                ("low", LossRange::new("Low Risk", 0.0, 10_000.0)),
                ("medium", LossRange::new("Medium Risk", 10_000.0, 50_000.0)),
                ("high", LossRange::new("High Risk", 50_000.0, 250_000.0)),
                ("critical", LossRange::new("Critical Risk", 250_000.0, 1_000_000.0)),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
            weights: ScoringWeights::default(),
            scan: ScanSettings::default(),
        }
    }
}

/// Location of the optional user configuration file.
pub fn default_config_path() -> Option<PathBuf> {
    project_directory().map(|dirs| dirs.config_dir().join("config.json"))
}

impl RiskConfig {
    /// Loads the configuration.
    ///
    /// An explicit `path` must exist. Without one, `<config dir>/config.json` is
    /// used when present and the built-in defaults otherwise. Fields missing
    /// from the file keep their default values.
    pub fn load(path: Option<&Path>) -> Result<Self, RedinkError> {
        let candidate = match path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path().filter(|p| p.exists()),
        };

        let config = match candidate {
            Some(p) => {
                info!(path = %p.display(), "Loading configuration file.");
                let raw = std::fs::read_to_string(&p).map_err(|e| {
                    RedinkError::InvalidConfiguration(format!(
                        "cannot read {}: {}",
                        p.display(),
                        e
                    ))
                })?;
                Self::from_json(&raw)?
            }
            None => {
                debug!("No configuration file found, using built-in defaults.");
                Self::default()
            }
        };

        config.normalized().validated()
    }

    pub fn from_json(raw: &str) -> Result<Self, RedinkError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Trims and lowercases every lookup key so later lookups can normalize
    /// their input the same way.
    pub fn normalized(mut self) -> Self {
        let norm = |s: &str| s.trim().to_lowercase();
        self.rule_severity = self
            .rule_severity
            .iter()
            .map(|(k, v)| (norm(k), norm(v)))
            .collect();
        self.severity_weights = self
            .severity_weights
            .iter()
            .map(|(k, v)| (norm(k), *v))
            .collect();
        self.risk_ranges = self
            .risk_ranges
            .iter()
            .map(|(k, v)| (norm(k), v.clone()))
            .collect();
        self.services = self
            .services
            .iter()
            .map(|(p, s)| (*p, norm(s)))
            .collect();
        self.required_security_headers = self
            .required_security_headers
            .iter()
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .collect();
        self
    }

    pub fn validated(self) -> Result<Self, RedinkError> {
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), RedinkError> {
        let invalid = |msg: String| Err(RedinkError::InvalidConfiguration(msg));

        if self.default_ports.is_empty() {
            return invalid("default_ports must not be empty".into());
        }
        let ports = self
            .default_ports
            .iter()
            .chain(self.services.keys())
            .chain(self.common_risky_ports.iter())
            .chain(self.sensitive_ports.keys());
        for port in ports {
            if *port == 0 {
                return invalid("port 0 is not a valid port number".into());
            }
        }

        if self.scan.concurrency == 0 {
            return invalid("scan.concurrency must be at least 1".into());
        }
        if self.scan.probe_timeout_ms == 0 || self.scan.fingerprint_timeout_ms == 0 {
            return invalid("scan timeouts must be greater than zero".into());
        }

        if !self.severity_weights.contains_key(DEFAULT_SEVERITY) {
            return invalid(format!("severity_weights must define '{}'", DEFAULT_SEVERITY));
        }
        for (name, weight) in &self.severity_weights {
            if !weight.is_finite() || *weight < 0.0 {
                return invalid(format!("severity weight '{}' must be a non-negative number", name));
            }
        }
        for (rule_id, severity) in &self.rule_severity {
            if !self.severity_weights.contains_key(severity) {
                return invalid(format!(
                    "rule '{}' references unknown severity '{}'",
                    rule_id, severity
                ));
            }
        }

        let w = &self.weights;
        for (name, value) in [
            ("risky_port", w.risky_port),
            ("missing_header", w.missing_header),
            ("server_disclosure", w.server_disclosure),
        ] {
            if !value.is_finite() || value < 0.0 {
                return invalid(format!("weights.{} must be a non-negative number", name));
            }
        }

        for (level, range) in &self.risk_ranges {
            let loss = range.loss_usd;
            if loss.min < 0.0 || loss.max < loss.min {
                return invalid(format!(
                    "risk range '{}' must satisfy 0 <= min <= max (got {} - {})",
                    level, loss.min, loss.max
                ));
            }
        }

        Ok(())
    }
}

// src/core/error.rs

use thiserror::Error;

pub const EXIT_OK: u8 = 0;
pub const EXIT_TARGET_ERROR: u8 = 2;
pub const EXIT_CONFIG_ERROR: u8 = 3;
pub const EXIT_INTERNAL_ERROR: u8 = 10;

/// Every failure the scan-to-risk pipeline can produce.
///
/// Only `TargetResolution` and `InvalidConfiguration` abort a run. The per-port
/// and per-rule variants are returned as values, logged by the caller, and the
/// affected unit degrades instead of the whole report.
#[derive(Debug, Error)]
pub enum RedinkError {
    #[error("unable to resolve target '{target}': {reason}")]
    TargetResolution { target: String, reason: String },

    #[error("scan failed on port {port}: {reason}")]
    ScanExecution { port: u16, reason: String },

    #[error("rule '{rule_id}' failed: {reason}")]
    RuleEvaluation { rule_id: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("score {0} is outside the classifiable range")]
    InvalidScore(f64),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl RedinkError {
    /// Process exit code for this error when it terminates a headless run.
    pub fn exit_code(&self) -> u8 {
        match self {
            RedinkError::TargetResolution { .. } => EXIT_TARGET_ERROR,
            RedinkError::InvalidConfiguration(_) => EXIT_CONFIG_ERROR,
            _ => EXIT_INTERNAL_ERROR,
        }
    }
}

impl From<serde_json::Error> for RedinkError {
    fn from(e: serde_json::Error) -> Self {
        RedinkError::InvalidConfiguration(e.to_string())
    }
}

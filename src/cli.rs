// src/cli.rs

use crate::config::RiskConfig;
use crate::core::error::RedinkError;
use clap::{Parser, ValueEnum};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// How a headless run prints its report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable console report.
    Normal,
    /// Pretty-printed JSON on stdout.
    Json,
    /// No report; only the exit code.
    Quiet,
}

/// redink: exposure scan and risk estimate for a single host
#[derive(Parser, Debug)]
#[command(name = "redink", version, about = "Exposure scan and business-risk estimate for a host")]
pub struct Args {
    /// Host to scan (domain, IP address or URL). Starts the terminal UI when omitted.
    #[arg(value_name = "TARGET")]
    pub target: Option<String>,

    /// Ports to probe (e.g. 80, 80,443, 1-1024). Defaults to the configured list.
    #[arg(short = 'p', long = "ports", value_name = "PORTS")]
    pub ports: Option<String>,

    /// Per-attempt timeout in seconds for probes and fingerprints
    #[arg(long = "timeout", value_name = "SECONDS")]
    pub timeout: Option<f64>,

    /// Maximum number of probes in flight
    #[arg(long = "concurrency", value_name = "N")]
    pub concurrency: Option<usize>,

    /// JSON configuration file overriding the built-in tables
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Report format for headless runs
    #[arg(short = 'o', long = "output", value_enum, default_value_t = OutputFormat::Normal)]
    pub output: OutputFormat,

    /// Increase console log verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors to the console
    #[arg(long = "silent")]
    pub silent: bool,
}

impl Args {
    /// Applies the command-line overrides on top of a loaded configuration.
    pub fn apply_overrides(&self, mut config: RiskConfig) -> Result<RiskConfig, RedinkError> {
        if let Some(secs) = self.timeout {
            if !secs.is_finite() || secs <= 0.0 {
                return Err(RedinkError::InvalidConfiguration(format!(
                    "timeout must be a positive number of seconds, got {}",
                    secs
                )));
            }
            let ms = (secs * 1000.0).round().max(1.0) as u64;
            config.scan.probe_timeout_ms = ms;
            config.scan.fingerprint_timeout_ms = ms;
        }
        if let Some(n) = self.concurrency {
            config.scan.concurrency = n;
        }
        config.validated()
    }

    pub fn requested_ports(&self) -> Result<Option<Vec<u16>>, RedinkError> {
        self.ports.as_deref().map(parse_ports).transpose()
    }
}

/// Parses a port list such as `22,80,8000-8010` into sorted, unique ports.
pub fn parse_ports(input: &str) -> Result<Vec<u16>, RedinkError> {
    let invalid = |msg: String| RedinkError::InvalidConfiguration(msg);
    let parse_one = |raw: &str| -> Result<u16, RedinkError> {
        match raw.trim().parse::<u16>() {
            Ok(0) | Err(_) => Err(invalid(format!("invalid port: '{}'", raw.trim()))),
            Ok(p) => Ok(p),
        }
    };

    let mut ports = BTreeSet::new();
    for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match token.split_once('-') {
            Some((start, end)) => {
                let (start, end) = (parse_one(start)?, parse_one(end)?);
                if start > end {
                    return Err(invalid(format!("invalid port range: {}-{}", start, end)));
                }
                ports.extend(start..=end);
            }
            None => {
                ports.insert(parse_one(token)?);
            }
        }
    }

    if ports.is_empty() {
        return Err(invalid("port list is empty".into()));
    }
    Ok(ports.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_list_is_sorted_and_deduplicated() {
        assert_eq!(parse_ports("443, 80,22,80").unwrap(), vec![22, 80, 443]);
        assert_eq!(parse_ports("8000-8003,8001").unwrap(), vec![8000, 8001, 8002, 8003]);
    }

    #[test]
    fn bad_port_lists_are_configuration_errors() {
        for bad in ["", "0", "http", "90-80", "1-2-3", "70000"] {
            let err = parse_ports(bad).unwrap_err();
            assert!(
                matches!(err, RedinkError::InvalidConfiguration(_)),
                "accepted '{}'",
                bad
            );
        }
    }

    #[test]
    fn flags_parse() {
        let args = Args::parse_from([
            "redink", "example.com", "-p", "80,443", "--timeout", "2.5", "-o", "json", "-vv",
        ]);
        assert_eq!(args.target.as_deref(), Some("example.com"));
        assert_eq!(args.output, OutputFormat::Json);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.requested_ports().unwrap(), Some(vec![80, 443]));

        let config = args.apply_overrides(RiskConfig::default()).unwrap();
        assert_eq!(config.scan.probe_timeout_ms, 2500);
        assert_eq!(config.scan.fingerprint_timeout_ms, 2500);
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let args = Args::parse_from(["redink", "host", "--concurrency", "0"]);
        assert!(args.apply_overrides(RiskConfig::default()).is_err());
    }

    #[test]
    fn no_target_means_interactive() {
        let args = Args::parse_from(["redink"]);
        assert!(args.target.is_none());
        assert_eq!(args.output, OutputFormat::Normal);
    }
}

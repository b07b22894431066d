// src/core/mod.rs

// The `core` module holds the scan-to-risk pipeline. Nothing in here renders
// output; the front ends in `report` and `ui` consume `models::ScanReport`.

/// Error taxonomy and exit codes.
pub mod error;

/// Data structures passed between pipeline stages, from probe results to the
/// final `ScanReport`.
pub mod models;

/// Target resolution, port probing and service fingerprinting.
pub mod scanner;

/// Rule trait, registry and the built-in rule catalog.
pub mod rules;

/// Score contributions, risk classification and loss-range lookup.
pub mod scoring;

/// Static mitigation guidance keyed by rule id and service.
pub mod knowledge_base;

/// Per-service evaluation and report aggregation.
pub mod engine;

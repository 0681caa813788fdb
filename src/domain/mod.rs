//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - categorical enums (`ConfidenceBand`, `FailureClass`, `DecisionGate`, `ValidationMode`)
//! - per-target inputs (`MetricRow`, `MetricSet`, `ManifestTarget`)
//! - audit outputs (`StructuralAuditRecord`, `SarDraft`)
//! - per-command run configuration

pub mod types;

pub use types::*;

//! Reporting: run summaries, calibration report and execution provenance.
//!
//! The structs here are the serialized report documents; `format` turns them
//! into terminal and markdown text.

pub mod format;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calibration::{interpretation, BandStats, CalibrationSummary};
use crate::domain::{ConfidenceBand, DecisionGate, FailureClass, LockedParameters, StructuralAuditRecord};

pub use format::*;

/// Gate and failure-class distribution over a set of SARs.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub total: usize,
    pub gates: BTreeMap<DecisionGate, usize>,
    pub failure_classes: BTreeMap<FailureClass, usize>,
}

impl RunSummary {
    pub fn from_records(records: &[StructuralAuditRecord]) -> Self {
        let mut gates = BTreeMap::new();
        let mut failure_classes = BTreeMap::new();
        for sar in records {
            *gates.entry(sar.decision_gate).or_insert(0) += 1;
            *failure_classes.entry(sar.failure_taxonomy.class).or_insert(0) += 1;
        }
        Self {
            total: records.len(),
            gates,
            failure_classes,
        }
    }

    pub fn gate_count(&self, gate: DecisionGate) -> usize {
        self.gates.get(&gate).copied().unwrap_or(0)
    }

    pub fn class_count(&self, class: FailureClass) -> usize {
        self.failure_classes.get(&class).copied().unwrap_or(0)
    }

    /// `count` as a percentage of the total (0 for an empty run).
    pub fn percent(&self, count: usize) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        count as f64 * 100.0 / self.total as f64
    }
}

/// `calibration_report.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReport {
    pub version: String,
    pub generated: DateTime<Utc>,
    pub total_targets: usize,
    pub confidence_bins: usize,
    pub calibration_pass: bool,
    pub calibration_data: BTreeMap<ConfidenceBand, BandStats>,
    pub interpretation: BTreeMap<ConfidenceBand, String>,
}

impl CalibrationReport {
    pub fn new(summary: &CalibrationSummary, version: &str, generated: DateTime<Utc>) -> Self {
        Self {
            version: version.to_string(),
            generated,
            total_targets: summary.total_targets,
            confidence_bins: summary.confidence_bins,
            calibration_pass: summary.pass,
            calibration_data: summary.calibration_data.clone(),
            interpretation: ConfidenceBand::ALL
                .iter()
                .map(|&band| (band, interpretation(band).to_string()))
                .collect(),
        }
    }
}

/// `execution_provenance.json`: what ran, with which arguments, producing what.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionProvenance {
    pub job_id: String,
    pub job_type: String,
    pub timestamp: DateTime<Utc>,
    pub command_line: String,
    pub arguments: BTreeMap<String, String>,
    pub locked_parameters: LockedParameters,
    pub outputs: Vec<String>,
}

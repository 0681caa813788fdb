//! Batch outcome: which targets produced a SAR and which did not.

use crate::domain::StructuralAuditRecord;
use crate::error::SarError;

use super::check_completeness;

/// A target that produced no SAR.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetFailure {
    pub pdb_id: String,
    pub error: SarError,
}

/// Outcome of evaluating a batch.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Manifest target ids, in processing order.
    pub expected: Vec<String>,
    pub records: Vec<StructuralAuditRecord>,
    pub failures: Vec<TargetFailure>,
    /// Strict mode stopped before the end of the manifest.
    pub halted: bool,
}

impl BatchReport {
    pub fn new(expected: Vec<String>) -> Self {
        Self {
            expected,
            records: Vec::new(),
            failures: Vec::new(),
            halted: false,
        }
    }

    pub fn completeness(&self) -> Result<(), SarError> {
        check_completeness(&self.expected, &self.records)
    }

    /// Targets neither built nor failed (strict mode halted before them).
    pub fn skipped(&self) -> usize {
        self.expected
            .len()
            .saturating_sub(self.records.len() + self.failures.len())
    }
}

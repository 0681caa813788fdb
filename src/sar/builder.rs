//! Per-target SAR assembly.

use chrono::{DateTime, Utc};

use crate::domain::{MetricSet, SarDraft, StructuralAuditRecord};
use crate::error::SarError;
use crate::gate::{classify_confidence, classify_failure, decide_gate, expected_error_range, recommended_action};

use super::validate::finalize;
use super::SAR_VERSION;

/// Runs the gate engine for one target and assembles its audit record.
///
/// Stateless apart from the schema version stamped on each record.
#[derive(Debug, Clone)]
pub struct SarBuilder {
    sar_version: String,
}

impl Default for SarBuilder {
    fn default() -> Self {
        Self::new(SAR_VERSION)
    }
}

impl SarBuilder {
    pub fn new(sar_version: impl Into<String>) -> Self {
        Self {
            sar_version: sar_version.into(),
        }
    }

    pub fn sar_version(&self) -> &str {
        &self.sar_version
    }

    /// Apply the gate rules and return the record in unvalidated form.
    pub fn draft(&self, input: &MetricSet, generated_at: DateTime<Utc>) -> SarDraft {
        let m = &input.metrics;

        let confidence = classify_confidence(m.plddt_mean, m.pae_mean);
        let range = expected_error_range(confidence.overall_confidence);
        let taxonomy = classify_failure(m, input.ligand_present, &range);
        let gate = decide_gate(m.rmsd_global, &range, taxonomy.class, &confidence);
        let action = recommended_action(gate, &taxonomy, &input.pdb_id);

        SarDraft {
            pdb_id: input.pdb_id.clone(),
            sar_version: Some(self.sar_version.clone()),
            timestamp: Some(generated_at),
            metrics: m.clone(),
            confidence_assessment: confidence,
            expected_error_range: Some(range.into()),
            recommended_action: Some(action),
            decision_gate: Some(gate.as_str().to_string()),
            failure_taxonomy: taxonomy,
            provenance: input.provenance.clone(),
        }
    }

    /// Check the input, build the record, and validate it.
    pub fn build(&self, input: &MetricSet, generated_at: DateTime<Utc>) -> Result<StructuralAuditRecord, SarError> {
        input.check().map_err(|reason| SarError::MalformedMetrics {
            pdb_id: input.pdb_id.clone(),
            reason,
        })?;
        finalize(self.draft(input, generated_at))
    }
}

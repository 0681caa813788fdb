//! SAR validation and batch completeness.
//!
//! A SAR is final only if `timestamp`, `decision_gate`, `expected_error_range`
//! (all three subfields) and `recommended_action` are present, and the gate is one of
//! ACCEPT / REVIEW / REJECT. Every problem is reported, not just the first.

use std::collections::HashSet;

use crate::domain::{DecisionGate, ErrorRangeDraft, ExpectedErrorRange, SarDraft, StructuralAuditRecord};
use crate::error::SarError;

use super::SAR_VERSION;

/// List every required field that is missing or invalid in a draft.
pub fn missing_fields(draft: &SarDraft) -> Vec<String> {
    let mut missing = Vec::new();

    if draft.timestamp.is_none() {
        missing.push("timestamp".to_string());
    }

    match &draft.expected_error_range {
        None => missing.push("expected_error_range".to_string()),
        Some(range) => {
            if range.rmsd_min.is_none() {
                missing.push("expected_error_range.rmsd_min".to_string());
            }
            if range.rmsd_max.is_none() {
                missing.push("expected_error_range.rmsd_max".to_string());
            }
            if range.rationale.is_none() {
                missing.push("expected_error_range.rationale".to_string());
            }
            if let (Some(lo), Some(hi)) = (range.rmsd_min, range.rmsd_max) {
                if !(lo >= 0.0 && lo <= hi) {
                    missing.push("expected_error_range (invalid bounds)".to_string());
                }
            }
        }
    }

    if draft.recommended_action.is_none() {
        missing.push("recommended_action".to_string());
    }

    match draft.decision_gate.as_deref() {
        None => missing.push("decision_gate".to_string()),
        Some(gate) if gate.parse::<DecisionGate>().is_err() => {
            missing.push("decision_gate (invalid value)".to_string());
        }
        Some(_) => {}
    }

    missing
}

/// Validate a draft and turn it into a finalized record.
pub fn finalize(draft: SarDraft) -> Result<StructuralAuditRecord, SarError> {
    let missing = missing_fields(&draft);
    let SarDraft {
        pdb_id,
        sar_version,
        timestamp,
        metrics,
        confidence_assessment,
        expected_error_range,
        recommended_action,
        decision_gate,
        failure_taxonomy,
        provenance,
    } = draft;

    if !missing.is_empty() {
        return Err(SarError::Incomplete { pdb_id, missing });
    }

    let gate = decision_gate.as_deref().and_then(|g| g.parse::<DecisionGate>().ok());
    let (
        Some(timestamp),
        Some(ErrorRangeDraft {
            rmsd_min: Some(rmsd_min),
            rmsd_max: Some(rmsd_max),
            rationale: Some(rationale),
        }),
        Some(recommended_action),
        Some(decision_gate),
    ) = (timestamp, expected_error_range, recommended_action, gate)
    else {
        return Err(SarError::Incomplete { pdb_id, missing });
    };

    Ok(StructuralAuditRecord {
        pdb_id,
        sar_version: sar_version.unwrap_or_else(|| SAR_VERSION.to_string()),
        timestamp,
        metrics,
        confidence_assessment,
        expected_error_range: ExpectedErrorRange {
            rmsd_min,
            rmsd_max,
            rationale,
        },
        recommended_action,
        decision_gate,
        failure_taxonomy,
        provenance,
    })
}

/// Check that every expected target has a finalized record.
///
/// Returns the missing identifiers (in expected order) inside `BatchIncomplete`.
pub fn check_completeness(expected: &[String], records: &[StructuralAuditRecord]) -> Result<(), SarError> {
    let present: HashSet<&str> = records.iter().map(|r| r.pdb_id.as_str()).collect();
    let missing: Vec<String> = expected
        .iter()
        .filter(|id| !present.contains(id.as_str()))
        .cloned()
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    Err(SarError::BatchIncomplete {
        expected: expected.len(),
        found: expected.len() - missing.len(),
        missing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::domain::{ConfidenceAssessment, ConfidenceBand, FailureClass, FailureTaxonomy, Provenance, TargetMetrics};

    fn draft() -> SarDraft {
        SarDraft {
            pdb_id: "8ABC".to_string(),
            sar_version: Some("1.0".to_string()),
            timestamp: Some(Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap()),
            metrics: TargetMetrics {
                rmsd_global: 1.0,
                rmsd_ligand_pocket: None,
                contact_map_overlap: None,
                plddt_mean: 95.0,
                pae_mean: 3.0,
            },
            confidence_assessment: ConfidenceAssessment {
                plddt_bin: ConfidenceBand::High,
                pae_bin: ConfidenceBand::High,
                overall_confidence: ConfidenceBand::High,
            },
            expected_error_range: Some(ErrorRangeDraft {
                rmsd_min: Some(0.5),
                rmsd_max: Some(2.0),
                rationale: Some("High confidence".to_string()),
            }),
            recommended_action: Some("Proceed.".to_string()),
            decision_gate: Some("ACCEPT".to_string()),
            failure_taxonomy: FailureTaxonomy {
                class: FailureClass::NotApplicable,
                description: "within range".to_string(),
            },
            provenance: Provenance::default(),
        }
    }

    #[test]
    fn complete_draft_finalizes() {
        let sar = finalize(draft()).unwrap();
        assert_eq!(sar.decision_gate, DecisionGate::Accept);
        assert_eq!(sar.expected_error_range.rmsd_max, 2.0);
    }

    #[test]
    fn missing_gate_is_incomplete() {
        let mut d = draft();
        d.decision_gate = None;
        let err = finalize(d).unwrap_err();
        assert_eq!(
            err,
            SarError::Incomplete {
                pdb_id: "8ABC".to_string(),
                missing: vec!["decision_gate".to_string()],
            }
        );
        assert!(err.to_string().starts_with("ERROR_SAR_INCOMPLETE"));
    }

    #[test]
    fn missing_timestamp_is_incomplete() {
        let mut d = draft();
        d.timestamp = None;
        let err = finalize(d).unwrap_err();
        assert_eq!(
            err,
            SarError::Incomplete {
                pdb_id: "8ABC".to_string(),
                missing: vec!["timestamp".to_string()],
            }
        );
    }

    #[test]
    fn finalized_record_keeps_draft_timestamp() {
        let d = draft();
        let stamp = d.timestamp;
        assert_eq!(Some(finalize(d).unwrap().timestamp), stamp);
    }

    #[test]
    fn unknown_gate_value_is_incomplete() {
        let mut d = draft();
        d.decision_gate = Some("MAYBE".to_string());
        let err = finalize(d).unwrap_err();
        assert!(err.to_string().contains("decision_gate (invalid value)"), "{err}");
    }

    #[test]
    fn every_missing_field_is_listed() {
        let mut d = draft();
        d.recommended_action = None;
        d.expected_error_range = Some(ErrorRangeDraft {
            rmsd_min: Some(0.5),
            rmsd_max: None,
            rationale: None,
        });
        assert_eq!(
            missing_fields(&d),
            vec![
                "expected_error_range.rmsd_max",
                "expected_error_range.rationale",
                "recommended_action",
            ]
        );

        d.expected_error_range = None;
        assert_eq!(missing_fields(&d), vec!["expected_error_range", "recommended_action"]);
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let mut d = draft();
        d.expected_error_range = Some(ErrorRangeDraft {
            rmsd_min: Some(3.0),
            rmsd_max: Some(1.0),
            rationale: Some("bad".to_string()),
        });
        assert_eq!(missing_fields(&d), vec!["expected_error_range (invalid bounds)"]);
    }

    #[test]
    fn completeness_reports_missing_in_manifest_order() {
        let sar = finalize(draft()).unwrap();
        let expected = vec!["8ABC".to_string(), "8DEF".to_string(), "8GHI".to_string()];
        let err = check_completeness(&expected, &[sar.clone()]).unwrap_err();
        assert_eq!(
            err,
            SarError::BatchIncomplete {
                expected: 3,
                found: 1,
                missing: vec!["8DEF".to_string(), "8GHI".to_string()],
            }
        );

        assert!(check_completeness(&expected[..1], &[sar]).is_ok());
    }
}

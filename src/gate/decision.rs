//! Decision gate assignment and recommended actions.

use crate::domain::{ConfidenceAssessment, DecisionGate, ExpectedErrorRange, FailureClass, FailureTaxonomy};

/// Deviations beyond this multiple of the expected upper bound are rejected outright.
pub const REJECT_FACTOR: f64 = 2.0;

/// Assign ACCEPT / REVIEW / REJECT.
///
/// Rules, in order:
/// 1. deviation within the expected upper bound (inclusive) -> ACCEPT
/// 2. Class A or Class C, or deviation above `REJECT_FACTOR` x upper -> REJECT
/// 3. everything else -> REVIEW
///
/// The confidence assessment is accepted for completeness of the audit inputs;
/// the current rules do not consult it.
pub fn decide_gate(
    rmsd_global: f64,
    range: &ExpectedErrorRange,
    failure_class: FailureClass,
    _confidence: &ConfidenceAssessment,
) -> DecisionGate {
    let upper = range.rmsd_max;

    if rmsd_global <= upper {
        return DecisionGate::Accept;
    }

    let hard_failure = matches!(failure_class, FailureClass::ClassA | FailureClass::ClassC);
    if hard_failure || rmsd_global > upper * REJECT_FACTOR {
        return DecisionGate::Reject;
    }

    DecisionGate::Review
}

/// Human-readable next step for a (gate, failure class) pair.
pub fn recommended_action(gate: DecisionGate, taxonomy: &FailureTaxonomy, pdb_id: &str) -> String {
    match (gate, taxonomy.class) {
        (DecisionGate::Accept, _) => {
            format!("Structure {pdb_id} passes quality criteria. Proceed with downstream analysis.")
        }
        (DecisionGate::Review, FailureClass::ClassB) => format!(
            "Manual review recommended for {pdb_id}: Ligand binding pose shows elevated error. Verify active site geometry and ligand interactions."
        ),
        (DecisionGate::Review, FailureClass::Unknown) => format!(
            "Manual review required for {pdb_id}: Elevated error detected but failure mode unclear. Expert structural analysis needed."
        ),
        (DecisionGate::Review, _) => {
            format!("Manual review recommended for {pdb_id}: {}", taxonomy.description)
        }
        (DecisionGate::Reject, FailureClass::ClassA) => format!(
            "Reject {pdb_id}: Overconfidence artifact detected. Model confidence metrics unreliable for this target. Consider alternative modeling approaches."
        ),
        (DecisionGate::Reject, FailureClass::ClassC) => format!(
            "Reject {pdb_id}: Potential symmetry/assembly failure. Verify oligomeric state and symmetry operators before use."
        ),
        (DecisionGate::Reject, _) => format!(
            "Reject {pdb_id}: Error exceeds acceptable thresholds. Do not use for downstream analysis without significant refinement."
        ),
    }
}

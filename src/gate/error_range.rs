//! Expected error range per confidence band.

use crate::domain::{ConfidenceBand, ExpectedErrorRange};

/// Expected global deviation interval (Å) for an overall confidence band.
pub fn expected_error_range(band: ConfidenceBand) -> ExpectedErrorRange {
    let (rmsd_min, rmsd_max, rationale) = match band {
        ConfidenceBand::High => (
            0.5,
            2.0,
            "High confidence (pLDDT>90, PAE<5) suggests low expected error",
        ),
        ConfidenceBand::Medium => (1.5, 4.0, "Medium confidence suggests moderate expected error range"),
        ConfidenceBand::Low => (
            3.0,
            8.0,
            "Low confidence (pLDDT<=70 or PAE>=10) suggests high expected error",
        ),
    };

    ExpectedErrorRange {
        rmsd_min,
        rmsd_max,
        rationale: rationale.to_string(),
    }
}

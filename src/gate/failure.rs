//! Failure taxonomy classification.
//!
//! Rules are evaluated in strict order; the first match wins:
//! 1. within the expected range          -> `N/A`
//! 2. confident model, large excess      -> `Class A` (overconfidence artifact)
//! 3. ligand pocket far worse than fold  -> `Class B` (ligand pose failure)
//! 4. very large absolute deviation      -> `Class C` (symmetry/assembly failure)
//! 5. anything else                      -> `Unknown`

use crate::domain::{ExpectedErrorRange, FailureClass, FailureTaxonomy, TargetMetrics};
use crate::gate::confidence::{PAE_HIGH, PLDDT_HIGH};

/// Class A requires the deviation to exceed the expected upper bound by this factor.
pub const OVERCONFIDENCE_FACTOR: f64 = 1.5;
/// Class B requires the pocket deviation to exceed the global deviation by this factor.
pub const LIGAND_FACTOR: f64 = 1.5;
/// Absolute global deviation (Å) above which a symmetry/assembly failure is assumed.
pub const SYMMETRY_RMSD_THRESHOLD: f64 = 10.0;

pub fn classify_failure(
    metrics: &TargetMetrics,
    ligand_present: bool,
    range: &ExpectedErrorRange,
) -> FailureTaxonomy {
    let rmsd = metrics.rmsd_global;
    let upper = range.rmsd_max;

    if rmsd <= upper {
        return FailureTaxonomy {
            class: FailureClass::NotApplicable,
            description: format!(
                "Prediction within expected error range (RMSD={rmsd:.2}Å <= {upper:.2}Å)"
            ),
        };
    }

    if metrics.plddt_mean > PLDDT_HIGH && metrics.pae_mean < PAE_HIGH && rmsd > upper * OVERCONFIDENCE_FACTOR {
        return FailureTaxonomy {
            class: FailureClass::ClassA,
            description: format!(
                "Overconfidence artifact: High model confidence (pLDDT={:.1}, PAE={:.1}) but RMSD={rmsd:.2}Å exceeds expected range",
                metrics.plddt_mean, metrics.pae_mean
            ),
        };
    }

    if ligand_present {
        if let Some(pocket) = metrics.rmsd_ligand_pocket {
            if pocket > rmsd * LIGAND_FACTOR {
                return FailureTaxonomy {
                    class: FailureClass::ClassB,
                    description: format!(
                        "Ligand pose failure: Ligand pocket RMSD ({pocket:.2}Å) significantly exceeds global RMSD ({rmsd:.2}Å)"
                    ),
                };
            }
        }
    }

    if rmsd > SYMMETRY_RMSD_THRESHOLD {
        return FailureTaxonomy {
            class: FailureClass::ClassC,
            description: format!(
                "Potential symmetry/assembly failure: Extremely high RMSD ({rmsd:.2}Å) suggests structural misalignment"
            ),
        };
    }

    FailureTaxonomy {
        class: FailureClass::Unknown,
        description: format!(
            "Unmapped failure mode: RMSD={rmsd:.2}Å exceeds expected range but doesn't match known failure patterns"
        ),
    }
}

//! Confidence classification.
//!
//! Two model-reported signals are bucketed independently:
//! - mean per-residue confidence (pLDDT, 0–100, higher is better)
//! - mean pairwise aligned error (PAE, Å, lower is better)
//!
//! The overall band is combined from those two bands only.

use crate::domain::{ConfidenceAssessment, ConfidenceBand};

/// pLDDT strictly above this is `high`.
pub const PLDDT_HIGH: f64 = 90.0;
/// pLDDT strictly above this (and not high) is `medium`.
pub const PLDDT_MEDIUM: f64 = 70.0;
/// PAE strictly below this is `high`.
pub const PAE_HIGH: f64 = 5.0;
/// PAE strictly below this (and not high) is `medium`.
pub const PAE_MEDIUM: f64 = 10.0;

pub fn plddt_band(plddt_mean: f64) -> ConfidenceBand {
    if plddt_mean > PLDDT_HIGH {
        ConfidenceBand::High
    } else if plddt_mean > PLDDT_MEDIUM {
        ConfidenceBand::Medium
    } else {
        ConfidenceBand::Low
    }
}

pub fn pae_band(pae_mean: f64) -> ConfidenceBand {
    if pae_mean < PAE_HIGH {
        ConfidenceBand::High
    } else if pae_mean < PAE_MEDIUM {
        ConfidenceBand::Medium
    } else {
        ConfidenceBand::Low
    }
}

/// Combine two signal bands: both high -> high, any low -> low, else medium.
///
/// Symmetric in its arguments.
pub fn combine_bands(a: ConfidenceBand, b: ConfidenceBand) -> ConfidenceBand {
    use ConfidenceBand::*;
    match (a, b) {
        (High, High) => High,
        (Low, _) | (_, Low) => Low,
        _ => Medium,
    }
}

/// Classify both confidence signals and derive the overall band.
///
/// Never fails: non-finite inputs fall through to `low`.
pub fn classify_confidence(plddt_mean: f64, pae_mean: f64) -> ConfidenceAssessment {
    let plddt_bin = plddt_band(plddt_mean);
    let pae_bin = pae_band(pae_mean);
    ConfidenceAssessment {
        plddt_bin,
        pae_bin,
        overall_confidence: combine_bands(plddt_bin, pae_bin),
    }
}

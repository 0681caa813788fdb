//! Confidence-vs-error calibration.
//!
//! SARs are grouped by overall confidence band and the observed global
//! deviation is summarized per band. A run is well-calibrated only when at
//! least `MIN_POPULATED_BANDS` bands have data; the statistics themselves are
//! reported either way.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{ConfidenceBand, StructuralAuditRecord};

/// Minimum number of non-empty bands for a passing calibration.
pub const MIN_POPULATED_BANDS: usize = 3;

/// Observed-deviation statistics for one confidence band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandStats {
    pub n_samples: usize,
    pub rmsd_mean: f64,
    /// Population standard deviation.
    pub rmsd_std: f64,
    pub rmsd_min: f64,
    pub rmsd_max: f64,
    pub rmsd_median: f64,
}

impl BandStats {
    /// Summarize a set of deviations. `None` for an empty set.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        Some(Self {
            n_samples: values.len(),
            rmsd_mean: mean,
            rmsd_std: variance.sqrt(),
            rmsd_min: sorted[0],
            rmsd_max: sorted[sorted.len() - 1],
            rmsd_median: median,
        })
    }
}

/// Output of one aggregation run. Recomputed from scratch each time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSummary {
    pub total_targets: usize,
    /// Number of populated bands.
    pub confidence_bins: usize,
    /// Stats per populated band; empty bands are absent.
    pub calibration_data: BTreeMap<ConfidenceBand, BandStats>,
    pub pass: bool,
}

impl CalibrationSummary {
    pub fn band(&self, band: ConfidenceBand) -> Option<&BandStats> {
        self.calibration_data.get(&band)
    }
}

/// Group records by overall confidence and summarize each band.
pub fn aggregate(records: &[StructuralAuditRecord]) -> CalibrationSummary {
    let mut grouped: BTreeMap<ConfidenceBand, Vec<f64>> = BTreeMap::new();
    for sar in records {
        grouped
            .entry(sar.confidence_assessment.overall_confidence)
            .or_default()
            .push(sar.metrics.rmsd_global);
    }

    let calibration_data: BTreeMap<ConfidenceBand, BandStats> = grouped
        .into_iter()
        .filter_map(|(band, values)| BandStats::from_values(&values).map(|stats| (band, stats)))
        .collect();

    let confidence_bins = calibration_data.len();
    CalibrationSummary {
        total_targets: records.len(),
        confidence_bins,
        calibration_data,
        pass: confidence_bins >= MIN_POPULATED_BANDS,
    }
}

/// What each band's expected error means, for report readers.
pub fn interpretation(band: ConfidenceBand) -> &'static str {
    match band {
        ConfidenceBand::High => "Expected RMSD < 2.0Å - model highly confident and typically accurate",
        ConfidenceBand::Medium => "Expected RMSD 1.5-4.0Å - model moderately confident with moderate accuracy",
        ConfidenceBand::Low => "Expected RMSD 3.0-8.0Å - model uncertain with higher expected error",
    }
}

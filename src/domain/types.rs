//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - built in-memory by the gate engine
//! - exported to JSON/CSV
//! - reloaded later for report compilation and calibration

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Categorical confidence bucket derived from model-reported confidence signals.
///
/// Variant order is the reporting order (high first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    pub const ALL: [ConfidenceBand; 3] = [ConfidenceBand::High, ConfidenceBand::Medium, ConfidenceBand::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfidenceBand::High => "high",
            ConfidenceBand::Medium => "medium",
            ConfidenceBand::Low => "low",
        }
    }
}

impl fmt::Display for ConfidenceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-signal bands plus the combined overall band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceAssessment {
    pub plddt_bin: ConfidenceBand,
    pub pae_bin: ConfidenceBand,
    pub overall_confidence: ConfidenceBand,
}

/// Expected global deviation interval (Å) for a confidence band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedErrorRange {
    pub rmsd_min: f64,
    pub rmsd_max: f64,
    pub rationale: String,
}

/// Failure taxonomy class.
///
/// `NotApplicable` means the observed deviation is within the expected range;
/// every other class denotes a failure mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FailureClass {
    #[serde(rename = "N/A")]
    NotApplicable,
    #[serde(rename = "Class A")]
    ClassA,
    #[serde(rename = "Class B")]
    ClassB,
    #[serde(rename = "Class C")]
    ClassC,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl FailureClass {
    pub const ALL: [FailureClass; 5] = [
        FailureClass::NotApplicable,
        FailureClass::ClassA,
        FailureClass::ClassB,
        FailureClass::ClassC,
        FailureClass::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FailureClass::NotApplicable => "N/A",
            FailureClass::ClassA => "Class A",
            FailureClass::ClassB => "Class B",
            FailureClass::ClassC => "Class C",
            FailureClass::Unknown => "Unknown",
        }
    }

    /// Short label used in summary tables.
    pub fn label(self) -> &'static str {
        match self {
            FailureClass::NotApplicable => "No failure detected",
            FailureClass::ClassA => "Overconfidence artifact",
            FailureClass::ClassB => "Ligand pose failure",
            FailureClass::ClassC => "Symmetry/assembly failure",
            FailureClass::Unknown => "Unmapped failure mode",
        }
    }

    pub fn is_failure(self) -> bool {
        self != FailureClass::NotApplicable
    }
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureTaxonomy {
    pub class: FailureClass,
    pub description: String,
}

/// Final triage outcome for a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DecisionGate {
    Accept,
    Review,
    Reject,
}

impl DecisionGate {
    pub const ALL: [DecisionGate; 3] = [DecisionGate::Accept, DecisionGate::Review, DecisionGate::Reject];

    pub fn as_str(self) -> &'static str {
        match self {
            DecisionGate::Accept => "ACCEPT",
            DecisionGate::Review => "REVIEW",
            DecisionGate::Reject => "REJECT",
        }
    }
}

impl fmt::Display for DecisionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecisionGate {
    type Err = String;

    /// Exact wire names only; `"accept"` or `"MAYBE"` are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACCEPT" => Ok(DecisionGate::Accept),
            "REVIEW" => Ok(DecisionGate::Review),
            "REJECT" => Ok(DecisionGate::Reject),
            other => Err(format!("invalid decision gate '{other}'")),
        }
    }
}

/// Where a prediction came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub model_version: String,
    /// `-1` when unknown.
    pub seed: i64,
    /// `-1` when unknown.
    pub recycles: i64,
    pub stub_output: bool,
}

impl Default for Provenance {
    fn default() -> Self {
        Self {
            model_version: "unknown".to_string(),
            seed: -1,
            recycles: -1,
            stub_output: false,
        }
    }
}

/// Inference parameters every benchmark run is expected to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedParameters {
    pub seed: i64,
    pub recycles: i64,
}

impl Default for LockedParameters {
    fn default() -> Self {
        Self { seed: 42, recycles: 3 }
    }
}

impl LockedParameters {
    /// Describe each parameter that differs from the locked value.
    ///
    /// Unknown values (`-1`) are not deviations.
    pub fn deviations(&self, seed: i64, recycles: i64) -> Vec<String> {
        let mut out = Vec::new();
        if seed >= 0 && seed != self.seed {
            out.push(format!("seed={seed} (locked: {})", self.seed));
        }
        if recycles >= 0 && recycles != self.recycles {
            out.push(format!("recycles={recycles} (locked: {})", self.recycles));
        }
        out
    }
}

/// The `metrics` block of a SAR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetMetrics {
    /// Observed global structural deviation (Å).
    pub rmsd_global: f64,
    /// Ligand-pocket deviation (Å); `None` is written as `"N/A"`.
    #[serde(default, with = "not_applicable")]
    pub rmsd_ligand_pocket: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_map_overlap: Option<f64>,
    pub plddt_mean: f64,
    pub pae_mean: f64,
}

/// Normalized per-target input to the gate engine.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSet {
    pub pdb_id: String,
    pub metrics: TargetMetrics,
    pub ligand_present: bool,
    pub provenance: Provenance,
}

impl MetricSet {
    /// Reject values the gate rules cannot interpret.
    pub fn check(&self) -> Result<(), String> {
        let m = &self.metrics;
        if self.pdb_id.trim().is_empty() {
            return Err("empty pdb_id".to_string());
        }
        if !m.plddt_mean.is_finite() {
            return Err(format!("plddt_mean is not finite ({})", m.plddt_mean));
        }
        if !(m.pae_mean.is_finite() && m.pae_mean >= 0.0) {
            return Err(format!("pae_mean must be a finite value >= 0 (got {})", m.pae_mean));
        }
        if !(m.rmsd_global.is_finite() && m.rmsd_global >= 0.0) {
            return Err(format!("rmsd_global must be a finite value >= 0 (got {})", m.rmsd_global));
        }
        if let Some(v) = m.rmsd_ligand_pocket {
            if !(v.is_finite() && v >= 0.0) {
                return Err(format!("rmsd_ligand_pocket must be a finite value >= 0 (got {v})"));
            }
        }
        if let Some(v) = m.contact_map_overlap {
            if !v.is_finite() {
                return Err(format!("contact_map_overlap is not finite ({v})"));
            }
        }
        Ok(())
    }

    /// Flatten into the on-disk row shape.
    pub fn to_row(&self) -> MetricRow {
        MetricRow {
            pdb_id: self.pdb_id.clone(),
            plddt_mean: Some(self.metrics.plddt_mean),
            pae_mean: Some(self.metrics.pae_mean),
            rmsd_global: Some(self.metrics.rmsd_global),
            rmsd_ligand_pocket: self.metrics.rmsd_ligand_pocket,
            ligand_present: Some(self.ligand_present),
            contact_map_overlap: self.metrics.contact_map_overlap,
            model_version: Some(self.provenance.model_version.clone()),
            seed: Some(self.provenance.seed),
            recycles: Some(self.provenance.recycles),
            stub_output: Some(self.provenance.stub_output),
        }
    }
}

/// A raw metrics record as supplied by the metrics producer (mostly optional).
///
/// Rows are validated and normalized into `MetricSet`s against their manifest target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub pdb_id: String,
    #[serde(default)]
    pub plddt_mean: Option<f64>,
    #[serde(default)]
    pub pae_mean: Option<f64>,
    #[serde(default)]
    pub rmsd_global: Option<f64>,
    #[serde(default, with = "not_applicable")]
    pub rmsd_ligand_pocket: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ligand_present: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_map_overlap: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recycles: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stub_output: Option<bool>,
}

/// Finalized structural audit record. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralAuditRecord {
    pub pdb_id: String,
    pub sar_version: String,
    pub timestamp: DateTime<Utc>,
    pub metrics: TargetMetrics,
    pub confidence_assessment: ConfidenceAssessment,
    pub expected_error_range: ExpectedErrorRange,
    pub recommended_action: String,
    pub decision_gate: DecisionGate,
    pub failure_taxonomy: FailureTaxonomy,
    pub provenance: Provenance,
}

/// Unvalidated SAR in wire form.
///
/// The three required blocks are optional here so that a record built in
/// memory and a record read back from JSON go through the same validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SarDraft {
    pub pdb_id: String,
    #[serde(default)]
    pub sar_version: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    pub metrics: TargetMetrics,
    pub confidence_assessment: ConfidenceAssessment,
    #[serde(default)]
    pub expected_error_range: Option<ErrorRangeDraft>,
    #[serde(default)]
    pub recommended_action: Option<String>,
    #[serde(default)]
    pub decision_gate: Option<String>,
    pub failure_taxonomy: FailureTaxonomy,
    #[serde(default)]
    pub provenance: Provenance,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorRangeDraft {
    #[serde(default)]
    pub rmsd_min: Option<f64>,
    #[serde(default)]
    pub rmsd_max: Option<f64>,
    #[serde(default)]
    pub rationale: Option<String>,
}

impl From<ExpectedErrorRange> for ErrorRangeDraft {
    fn from(range: ExpectedErrorRange) -> Self {
        Self {
            rmsd_min: Some(range.rmsd_min),
            rmsd_max: Some(range.rmsd_max),
            rationale: Some(range.rationale),
        }
    }
}

/// A benchmark manifest: the governing target list and its processing order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    pub targets: Vec<ManifestTarget>,
}

impl Manifest {
    pub fn target_ids(&self) -> Vec<String> {
        self.targets.iter().map(|t| t.pdb_id.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestTarget {
    pub pdb_id: String,
    #[serde(default)]
    pub ligand_present: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kinase_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// How validation failures affect the rest of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Halt at the first failing target.
    Strict,
    /// Record the failure, exclude the target, keep going.
    Lenient,
}

impl ValidationMode {
    pub fn from_strict_flag(strict: bool) -> Self {
        if strict {
            ValidationMode::Strict
        } else {
            ValidationMode::Lenient
        }
    }
}

/// Configuration for `sar evaluate`, derived from CLI flags (plus env/defaults).
#[derive(Debug, Clone)]
pub struct EvaluateConfig {
    pub manifest_path: PathBuf,
    pub metrics_path: PathBuf,
    pub output_dir: PathBuf,
    pub schema_version: String,
    pub mode: ValidationMode,
    pub export_csv: Option<PathBuf>,
    pub plot: bool,
    pub plot_width: usize,
}

/// Configuration for `sar compile`.
#[derive(Debug, Clone)]
pub struct CompileConfig {
    pub manifest_path: PathBuf,
    pub sar_dir: PathBuf,
    pub output_dir: PathBuf,
    pub job_id: String,
    pub plot: bool,
    pub plot_width: usize,
}

/// Configuration for `sar stub`.
#[derive(Debug, Clone)]
pub struct StubConfig {
    pub manifest_path: PathBuf,
    pub output: PathBuf,
    pub seed: u64,
    pub recycles: u32,
    pub model_version: String,
}

/// Serde adapter for optional deviations that serialize as `"N/A"` when absent.
pub mod not_applicable {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const LABEL: &str = "N/A";

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_f64(*v),
            None => serializer.serialize_str(LABEL),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Raw::Number(v)) => Ok(Some(v)),
            Some(Raw::Text(text)) => parse_text(&text).map_err(D::Error::custom),
        }
    }

    /// Interpret a textual cell: blank or `N/A` means not applicable.
    pub fn parse_text(text: &str) -> Result<Option<f64>, String> {
        let text = text.trim();
        if text.is_empty() || text.eq_ignore_ascii_case(LABEL) {
            return Ok(None);
        }
        text.parse::<f64>()
            .map(Some)
            .map_err(|_| format!("expected a number or \"{LABEL}\", got \"{text}\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_parse_is_exact() {
        assert_eq!("ACCEPT".parse::<DecisionGate>(), Ok(DecisionGate::Accept));
        assert_eq!("REJECT".parse::<DecisionGate>(), Ok(DecisionGate::Reject));
        assert!("MAYBE".parse::<DecisionGate>().is_err());
        assert!("accept".parse::<DecisionGate>().is_err());
    }

    #[test]
    fn wire_names_match_report_contract() {
        assert_eq!(serde_json::to_string(&FailureClass::NotApplicable).unwrap(), "\"N/A\"");
        assert_eq!(serde_json::to_string(&FailureClass::ClassB).unwrap(), "\"Class B\"");
        assert_eq!(serde_json::to_string(&DecisionGate::Review).unwrap(), "\"REVIEW\"");
        assert_eq!(serde_json::to_string(&ConfidenceBand::Medium).unwrap(), "\"medium\"");
    }

    #[test]
    fn ligand_deviation_accepts_number_or_na() {
        let json = r#"{"rmsd_global": 2.5, "rmsd_ligand_pocket": "N/A", "plddt_mean": 80.0, "pae_mean": 6.0}"#;
        let m: TargetMetrics = serde_json::from_str(json).unwrap();
        assert_eq!(m.rmsd_ligand_pocket, None);

        let json = r#"{"rmsd_global": 2.5, "rmsd_ligand_pocket": 3, "plddt_mean": 80.0, "pae_mean": 6.0}"#;
        let m: TargetMetrics = serde_json::from_str(json).unwrap();
        assert_eq!(m.rmsd_ligand_pocket, Some(3.0));

        let out = serde_json::to_value(TargetMetrics {
            rmsd_ligand_pocket: None,
            ..m
        })
        .unwrap();
        assert_eq!(out["rmsd_ligand_pocket"], "N/A");
        assert!(out.get("contact_map_overlap").is_none());
    }

    #[test]
    fn locked_parameter_deviations() {
        let locked = LockedParameters::default();
        assert!(locked.deviations(42, 3).is_empty());
        assert!(locked.deviations(-1, -1).is_empty());
        assert_eq!(
            locked.deviations(7, 5),
            vec!["seed=7 (locked: 42)", "recycles=5 (locked: 3)"]
        );
    }

    #[test]
    fn metric_set_check_rejects_negative_deviation() {
        let set = MetricSet {
            pdb_id: "8ABC".to_string(),
            metrics: TargetMetrics {
                rmsd_global: -1.0,
                rmsd_ligand_pocket: None,
                contact_map_overlap: None,
                plddt_mean: 90.0,
                pae_mean: 3.0,
            },
            ligand_present: false,
            provenance: Provenance::default(),
        };
        let err = set.check().unwrap_err();
        assert!(err.contains("rmsd_global"), "{err}");
    }
}

//! End-to-end scenarios: gate outcomes, batch runs, report compilation.

use std::fs;
use std::path::Path;

use chrono::Utc;
use sar_gate::app::pipeline::{run_compile, run_evaluate, run_stub, CALIBRATION_FILE, PROVENANCE_FILE, SUMMARY_FILE};
use sar_gate::calibration::aggregate;
use sar_gate::domain::{
    CompileConfig, ConfidenceBand, DecisionGate, EvaluateConfig, FailureClass, MetricSet, Provenance,
    StructuralAuditRecord, StubConfig, TargetMetrics, ValidationMode,
};
use sar_gate::error::{EXIT_INPUT, EXIT_VALIDATION};
use sar_gate::sar::SarBuilder;

fn build(plddt: f64, pae: f64, rmsd: f64, pocket: Option<f64>, ligand: bool) -> StructuralAuditRecord {
    let input = MetricSet {
        pdb_id: "8TST".to_string(),
        metrics: TargetMetrics {
            rmsd_global: rmsd,
            rmsd_ligand_pocket: pocket,
            contact_map_overlap: None,
            plddt_mean: plddt,
            pae_mean: pae,
        },
        ligand_present: ligand,
        provenance: Provenance::default(),
    };
    SarBuilder::default().build(&input, Utc::now()).unwrap()
}

#[test]
fn scenario_a_confident_and_accurate() {
    let sar = build(95.0, 3.0, 1.0, None, false);
    assert_eq!(sar.confidence_assessment.overall_confidence, ConfidenceBand::High);
    assert_eq!(sar.expected_error_range.rmsd_min, 0.5);
    assert_eq!(sar.expected_error_range.rmsd_max, 2.0);
    assert_eq!(sar.failure_taxonomy.class, FailureClass::NotApplicable);
    assert_eq!(sar.decision_gate, DecisionGate::Accept);
}

#[test]
fn scenario_b_overconfident() {
    let sar = build(95.0, 3.0, 5.0, None, false);
    assert_eq!(sar.failure_taxonomy.class, FailureClass::ClassA);
    assert_eq!(sar.decision_gate, DecisionGate::Reject);
}

#[test]
fn scenario_c_symmetry_failure() {
    let sar = build(80.0, 7.0, 12.0, Some(8.0), true);
    assert_eq!(sar.confidence_assessment.overall_confidence, ConfidenceBand::Medium);
    assert_eq!(sar.failure_taxonomy.class, FailureClass::ClassC);
    assert_eq!(sar.decision_gate, DecisionGate::Reject);
}

#[test]
fn scenario_d_unmapped_moderate_miss() {
    let sar = build(80.0, 7.0, 5.0, None, false);
    assert_eq!(sar.failure_taxonomy.class, FailureClass::Unknown);
    assert_eq!(sar.decision_gate, DecisionGate::Review);
}

#[test]
fn calibration_passes_with_three_bands_and_fails_with_one() {
    let three = vec![
        build(95.0, 3.0, 1.0, None, false),
        build(80.0, 7.0, 2.5, None, false),
        build(60.0, 12.0, 5.0, None, false),
    ];
    let summary = aggregate(&three);
    assert_eq!(summary.confidence_bins, 3);
    assert!(summary.pass);

    let one = vec![build(95.0, 3.0, 1.0, None, false), build(95.0, 3.0, 1.5, None, false)];
    let summary = aggregate(&one);
    assert_eq!(summary.confidence_bins, 1);
    assert!(!summary.pass);
    assert_eq!(summary.band(ConfidenceBand::High).unwrap().n_samples, 2);
}

const MANIFEST: &str = r#"{
    "version": "1.0",
    "scope": "pilot",
    "targets": [
        {"pdb_id": "8ABC", "ligand_present": false},
        {"pdb_id": "8BCD", "ligand_present": false},
        {"pdb_id": "8GHI", "ligand_present": true},
        {"pdb_id": "8DEF", "ligand_present": false}
    ]
}"#;

const METRICS: &str = "pdb_id,plddt_mean,pae_mean,rmsd_global,rmsd_ligand_pocket\n\
                       8ABC,95,3,1.0,\n\
                       8BCD,95,3,5.0,\n\
                       8GHI,80,7,12.0,8.0\n\
                       8DEF,60,12,5.0,\n";

fn evaluate_config(dir: &Path, metrics: &str, mode: ValidationMode) -> EvaluateConfig {
    fs::write(dir.join("manifest.json"), MANIFEST).unwrap();
    fs::write(dir.join("metrics.csv"), metrics).unwrap();
    EvaluateConfig {
        manifest_path: dir.join("manifest.json"),
        metrics_path: dir.join("metrics.csv"),
        output_dir: dir.join("sars"),
        schema_version: "1.0".to_string(),
        mode,
        export_csv: None,
        plot: false,
        plot_width: 72,
    }
}

fn compile_config(dir: &Path) -> CompileConfig {
    CompileConfig {
        manifest_path: dir.join("manifest.json"),
        sar_dir: dir.join("sars"),
        output_dir: dir.join("reports"),
        job_id: "job-1".to_string(),
        plot: false,
        plot_width: 72,
    }
}

#[test]
fn evaluate_then_compile_writes_all_reports() {
    let dir = tempfile::tempdir().unwrap();
    let run = run_evaluate(&evaluate_config(dir.path(), METRICS, ValidationMode::Lenient)).unwrap();
    assert!(run.batch.failures.is_empty());
    assert!(run.batch.completeness().is_ok());
    assert_eq!(run.written.len(), 4);
    assert!(run.calibration.pass);

    let gates: Vec<DecisionGate> = run.batch.records.iter().map(|r| r.decision_gate).collect();
    assert_eq!(
        gates,
        vec![DecisionGate::Accept, DecisionGate::Reject, DecisionGate::Reject, DecisionGate::Accept]
    );

    let compiled = run_compile(&compile_config(dir.path()), "sar compile --manifest manifest.json").unwrap();
    assert_eq!(compiled.records.len(), 4);
    assert!(compiled.calibration.pass);

    let reports = dir.path().join("reports");
    let summary = fs::read_to_string(reports.join(SUMMARY_FILE)).unwrap();
    assert!(summary.contains("| REJECT | 2 | 50.0% |"), "{summary}");

    let calibration: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(reports.join(CALIBRATION_FILE)).unwrap()).unwrap();
    assert_eq!(calibration["total_targets"], 4);
    assert_eq!(calibration["confidence_bins"], 3);
    assert_eq!(calibration["calibration_data"]["high"]["n_samples"], 2);

    let provenance: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(reports.join(PROVENANCE_FILE)).unwrap()).unwrap();
    assert_eq!(provenance["job_id"], "job-1");
    assert_eq!(provenance["locked_parameters"]["seed"], 42);
    assert_eq!(provenance["outputs"].as_array().unwrap().len(), 3);
}

#[test]
fn lenient_run_reports_missing_metrics_and_compile_refuses() {
    let dir = tempfile::tempdir().unwrap();
    let metrics = "pdb_id,plddt_mean,pae_mean,rmsd_global\n8ABC,95,3,1.0\n8BCD,95,3,5.0\n8DEF,60,12,5.0\n";
    let run = run_evaluate(&evaluate_config(dir.path(), metrics, ValidationMode::Lenient)).unwrap();
    assert_eq!(run.batch.records.len(), 3);
    assert_eq!(run.batch.failures.len(), 1);
    assert_eq!(run.batch.failures[0].pdb_id, "8GHI");
    assert_eq!(run.batch.failures[0].error.exit_code(), EXIT_INPUT);

    let err = run_compile(&compile_config(dir.path()), "sar compile").unwrap_err();
    assert_eq!(err.exit_code(), EXIT_VALIDATION);
    assert!(err.to_string().contains("missing: 8GHI"), "{err}");
}

#[test]
fn strict_run_stops_at_first_bad_target() {
    let dir = tempfile::tempdir().unwrap();
    let metrics = "pdb_id,plddt_mean,pae_mean,rmsd_global\n8ABC,95,3,1.0\n8BCD,95,-3,5.0\n8GHI,80,7,2.0\n8DEF,60,12,5.0\n";
    let run = run_evaluate(&evaluate_config(dir.path(), metrics, ValidationMode::Strict)).unwrap();
    assert!(run.batch.halted);
    assert_eq!(run.batch.records.len(), 1);
    assert_eq!(run.batch.failures[0].pdb_id, "8BCD");
    assert!(dir.path().join("sars/8ABC.json").exists());
    assert!(!dir.path().join("sars/8GHI.json").exists());
}

#[test]
fn tampered_sar_fails_compilation() {
    let dir = tempfile::tempdir().unwrap();
    run_evaluate(&evaluate_config(dir.path(), METRICS, ValidationMode::Lenient)).unwrap();

    let path = dir.path().join("sars/8BCD.json");
    let mut raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    raw["decision_gate"] = serde_json::Value::String("MAYBE".to_string());
    fs::write(&path, raw.to_string()).unwrap();

    let err = run_compile(&compile_config(dir.path()), "sar compile").unwrap_err();
    assert_eq!(err.exit_code(), EXIT_VALIDATION);
    assert!(err.to_string().contains("decision_gate (invalid value)"), "{err}");
}

#[test]
fn stub_fixture_feeds_evaluate() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("manifest.json"), MANIFEST).unwrap();
    let stub = StubConfig {
        manifest_path: dir.path().join("manifest.json"),
        output: dir.path().join("stub.json"),
        seed: 42,
        recycles: 3,
        model_version: "af3_stub".to_string(),
    };
    let fixture = run_stub(&stub).unwrap();
    assert_eq!(fixture.targets.len(), 4);

    let config = EvaluateConfig {
        manifest_path: dir.path().join("manifest.json"),
        metrics_path: dir.path().join("stub.json"),
        output_dir: dir.path().join("sars"),
        schema_version: "1.0".to_string(),
        mode: ValidationMode::Strict,
        export_csv: None,
        plot: false,
        plot_width: 72,
    };
    let run = run_evaluate(&config).unwrap();
    assert!(run.batch.failures.is_empty());
    assert_eq!(run.batch.records.len(), 4);
    assert!(run.batch.records.iter().all(|r| r.provenance.stub_output));
}

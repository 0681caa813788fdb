//! Shared batch logic behind the `evaluate`, `compile` and `stub` commands.
//!
//! Keeping this in one place keeps the workflow testable without a process:
//! manifest -> metrics -> per-target SARs -> completeness -> calibration -> reports
//!
//! The command handlers in `app` then focus on presentation and exit codes.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::{info, info_span, warn};

use crate::calibration::{aggregate, CalibrationSummary};
use crate::data::{generate_stub_fixture, StubFixture};
use crate::domain::{
    CompileConfig, EvaluateConfig, LockedParameters, Manifest, MetricSet, StructuralAuditRecord, StubConfig,
    ValidationMode,
};
use crate::error::{AppError, SarError, EXIT_INPUT, EXIT_VALIDATION};
use crate::io::{
    load_metrics, read_manifest, read_sar, sar_path, write_json_pretty, write_sar_json, write_text, IngestedMetrics,
};
use crate::report::{format_summary_markdown, CalibrationReport, ExecutionProvenance};
use crate::sar::{check_completeness, BatchReport, SarBuilder, TargetFailure, SAR_VERSION};

pub const SUMMARY_FILE: &str = "SAR_SUMMARY.md";
pub const CALIBRATION_FILE: &str = "calibration_report.json";
pub const PROVENANCE_FILE: &str = "execution_provenance.json";

/// One manifest target with its resolved metrics (or why they are unusable).
#[derive(Debug, Clone)]
pub struct TargetInput {
    pub pdb_id: String,
    pub metrics: Result<MetricSet, SarError>,
}

/// All computed outputs of a `sar evaluate` run.
#[derive(Debug, Clone)]
pub struct EvaluateRun {
    pub batch: BatchReport,
    pub calibration: CalibrationSummary,
    pub written: Vec<PathBuf>,
}

/// All computed outputs of a `sar compile` run.
#[derive(Debug, Clone)]
pub struct CompileRun {
    pub records: Vec<StructuralAuditRecord>,
    pub calibration: CalibrationSummary,
    pub outputs: Vec<PathBuf>,
}

/// Pair each manifest target (in manifest order) with its metrics.
pub fn resolve_inputs(manifest: &Manifest, ingested: &IngestedMetrics) -> Vec<TargetInput> {
    manifest
        .targets
        .iter()
        .map(|target| TargetInput {
            pdb_id: target.pdb_id.clone(),
            metrics: ingested.lookup(target),
        })
        .collect()
}

/// Build a SAR for each input, in order, under the given validation mode.
///
/// Lenient mode records a failing target and moves on; strict mode stops at
/// the first failure. SARs built before a halt are kept.
pub fn evaluate_batch(
    inputs: &[TargetInput],
    builder: &SarBuilder,
    mode: ValidationMode,
    generated_at: DateTime<Utc>,
) -> BatchReport {
    let total = inputs.len();
    let locked = LockedParameters::default();
    let mut report = BatchReport::new(inputs.iter().map(|i| i.pdb_id.clone()).collect());

    for (idx, input) in inputs.iter().enumerate() {
        let span = info_span!("target", pdb_id = %input.pdb_id);
        let _guard = span.enter();

        let result = input.metrics.clone().and_then(|set| {
            for deviation in locked.deviations(set.provenance.seed, set.provenance.recycles) {
                warn!("locked parameter deviation: {deviation}");
            }
            builder.build(&set, generated_at)
        });

        match result {
            Ok(sar) => {
                info!("[{}/{}] {} {}", idx + 1, total, sar.pdb_id, sar.decision_gate);
                report.records.push(sar);
            }
            Err(error) => {
                warn!("[{}/{}] {} failed: {error}", idx + 1, total, input.pdb_id);
                report.failures.push(TargetFailure {
                    pdb_id: input.pdb_id.clone(),
                    error,
                });
                if mode == ValidationMode::Strict {
                    report.halted = true;
                    break;
                }
            }
        }
    }

    report
}

/// Load inputs, evaluate the batch, and write one SAR file per record.
pub fn run_evaluate(config: &EvaluateConfig) -> Result<EvaluateRun, AppError> {
    let manifest = read_manifest(&config.manifest_path)?;
    let ingested = load_metrics(&config.metrics_path)?;
    info!(
        targets = manifest.targets.len(),
        rows = ingested.rows_read,
        mode = ?config.mode,
        "loaded manifest and metrics"
    );

    for e in &ingested.row_errors {
        warn!(line = e.line, pdb_id = e.pdb_id.as_deref().unwrap_or("?"), "metrics row rejected: {}", e.message);
    }
    let unmatched = ingested.unmatched_ids(&manifest);
    if !unmatched.is_empty() {
        warn!("metrics for targets not in the manifest ignored: {}", unmatched.join(", "));
    }

    let inputs = resolve_inputs(&manifest, &ingested);
    let builder = SarBuilder::new(config.schema_version.clone());
    let batch = evaluate_batch(&inputs, &builder, config.mode, Utc::now());

    let mut written = Vec::with_capacity(batch.records.len());
    for sar in &batch.records {
        written.push(write_sar_json(&config.output_dir, sar)?);
    }
    info!(count = written.len(), dir = %config.output_dir.display(), "wrote SARs");

    let calibration = aggregate(&batch.records);
    Ok(EvaluateRun {
        batch,
        calibration,
        written,
    })
}

/// Validate the SAR directory against the manifest and write the batch reports.
///
/// Fails with exit code 3 on any invalid SAR or any missing target. Calibration
/// insufficiency is left to the caller.
pub fn run_compile(config: &CompileConfig, command_line: &str) -> Result<CompileRun, AppError> {
    let manifest = read_manifest(&config.manifest_path)?;
    let expected = manifest.target_ids();

    let mut records = Vec::with_capacity(expected.len());
    let mut invalid = Vec::new();
    for pdb_id in &expected {
        let path = sar_path(&config.sar_dir, pdb_id);
        if !path.exists() {
            continue;
        }
        match read_sar(&path) {
            Ok(sar) if sar.pdb_id != *pdb_id => {
                invalid.push(format!("{}: pdb_id mismatch ({})", path.display(), sar.pdb_id));
            }
            Ok(sar) => records.push(sar),
            Err(e) if e.exit_code() == EXIT_VALIDATION => invalid.push(e.to_string()),
            Err(e) => return Err(e),
        }
    }

    if !invalid.is_empty() {
        for message in &invalid {
            warn!("invalid SAR: {message}");
        }
        return Err(AppError::new(
            EXIT_VALIDATION,
            format!("{} invalid SAR(s): {}", invalid.len(), invalid.join("; ")),
        ));
    }
    check_completeness(&expected, &records)?;
    info!(count = records.len(), "all SARs present and valid");

    fs::create_dir_all(&config.output_dir).map_err(|e| {
        AppError::new(
            EXIT_INPUT,
            format!("Failed to create output directory '{}': {e}", config.output_dir.display()),
        )
    })?;

    let generated = Utc::now();
    let calibration = aggregate(&records);

    let summary_path = config.output_dir.join(SUMMARY_FILE);
    write_text(&summary_path, &format_summary_markdown(&records, &calibration, generated))?;

    let calibration_path = config.output_dir.join(CALIBRATION_FILE);
    write_json_pretty(&calibration_path, &CalibrationReport::new(&calibration, SAR_VERSION, generated))?;

    let provenance_path = config.output_dir.join(PROVENANCE_FILE);
    let mut outputs = vec![summary_path, calibration_path, provenance_path.clone()];

    let arguments: BTreeMap<String, String> = [
        ("manifest", config.manifest_path.display().to_string()),
        ("sar_dir", config.sar_dir.display().to_string()),
        ("output_dir", config.output_dir.display().to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    let provenance = ExecutionProvenance {
        job_id: config.job_id.clone(),
        job_type: "sar_compile".to_string(),
        timestamp: generated,
        command_line: command_line.to_string(),
        arguments,
        locked_parameters: LockedParameters::default(),
        outputs: outputs.iter().map(|p| p.display().to_string()).collect(),
    };
    write_json_pretty(&provenance_path, &provenance)?;

    outputs.sort();
    Ok(CompileRun {
        records,
        calibration,
        outputs,
    })
}

/// Write a stub metrics fixture for the manifest.
pub fn run_stub(config: &StubConfig) -> Result<StubFixture, AppError> {
    let manifest = read_manifest(&config.manifest_path)?;

    let seed = i64::try_from(config.seed).unwrap_or(i64::MAX);
    for deviation in LockedParameters::default().deviations(seed, i64::from(config.recycles)) {
        warn!("locked parameter deviation: {deviation}");
    }

    let fixture = generate_stub_fixture(&manifest, config, Utc::now());
    write_json_pretty(&config.output, &fixture)?;
    info!(targets = fixture.targets.len(), path = %config.output.display(), "wrote stub metrics");

    Ok(fixture)
}

//! Exports: SAR table CSV and report documents.
//!
//! The CSV is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::domain::{not_applicable, StructuralAuditRecord};
use crate::error::{AppError, EXIT_INPUT};

const SAR_TABLE_HEADER: [&str; 14] = [
    "pdb_id",
    "plddt_mean",
    "pae_mean",
    "rmsd_global",
    "rmsd_ligand_pocket",
    "plddt_bin",
    "pae_bin",
    "overall_confidence",
    "rmsd_min",
    "rmsd_max",
    "failure_class",
    "decision_gate",
    "model_version",
    "stub_output",
];

/// Write the per-target SAR table to a CSV file.
///
/// Free-text fields (`pdb_id`, `model_version`) are quoted as needed.
pub fn write_sar_table_csv(path: &Path, records: &[StructuralAuditRecord]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writer
        .write_record(SAR_TABLE_HEADER)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write export CSV header: {e}")))?;

    for sar in records {
        let m = &sar.metrics;
        let c = &sar.confidence_assessment;
        let row = [
            sar.pdb_id.clone(),
            format!("{:.4}", m.plddt_mean),
            format!("{:.4}", m.pae_mean),
            format!("{:.4}", m.rmsd_global),
            m.rmsd_ligand_pocket
                .map(|v| format!("{v:.4}"))
                .unwrap_or_else(|| not_applicable::LABEL.to_string()),
            c.plddt_bin.to_string(),
            c.pae_bin.to_string(),
            c.overall_confidence.to_string(),
            format!("{:.1}", sar.expected_error_range.rmsd_min),
            format!("{:.1}", sar.expected_error_range.rmsd_max),
            sar.failure_taxonomy.class.to_string(),
            sar.decision_gate.to_string(),
            sar.provenance.model_version.clone(),
            sar.provenance.stub_output.to_string(),
        ];
        writer
            .write_record(&row)
            .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write export CSV '{}': {e}", path.display())))
}

/// Write a value as pretty JSON.
pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to create '{}': {e}", path.display())))?;
    let write_err = |e: std::io::Error| AppError::new(EXIT_INPUT, format!("Failed to write '{}': {e}", path.display()));

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write '{}': {e}", path.display())))?;
    writeln!(writer).map_err(write_err)?;
    writer.flush().map_err(write_err)
}

/// Write a text document (markdown summary).
pub fn write_text(path: &Path, text: &str) -> Result<(), AppError> {
    fs::write(path, text).map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write '{}': {e}", path.display())))
}

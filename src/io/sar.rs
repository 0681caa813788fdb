//! SAR JSON files: one `<pdb_id>.json` per target.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::domain::{SarDraft, StructuralAuditRecord};
use crate::error::{AppError, EXIT_INPUT, EXIT_VALIDATION};
use crate::sar::finalize;

/// Location of a target's SAR inside a SAR directory.
pub fn sar_path(dir: &Path, pdb_id: &str) -> PathBuf {
    dir.join(format!("{pdb_id}.json"))
}

/// Write a finalized SAR as pretty JSON; returns the path written.
pub fn write_sar_json(dir: &Path, sar: &StructuralAuditRecord) -> Result<PathBuf, AppError> {
    fs::create_dir_all(dir)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to create SAR directory '{}': {e}", dir.display())))?;

    let path = sar_path(dir, &sar.pdb_id);
    let file = File::create(&path)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to create SAR '{}': {e}", path.display())))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, sar)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write SAR '{}': {e}", path.display())))?;
    writer
        .flush()
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write SAR '{}': {e}", path.display())))?;

    Ok(path)
}

/// Read a SAR file in wire form, without validating it.
pub fn read_sar_draft(path: &Path) -> Result<SarDraft, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to open SAR '{}': {e}", path.display())))?;
    serde_json::from_reader(file)
        .map_err(|e| AppError::new(EXIT_VALIDATION, format!("Invalid SAR JSON '{}': {e}", path.display())))
}

/// Read a SAR file and run it through the same validator used at build time.
pub fn read_sar(path: &Path) -> Result<StructuralAuditRecord, AppError> {
    let draft = read_sar_draft(path)?;
    finalize(draft).map_err(|e| {
        let pdb_id = e.pdb_id().unwrap_or("?").to_string();
        AppError::new(e.exit_code(), format!("{pdb_id}: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::domain::{MetricSet, Provenance, TargetMetrics};
    use crate::sar::SarBuilder;

    fn sample_sar() -> StructuralAuditRecord {
        let input = MetricSet {
            pdb_id: "8ABC".to_string(),
            metrics: TargetMetrics {
                rmsd_global: 1.0,
                rmsd_ligand_pocket: None,
                contact_map_overlap: None,
                plddt_mean: 95.0,
                pae_mean: 3.0,
            },
            ligand_present: false,
            provenance: Provenance::default(),
        };
        SarBuilder::default().build(&input, Utc::now()).unwrap()
    }

    #[test]
    fn written_sar_reads_back_identically() {
        let dir = tempfile::tempdir().unwrap();
        let sar = sample_sar();
        let path = write_sar_json(dir.path(), &sar).unwrap();
        assert_eq!(path, dir.path().join("8ABC.json"));

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["decision_gate"], "ACCEPT");
        assert_eq!(raw["metrics"]["rmsd_ligand_pocket"], "N/A");
        assert_eq!(raw["failure_taxonomy"]["class"], "N/A");

        assert_eq!(read_sar(&path).unwrap(), sar);
    }

    #[test]
    fn sar_without_gate_fails_validation_on_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sar_json(dir.path(), &sample_sar()).unwrap();

        let mut raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        raw.as_object_mut().unwrap().remove("decision_gate");
        fs::write(&path, raw.to_string()).unwrap();

        let err = read_sar(&path).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_VALIDATION);
        assert!(err.to_string().contains("ERROR_SAR_INCOMPLETE"), "{err}");
        assert!(err.to_string().contains("decision_gate"), "{err}");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn full_disk_is_reported_not_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink("/dev/full", dir.path().join("8ABC.json")).unwrap();

        let err = write_sar_json(dir.path(), &sample_sar()).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_INPUT);
        assert!(err.to_string().contains("Failed to write SAR"), "{err}");
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_sar(&dir.path().join("nope.json")).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_INPUT);
    }
}

//! Benchmark manifest loading.
//!
//! The manifest is the governing target list: its order is the processing
//! order, and completeness is judged against it.

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use crate::domain::Manifest;
use crate::error::{AppError, SarError, EXIT_INPUT};

/// Read and check a manifest JSON file.
pub fn read_manifest(path: &Path) -> Result<Manifest, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to open manifest '{}': {e}", path.display())))?;
    let manifest: Manifest = serde_json::from_reader(file)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Invalid manifest JSON '{}': {e}", path.display())))?;

    check_manifest(&manifest)?;
    Ok(manifest)
}

/// Target ids name the `<pdb_id>.json` SAR files, so they must stay a single path component.
fn is_file_stem(pdb_id: &str) -> bool {
    !pdb_id.contains(['/', '\\', '\0']) && pdb_id != "." && pdb_id != ".."
}

/// Reject empty target lists, blank or path-like identifiers and duplicates.
pub fn check_manifest(manifest: &Manifest) -> Result<(), AppError> {
    if manifest.targets.is_empty() {
        return Err(AppError::new(EXIT_INPUT, "Manifest lists no targets."));
    }

    let mut seen = HashSet::new();
    for target in &manifest.targets {
        if target.pdb_id.trim().is_empty() {
            return Err(AppError::new(EXIT_INPUT, "Manifest contains a target with an empty pdb_id."));
        }
        if !is_file_stem(&target.pdb_id) {
            return Err(AppError::new(
                EXIT_INPUT,
                format!("Manifest target id '{}' is not a valid file name.", target.pdb_id),
            ));
        }
        if !seen.insert(target.pdb_id.as_str()) {
            return Err(SarError::DuplicateTarget {
                pdb_id: target.pdb_id.clone(),
            }
            .into());
        }
    }
    Ok(())
}

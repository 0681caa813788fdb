//! Metrics ingest and normalization.
//!
//! This module turns a metrics file produced by the prediction step (CSV or
//! JSON) into per-target records the gate engine can consume.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (a bad row becomes an input error for its target,
//!   the rest of the file still loads)
//! - **Deterministic behavior** (no fallback data is ever invented here)

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use serde::Deserialize;

use crate::domain::{not_applicable, Manifest, ManifestTarget, MetricRow, MetricSet, Provenance, TargetMetrics};
use crate::error::{AppError, SarError, EXIT_INPUT};

const REQUIRED_COLUMNS: [&str; 4] = ["pdb_id", "plddt_mean", "pae_mean", "rmsd_global"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    /// CSV line number, or 1-based position in a JSON list.
    pub line: usize,
    pub pdb_id: Option<String>,
    pub message: String,
}

/// Ingest output: per-target rows (or the reason a row was unusable) + row errors.
#[derive(Debug, Clone, Default)]
pub struct IngestedMetrics {
    rows: HashMap<String, Result<MetricRow, String>>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl IngestedMetrics {
    /// Resolve the metric set for a manifest target.
    pub fn lookup(&self, target: &ManifestTarget) -> Result<MetricSet, SarError> {
        match self.rows.get(&target.pdb_id) {
            None => Err(SarError::MissingMetrics {
                pdb_id: target.pdb_id.clone(),
            }),
            Some(Err(reason)) => Err(SarError::MalformedMetrics {
                pdb_id: target.pdb_id.clone(),
                reason: reason.clone(),
            }),
            Some(Ok(row)) => normalize_row(row, target).map_err(|reason| SarError::MalformedMetrics {
                pdb_id: target.pdb_id.clone(),
                reason,
            }),
        }
    }

    /// Number of distinct target identifiers seen.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Identifiers present in the metrics file but not in the manifest (sorted).
    pub fn unmatched_ids(&self, manifest: &Manifest) -> Vec<String> {
        let mut ids: Vec<String> = self
            .rows
            .keys()
            .filter(|id| !manifest.targets.iter().any(|t| &t.pdb_id == *id))
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    fn insert(&mut self, line: usize, pdb_id: String, row: Result<MetricRow, String>) {
        if let Err(message) = &row {
            self.row_errors.push(RowError {
                line,
                pdb_id: Some(pdb_id.clone()),
                message: message.clone(),
            });
        }

        if self.rows.contains_key(&pdb_id) {
            let message = format!("duplicate metrics record at line {line}");
            self.row_errors.push(RowError {
                line,
                pdb_id: Some(pdb_id.clone()),
                message: message.clone(),
            });
            self.rows.insert(pdb_id, Err(message));
            return;
        }

        self.rows.insert(pdb_id, row);
    }
}

/// Load a metrics file; `.json` is read as JSON, anything else as CSV.
pub fn load_metrics(path: &Path) -> Result<IngestedMetrics, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to open metrics '{}': {e}", path.display())))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        metrics_from_json_reader(file)
    } else {
        metrics_from_csv_reader(file)
    }
}

/// Parse CSV metrics with a header row.
pub fn metrics_from_csv_reader<R: Read>(reader: R) -> Result<IngestedMetrics, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to read metrics CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut out = IngestedMetrics::default();

    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1, records are 1-based after it.
        let line = idx + 2;
        out.rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                out.row_errors.push(RowError {
                    line,
                    pdb_id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let Some(pdb_id) = get_optional(&record, &header_map, "pdb_id") else {
            out.row_errors.push(RowError {
                line,
                pdb_id: None,
                message: "Missing required value: `pdb_id`".to_string(),
            });
            continue;
        };
        let pdb_id = pdb_id.to_string();

        let row = parse_row(&record, &header_map, &pdb_id);
        out.insert(line, pdb_id, row);
    }

    Ok(out)
}

/// Parse JSON metrics: either a list of records or `{ "targets": [...] }`.
pub fn metrics_from_json_reader<R: Read>(reader: R) -> Result<IngestedMetrics, AppError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Document {
        List(Vec<serde_json::Value>),
        Wrapped { targets: Vec<serde_json::Value> },
    }

    let document: Document = serde_json::from_reader(reader)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Invalid metrics JSON: {e}")))?;
    let values = match document {
        Document::List(values) | Document::Wrapped { targets: values } => values,
    };

    let mut out = IngestedMetrics::default();
    for (idx, value) in values.into_iter().enumerate() {
        let line = idx + 1;
        out.rows_read += 1;

        let pdb_id = value
            .get("pdb_id")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let Some(pdb_id) = pdb_id else {
            out.row_errors.push(RowError {
                line,
                pdb_id: None,
                message: "Missing required value: `pdb_id`".to_string(),
            });
            continue;
        };

        let row = serde_json::from_value::<MetricRow>(value).map_err(|e| format!("Invalid metrics record: {e}"));
        out.insert(line, pdb_id, row);
    }

    Ok(out)
}

/// Normalize a raw row against its manifest target.
///
/// The manifest's `ligand_present` applies when the row does not say; the
/// pocket deviation is dropped (not applicable) for ligand-free targets.
pub fn normalize_row(row: &MetricRow, target: &ManifestTarget) -> Result<MetricSet, String> {
    let plddt_mean = row.plddt_mean.ok_or("Missing required value: `plddt_mean`")?;
    let pae_mean = row.pae_mean.ok_or("Missing required value: `pae_mean`")?;
    let rmsd_global = row.rmsd_global.ok_or("Missing required value: `rmsd_global`")?;

    let ligand_present = row.ligand_present.unwrap_or(target.ligand_present);
    let rmsd_ligand_pocket = if ligand_present { row.rmsd_ligand_pocket } else { None };

    let defaults = Provenance::default();
    let set = MetricSet {
        pdb_id: target.pdb_id.clone(),
        metrics: TargetMetrics {
            rmsd_global,
            rmsd_ligand_pocket,
            contact_map_overlap: row.contact_map_overlap,
            plddt_mean,
            pae_mean,
        },
        ligand_present,
        provenance: Provenance {
            model_version: row.model_version.clone().unwrap_or(defaults.model_version),
            seed: row.seed.unwrap_or(defaults.seed),
            recycles: row.recycles.unwrap_or(defaults.recycles),
            stub_output: row.stub_output.unwrap_or(defaults.stub_output),
        },
    };

    set.check()?;
    Ok(set)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !header_map.contains_key(*c))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(AppError::new(
        EXIT_INPUT,
        format!("Metrics CSV is missing required column(s): {}", missing.join(", ")),
    ))
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>, pdb_id: &str) -> Result<MetricRow, String> {
    let rmsd_ligand_pocket = match get_optional(record, header_map, "rmsd_ligand_pocket") {
        Some(s) => not_applicable::parse_text(s).map_err(|e| format!("`rmsd_ligand_pocket`: {e}"))?,
        None => None,
    };

    Ok(MetricRow {
        pdb_id: pdb_id.to_string(),
        plddt_mean: Some(parse_f64(get_required(record, header_map, "plddt_mean")?, "plddt_mean")?),
        pae_mean: Some(parse_f64(get_required(record, header_map, "pae_mean")?, "pae_mean")?),
        rmsd_global: Some(parse_f64(get_required(record, header_map, "rmsd_global")?, "rmsd_global")?),
        rmsd_ligand_pocket,
        ligand_present: get_optional(record, header_map, "ligand_present")
            .map(|s| parse_bool(s, "ligand_present"))
            .transpose()?,
        contact_map_overlap: get_optional(record, header_map, "contact_map_overlap")
            .map(|s| parse_f64(s, "contact_map_overlap"))
            .transpose()?,
        model_version: get_optional(record, header_map, "model_version").map(str::to_string),
        seed: get_optional(record, header_map, "seed")
            .map(|s| parse_i64(s, "seed"))
            .transpose()?,
        recycles: get_optional(record, header_map, "recycles")
            .map(|s| parse_i64(s, "recycles"))
            .transpose()?,
        stub_output: get_optional(record, header_map, "stub_output")
            .map(|s| parse_bool(s, "stub_output"))
            .transpose()?,
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_f64(s: &str, name: &str) -> Result<f64, String> {
    s.parse::<f64>()
        .map_err(|_| format!("`{name}`: expected a number, got '{s}'"))
}

fn parse_i64(s: &str, name: &str) -> Result<i64, String> {
    s.parse::<i64>()
        .map_err(|_| format!("`{name}`: expected an integer, got '{s}'"))
}

fn parse_bool(s: &str, name: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" => Ok(false),
        _ => Err(format!("`{name}`: expected true/false, got '{s}'")),
    }
}

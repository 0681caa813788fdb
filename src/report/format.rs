//! Formatted terminal and markdown output.
//!
//! We keep formatting code in one place so:
//! - the gate rules stay clean and testable
//! - output changes are localized (table layouts are covered by tests below)

use chrono::{DateTime, Utc};

use crate::calibration::{CalibrationSummary, MIN_POPULATED_BANDS};
use crate::domain::{ConfidenceBand, DecisionGate, FailureClass, StructuralAuditRecord};
use crate::gate::expected_error_range;
use crate::sar::BatchReport;

use super::RunSummary;

/// Per-target SAR table (input order).
pub fn format_sar_table(records: &[StructuralAuditRecord]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<10} {:>7} {:>7} {:>8} {:<8} {:>12} {:<8} {:<7}\n",
            "pdb_id", "plddt", "pae", "rmsd", "conf", "expected", "class", "gate"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<10} {:-<7} {:-<7} {:-<8} {:-<8} {:-<12} {:-<8} {:-<7}\n",
            "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for sar in records {
        let m = &sar.metrics;
        let range = &sar.expected_error_range;
        out.push_str(
            format!(
                "{:<10} {:>7.1} {:>7.2} {:>8.2} {:<8} {:>12} {:<8} {:<7}\n",
                truncate(&sar.pdb_id, 10),
                m.plddt_mean,
                m.pae_mean,
                m.rmsd_global,
                sar.confidence_assessment.overall_confidence.as_str(),
                format!("{:.1}-{:.1}", range.rmsd_min, range.rmsd_max),
                sar.failure_taxonomy.class.as_str(),
                sar.decision_gate.as_str(),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Run summary for `sar evaluate`: counts, gate distribution, failures.
pub fn format_batch_summary(batch: &BatchReport) -> String {
    let summary = RunSummary::from_records(&batch.records);
    let mut out = String::new();

    out.push_str("=== sar - Structural Audit Records ===\n");
    out.push_str(&format!(
        "Targets: {} | SARs: {} | failures: {}\n",
        batch.expected.len(),
        batch.records.len(),
        batch.failures.len()
    ));

    out.push_str("\nDecision gates:\n");
    for gate in DecisionGate::ALL {
        let n = summary.gate_count(gate);
        out.push_str(&format!("  {:<7} {:>4} ({:>5.1}%)\n", gate.as_str(), n, summary.percent(n)));
    }

    if !batch.failures.is_empty() {
        out.push_str("\nFailed targets:\n");
        for failure in &batch.failures {
            out.push_str(&format!("  {}: {}\n", failure.pdb_id, failure.error));
        }
    }

    if batch.halted {
        out.push_str(&format!(
            "\nStrict mode: halted at first failure ({} target(s) not evaluated)\n",
            batch.skipped()
        ));
    }

    out
}

/// Calibration table: expected range vs observed statistics per band.
pub fn format_calibration_table(summary: &CalibrationSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Calibration: {} target(s), {}/{} band(s) populated -> {}\n",
        summary.total_targets,
        summary.confidence_bins,
        ConfidenceBand::ALL.len(),
        if summary.pass { "PASS" } else { "INSUFFICIENT" }
    ));
    out.push_str(
        format!(
            "{:<8} {:>10} {:>4} {:>7} {:>7} {:>7} {:>7} {:>7}\n",
            "band", "expected", "n", "mean", "std", "median", "min", "max"
        )
        .trim_end(),
    );
    out.push('\n');

    for band in ConfidenceBand::ALL {
        let range = expected_error_range(band);
        let expected = format!("{:.1}-{:.1}", range.rmsd_min, range.rmsd_max);
        let line = match summary.band(band) {
            Some(s) => format!(
                "{:<8} {:>10} {:>4} {:>7.2} {:>7.2} {:>7.2} {:>7.2} {:>7.2}",
                band.as_str(),
                expected,
                s.n_samples,
                s.rmsd_mean,
                s.rmsd_std,
                s.rmsd_median,
                s.rmsd_min,
                s.rmsd_max
            ),
            None => format!("{:<8} {:>10} {:>4}", band.as_str(), expected, 0),
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }

    if !summary.pass {
        out.push_str(&format!(
            "warning: calibration needs at least {MIN_POPULATED_BANDS} populated confidence bands\n"
        ));
    }

    out
}

/// `SAR_SUMMARY.md` body.
pub fn format_summary_markdown(
    records: &[StructuralAuditRecord],
    calibration: &CalibrationSummary,
    generated: DateTime<Utc>,
) -> String {
    let summary = RunSummary::from_records(records);
    let mut out = String::new();

    out.push_str("# SAR Summary\n\n");
    out.push_str(&format!("Generated: {}\n\n", generated.to_rfc3339()));
    out.push_str(&format!("Total targets: {}\n\n", summary.total));

    out.push_str("## Decision Gates\n\n");
    out.push_str("| Gate | Count | Share |\n|------|------:|------:|\n");
    for gate in DecisionGate::ALL {
        let n = summary.gate_count(gate);
        out.push_str(&format!("| {} | {} | {:.1}% |\n", gate.as_str(), n, summary.percent(n)));
    }

    out.push_str("\n## Failure Taxonomy\n\n");
    out.push_str("| Class | Meaning | Count |\n|-------|---------|------:|\n");
    for class in FailureClass::ALL {
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            class.as_str(),
            class.label(),
            summary.class_count(class)
        ));
    }

    out.push_str("\n## Calibration\n\n");
    out.push_str(&format!(
        "{} of {} confidence bands populated: {}\n",
        calibration.confidence_bins,
        ConfidenceBand::ALL.len(),
        if calibration.pass { "PASS" } else { "INSUFFICIENT" }
    ));

    let mut sorted: Vec<&StructuralAuditRecord> = records.iter().collect();
    sorted.sort_by(|a, b| a.pdb_id.cmp(&b.pdb_id));

    out.push_str("\n## Targets\n\n");
    out.push_str("| PDB ID | Confidence | RMSD (Å) | Expected (Å) | Class | Gate |\n");
    out.push_str("|--------|------------|---------:|-------------:|-------|------|\n");
    for sar in sorted {
        out.push_str(&format!(
            "| {} | {} | {:.2} | {:.1}-{:.1} | {} | {} |\n",
            sar.pdb_id,
            sar.confidence_assessment.overall_confidence,
            sar.metrics.rmsd_global,
            sar.expected_error_range.rmsd_min,
            sar.expected_error_range.rmsd_max,
            sar.failure_taxonomy.class,
            sar.decision_gate,
        ));
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

//! ASCII calibration chart for terminal output.
//!
//! This is intentionally "dumb" (fixed-width rows on a shared axis), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Per confidence band, two rows:
//! - `exp`: expected deviation range, `[===]`
//! - `obs`: observed min..max span `o---o` with the mean marked `*`

use crate::calibration::CalibrationSummary;
use crate::domain::ConfidenceBand;
use crate::gate::expected_error_range;

/// Render expected vs observed deviation per band.
pub fn render_calibration_chart(summary: &CalibrationSummary, width: usize) -> String {
    let width = width.max(10);

    let observed_max = summary
        .calibration_data
        .values()
        .map(|s| s.rmsd_max)
        .fold(0.0_f64, f64::max);
    let expected_max = ConfidenceBand::ALL
        .iter()
        .map(|&b| expected_error_range(b).rmsd_max)
        .fold(0.0_f64, f64::max);
    let (_, x_max) = pad_range(0.0, observed_max.max(expected_max), 0.05);
    let x_min = 0.0;

    let mut out = String::new();
    out.push_str(&format!("Calibration chart: rmsd [{x_min:.2}, {x_max:.2}] Å\n"));

    for band in ConfidenceBand::ALL {
        let range = expected_error_range(band);
        let mut row = vec![' '; width];
        let a = map_x(range.rmsd_min, x_min, x_max, width);
        let b = map_x(range.rmsd_max, x_min, x_max, width);
        draw_span(&mut row, a, b, '=');
        row[a] = '[';
        row[b] = ']';
        out.push_str(&format!("{:<6} exp |{}|\n", band.as_str(), row.into_iter().collect::<String>()));

        match summary.band(band) {
            Some(stats) => {
                let mut row = vec![' '; width];
                let lo = map_x(stats.rmsd_min, x_min, x_max, width);
                let hi = map_x(stats.rmsd_max, x_min, x_max, width);
                draw_span(&mut row, lo, hi, '-');
                row[lo] = 'o';
                row[hi] = 'o';
                row[map_x(stats.rmsd_mean, x_min, x_max, width)] = '*';
                out.push_str(&format!("{:<6} obs |{}|\n", "", row.into_iter().collect::<String>()));
            }
            None => out.push_str(&format!("{:<6} obs | (no samples)\n", "")),
        }
    }

    // Axis labels under the row frame.
    let right = format!("{x_max:.2}");
    let fill = (width + 2).saturating_sub(1 + right.len());
    out.push_str(&format!("{:<11}0{}{right}\n", "", " ".repeat(fill)));

    out
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn draw_span(row: &mut [char], x0: usize, x1: usize, ch: char) {
    let (lo, hi) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
    for cell in row.iter_mut().take(hi + 1).skip(lo) {
        *cell = ch;
    }
}

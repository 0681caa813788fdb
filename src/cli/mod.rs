//! Command-line parsing for the structural audit gate.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the gate rules. Options marked with `env` may also come from the
//! environment (or a `.env` file loaded at startup).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::Level;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sar", version, about = "Structural audit records and decision gates for structure predictions")]
pub struct Cli {
    #[command(flatten)]
    pub log: LogArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Global logging options.
#[derive(Debug, Args, Clone)]
pub struct LogArgs {
    /// Log level for diagnostics on stderr (RUST_LOG overrides).
    #[arg(long, global = true, env = "SAR_LOG_LEVEL", default_value = "info")]
    pub log_level: Level,

    /// Emit diagnostics as JSON lines.
    #[arg(long, global = true, env = "SAR_LOG_JSON")]
    pub log_json: bool,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate every manifest target and write one SAR JSON per target.
    Evaluate(EvaluateArgs),
    /// Validate a SAR directory against the manifest and write the batch reports.
    Compile(CompileArgs),
    /// Write deterministic stand-in metrics for a manifest (dry runs).
    Stub(StubArgs),
}

/// Options for `sar evaluate`.
#[derive(Debug, Args, Clone)]
pub struct EvaluateArgs {
    /// Benchmark manifest JSON.
    #[arg(long, value_name = "JSON")]
    pub manifest: PathBuf,

    /// Metrics file (CSV, or JSON when the extension is `.json`).
    #[arg(long, value_name = "FILE")]
    pub metrics: PathBuf,

    /// Directory for per-target SAR files.
    #[arg(long, value_name = "DIR", default_value = "sars")]
    pub output_dir: PathBuf,

    /// SAR schema version stamped on each record.
    #[arg(long, env = "SAR_SCHEMA_VERSION", default_value = crate::sar::SAR_VERSION)]
    pub schema_version: String,

    /// Halt at the first failing target instead of recording it and continuing.
    #[arg(long, env = "SAR_STRICT_MODE")]
    pub strict: bool,

    /// Export the SAR table to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Render the calibration chart in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal chart.
    #[arg(long)]
    pub no_plot: bool,

    /// Chart width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,
}

/// Options for `sar compile`.
#[derive(Debug, Args, Clone)]
pub struct CompileArgs {
    /// Benchmark manifest JSON.
    #[arg(long, value_name = "JSON")]
    pub manifest: PathBuf,

    /// Directory holding `<pdb_id>.json` SAR files.
    #[arg(long, value_name = "DIR", default_value = "sars")]
    pub sar_dir: PathBuf,

    /// Directory for the reports (defaults to the SAR directory).
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Job identifier recorded in the provenance file.
    #[arg(long, default_value = "sar-compile")]
    pub job_id: String,

    /// Render the calibration chart in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal chart.
    #[arg(long)]
    pub no_plot: bool,

    /// Chart width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,
}

/// Options for `sar stub`.
#[derive(Debug, Args, Clone)]
pub struct StubArgs {
    /// Benchmark manifest JSON.
    #[arg(long, value_name = "JSON")]
    pub manifest: PathBuf,

    /// Output metrics JSON.
    #[arg(long, value_name = "JSON", default_value = "stub_metrics.json")]
    pub output: PathBuf,

    /// Base random seed (locked value: 42).
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Recycle count recorded in provenance (locked value: 3).
    #[arg(long, default_value_t = 3)]
    pub recycles: u32,

    /// Model version recorded in provenance.
    #[arg(long, default_value = "af3_stub")]
    pub model_version: String,
}

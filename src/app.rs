//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs logging
//! - runs the requested command via `pipeline`
//! - prints tables/charts and maps outcomes to exit codes

use clap::Parser;
use tracing::warn;

use crate::cli::{Cli, Command, CompileArgs, EvaluateArgs, StubArgs};
use crate::domain::{CompileConfig, EvaluateConfig, StubConfig, ValidationMode};
use crate::error::{AppError, EXIT_CALIBRATION, EXIT_VALIDATION};
use crate::logging::{init_logging, LoggingConfig};

pub mod pipeline;

/// Entry point for the `sar` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env file is fine; real environment variables still apply.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(&LoggingConfig {
        level: cli.log.log_level,
        json_format: cli.log.log_json,
    });

    match cli.command {
        Command::Evaluate(args) => handle_evaluate(&args),
        Command::Compile(args) => handle_compile(&args),
        Command::Stub(args) => handle_stub(&args),
    }
}

fn handle_evaluate(args: &EvaluateArgs) -> Result<(), AppError> {
    let config = evaluate_config_from_args(args);
    let run = pipeline::run_evaluate(&config)?;

    if !run.batch.records.is_empty() {
        println!("{}", crate::report::format_sar_table(&run.batch.records));
    }
    println!("{}", crate::report::format_batch_summary(&run.batch));
    println!("{}", crate::report::format_calibration_table(&run.calibration));

    if config.plot && !run.batch.records.is_empty() {
        println!("{}", crate::plot::render_calibration_chart(&run.calibration, config.plot_width));
    }

    if let Some(path) = &config.export_csv {
        crate::io::export::write_sar_table_csv(path, &run.batch.records)?;
    }

    if let Some(first) = run.batch.failures.first() {
        if run.batch.halted {
            return Err(AppError::new(
                EXIT_VALIDATION,
                format!("strict mode: halted at {}: {}", first.pdb_id, first.error),
            ));
        }
    }
    run.batch.completeness()?;

    if !run.calibration.pass {
        warn!(
            bands = run.calibration.confidence_bins,
            "calibration insufficient: fewer than 3 populated confidence bands"
        );
    }
    Ok(())
}

fn handle_compile(args: &CompileArgs) -> Result<(), AppError> {
    let config = compile_config_from_args(args);
    let command_line = std::env::args().collect::<Vec<_>>().join(" ");
    let run = pipeline::run_compile(&config, &command_line)?;

    println!("{}", crate::report::format_sar_table(&run.records));
    println!("{}", crate::report::format_calibration_table(&run.calibration));
    if config.plot {
        println!("{}", crate::plot::render_calibration_chart(&run.calibration, config.plot_width));
    }
    for path in &run.outputs {
        println!("wrote {}", path.display());
    }

    if !run.calibration.pass {
        warn!(
            bands = run.calibration.confidence_bins,
            "calibration insufficient: fewer than 3 populated confidence bands"
        );
        return Err(AppError::new(
            EXIT_CALIBRATION,
            format!(
                "calibration insufficient: {} of 3 confidence bands populated",
                run.calibration.confidence_bins
            ),
        ));
    }
    Ok(())
}

fn handle_stub(args: &StubArgs) -> Result<(), AppError> {
    let config = stub_config_from_args(args);
    let fixture = pipeline::run_stub(&config)?;
    println!(
        "wrote stub metrics for {} target(s) to {}",
        fixture.targets.len(),
        config.output.display()
    );
    Ok(())
}

pub fn evaluate_config_from_args(args: &EvaluateArgs) -> EvaluateConfig {
    EvaluateConfig {
        manifest_path: args.manifest.clone(),
        metrics_path: args.metrics.clone(),
        output_dir: args.output_dir.clone(),
        schema_version: args.schema_version.clone(),
        mode: ValidationMode::from_strict_flag(args.strict),
        export_csv: args.export.clone(),
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
    }
}

pub fn compile_config_from_args(args: &CompileArgs) -> CompileConfig {
    CompileConfig {
        manifest_path: args.manifest.clone(),
        sar_dir: args.sar_dir.clone(),
        output_dir: args.output_dir.clone().unwrap_or_else(|| args.sar_dir.clone()),
        job_id: args.job_id.clone(),
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
    }
}

pub fn stub_config_from_args(args: &StubArgs) -> StubConfig {
    StubConfig {
        manifest_path: args.manifest.clone(),
        output: args.output.clone(),
        seed: args.seed,
        recycles: args.recycles,
        model_version: args.model_version.clone(),
    }
}

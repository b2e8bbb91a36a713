//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments
//! - reads stations and runs the fit pipeline
//! - prints reports
//! - writes optional exports

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, FitArgs, SynthArgs};
use crate::data::{SyntheticConfig, generate_stations};
use crate::domain::{FitConfig, ModelParams};
use crate::error::AppError;
use crate::io::ResultFile;

pub mod pipeline;

/// Entry point for the `slip` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Synth(args) => handle_synth(args),
    }
}

/// Install the fmt subscriber. Logs go to stderr; reports go to stdout.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // A second init (e.g. in tests) is harmless; ignore it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);

    let ingest = crate::io::load_stations(&config.csv_path)?;
    info!(
        rows = ingest.rows_read,
        stations = ingest.stations.len(),
        skipped = ingest.row_errors.len(),
        "loaded stations"
    );

    let run = pipeline::run_fit(&config, &ingest.stations)?;

    print!(
        "{}",
        crate::report::format_run_summary(
            &run.geometry,
            &config,
            &run.search,
            Some(&run.uncertainty),
            run.refinement.as_ref(),
        )
    );

    if !ingest.row_errors.is_empty() {
        println!("Skipped rows:");
        for e in &ingest.row_errors {
            println!(
                "  line {} ({}): {}",
                e.line,
                e.id.as_deref().unwrap_or("?"),
                e.message
            );
        }
        println!();
    }

    if config.show_residuals {
        println!("Residuals:");
        println!("{}", crate::report::format_residual_table(&run.residuals));
    } else if config.top_n > 0 {
        println!("Largest normalized residuals:");
        let top = crate::report::rank_outliers(&run.residuals, config.top_n);
        println!("{}", crate::report::format_residual_table(&top));
    }

    if let Some(path) = &config.export_residuals {
        crate::io::write_residuals_csv(path, &run.residuals)?;
        info!(path = %path.display(), "wrote residuals");
    }
    if let Some(path) = &config.export_result {
        let range = distance_range(&run.observations.distance_km);
        let file = ResultFile::new(
            &run.geometry,
            &run.search,
            Some(run.uncertainty.clone()),
            run.refinement.clone(),
            range,
        )?;
        crate::io::write_result_json(path, &file)?;
        info!(path = %path.display(), "wrote result");
    }

    Ok(())
}

fn handle_synth(args: SynthArgs) -> Result<(), AppError> {
    let config = SyntheticConfig {
        fault_start: args.start,
        fault_end: args.end,
        params: ModelParams::new(args.slip, args.depth, args.offset),
        n_stations: args.stations,
        extent: args.extent,
        sigma: args.sigma,
        noise_scale: args.noise_scale,
        seed: args.seed,
    };
    let stations = generate_stations(&config)?;

    match &args.output {
        Some(path) => {
            crate::io::write_stations_csv(path, &stations)?;
            info!(path = %path.display(), stations = stations.len(), "wrote synthetic stations");
        }
        None => crate::io::write_stations(std::io::stdout().lock(), &stations)?,
    }
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        csv_path: args.csv.clone(),
        fault_start: args.start,
        fault_end: args.end,
        utm_zone: args.utm_zone,
        slip_min: args.slip_min,
        slip_max: args.slip_max,
        slip_step: args.slip_step,
        depth_min: args.depth_min,
        depth_max: args.depth_max,
        depth_step: args.depth_step,
        confidence: args.confidence,
        scale_by_reduced_chi2: args.scale_by_chi2,
        refine: !args.no_refine,
        top_n: args.top,
        show_residuals: args.residuals,
        export_residuals: args.export.clone(),
        export_result: args.export_result.clone(),
    }
}

/// Span of the observed distances, padded by 10% on each side.
fn distance_range(distances: &[f64]) -> (f64, f64) {
    let lo = distances.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = distances.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let pad = 0.1 * (hi - lo);
    (lo - pad, hi + pad)
}

//! Command-line parsing for the fault slip grid search.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the projection/search code.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::domain::{ConfidenceLevel, GeoPoint};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "slip",
    version,
    about = "Strike-slip fault slip rate and locking depth from GNSS velocities"
)]
pub struct Cli {
    /// Verbosity (-v info, -vv debug, -vvv trace). Defaults to `RUST_LOG` or warn.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Project stations onto the fault profile and grid-search slip rate and locking depth.
    Fit(FitArgs),
    /// Generate a synthetic station CSV from a known fault model.
    Synth(SynthArgs),
}

/// Options for `slip fit`.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Station velocity CSV (id, lon, lat, ve, vn, se, sn[, corr]).
    #[arg(short = 'f', long = "file", value_name = "CSV")]
    pub csv: PathBuf,

    /// First fault endpoint as `lon,lat`.
    #[arg(long, value_parser = parse_geo_point, allow_hyphen_values = true)]
    pub start: GeoPoint,

    /// Second fault endpoint as `lon,lat`.
    #[arg(long, value_parser = parse_geo_point, allow_hyphen_values = true)]
    pub end: GeoPoint,

    /// Force a UTM zone (1-60) instead of using the fault midpoint's zone.
    #[arg(long)]
    pub utm_zone: Option<u8>,

    /// Minimum slip rate.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub slip_min: f64,

    /// Maximum slip rate.
    #[arg(long, default_value_t = 50.0, allow_negative_numbers = true)]
    pub slip_max: f64,

    /// Slip rate step.
    #[arg(long, default_value_t = 0.5)]
    pub slip_step: f64,

    /// Minimum locking depth (km, > 0).
    #[arg(long, default_value_t = 1.0)]
    pub depth_min: f64,

    /// Maximum locking depth (km).
    #[arg(long, default_value_t = 40.0)]
    pub depth_max: f64,

    /// Locking depth step (km).
    #[arg(long, default_value_t = 0.5)]
    pub depth_step: f64,

    /// Joint confidence level for the reported bounds.
    #[arg(long, value_enum, default_value_t = ConfidenceLevel::OneSigma)]
    pub confidence: ConfidenceLevel,

    /// Inflate the Δχ² threshold by the reduced χ² when it exceeds 1.
    #[arg(long)]
    pub scale_by_chi2: bool,

    /// Skip the closed-form slip/offset refinement.
    #[arg(long)]
    pub no_refine: bool,

    /// List the N stations with the largest normalized residuals.
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Print the full residual table.
    #[arg(long)]
    pub residuals: bool,

    /// Export per-station residuals to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the search result (parameters, uncertainty, surface) to JSON.
    #[arg(long = "export-result")]
    pub export_result: Option<PathBuf>,
}

/// Options for `slip synth`.
#[derive(Debug, Parser, Clone)]
pub struct SynthArgs {
    /// First fault endpoint as `lon,lat`.
    #[arg(long, value_parser = parse_geo_point, allow_hyphen_values = true)]
    pub start: GeoPoint,

    /// Second fault endpoint as `lon,lat`.
    #[arg(long, value_parser = parse_geo_point, allow_hyphen_values = true)]
    pub end: GeoPoint,

    /// True slip rate.
    #[arg(long, default_value_t = 20.0, allow_negative_numbers = true)]
    pub slip: f64,

    /// True locking depth (km).
    #[arg(long, default_value_t = 15.0)]
    pub depth: f64,

    /// True velocity offset.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub offset: f64,

    /// Number of stations.
    #[arg(short = 'n', long, default_value_t = 50)]
    pub stations: usize,

    /// Station span in fault half-lengths from the midpoint.
    #[arg(long, default_value_t = 1.0)]
    pub extent: f64,

    /// Stated 1σ on each velocity component.
    #[arg(long, default_value_t = 0.5)]
    pub sigma: f64,

    /// Noise actually added, as a multiple of `--sigma` (0 = noise-free).
    #[arg(long, default_value_t = 1.0)]
    pub noise_scale: f64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Output CSV (stdout when omitted).
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

/// Parse `lon,lat` into a [`GeoPoint`].
pub fn parse_geo_point(s: &str) -> Result<GeoPoint, String> {
    let (lon, lat) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `lon,lat`, got {s:?}"))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|e| format!("invalid longitude {lon:?}: {e}"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|e| format!("invalid latitude {lat:?}: {e}"))?;
    if !(lon.is_finite() && lat.is_finite()) {
        return Err(format!("coordinates must be finite, got {s:?}"));
    }
    Ok(GeoPoint::new(lon, lat))
}

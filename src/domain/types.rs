//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during projection and search
//! - exported to JSON/CSV
//! - passed between pipeline stages as immutable values

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// A position in a local planar (UTM) frame, in kilometers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanarPoint {
    pub easting: f64,
    pub northing: f64,
}

/// One GNSS station: position, horizontal velocity, and 1σ errors.
///
/// Velocity and error units are whatever the input uses (typically mm/yr); the
/// fitted slip rate and offset come out in the same unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub lon: f64,
    pub lat: f64,
    pub ve: f64,
    pub vn: f64,
    pub se: f64,
    pub sn: f64,
    /// North-east correlation coefficient.
    ///
    /// Carried through ingest and export but not used by error propagation,
    /// which assumes independent components.
    pub corr: f64,
}

impl Station {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lon, self.lat)
    }
}

/// Parameters of the arctangent interseismic model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// Slip rate at depth (velocity units).
    pub slip_rate: f64,
    /// Locking depth (km). Must be non-zero.
    pub locking_depth: f64,
    /// Constant velocity offset (velocity units).
    pub offset: f64,
}

impl ModelParams {
    pub fn new(slip_rate: f64, locking_depth: f64, offset: f64) -> Self {
        Self {
            slip_rate,
            locking_depth,
            offset,
        }
    }
}

/// Profile-projected observations.
///
/// The parallel arrays share one ordering (the station input order).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObservationSet {
    pub station_ids: Vec<String>,
    /// Signed distance along the profile from its origin (km).
    pub distance_km: Vec<f64>,
    /// Fault-parallel velocity.
    pub velocity: Vec<f64>,
    /// Propagated 1σ error of `velocity`.
    pub sigma: Vec<f64>,
}

impl ObservationSet {
    pub fn len(&self) -> usize {
        self.distance_km.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distance_km.is_empty()
    }
}

/// A per-station fitted result (used for reports and exports).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationResidual {
    pub id: String,
    pub distance_km: f64,
    pub v_obs: f64,
    pub sigma: f64,
    pub v_model: f64,
    pub residual: f64,
}

impl StationResidual {
    /// Residual in units of its σ.
    pub fn normalized(&self) -> f64 {
        self.residual / self.sigma
    }
}

/// Joint confidence level for the 2-parameter (slip, depth) region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    /// 68.3% (1σ).
    #[value(name = "68")]
    #[serde(rename = "68")]
    OneSigma,
    /// 95.4% (2σ).
    #[value(name = "95")]
    #[serde(rename = "95")]
    TwoSigma,
    /// 99.7% (3σ).
    #[value(name = "99")]
    #[serde(rename = "99")]
    ThreeSigma,
}

impl ConfidenceLevel {
    /// Δχ² for a joint region over two parameters.
    pub fn delta_chi2(self) -> f64 {
        match self {
            ConfidenceLevel::OneSigma => 2.30,
            ConfidenceLevel::TwoSigma => 6.18,
            ConfidenceLevel::ThreeSigma => 11.83,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ConfidenceLevel::OneSigma => "68.3%",
            ConfidenceLevel::TwoSigma => "95.4%",
            ConfidenceLevel::ThreeSigma => "99.7%",
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub csv_path: PathBuf,

    pub fault_start: GeoPoint,
    pub fault_end: GeoPoint,
    /// Force a UTM zone instead of deriving it from the fault midpoint.
    pub utm_zone: Option<u8>,

    pub slip_min: f64,
    pub slip_max: f64,
    pub slip_step: f64,
    pub depth_min: f64,
    pub depth_max: f64,
    pub depth_step: f64,

    pub confidence: ConfidenceLevel,
    /// Inflate the Δχ² threshold by the reduced χ² when it exceeds 1.
    pub scale_by_reduced_chi2: bool,
    /// Run the closed-form slip/offset refinement along the depth axis.
    pub refine: bool,

    /// Number of largest normalized residuals to list.
    pub top_n: usize,
    /// Print the full residual table.
    pub show_residuals: bool,

    pub export_residuals: Option<PathBuf>,
    pub export_result: Option<PathBuf>,
}

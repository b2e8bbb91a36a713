//! Read/write search result JSON files.
//!
//! The result JSON is the hand-off to external plotting/reporting:
//! - fault geometry summary and best-fit parameters
//! - uncertainty and optional linear refinement
//! - grid axes plus the full penalty surface
//! - a sampled model profile for quick plotting

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{GeoPoint, ModelParams};
use crate::error::AppError;
use crate::fit::{GridSearchResult, LinearRefinement, SearchGrid, Uncertainty};
use crate::geo::FaultGeometry;
use crate::models::predict_many;

/// Number of samples in the exported model profile.
const PROFILE_SAMPLES: usize = 201;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultSummary {
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub utm_zone: u8,
    pub south: bool,
    pub strike_deg: f64,
    pub length_km: f64,
}

impl From<&FaultGeometry> for FaultSummary {
    fn from(g: &FaultGeometry) -> Self {
        Self {
            start: g.start,
            end: g.end,
            utm_zone: g.projector().zone(),
            south: g.projector().is_south(),
            strike_deg: g.strike.to_degrees(),
            length_km: g.length_km,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelProfile {
    pub distance_km: Vec<f64>,
    pub velocity: Vec<f64>,
}

/// A saved search result (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub fault: FaultSummary,
    pub n_stations: usize,
    pub best: ModelParams,
    pub penalty: f64,
    pub uncertainty: Option<Uncertainty>,
    pub refinement: Option<LinearRefinement>,
    pub grid: SearchGrid,
    /// Penalty surface rows (one per slip rate, columns follow `grid.depth`).
    pub surface: Vec<Vec<f64>>,
    pub profile: ModelProfile,
}

impl ResultFile {
    pub fn new(
        geometry: &FaultGeometry,
        search: &GridSearchResult,
        uncertainty: Option<Uncertainty>,
        refinement: Option<LinearRefinement>,
        distance_range: (f64, f64),
    ) -> Result<Self, AppError> {
        Ok(Self {
            tool: "slip".to_string(),
            generated_at: Utc::now(),
            fault: FaultSummary::from(geometry),
            n_stations: search.n_obs,
            best: search.best,
            penalty: search.penalty,
            uncertainty,
            refinement,
            grid: search.grid.clone(),
            surface: search.surface.rows(),
            profile: build_profile(&search.best, distance_range, PROFILE_SAMPLES)?,
        })
    }
}

/// Write a result JSON file.
pub fn write_result_json(path: &Path, result: &ResultFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create result JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, result)
        .map_err(|e| AppError::new(2, format!("Failed to write result JSON: {e}")))?;
    Ok(())
}

/// Read a result JSON file.
pub fn read_result_json(path: &Path) -> Result<ResultFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open result JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid result JSON: {e}")))
}

fn build_profile(params: &ModelParams, range: (f64, f64), n: usize) -> Result<ModelProfile, AppError> {
    let n = n.max(2);
    let (mut x0, mut x1) = range;
    if !(x0.is_finite() && x1.is_finite()) || x1 <= x0 {
        // Fall back to ±5 locking depths around the trace.
        x0 = -5.0 * params.locking_depth;
        x1 = 5.0 * params.locking_depth;
    }

    let distance_km: Vec<f64> = (0..n)
        .map(|i| x0 + (x1 - x0) * i as f64 / (n as f64 - 1.0))
        .collect();
    let velocity = predict_many(&distance_km, params)?;

    Ok(ModelProfile {
        distance_km,
        velocity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_spans_requested_range() {
        let p = ModelParams::new(20.0, 10.0, 1.0);
        let prof = build_profile(&p, (-30.0, 30.0), 61).unwrap();
        assert_eq!(prof.distance_km.len(), 61);
        assert_eq!(prof.distance_km[0], -30.0);
        assert_eq!(prof.distance_km[60], 30.0);
        assert!((prof.velocity[30] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_range_falls_back_to_locking_depths() {
        let p = ModelParams::new(20.0, 10.0, 0.0);
        let prof = build_profile(&p, (3.0, 3.0), 11).unwrap();
        assert_eq!(prof.distance_km[0], -50.0);
        assert_eq!(prof.distance_km[10], 50.0);
    }
}

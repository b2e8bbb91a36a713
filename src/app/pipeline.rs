//! Shared "fit pipeline" logic.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! geometry -> projection -> grid search -> uncertainty -> refinement -> residuals
//!
//! Each stage hands the next an immutable value; the CLI then focuses on
//! presentation and exports.

use tracing::{info, warn};

use crate::domain::{FitConfig, ObservationSet, Station, StationResidual};
use crate::error::FaultResult;
use crate::fit::{
    GridSearchResult, LinearRefinement, ParamRange, SearchGrid, Uncertainty, estimate_uncertainty, grid_search,
    refine_along_depth,
};
use crate::geo::{FaultGeometry, UtmProjector, build_observations};
use crate::report::compute_residuals;

/// All computed outputs of a single `slip fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub geometry: FaultGeometry,
    pub observations: ObservationSet,
    pub search: GridSearchResult,
    pub uncertainty: Uncertainty,
    pub refinement: Option<LinearRefinement>,
    pub residuals: Vec<StationResidual>,
}

/// Build the fault geometry, honoring a forced UTM zone.
pub fn build_geometry(config: &FitConfig) -> FaultResult<FaultGeometry> {
    match config.utm_zone {
        Some(zone) => {
            let south = (config.fault_start.lat + config.fault_end.lat) / 2.0 < 0.0;
            let projector = UtmProjector::for_zone(zone, south)?;
            FaultGeometry::with_projector(config.fault_start, config.fault_end, projector)
        }
        None => FaultGeometry::new(config.fault_start, config.fault_end),
    }
}

/// Validate the search grid from the configured ranges.
pub fn build_grid(config: &FitConfig) -> FaultResult<SearchGrid> {
    SearchGrid::new(
        ParamRange::new(config.slip_min, config.slip_max, config.slip_step),
        ParamRange::new(config.depth_min, config.depth_max, config.depth_step),
    )
}

/// Execute the full pipeline on already-loaded stations.
pub fn run_fit(config: &FitConfig, stations: &[Station]) -> FaultResult<RunOutput> {
    // Reject bad configuration before touching the data.
    let grid = build_grid(config)?;
    let geometry = build_geometry(config)?;

    let observations = build_observations(&geometry, stations)?;
    info!(
        stations = observations.len(),
        zone = geometry.projector().zone(),
        length_km = geometry.length_km,
        "projected stations onto profile"
    );

    let search = grid_search(&observations, &grid)?;
    let uncertainty = estimate_uncertainty(
        &observations,
        &search,
        config.confidence,
        config.scale_by_reduced_chi2,
    )?;
    if uncertainty.touches_grid_edge {
        warn!(
            slip_bounds = ?uncertainty.slip_bounds,
            depth_bounds = ?uncertainty.depth_bounds,
            "confidence region reaches the grid edge"
        );
    }

    let refinement = if config.refine && observations.len() >= 2 {
        Some(refine_along_depth(&observations, &grid.depth)?)
    } else {
        None
    };

    let residuals = compute_residuals(&observations, &search)?;

    Ok(RunOutput {
        geometry,
        observations,
        search,
        uncertainty,
        refinement,
        residuals,
    })
}

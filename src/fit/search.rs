//! Exhaustive grid search over slip rate and locking depth.
//!
//! For every `(s, D)` cell we:
//! - evaluate the model without offset, `s * g(x_i, D)`
//! - eliminate the offset in closed form (weighted mean residual)
//! - record the resulting WRSS
//!
//! Cells are evaluated in parallel. The argmin is taken only after the whole
//! surface is filled, scanning in row-major order, so ties resolve to the first
//! cell in that order regardless of thread scheduling.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{ModelParams, ObservationSet};
use crate::error::{FaultError, FaultResult};
use crate::fit::grid::{ParamRange, SearchGrid};
use crate::fit::misfit::{optimal_offset_unchecked, validate_sigma, wrss_unchecked};
use crate::math::arctan_basis;

/// WRSS over the search grid, row-major (rows = slip rate, columns = depth).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltySurface {
    pub n_slip: usize,
    pub n_depth: usize,
    pub values: Vec<f64>,
    /// Closed-form offset of each cell (same layout as `values`).
    pub offsets: Vec<f64>,
}

impl PenaltySurface {
    pub fn get(&self, i_slip: usize, i_depth: usize) -> f64 {
        self.values[i_slip * self.n_depth + i_depth]
    }

    pub fn offset(&self, i_slip: usize, i_depth: usize) -> f64 {
        self.offsets[i_slip * self.n_depth + i_depth]
    }

    /// Surface as nested rows (one row per slip rate).
    pub fn rows(&self) -> Vec<Vec<f64>> {
        self.values.chunks(self.n_depth.max(1)).map(|r| r.to_vec()).collect()
    }
}

/// Output of a grid search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSearchResult {
    /// Best slip rate and locking depth, with their closed-form offset.
    pub best: ModelParams,
    /// Minimal WRSS.
    pub penalty: f64,
    /// `(slip index, depth index)` of the best cell.
    pub best_cell: (usize, usize),
    pub n_obs: usize,
    pub grid: SearchGrid,
    pub surface: PenaltySurface,
}

/// Search the grid built from two parameter ranges.
pub fn grid_search_ranges(
    obs: &ObservationSet,
    slip: ParamRange,
    depth: ParamRange,
) -> FaultResult<GridSearchResult> {
    let grid = SearchGrid::new(slip, depth)?;
    grid_search(obs, &grid)
}

/// Evaluate every grid cell and return the minimum.
pub fn grid_search(obs: &ObservationSet, grid: &SearchGrid) -> FaultResult<GridSearchResult> {
    validate_observations(obs)?;
    if grid.is_empty() {
        return Err(FaultError::configuration("search grid has no cells"));
    }
    if let Some(d) = grid.depth.iter().find(|d| !d.is_finite() || **d <= 0.0) {
        return Err(FaultError::configuration(format!(
            "grid contains invalid locking depth {d}"
        )));
    }

    debug!(
        n_slip = grid.slip.len(),
        n_depth = grid.depth.len(),
        n_obs = obs.len(),
        "grid search"
    );

    // The basis depends only on D, so compute one column per depth up front.
    let basis: Vec<Vec<f64>> = grid
        .depth
        .par_iter()
        .map(|&d| obs.distance_km.iter().map(|&x| arctan_basis(x, d)).collect())
        .collect();

    let cells: Vec<(f64, f64)> = (0..grid.len())
        .into_par_iter()
        .map(|flat| {
            let (i_s, i_d) = grid.cell(flat);
            let s = grid.slip[i_s];
            let modeled: Vec<f64> = basis[i_d].iter().map(|g| s * g).collect();
            let offset = optimal_offset_unchecked(&obs.velocity, &modeled, &obs.sigma);
            let penalty = wrss_unchecked(&obs.velocity, &modeled, &obs.sigma, offset);
            (penalty, offset)
        })
        .collect();

    let (values, offsets): (Vec<f64>, Vec<f64>) = cells.into_iter().unzip();

    if let Some(flat) = values.iter().position(|v| !v.is_finite()) {
        let (i_s, i_d) = grid.cell(flat);
        return Err(FaultError::domain(format!(
            "non-finite misfit at slip={}, depth={}",
            grid.slip[i_s], grid.depth[i_d]
        )));
    }

    // Strict `<` keeps the first minimum in row-major order.
    let mut best_flat = 0;
    for (flat, &v) in values.iter().enumerate().skip(1) {
        if v < values[best_flat] {
            best_flat = flat;
        }
    }

    let (i_s, i_d) = grid.cell(best_flat);
    let best = ModelParams::new(grid.slip[i_s], grid.depth[i_d], offsets[best_flat]);
    let penalty = values[best_flat];

    info!(
        slip_rate = best.slip_rate,
        locking_depth = best.locking_depth,
        offset = best.offset,
        wrss = penalty,
        cells = values.len(),
        "grid search complete"
    );

    Ok(GridSearchResult {
        best,
        penalty,
        best_cell: (i_s, i_d),
        n_obs: obs.len(),
        grid: grid.clone(),
        surface: PenaltySurface {
            n_slip: grid.slip.len(),
            n_depth: grid.depth.len(),
            values,
            offsets,
        },
    })
}

/// Check the observation arrays before any evaluation.
pub fn validate_observations(obs: &ObservationSet) -> FaultResult<()> {
    if obs.is_empty() {
        return Err(FaultError::insufficient_data("no observations to fit"));
    }
    let n = obs.len();
    if obs.velocity.len() != n || obs.sigma.len() != n {
        return Err(FaultError::configuration(format!(
            "observation arrays differ in length: distance={n}, velocity={}, sigma={}",
            obs.velocity.len(),
            obs.sigma.len()
        )));
    }
    if !obs.station_ids.is_empty() && obs.station_ids.len() != n {
        return Err(FaultError::configuration(format!(
            "station id count {} does not match observation count {n}",
            obs.station_ids.len()
        )));
    }
    if obs
        .distance_km
        .iter()
        .chain(&obs.velocity)
        .any(|v| !v.is_finite())
    {
        return Err(FaultError::domain("observations contain non-finite distance or velocity"));
    }
    validate_sigma(&obs.sigma)
}

//! Closed-form slip-rate refinement along the depth axis.
//!
//! For fixed `D` the model `v = s*g(x, D) + c` is linear in `(s, c)`, so the
//! grid over slip rate can be replaced by a weighted least squares solve. Doing
//! that for each depth on the grid gives a continuous slip-rate estimate and a
//! formal 1σ from `(X_wᵀ X_w)⁻¹`.

use nalgebra::DMatrix;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ObservationSet;
use crate::error::{FaultError, FaultResult};
use crate::fit::search::validate_observations;
use crate::math::{arctan_basis, weighted_least_squares};
use crate::models::validate_depth;

/// Best linear fit at one locking depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRefinement {
    pub locking_depth: f64,
    pub slip_rate: f64,
    pub offset: f64,
    /// Formal 1σ of `slip_rate` (`None` when the normal matrix is singular).
    pub slip_rate_sigma: Option<f64>,
    pub offset_sigma: Option<f64>,
    pub wrss: f64,
}

/// Solve for slip rate and offset at a single locking depth.
pub fn fit_linear_at_depth(obs: &ObservationSet, locking_depth: f64) -> FaultResult<LinearRefinement> {
    validate_observations(obs)?;
    validate_depth(locking_depth)?;
    solve_at_depth(obs, locking_depth)
}

/// Solve at each depth and return the lowest-WRSS fit (ties → first depth).
pub fn refine_along_depth(obs: &ObservationSet, depths: &[f64]) -> FaultResult<LinearRefinement> {
    validate_observations(obs)?;
    if obs.len() < 2 {
        return Err(FaultError::insufficient_data(
            "linear refinement needs at least two observations",
        ));
    }
    if depths.is_empty() {
        return Err(FaultError::configuration("no locking depths to refine over"));
    }
    for &d in depths {
        validate_depth(d)?;
    }

    let fits: Vec<FaultResult<LinearRefinement>> = depths
        .par_iter()
        .map(|&d| solve_at_depth(obs, d))
        .collect();

    let mut best: Option<LinearRefinement> = None;
    for fit in fits {
        let fit = fit?;
        if best.as_ref().is_none_or(|b| fit.wrss < b.wrss) {
            best = Some(fit);
        }
    }

    let best = best.ok_or_else(|| FaultError::configuration("no locking depths to refine over"))?;
    debug!(
        locking_depth = best.locking_depth,
        slip_rate = best.slip_rate,
        wrss = best.wrss,
        "linear refinement"
    );
    Ok(best)
}

fn solve_at_depth(obs: &ObservationSet, locking_depth: f64) -> FaultResult<LinearRefinement> {
    let n = obs.len();
    let mut x = DMatrix::<f64>::zeros(n, 2);
    for (i, &xi) in obs.distance_km.iter().enumerate() {
        x[(i, 0)] = arctan_basis(xi, locking_depth);
        x[(i, 1)] = 1.0;
    }

    let fit = weighted_least_squares(&x, &obs.velocity, &obs.sigma).ok_or_else(|| {
        FaultError::domain(format!(
            "slip/offset system is singular at locking depth {locking_depth}"
        ))
    })?;

    let sigma_of = |j: usize| {
        fit.covariance
            .as_ref()
            .map(|c| c[(j, j)])
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(f64::sqrt)
    };

    Ok(LinearRefinement {
        locking_depth,
        slip_rate: fit.beta[0],
        offset: fit.beta[1],
        slip_rate_sigma: sigma_of(0),
        offset_sigma: sigma_of(1),
        wrss: fit.wrss,
    })
}

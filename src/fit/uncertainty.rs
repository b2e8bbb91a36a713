//! Parameter uncertainty from the penalty surface.
//!
//! With inverse-variance weights the WRSS is a χ² statistic. The joint
//! confidence region for `(s, D)` is the set of cells with
//! `WRSS <= WRSS_min + Δχ²`; we report its extent along each axis.
//!
//! When the reduced χ² exceeds 1 the stated errors are too optimistic, and the
//! threshold can optionally be inflated by it.

use serde::{Deserialize, Serialize};

use crate::domain::{ConfidenceLevel, ModelParams, ObservationSet};
use crate::error::FaultResult;
use crate::fit::search::GridSearchResult;
use crate::models::predict_many;

/// Fitted parameters: slip rate, locking depth, offset.
pub const FITTED_PARAMS: usize = 3;

/// Confidence bounds and goodness-of-fit summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Uncertainty {
    pub level: ConfidenceLevel,
    /// Threshold actually applied (after optional χ² scaling).
    pub delta_chi2: f64,
    pub slip_bounds: (f64, f64),
    pub depth_bounds: (f64, f64),
    /// Number of grid cells inside the region.
    pub cells_inside: usize,
    /// `true` when the region reaches the edge of the grid on some axis.
    pub touches_grid_edge: bool,
    pub dof: Option<usize>,
    pub reduced_chi2: Option<f64>,
    /// Unweighted RMS residual at the best fit.
    pub rms: f64,
}

/// Reduced χ² for `n` observations; `None` without spare degrees of freedom.
pub fn reduced_chi2(wrss: f64, n_obs: usize) -> Option<f64> {
    let dof = n_obs.checked_sub(FITTED_PARAMS).filter(|d| *d > 0)?;
    Some(wrss / dof as f64)
}

/// Unweighted RMS of `obs - model(params)`.
pub fn rms_residual(obs: &ObservationSet, params: &ModelParams) -> FaultResult<f64> {
    let modeled = predict_many(&obs.distance_km, params)?;
    let n = modeled.len().max(1) as f64;
    let ss: f64 = obs
        .velocity
        .iter()
        .zip(&modeled)
        .map(|(o, m)| (o - m) * (o - m))
        .sum();
    Ok((ss / n).sqrt())
}

/// Extract confidence bounds from a finished search.
pub fn estimate_uncertainty(
    obs: &ObservationSet,
    result: &GridSearchResult,
    level: ConfidenceLevel,
    scale_by_reduced_chi2: bool,
) -> FaultResult<Uncertainty> {
    let reduced = reduced_chi2(result.penalty, result.n_obs);
    let mut delta_chi2 = level.delta_chi2();
    if scale_by_reduced_chi2 {
        if let Some(r) = reduced.filter(|r| *r > 1.0) {
            delta_chi2 *= r;
        }
    }

    let threshold = result.penalty + delta_chi2;
    let grid = &result.grid;
    let surface = &result.surface;

    let mut slip_idx = (usize::MAX, 0usize);
    let mut depth_idx = (usize::MAX, 0usize);
    let mut cells_inside = 0usize;

    for i_s in 0..surface.n_slip {
        for i_d in 0..surface.n_depth {
            if surface.get(i_s, i_d) <= threshold {
                cells_inside += 1;
                slip_idx = (slip_idx.0.min(i_s), slip_idx.1.max(i_s));
                depth_idx = (depth_idx.0.min(i_d), depth_idx.1.max(i_d));
            }
        }
    }

    // The best cell always satisfies the threshold, so the indices are set.
    let touches_grid_edge = slip_idx.0 == 0
        || slip_idx.1 + 1 == surface.n_slip
        || depth_idx.0 == 0
        || depth_idx.1 + 1 == surface.n_depth;

    Ok(Uncertainty {
        level,
        delta_chi2,
        slip_bounds: (grid.slip[slip_idx.0], grid.slip[slip_idx.1]),
        depth_bounds: (grid.depth[depth_idx.0], grid.depth[depth_idx.1]),
        cells_inside,
        touches_grid_edge,
        dof: result.n_obs.checked_sub(FITTED_PARAMS).filter(|d| *d > 0),
        reduced_chi2: reduced,
        rms: rms_residual(obs, &result.best)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::grid::ParamRange;
    use crate::fit::search::grid_search_ranges;

    fn noisy_obs() -> ObservationSet {
        let truth = ModelParams::new(25.0, 12.0, 0.0);
        let xs: Vec<f64> = (0..40).map(|i| -80.0 + 4.0 * i as f64).collect();
        let mut v = predict_many(&xs, &truth).unwrap();
        // Deterministic ±1 "noise" so the minimum is not exactly zero.
        for (i, vi) in v.iter_mut().enumerate() {
            *vi += if i % 2 == 0 { 1.0 } else { -1.0 };
        }
        ObservationSet {
            station_ids: Vec::new(),
            distance_km: xs,
            velocity: v,
            sigma: vec![1.0; 40],
        }
    }

    #[test]
    fn bounds_bracket_the_best_fit() {
        let obs = noisy_obs();
        let result = grid_search_ranges(
            &obs,
            ParamRange::new(10.0, 40.0, 0.5),
            ParamRange::new(2.0, 30.0, 0.5),
        )
        .unwrap();
        let unc = estimate_uncertainty(&obs, &result, ConfidenceLevel::OneSigma, false).unwrap();

        assert!(unc.slip_bounds.0 <= result.best.slip_rate && result.best.slip_rate <= unc.slip_bounds.1);
        assert!(unc.depth_bounds.0 <= result.best.locking_depth && result.best.locking_depth <= unc.depth_bounds.1);
        assert!(unc.cells_inside >= 1);
        assert_eq!(unc.dof, Some(37));
        assert!((unc.rms - (result.penalty / 40.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn wider_level_gives_wider_region() {
        let obs = noisy_obs();
        let result = grid_search_ranges(
            &obs,
            ParamRange::new(10.0, 40.0, 0.5),
            ParamRange::new(2.0, 30.0, 0.5),
        )
        .unwrap();
        let one = estimate_uncertainty(&obs, &result, ConfidenceLevel::OneSigma, false).unwrap();
        let three = estimate_uncertainty(&obs, &result, ConfidenceLevel::ThreeSigma, false).unwrap();
        assert!(three.cells_inside >= one.cells_inside);
        assert!(three.slip_bounds.0 <= one.slip_bounds.0);
        assert!(three.slip_bounds.1 >= one.slip_bounds.1);
    }

    #[test]
    fn reduced_chi2_needs_spare_dof() {
        assert_eq!(reduced_chi2(10.0, 3), None);
        assert_eq!(reduced_chi2(10.0, 2), None);
        assert_eq!(reduced_chi2(10.0, 8), Some(2.0));
    }

    #[test]
    fn scaling_inflates_threshold_only_above_one() {
        let obs = noisy_obs();
        let result = grid_search_ranges(
            &obs,
            ParamRange::new(10.0, 40.0, 1.0),
            ParamRange::new(2.0, 30.0, 1.0),
        )
        .unwrap();
        let scaled = estimate_uncertainty(&obs, &result, ConfidenceLevel::OneSigma, true).unwrap();
        let r = scaled.reduced_chi2.unwrap();
        if r > 1.0 {
            assert!((scaled.delta_chi2 - 2.30 * r).abs() < 1e-12);
        } else {
            assert_eq!(scaled.delta_chi2, 2.30);
        }
    }
}

//! Weighted residual sum of squares.
//!
//! ```text
//! WRSS = Σ w_i (v_obs,i - v_model,i)^2,   w_i = 1 / σ_i^2
//! ```
//!
//! A larger stated error lowers a station's weight. When the velocity offset is
//! not searched it is eliminated in closed form: the WRSS-minimising offset is
//! the inverse-variance weighted mean of `v_obs - v_model_without_offset`.

use crate::error::{FaultError, FaultResult};

/// Check that observed, modeled, and σ arrays are usable together.
pub fn validate_inputs(observed: &[f64], modeled: &[f64], sigma: &[f64]) -> FaultResult<()> {
    if observed.is_empty() {
        return Err(FaultError::insufficient_data("misfit needs at least one observation"));
    }
    if observed.len() != modeled.len() || observed.len() != sigma.len() {
        return Err(FaultError::configuration(format!(
            "length mismatch: observed={}, modeled={}, sigma={}",
            observed.len(),
            modeled.len(),
            sigma.len()
        )));
    }
    validate_sigma(sigma)
}

/// Every σ must be finite and strictly positive (weights are `1/σ²`).
pub fn validate_sigma(sigma: &[f64]) -> FaultResult<()> {
    if let Some((i, s)) = sigma
        .iter()
        .enumerate()
        .find(|(_, s)| !s.is_finite() || **s <= 0.0)
    {
        return Err(FaultError::domain(format!(
            "sigma[{i}] = {s} (must be finite and > 0)"
        )));
    }
    Ok(())
}

/// Weighted residual sum of squares.
pub fn wrss(observed: &[f64], modeled: &[f64], sigma: &[f64]) -> FaultResult<f64> {
    validate_inputs(observed, modeled, sigma)?;
    Ok(wrss_unchecked(observed, modeled, sigma, 0.0))
}

/// Least-squares optimal offset for `observed ≈ modeled + offset`.
pub fn optimal_offset(observed: &[f64], modeled: &[f64], sigma: &[f64]) -> FaultResult<f64> {
    validate_inputs(observed, modeled, sigma)?;
    Ok(optimal_offset_unchecked(observed, modeled, sigma))
}

/// WRSS after eliminating the offset. Returns `(wrss, offset)`.
pub fn misfit_with_offset(observed: &[f64], modeled: &[f64], sigma: &[f64]) -> FaultResult<(f64, f64)> {
    validate_inputs(observed, modeled, sigma)?;
    let offset = optimal_offset_unchecked(observed, modeled, sigma);
    Ok((wrss_unchecked(observed, modeled, sigma, offset), offset))
}

// The grid search validates once up front and then calls these per cell.

pub(crate) fn optimal_offset_unchecked(observed: &[f64], modeled: &[f64], sigma: &[f64]) -> f64 {
    let mut sw = 0.0;
    let mut swr = 0.0;
    for ((&o, &m), &s) in observed.iter().zip(modeled).zip(sigma) {
        let w = 1.0 / (s * s);
        sw += w;
        swr += w * (o - m);
    }
    swr / sw
}

pub(crate) fn wrss_unchecked(observed: &[f64], modeled: &[f64], sigma: &[f64], offset: f64) -> f64 {
    observed
        .iter()
        .zip(modeled)
        .zip(sigma)
        .map(|((&o, &m), &s)| {
            let r = o - (m + offset);
            r * r / (s * s)
        })
        .sum()
}

//! Forward model: fault-parallel velocity across a locked strike-slip fault.
//!
//! ```text
//! v(x) = (s / π) * atan(x / D) + offset
//! ```
//!
//! `x` is the signed profile distance (km), `s` the slip rate, `D` the locking
//! depth (km). The search code relies on two primitive operations, both pure:
//! - `predict` for a single distance
//! - `predict_many` over a slice of distances (same length, same order)

use crate::domain::ModelParams;
use crate::error::{FaultError, FaultResult};
use crate::math::arctan_basis;

/// Reject locking depths for which the model is singular or undefined.
pub fn validate_depth(locking_depth: f64) -> FaultResult<()> {
    if !locking_depth.is_finite() || locking_depth <= 0.0 {
        return Err(FaultError::domain(format!(
            "locking depth must be finite and > 0, got {locking_depth}"
        )));
    }
    Ok(())
}

/// Predict the velocity at distance `x`.
pub fn predict(x: f64, params: &ModelParams) -> FaultResult<f64> {
    validate_depth(params.locking_depth)?;
    Ok(params.slip_rate * arctan_basis(x, params.locking_depth) + params.offset)
}

/// Predict velocities for every distance in `xs`.
pub fn predict_many(xs: &[f64], params: &ModelParams) -> FaultResult<Vec<f64>> {
    validate_depth(params.locking_depth)?;
    Ok(xs
        .iter()
        .map(|&x| params.slip_rate * arctan_basis(x, params.locking_depth) + params.offset)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_is_odd_about_offset() {
        let p = ModelParams::new(20.0, 15.0, -10.0);
        for &x in &[0.3, 1.0, 7.5, 42.0, 300.0] {
            let plus = predict(x, &p).unwrap() - p.offset;
            let minus = predict(-x, &p).unwrap() - p.offset;
            assert!((plus + minus).abs() < 1e-12, "x={x}");
        }
        assert_eq!(predict(0.0, &p).unwrap(), p.offset);
    }

    #[test]
    fn model_saturates_at_half_slip_rate() {
        let p = ModelParams::new(34.0, 12.0, 3.0);
        let far = 1e9;
        assert!((predict(far, &p).unwrap() - (3.0 + 17.0)).abs() < 1e-6);
        assert!((predict(-far, &p).unwrap() - (3.0 - 17.0)).abs() < 1e-6);
    }

    #[test]
    fn predict_many_matches_scalar() {
        let p = ModelParams::new(25.0, 8.0, 1.5);
        let xs = [-40.0, -3.0, 0.0, 2.5, 60.0];
        let many = predict_many(&xs, &p).unwrap();
        assert_eq!(many.len(), xs.len());
        for (x, v) in xs.iter().zip(&many) {
            assert_eq!(*v, predict(*x, &p).unwrap());
        }
        assert!(predict_many(&[], &p).unwrap().is_empty());
    }

    #[test]
    fn zero_depth_is_a_domain_error() {
        let p = ModelParams::new(20.0, 0.0, 0.0);
        assert!(matches!(predict(1.0, &p), Err(FaultError::Domain(_))));
        assert!(matches!(predict_many(&[1.0], &p), Err(FaultError::Domain(_))));
        let nan = ModelParams::new(20.0, f64::NAN, 0.0);
        assert!(predict(1.0, &nan).is_err());
    }
}

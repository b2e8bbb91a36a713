//! Basis function of the screw-dislocation profile.
//!
//! The interseismic velocity across a locked strike-slip fault is linear in the
//! slip rate and offset once the locking depth is fixed:
//!
//! ```text
//! v(x) = s * g(x, D) + c,    g(x, D) = atan(x / D) / π
//! ```
//!
//! `g` is odd in `x`, zero at the fault trace, and saturates at `±1/2`.

use std::f64::consts::PI;

/// Compute `g(x, D) = atan(x/D) / π`.
///
/// Callers must ensure `D` is finite and positive; see `models::validate_depth`.
pub fn arctan_basis(x: f64, locking_depth: f64) -> f64 {
    (x / locking_depth).atan() / PI
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basis_is_odd_and_bounded() {
        for &d in &[0.5, 5.0, 25.0] {
            for &x in &[0.1, 1.0, 10.0, 1e4] {
                let g = arctan_basis(x, d);
                assert!((g + arctan_basis(-x, d)).abs() < 1e-15);
                assert!(g > 0.0 && g < 0.5);
            }
        }
        assert_eq!(arctan_basis(0.0, 10.0), 0.0);
    }

    #[test]
    fn basis_at_one_locking_depth_is_a_quarter() {
        assert!((arctan_basis(12.0, 12.0) - 0.25).abs() < 1e-15);
    }
}

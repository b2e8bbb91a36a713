//! Weighted least squares solver.
//!
//! With the locking depth fixed, the profile model is linear in slip rate and
//! offset:
//!
//! ```text
//! minimize Σ w_i (v_i - s*g(x_i, D) - c)^2,   w_i = 1/σ_i^2
//! ```
//!
//! Rows are scaled by `sqrt(w_i) = 1/σ_i` and the resulting ordinary least
//! squares problem is solved with SVD. The formal parameter covariance is
//! `(X_wᵀ X_w)⁻¹`.

use nalgebra::{DMatrix, DVector};

/// Solution of a weighted linear least squares problem.
#[derive(Debug, Clone)]
pub struct LeastSquaresFit {
    pub beta: DVector<f64>,
    /// `(X_wᵀ X_w)⁻¹`; `None` when the normal matrix is singular.
    pub covariance: Option<DMatrix<f64>>,
    /// Weighted residual sum of squares.
    pub wrss: f64,
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Solve `min Σ (y_i - x_iᵀβ)^2 / σ_i^2`.
///
/// `x` holds unweighted design rows. Returns `None` on mismatched shapes,
/// non-positive σ, or an unsolvable system.
pub fn weighted_least_squares(x: &DMatrix<f64>, y: &[f64], sigma: &[f64]) -> Option<LeastSquaresFit> {
    let n = x.nrows();
    if y.len() != n || sigma.len() != n || n < x.ncols() {
        return None;
    }
    if sigma.iter().any(|s| !s.is_finite() || *s <= 0.0) {
        return None;
    }

    let mut xw = x.clone();
    let mut yw = DVector::<f64>::zeros(n);
    for i in 0..n {
        let inv = 1.0 / sigma[i];
        for j in 0..x.ncols() {
            xw[(i, j)] *= inv;
        }
        yw[i] = y[i] * inv;
    }

    let beta = solve_least_squares(&xw, &yw)?;
    let resid = &yw - &xw * &beta;
    let wrss = resid.dot(&resid);
    let covariance = (xw.transpose() * &xw).try_inverse();

    Some(LeastSquaresFit {
        beta,
        covariance,
        wrss,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn weighted_fit_downweights_noisy_point() {
        // Three points on y = x plus one large outlier with a huge σ.
        let x = DMatrix::from_row_slice(4, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0]);
        let y = [0.0, 1.0, 2.0, 30.0];
        let sigma = [1.0, 1.0, 1.0, 1e6];

        let fit = weighted_least_squares(&x, &y, &sigma).unwrap();
        assert!(fit.beta[0].abs() < 1e-4);
        assert!((fit.beta[1] - 1.0).abs() < 1e-4);
        assert!(fit.covariance.is_some());
    }

    #[test]
    fn covariance_of_mean_is_sigma_squared_over_n() {
        let x = DMatrix::from_element(4, 1, 1.0);
        let y = [1.0, 2.0, 3.0, 4.0];
        let sigma = [2.0; 4];

        let fit = weighted_least_squares(&x, &y, &sigma).unwrap();
        assert!((fit.beta[0] - 2.5).abs() < 1e-12);
        let cov = fit.covariance.unwrap();
        assert!((cov[(0, 0)] - 1.0).abs() < 1e-12);
        // Σ (y - 2.5)^2 / 4 = 5 / 4
        assert!((fit.wrss - 1.25).abs() < 1e-12);
    }

    #[test]
    fn rejects_bad_sigma() {
        let x = DMatrix::from_element(2, 1, 1.0);
        assert!(weighted_least_squares(&x, &[1.0, 2.0], &[1.0, 0.0]).is_none());
    }
}

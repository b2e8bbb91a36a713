//! Velocity projection onto the fault-parallel direction.
//!
//! For a unit vector `u = (ue, un)`:
//!
//! ```text
//! v = ve*ue + vn*un
//! σ = sqrt((σe*ue)^2 + (σn*un)^2)
//! ```
//!
//! The error formula treats the east and north components as independent. A
//! non-zero north-east correlation would add `2*ρ*σe*σn*ue*un` under the root;
//! that term is not included.

use nalgebra::Vector2;

use crate::error::{FaultError, FaultResult};

/// Project a horizontal velocity `[ve, vn]` with 1σ errors `[se, sn]` onto `unit`.
///
/// Returns `(velocity, sigma)`.
pub fn project_velocity(velocity: [f64; 2], errors: [f64; 2], unit: Vector2<f64>) -> FaultResult<(f64, f64)> {
    if !(velocity[0].is_finite() && velocity[1].is_finite()) {
        return Err(FaultError::domain(format!(
            "non-finite velocity ({}, {})",
            velocity[0], velocity[1]
        )));
    }
    if !errors.iter().all(|e| e.is_finite() && *e >= 0.0) {
        return Err(FaultError::domain(format!(
            "velocity errors must be finite and non-negative, got ({}, {})",
            errors[0], errors[1]
        )));
    }

    let v = Vector2::new(velocity[0], velocity[1]).dot(&unit);
    let se = errors[0] * unit.x;
    let sn = errors[1] * unit.y;
    Ok((v, (se * se + sn * sn).sqrt()))
}

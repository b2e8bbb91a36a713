//! Reporting utilities: residuals, outlier ranking, and formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the projection/search code stays clean and testable
//! - output changes are localized

use crate::domain::{FitConfig, ObservationSet, StationResidual};
use crate::error::{FaultError, FaultResult};
use crate::fit::{GridSearchResult, LinearRefinement, Uncertainty};
use crate::geo::FaultGeometry;
use crate::models::predict_many;

/// Compute modeled velocities and residuals for each station.
pub fn compute_residuals(obs: &ObservationSet, fit: &GridSearchResult) -> FaultResult<Vec<StationResidual>> {
    let modeled = predict_many(&obs.distance_km, &fit.best)?;
    let mut out = Vec::with_capacity(obs.len());
    for i in 0..obs.len() {
        let v_model = modeled[i];
        if !v_model.is_finite() {
            return Err(FaultError::domain("non-finite model prediction during residual computation"));
        }
        out.push(StationResidual {
            id: obs.station_ids.get(i).cloned().unwrap_or_else(|| format!("#{i}")),
            distance_km: obs.distance_km[i],
            v_obs: obs.velocity[i],
            sigma: obs.sigma[i],
            v_model,
            residual: obs.velocity[i] - v_model,
        });
    }
    Ok(out)
}

/// The `top_n` stations with the largest |residual / σ|.
pub fn rank_outliers(residuals: &[StationResidual], top_n: usize) -> Vec<StationResidual> {
    let mut sorted = residuals.to_vec();
    sorted.sort_by(|a, b| {
        b.normalized()
            .abs()
            .partial_cmp(&a.normalized().abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted.truncate(top_n);
    sorted
}

/// Format the full run summary (inputs + best fit + uncertainty).
pub fn format_run_summary(
    geometry: &FaultGeometry,
    config: &FitConfig,
    search: &GridSearchResult,
    uncertainty: Option<&Uncertainty>,
    refinement: Option<&LinearRefinement>,
) -> String {
    let mut out = String::new();

    out.push_str("=== slip - Fault Slip Rate / Locking Depth Grid Search ===\n");
    out.push_str(&format!("Stations: {}\n", config.csv_path.display()));
    out.push_str(&format!(
        "Fault: ({:.4}, {:.4}) -> ({:.4}, {:.4}) | UTM {}{} | strike={:.2}° | length={:.2} km\n",
        geometry.start.lon,
        geometry.start.lat,
        geometry.end.lon,
        geometry.end.lat,
        geometry.projector().zone(),
        if geometry.projector().is_south() { "S" } else { "N" },
        geometry.strike.to_degrees(),
        geometry.length_km,
    ));
    out.push_str(&format!(
        "Grid: slip=[{}, {}]/{} ({}) x depth=[{}, {}]/{} ({}) = {} cells\n",
        config.slip_min,
        config.slip_max,
        config.slip_step,
        search.grid.slip.len(),
        config.depth_min,
        config.depth_max,
        config.depth_step,
        search.grid.depth.len(),
        search.grid.len(),
    ));
    out.push_str(&format!("Observations: n={}\n", search.n_obs));

    out.push_str("\nBest fit:\n");
    out.push_str(&format!("- slip rate    : {:.3}\n", search.best.slip_rate));
    out.push_str(&format!("- locking depth: {:.3} km\n", search.best.locking_depth));
    out.push_str(&format!("- offset       : {:.3}\n", search.best.offset));
    out.push_str(&format!("- WRSS         : {:.4}\n", search.penalty));

    if let Some(u) = uncertainty {
        out.push_str(&format!(
            "\nConfidence region ({}, Δχ²={:.2}, {} cells):\n",
            u.level.display_name(),
            u.delta_chi2,
            u.cells_inside
        ));
        out.push_str(&format!("- slip rate    : [{:.3}, {:.3}]\n", u.slip_bounds.0, u.slip_bounds.1));
        out.push_str(&format!(
            "- locking depth: [{:.3}, {:.3}] km\n",
            u.depth_bounds.0, u.depth_bounds.1
        ));
        match (u.reduced_chi2, u.dof) {
            (Some(r), Some(dof)) => out.push_str(&format!("- reduced χ²   : {r:.3} (dof={dof})\n")),
            _ => out.push_str("- reduced χ²   : n/a (too few stations)\n"),
        }
        out.push_str(&format!("- RMS residual : {:.3}\n", u.rms));
        if u.touches_grid_edge {
            out.push_str("  warning: confidence region reaches the grid edge; widen the search ranges\n");
        }
    }

    if let Some(r) = refinement {
        out.push_str("\nLinear refinement (slip/offset solved per depth):\n");
        out.push_str(&format!("- locking depth: {:.3} km\n", r.locking_depth));
        out.push_str(&format!(
            "- slip rate    : {:.3} ± {}\n",
            r.slip_rate,
            fmt_opt(r.slip_rate_sigma)
        ));
        out.push_str(&format!("- offset       : {:.3} ± {}\n", r.offset, fmt_opt(r.offset_sigma)));
        out.push_str(&format!("- WRSS         : {:.4}\n", r.wrss));
    }

    out.push('\n');
    out
}

/// Format a residual table.
pub fn format_residual_table(rows: &[StationResidual]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<16} {:>10} {:>10} {:>8} {:>10} {:>10} {:>8}",
            "id", "dist_km", "v_obs", "sigma", "v_model", "residual", "r/σ"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<16} {:-<10} {:-<10} {:-<8} {:-<10} {:-<10} {:-<8}",
            "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for r in rows {
        out.push_str(
            format!(
                "{:<16} {:>10.3} {:>10.3} {:>8.3} {:>10.3} {:>10.3} {:>8.2}",
                truncate(&r.id, 16),
                r.distance_km,
                r.v_obs,
                r.sigma,
                r.v_model,
                r.residual,
                r.normalized(),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.3}")).unwrap_or_else(|| "n/a".to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModelParams;
    use crate::fit::{ParamRange, grid_search_ranges};

    fn residual(id: &str, residual: f64, sigma: f64) -> StationResidual {
        StationResidual {
            id: id.to_string(),
            distance_km: 0.0,
            v_obs: residual,
            sigma,
            v_model: 0.0,
            residual,
        }
    }

    #[test]
    fn compute_residuals_basic() {
        let obs = ObservationSet {
            station_ids: vec!["A".into(), "B".into()],
            distance_km: vec![0.0, 0.0],
            velocity: vec![1.0, 2.0],
            sigma: vec![1.0, 1.0],
        };
        let search = grid_search_ranges(
            &obs,
            ParamRange::new(10.0, 10.0, 1.0),
            ParamRange::new(5.0, 5.0, 1.0),
        )
        .unwrap();
        assert_eq!(search.best, ModelParams::new(10.0, 5.0, 1.5));

        let rows = compute_residuals(&obs, &search).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "A");
        assert!((rows[0].residual + 0.5).abs() < 1e-12);
        assert!((rows[1].residual - 0.5).abs() < 1e-12);
    }

    #[test]
    fn outliers_rank_by_normalized_residual() {
        let rows = vec![
            residual("big_but_noisy", 5.0, 10.0),
            residual("small_but_tight", -1.0, 0.1),
            residual("fine", 0.1, 1.0),
        ];
        let top = rank_outliers(&rows, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].id, "small_but_tight");
        assert_eq!(top[1].id, "big_but_noisy");
    }

    #[test]
    fn table_has_header_and_rows() {
        let rows = vec![residual("A", 1.0, 0.5)];
        let table = format_residual_table(&rows);
        assert_eq!(table.lines().count(), 3);
        assert!(table.lines().nth(2).unwrap().starts_with("A "));
    }

    #[test]
    fn truncate_marks_long_ids() {
        assert_eq!(truncate("ABCDEFGH", 4), "ABC.");
        assert_eq!(truncate("ABC", 4), "ABC");
    }
}

//! Parameter grid generation.
//!
//! Slip rate and locking depth are searched over a deterministic rectangular
//! grid. Each axis is an inclusive `[min, max]` range walked in `step`
//! increments:
//!
//! - count = `ceil((max - min) / step) + 1`
//! - value `i` = `min + i * step`, with the last value clamped to `max`

use serde::{Deserialize, Serialize};

use crate::error::{FaultError, FaultResult};

/// Slack on `(max - min) / step` so float noise (e.g. `6.000000000000001`)
/// does not add a cell.
const STEP_RATIO_EPS: f64 = 1e-9;

/// Upper bound on values along one axis.
pub const MAX_AXIS_VALUES: usize = 10_000_000;

/// Upper bound on evaluated cells (slip × depth).
pub const MAX_GRID_CELLS: usize = 50_000_000;

/// An inclusive parameter range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ParamRange {
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Validate bounds and step. `name` labels the axis in error messages.
    pub fn validate(&self, name: &str) -> FaultResult<()> {
        if !(self.min.is_finite() && self.max.is_finite() && self.step.is_finite()) {
            return Err(FaultError::configuration(format!(
                "{name} range must be finite: min={}, max={}, step={}",
                self.min, self.max, self.step
            )));
        }
        if self.step <= 0.0 {
            return Err(FaultError::configuration(format!(
                "{name} step must be > 0, got {}",
                self.step
            )));
        }
        if self.max < self.min {
            return Err(FaultError::configuration(format!(
                "{name} range is empty: min={} > max={}",
                self.min, self.max
            )));
        }
        let ratio = (self.max - self.min) / self.step;
        if !ratio.is_finite() || ratio >= MAX_AXIS_VALUES as f64 {
            return Err(FaultError::configuration(format!(
                "{name} step {} is too small for [{}, {}] (at most {MAX_AXIS_VALUES} values per axis)",
                self.step, self.min, self.max
            )));
        }
        Ok(())
    }

    /// Number of grid values on this axis. Only meaningful after `validate`.
    pub fn count(&self) -> usize {
        let ratio = (self.max - self.min) / self.step;
        (ratio - STEP_RATIO_EPS).ceil().max(0.0) as usize + 1
    }

    /// Grid values (validated).
    pub fn values(&self, name: &str) -> FaultResult<Vec<f64>> {
        self.validate(name)?;
        let n = self.count();
        Ok((0..n)
            .map(|i| (self.min + self.step * i as f64).min(self.max))
            .collect())
    }
}

/// The rectangular (slip rate × locking depth) search grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchGrid {
    pub slip: Vec<f64>,
    pub depth: Vec<f64>,
}

impl SearchGrid {
    /// Build the grid, rejecting invalid ranges and non-positive depths.
    pub fn new(slip: ParamRange, depth: ParamRange) -> FaultResult<Self> {
        slip.validate("slip rate")?;
        depth.validate("locking depth")?;
        if depth.min <= 0.0 {
            return Err(FaultError::configuration(format!(
                "locking depth minimum must be > 0, got {}",
                depth.min
            )));
        }
        slip.count()
            .checked_mul(depth.count())
            .filter(|c| *c <= MAX_GRID_CELLS)
            .ok_or_else(|| {
                FaultError::configuration(format!(
                    "search grid of {} x {} cells exceeds the limit of {MAX_GRID_CELLS}",
                    slip.count(),
                    depth.count()
                ))
            })?;
        Ok(Self {
            slip: slip.values("slip rate")?,
            depth: depth.values("locking depth")?,
        })
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.slip.len() * self.depth.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row-major flat index: slip is the row, depth the column.
    pub fn flat_index(&self, i_slip: usize, i_depth: usize) -> usize {
        i_slip * self.depth.len() + i_depth
    }

    /// Inverse of [`SearchGrid::flat_index`].
    pub fn cell(&self, flat: usize) -> (usize, usize) {
        (flat / self.depth.len(), flat % self.depth.len())
    }
}

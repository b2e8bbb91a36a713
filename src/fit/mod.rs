//! Parameter estimation.
//!
//! Responsibilities:
//!
//! - build the (slip rate × locking depth) grid
//! - evaluate the weighted misfit at every cell (parallel)
//! - select the best cell deterministically
//! - derive confidence bounds and an optional closed-form slip refinement

pub mod grid;
pub mod misfit;
pub mod refine;
pub mod search;
pub mod uncertainty;

pub use grid::*;
pub use misfit::*;
pub use refine::*;
pub use search::*;
pub use uncertainty::*;

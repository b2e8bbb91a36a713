//! Mathematical utilities: the arctangent basis and weighted least squares.

pub mod basis;
pub mod ols;

pub use basis::*;
pub use ols::*;

//! Interseismic velocity model.
//!
//! The model is implemented as small, pure functions so that search code can
//! stay generic.

pub mod model;

pub use model::*;

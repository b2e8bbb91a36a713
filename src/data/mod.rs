//! Synthetic data for recovery checks and demos.

pub mod synthetic;

pub use synthetic::*;

//! `slip-profile` library crate.
//!
//! Estimates the slip rate and locking depth of a strike-slip fault from GNSS
//! station velocities, using the arctangent interseismic model and an
//! exhaustive grid search.
//!
//! The binary (`slip`) is a thin wrapper around this library so that:
//!
//! - the analytical core is testable without spawning processes
//! - geometry, model, and search modules are reusable on their own

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod geo;
pub mod io;
pub mod math;
pub mod models;
pub mod report;

//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input records (`Station`, `GeoPoint`)
//! - profile-projected observations (`ObservationSet`)
//! - model parameters (`ModelParams`) and run configuration (`FitConfig`)

pub mod types;

pub use types::*;

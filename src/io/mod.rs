//! Input/output helpers.
//!
//! - station CSV ingest + validation (`ingest`)
//! - residual and station CSV exports (`export`)
//! - search result JSON read/write (`result`)

pub mod export;
pub mod ingest;
pub mod result;

pub use export::*;
pub use ingest::*;
pub use result::*;

//! Residuals, outlier ranking, and terminal output.

pub mod format;

pub use format::*;

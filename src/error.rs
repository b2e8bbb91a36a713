//! Error types.
//!
//! Library code returns [`FaultError`], which names the class of failure and the
//! input that caused it. The binary converts it into an [`AppError`] carrying the
//! process exit code:
//!
//! - `2`: configuration / input errors
//! - `3`: insufficient data
//! - `4`: domain errors (singular model, coordinate conversion)

use thiserror::Error;

/// Result alias for the analytical core.
pub type FaultResult<T> = Result<T, FaultError>;

/// Failure classes of the analytical core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FaultError {
    /// Invalid parameter ranges, steps, or mismatched inputs.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Zero stations, degenerate fault, or too few points for a fit.
    #[error("insufficient data: {0}")]
    InsufficientData(String),
    /// Singular model evaluation or failed coordinate conversion.
    #[error("domain error: {0}")]
    Domain(String),
}

impl FaultError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn insufficient_data(message: impl Into<String>) -> Self {
        Self::InsufficientData(message.into())
    }

    pub fn domain(message: impl Into<String>) -> Self {
        Self::Domain(message.into())
    }

    /// Process exit code used when this error aborts a run.
    pub fn exit_code(&self) -> u8 {
        match self {
            FaultError::Configuration(_) => 2,
            FaultError::InsufficientData(_) => 3,
            FaultError::Domain(_) => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FaultError> for AppError {
    fn from(err: FaultError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

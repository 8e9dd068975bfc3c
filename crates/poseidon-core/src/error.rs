//! Error types for sea-level analysis
//!
//! Provides a unified error type for all poseidon crates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core error type for analysis operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Series too short for the requested operation
    #[error("Insufficient data: expected at least {expected} samples, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    /// Zero or near-zero variance input
    #[error("Degenerate signal: {0}")]
    DegenerateSignal(String),

    /// Configuration value out of its domain
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Non-finite values produced or consumed by a numerical step
    #[error("Numerical failure: {0}")]
    NumericalFailure(String),

    /// Series violates the ordering or alignment invariants
    #[error("Malformed series: {0}")]
    MalformedSeries(String),

    /// Cancellation observed at a stage boundary
    #[error("Analysis cancelled")]
    Cancelled,
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Fieldless discriminant of [`Error`], suitable for notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InsufficientData,
    DegenerateSignal,
    InvalidConfig,
    NumericalFailure,
    MalformedSeries,
    Cancelled,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::InsufficientData => "insufficient data",
            ErrorKind::DegenerateSignal => "degenerate signal",
            ErrorKind::InvalidConfig => "invalid configuration",
            ErrorKind::NumericalFailure => "numerical failure",
            ErrorKind::MalformedSeries => "malformed series",
            ErrorKind::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

// Helper functions for common error patterns

impl Error {
    /// Discriminant of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InsufficientData { .. } => ErrorKind::InsufficientData,
            Error::DegenerateSignal(_) => ErrorKind::DegenerateSignal,
            Error::InvalidConfig(_) => ErrorKind::InvalidConfig,
            Error::NumericalFailure(_) => ErrorKind::NumericalFailure,
            Error::MalformedSeries(_) => ErrorKind::MalformedSeries,
            Error::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Create an error for NaN/Inf values
    pub fn non_finite(context: &str) -> Self {
        Self::NumericalFailure(format!("{context} contains NaN or infinite values"))
    }

    /// Create an error for series whose timestamps disagree
    pub fn misaligned(context: &str) -> Self {
        Self::MalformedSeries(format!("{context}: timestamps are not aligned"))
    }

    /// Create an error for size mismatch
    pub fn size_mismatch(expected: usize, actual: usize, context: &str) -> Self {
        Self::MalformedSeries(format!(
            "Size mismatch in {context}: expected {expected}, got {actual}"
        ))
    }
}

/// Fail with [`Error::NumericalFailure`] if any value is NaN or infinite
pub fn ensure_finite(values: &[f64], context: &str) -> Result<()> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(Error::non_finite(context));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InsufficientData { expected: 150, actual: 3 };
        assert_eq!(
            err.to_string(),
            "Insufficient data: expected at least 150 samples, got 3"
        );

        let err = Error::DegenerateSignal("series is constant".to_string());
        assert_eq!(err.to_string(), "Degenerate signal: series is constant");

        let err = Error::InvalidConfig("extreme threshold must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: extreme threshold must be positive"
        );

        assert_eq!(Error::Cancelled.to_string(), "Analysis cancelled");
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(
            Error::InsufficientData { expected: 1, actual: 0 }.kind(),
            ErrorKind::InsufficientData
        );
        assert_eq!(Error::non_finite("input").kind(), ErrorKind::NumericalFailure);
        assert_eq!(Error::misaligned("residual").kind(), ErrorKind::MalformedSeries);
        assert_eq!(Error::Cancelled.kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn test_error_helper_functions() {
        let err = Error::non_finite("input data");
        assert_eq!(
            err.to_string(),
            "Numerical failure: input data contains NaN or infinite values"
        );

        let err = Error::size_mismatch(100, 50, "detrended series");
        assert_eq!(
            err.to_string(),
            "Malformed series: Size mismatch in detrended series: expected 100, got 50"
        );
    }

    #[test]
    fn test_ensure_finite() {
        assert!(ensure_finite(&[1.0, 2.0, 3.0], "data").is_ok());
        assert!(ensure_finite(&[1.0, f64::NAN, 3.0], "data").is_err());
        assert!(ensure_finite(&[1.0, f64::INFINITY], "data").is_err());
        assert!(ensure_finite(&[], "data").is_ok());
    }
}

//! # Error Types
//!
//! Structured error types for loss_core. Every failure inside a loss method,
//! a collaborator lookup, or a type-narrowing access on [`LossDetails`]
//! surfaces as one of these variants so callers can react programmatically.
//!
//! Pre-release queries and post-tensioning queries on girders without
//! tendons are *not* errors; they return zero results or `None`.
//!
//! ## Example
//!
//! ```rust
//! use loss_core::errors::{LossError, LossResult};
//!
//! fn validate_humidity(rh: f64) -> LossResult<()> {
//!     if !(0.0..=100.0).contains(&rh) {
//!         return Err(LossError::invalid_input(
//!             "relative_humidity_pct",
//!             rh.to_string(),
//!             "Relative humidity must be between 0 and 100",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_humidity(75.0).is_ok());
//! ```
//!
//! [`LossDetails`]: crate::losses::LossDetails

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for loss_core operations
pub type LossResult<T> = Result<T, LossError>;

/// Structured error type for loss calculations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum LossError {
    /// An input value is invalid (out of range, inconsistent, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A collaborator could not resolve a location (POI, segment, duct)
    #[error("Location not found: {location} - {reason}")]
    LocationNotFound { location: String, reason: String },

    /// A loss method could not be evaluated with the given inputs
    #[error("Calculation failed: {calculation} - {reason}")]
    CalculationFailed { calculation: String, reason: String },

    /// A method-specific breakdown was requested from a result produced by a
    /// different loss method
    #[error("Loss method mismatch: expected {expected}, found {actual}")]
    MethodMismatch { expected: String, actual: String },

    /// The collaborator context held by the loss engineer no longer exists
    #[error("Collaborator context is no longer available")]
    BrokerUnavailable,

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl LossError {
    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        LossError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a LocationNotFound error
    pub fn location_not_found(location: impl Into<String>, reason: impl Into<String>) -> Self {
        LossError::LocationNotFound {
            location: location.into(),
            reason: reason.into(),
        }
    }

    /// Create a CalculationFailed error
    pub fn calculation_failed(calculation: impl Into<String>, reason: impl Into<String>) -> Self {
        LossError::CalculationFailed {
            calculation: calculation.into(),
            reason: reason.into(),
        }
    }

    /// Create a MethodMismatch error
    pub fn method_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        LossError::MethodMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// True for conditions a caller can recover from by asking differently
    pub fn is_recoverable(&self) -> bool {
        matches!(self, LossError::MethodMismatch { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            LossError::InvalidInput { .. } => "INVALID_INPUT",
            LossError::LocationNotFound { .. } => "LOCATION_NOT_FOUND",
            LossError::CalculationFailed { .. } => "CALCULATION_FAILED",
            LossError::MethodMismatch { .. } => "METHOD_MISMATCH",
            LossError::BrokerUnavailable => "BROKER_UNAVAILABLE",
            LossError::Serialization { .. } => "SERIALIZATION_ERROR",
            LossError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for LossError {
    fn from(err: serde_json::Error) -> Self {
        LossError::Serialization {
            reason: err.to_string(),
        }
    }
}

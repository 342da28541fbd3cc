//! Error types for hlsign-core.

use thiserror::Error;

/// Core error types.
///
/// Every variant describes malformed caller input; the signing layer maps
/// all of them to its `InvalidInput` category.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid chain id: {0}")]
    InvalidChainId(String),

    #[error("Invalid decimal: {0}")]
    InvalidDecimal(String),

    #[error("{field} must not be negative, got {value}")]
    NegativeTimestamp { field: &'static str, value: i64 },

    #[error("Invalid client order id: {0}")]
    InvalidClientOrderId(String),

    #[error("Invalid time-in-force: {0}")]
    InvalidTimeInForce(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// Result type alias for core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

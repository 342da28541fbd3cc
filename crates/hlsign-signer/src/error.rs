//! Signing error types.
//!
//! `SigningError` is the only error a signing flow returns. Its variants are
//! the four failure categories callers act on.

use hlsign_core::{ChainId, CoreError};
use hlsign_registry::RegistryError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SigningError {
    /// Malformed or missing caller input. Raised before any network or wallet call.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Asset or metadata lookup failed.
    #[error("Resolution failure: {0}")]
    ResolutionFailure(String),

    /// The wallet declined or failed the signature request. Not retried.
    #[error("Signing rejected: {0}")]
    SigningRejected(String),

    /// Internal encoding invariant violated.
    #[error("Encoding failure: {0}")]
    EncodingFailure(String),
}

impl From<CoreError> for SigningError {
    fn from(e: CoreError) -> Self {
        Self::InvalidInput(e.to_string())
    }
}

impl From<RegistryError> for SigningError {
    fn from(e: RegistryError) -> Self {
        Self::ResolutionFailure(e.to_string())
    }
}

impl From<rmp_serde::encode::Error> for SigningError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        Self::EncodingFailure(format!("msgpack: {e}"))
    }
}

pub type SigningResult<T> = Result<T, SigningError>;

/// Failure reported by a wallet's typed-data signing capability.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("user rejected the request: {0}")]
    Rejected(String),

    #[error("wallet is locked")]
    Locked,

    #[error("wallet is on chain {actual}, request targets chain {expected}")]
    WrongNetwork { expected: ChainId, actual: ChainId },

    #[error("wallet backend error: {0}")]
    Backend(String),
}

impl From<WalletError> for SigningError {
    fn from(e: WalletError) -> Self {
        Self::SigningRejected(e.to_string())
    }
}

/// Key loading errors.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Failed to decode hex: {0}")]
    HexDecode(#[from] hex::FromHexError),

    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Address mismatch: expected {expected}, got {actual}")]
    AddressMismatch {
        expected: alloy::primitives::Address,
        actual: alloy::primitives::Address,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_errors_are_resolution_failures() {
        let err: SigningError = RegistryError::UnknownAsset("DOGE".to_string()).into();
        assert!(matches!(err, SigningError::ResolutionFailure(ref m) if m.contains("DOGE")));
    }

    #[test]
    fn test_core_errors_are_invalid_input() {
        let err: SigningError = CoreError::MissingField("oid").into();
        assert!(matches!(err, SigningError::InvalidInput(_)));
    }

    #[test]
    fn test_wallet_errors_are_rejections() {
        let err: SigningError = WalletError::Locked.into();
        assert_eq!(err, SigningError::SigningRejected("wallet is locked".to_string()));
    }
}

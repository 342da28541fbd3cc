//! Registry error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    #[error("Metadata parse error: {0}")]
    ParseError(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

pub type RegistryResult<T> = Result<T, RegistryError>;

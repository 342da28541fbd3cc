//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Key error: {0}")]
    Key(#[from] hlsign_signer::KeyError),

    #[error("Signing error: {0}")]
    Signing(#[from] hlsign_signer::SigningError),

    #[error("Registry error: {0}")]
    Registry(#[from] hlsign_registry::RegistryError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] hlsign_telemetry::TelemetryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

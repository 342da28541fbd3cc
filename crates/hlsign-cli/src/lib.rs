//! Command-line signer.
//!
//! Loads a key, builds one exchange action from command-line arguments and
//! prints the signed payload as JSON:
//! - `config`: TOML configuration (chain id, key source, vault, expiry)
//! - `commands`: clap subcommands for every supported action
//! - `app`: wires key, wallet, asset resolver and signer together

pub mod app;
pub mod commands;
pub mod config;
pub mod error;

pub use app::Application;
pub use commands::Command;
pub use config::{AppConfig, KeyConfig};
pub use error::{AppError, AppResult};

//! Wallet signing capability and the local private-key wallet.
//!
//! Security notes:
//! - Key bytes are held in `Zeroizing` buffers until handed to `PrivateKeySigner`.
//! - Never log private key material or signatures.

use std::path::PathBuf;
use std::sync::Arc;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer as AlloySigner;
use hlsign_core::ChainId;
use hlsign_registry::BoxFuture;
use serde_json::{Map, Value};
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::{KeyError, WalletError};
use crate::typed_data::{self, TypeSchema, TypedDataDomain};

/// Structured-data signing capability supplied by the wallet layer.
///
/// The primary type is not passed: `types` holds exactly one entry and the
/// wallet infers it. Returns the raw `r ‖ s ‖ v` signature.
pub trait TypedDataSigner: Send + Sync {
    fn sign_typed_data<'a>(
        &'a self,
        domain: &'a TypedDataDomain,
        types: &'a TypeSchema,
        message: &'a Map<String, Value>,
    ) -> BoxFuture<'a, Result<Vec<u8>, WalletError>>;
}

/// Arc wrapper for TypedDataSigner trait objects.
pub type DynTypedDataSigner = Arc<dyn TypedDataSigner>;

/// Source of the private key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// Load from environment variable (development).
    EnvVar { var_name: String },
    /// Load from file (production, recommend 0600 permissions).
    File { path: PathBuf },
}

/// Loads a signing key and checks its address.
pub struct KeyManager {
    signer: PrivateKeySigner,
}

impl KeyManager {
    /// Load the key from `source`.
    ///
    /// # Errors
    /// Returns `KeyError` if:
    /// - Environment variable not found
    /// - File read fails
    /// - Hex decoding fails
    /// - Private key is invalid
    /// - Address mismatch
    pub fn load(source: &KeySource, expected_address: Option<Address>) -> Result<Self, KeyError> {
        let raw: Zeroizing<String> = match source {
            KeySource::EnvVar { var_name } => Zeroizing::new(
                std::env::var(var_name).map_err(|_| KeyError::EnvVarNotFound(var_name.clone()))?,
            ),
            KeySource::File { path } => Zeroizing::new(std::fs::read_to_string(path)?),
        };
        Self::from_hex(&raw, expected_address)
    }

    /// Parse a hex key (optional `0x`, surrounding whitespace allowed).
    pub fn from_hex(hex_key: &str, expected_address: Option<Address>) -> Result<Self, KeyError> {
        let trimmed = hex_key.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let secret_bytes = Zeroizing::new(hex::decode(digits)?);

        let signer = PrivateKeySigner::from_slice(&secret_bytes)
            .map_err(|e| KeyError::InvalidKey(e.to_string()))?;

        if let Some(expected) = expected_address {
            if signer.address() != expected {
                return Err(KeyError::AddressMismatch {
                    expected,
                    actual: signer.address(),
                });
            }
        }

        Ok(Self { signer })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn into_wallet(self) -> LocalWallet {
        LocalWallet::new(self.signer)
    }
}

/// In-process wallet backed by a private key.
///
/// With an active chain set, requests for any other `domain.chainId` fail
/// with `WalletError::WrongNetwork`, as a browser wallet on another network would.
pub struct LocalWallet {
    signer: PrivateKeySigner,
    active_chain: Option<ChainId>,
}

impl LocalWallet {
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self {
            signer,
            active_chain: None,
        }
    }

    pub fn with_active_chain(mut self, chain_id: ChainId) -> Self {
        self.active_chain = Some(chain_id);
        self
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    async fn sign_inner(
        &self,
        domain: &TypedDataDomain,
        types: &TypeSchema,
        message: &Map<String, Value>,
    ) -> Result<Vec<u8>, WalletError> {
        if let Some(active) = self.active_chain {
            if active != domain.chain_id() {
                return Err(WalletError::WrongNetwork {
                    expected: domain.chain_id(),
                    actual: active,
                });
            }
        }

        let hash = typed_data::signing_hash(domain, types, message)
            .map_err(|e| WalletError::Backend(e.to_string()))?;
        let signature = self
            .signer
            .sign_hash(&hash)
            .await
            .map_err(|e| WalletError::Backend(e.to_string()))?;

        debug!(address = %self.signer.address(), "typed data signed locally");

        let mut bytes = Vec::with_capacity(65);
        bytes.extend_from_slice(&signature.r().to_be_bytes::<32>());
        bytes.extend_from_slice(&signature.s().to_be_bytes::<32>());
        bytes.push(27 + u8::from(signature.v()));
        Ok(bytes)
    }
}

impl TypedDataSigner for LocalWallet {
    fn sign_typed_data<'a>(
        &'a self,
        domain: &'a TypedDataDomain,
        types: &'a TypeSchema,
        message: &'a Map<String, Value>,
    ) -> BoxFuture<'a, Result<Vec<u8>, WalletError>> {
        Box::pin(self.sign_inner(domain, types, message))
    }
}

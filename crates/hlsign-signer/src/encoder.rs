//! Binary action encoder.
//!
//! Preimage layout:
//! ```text
//! msgpack(action) ‖ nonce (u64 BE) ‖ 0x00 | 0x01 ‖ vault (20 bytes) [‖ 0x00 ‖ expiresAfter (u64 BE)]
//! ```
//! The vault flag byte is always present; the expiry block only when set.

use alloy::primitives::{Address, B256};
use hlsign_core::{ExpiresAfter, Nonce};

use crate::action::Action;
use crate::error::{SigningError, SigningResult};
use crate::hasher;

/// Canonical msgpack of an action (map encoding with field names).
///
/// # Errors
/// `SigningError::EncodingFailure` if serialization fails.
pub fn encode_action(action: &Action) -> SigningResult<Vec<u8>> {
    Ok(rmp_serde::to_vec_named(action)?)
}

/// Everything that goes into an L1 action hash.
#[derive(Debug, Clone)]
pub struct SigningInput {
    pub action: Action,
    pub nonce: Nonce,
    /// None = main account, Some = vault or sub-account
    pub vault_address: Option<Address>,
    pub expires_after: Option<ExpiresAfter>,
}

impl SigningInput {
    pub fn new(action: Action, nonce: Nonce) -> Self {
        Self {
            action,
            nonce,
            vault_address: None,
            expires_after: None,
        }
    }

    /// Build from loosely-typed timestamps.
    ///
    /// # Errors
    /// `SigningError::InvalidInput` if `nonce` or `expires_after` is negative.
    pub fn from_raw(
        action: Action,
        nonce: i64,
        vault_address: Option<Address>,
        expires_after: Option<i64>,
    ) -> SigningResult<Self> {
        let nonce = Nonce::from_signed(nonce)?;
        let expires_after = expires_after.map(ExpiresAfter::from_signed).transpose()?;
        Ok(Self {
            action,
            nonce,
            vault_address,
            expires_after,
        })
    }

    pub fn with_vault(mut self, vault: Option<Address>) -> Self {
        self.vault_address = vault;
        self
    }

    pub fn with_expires_after(mut self, expires_after: Option<ExpiresAfter>) -> Self {
        self.expires_after = expires_after;
        self
    }

    /// Bytes the exchange recomputes and hashes.
    ///
    /// # Errors
    /// `SigningError::EncodingFailure` if the action cannot be encoded, or if
    /// it is a user-signed action (those are never hashed).
    pub fn preimage(&self) -> SigningResult<Vec<u8>> {
        if !self.action.is_l1() {
            return Err(SigningError::EncodingFailure(format!(
                "{} is user-signed and has no L1 preimage",
                self.action.type_name()
            )));
        }

        let mut data = encode_action(&self.action)?;
        data.extend_from_slice(&self.nonce.to_be_bytes());

        match &self.vault_address {
            None => data.push(0x00),
            Some(addr) => {
                data.push(0x01);
                data.extend_from_slice(addr.as_slice());
            }
        }

        if let Some(expires) = self.expires_after {
            data.push(0x00);
            data.extend_from_slice(&expires.to_be_bytes());
        }

        Ok(data)
    }

    /// Keccak-256 of the preimage: the phantom agent's `connectionId`.
    pub fn action_hash(&self) -> SigningResult<B256> {
        Ok(hasher::hash(&self.preimage()?))
    }
}

//! Signed wire payload handed to the submission transport.

use alloy::primitives::Address;
use hlsign_core::{ExpiresAfter, Nonce};
use serde::Serialize;

use crate::action::Action;
use crate::error::{SigningError, SigningResult};
use crate::signature::Signature;

/// `{action, nonce, signature}` plus `vaultAddress`/`expiresAfter` when set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedPayload {
    pub action: Action,
    pub nonce: u64,
    pub signature: Signature,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vault_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_after: Option<u64>,
}

impl SignedPayload {
    pub fn new(action: Action, nonce: Nonce, signature: Signature) -> Self {
        Self {
            action,
            nonce: nonce.value(),
            signature,
            vault_address: None,
            expires_after: None,
        }
    }

    pub fn with_vault(mut self, vault: Option<Address>) -> Self {
        self.vault_address = vault.map(|v| format!("0x{}", hex::encode(v.as_slice())));
        self
    }

    pub fn with_expires_after(mut self, expires_after: Option<ExpiresAfter>) -> Self {
        self.expires_after = expires_after.map(|e| e.value());
        self
    }

    /// Compact JSON body for the exchange endpoint.
    pub fn to_json(&self) -> SigningResult<String> {
        serde_json::to_string(self)
            .map_err(|e| SigningError::EncodingFailure(format!("payload json: {e}")))
    }
}

//! Wire signature `{r, s, v}`.

use alloy::primitives::{Address, PrimitiveSignature, B256, U256};
use serde::{Deserialize, Serialize};

use crate::error::{SigningError, SigningResult};

/// Signature split at byte offsets 0..32, 32..64 and 64.
///
/// `r` and `s` are lowercase hex without `0x`. `v` is whatever byte the wallet
/// returned (27/28 or 0/1), untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub r: String,
    pub s: String,
    pub v: u8,
}

impl Signature {
    pub const LEN: usize = 65;

    /// Split a 65-byte `r ‖ s ‖ v` signature.
    ///
    /// # Errors
    /// `SigningError::EncodingFailure` if `bytes` is not 65 bytes long.
    pub fn from_bytes(bytes: &[u8]) -> SigningResult<Self> {
        if bytes.len() != Self::LEN {
            return Err(SigningError::EncodingFailure(format!(
                "signature must be {} bytes, got {}",
                Self::LEN,
                bytes.len()
            )));
        }
        Ok(Self {
            r: hex::encode(&bytes[..32]),
            s: hex::encode(&bytes[32..64]),
            v: bytes[64],
        })
    }

    /// Parse the `0x`-prefixed hex string most wallets return.
    pub fn from_hex(raw: &str) -> SigningResult<Self> {
        let trimmed = raw.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(digits)
            .map_err(|e| SigningError::EncodingFailure(format!("signature hex: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// Reassemble `r ‖ s ‖ v`.
    pub fn to_bytes(&self) -> SigningResult<[u8; 65]> {
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(&decode_word("r", &self.r)?);
        out[32..64].copy_from_slice(&decode_word("s", &self.s)?);
        out[64] = self.v;
        Ok(out)
    }

    /// Address that produced this signature over `hash`.
    pub fn recover_address(&self, hash: &B256) -> SigningResult<Address> {
        let y_parity = match self.v {
            0 | 27 => false,
            1 | 28 => true,
            other => {
                return Err(SigningError::EncodingFailure(format!(
                    "unsupported recovery byte {other}"
                )))
            }
        };
        let r = U256::from_be_bytes(decode_word("r", &self.r)?);
        let s = U256::from_be_bytes(decode_word("s", &self.s)?);

        PrimitiveSignature::new(r, s, y_parity)
            .recover_address_from_prehash(hash)
            .map_err(|e| SigningError::EncodingFailure(format!("signature recovery: {e}")))
    }
}

fn decode_word(name: &str, hex_str: &str) -> SigningResult<[u8; 32]> {
    let bytes = hex::decode(hex_str)
        .map_err(|e| SigningError::EncodingFailure(format!("signature {name}: {e}")))?;
    bytes.try_into().map_err(|b: Vec<u8>| {
        SigningError::EncodingFailure(format!("signature {name} must be 32 bytes, got {}", b.len()))
    })
}

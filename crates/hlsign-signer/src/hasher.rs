//! Keccak-256 (the Ethereum variant, not SHA3-256).

use alloy::primitives::{keccak256, B256};

/// Hash an encoded preimage into a 32-byte connection id.
pub fn hash(bytes: &[u8]) -> B256 {
    keccak256(bytes)
}

/// `0x`-prefixed lowercase hex of a 32-byte digest.
pub fn to_hex(digest: &B256) -> String {
    format!("0x{}", hex::encode(digest.as_slice()))
}

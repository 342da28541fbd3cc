//! Wallet chain id and the network it selects.
//!
//! Two chain ids exist in the protocol and they must not be confused:
//! - the wallet's live chain id (`ChainId`), used as `domain.chainId` for
//!   wallet-side domain separation;
//! - the protocol's `signatureChainId`, embedded in user-signed action bodies
//!   and chosen only by `Network`.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// EVM chain id reported by the connected wallet.
///
/// Parsed once at the boundary (number, decimal string or `0x` hex string)
/// and carried as a strict integer everywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ChainId(u64);

impl ChainId {
    /// Ethereum mainnet.
    pub const ETHEREUM: Self = Self(1);
    /// Arbitrum One (mainnet-equivalent for the exchange).
    pub const ARBITRUM_ONE: Self = Self(42161);
    /// Arbitrum Sepolia (testnet).
    pub const ARBITRUM_SEPOLIA: Self = Self(421614);

    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Parse a loosely-typed chain id string.
    ///
    /// Accepts decimal (`"42161"`) and hex (`"0xa4b1"`) forms, surrounding
    /// whitespace allowed.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let trimmed = raw.trim();
        let parsed = if let Some(hex) = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            u64::from_str_radix(hex, 16)
        } else {
            trimmed.parse::<u64>()
        };
        parsed
            .map(Self)
            .map_err(|_| CoreError::InvalidChainId(raw.to_string()))
    }

    /// Mainnet iff the chain id is Ethereum mainnet or Arbitrum One.
    pub fn is_mainnet(&self) -> bool {
        *self == Self::ETHEREUM || *self == Self::ARBITRUM_ONE
    }

    pub fn network(&self) -> Network {
        if self.is_mainnet() {
            Network::Mainnet
        } else {
            Network::Testnet
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChainId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Self(n)),
            Raw::Text(s) => Self::parse(&s).map_err(serde::de::Error::custom),
        }
    }
}

/// Exchange network selected by the wallet chain id.
///
/// This single flag picks the API host, the phantom agent `source`, and the
/// `hyperliquidChain`/`signatureChainId` constants of user-signed actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub fn is_mainnet(&self) -> bool {
        matches!(self, Self::Mainnet)
    }

    /// REST API base URL.
    pub fn api_base_url(&self) -> &'static str {
        match self {
            Self::Mainnet => "https://api.hyperliquid.xyz",
            Self::Testnet => "https://api.hyperliquid-testnet.xyz",
        }
    }

    /// Info endpoint URL (market metadata).
    pub fn info_url(&self) -> String {
        format!("{}/info", self.api_base_url())
    }

    /// Exchange endpoint URL (signed action submission).
    pub fn exchange_url(&self) -> String {
        format!("{}/exchange", self.api_base_url())
    }

    /// Phantom agent `source`: "a" on mainnet, "b" on testnet.
    pub fn phantom_source(&self) -> &'static str {
        match self {
            Self::Mainnet => "a",
            Self::Testnet => "b",
        }
    }

    /// `hyperliquidChain` value embedded in user-signed actions.
    pub fn hyperliquid_chain(&self) -> &'static str {
        match self {
            Self::Mainnet => "Mainnet",
            Self::Testnet => "Testnet",
        }
    }

    /// `signatureChainId` value embedded in user-signed actions.
    pub fn signature_chain_id(&self) -> &'static str {
        match self {
            Self::Mainnet => "0xa4b1",
            Self::Testnet => "0x66eee",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hyperliquid_chain())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainnet_chain_ids() {
        assert!(ChainId::ETHEREUM.is_mainnet());
        assert!(ChainId::ARBITRUM_ONE.is_mainnet());
        assert_eq!(ChainId::new(42161).network(), Network::Mainnet);
    }

    #[test]
    fn test_everything_else_is_testnet() {
        assert!(!ChainId::ARBITRUM_SEPOLIA.is_mainnet());
        assert_eq!(ChainId::new(1337).network(), Network::Testnet);
        assert_eq!(ChainId::new(0).network(), Network::Testnet);
    }

    #[test]
    fn test_testnet_selects_testnet_constants() {
        let network = ChainId::new(421614).network();
        assert_eq!(network.api_base_url(), "https://api.hyperliquid-testnet.xyz");
        assert_eq!(network.phantom_source(), "b");
        assert_eq!(network.hyperliquid_chain(), "Testnet");
        assert_eq!(network.signature_chain_id(), "0x66eee");
    }

    #[test]
    fn test_mainnet_constants() {
        let network = Network::Mainnet;
        assert_eq!(network.info_url(), "https://api.hyperliquid.xyz/info");
        assert_eq!(network.phantom_source(), "a");
        assert_eq!(network.signature_chain_id(), "0xa4b1");
    }

    #[test]
    fn test_parse_decimal_and_hex() {
        assert_eq!(ChainId::parse("42161").unwrap(), ChainId::ARBITRUM_ONE);
        assert_eq!(ChainId::parse(" 0xa4b1 ").unwrap(), ChainId::ARBITRUM_ONE);
        assert_eq!(ChainId::parse("0x66EEE").unwrap(), ChainId::ARBITRUM_SEPOLIA);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            ChainId::parse("arbitrum"),
            Err(CoreError::InvalidChainId(_))
        ));
        assert!(ChainId::parse("-1").is_err());
        assert!(ChainId::parse("").is_err());
    }

    #[test]
    fn test_deserialize_number_or_string() {
        let from_number: ChainId = serde_json::from_str("42161").unwrap();
        let from_string: ChainId = serde_json::from_str(r#""421614""#).unwrap();
        assert_eq!(from_number, ChainId::ARBITRUM_ONE);
        assert_eq!(from_string, ChainId::ARBITRUM_SEPOLIA);
        assert!(serde_json::from_str::<ChainId>(r#""nope""#).is_err());
    }
}

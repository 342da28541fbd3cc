//! Application configuration.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use alloy::primitives::Address;
use hlsign_core::{ChainId, Network};
use hlsign_signer::KeySource;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Where the signing key comes from.
///
/// ```toml
/// key = { env = "HLSIGN_PRIVATE_KEY" }
/// # or
/// key = { file = "/etc/hlsign/key.hex" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyConfig {
    Env(String),
    File(PathBuf),
}

impl KeyConfig {
    pub fn source(&self) -> KeySource {
        match self {
            Self::Env(var_name) => KeySource::EnvVar {
                var_name: var_name.clone(),
            },
            Self::File(path) => KeySource::File { path: path.clone() },
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Live wallet chain id (number or numeric string, `0x` hex allowed).
    pub chain_id: ChainId,

    /// Chain id the caller last saw. When it differs from `chain_id` it is
    /// overwritten at signing time and a warning event is emitted.
    #[serde(default)]
    pub declared_chain_id: Option<ChainId>,

    pub key: KeyConfig,

    /// Key loading fails if the derived address differs.
    #[serde(default)]
    pub expected_address: Option<String>,

    /// Trade on behalf of this vault or sub-account.
    #[serde(default)]
    pub vault_address: Option<String>,

    /// Signed L1 actions expire this many ms after their nonce.
    #[serde(default)]
    pub expires_after_ms: Option<u64>,

    /// Info endpoint override. Defaults to the network's `/info`.
    #[serde(default)]
    pub info_url: Option<String>,
}

impl AppConfig {
    /// Load configuration from file.
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Reject malformed values before any key load or network call.
    pub fn validate(&self) -> AppResult<()> {
        self.expected_address()?;
        self.vault_address()?;

        if self.expires_after_ms == Some(0) {
            return Err(AppError::Config(
                "expires_after_ms must be greater than zero".to_string(),
            ));
        }
        if let Some(url) = &self.info_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(AppError::Config(format!(
                    "info_url must be an http(s) URL, got {url}"
                )));
            }
        }
        Ok(())
    }

    pub fn network(&self) -> Network {
        self.chain_id.network()
    }

    pub fn info_url(&self) -> String {
        self.info_url
            .clone()
            .unwrap_or_else(|| self.network().info_url())
    }

    pub fn expected_address(&self) -> AppResult<Option<Address>> {
        parse_address("expected_address", self.expected_address.as_deref())
    }

    pub fn vault_address(&self) -> AppResult<Option<Address>> {
        parse_address("vault_address", self.vault_address.as_deref())
    }
}

fn parse_address(field: &str, raw: Option<&str>) -> AppResult<Option<Address>> {
    raw.map(|s| {
        Address::from_str(s.trim())
            .map_err(|e| AppError::Config(format!("{field} {s:?} is not an address: {e}")))
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        chain_id = 42161
        key = { env = "HLSIGN_PRIVATE_KEY" }
    "#;

    #[test]
    fn test_minimal_config() {
        let config = AppConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(config.chain_id, ChainId::ARBITRUM_ONE);
        assert_eq!(config.network(), Network::Mainnet);
        assert_eq!(config.info_url(), "https://api.hyperliquid.xyz/info");
        assert_eq!(
            config.key.source(),
            KeySource::EnvVar {
                var_name: "HLSIGN_PRIVATE_KEY".to_string()
            }
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_chain_id_as_string() {
        let config = AppConfig::from_toml(
            r#"
            chain_id = "0x66eee"
            declared_chain_id = "1"
            key = { file = "/tmp/key.hex" }
            vault_address = "0x4242424242424242424242424242424242424242"
            expires_after_ms = 60000
            "#,
        )
        .unwrap();

        assert_eq!(config.chain_id, ChainId::ARBITRUM_SEPOLIA);
        assert_eq!(config.declared_chain_id, Some(ChainId::ETHEREUM));
        assert_eq!(config.network(), Network::Testnet);
        assert_eq!(
            config.info_url(),
            "https://api.hyperliquid-testnet.xyz/info"
        );
        assert_eq!(
            config.vault_address().unwrap(),
            Some(Address::repeat_byte(0x42))
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::from_toml(MINIMAL).unwrap();
        config.vault_address = Some("0x1234".to_string());
        assert!(matches!(config.validate(), Err(AppError::Config(_))));

        let mut config = AppConfig::from_toml(MINIMAL).unwrap();
        config.info_url = Some("ftp://example".to_string());
        assert!(config.validate().is_err());

        let mut config = AppConfig::from_toml(MINIMAL).unwrap();
        config.expires_after_ms = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_chain_id_fails_parse() {
        let result = AppConfig::from_toml(
            r#"
            chain_id = "arbitrum"
            key = { env = "K" }
            "#,
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}

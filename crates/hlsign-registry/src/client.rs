//! HTTP client for the exchange info endpoint.
//!
//! Fetches the perp and spot universes (source of asset indices) and the
//! account's open orders (input to cancel-all).

use crate::directory::BoxFuture;
use crate::error::{RegistryError, RegistryResult};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Request body for the info endpoint.
#[derive(Debug, Serialize)]
struct InfoRequest<'a> {
    #[serde(rename = "type")]
    request_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a str>,
}

/// One entry of the perp universe. Its position in the array is the asset index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PerpAssetMeta {
    pub name: String,
    #[serde(rename = "szDecimals")]
    pub sz_decimals: u32,
    #[serde(rename = "maxLeverage", default)]
    pub max_leverage: Option<u32>,
    #[serde(rename = "isDelisted", default)]
    pub is_delisted: bool,
}

#[derive(Debug, Deserialize)]
struct PerpMetaResponse {
    universe: Vec<PerpAssetMeta>,
}

/// One spot pair. `index` is the pair's position in the spot universe.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpotPairMeta {
    pub name: String,
    pub index: u32,
    #[serde(default)]
    pub tokens: Vec<u32>,
}

#[derive(Debug, Deserialize)]
struct SpotMetaResponse {
    universe: Vec<SpotPairMeta>,
}

/// Resting order as reported by `openOrders`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OpenOrder {
    pub coin: String,
    pub oid: u64,
    pub side: String,
    #[serde(rename = "limitPx")]
    pub limit_px: String,
    pub sz: String,
    #[serde(default)]
    pub cloid: Option<String>,
    #[serde(default)]
    pub timestamp: u64,
}

/// Client for fetching exchange metadata.
pub struct MetaClient {
    client: Client,
    info_url: String,
}

impl MetaClient {
    /// Create a new meta client.
    ///
    /// # Arguments
    /// * `info_url` - URL of the info endpoint (e.g., "https://api.hyperliquid.xyz/info")
    pub fn new(info_url: impl Into<String>) -> RegistryResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| RegistryError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            info_url: info_url.into(),
        })
    }

    pub fn info_url(&self) -> &str {
        &self.info_url
    }

    /// Fetch the perp universe (`{"type": "meta"}`).
    pub async fn fetch_perp_universe(&self) -> RegistryResult<Vec<PerpAssetMeta>> {
        let response: PerpMetaResponse = self.post_info("meta", None).await?;
        info!(
            url = %self.info_url,
            asset_count = response.universe.len(),
            "Fetched perp universe"
        );
        Ok(response.universe)
    }

    /// Fetch the spot universe (`{"type": "spotMeta"}`).
    pub async fn fetch_spot_universe(&self) -> RegistryResult<Vec<SpotPairMeta>> {
        let response: SpotMetaResponse = self.post_info("spotMeta", None).await?;
        info!(
            url = %self.info_url,
            pair_count = response.universe.len(),
            "Fetched spot universe"
        );
        Ok(response.universe)
    }

    /// Fetch resting orders for a user (`{"type": "openOrders", "user": ...}`).
    ///
    /// # Arguments
    /// * `user_address` - Account address (0x...).
    pub async fn fetch_open_orders(&self, user_address: &str) -> RegistryResult<Vec<OpenOrder>> {
        let orders: Vec<OpenOrder> = self.post_info("openOrders", Some(user_address)).await?;
        info!(user = %user_address, count = orders.len(), "Fetched open orders");
        Ok(orders)
    }

    async fn post_info<T: DeserializeOwned>(
        &self,
        request_type: &str,
        user: Option<&str>,
    ) -> RegistryResult<T> {
        debug!(url = %self.info_url, request_type, "POST info");

        let request = InfoRequest { request_type, user };

        let response = self
            .client
            .post(&self.info_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RegistryError::HttpClient(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::HttpClient(format!(
                "{request_type} failed: HTTP {status}: {body}"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RegistryError::HttpClient(format!("Failed to read response: {e}")))?;

        serde_json::from_slice(&body)
            .map_err(|e| RegistryError::ParseError(format!("{request_type}: {e}")))
    }
}

/// Source of an account's resting orders, consumed by cancel-all.
pub trait OpenOrderSource: Send + Sync {
    fn open_orders<'a>(&'a self, user: &'a str) -> BoxFuture<'a, RegistryResult<Vec<OpenOrder>>>;
}

impl OpenOrderSource for MetaClient {
    fn open_orders<'a>(&'a self, user: &'a str) -> BoxFuture<'a, RegistryResult<Vec<OpenOrder>>> {
        Box::pin(self.fetch_open_orders(user))
    }
}

//! Symbol -> asset index resolution.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::client::{MetaClient, OpenOrder, OpenOrderSource, PerpAssetMeta, SpotPairMeta};
use crate::error::{RegistryError, RegistryResult};

/// Spot pairs are addressed as `10000 + spot index`.
pub const SPOT_ASSET_OFFSET: u32 = 10_000;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Resolves an instrument symbol to its protocol asset index.
///
/// A miss must surface as an error so the signing flow aborts before any
/// hashing or wallet prompt.
pub trait AssetIndexResolver: Send + Sync {
    fn resolve<'a>(&'a self, coin: &'a str) -> BoxFuture<'a, RegistryResult<u32>>;
}

/// Arc wrapper for AssetIndexResolver trait objects.
pub type DynAssetResolver = Arc<dyn AssetIndexResolver>;

/// In-memory symbol -> index map.
#[derive(Debug, Default)]
pub struct AssetDirectory {
    indices: DashMap<String, u32>,
}

impl AssetDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from explicit `(symbol, index)` pairs.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let directory = Self::new();
        for (coin, asset) in entries {
            directory.insert(coin, asset);
        }
        directory
    }

    pub fn insert(&self, coin: impl Into<String>, asset: u32) {
        self.indices.insert(coin.into(), asset);
    }

    /// Index perps by their position in the universe array.
    pub fn load_perps(&self, universe: &[PerpAssetMeta]) {
        for (idx, meta) in universe.iter().enumerate() {
            self.indices.insert(meta.name.clone(), idx as u32);
        }
    }

    /// Index spot pairs as `SPOT_ASSET_OFFSET + index`.
    ///
    /// Nothing is inserted if any pair's index overflows `u32`.
    ///
    /// # Errors
    /// `RegistryError::ParseError` on an out-of-range spot index.
    pub fn load_spot(&self, universe: &[SpotPairMeta]) -> RegistryResult<()> {
        let entries = universe
            .iter()
            .map(|pair| {
                SPOT_ASSET_OFFSET
                    .checked_add(pair.index)
                    .map(|asset| (pair.name.clone(), asset))
                    .ok_or_else(|| {
                        RegistryError::ParseError(format!(
                            "spot pair {} index {} out of range",
                            pair.name, pair.index
                        ))
                    })
            })
            .collect::<RegistryResult<Vec<_>>>()?;

        for (coin, asset) in entries {
            self.indices.insert(coin, asset);
        }
        Ok(())
    }

    pub fn get(&self, coin: &str) -> Option<u32> {
        self.indices.get(coin).map(|entry| *entry)
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Exact lookup.
    ///
    /// # Errors
    /// `RegistryError::UnknownAsset` if the symbol is not present.
    pub fn lookup(&self, coin: &str) -> RegistryResult<u32> {
        self.get(coin)
            .ok_or_else(|| RegistryError::UnknownAsset(coin.to_string()))
    }
}

impl AssetIndexResolver for AssetDirectory {
    fn resolve<'a>(&'a self, coin: &'a str) -> BoxFuture<'a, RegistryResult<u32>> {
        Box::pin(async move { self.lookup(coin) })
    }
}

/// Directory that fills itself from the info endpoint.
///
/// The first miss triggers a refresh of the perp and spot universes; a symbol
/// still missing afterwards is `UnknownAsset`.
pub struct MetaResolver {
    client: MetaClient,
    directory: AssetDirectory,
    refresh_lock: Mutex<()>,
}

impl MetaResolver {
    pub fn new(client: MetaClient) -> Self {
        Self {
            client,
            directory: AssetDirectory::new(),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn client(&self) -> &MetaClient {
        &self.client
    }

    pub fn directory(&self) -> &AssetDirectory {
        &self.directory
    }

    /// Reload both universes. Spot metadata is optional.
    pub async fn refresh(&self) -> RegistryResult<()> {
        let perps = self.client.fetch_perp_universe().await?;
        self.directory.load_perps(&perps);

        match self.client.fetch_spot_universe().await {
            Ok(spot) => self.directory.load_spot(&spot)?,
            Err(e) => warn!(error = %e, "Spot universe unavailable, perps only"),
        }

        debug!(assets = self.directory.len(), "Asset directory refreshed");
        Ok(())
    }

    async fn resolve_inner(&self, coin: &str) -> RegistryResult<u32> {
        if let Some(asset) = self.directory.get(coin) {
            return Ok(asset);
        }

        let _guard = self.refresh_lock.lock().await;
        // Another task may have refreshed while we waited.
        if let Some(asset) = self.directory.get(coin) {
            return Ok(asset);
        }
        self.refresh().await?;
        self.directory.lookup(coin)
    }
}

impl AssetIndexResolver for MetaResolver {
    fn resolve<'a>(&'a self, coin: &'a str) -> BoxFuture<'a, RegistryResult<u32>> {
        Box::pin(self.resolve_inner(coin))
    }
}

impl OpenOrderSource for MetaResolver {
    fn open_orders<'a>(&'a self, user: &'a str) -> BoxFuture<'a, RegistryResult<Vec<OpenOrder>>> {
        self.client.open_orders(user)
    }
}

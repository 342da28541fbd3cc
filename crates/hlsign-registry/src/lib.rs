//! Asset index resolution from exchange market metadata.
//!
//! Maps human-readable instrument symbols ("BTC", "PURR/USDC") to the
//! integer asset index the exchange expects in order and cancel actions.
//!
//! - [`AssetDirectory`]: in-memory symbol -> index cache
//! - [`MetaClient`]: info endpoint client (perp/spot universes, open orders)
//! - [`MetaResolver`]: directory backed by a lazy metadata refresh

pub mod client;
pub mod directory;
pub mod error;

pub use client::{MetaClient, OpenOrder, OpenOrderSource, PerpAssetMeta, SpotPairMeta};
pub use directory::{
    AssetDirectory, AssetIndexResolver, BoxFuture, DynAssetResolver, MetaResolver,
    SPOT_ASSET_OFFSET,
};
pub use error::{RegistryError, RegistryResult};

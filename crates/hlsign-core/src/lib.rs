//! Core domain types for exchange action signing.
//!
//! This crate provides the strict types the signing pipeline works on:
//! - `ChainId`, `Network`: wallet chain id and the mainnet/testnet selection it implies
//! - `Nonce`, `ExpiresAfter`, `NonceManager`: replay-protection timestamps
//! - `WireDecimal`: validated decimal strings for prices, sizes and amounts
//! - `OrderKind`, `TimeInForce`, `ClientOrderId`: order vocabulary
//! - `SigningEvent`, `EventSink`: structured progress events

pub mod decimal;
pub mod error;
pub mod events;
pub mod network;
pub mod nonce;
pub mod order;

pub use decimal::WireDecimal;
pub use error::{CoreError, CoreResult};
pub use events::{
    ActionKind, DynEventSink, EventSink, FlowStage, RecordingEventSink, SigningEvent,
    TracingEventSink,
};
pub use network::{ChainId, Network};
pub use nonce::{Clock, ExpiresAfter, Nonce, NonceManager, SystemClock};
pub use order::{ClientOrderId, OrderKind, TimeInForce, Tpsl};

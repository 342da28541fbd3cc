//! Exchange action signing.
//!
//! Implements the two signing paths:
//! - L1 actions (order, cancel, cancel-all, schedule-cancel): msgpack-encode
//!   the action, append nonce/vault/expiry, keccak the preimage, and sign a
//!   phantom `Agent` over that hash.
//! - User-signed actions (approve-agent, withdraw): sign the action fields
//!   directly as `HyperliquidTransaction:*` typed data.
//!
//! `ExchangeSigner` runs either path end to end and returns a `SignedPayload`.

pub mod action;
pub mod adapter;
pub mod builders;
pub mod encoder;
pub mod error;
pub mod flow;
pub mod hasher;
pub mod payload;
pub mod signature;
pub mod typed_data;
pub mod wallet;

pub use action::{
    Action, ApproveAgentAction, BuilderInfo, CancelAction, CancelByCloidAction, CancelByCloidWire,
    CancelWire, LimitOrderType, OrderAction, OrderTypeWire, OrderWire, ScheduleCancelAction,
    TriggerOrderType, WithdrawAction,
};
pub use adapter::sign_envelope;
pub use builders::{BuilderFee, CancelRequest, CancelTarget, OrderRequest};
pub use encoder::{encode_action, SigningInput};
pub use error::{KeyError, SigningError, SigningResult, WalletError};
pub use flow::{ExchangeSigner, SigningContext};
pub use payload::SignedPayload;
pub use signature::Signature;
pub use typed_data::{
    PhantomAgent, TypeSchema, TypedDataDomain, TypedDataEnvelope, TypedField, AGENT_TYPE,
    APPROVE_AGENT_TYPE, WITHDRAW_TYPE,
};
pub use wallet::{DynTypedDataSigner, KeyManager, KeySource, LocalWallet, TypedDataSigner};

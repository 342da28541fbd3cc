//! Action builders.
//!
//! Pure functions from caller parameters (plus already-resolved asset
//! indices) to wire actions. Every numeric string is validated and
//! normalized here, before anything is hashed or signed.

use alloy::primitives::Address;
use hlsign_core::{ClientOrderId, Network, Nonce, OrderKind, TimeInForce, WireDecimal};

use crate::action::{
    Action, ApproveAgentAction, BuilderInfo, CancelAction, CancelByCloidAction, CancelByCloidWire,
    CancelWire, LimitOrderType, OrderAction, OrderTypeWire, OrderWire, ScheduleCancelAction,
    TriggerOrderType, WithdrawAction,
};
use crate::error::{SigningError, SigningResult};

/// Grouping for independent orders.
pub const GROUPING_NA: &str = "na";

/// One order as the caller describes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub coin: String,
    pub is_buy: bool,
    pub price: String,
    pub size: String,
    pub reduce_only: bool,
    pub kind: OrderKind,
    pub cloid: Option<ClientOrderId>,
}

impl OrderRequest {
    /// Resting limit order (`Gtc`).
    pub fn limit(
        coin: impl Into<String>,
        is_buy: bool,
        price: impl Into<String>,
        size: impl Into<String>,
    ) -> Self {
        Self {
            coin: coin.into(),
            is_buy,
            price: price.into(),
            size: size.into(),
            reduce_only: false,
            kind: OrderKind::Limit,
            cloid: None,
        }
    }

    /// Market order. `price` is the worst acceptable fill price.
    pub fn market(
        coin: impl Into<String>,
        is_buy: bool,
        price: impl Into<String>,
        size: impl Into<String>,
    ) -> Self {
        Self {
            kind: OrderKind::Market,
            ..Self::limit(coin, is_buy, price, size)
        }
    }

    pub fn with_kind(mut self, kind: OrderKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_reduce_only(mut self, reduce_only: bool) -> Self {
        self.reduce_only = reduce_only;
        self
    }

    pub fn with_cloid(mut self, cloid: ClientOrderId) -> Self {
        self.cloid = Some(cloid);
        self
    }
}

/// Builder fee attached to an order action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuilderFee {
    pub address: Address,
    /// Tenths of a basis point.
    pub fee: u64,
}

/// Wire entry for one order on `asset`.
///
/// # Errors
/// `SigningError::InvalidInput` if price or size is malformed or not positive.
pub fn order_wire(request: &OrderRequest, asset: u32) -> SigningResult<OrderWire> {
    let price = WireDecimal::parse("price", &request.price)?;
    let size = WireDecimal::parse("size", &request.size)?;

    let order_type = match &request.kind {
        OrderKind::Trigger {
            trigger_px,
            is_market,
            tpsl,
        } => OrderTypeWire::Trigger {
            trigger: TriggerOrderType {
                is_market: *is_market,
                trigger_px: trigger_px.to_wire(),
                tpsl: tpsl.as_str().to_string(),
            },
        },
        kind => OrderTypeWire::Limit {
            limit: LimitOrderType {
                tif: kind
                    .time_in_force()
                    .unwrap_or(TimeInForce::Gtc)
                    .as_str()
                    .to_string(),
            },
        },
    };

    Ok(OrderWire {
        asset,
        is_buy: request.is_buy,
        limit_px: price.to_wire(),
        sz: size.to_wire(),
        reduce_only: request.reduce_only,
        order_type,
        cloid: request.cloid.as_ref().map(|c| c.as_str().to_string()),
    })
}

/// `order` action over one or more wire orders.
///
/// # Errors
/// `SigningError::InvalidInput` if `orders` is empty.
pub fn order_action(orders: Vec<OrderWire>, builder: Option<&BuilderFee>) -> SigningResult<Action> {
    if orders.is_empty() {
        return Err(SigningError::InvalidInput(
            "order action needs at least one order".to_string(),
        ));
    }
    Ok(Action::Order(OrderAction {
        orders,
        grouping: GROUPING_NA.to_string(),
        builder: builder.map(|b| BuilderInfo {
            address: format!("0x{}", hex::encode(b.address.as_slice())),
            fee: b.fee,
        }),
    }))
}

/// Cancel one order, by exchange id or client id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelRequest {
    pub coin: String,
    pub oid: Option<u64>,
    pub cloid: Option<ClientOrderId>,
}

impl CancelRequest {
    pub fn by_oid(coin: impl Into<String>, oid: u64) -> Self {
        Self {
            coin: coin.into(),
            oid: Some(oid),
            cloid: None,
        }
    }

    pub fn by_cloid(coin: impl Into<String>, cloid: ClientOrderId) -> Self {
        Self {
            coin: coin.into(),
            oid: None,
            cloid: Some(cloid),
        }
    }

    /// The exchange id wins when both are given.
    ///
    /// # Errors
    /// `SigningError::InvalidInput` if neither id is present.
    pub fn target(&self) -> SigningResult<CancelTarget> {
        match (self.oid, &self.cloid) {
            (Some(oid), _) => Ok(CancelTarget::Oid(oid)),
            (None, Some(cloid)) => Ok(CancelTarget::Cloid(cloid.clone())),
            (None, None) => Err(SigningError::InvalidInput(format!(
                "cancel on {} needs an order id or a client order id",
                self.coin
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelTarget {
    Oid(u64),
    Cloid(ClientOrderId),
}

/// `cancel` for an exchange id, `cancelByCloid` for a client id.
pub fn cancel_action(asset: u32, target: &CancelTarget) -> Action {
    match target {
        CancelTarget::Oid(oid) => Action::Cancel(CancelAction {
            cancels: vec![CancelWire { asset, oid: *oid }],
        }),
        CancelTarget::Cloid(cloid) => Action::CancelByCloid(CancelByCloidAction {
            cancels: vec![CancelByCloidWire {
                asset,
                cloid: cloid.as_str().to_string(),
            }],
        }),
    }
}

/// One `cancel` covering every resolved open order.
///
/// # Errors
/// `SigningError::InvalidInput` if there is nothing to cancel.
pub fn cancel_all_action(cancels: Vec<CancelWire>) -> SigningResult<Action> {
    if cancels.is_empty() {
        return Err(SigningError::InvalidInput(
            "no open orders to cancel".to_string(),
        ));
    }
    Ok(Action::Cancel(CancelAction { cancels }))
}

/// Schedule (or with `None`, clear) a cancel-all at `time` ms.
pub fn schedule_cancel_action(time: Option<u64>) -> Action {
    Action::ScheduleCancel(ScheduleCancelAction { time })
}

/// Agent approval. An empty or absent name drops `agentName` from the action.
pub fn approve_agent_action(
    network: Network,
    agent_address: Address,
    agent_name: Option<&str>,
    nonce: Nonce,
) -> Action {
    Action::ApproveAgent(ApproveAgentAction {
        signature_chain_id: network.signature_chain_id().to_string(),
        hyperliquid_chain: network.hyperliquid_chain().to_string(),
        agent_address: agent_address.to_checksum(None),
        agent_name: agent_name
            .filter(|name| !name.is_empty())
            .map(str::to_string),
        nonce: nonce.value(),
    })
}

/// Withdrawal of `amount` USDC to `destination`, stamped with `time`.
///
/// # Errors
/// `SigningError::InvalidInput` if the amount is malformed or not positive.
pub fn withdraw_action(
    network: Network,
    destination: Address,
    amount: &str,
    time: Nonce,
) -> SigningResult<Action> {
    let amount = WireDecimal::parse("amount", amount)?;
    Ok(Action::Withdraw(WithdrawAction {
        signature_chain_id: network.signature_chain_id().to_string(),
        hyperliquid_chain: network.hyperliquid_chain().to_string(),
        destination: destination.to_checksum(None),
        amount: amount.to_wire(),
        time: time.value(),
    }))
}

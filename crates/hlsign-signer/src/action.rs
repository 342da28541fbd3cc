//! Wire format of exchange actions.
//!
//! Field order in each struct is the order the exchange hashes the msgpack
//! map in, so it must not be rearranged. `Option<T>` fields always carry
//! `skip_serializing_if`: an absent optional key is omitted, never sent as nil.

use hlsign_core::ActionKind;
use serde::Serialize;

/// One exchange action, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    Order(OrderAction),
    Cancel(CancelAction),
    CancelByCloid(CancelByCloidAction),
    ScheduleCancel(ScheduleCancelAction),
    ApproveAgent(ApproveAgentAction),
    #[serde(rename = "withdraw3")]
    Withdraw(WithdrawAction),
}

impl Action {
    /// Value of the `type` key on the wire.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Order(_) => "order",
            Self::Cancel(_) => "cancel",
            Self::CancelByCloid(_) => "cancelByCloid",
            Self::ScheduleCancel(_) => "scheduleCancel",
            Self::ApproveAgent(_) => "approveAgent",
            Self::Withdraw(_) => "withdraw3",
        }
    }

    /// Default event kind for this action. Cancel-all flows report
    /// `ActionKind::CancelAll` themselves since they share the `cancel` wire type.
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Order(_) => ActionKind::Order,
            Self::Cancel(_) | Self::CancelByCloid(_) => ActionKind::Cancel,
            Self::ScheduleCancel(_) => ActionKind::ScheduleCancel,
            Self::ApproveAgent(_) => ActionKind::ApproveAgent,
            Self::Withdraw(_) => ActionKind::Withdraw,
        }
    }

    /// L1 actions are msgpack-hashed and signed via the phantom agent.
    pub fn is_l1(&self) -> bool {
        !matches!(self, Self::ApproveAgent(_) | Self::Withdraw(_))
    }
}

/// `{"type":"order","orders":[...],"grouping":"na","builder"?:{...}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderAction {
    pub orders: Vec<OrderWire>,
    /// "na" for plain orders.
    pub grouping: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builder: Option<BuilderInfo>,
}

/// Builder fee attribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuilderInfo {
    /// Builder address, lowercase 0x hex.
    #[serde(rename = "b")]
    pub address: String,
    /// Fee in tenths of a basis point.
    #[serde(rename = "f")]
    pub fee: u64,
}

/// Single order entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderWire {
    /// Asset index
    #[serde(rename = "a")]
    pub asset: u32,

    /// Buy (true) or Sell (false)
    #[serde(rename = "b")]
    pub is_buy: bool,

    /// Limit price as string
    #[serde(rename = "p")]
    pub limit_px: String,

    /// Size as string
    #[serde(rename = "s")]
    pub sz: String,

    #[serde(rename = "r")]
    pub reduce_only: bool,

    #[serde(rename = "t")]
    pub order_type: OrderTypeWire,

    /// Client order ID, omitted when not supplied.
    #[serde(rename = "c", skip_serializing_if = "Option::is_none")]
    pub cloid: Option<String>,
}

/// `{"limit":{"tif":...}}` or `{"trigger":{...}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OrderTypeWire {
    Limit { limit: LimitOrderType },
    Trigger { trigger: TriggerOrderType },
}

impl OrderTypeWire {
    pub fn limit(tif: &str) -> Self {
        Self::Limit {
            limit: LimitOrderType {
                tif: tif.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LimitOrderType {
    /// "Gtc", "Ioc" or "Alo"
    pub tif: String,
}

/// Key order: isMarket, triggerPx, tpsl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerOrderType {
    #[serde(rename = "isMarket")]
    pub is_market: bool,

    #[serde(rename = "triggerPx")]
    pub trigger_px: String,

    /// "tp" or "sl"
    pub tpsl: String,
}

/// `{"type":"cancel","cancels":[{"a":..,"o":..}]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancelAction {
    pub cancels: Vec<CancelWire>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CancelWire {
    #[serde(rename = "a")]
    pub asset: u32,

    /// Exchange order ID
    #[serde(rename = "o")]
    pub oid: u64,
}

/// `{"type":"cancelByCloid","cancels":[{"asset":..,"cloid":..}]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancelByCloidAction {
    pub cancels: Vec<CancelByCloidWire>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancelByCloidWire {
    pub asset: u32,
    pub cloid: String,
}

/// Dead-man switch. Without `time` the scheduled cancel is cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleCancelAction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<u64>,
}

/// User-signed agent approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveAgentAction {
    pub signature_chain_id: String,
    pub hyperliquid_chain: String,
    pub agent_address: String,
    /// Omitted when the agent is unnamed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    pub nonce: u64,
}

/// User-signed withdrawal to an L1 address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawAction {
    pub signature_chain_id: String,
    pub hyperliquid_chain: String,
    /// EIP-55 checksummed address.
    pub destination: String,
    pub amount: String,
    pub time: u64,
}

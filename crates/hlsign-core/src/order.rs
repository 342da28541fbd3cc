//! Order vocabulary: kinds, time-in-force and client order ids.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::decimal::WireDecimal;
use crate::error::CoreError;

/// Time-in-force for limit orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Good-til-cancelled.
    Gtc,
    /// Immediate-or-cancel.
    Ioc,
    /// Add-liquidity-only (post only).
    Alo,
}

impl TimeInForce {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gtc => "Gtc",
            Self::Ioc => "Ioc",
            Self::Alo => "Alo",
        }
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeInForce {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gtc" => Ok(Self::Gtc),
            "ioc" => Ok(Self::Ioc),
            "alo" => Ok(Self::Alo),
            _ => Err(CoreError::InvalidTimeInForce(s.to_string())),
        }
    }
}

/// Take-profit or stop-loss leg of a trigger order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tpsl {
    Tp,
    Sl,
}

impl Tpsl {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tp => "tp",
            Self::Sl => "sl",
        }
    }
}

/// User-facing order kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderKind {
    /// Resting limit order (`Gtc` unless overridden).
    Limit,
    /// Market order, sent as an aggressive `Ioc` limit.
    Market,
    /// Limit order with an explicit time-in-force.
    LimitWithTif(TimeInForce),
    /// Trigger (TP/SL) order.
    Trigger {
        trigger_px: WireDecimal,
        is_market: bool,
        tpsl: Tpsl,
    },
}

impl OrderKind {
    /// Time-in-force for limit-style kinds; `None` for triggers.
    ///
    /// `Market` maps to `Ioc`, `Limit` maps to `Gtc`.
    pub fn time_in_force(&self) -> Option<TimeInForce> {
        match self {
            Self::Limit => Some(TimeInForce::Gtc),
            Self::Market => Some(TimeInForce::Ioc),
            Self::LimitWithTif(tif) => Some(*tif),
            Self::Trigger { .. } => None,
        }
    }
}

/// Client order id: 16 bytes rendered as `0x` + 32 lowercase hex chars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClientOrderId(String);

impl ClientOrderId {
    /// Fresh random id.
    pub fn new() -> Self {
        Self(format!("0x{}", Uuid::new_v4().simple()))
    }

    /// Validate and lowercase an existing id.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .ok_or_else(|| CoreError::InvalidClientOrderId(raw.to_string()))?;
        if hex.len() != 32 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidClientOrderId(raw.to_string()));
        }
        Ok(Self(format!("0x{}", hex.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ClientOrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ClientOrderId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ClientOrderId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ClientOrderId> for String {
    fn from(id: ClientOrderId) -> Self {
        id.0
    }
}

//! Subcommands, one per action kind.

use alloy::primitives::Address;
use clap::{Args, Subcommand, ValueEnum};
use hlsign_core::{ClientOrderId, OrderKind, TimeInForce, Tpsl, WireDecimal};
use hlsign_signer::{BuilderFee, CancelRequest, OrderRequest};

use crate::error::{AppError, AppResult};

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Place an order.
    Order(OrderArgs),

    /// Cancel one order by exchange id or client order id.
    Cancel {
        #[arg(long)]
        coin: String,
        #[arg(long, required_unless_present = "cloid")]
        oid: Option<u64>,
        #[arg(long)]
        cloid: Option<ClientOrderId>,
    },

    /// Cancel every open order of the signing account.
    CancelAll {
        /// Only cancel orders on this coin.
        #[arg(long)]
        coin: Option<String>,
    },

    /// Schedule a cancel-all at a future time; omit --time to clear it.
    ScheduleCancel {
        /// Unix time in ms.
        #[arg(long)]
        time: Option<u64>,
    },

    /// Approve an agent key to trade for this account.
    ApproveAgent {
        #[arg(long)]
        agent: Address,
        #[arg(long)]
        name: Option<String>,
    },

    /// Withdraw USDC to an address.
    Withdraw {
        #[arg(long)]
        destination: Address,
        #[arg(long)]
        amount: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderTypeArg {
    #[default]
    Limit,
    Market,
    Ioc,
    Alo,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TpslArg {
    Tp,
    Sl,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct OrderArgs {
    #[arg(long)]
    pub coin: String,
    #[arg(long, value_enum)]
    pub side: Side,
    #[arg(long)]
    pub price: String,
    #[arg(long)]
    pub size: String,
    #[arg(long = "type", value_enum, default_value_t = OrderTypeArg::Limit)]
    pub order_type: OrderTypeArg,
    #[arg(long)]
    pub reduce_only: bool,
    #[arg(long)]
    pub cloid: Option<ClientOrderId>,

    /// Makes this a trigger order.
    #[arg(long, requires = "tpsl")]
    pub trigger_px: Option<String>,
    #[arg(long, value_enum)]
    pub tpsl: Option<TpslArg>,
    /// Fill as market once triggered.
    #[arg(long)]
    pub trigger_market: bool,

    #[arg(long, requires = "builder_fee")]
    pub builder: Option<Address>,
    /// Builder fee in tenths of a basis point.
    #[arg(long, requires = "builder")]
    pub builder_fee: Option<u64>,
}

impl OrderArgs {
    pub fn to_request(&self) -> AppResult<OrderRequest> {
        let kind = match (&self.trigger_px, self.tpsl) {
            (Some(px), Some(tpsl)) => OrderKind::Trigger {
                trigger_px: WireDecimal::parse("triggerPx", px)
                    .map_err(|e| AppError::InvalidArgs(e.to_string()))?,
                is_market: self.trigger_market,
                tpsl: match tpsl {
                    TpslArg::Tp => Tpsl::Tp,
                    TpslArg::Sl => Tpsl::Sl,
                },
            },
            (Some(_), None) => {
                return Err(AppError::InvalidArgs(
                    "--trigger-px requires --tpsl".to_string(),
                ))
            }
            (None, _) => match self.order_type {
                OrderTypeArg::Limit => OrderKind::Limit,
                OrderTypeArg::Market => OrderKind::Market,
                OrderTypeArg::Ioc => OrderKind::LimitWithTif(TimeInForce::Ioc),
                OrderTypeArg::Alo => OrderKind::LimitWithTif(TimeInForce::Alo),
            },
        };

        Ok(OrderRequest {
            coin: self.coin.clone(),
            is_buy: self.side == Side::Buy,
            price: self.price.clone(),
            size: self.size.clone(),
            reduce_only: self.reduce_only,
            kind,
            cloid: self.cloid.clone(),
        })
    }

    pub fn builder_fee(&self) -> Option<BuilderFee> {
        match (self.builder, self.builder_fee) {
            (Some(address), Some(fee)) => Some(BuilderFee { address, fee }),
            _ => None,
        }
    }
}

/// Cancel request from `cancel` arguments.
pub fn cancel_request(
    coin: &str,
    oid: Option<u64>,
    cloid: Option<&ClientOrderId>,
) -> CancelRequest {
    CancelRequest {
        coin: coin.to_string(),
        oid,
        cloid: cloid.cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        command: Command,
    }

    fn parse(args: &[&str]) -> Result<Command, clap::Error> {
        TestCli::try_parse_from(std::iter::once("hlsign").chain(args.iter().copied()))
            .map(|c| c.command)
    }

    #[test]
    fn test_parse_limit_order() {
        let Command::Order(args) = parse(&[
            "order", "--coin", "BTC", "--side", "buy", "--price", "50000", "--size", "0.01",
        ])
        .unwrap() else {
            panic!("expected order");
        };

        let request = args.to_request().unwrap();
        assert_eq!(request.coin, "BTC");
        assert!(request.is_buy);
        assert_eq!(request.kind, OrderKind::Limit);
        assert_eq!(args.builder_fee(), None);
    }

    #[test]
    fn test_parse_market_and_alo() {
        let Command::Order(args) = parse(&[
            "order", "--coin", "ETH", "--side", "sell", "--price", "2900", "--size", "1",
            "--type", "market", "--reduce-only",
        ])
        .unwrap() else {
            panic!("expected order");
        };
        let request = args.to_request().unwrap();
        assert_eq!(request.kind, OrderKind::Market);
        assert!(request.reduce_only);
        assert!(!request.is_buy);

        let Command::Order(args) = parse(&[
            "order", "--coin", "ETH", "--side", "buy", "--price", "1", "--size", "1", "--type",
            "alo",
        ])
        .unwrap() else {
            panic!("expected order");
        };
        assert_eq!(
            args.to_request().unwrap().kind,
            OrderKind::LimitWithTif(TimeInForce::Alo)
        );
    }

    #[test]
    fn test_parse_trigger_order() {
        let Command::Order(args) = parse(&[
            "order",
            "--coin",
            "SOL",
            "--side",
            "sell",
            "--price",
            "90",
            "--size",
            "2",
            "--trigger-px",
            "95",
            "--tpsl",
            "sl",
            "--trigger-market",
        ])
        .unwrap() else {
            panic!("expected order");
        };

        match args.to_request().unwrap().kind {
            OrderKind::Trigger {
                trigger_px,
                is_market,
                tpsl,
            } => {
                assert_eq!(trigger_px.to_wire(), "95");
                assert!(is_market);
                assert_eq!(tpsl, Tpsl::Sl);
            }
            other => panic!("expected trigger, got {other:?}"),
        }

        assert!(parse(&[
            "order", "--coin", "SOL", "--side", "sell", "--price", "90", "--size", "2",
            "--trigger-px", "95",
        ])
        .is_err());
    }

    #[test]
    fn test_builder_and_fee_come_together() {
        let base = [
            "order", "--coin", "ETH", "--side", "sell", "--price", "3000", "--size", "1",
        ];

        let fee_only: Vec<&str> = base.iter().copied().chain(["--builder-fee", "10"]).collect();
        assert!(parse(&fee_only).is_err());

        let builder_only: Vec<&str> = base
            .iter()
            .copied()
            .chain(["--builder", "0x70997970C51812dc3A010C7d01b50e0d17dc79C8"])
            .collect();
        assert!(parse(&builder_only).is_err());

        let both: Vec<&str> = base
            .iter()
            .copied()
            .chain([
                "--builder",
                "0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
                "--builder-fee",
                "10",
            ])
            .collect();
        let Command::Order(args) = parse(&both).unwrap() else {
            panic!("expected order");
        };
        assert_eq!(args.builder_fee().map(|b| b.fee), Some(10));
    }

    #[test]
    fn test_cancel_needs_an_id() {
        assert!(parse(&["cancel", "--coin", "BTC"]).is_err());
        assert_eq!(
            parse(&["cancel", "--coin", "BTC", "--oid", "42"]).unwrap(),
            Command::Cancel {
                coin: "BTC".to_string(),
                oid: Some(42),
                cloid: None,
            }
        );
        assert!(parse(&[
            "cancel",
            "--coin",
            "BTC",
            "--cloid",
            "0x0de3e244a8f44fc28a6b7bc852d66d19"
        ])
        .is_ok());
        assert!(parse(&["cancel", "--coin", "BTC", "--cloid", "nope"]).is_err());
    }

    #[test]
    fn test_parse_user_signed_commands() {
        let cmd = parse(&[
            "approve-agent",
            "--agent",
            "0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
        ])
        .unwrap();
        assert!(matches!(cmd, Command::ApproveAgent { name: None, .. }));

        let cmd = parse(&[
            "withdraw",
            "--destination",
            "0x70997970c51812dc3a010c7d01b50e0d17dc79c8",
            "--amount",
            "12.5",
        ])
        .unwrap();
        assert!(matches!(cmd, Command::Withdraw { ref amount, .. } if amount == "12.5"));
    }
}

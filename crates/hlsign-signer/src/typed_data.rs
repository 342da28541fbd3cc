//! EIP-712 typed-data envelopes.
//!
//! Two envelope families exist:
//! - L1 actions sign a phantom `Agent{source, connectionId}` in the
//!   `Exchange` domain;
//! - user-signed actions sign their own fields under a
//!   `HyperliquidTransaction:*` type in the `HyperliquidSignTransaction` domain.
//!
//! In both, `domain.chainId` is the wallet's live chain id. The protocol's
//! `signatureChainId` lives only in the action body.

use std::collections::BTreeMap;
use std::str::FromStr;

use alloy::primitives::{keccak256, Address, B256, U256};
use alloy::sol_types::Eip712Domain;
use hlsign_core::{ChainId, Network};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::action::{Action, ApproveAgentAction, WithdrawAction};
use crate::error::{SigningError, SigningResult};
use crate::hasher;

pub const L1_DOMAIN_NAME: &str = "Exchange";
pub const USER_SIGNED_DOMAIN_NAME: &str = "HyperliquidSignTransaction";
pub const DOMAIN_VERSION: &str = "1";

/// Generic domain type key. Never part of `types` when signing.
pub const EIP712_DOMAIN_TYPE: &str = "EIP712Domain";
pub const AGENT_TYPE: &str = "Agent";
pub const APPROVE_AGENT_TYPE: &str = "HyperliquidTransaction:ApproveAgent";
pub const WITHDRAW_TYPE: &str = "HyperliquidTransaction:Withdraw";

/// Domain of an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedDataDomain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    #[serde(serialize_with = "serialize_address")]
    pub verifying_contract: Address,
}

impl TypedDataDomain {
    fn new(name: &str, chain_id: ChainId) -> Self {
        Self {
            name: name.to_string(),
            version: DOMAIN_VERSION.to_string(),
            chain_id: chain_id.value(),
            verifying_contract: Address::ZERO,
        }
    }

    pub fn chain_id(&self) -> ChainId {
        ChainId::new(self.chain_id)
    }

    /// EIP-712 domain separator.
    pub fn separator(&self) -> B256 {
        Eip712Domain::new(
            Some(self.name.clone().into()),
            Some(self.version.clone().into()),
            Some(U256::from(self.chain_id)),
            Some(self.verifying_contract),
            None,
        )
        .separator()
    }
}

fn serialize_address<S: Serializer>(addr: &Address, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("0x{}", hex::encode(addr.as_slice())))
}

/// One `{name, type}` entry of a struct type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypedField {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

impl TypedField {
    pub fn new(name: &str, type_name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name.to_string(),
        }
    }
}

/// Type name -> ordered fields.
pub type TypeSchema = BTreeMap<String, Vec<TypedField>>;

/// L1 signing target: `source` is "a" on mainnet, "b" on testnet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhantomAgent {
    pub source: &'static str,
    pub connection_id: B256,
}

impl PhantomAgent {
    pub fn new(connection_id: B256, network: Network) -> Self {
        Self {
            source: network.phantom_source(),
            connection_id,
        }
    }
}

/// `{domain, types, primaryType, message}` handed to the wallet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedDataEnvelope {
    pub domain: TypedDataDomain,
    pub types: TypeSchema,
    pub primary_type: String,
    pub message: Map<String, Value>,
}

impl TypedDataEnvelope {
    /// L1 envelope around a phantom agent.
    pub fn l1(agent: &PhantomAgent, chain_id: ChainId) -> Self {
        let mut message = Map::new();
        message.insert("source".to_string(), Value::from(agent.source));
        message.insert(
            "connectionId".to_string(),
            Value::from(hasher::to_hex(&agent.connection_id)),
        );

        Self::single_type(
            TypedDataDomain::new(L1_DOMAIN_NAME, chain_id),
            AGENT_TYPE,
            vec![
                TypedField::new("source", "string"),
                TypedField::new("connectionId", "bytes32"),
            ],
            message,
        )
    }

    /// Envelope for a user-signed action.
    ///
    /// The message carries exactly the schema's fields; `type` and
    /// `signatureChainId` stay wire-only.
    ///
    /// # Errors
    /// `SigningError::EncodingFailure` for L1 actions.
    pub fn user_signed(action: &Action, chain_id: ChainId) -> SigningResult<Self> {
        let domain = TypedDataDomain::new(USER_SIGNED_DOMAIN_NAME, chain_id);
        match action {
            Action::ApproveAgent(a) => Ok(Self::approve_agent(domain, a)),
            Action::Withdraw(w) => Ok(Self::withdraw(domain, w)),
            other => Err(SigningError::EncodingFailure(format!(
                "{} is an L1 action, not user-signed",
                other.type_name()
            ))),
        }
    }

    fn approve_agent(domain: TypedDataDomain, action: &ApproveAgentAction) -> Self {
        let mut message = Map::new();
        message.insert(
            "hyperliquidChain".to_string(),
            Value::from(action.hyperliquid_chain.clone()),
        );
        message.insert(
            "agentAddress".to_string(),
            Value::from(action.agent_address.clone()),
        );
        // The schema lists agentName, so an unnamed agent signs "".
        message.insert(
            "agentName".to_string(),
            Value::from(action.agent_name.clone().unwrap_or_default()),
        );
        message.insert("nonce".to_string(), Value::from(action.nonce));

        Self::single_type(
            domain,
            APPROVE_AGENT_TYPE,
            vec![
                TypedField::new("hyperliquidChain", "string"),
                TypedField::new("agentAddress", "address"),
                TypedField::new("agentName", "string"),
                TypedField::new("nonce", "uint64"),
            ],
            message,
        )
    }

    fn withdraw(domain: TypedDataDomain, action: &WithdrawAction) -> Self {
        let mut message = Map::new();
        message.insert(
            "hyperliquidChain".to_string(),
            Value::from(action.hyperliquid_chain.clone()),
        );
        message.insert(
            "destination".to_string(),
            Value::from(action.destination.clone()),
        );
        message.insert("amount".to_string(), Value::from(action.amount.clone()));
        message.insert("time".to_string(), Value::from(action.time));

        Self::single_type(
            domain,
            WITHDRAW_TYPE,
            vec![
                TypedField::new("hyperliquidChain", "string"),
                TypedField::new("destination", "string"),
                TypedField::new("amount", "string"),
                TypedField::new("time", "uint64"),
            ],
            message,
        )
    }

    fn single_type(
        domain: TypedDataDomain,
        primary_type: &str,
        fields: Vec<TypedField>,
        message: Map<String, Value>,
    ) -> Self {
        let mut types = TypeSchema::new();
        types.insert(primary_type.to_string(), fields);
        Self {
            domain,
            types,
            primary_type: primary_type.to_string(),
            message,
        }
    }

    /// Replace a stale domain chain id with the live one.
    ///
    /// Returns the previous value when it was overwritten.
    pub fn reconcile_chain_id(&mut self, live: ChainId) -> Option<ChainId> {
        let declared = self.domain.chain_id();
        if declared == live {
            return None;
        }
        self.domain.chain_id = live.value();
        Some(declared)
    }

    /// Strip any generic domain type and check `types` is exactly the primary type.
    ///
    /// Wallets infer the primary type from the single remaining key.
    ///
    /// # Errors
    /// `SigningError::EncodingFailure` if the schema is not a single entry
    /// named `primary_type`.
    pub fn prepare_for_signing(&mut self) -> SigningResult<()> {
        self.types.remove(EIP712_DOMAIN_TYPE);
        match self.types.keys().next() {
            Some(only) if self.types.len() == 1 && *only == self.primary_type => Ok(()),
            _ => Err(SigningError::EncodingFailure(format!(
                "types must hold exactly {}, found {:?}",
                self.primary_type,
                self.types.keys().collect::<Vec<_>>()
            ))),
        }
    }

    /// Digest the wallet signs.
    pub fn signing_hash(&self) -> SigningResult<B256> {
        signing_hash(&self.domain, &self.types, &self.message)
    }
}

/// The single struct type in `types`, as a wallet infers it.
///
/// # Errors
/// `SigningError::EncodingFailure` if `types` does not have exactly one key.
pub fn infer_primary_type(types: &TypeSchema) -> SigningResult<&str> {
    let mut keys = types.keys().filter(|k| k.as_str() != EIP712_DOMAIN_TYPE);
    match (keys.next(), keys.next()) {
        (Some(only), None) => Ok(only.as_str()),
        _ => Err(SigningError::EncodingFailure(format!(
            "cannot infer primary type from {} type entries",
            types.len()
        ))),
    }
}

/// `keccak256(0x19 ‖ 0x01 ‖ domainSeparator ‖ hashStruct(message))`.
///
/// Supports flat structs of `string`, `address`, `bool`, `bytes32` and
/// `uintN` fields, which covers every envelope the exchange uses.
pub fn signing_hash(
    domain: &TypedDataDomain,
    types: &TypeSchema,
    message: &Map<String, Value>,
) -> SigningResult<B256> {
    let primary = infer_primary_type(types)?;
    let fields = &types[primary];
    let struct_hash = hash_struct(primary, fields, message)?;

    let mut data = Vec::with_capacity(66);
    data.extend_from_slice(&[0x19, 0x01]);
    data.extend_from_slice(domain.separator().as_slice());
    data.extend_from_slice(struct_hash.as_slice());
    Ok(keccak256(&data))
}

fn hash_struct(
    primary: &str,
    fields: &[TypedField],
    message: &Map<String, Value>,
) -> SigningResult<B256> {
    if message.len() != fields.len() {
        return Err(SigningError::EncodingFailure(format!(
            "{primary} message has {} keys, schema has {} fields",
            message.len(),
            fields.len()
        )));
    }

    let encoded_type = format!(
        "{primary}({})",
        fields
            .iter()
            .map(|f| format!("{} {}", f.type_name, f.name))
            .collect::<Vec<_>>()
            .join(",")
    );

    let mut data = Vec::with_capacity(32 * (fields.len() + 1));
    data.extend_from_slice(keccak256(encoded_type.as_bytes()).as_slice());
    for field in fields {
        let value = message.get(&field.name).ok_or_else(|| {
            SigningError::EncodingFailure(format!("{primary} message is missing {}", field.name))
        })?;
        data.extend_from_slice(encode_value(field, value)?.as_slice());
    }
    Ok(keccak256(&data))
}

fn encode_value(field: &TypedField, value: &Value) -> SigningResult<B256> {
    let invalid = || {
        SigningError::EncodingFailure(format!(
            "{} is not a valid {}: {value}",
            field.name, field.type_name
        ))
    };

    match field.type_name.as_str() {
        "string" => value
            .as_str()
            .map(|s| keccak256(s.as_bytes()))
            .ok_or_else(invalid),
        "bytes32" => value
            .as_str()
            .and_then(|s| B256::from_str(s).ok())
            .ok_or_else(invalid),
        "address" => value
            .as_str()
            .and_then(|s| Address::from_str(s).ok())
            .map(|a| a.into_word())
            .ok_or_else(invalid),
        "bool" => value
            .as_bool()
            .map(|b| B256::from(U256::from(u8::from(b)).to_be_bytes::<32>()))
            .ok_or_else(invalid),
        t if t.starts_with("uint") => {
            let n = match value {
                Value::Number(n) => n.as_u64().map(U256::from),
                Value::String(s) => U256::from_str(s).ok(),
                _ => None,
            }
            .ok_or_else(invalid)?;
            Ok(B256::from(n.to_be_bytes::<32>()))
        }
        other => Err(SigningError::EncodingFailure(format!(
            "unsupported EIP-712 field type {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::sol;
    use alloy::sol_types::{eip712_domain, SolStruct};

    sol! {
        struct Agent {
            string source;
            bytes32 connectionId;
        }

        struct AgentApproval {
            string hyperliquidChain;
            address agentAddress;
            string agentName;
            uint64 nonce;
        }
    }

    fn connection_id() -> B256 {
        B256::from_str("0xf01fa6eaca0b8cbd2afe65f8852a2e00d35eae3d19560ece9b8a28614646e849")
            .unwrap()
    }

    fn approve(name: Option<&str>) -> Action {
        Action::ApproveAgent(ApproveAgentAction {
            signature_chain_id: "0xa4b1".to_string(),
            hyperliquid_chain: "Mainnet".to_string(),
            agent_address: "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".to_string(),
            agent_name: name.map(str::to_string),
            nonce: 1_700_000_000_000,
        })
    }

    #[test]
    fn test_l1_envelope_shape() {
        let agent = PhantomAgent::new(connection_id(), ChainId::ARBITRUM_ONE.network());
        let envelope = TypedDataEnvelope::l1(&agent, ChainId::ARBITRUM_ONE);

        assert_eq!(envelope.domain.name, "Exchange");
        assert_eq!(envelope.domain.chain_id, 42161);
        assert_eq!(envelope.primary_type, "Agent");
        assert_eq!(envelope.message["source"], "a");
        assert_eq!(
            envelope.message["connectionId"],
            "0xf01fa6eaca0b8cbd2afe65f8852a2e00d35eae3d19560ece9b8a28614646e849"
        );
    }

    #[test]
    fn test_agent_hash_matches_sol_struct() {
        let agent = PhantomAgent::new(connection_id(), Network::Testnet);
        let envelope = TypedDataEnvelope::l1(&agent, ChainId::new(1337));

        let domain = eip712_domain! {
            name: "Exchange",
            version: "1",
            chain_id: 1337u64,
            verifying_contract: Address::ZERO,
        };
        let expected = Agent {
            source: "b".to_string(),
            connectionId: connection_id(),
        }
        .eip712_signing_hash(&domain);

        assert_eq!(envelope.signing_hash().unwrap(), expected);
    }

    #[test]
    fn test_field_encoding_matches_sol_struct() {
        // Same fields as ApproveAgent under a plain type name, so alloy's
        // derived encoding can be compared directly.
        let envelope = TypedDataEnvelope::user_signed(&approve(Some("bot")), ChainId::ARBITRUM_ONE)
            .unwrap();
        let mut types = TypeSchema::new();
        types.insert(
            "AgentApproval".to_string(),
            envelope.types[APPROVE_AGENT_TYPE].clone(),
        );

        let domain = eip712_domain! {
            name: "HyperliquidSignTransaction",
            version: "1",
            chain_id: 42161u64,
            verifying_contract: Address::ZERO,
        };
        let expected = AgentApproval {
            hyperliquidChain: "Mainnet".to_string(),
            agentAddress: Address::from_str("0x70997970C51812dc3A010C7d01b50e0d17dc79C8")
                .unwrap(),
            agentName: "bot".to_string(),
            nonce: 1_700_000_000_000,
        }
        .eip712_signing_hash(&domain);

        assert_eq!(
            signing_hash(&envelope.domain, &types, &envelope.message).unwrap(),
            expected
        );
    }

    #[test]
    fn test_approve_agent_type_string() {
        let envelope =
            TypedDataEnvelope::user_signed(&approve(None), ChainId::ARBITRUM_ONE).unwrap();
        let fields = &envelope.types[APPROVE_AGENT_TYPE];
        let encoded = format!(
            "{APPROVE_AGENT_TYPE}({})",
            fields
                .iter()
                .map(|f| format!("{} {}", f.type_name, f.name))
                .collect::<Vec<_>>()
                .join(",")
        );
        assert_eq!(
            encoded,
            "HyperliquidTransaction:ApproveAgent(string hyperliquidChain,address agentAddress,string agentName,uint64 nonce)"
        );
        assert_eq!(envelope.message["agentName"], "");
    }

    #[test]
    fn test_withdraw_message_excludes_wire_metadata() {
        let action = Action::Withdraw(WithdrawAction {
            signature_chain_id: "0x66eee".to_string(),
            hyperliquid_chain: "Testnet".to_string(),
            destination: "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".to_string(),
            amount: "12.5".to_string(),
            time: 1_700_000_000_000,
        });
        let envelope = TypedDataEnvelope::user_signed(&action, ChainId::ARBITRUM_SEPOLIA).unwrap();

        assert_eq!(envelope.domain.name, "HyperliquidSignTransaction");
        assert_eq!(envelope.domain.chain_id, 421614);
        assert_eq!(envelope.primary_type, WITHDRAW_TYPE);
        assert!(!envelope.message.contains_key("type"));
        assert!(!envelope.message.contains_key("signatureChainId"));
        assert_eq!(
            envelope.message.keys().collect::<Vec<_>>(),
            vec!["hyperliquidChain", "destination", "amount", "time"]
        );
        assert!(envelope.signing_hash().is_ok());
    }

    #[test]
    fn test_l1_actions_rejected_as_user_signed() {
        let action = Action::ScheduleCancel(crate::action::ScheduleCancelAction { time: None });
        assert!(matches!(
            TypedDataEnvelope::user_signed(&action, ChainId::ARBITRUM_ONE),
            Err(SigningError::EncodingFailure(_))
        ));
    }

    #[test]
    fn test_stale_chain_id_overwritten() {
        let agent = PhantomAgent::new(connection_id(), Network::Mainnet);
        let mut envelope = TypedDataEnvelope::l1(&agent, ChainId::ETHEREUM);

        assert_eq!(
            envelope.reconcile_chain_id(ChainId::ARBITRUM_ONE),
            Some(ChainId::ETHEREUM)
        );
        assert_eq!(envelope.domain.chain_id, 42161);
        assert_eq!(envelope.reconcile_chain_id(ChainId::ARBITRUM_ONE), None);
    }

    #[test]
    fn test_domain_type_stripped_before_signing() {
        let mut envelope =
            TypedDataEnvelope::user_signed(&approve(None), ChainId::ARBITRUM_ONE).unwrap();
        let before = envelope.signing_hash().unwrap();

        envelope.types.insert(
            EIP712_DOMAIN_TYPE.to_string(),
            vec![TypedField::new("name", "string")],
        );
        envelope.prepare_for_signing().unwrap();

        assert_eq!(envelope.types.len(), 1);
        assert_eq!(envelope.signing_hash().unwrap(), before);
    }

    #[test]
    fn test_extra_type_is_rejected() {
        let mut envelope =
            TypedDataEnvelope::user_signed(&approve(None), ChainId::ARBITRUM_ONE).unwrap();
        envelope
            .types
            .insert("Other".to_string(), vec![TypedField::new("x", "string")]);

        assert!(envelope.prepare_for_signing().is_err());
        assert!(infer_primary_type(&envelope.types).is_err());
    }

    #[test]
    fn test_message_must_match_schema() {
        let agent = PhantomAgent::new(connection_id(), Network::Mainnet);
        let mut envelope = TypedDataEnvelope::l1(&agent, ChainId::ETHEREUM);
        envelope.message.remove("source");
        envelope
            .message
            .insert("sauce".to_string(), Value::from("a"));

        assert!(matches!(
            envelope.signing_hash(),
            Err(SigningError::EncodingFailure(ref m)) if m.contains("source")
        ));
    }

    #[test]
    fn test_envelope_json() {
        let agent = PhantomAgent::new(connection_id(), Network::Mainnet);
        let json = serde_json::to_value(TypedDataEnvelope::l1(&agent, ChainId::ARBITRUM_ONE))
            .unwrap();

        assert_eq!(json["primaryType"], "Agent");
        assert_eq!(
            json["domain"]["verifyingContract"],
            "0x0000000000000000000000000000000000000000"
        );
        assert_eq!(json["domain"]["chainId"], 42161);
        assert_eq!(json["types"].as_object().unwrap().len(), 1);
        assert_eq!(json["types"]["Agent"][1]["type"], "bytes32");
    }
}

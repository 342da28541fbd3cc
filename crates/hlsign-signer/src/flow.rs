//! Signing flow orchestration.
//!
//! Each call runs one submission through
//! `Idle -> Building -> Hashing (L1 only) -> ConstructingEnvelope ->
//! AwaitingSignature -> AssemblingPayload -> Done`, emitting a
//! `StageEntered` event per step. A failure emits `FlowFailed` with the
//! stage it happened in and ends the flow; nothing is retried and no
//! payload is produced. The caller restarts with a fresh nonce.
//!
//! The only suspension points are asset resolution and the wallet prompt.
//! The signer holds no per-call state, so concurrent calls are safe as long
//! as each gets its own nonce.

use std::collections::HashMap;
use std::sync::Arc;

use alloy::primitives::Address;
use hlsign_core::{
    ActionKind, ChainId, DynEventSink, EventSink, ExpiresAfter, FlowStage, Network, Nonce,
    SigningEvent, TracingEventSink,
};
use hlsign_registry::{DynAssetResolver, OpenOrder, OpenOrderSource};
use tracing::info;

use crate::action::{Action, CancelWire};
use crate::adapter::sign_envelope;
use crate::builders::{self, BuilderFee, CancelRequest, OrderRequest};
use crate::encoder::SigningInput;
use crate::error::{SigningError, SigningResult};
use crate::hasher;
use crate::payload::SignedPayload;
use crate::signature::Signature;
use crate::typed_data::{PhantomAgent, TypedDataEnvelope};
use crate::wallet::DynTypedDataSigner;

/// Per-call signing parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningContext {
    /// Chain id the wallet is on right now.
    pub chain_id: ChainId,
    /// Chain id the caller believes is active. May be stale.
    pub declared_chain_id: Option<ChainId>,
    pub nonce: Nonce,
    pub vault_address: Option<Address>,
    pub expires_after: Option<ExpiresAfter>,
}

impl SigningContext {
    pub fn new(chain_id: ChainId, nonce: Nonce) -> Self {
        Self {
            chain_id,
            declared_chain_id: None,
            nonce,
            vault_address: None,
            expires_after: None,
        }
    }

    pub fn with_declared_chain_id(mut self, declared: ChainId) -> Self {
        self.declared_chain_id = Some(declared);
        self
    }

    pub fn with_vault(mut self, vault: Address) -> Self {
        self.vault_address = Some(vault);
        self
    }

    pub fn with_expires_after(mut self, expires_after: ExpiresAfter) -> Self {
        self.expires_after = Some(expires_after);
        self
    }

    pub fn network(&self) -> Network {
        self.chain_id.network()
    }

    fn envelope_chain_id(&self) -> ChainId {
        self.declared_chain_id.unwrap_or(self.chain_id)
    }
}

/// Tracks the current stage of one flow and reports transitions.
struct FlowTracker<'a> {
    kind: ActionKind,
    stage: FlowStage,
    events: &'a dyn EventSink,
}

impl<'a> FlowTracker<'a> {
    fn start(kind: ActionKind, events: &'a dyn EventSink) -> Self {
        Self {
            kind,
            stage: FlowStage::Idle,
            events,
        }
    }

    fn enter(&mut self, stage: FlowStage) {
        self.stage = stage;
        self.events.emit(SigningEvent::StageEntered {
            kind: self.kind,
            stage,
        });
    }

    fn emit(&self, event: SigningEvent) {
        self.events.emit(event);
    }

    fn fail(&mut self, err: SigningError) -> SigningError {
        self.emit(SigningEvent::FlowFailed {
            kind: self.kind,
            stage: self.stage,
            reason: err.to_string(),
        });
        self.enter(FlowStage::Failed);
        err
    }
}

/// Signs exchange actions with an injected resolver, wallet and event sink.
pub struct ExchangeSigner {
    resolver: DynAssetResolver,
    wallet: DynTypedDataSigner,
    events: DynEventSink,
}

impl ExchangeSigner {
    pub fn new(resolver: DynAssetResolver, wallet: DynTypedDataSigner) -> Self {
        Self {
            resolver,
            wallet,
            events: Arc::new(TracingEventSink),
        }
    }

    pub fn with_event_sink(mut self, events: DynEventSink) -> Self {
        self.events = events;
        self
    }

    /// Place one or more orders in a single `order` action.
    pub async fn place_order(
        &self,
        ctx: &SigningContext,
        orders: &[OrderRequest],
        builder: Option<&BuilderFee>,
    ) -> SigningResult<SignedPayload> {
        let mut flow = FlowTracker::start(ActionKind::Order, self.events.as_ref());
        flow.enter(FlowStage::Building);

        let mut wires = Vec::with_capacity(orders.len());
        for request in orders {
            let asset = self.resolve(&mut flow, &request.coin).await?;
            wires.push(builders::order_wire(request, asset).map_err(|e| flow.fail(e))?);
        }
        let action = builders::order_action(wires, builder).map_err(|e| flow.fail(e))?;

        self.sign_l1(flow, ctx, action).await
    }

    /// Cancel one order by exchange id (`cancel`) or client id (`cancelByCloid`).
    pub async fn cancel(
        &self,
        ctx: &SigningContext,
        request: &CancelRequest,
    ) -> SigningResult<SignedPayload> {
        let mut flow = FlowTracker::start(ActionKind::Cancel, self.events.as_ref());
        flow.enter(FlowStage::Building);

        let target = request.target().map_err(|e| flow.fail(e))?;
        let asset = self.resolve(&mut flow, &request.coin).await?;
        let action = builders::cancel_action(asset, &target);

        self.sign_l1(flow, ctx, action).await
    }

    /// Cancel every order in `open_orders`, optionally only those on `coin`.
    ///
    /// Produces a single `cancel` action with one `{a, o}` entry per order.
    pub async fn cancel_all(
        &self,
        ctx: &SigningContext,
        open_orders: &[OpenOrder],
        coin: Option<&str>,
    ) -> SigningResult<SignedPayload> {
        let mut flow = FlowTracker::start(ActionKind::CancelAll, self.events.as_ref());
        flow.enter(FlowStage::Building);
        self.cancel_orders(flow, ctx, open_orders, coin).await
    }

    /// Like `cancel_all`, but fetches `user`'s resting orders from `source`
    /// first. A failed fetch fails the flow as a resolution failure.
    pub async fn cancel_all_open(
        &self,
        ctx: &SigningContext,
        source: &dyn OpenOrderSource,
        user: Address,
        coin: Option<&str>,
    ) -> SigningResult<SignedPayload> {
        let mut flow = FlowTracker::start(ActionKind::CancelAll, self.events.as_ref());
        flow.enter(FlowStage::Building);

        let user = format!("0x{}", hex::encode(user.as_slice()));
        let open_orders = match source.open_orders(&user).await {
            Ok(orders) => orders,
            Err(e) => return Err(flow.fail(e.into())),
        };
        self.cancel_orders(flow, ctx, &open_orders, coin).await
    }

    async fn cancel_orders(
        &self,
        mut flow: FlowTracker<'_>,
        ctx: &SigningContext,
        open_orders: &[OpenOrder],
        coin: Option<&str>,
    ) -> SigningResult<SignedPayload> {
        let mut assets: HashMap<&str, u32> = HashMap::new();
        let mut cancels = Vec::new();
        for order in open_orders
            .iter()
            .filter(|o| coin.map_or(true, |c| o.coin == c))
        {
            let asset = match assets.get(order.coin.as_str()) {
                Some(asset) => *asset,
                None => {
                    let asset = self.resolve(&mut flow, &order.coin).await?;
                    assets.insert(order.coin.as_str(), asset);
                    asset
                }
            };
            cancels.push(CancelWire {
                asset,
                oid: order.oid,
            });
        }
        let action = builders::cancel_all_action(cancels).map_err(|e| flow.fail(e))?;

        self.sign_l1(flow, ctx, action).await
    }

    /// Arm (or with `None`, disarm) the dead-man switch.
    pub async fn schedule_cancel(
        &self,
        ctx: &SigningContext,
        time: Option<u64>,
    ) -> SigningResult<SignedPayload> {
        let mut flow = FlowTracker::start(ActionKind::ScheduleCancel, self.events.as_ref());
        flow.enter(FlowStage::Building);
        let action = builders::schedule_cancel_action(time);
        self.sign_l1(flow, ctx, action).await
    }

    /// Approve an agent key. The context nonce doubles as the action nonce.
    pub async fn approve_agent(
        &self,
        ctx: &SigningContext,
        agent_address: Address,
        agent_name: Option<&str>,
    ) -> SigningResult<SignedPayload> {
        let mut flow = FlowTracker::start(ActionKind::ApproveAgent, self.events.as_ref());
        flow.enter(FlowStage::Building);
        let action =
            builders::approve_agent_action(ctx.network(), agent_address, agent_name, ctx.nonce);
        self.sign_user(flow, ctx, action).await
    }

    /// Withdraw `amount` to `destination`. The context nonce is the `time` field.
    pub async fn withdraw(
        &self,
        ctx: &SigningContext,
        destination: Address,
        amount: &str,
    ) -> SigningResult<SignedPayload> {
        let mut flow = FlowTracker::start(ActionKind::Withdraw, self.events.as_ref());
        flow.enter(FlowStage::Building);
        let action = builders::withdraw_action(ctx.network(), destination, amount, ctx.nonce)
            .map_err(|e| flow.fail(e))?;
        self.sign_user(flow, ctx, action).await
    }

    /// A miss fails the flow before anything is hashed.
    async fn resolve(&self, flow: &mut FlowTracker<'_>, coin: &str) -> SigningResult<u32> {
        match self.resolver.resolve(coin).await {
            Ok(asset) => {
                flow.emit(SigningEvent::AssetResolved {
                    coin: coin.to_string(),
                    asset,
                });
                Ok(asset)
            }
            Err(e) => Err(flow.fail(e.into())),
        }
    }

    async fn sign_l1(
        &self,
        mut flow: FlowTracker<'_>,
        ctx: &SigningContext,
        action: Action,
    ) -> SigningResult<SignedPayload> {
        flow.enter(FlowStage::Hashing);
        let input = SigningInput::new(action, ctx.nonce)
            .with_vault(ctx.vault_address)
            .with_expires_after(ctx.expires_after);
        let connection_id = input.action_hash().map_err(|e| flow.fail(e))?;
        flow.emit(SigningEvent::ConnectionIdComputed {
            kind: flow.kind,
            connection_id: hasher::to_hex(&connection_id),
        });

        flow.enter(FlowStage::ConstructingEnvelope);
        let agent = PhantomAgent::new(connection_id, ctx.network());
        let envelope = TypedDataEnvelope::l1(&agent, ctx.envelope_chain_id());

        let signature = self.request_signature(&mut flow, ctx, envelope).await?;

        flow.enter(FlowStage::AssemblingPayload);
        let payload = SignedPayload::new(input.action, ctx.nonce, signature)
            .with_vault(ctx.vault_address)
            .with_expires_after(ctx.expires_after);
        Ok(self.complete(flow, payload))
    }

    async fn sign_user(
        &self,
        mut flow: FlowTracker<'_>,
        ctx: &SigningContext,
        action: Action,
    ) -> SigningResult<SignedPayload> {
        if ctx.vault_address.is_some() || ctx.expires_after.is_some() {
            return Err(flow.fail(SigningError::InvalidInput(
                "vault/expiry not supported for user-signed actions".to_string(),
            )));
        }

        flow.enter(FlowStage::ConstructingEnvelope);
        let envelope = TypedDataEnvelope::user_signed(&action, ctx.envelope_chain_id())
            .map_err(|e| flow.fail(e))?;

        let signature = self.request_signature(&mut flow, ctx, envelope).await?;

        flow.enter(FlowStage::AssemblingPayload);
        let payload = SignedPayload::new(action, ctx.nonce, signature);
        Ok(self.complete(flow, payload))
    }

    async fn request_signature(
        &self,
        flow: &mut FlowTracker<'_>,
        ctx: &SigningContext,
        mut envelope: TypedDataEnvelope,
    ) -> SigningResult<Signature> {
        if let Some(declared) = envelope.reconcile_chain_id(ctx.chain_id) {
            flow.emit(SigningEvent::ChainIdOverridden {
                declared,
                live: ctx.chain_id,
            });
        }

        flow.enter(FlowStage::AwaitingSignature);
        let signature = sign_envelope(self.wallet.as_ref(), &envelope)
            .await
            .map_err(|e| flow.fail(e))?;
        flow.emit(SigningEvent::SignatureObtained { kind: flow.kind });
        Ok(signature)
    }

    fn complete(&self, mut flow: FlowTracker<'_>, payload: SignedPayload) -> SignedPayload {
        flow.emit(SigningEvent::PayloadAssembled {
            kind: flow.kind,
            nonce: payload.nonce,
        });
        flow.enter(FlowStage::Done);
        info!(kind = %flow.kind, action = payload.action.type_name(), "action signed");
        payload
    }
}

//! Structured signing events.
//!
//! The signing flow reports progress through an injected `EventSink` rather
//! than writing to the console, so callers pick the destination (tracing,
//! metrics, an in-memory recorder in tests).
//!
//! Never put signatures or key material in an event.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::network::ChainId;

/// Exchange action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Order,
    Cancel,
    CancelAll,
    ScheduleCancel,
    ApproveAgent,
    Withdraw,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::Cancel => "cancel",
            Self::CancelAll => "cancel_all",
            Self::ScheduleCancel => "schedule_cancel",
            Self::ApproveAgent => "approve_agent",
            Self::Withdraw => "withdraw",
        }
    }

    /// L1 actions are hashed and signed through the phantom agent; the rest
    /// are user-signed typed data.
    pub fn is_l1(&self) -> bool {
        !matches!(self, Self::ApproveAgent | Self::Withdraw)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-submission state machine.
///
/// `Idle -> Building -> Hashing (L1 only) -> ConstructingEnvelope ->
/// AwaitingSignature -> AssemblingPayload -> Done`. Any step may move to
/// `Failed`, which is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowStage {
    Idle,
    Building,
    Hashing,
    ConstructingEnvelope,
    AwaitingSignature,
    AssemblingPayload,
    Done,
    Failed,
}

impl FlowStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Building => "building",
            Self::Hashing => "hashing",
            Self::ConstructingEnvelope => "constructing_envelope",
            Self::AwaitingSignature => "awaiting_signature",
            Self::AssemblingPayload => "assembling_payload",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for FlowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event emitted by the signing flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningEvent {
    StageEntered {
        kind: ActionKind,
        stage: FlowStage,
    },
    AssetResolved {
        coin: String,
        asset: u32,
    },
    /// Hex of the 32-byte action hash (public, derived from the action).
    ConnectionIdComputed {
        kind: ActionKind,
        connection_id: String,
    },
    /// The caller's declared chain id was stale and got replaced.
    ChainIdOverridden {
        declared: ChainId,
        live: ChainId,
    },
    SignatureObtained {
        kind: ActionKind,
    },
    PayloadAssembled {
        kind: ActionKind,
        nonce: u64,
    },
    FlowFailed {
        kind: ActionKind,
        stage: FlowStage,
        reason: String,
    },
}

/// Destination for signing events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: SigningEvent);
}

/// Arc wrapper for EventSink trait objects.
pub type DynEventSink = Arc<dyn EventSink>;

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: SigningEvent) {
        match event {
            SigningEvent::StageEntered { kind, stage } => {
                debug!(%kind, %stage, "signing stage entered");
            }
            SigningEvent::AssetResolved { coin, asset } => {
                debug!(%coin, asset, "asset index resolved");
            }
            SigningEvent::ConnectionIdComputed {
                kind,
                connection_id,
            } => {
                debug!(%kind, %connection_id, "action hash computed");
            }
            SigningEvent::ChainIdOverridden { declared, live } => {
                warn!(%declared, %live, "declared chain id is stale, using live wallet chain id");
            }
            SigningEvent::SignatureObtained { kind } => {
                info!(%kind, "wallet signature obtained");
            }
            SigningEvent::PayloadAssembled { kind, nonce } => {
                info!(%kind, nonce, "signed payload assembled");
            }
            SigningEvent::FlowFailed {
                kind,
                stage,
                reason,
            } => {
                warn!(%kind, %stage, %reason, "signing flow failed");
            }
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<SigningEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events.
    pub fn events(&self) -> Vec<SigningEvent> {
        self.events.lock().clone()
    }

    /// Stages entered, in order.
    pub fn stages(&self) -> Vec<FlowStage> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                SigningEvent::StageEntered { stage, .. } => Some(*stage),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: SigningEvent) {
        self.events.lock().push(event);
    }
}

//! Prometheus metrics for signing flows.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. A registration failure
//! means duplicate metric names, a startup configuration error. These panics
//! only occur during static initialization, never at runtime.

use hlsign_core::{ActionKind, DynEventSink, EventSink, FlowStage, SigningEvent};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_int_counter, CounterVec, Encoder, IntCounter, TextEncoder,
};

use crate::error::{TelemetryError, TelemetryResult};

/// Completed signing flows.
/// Labels: kind, outcome (signed/failed)
pub static SIGNATURES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "hlsign_signatures_total",
        "Signing flows by action kind and outcome",
        &["kind", "outcome"]
    )
    .unwrap()
});

/// Failed flows by the stage they failed in.
pub static FLOW_FAILURES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "hlsign_flow_failures_total",
        "Signing flow failures by action kind and stage",
        &["kind", "stage"]
    )
    .unwrap()
});

/// Stale declared chain ids replaced by the live wallet chain id.
pub static CHAIN_ID_OVERRIDES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "hlsign_chain_id_overrides_total",
        "Declared chain ids overwritten with the live wallet chain id"
    )
    .unwrap()
});

/// Metrics helper functions.
pub struct Metrics;

impl Metrics {
    pub fn flow_signed(kind: ActionKind) {
        SIGNATURES_TOTAL
            .with_label_values(&[kind.as_str(), "signed"])
            .inc();
    }

    pub fn flow_failed(kind: ActionKind, stage: FlowStage) {
        SIGNATURES_TOTAL
            .with_label_values(&[kind.as_str(), "failed"])
            .inc();
        FLOW_FAILURES_TOTAL
            .with_label_values(&[kind.as_str(), stage.as_str()])
            .inc();
    }

    pub fn chain_id_overridden() {
        CHAIN_ID_OVERRIDES_TOTAL.inc();
    }

    /// Text exposition of every registered metric.
    pub fn render() -> TelemetryResult<String> {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&prometheus::gather(), &mut buf)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}

/// Counts flow outcomes, then forwards every event to `inner`.
pub struct MetricsEventSink {
    inner: DynEventSink,
}

impl MetricsEventSink {
    pub fn new(inner: DynEventSink) -> Self {
        Self { inner }
    }
}

impl EventSink for MetricsEventSink {
    fn emit(&self, event: SigningEvent) {
        match &event {
            SigningEvent::PayloadAssembled { kind, .. } => Metrics::flow_signed(*kind),
            SigningEvent::FlowFailed { kind, stage, .. } => Metrics::flow_failed(*kind, *stage),
            SigningEvent::ChainIdOverridden { .. } => Metrics::chain_id_overridden(),
            _ => {}
        }
        self.inner.emit(event);
    }
}

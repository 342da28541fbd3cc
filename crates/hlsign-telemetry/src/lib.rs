//! Prometheus metrics and structured logging for hlsign.
//!
//! - `init_logging`: tracing subscriber (JSON in production, pretty otherwise)
//! - `MetricsEventSink`: signing-event sink that feeds Prometheus counters

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::{Metrics, MetricsEventSink};

//! Telemetry helpers for line-echo services: subscriber installation with
//! optional OTLP span export, plus the webhook-level metric counters.

mod config;
mod metrics;
mod tracing_init;

pub use self::metrics::{
    EVENTS_RECEIVED_COUNTER, WEBHOOK_REJECTED_COUNTER, record_events_received,
    record_webhook_rejected, with_webhook_fields,
};
pub use config::{TelemetryConfig, TelemetryProtocol};
pub use tracing_init::{init_telemetry, shutdown_telemetry, telemetry_enabled};

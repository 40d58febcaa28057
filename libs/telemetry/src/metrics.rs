use metrics::counter;
use tracing::Span;

pub const EVENTS_RECEIVED_COUNTER: &str = "line_events_received_total";
pub const WEBHOOK_REJECTED_COUNTER: &str = "line_webhook_rejected_total";

/// Counts events of an accepted webhook batch.
pub fn record_events_received(count: usize) {
    counter!(EVENTS_RECEIVED_COUNTER).increment(count as u64);
}

/// Counts a webhook request that failed verification or decoding.
pub fn record_webhook_rejected(reason: &'static str) {
    counter!(WEBHOOK_REJECTED_COUNTER, "reason" => reason).increment(1);
}

/// Fills the request-level fields declared on a webhook span.
pub fn with_webhook_fields(span: &Span, destination: Option<&str>, events: usize) {
    if let Some(destination) = destination {
        span.record("destination", tracing::field::display(destination));
    }
    span.record("events", events as u64);
}

//! Webhook endpoint.
//!
//! ```text
//! POST /  (x-line-signature, JSON body)
//!   400 {"error": "<parse error>"}   verification or decoding failed
//!   200 {"error": ""}                batch accepted; per-event failures are only logged
//! ```

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware,
    routing::post,
};
use line_echo_client::{LineClient, SIGNATURE_HEADER};
use line_echo_core::{Dispatcher, ReplySender};
use line_echo_telemetry::{record_events_received, record_webhook_rejected, with_webhook_fields};
use serde::Serialize;
use tracing::{Instrument, field, info, info_span, warn};

use crate::reqid::{RequestId, with_request_id};

#[derive(Clone)]
pub struct AppState {
    client: Arc<LineClient>,
    dispatcher: Dispatcher,
}

impl AppState {
    /// Replies go out through `client` itself.
    pub fn new(client: Arc<LineClient>) -> Self {
        let dispatcher = Dispatcher::new(client.clone());
        Self { client, dispatcher }
    }

    /// Verifies with `client` but replies through `sender`.
    pub fn with_sender(client: Arc<LineClient>, sender: Arc<dyn ReplySender>) -> Self {
        Self {
            client,
            dispatcher: Dispatcher::new(sender),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub error: String,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(handle_webhook))
        .layer(middleware::from_fn(with_request_id))
        .with_state(state)
}

async fn handle_webhook(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<WebhookResponse>) {
    let rid = request_id
        .map(|Extension(RequestId(id))| id)
        .unwrap_or_else(|| "n/a".to_string());
    let span = info_span!(
        "webhook",
        request_id = %rid,
        destination = field::Empty,
        events = field::Empty
    );

    async move {
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|value| value.to_str().ok());
        let payload = match state.client.parse_request(signature, &body) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(reason = err.reason(), error = %err, "webhook rejected");
                record_webhook_rejected(err.reason());
                return (
                    StatusCode::BAD_REQUEST,
                    Json(WebhookResponse {
                        error: err.to_string(),
                    }),
                );
            }
        };

        with_webhook_fields(
            &tracing::Span::current(),
            payload.destination.as_deref(),
            payload.events.len(),
        );
        record_events_received(payload.events.len());

        let outcomes = state.dispatcher.dispatch(&payload.events).await;
        let replied = outcomes.iter().filter(|o| o.is_replied()).count();
        info!(
            replied,
            failed = outcomes.len() - replied,
            "webhook batch handled"
        );

        (
            StatusCode::OK,
            Json(WebhookResponse {
                error: String::new(),
            }),
        )
    }
    .instrument(span)
    .await
}

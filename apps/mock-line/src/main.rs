use anyhow::Result;
use axum::{Json, Router, http::StatusCode, routing::post};
use line_echo_telemetry::{TelemetryConfig, init_telemetry};
use serde_json::{Value, json};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    init_telemetry(TelemetryConfig::from_env(
        "mock-line",
        env!("CARGO_PKG_VERSION"),
    ))?;
    let bind = std::env::var("BIND").unwrap_or_else(|_| "0.0.0.0:9082".into());
    let listener = TcpListener::bind(&bind).await?;
    tracing::info!("mock-line listening on {}", listener.local_addr()?);
    axum::serve(listener, router())
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;
    Ok(())
}

fn router() -> Router {
    Router::new().route("/v2/bot/message/reply", post(reply))
}

async fn reply(Json(payload): Json<Value>) -> (StatusCode, Json<Value>) {
    let has_token = payload
        .get("replyToken")
        .and_then(Value::as_str)
        .is_some_and(|token| !token.is_empty());
    if !has_token {
        tracing::warn!("LINE REPLY without replyToken: {}", payload);
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "message": "The request body has 1 error(s)",
                "details": [{"message": "must be specified", "property": "replyToken"}]
            })),
        );
    }
    tracing::info!("LINE REPLY: {}", payload);
    (StatusCode::OK, Json(json!({})))
}

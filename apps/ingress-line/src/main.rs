use std::sync::Arc;

use anyhow::Result;
use line_echo_client::LineClient;
use line_echo_ingress::{AppState, IngressConfig, build_router};
use line_echo_telemetry::{TelemetryConfig, init_telemetry, shutdown_telemetry};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let telemetry = TelemetryConfig::from_env("line-echo-ingress", env!("CARGO_PKG_VERSION"));
    init_telemetry(telemetry)?;

    let config = IngressConfig::from_env()?;
    let client = match LineClient::new(config.credentials.clone()) {
        Ok(client) => Arc::new(client),
        Err(err) => {
            error!(error = %err, "line client init failed");
            std::process::exit(1);
        }
    };
    info!(
        channel_id = client.channel_id().unwrap_or("unset"),
        reply_url = %client.reply_url(),
        "line client ready"
    );

    let app = build_router(AppState::new(client));
    let listener = TcpListener::bind(config.addr).await?;
    info!("line-echo ingress listening on {}", config.addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    shutdown_telemetry();
    Ok(())
}

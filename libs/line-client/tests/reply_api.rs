use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use line_echo_client::{ChannelCredentials, LineClient};
use line_echo_core::{ReplyError, ReplySender};
use serde_json::{Value, json};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct Captured {
    requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

async fn accept(
    State(captured): State<Captured>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    captured.requests.lock().unwrap().push((auth, body));
    Json(json!({}))
}

async fn reject() -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "message": "Invalid reply token" })),
    )
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client_for(addr: SocketAddr) -> LineClient {
    let creds = ChannelCredentials::new("secret", "access-token")
        .with_api_base(format!("http://{addr}"));
    LineClient::new(creds).unwrap()
}

#[tokio::test]
async fn reply_posts_single_text_message() {
    let captured = Captured::default();
    let app = Router::new()
        .route("/v2/bot/message/reply", post(accept))
        .with_state(captured.clone());
    let client = client_for(serve(app).await);

    client.reply_text("reply-token", "Reply: hi").await.unwrap();

    let requests = captured.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    let (auth, body) = &requests[0];
    assert_eq!(auth.as_deref(), Some("Bearer access-token"));
    assert_eq!(
        body,
        &json!({
            "replyToken": "reply-token",
            "messages": [{ "type": "text", "text": "Reply: hi" }]
        })
    );
}

#[tokio::test]
async fn api_error_becomes_rejected() {
    let app = Router::new().route("/v2/bot/message/reply", post(reject));
    let client = client_for(serve(app).await);

    let err = client.reply_text("stale", "Reply: hi").await.unwrap_err();
    match err {
        ReplyError::Rejected { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid reply token");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_api_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client_for(addr)
        .reply_text("tok", "Reply: hi")
        .await
        .unwrap_err();
    assert!(matches!(err, ReplyError::Transport(_)));
}

#[tokio::test]
async fn empty_token_makes_no_request() {
    let captured = Captured::default();
    let app = Router::new()
        .route("/v2/bot/message/reply", post(accept))
        .with_state(captured.clone());
    let client = client_for(serve(app).await);

    let err = client.reply_text("", "Reply: hi").await.unwrap_err();
    assert!(matches!(err, ReplyError::MissingReplyToken));
    assert!(captured.requests.lock().unwrap().is_empty());
}

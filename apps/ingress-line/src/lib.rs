//! LINE webhook ingress for line-echo: verifies callbacks on `POST /` and
//! answers every supported message event with a text reply.
pub mod config;
pub mod http;
pub mod reqid;

pub use config::IngressConfig;
pub use http::{AppState, WebhookResponse, build_router};
pub use reqid::{REQUEST_ID_HEADER, RequestId, with_request_id};

//! Thin LINE Messaging API layer for line-echo.
//!
//! - [`signature`]: `x-line-signature` HMAC checks
//! - [`webhook`]: decoding a webhook body into `line_echo_core` events
//! - [`LineClient`]: credentials, request parsing and the reply call
pub mod client;
pub mod signature;
pub mod webhook;

pub use client::{ChannelCredentials, ClientError, DEFAULT_API_BASE, LineClient};
pub use signature::SIGNATURE_HEADER;
pub use webhook::{ParseError, WebhookPayload};

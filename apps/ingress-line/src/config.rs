//! Process configuration, read once at startup.

use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use line_echo_client::{ChannelCredentials, DEFAULT_API_BASE};

pub const SECRET_KEY: &str = "LINE_SECRET";
pub const ACCESS_KEY: &str = "LINE_ACCESS";
pub const CHANNEL_KEY: &str = "LINE_CHANNEL";
pub const API_BASE_KEY: &str = "LINE_API_BASE";
pub const BIND_KEY: &str = "BIND";
pub const DEFAULT_BIND: &str = "0.0.0.0:5221";

#[derive(Debug, Clone)]
pub struct IngressConfig {
    pub credentials: ChannelCredentials,
    pub addr: SocketAddr,
}

impl IngressConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Missing credentials are left empty here; `LineClient::new` rejects them.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut credentials = ChannelCredentials::new(
            lookup(SECRET_KEY).unwrap_or_default(),
            lookup(ACCESS_KEY).unwrap_or_default(),
        )
        .with_api_base(lookup(API_BASE_KEY).unwrap_or_else(|| DEFAULT_API_BASE.to_string()));
        if let Some(channel) = lookup(CHANNEL_KEY).filter(|id| !id.trim().is_empty()) {
            credentials = credentials.with_channel_id(channel);
        }

        let bind = lookup(BIND_KEY).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let addr: SocketAddr = bind
            .parse()
            .with_context(|| format!("invalid {BIND_KEY} address {bind}"))?;

        Ok(Self { credentials, addr })
    }
}

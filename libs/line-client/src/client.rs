use std::fmt;

use async_trait::async_trait;
use line_echo_core::{ReplyError, ReplySender};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::signature;
use crate::webhook::{self, ParseError, WebhookPayload};

pub const DEFAULT_API_BASE: &str = "https://api.line.me";
const REPLY_PATH: &str = "v2/bot/message/reply";

/// Channel credentials as issued by the LINE developers console.
#[derive(Clone)]
pub struct ChannelCredentials {
    pub channel_secret: String,
    pub channel_token: String,
    pub channel_id: Option<String>,
    pub api_base: String,
}

impl ChannelCredentials {
    pub fn new(channel_secret: impl Into<String>, channel_token: impl Into<String>) -> Self {
        Self {
            channel_secret: channel_secret.into(),
            channel_token: channel_token.into(),
            channel_id: None,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    pub fn with_channel_id(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = Some(channel_id.into());
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

impl fmt::Debug for ChannelCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelCredentials")
            .field("channel_secret", &"<redacted>")
            .field("channel_token", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("missing channel secret")]
    MissingChannelSecret,
    #[error("missing channel access token")]
    MissingChannelToken,
    #[error("invalid api base {base}")]
    InvalidApiBase {
        base: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to build http client")]
    Http(#[source] reqwest::Error),
}

/// Verifies and decodes webhooks for one channel and sends replies on its
/// behalf. Built once at startup and shared read-only.
pub struct LineClient {
    http: reqwest::Client,
    channel_secret: String,
    channel_token: String,
    channel_id: Option<String>,
    reply_url: Url,
}

impl LineClient {
    pub fn new(credentials: ChannelCredentials) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("line-echo/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Http)?;
        Self::with_http(credentials, http)
    }

    pub fn with_http(
        credentials: ChannelCredentials,
        http: reqwest::Client,
    ) -> Result<Self, ClientError> {
        if credentials.channel_secret.trim().is_empty() {
            return Err(ClientError::MissingChannelSecret);
        }
        if credentials.channel_token.trim().is_empty() {
            return Err(ClientError::MissingChannelToken);
        }
        let reply_url = reply_url(&credentials.api_base)?;
        Ok(Self {
            http,
            channel_secret: credentials.channel_secret,
            channel_token: credentials.channel_token,
            channel_id: credentials.channel_id,
            reply_url,
        })
    }

    pub fn channel_id(&self) -> Option<&str> {
        self.channel_id.as_deref()
    }

    pub fn reply_url(&self) -> &Url {
        &self.reply_url
    }

    /// Checks the `x-line-signature` value against `body`, then decodes it.
    pub fn parse_request(
        &self,
        signature: Option<&str>,
        body: &[u8],
    ) -> Result<WebhookPayload, ParseError> {
        let signature = signature.ok_or(ParseError::InvalidSignature)?;
        if !signature::verify(&self.channel_secret, body, signature) {
            return Err(ParseError::InvalidSignature);
        }
        webhook::decode(body)
    }
}

impl fmt::Debug for LineClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineClient")
            .field("channel_id", &self.channel_id)
            .field("reply_url", &self.reply_url.as_str())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ReplySender for LineClient {
    async fn reply_text(&self, reply_token: &str, text: &str) -> Result<(), ReplyError> {
        if reply_token.is_empty() {
            return Err(ReplyError::MissingReplyToken);
        }
        let body = ReplyRequest {
            reply_token,
            messages: [OutboundText { kind: "text", text }],
        };

        let response = self
            .http
            .post(self.reply_url.clone())
            .bearer_auth(&self.channel_token)
            .json(&body)
            .send()
            .await
            .map_err(ReplyError::transport)?;
        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "reply accepted");
            return Ok(());
        }

        let body_text = response.text().await.map_err(ReplyError::transport)?;
        Err(ReplyError::Rejected {
            status: status.as_u16(),
            message: api_error_message(&body_text),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: [OutboundText<'a>; 1],
}

#[derive(Debug, Serialize)]
struct OutboundText<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    #[serde(default)]
    details: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    property: Option<String>,
}

fn reply_url(api_base: &str) -> Result<Url, ClientError> {
    let base = format!("{}/", api_base.trim_end_matches('/'));
    Url::parse(&base)
        .and_then(|url| url.join(REPLY_PATH))
        .map_err(|source| ClientError::InvalidApiBase {
            base: api_base.to_string(),
            source,
        })
}

fn api_error_message(body: &str) -> String {
    let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) else {
        return body.trim().to_string();
    };
    let details: Vec<String> = parsed
        .details
        .iter()
        .filter_map(|detail| match (&detail.property, &detail.message) {
            (Some(property), Some(message)) => Some(format!("{property}: {message}")),
            (None, Some(message)) => Some(message.clone()),
            _ => None,
        })
        .collect();
    if details.is_empty() {
        parsed.message
    } else {
        format!("{} ({})", parsed.message, details.join("; "))
    }
}

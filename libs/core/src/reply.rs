use async_trait::async_trait;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Outbound reply seam. Implementations make a single attempt per call.
#[async_trait]
pub trait ReplySender: Send + Sync {
    async fn reply_text(&self, reply_token: &str, text: &str) -> Result<(), ReplyError>;
}

#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("reply token is missing")]
    MissingReplyToken,
    #[error("reply transport error: {0}")]
    Transport(#[source] BoxError),
    #[error("reply rejected by platform (status {status}): {message}")]
    Rejected { status: u16, message: String },
}

impl ReplyError {
    pub fn transport(err: impl Into<BoxError>) -> Self {
        ReplyError::Transport(err.into())
    }
}

use std::sync::Mutex;

use async_trait::async_trait;

use crate::reply::{ReplyError, ReplySender};

/// In-memory [`ReplySender`] that records every call.
#[derive(Default)]
pub struct RecordingSender {
    calls: Mutex<Vec<(String, String)>>,
    reject: Option<(u16, String)>,
}

impl RecordingSender {
    /// Records calls but answers each one with `ReplyError::Rejected`.
    pub fn failing_with(status: u16, message: impl Into<String>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            reject: Some((status, message.into())),
        }
    }

    /// `(reply_token, text)` pairs in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ReplySender for RecordingSender {
    async fn reply_text(&self, reply_token: &str, text: &str) -> Result<(), ReplyError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((reply_token.to_string(), text.to_string()));
        }
        match &self.reject {
            Some((status, message)) => Err(ReplyError::Rejected {
                status: *status,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

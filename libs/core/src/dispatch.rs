use std::sync::Arc;

use metrics::counter;
use thiserror::Error;
use tracing::{Instrument, debug, error, info_span, warn};

use crate::event::{Event, EventKind, Message, Source};
use crate::reply::{ReplyError, ReplySender};

const REPLIES_SENT_COUNTER: &str = "line_replies_sent_total";
const EVENT_FAILURES_COUNTER: &str = "line_event_failures_total";
const DISPATCH_SPAN_NAME: &str = "dispatch.event";

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unsupported event type: {event_type}")]
    UnsupportedEventType { event_type: String },
    #[error("unsupported message type: {message_type}")]
    UnsupportedMessageType { message_type: String },
    #[error("reply failed: {0}")]
    ReplySend(#[from] ReplyError),
}

impl DispatchError {
    /// Stable label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            DispatchError::UnsupportedEventType { .. } => "unsupported_event_type",
            DispatchError::UnsupportedMessageType { .. } => "unsupported_message_type",
            DispatchError::ReplySend(_) => "reply_send_failed",
        }
    }
}

#[derive(Debug)]
pub enum ReplyOutcome {
    Replied { text: String },
    Failed(DispatchError),
}

impl ReplyOutcome {
    pub fn is_replied(&self) -> bool {
        matches!(self, ReplyOutcome::Replied { .. })
    }

    pub fn error(&self) -> Option<&DispatchError> {
        match self {
            ReplyOutcome::Replied { .. } => None,
            ReplyOutcome::Failed(err) => Some(err),
        }
    }
}

impl From<Result<String, DispatchError>> for ReplyOutcome {
    fn from(result: Result<String, DispatchError>) -> Self {
        match result {
            Ok(text) => ReplyOutcome::Replied { text },
            Err(err) => ReplyOutcome::Failed(err),
        }
    }
}

/// Builds the reply text for a message.
///
/// ```
/// use line_echo_core::{Message, TextMessage, compose_reply};
///
/// let text = compose_reply(&Message::Text(TextMessage::new("hi"))).unwrap();
/// assert_eq!(text, "Reply: hi");
/// ```
pub fn compose_reply(message: &Message) -> Result<String, DispatchError> {
    match message {
        Message::Text(text) => Ok(format!("Reply: {}", text.text)),
        Message::Image(image) => Ok(format!(
            "Reply: {}\nPreview: {}",
            image.original_content_url, image.preview_image_url
        )),
        Message::Unsupported(other) => Err(DispatchError::UnsupportedMessageType {
            message_type: other.to_string(),
        }),
    }
}

/// Maps webhook events to replies through an injected [`ReplySender`].
#[derive(Clone)]
pub struct Dispatcher {
    sender: Arc<dyn ReplySender>,
}

impl Dispatcher {
    pub fn new(sender: Arc<dyn ReplySender>) -> Self {
        Self { sender }
    }

    /// Handles one event and returns the text that was replied.
    pub async fn handle_event(&self, event: &Event) -> Result<String, DispatchError> {
        let message = match &event.kind {
            EventKind::Message(message) => message,
            EventKind::Unsupported { event_type } => {
                return Err(DispatchError::UnsupportedEventType {
                    event_type: event_type.clone(),
                });
            }
        };

        let text = compose_reply(message)?;
        let reply_token = event
            .reply_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or(ReplyError::MissingReplyToken)?;

        self.sender.reply_text(reply_token, &text).await?;
        counter!(REPLIES_SENT_COUNTER, "message_type" => message.message_type().to_string())
            .increment(1);
        Ok(text)
    }

    /// Handles a batch in order. A failing event is logged and skipped.
    pub async fn dispatch(&self, events: &[Event]) -> Vec<ReplyOutcome> {
        let mut outcomes = Vec::with_capacity(events.len());
        for (index, event) in events.iter().enumerate() {
            let message_id = match &event.kind {
                EventKind::Message(message) => message.id(),
                EventKind::Unsupported { .. } => None,
            };
            let span = info_span!(
                DISPATCH_SPAN_NAME,
                index,
                event_type = %event.event_type(),
                webhook_event_id = %event.webhook_event_id.as_deref().unwrap_or_default(),
                message_id = %message_id.unwrap_or_default(),
                user_id = %event.source.as_ref().and_then(Source::user_id).unwrap_or_default(),
                mode = %event.mode.as_deref().unwrap_or_default(),
                redelivery = event.is_redelivery,
                timestamp = event.timestamp
            );
            let result = async {
                let result = self.handle_event(event).await;
                match &result {
                    Ok(text) => debug!(reply = %text, "event replied"),
                    Err(err) => {
                        counter!(EVENT_FAILURES_COUNTER, "reason" => err.reason()).increment(1);
                        match err {
                            DispatchError::ReplySend(_) => {
                                error!(reason = err.reason(), error = %err, "event dispatch failed")
                            }
                            _ => {
                                warn!(reason = err.reason(), error = %err, "event dispatch failed")
                            }
                        }
                    }
                }
                result
            }
            .instrument(span)
            .await;
            outcomes.push(result.into());
        }
        outcomes
    }
}

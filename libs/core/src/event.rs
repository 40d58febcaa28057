//! Webhook event model.
//!
//! Events are decoded once per request by the client crate and handed to the
//! dispatcher read-only. A message event always owns exactly one [`Message`].

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub reply_token: Option<String>,
    /// Milliseconds since the unix epoch, as stamped by the platform.
    pub timestamp: i64,
    pub webhook_event_id: Option<String>,
    pub mode: Option<String>,
    pub source: Option<Source>,
    pub is_redelivery: bool,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            reply_token: None,
            timestamp: 0,
            webhook_event_id: None,
            mode: None,
            source: None,
            is_redelivery: false,
        }
    }

    pub fn message(message: Message, reply_token: impl Into<String>) -> Self {
        Self::new(EventKind::Message(message)).with_reply_token(reply_token)
    }

    pub fn with_reply_token(mut self, reply_token: impl Into<String>) -> Self {
        self.reply_token = Some(reply_token.into());
        self
    }

    /// The wire `type` of the event (`message`, `follow`, `postback`, ...).
    pub fn event_type(&self) -> &str {
        match &self.kind {
            EventKind::Message(_) => "message",
            EventKind::Unsupported { event_type } => event_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Message(Message),
    Unsupported { event_type: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    User {
        user_id: Option<String>,
    },
    Group {
        group_id: String,
        user_id: Option<String>,
    },
    Room {
        room_id: String,
        user_id: Option<String>,
    },
    Unknown {
        source_type: String,
    },
}

impl Source {
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Source::User { user_id }
            | Source::Group { user_id, .. }
            | Source::Room { user_id, .. } => user_id.as_deref(),
            Source::Unknown { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Text(TextMessage),
    Image(ImageMessage),
    Unsupported(UnsupportedMessage),
}

impl Message {
    pub fn message_type(&self) -> &str {
        match self {
            Message::Text(_) => "text",
            Message::Image(_) => "image",
            Message::Unsupported(other) => &other.message_type,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Message::Text(m) => m.id.as_deref(),
            Message::Image(m) => m.id.as_deref(),
            Message::Unsupported(m) => m.id.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMessage {
    pub id: Option<String>,
    pub text: String,
}

impl TextMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMessage {
    pub id: Option<String>,
    pub original_content_url: String,
    pub preview_image_url: String,
}

impl ImageMessage {
    pub fn new(
        original_content_url: impl Into<String>,
        preview_image_url: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            original_content_url: original_content_url.into(),
            preview_image_url: preview_image_url.into(),
        }
    }
}

/// Any message variant the handler does not reply to (video, sticker, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedMessage {
    pub message_type: String,
    pub id: Option<String>,
}

impl fmt::Display for UnsupportedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{} (id {id})", self.message_type),
            None => f.write_str(&self.message_type),
        }
    }
}

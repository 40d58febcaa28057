//! Webhook body decoding.
//!
//! ```text
//! {"destination":"U...","events":[{"type":"message","replyToken":"...",
//!   "message":{"type":"text","id":"...","text":"hi"}, ...}]}
//! ```
//!
//! The wire shapes below are private; callers only see the
//! `line_echo_core` event model.

use line_echo_core::{
    Event, EventKind, ImageMessage, Message, Source, TextMessage, UnsupportedMessage,
};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("malformed webhook body: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("event {index} is a message event without a message")]
    MissingMessage { index: usize },
}

impl ParseError {
    /// Stable label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            ParseError::InvalidSignature => "invalid_signature",
            ParseError::Malformed(_) => "malformed_body",
            ParseError::MissingMessage { .. } => "missing_message",
        }
    }
}

/// A decoded webhook request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookPayload {
    /// User id of the bot that received the events.
    pub destination: Option<String>,
    pub events: Vec<Event>,
}

/// Decodes an already verified body.
pub fn decode(body: &[u8]) -> Result<WebhookPayload, ParseError> {
    let raw: RawPayload = serde_json::from_slice(body).map_err(ParseError::Malformed)?;
    let events = raw
        .events
        .into_iter()
        .enumerate()
        .map(|(index, event)| event.into_event(index))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(WebhookPayload {
        destination: raw.destination,
        events,
    })
}

#[derive(Debug, Deserialize)]
struct RawPayload {
    #[serde(default)]
    destination: Option<String>,
    #[serde(default)]
    events: Vec<RawEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    #[serde(rename = "type", default)]
    event_type: String,
    #[serde(default)]
    reply_token: Option<String>,
    #[serde(default)]
    timestamp: i64,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    webhook_event_id: Option<String>,
    #[serde(default)]
    delivery_context: Option<RawDeliveryContext>,
    #[serde(default)]
    source: Option<RawSource>,
    #[serde(default)]
    message: Option<RawMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDeliveryContext {
    #[serde(default)]
    is_redelivery: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSource {
    #[serde(rename = "type", default)]
    source_type: String,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    group_id: Option<String>,
    #[serde(default)]
    room_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMessage {
    #[serde(rename = "type", default)]
    message_type: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    content_provider: Option<RawContentProvider>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContentProvider {
    #[serde(default)]
    original_content_url: Option<String>,
    #[serde(default)]
    preview_image_url: Option<String>,
}

impl RawEvent {
    fn into_event(self, index: usize) -> Result<Event, ParseError> {
        let kind = if self.event_type == "message" {
            let message = self.message.ok_or(ParseError::MissingMessage { index })?;
            EventKind::Message(message.into_message())
        } else {
            EventKind::Unsupported {
                event_type: self.event_type,
            }
        };
        Ok(Event {
            kind,
            reply_token: self.reply_token,
            timestamp: self.timestamp,
            webhook_event_id: self.webhook_event_id,
            mode: self.mode,
            source: self.source.map(RawSource::into_source),
            is_redelivery: self
                .delivery_context
                .map(|ctx| ctx.is_redelivery)
                .unwrap_or(false),
        })
    }
}

impl RawSource {
    fn into_source(self) -> Source {
        let RawSource {
            source_type,
            user_id,
            group_id,
            room_id,
        } = self;
        match source_type.as_str() {
            "user" => return Source::User { user_id },
            "group" => {
                if let Some(group_id) = group_id {
                    return Source::Group { group_id, user_id };
                }
            }
            "room" => {
                if let Some(room_id) = room_id {
                    return Source::Room { room_id, user_id };
                }
            }
            _ => {}
        }
        Source::Unknown { source_type }
    }
}

impl RawMessage {
    fn into_message(self) -> Message {
        match self.message_type.as_str() {
            "text" => Message::Text(TextMessage {
                id: self.id,
                text: self.text.unwrap_or_default(),
            }),
            "image" => {
                let provider = self.content_provider.unwrap_or_default();
                Message::Image(ImageMessage {
                    id: self.id,
                    original_content_url: provider.original_content_url.unwrap_or_default(),
                    preview_image_url: provider.preview_image_url.unwrap_or_default(),
                })
            }
            _ => Message::Unsupported(UnsupportedMessage {
                message_type: self.message_type,
                id: self.id,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_text_event() {
        let body = br#"{
            "destination": "Ubot",
            "events": [{
                "type": "message",
                "mode": "active",
                "timestamp": 1462629479859,
                "replyToken": "nHuyWiB7yP5Zw52FIkcQobQuGDXCTA",
                "webhookEventId": "01FZ74A0TDDPYRVKNK77XKC3ZR",
                "deliveryContext": {"isRedelivery": true},
                "source": {"type": "user", "userId": "U4af4980629"},
                "message": {"id": "444573844083572737", "type": "text", "text": "Hello"}
            }]
        }"#;

        let payload = decode(body).unwrap();
        assert_eq!(payload.destination.as_deref(), Some("Ubot"));
        let event = &payload.events[0];
        assert_eq!(
            event.kind,
            EventKind::Message(Message::Text(TextMessage {
                id: Some("444573844083572737".into()),
                text: "Hello".into(),
            }))
        );
        assert_eq!(
            event.reply_token.as_deref(),
            Some("nHuyWiB7yP5Zw52FIkcQobQuGDXCTA")
        );
        assert_eq!(event.timestamp, 1462629479859);
        assert!(event.is_redelivery);
        assert_eq!(
            event.source.as_ref().and_then(Source::user_id),
            Some("U4af4980629")
        );
    }

    #[test]
    fn image_urls_come_from_content_provider() {
        let body = br#"{"events": [{
            "type": "message", "replyToken": "r",
            "message": {"id": "1", "type": "image", "contentProvider": {
                "type": "external",
                "originalContentUrl": "http://a",
                "previewImageUrl": "http://b"
            }}
        }]}"#;
        let payload = decode(body).unwrap();
        assert_eq!(
            payload.events[0].kind,
            EventKind::Message(Message::Image(ImageMessage {
                id: Some("1".into()),
                original_content_url: "http://a".into(),
                preview_image_url: "http://b".into(),
            }))
        );
    }

    #[test]
    fn line_hosted_image_has_empty_urls() {
        let body = br#"{"events": [{
            "type": "message", "replyToken": "r",
            "message": {"id": "1", "type": "image", "contentProvider": {"type": "line"}}
        }]}"#;
        let payload = decode(body).unwrap();
        let EventKind::Message(Message::Image(image)) = &payload.events[0].kind else {
            panic!("expected image message");
        };
        assert!(image.original_content_url.is_empty());
        assert!(image.preview_image_url.is_empty());
    }

    #[test]
    fn other_message_types_are_unsupported() {
        let body = br#"{"events": [{
            "type": "message", "replyToken": "r",
            "message": {"id": "9", "type": "sticker", "packageId": "1", "stickerId": "1"}
        }]}"#;
        let payload = decode(body).unwrap();
        assert_eq!(
            payload.events[0].kind,
            EventKind::Message(Message::Unsupported(UnsupportedMessage {
                message_type: "sticker".into(),
                id: Some("9".into()),
            }))
        );
    }

    #[test]
    fn non_message_events_keep_their_type() {
        let body = br#"{"events": [
            {"type": "follow", "replyToken": "r", "source": {"type": "group", "groupId": "G1"}},
            {"type": "unfollow", "source": {"type": "room", "roomId": "R1", "userId": "U1"}}
        ]}"#;
        let payload = decode(body).unwrap();
        assert_eq!(payload.events[0].event_type(), "follow");
        assert_eq!(
            payload.events[0].source,
            Some(Source::Group {
                group_id: "G1".into(),
                user_id: None
            })
        );
        assert_eq!(payload.events[1].event_type(), "unfollow");
        assert!(payload.events[1].reply_token.is_none());
    }

    #[test]
    fn untyped_event_does_not_sink_the_batch() {
        let body = br#"{"events": [
            {"replyToken": "r0"},
            {"type": "follow", "source": {"userId": "U1"}},
            {"type": "message", "replyToken": "r1", "message": {"id": "7"}},
            {"type": "message", "replyToken": "r2",
             "message": {"id": "8", "type": "text", "text": "hi"}}
        ]}"#;
        let payload = decode(body).unwrap();
        assert_eq!(payload.events.len(), 4);
        assert_eq!(
            payload.events[0].kind,
            EventKind::Unsupported {
                event_type: String::new()
            }
        );
        assert_eq!(
            payload.events[1].source,
            Some(Source::Unknown {
                source_type: String::new()
            })
        );
        assert_eq!(
            payload.events[2].kind,
            EventKind::Message(Message::Unsupported(UnsupportedMessage {
                message_type: String::new(),
                id: Some("7".into()),
            }))
        );
        assert_eq!(
            payload.events[3].kind,
            EventKind::Message(Message::Text(TextMessage {
                id: Some("8".into()),
                text: "hi".into(),
            }))
        );
    }

    #[test]
    fn empty_event_list_is_accepted() {
        let payload = decode(br#"{"destination": "U0", "events": []}"#).unwrap();
        assert!(payload.events.is_empty());
    }

    #[test]
    fn message_event_without_message_is_rejected() {
        let body = br#"{"events": [
            {"type": "follow"},
            {"type": "message", "replyToken": "r"}
        ]}"#;
        let err = decode(body).unwrap_err();
        assert!(matches!(err, ParseError::MissingMessage { index: 1 }));
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = decode(b"not json").unwrap_err();
        assert!(matches!(err, ParseError::Malformed(_)));
        assert!(err.to_string().starts_with("malformed webhook body"));
    }
}

//! Inbound webhook event normalization.
//!
//! Only the two event kinds the bot reacts to are kept: text messages and
//! follows. Everything else (stickers, unfollows, postbacks, group events
//! without a user) is dropped here so handlers never see it.

use serde::Deserialize;
use tracing::debug;

use crate::error::{BotError, Result};

/// An inbound chat event the bot reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// A user sent a text message.
    Message {
        /// Sender's user ID.
        user_id: String,
        /// Message text as sent.
        text: String,
        /// Token for replying to this message.
        reply_token: String,
    },
    /// A user added the bot as a friend.
    Follow {
        /// The new follower's user ID.
        user_id: String,
    },
}

impl InboundEvent {
    /// Returns the user the event came from.
    #[must_use]
    pub fn user_id(&self) -> &str {
        match self {
            Self::Message { user_id, .. } | Self::Follow { user_id } => user_id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WebhookBody {
    #[serde(default)]
    events: Vec<RawEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    #[serde(rename = "type")]
    kind: String,
    reply_token: Option<String>,
    source: Option<RawSource>,
    message: Option<RawMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSource {
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

impl RawEvent {
    fn normalize(self) -> Option<InboundEvent> {
        let user_id = self.source.and_then(|s| s.user_id)?;

        match self.kind.as_str() {
            "follow" => Some(InboundEvent::Follow { user_id }),
            "message" => {
                let message = self.message.filter(|m| m.kind == "text")?;
                Some(InboundEvent::Message {
                    user_id,
                    text: message.text.unwrap_or_default(),
                    reply_token: self.reply_token.unwrap_or_default(),
                })
            }
            _ => None,
        }
    }
}

/// Decodes a webhook body into the events the bot handles.
///
/// # Errors
///
/// Returns `BotError::MalformedPayload` if the body is not a webhook JSON
/// document.
pub fn parse_events(body: &[u8]) -> Result<Vec<InboundEvent>> {
    let webhook: WebhookBody =
        serde_json::from_slice(body).map_err(|e| BotError::malformed_payload(e.to_string()))?;

    let total = webhook.events.len();
    let events: Vec<InboundEvent> = webhook
        .events
        .into_iter()
        .filter_map(RawEvent::normalize)
        .collect();

    if events.len() < total {
        debug!(
            ignored = total - events.len(),
            "Ignored unsupported webhook events"
        );
    }

    Ok(events)
}

/// Returns `true` if `text` is the trigger keyword, ignoring case and
/// surrounding whitespace.
#[must_use]
pub fn is_trigger(text: &str, keyword: &str) -> bool {
    text.trim().to_lowercase() == keyword.trim().to_lowercase()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_message_and_follow() {
        let body = br#"{
            "destination": "Ubot",
            "events": [
                {
                    "type": "message",
                    "replyToken": "r-1",
                    "source": { "type": "user", "userId": "U1" },
                    "message": { "id": "m", "type": "text", "text": " Test " }
                },
                {
                    "type": "follow",
                    "replyToken": "r-2",
                    "source": { "type": "user", "userId": "U2" }
                }
            ]
        }"#;

        let events = parse_events(body).unwrap();
        assert_eq!(
            events,
            vec![
                InboundEvent::Message {
                    user_id: "U1".to_string(),
                    text: " Test ".to_string(),
                    reply_token: "r-1".to_string(),
                },
                InboundEvent::Follow {
                    user_id: "U2".to_string()
                },
            ]
        );
        assert_eq!(events[1].user_id(), "U2");
    }

    #[test]
    fn test_unsupported_events_are_dropped() {
        let body = br#"{
            "events": [
                { "type": "unfollow", "source": { "userId": "U1" } },
                { "type": "message", "source": { "userId": "U1" },
                  "message": { "type": "sticker", "packageId": "1" } },
                { "type": "message", "source": { "type": "group", "groupId": "G" },
                  "message": { "type": "text", "text": "hi" } }
            ]
        }"#;

        assert!(parse_events(body).unwrap().is_empty());
    }

    #[test]
    fn test_empty_events_and_verification_ping() {
        assert!(parse_events(br#"{"destination":"U","events":[]}"#).unwrap().is_empty());
        assert!(parse_events(b"{}").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_body() {
        let err = parse_events(b"not json").unwrap_err();
        assert!(matches!(err, BotError::MalformedPayload { .. }));
    }

    #[test]
    fn test_is_trigger() {
        assert!(is_trigger("test", "test"));
        assert!(is_trigger("  TEST\n", "test"));
        assert!(is_trigger("Test", "TEST"));
        assert!(!is_trigger("testing", "test"));
        assert!(!is_trigger("", "test"));
    }
}

//! Outbound chat messages and the LINE Messaging API client.

use std::time::Duration;

use async_trait::async_trait;
use learnbot_report::{looks_like_report, parse, CardNode, CardRenderer, FlexSerializer};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::{redacted, LineConfig};
use crate::error::{BotError, Result, Upstream};

/// Alt text of report cards pushed to users.
pub const REPORT_ALT_TEXT: &str = "學習報告";

/// Alt text of the test report card sent in reply to the trigger keyword.
pub const TEST_REPORT_ALT_TEXT: &str = "🧪 測試學習報告";

/// Parses and renders report text, logging lines that fell outside any section.
#[must_use]
pub fn report_card(text: &str) -> CardNode {
    let report = parse(text);
    if !report.orphan_lines.is_empty() {
        debug!(
            orphan_lines = ?report.orphan_lines,
            "Report lines outside any section were dropped"
        );
    }
    CardRenderer::new().render(&report)
}

/// A message to send to a user.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    /// Plain text.
    Text(String),
    /// Flex card with fallback text for clients that cannot show it.
    Flex {
        /// Text shown in notifications and chat lists.
        alt_text: String,
        /// Flex container JSON.
        contents: Value,
    },
}

impl OutboundMessage {
    /// Creates a plain text message.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Creates a flex message from a card tree.
    #[must_use]
    pub fn card(alt_text: impl Into<String>, card: &CardNode) -> Self {
        Self::Flex {
            alt_text: alt_text.into(),
            contents: FlexSerializer::new().to_value(card),
        }
    }

    /// Chooses the message for `text`: a report card if the text looks like
    /// a learning report, otherwise plain text.
    #[must_use]
    pub fn for_text(text: &str) -> Self {
        if looks_like_report(text) {
            Self::card(REPORT_ALT_TEXT, &report_card(text))
        } else {
            Self::text(text)
        }
    }

    /// Returns the Messaging API JSON for this message.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(text) => json!({ "type": "text", "text": text }),
            Self::Flex { alt_text, contents } => {
                FlexSerializer::envelope(alt_text, contents.clone())
            }
        }
    }
}

/// Sends messages to users.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Pushes `messages` to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `BotError` if the messages could not be delivered.
    async fn push(&self, user_id: &str, messages: Vec<OutboundMessage>) -> Result<()>;

    /// Replies to the event identified by `reply_token`.
    ///
    /// # Errors
    ///
    /// Returns `BotError` if the reply could not be delivered.
    async fn reply(&self, reply_token: &str, messages: Vec<OutboundMessage>) -> Result<()>;
}

/// Pushes `text` to `user_id` as a card or plain text, reporting success.
///
/// Failures are logged and reported as `false`.
pub async fn deliver(messenger: &dyn Messenger, user_id: &str, text: &str) -> bool {
    match messenger
        .push(user_id, vec![OutboundMessage::for_text(text)])
        .await
    {
        Ok(()) => true,
        Err(e) => {
            warn!(user_id, error = %e, "Failed to push message");
            false
        }
    }
}

// ============================================================================
// LineMessenger
// ============================================================================

/// [`Messenger`] backed by the LINE Messaging API.
#[derive(Clone)]
pub struct LineMessenger {
    client: Client,
    api_base: String,
    access_token: String,
}

impl std::fmt::Debug for LineMessenger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineMessenger")
            .field("api_base", &self.api_base)
            .field("access_token", &redacted(&self.access_token))
            .finish_non_exhaustive()
    }
}

impl LineMessenger {
    /// Creates a client for the configured channel.
    ///
    /// # Errors
    ///
    /// Returns `BotError::Http` if the HTTP client cannot be built.
    pub fn new(config: &LineConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            access_token: config.channel_access_token.clone(),
        })
    }

    async fn post(&self, endpoint: &str, body: Value) -> Result<()> {
        let url = format!("{}/v2/bot/message/{endpoint}", self.api_base);
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(endpoint, "LINE call succeeded");
            Ok(())
        } else {
            let detail = response.text().await.unwrap_or_default();
            Err(BotError::upstream(Upstream::Line, status.as_u16(), detail))
        }
    }
}

fn messages_json(messages: &[OutboundMessage]) -> Vec<Value> {
    messages.iter().map(OutboundMessage::to_json).collect()
}

#[async_trait]
impl Messenger for LineMessenger {
    async fn push(&self, user_id: &str, messages: Vec<OutboundMessage>) -> Result<()> {
        self.post(
            "push",
            json!({ "to": user_id, "messages": messages_json(&messages) }),
        )
        .await
    }

    async fn reply(&self, reply_token: &str, messages: Vec<OutboundMessage>) -> Result<()> {
        self.post(
            "reply",
            json!({ "replyToken": reply_token, "messages": messages_json(&messages) }),
        )
        .await
    }
}

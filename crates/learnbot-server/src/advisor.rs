//! Short AI-generated study advice.
//!
//! An [`Advisor`] never fails at the boundary: any upstream problem turns
//! into the configured fallback advice so a report can always be sent.

use std::time::Duration;

use async_trait::async_trait;
use learnbot_report::ScoredSession;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::GeminiConfig;
use crate::error::{BotError, Result, Upstream};

/// Instruction appended to every prompt so replies come back in Traditional Chinese.
const TRADITIONAL_CHINESE_SUFFIX: &str = "請使用繁體中文回覆，不要使用簡體字。";

/// Replies containing this word are treated as error messages.
const ERROR_WORD: &str = "錯誤";

/// Produces study advice for a session.
#[async_trait]
pub trait Advisor: Send + Sync {
    /// Returns advice for `session`; never fails.
    async fn advice(&self, session: &ScoredSession) -> String;
}

/// Builds the advice prompt for `session`.
///
/// Numbers are printed the way the game client sends them, so whole-number
/// scores keep their `.0`.
#[must_use]
pub fn build_prompt(session: &ScoredSession) -> String {
    format!(
        "根據以下學習數據，提供簡短的學習建議（限制50字以內）：\n\
         學習態度分數：{}分\n\
         學習成效分數：{}分\n\
         學習專心度分數：{}分\n\
         答對題數：{}題\n\
         答錯題數：{}題\n\
         平均答題時間：{}秒\n\
         \n\
         請提供具體且實用的建議。",
        decimal(session.attitude_score()),
        decimal(session.effectiveness_score()),
        decimal(session.concentration_score()),
        session.correct_count(),
        session.wrong_count(),
        decimal(session.avg_answer_time()),
    )
}

/// Formats a float with at least one decimal place.
#[allow(clippy::float_cmp)]
fn decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

// ============================================================================
// StaticAdvisor
// ============================================================================

/// Advisor that always returns the same text.
#[derive(Debug, Clone)]
pub struct StaticAdvisor {
    text: String,
}

impl StaticAdvisor {
    /// Creates an advisor returning `text`.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl Advisor for StaticAdvisor {
    async fn advice(&self, _session: &ScoredSession) -> String {
        self.text.clone()
    }
}

// ============================================================================
// GeminiAdvisor
// ============================================================================

/// Advisor backed by the Gemini `generateContent` API.
#[derive(Debug, Clone)]
pub struct GeminiAdvisor {
    client: Client,
    config: GeminiConfig,
}

impl GeminiAdvisor {
    /// Creates an advisor with a client honoring the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns `BotError::Http` if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self { client, config })
    }

    /// Sends `prompt` to the model and returns the trimmed reply text.
    ///
    /// # Errors
    ///
    /// Returns `BotError::Http` on transport failures and
    /// `BotError::UpstreamError` on error statuses or empty candidates.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        );
        let payload = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: format!("{prompt}\n\n{TRADITIONAL_CHINESE_SUFFIX}"),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                top_p: self.config.top_p,
                top_k: self.config.top_k,
                max_output_tokens: self.config.max_output_tokens,
            },
        };

        let response = self
            .client
            .post(url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::upstream(Upstream::Gemini, status.as_u16(), body));
        }

        let body: GenerateResponse = response.json().await?;
        body.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .map(|text| text.trim().to_string())
            .ok_or_else(|| {
                BotError::upstream(Upstream::Gemini, status.as_u16(), "response had no candidates")
            })
    }
}

#[async_trait]
impl Advisor for GeminiAdvisor {
    async fn advice(&self, session: &ScoredSession) -> String {
        match self.generate(&build_prompt(session)).await {
            Ok(text) if text.is_empty() || text.contains(ERROR_WORD) => {
                debug!(reply = %text, "Gemini reply unusable, using fallback advice");
                self.config.fallback_advice.clone()
            }
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, transient = e.is_transient(), "Gemini advice failed");
                self.config.fallback_advice.clone()
            }
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

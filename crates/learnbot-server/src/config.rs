//! Configuration types for the learnbot server.
//!
//! Configuration is read from `learnbot.json` (all fields optional) and then
//! overridden by the environment variables the hosting platform provides:
//! `LINE_CHANNEL_ACCESS_TOKEN`, `LINE_CHANNEL_SECRET`, `GEMINI_API_KEY` and
//! `PORT`.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};

/// The default config file name.
pub const CONFIG_FILE_NAME: &str = "learnbot.json";

const fn default_port() -> u16 {
    7000
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_trigger_keyword() -> String {
    "test".to_string()
}

fn default_broadcast_message() -> String {
    "遊戲開始啦！".to_string()
}

fn default_user_store_path() -> String {
    "data/users.json".to_string()
}

fn default_line_api_base() -> String {
    "https://api.line.me".to_string()
}

fn default_gemini_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

const fn default_temperature() -> f32 {
    0.7
}

const fn default_top_p() -> f32 {
    0.95
}

const fn default_top_k() -> u32 {
    40
}

const fn default_max_output_tokens() -> u32 {
    100
}

const fn default_timeout_seconds() -> u64 {
    10
}

fn default_fallback_advice() -> String {
    "繼續保持學習熱忱！".to_string()
}

/// Debug text for a credential: whether it is set, never its value.
pub(crate) const fn redacted(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "***REDACTED***"
    }
}

/// Main configuration for the learnbot server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Chat text (case-insensitive, trimmed) that triggers a test report.
    #[serde(default = "default_trigger_keyword")]
    pub trigger_keyword: String,

    /// Message broadcast by the trigger endpoint when no report or message is given.
    #[serde(default = "default_broadcast_message")]
    pub default_broadcast_message: String,

    /// Path of the JSON file holding known users.
    #[serde(default = "default_user_store_path")]
    pub user_store_path: String,

    /// LINE Messaging API settings.
    #[serde(default)]
    pub line: LineConfig,

    /// Gemini API settings.
    #[serde(default)]
    pub gemini: GeminiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            trigger_keyword: default_trigger_keyword(),
            default_broadcast_message: default_broadcast_message(),
            user_store_path: default_user_store_path(),
            line: LineConfig::default(),
            gemini: GeminiConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from `learnbot.json` in the current directory and
    /// applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is invalid, or if an override
    /// has an invalid value.
    pub fn load() -> Result<Self> {
        let current_dir = std::env::current_dir().map_err(|e| {
            BotError::config_parse(
                "<current directory>",
                format!("cannot determine current directory: {e}"),
            )
        })?;
        let mut config = Self::load_from_file(&current_dir.join(CONFIG_FILE_NAME))?;
        config.apply_env()?;
        Ok(config)
    }

    /// Loads configuration from a specific file path.
    ///
    /// If the file does not exist, returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns `BotError::ConfigParseError` if the file exists but contains
    /// invalid JSON, or `BotError::ConfigValidationError` if values are invalid.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(BotError::config_parse(
                    path,
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| BotError::config_parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Applies overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `BotError::ConfigValidationError` if `PORT` is not a valid port.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns `BotError::ConfigValidationError` if `PORT` is not a valid port.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = var("LINE_CHANNEL_ACCESS_TOKEN") {
            self.line.channel_access_token = token;
        }
        if let Some(secret) = var("LINE_CHANNEL_SECRET") {
            self.line.channel_secret = secret;
        }
        if let Some(key) = var("GEMINI_API_KEY") {
            self.gemini.api_key = key;
        }
        if let Some(port) = var("PORT") {
            self.port = port.trim().parse().map_err(|_| {
                BotError::config_validation(
                    format!("PORT must be a port number, got '{port}'"),
                    "Set PORT to a number between 1 and 65535",
                )
            })?;
        }

        self.validate()
    }

    /// Validates the configuration values.
    ///
    /// Checks that:
    /// - `port` is greater than 0
    /// - `triggerKeyword` is not empty
    /// - `userStorePath` is not empty
    /// - `line.timeoutSeconds` and `gemini.timeoutSeconds` are greater than 0
    ///
    /// # Errors
    ///
    /// Returns `BotError::ConfigValidationError` if any check fails.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(BotError::config_validation(
                "port must be greater than 0",
                "Set port in learnbot.json or the PORT environment variable",
            ));
        }

        if self.trigger_keyword.trim().is_empty() {
            return Err(BotError::config_validation(
                "triggerKeyword must not be empty",
                "Set triggerKeyword in learnbot.json (the default is \"test\")",
            ));
        }

        if self.user_store_path.trim().is_empty() {
            return Err(BotError::config_validation(
                "userStorePath must not be empty",
                "Provide a writable file path for userStorePath in learnbot.json",
            ));
        }

        if self.line.timeout_seconds == 0 {
            return Err(BotError::config_validation(
                "line.timeoutSeconds must be greater than 0",
                "Set line.timeoutSeconds to at least 1 second in learnbot.json",
            ));
        }

        if self.gemini.timeout_seconds == 0 {
            return Err(BotError::config_validation(
                "gemini.timeoutSeconds must be greater than 0",
                "Set gemini.timeoutSeconds to at least 1 second in learnbot.json",
            ));
        }

        Ok(())
    }

    /// Checks that the LINE credentials needed to serve are present.
    ///
    /// # Errors
    ///
    /// Returns `BotError::MissingCredential` naming the first missing value.
    pub fn require_line_credentials(&self) -> Result<()> {
        if self.line.channel_secret.is_empty() {
            return Err(BotError::missing_credential(
                "LINE channel secret",
                "LINE_CHANNEL_SECRET",
            ));
        }
        if self.line.channel_access_token.is_empty() {
            return Err(BotError::missing_credential(
                "LINE channel access token",
                "LINE_CHANNEL_ACCESS_TOKEN",
            ));
        }
        Ok(())
    }

    /// Returns the `host:port` address to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// LINE Messaging API settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineConfig {
    /// Channel secret used to verify webhook signatures.
    #[serde(default)]
    pub channel_secret: String,

    /// Channel access token used for push and reply calls.
    #[serde(default)]
    pub channel_access_token: String,

    /// Base URL of the Messaging API.
    #[serde(default = "default_line_api_base")]
    pub api_base: String,

    /// Push and reply request timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_secret: String::new(),
            channel_access_token: String::new(),
            api_base: default_line_api_base(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl fmt::Debug for LineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineConfig")
            .field("channel_secret", &redacted(&self.channel_secret))
            .field("channel_access_token", &redacted(&self.channel_access_token))
            .field("api_base", &self.api_base)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Gemini API settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiConfig {
    /// API key; when empty a fixed advice string is used instead.
    #[serde(default)]
    pub api_key: String,

    /// Model name.
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// Base URL of the generative language API.
    #[serde(default = "default_gemini_api_base")]
    pub api_base: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling threshold.
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Top-k sampling limit.
    #[serde(default = "default_top_k")]
    pub top_k: u32,

    /// Upper bound on generated tokens.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Advice used whenever generation fails.
    #[serde(default = "default_fallback_advice")]
    pub fallback_advice: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_gemini_model(),
            api_base: default_gemini_api_base(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
            timeout_seconds: default_timeout_seconds(),
            fallback_advice: default_fallback_advice(),
        }
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &redacted(&self.api_key))
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("top_k", &self.top_k)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("fallback_advice", &self.fallback_advice)
            .finish()
    }
}

impl GeminiConfig {
    /// Returns `true` if an API key is configured.
    #[must_use]
    pub fn enabled(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

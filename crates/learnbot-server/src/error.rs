//! Error types for the learnbot server.
//!
//! This module defines the error hierarchy for configuration loading, webhook
//! verification, the user store, and calls to the LINE and Gemini APIs.

use std::path::PathBuf;

/// A specialized `Result` type for learnbot server operations.
pub type Result<T> = std::result::Result<T, BotError>;

/// Errors that can occur while running the bot.
///
/// Variants are organized by subsystem and include actionable suggestions
/// where possible.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid JSON syntax in the configuration file.
    #[error("Invalid JSON in config file '{path}': {message}\n\nSuggestion: Validate your learnbot.json with a JSON linter")]
    ConfigParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidationError {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    /// A credential required to serve is not set.
    #[error("{name} is not configured\n\nSuggestion: Set {env_var} in the environment or in a .env file")]
    MissingCredential {
        /// Human-readable credential name.
        name: &'static str,
        /// Environment variable that provides it.
        env_var: &'static str,
    },

    // ========================================================================
    // Webhook Errors
    // ========================================================================
    /// The `X-Line-Signature` header is missing or does not match the body.
    #[error("Webhook signature verification failed\n\nSuggestion: Check that LINE_CHANNEL_SECRET matches the channel secret in the LINE Developers console")]
    InvalidSignature,

    /// The webhook body could not be decoded.
    #[error("Malformed webhook payload: {message}")]
    MalformedPayload {
        /// Description of the decode failure.
        message: String,
    },

    // ========================================================================
    // Upstream API Errors
    // ========================================================================
    /// An upstream API answered with an error status.
    #[error("{service} API error ({kind}): {message}\n\nSuggestion: {suggestion}")]
    UpstreamError {
        /// Which API failed.
        service: Upstream,
        /// Category of the failure.
        kind: UpstreamErrorKind,
        /// Detail from the response.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    /// HTTP transport failure talking to an upstream API.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // ========================================================================
    // User Store Errors
    // ========================================================================
    /// The user store file could not be read or written.
    #[error("User store error at '{path}': {message}\n\nSuggestion: Check that the directory exists and is writable, or remove a corrupted file")]
    StoreError {
        /// Path to the store file.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },

    // ========================================================================
    // General I/O Errors
    // ========================================================================
    /// General I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Report pipeline error.
    #[error("Report error: {0}")]
    Report(#[from] learnbot_report::ReportError),
}

/// External services the bot calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    /// LINE Messaging API.
    Line,
    /// Gemini generative language API.
    Gemini,
}

impl std::fmt::Display for Upstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Line => write!(f, "LINE"),
            Self::Gemini => write!(f, "Gemini"),
        }
    }
}

/// Categories of upstream API errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrorKind {
    /// Invalid or expired credentials (401/403).
    Authentication,
    /// The request was rejected as invalid (other 4xx).
    BadRequest,
    /// Rate limit exceeded (429).
    RateLimit,
    /// Server error (5xx).
    Server,
    /// Unclassified failure.
    Other,
}

impl UpstreamErrorKind {
    /// Classifies an HTTP status code.
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Authentication,
            429 => Self::RateLimit,
            400..=499 => Self::BadRequest,
            500..=599 => Self::Server,
            _ => Self::Other,
        }
    }

    /// Returns a suggestion message for this error kind.
    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::Authentication => "Check the channel access token or API key",
            Self::BadRequest => "Check the request payload; the user may have blocked the bot",
            Self::RateLimit => "Reduce message volume or check the plan's quota",
            Self::Server => "Retry later; the service may be experiencing issues",
            Self::Other => "Check the service's status page",
        }
    }
}

impl std::fmt::Display for UpstreamErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::BadRequest => write!(f, "bad_request"),
            Self::RateLimit => write!(f, "rate_limit"),
            Self::Server => write!(f, "server"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl BotError {
    /// Creates a new `ConfigParseError` with the given path and message.
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ConfigValidationError` with the given message and suggestion.
    #[must_use]
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidationError {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Creates a new `MissingCredential` error.
    #[must_use]
    pub const fn missing_credential(name: &'static str, env_var: &'static str) -> Self {
        Self::MissingCredential { name, env_var }
    }

    /// Creates a new `MalformedPayload` error.
    #[must_use]
    pub fn malformed_payload(message: impl Into<String>) -> Self {
        Self::MalformedPayload {
            message: message.into(),
        }
    }

    /// Creates a new `UpstreamError` classified from an HTTP status code.
    #[must_use]
    pub fn upstream(service: Upstream, status: u16, message: impl Into<String>) -> Self {
        let kind = UpstreamErrorKind::from_status(status);
        Self::UpstreamError {
            service,
            kind,
            message: message.into(),
            suggestion: kind.suggestion().to_string(),
        }
    }

    /// Creates a new `StoreError`.
    #[must_use]
    pub fn store(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::StoreError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if this error is transient and the call may succeed later.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::UpstreamError { kind, .. } => {
                matches!(kind, UpstreamErrorKind::RateLimit | UpstreamErrorKind::Server)
            }
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

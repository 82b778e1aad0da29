//! HTTP endpoints of the learnbot server.
//!
//! # Endpoints
//!
//! - `POST /callback` - LINE webhook (signed with the channel secret)
//! - `POST /unity_notify` - Game trigger; broadcasts a report or a message
//! - `GET /health` - Liveness probe
//!
//! # Example
//!
//! ```no_run
//! use learnbot_server::{create_router, AppState, Config};
//!
//! # async fn example() -> learnbot_server::Result<()> {
//! let state = AppState::from_config(Config::load()?).await?;
//!
//! let router = create_router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:7000").await?;
//! axum::serve(listener, router).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use learnbot_report::{compose, ScoredSession, SessionGenerator};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::advisor::{Advisor, GeminiAdvisor, StaticAdvisor};
use crate::broadcast::{broadcast, BroadcastOutcome};
use crate::config::Config;
use crate::error::BotError;
use crate::events::{is_trigger, parse_events, InboundEvent};
use crate::messaging::{
    report_card, LineMessenger, Messenger, OutboundMessage, TEST_REPORT_ALT_TEXT,
};
use crate::signature::{verify, SIGNATURE_HEADER};
use crate::users::{FileUserStore, UserStore};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Error response body returned on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Description of the error.
    pub error: String,
}

/// Response body of the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: String,
}

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Config,
    /// Known users.
    pub users: Arc<dyn UserStore>,
    /// Source of AI study advice.
    pub advisor: Arc<dyn Advisor>,
    /// Outbound message channel.
    pub messenger: Arc<dyn Messenger>,
}

impl AppState {
    /// Builds production state: a file-backed user store, the LINE
    /// messenger, and Gemini advice when an API key is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the user store cannot be opened or an HTTP
    /// client cannot be built.
    pub async fn from_config(config: Config) -> crate::Result<Self> {
        let users = FileUserStore::open(&config.user_store_path).await?;
        let messenger = LineMessenger::new(&config.line)?;

        let advisor: Arc<dyn Advisor> = if config.gemini.enabled() {
            info!(model = %config.gemini.model, "Using Gemini advice");
            Arc::new(GeminiAdvisor::new(config.gemini.clone())?)
        } else {
            warn!("GEMINI_API_KEY not set, using fallback advice");
            Arc::new(StaticAdvisor::new(config.gemini.fallback_advice.clone()))
        };

        Ok(Self {
            users: Arc::new(users),
            advisor,
            messenger: Arc::new(messenger),
            config,
        })
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// API Error Type
// ============================================================================

/// Internal error type for API handlers.
#[derive(Debug)]
enum ApiError {
    /// The request was rejected before any work was done.
    BadRequest(String),
    /// Something on our side failed.
    Internal(String),
}

impl From<BotError> for ApiError {
    fn from(err: BotError) -> Self {
        match err {
            BotError::InvalidSignature
            | BotError::MalformedPayload { .. }
            | BotError::Report(_) => Self::BadRequest(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

// ============================================================================
// Router Setup
// ============================================================================

/// Creates the HTTP router with all endpoints.
///
/// The router carries CORS and request tracing middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/callback", post(handle_callback))
        .route("/unity_notify", post(handle_unity_notify))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

// ============================================================================
// Handlers
// ============================================================================

/// Handler for `POST /callback`.
///
/// Verifies the signature over the raw body, records every sender and
/// replies to the trigger keyword with a test report card.
async fn handle_callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            warn!("Webhook request without signature header");
            ApiError::BadRequest("missing X-Line-Signature header".to_string())
        })?;

    if let Err(e) = verify(&state.config.line.channel_secret, &body, signature) {
        warn!("Rejected webhook with invalid signature");
        return Err(e.into());
    }

    let events = parse_events(&body)?;
    info!(count = events.len(), "Received webhook events");

    for event in events {
        if let Err(e) = state.users.record_activity(event.user_id()).await {
            warn!(user_id = event.user_id(), error = %e, "Failed to record user");
        }

        match event {
            InboundEvent::Follow { user_id } => {
                info!(user_id = %user_id, "User followed");
            }
            InboundEvent::Message {
                user_id,
                text,
                reply_token,
            } => {
                info!(user_id = %user_id, text = %text.trim(), "Received message");
                if is_trigger(&text, &state.config.trigger_keyword) {
                    reply_with_test_report(&state, &reply_token).await;
                }
            }
        }
    }

    Ok("OK")
}

/// Replies with a report built from a random session.
async fn reply_with_test_report(state: &AppState, reply_token: &str) {
    let session = SessionGenerator::random();
    let advice = state.advisor.advice(&session).await;
    let card = report_card(&compose(&session, &advice));
    let message = OutboundMessage::card(TEST_REPORT_ALT_TEXT, &card);

    match state.messenger.reply(reply_token, vec![message]).await {
        Ok(()) => info!("Replied with test report"),
        Err(e) => warn!(error = %e, "Failed to reply with test report"),
    }
}

/// Handler for `POST /unity_notify`.
///
/// A body with `totalTime` is a scored session: it is turned into a report
/// and broadcast. Any other body broadcasts its `message` field, or the
/// configured default message.
async fn handle_unity_notify(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Value>,
) -> Result<Json<BroadcastOutcome>, ApiError> {
    let text = if payload.get("totalTime").is_some() {
        let session = ScoredSession::from_json(payload).map_err(BotError::from)?;
        info!(
            total_time = session.total_time(),
            total_questions = session.total_questions(),
            "Received session report"
        );
        let advice = state.advisor.advice(&session).await;
        compose(&session, &advice)
    } else {
        payload
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| state.config.default_broadcast_message.clone(), str::to_string)
    };

    let outcome = broadcast(state.users.as_ref(), state.messenger.as_ref(), &text).await;
    Ok(Json(outcome))
}

/// Handler for `GET /health`.
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

// ============================================================================
// Tests
// ============================================================================

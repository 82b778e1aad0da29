//! learnbot server
//!
//! LINE webhook service that tracks users, answers the trigger keyword with a
//! test report and broadcasts learning reports sent by the game client.

pub mod advisor;
pub mod api;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod events;
pub mod messaging;
pub mod signature;
pub mod users;

pub use advisor::{build_prompt, Advisor, GeminiAdvisor, StaticAdvisor};
pub use api::{create_router, AppState, ErrorResponse, HealthResponse};
pub use broadcast::{broadcast, BroadcastOutcome};
pub use config::{Config, GeminiConfig, LineConfig, CONFIG_FILE_NAME};
pub use error::{BotError, Result, Upstream, UpstreamErrorKind};
pub use events::{is_trigger, parse_events, InboundEvent};
pub use messaging::{
    deliver, report_card, LineMessenger, Messenger, OutboundMessage, REPORT_ALT_TEXT,
    TEST_REPORT_ALT_TEXT,
};
pub use signature::{sign, verify, SIGNATURE_HEADER};
pub use users::{FileUserStore, MemoryUserStore, UserRecord, UserStore};

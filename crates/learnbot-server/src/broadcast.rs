//! Best-effort fan-out of one message to every known user.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::messaging::{deliver, Messenger};
use crate::users::UserStore;

/// Result of a broadcast, serialized as the trigger endpoint's response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BroadcastOutcome {
    /// At least one user was known; `success_count` of them were reached.
    Ok {
        /// Number of known users.
        user_count: usize,
        /// Number of successful deliveries.
        success_count: usize,
    },
    /// No users were known, nothing was sent.
    NoUsers {
        /// Always zero.
        user_count: usize,
    },
}

impl BroadcastOutcome {
    /// Returns the number of users a delivery was attempted for.
    #[must_use]
    pub const fn user_count(&self) -> usize {
        match self {
            Self::Ok { user_count, .. } | Self::NoUsers { user_count } => *user_count,
        }
    }

    /// Returns the number of successful deliveries.
    #[must_use]
    pub const fn success_count(&self) -> usize {
        match self {
            Self::Ok { success_count, .. } => *success_count,
            Self::NoUsers { .. } => 0,
        }
    }
}

/// Sends `text` to every known user, one after another.
///
/// A user store that cannot be read counts as having no users; individual
/// delivery failures are logged and skipped.
pub async fn broadcast(
    users: &dyn UserStore,
    messenger: &dyn Messenger,
    text: &str,
) -> BroadcastOutcome {
    let user_ids = users.list_user_ids().await.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to list users, broadcasting to nobody");
        Vec::new()
    });

    if user_ids.is_empty() {
        info!("No users to broadcast to");
        return BroadcastOutcome::NoUsers { user_count: 0 };
    }

    let mut success_count = 0;
    for user_id in &user_ids {
        if deliver(messenger, user_id, text).await {
            success_count += 1;
        }
    }

    info!(
        user_count = user_ids.len(),
        success_count, "Broadcast finished"
    );

    BroadcastOutcome::Ok {
        user_count: user_ids.len(),
        success_count,
    }
}

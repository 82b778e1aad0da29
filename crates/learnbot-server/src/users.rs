//! Known-user storage.
//!
//! The bot remembers every user who messaged or followed it so that trigger
//! broadcasts can reach them. [`UserStore`] is the seam; [`MemoryUserStore`]
//! backs tests and [`FileUserStore`] persists users as a JSON document.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{BotError, Result};

/// A known user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// LINE user ID.
    pub user_id: String,
    /// When the user was first seen.
    pub created_at: DateTime<Utc>,
    /// When the user was last seen.
    pub last_active: DateTime<Utc>,
}

impl UserRecord {
    /// Creates a record first seen at `now`.
    #[must_use]
    pub fn new(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            created_at: now,
            last_active: now,
        }
    }
}

/// Storage for known users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates the user if unknown, otherwise bumps its last-active time.
    ///
    /// # Errors
    ///
    /// Returns `BotError` if the store cannot be updated.
    async fn record_activity(&self, user_id: &str) -> Result<()>;

    /// Lists the IDs of all known users.
    ///
    /// # Errors
    ///
    /// Returns `BotError` if the store cannot be read.
    async fn list_user_ids(&self) -> Result<Vec<String>>;
}

type UserMap = BTreeMap<String, UserRecord>;

/// Inserts or bumps `user_id`; returns `true` if the user is new.
fn touch(users: &mut UserMap, user_id: &str, now: DateTime<Utc>) -> bool {
    if let Some(record) = users.get_mut(user_id) {
        record.last_active = now;
        false
    } else {
        users.insert(user_id.to_string(), UserRecord::new(user_id, now));
        true
    }
}

// ============================================================================
// MemoryUserStore
// ============================================================================

/// In-process user store; contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: Mutex<UserMap>,
}

impl MemoryUserStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the record for `user_id`.
    pub async fn get(&self, user_id: &str) -> Option<UserRecord> {
        self.users.lock().await.get(user_id).cloned()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn record_activity(&self, user_id: &str) -> Result<()> {
        let mut users = self.users.lock().await;
        if touch(&mut users, user_id, Utc::now()) {
            info!(user_id, "Recorded new user");
        } else {
            debug!(user_id, "Updated user activity");
        }
        Ok(())
    }

    async fn list_user_ids(&self) -> Result<Vec<String>> {
        Ok(self.users.lock().await.keys().cloned().collect())
    }
}

// ============================================================================
// FileUserStore
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct UserDocument {
    users: Vec<UserRecord>,
}

/// User store persisted to a JSON file.
///
/// The whole document is rewritten on every change: it is written to a
/// sibling temporary file and renamed over the original, so readers never
/// observe a half-written file.
#[derive(Debug)]
pub struct FileUserStore {
    path: PathBuf,
    users: Mutex<UserMap>,
}

impl FileUserStore {
    /// Opens the store at `path`, loading existing users.
    ///
    /// A missing file yields an empty store; the file and its parent
    /// directories are created on the first write.
    ///
    /// # Errors
    ///
    /// Returns `BotError::StoreError` if the file exists but cannot be read
    /// or parsed.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let users = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let doc: UserDocument = serde_json::from_slice(&bytes)
                    .map_err(|e| BotError::store(&path, format!("corrupted user file: {e}")))?;
                doc.users
                    .into_iter()
                    .map(|record| (record.user_id.clone(), record))
                    .collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => UserMap::new(),
            Err(e) => return Err(BotError::store(&path, e.to_string())),
        };

        info!(path = %path.display(), users = users.len(), "Opened user store");

        Ok(Self {
            path,
            users: Mutex::new(users),
        })
    }

    /// Returns the store's file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, users: &UserMap) -> Result<()> {
        let doc = UserDocument {
            users: users.values().cloned().collect(),
        };
        let json = serde_json::to_vec_pretty(&doc)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| BotError::store(&self.path, e.to_string()))?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|e| BotError::store(&self.path, e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| BotError::store(&self.path, e.to_string()))
    }
}

#[async_trait]
impl UserStore for FileUserStore {
    async fn record_activity(&self, user_id: &str) -> Result<()> {
        // Held across the write so concurrent updates persist in order.
        let mut users = self.users.lock().await;
        let is_new = touch(&mut users, user_id, Utc::now());
        self.persist(&users).await?;

        if is_new {
            info!(user_id, "Recorded new user");
        } else {
            debug!(user_id, "Updated user activity");
        }
        Ok(())
    }

    async fn list_user_ids(&self) -> Result<Vec<String>> {
        Ok(self.users.lock().await.keys().cloned().collect())
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A chat user as persisted in the user file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: i64,
    pub username: String,
    #[serde(default)]
    pub is_vip: bool,
    /// None means lifetime access while `is_vip` is set
    #[serde(default)]
    pub expires: Option<DateTime<Utc>>,
    #[serde(default)]
    pub referrals: u32,
}

impl UserRecord {
    pub fn new(user_id: i64, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            is_vip: false,
            expires: None,
            referrals: 0,
        }
    }

    /// VIP flag set and not yet expired
    pub fn vip_active(&self, now: DateTime<Utc>) -> bool {
        self.is_vip && self.expires.map_or(true, |expires| now <= expires)
    }
}

/// Whole-list load/save persistence for user records
pub trait UserStore: Send + Sync {
    fn load(&self) -> Result<Vec<UserRecord>, StoreError>;
    fn save(&self, users: &[UserRecord]) -> Result<(), StoreError>;
}

/// Users kept as a pretty-printed JSON array on disk
pub struct JsonUserStore {
    path: PathBuf,
}

impl JsonUserStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UserStore for JsonUserStore {
    /// Load all users, creating an empty file on first use
    fn load(&self) -> Result<Vec<UserRecord>, StoreError> {
        if !self.path.exists() {
            self.save(&[])?;
            info!("Created {}", self.path.display());
            return Ok(Vec::new());
        }
        let json = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn save(&self, users: &[UserRecord]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(users)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, JsonUserStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonUserStore::new(dir.path().join("users.json"));
        (dir, store)
    }

    #[test]
    fn test_load_creates_missing_file() {
        let (_dir, store) = temp_store();
        assert!(!store.path().exists());
        assert!(store.load().unwrap().is_empty());
        assert!(store.path().exists());
    }

    #[test]
    fn test_save_then_load() {
        let (_dir, store) = temp_store();
        let mut user = UserRecord::new(42, "alice");
        user.is_vip = true;
        user.expires = Some(Utc::now());
        user.referrals = 2;

        store.save(&[user.clone(), UserRecord::new(7, "bob")]).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0], user);
    }

    #[test]
    fn test_reads_records_with_missing_fields() {
        let (_dir, store) = temp_store();
        std::fs::write(
            store.path(),
            r#"[{"user_id": 1, "username": "x", "expires": "2030-01-01T00:00:00.000Z"}]"#,
        )
        .unwrap();
        let users = store.load().unwrap();
        assert!(!users[0].is_vip);
        assert_eq!(users[0].referrals, 0);
        assert!(users[0].expires.is_some());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let (_dir, store) = temp_store();
        std::fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(store.load(), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_vip_active() {
        let now = Utc::now();
        let mut user = UserRecord::new(1, "x");
        assert!(!user.vip_active(now));

        user.is_vip = true;
        assert!(user.vip_active(now));

        user.expires = Some(now + Duration::days(1));
        assert!(user.vip_active(now));

        user.expires = Some(now - Duration::seconds(1));
        assert!(!user.vip_active(now));
    }
}

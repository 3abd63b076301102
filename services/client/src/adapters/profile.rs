//! services/client/src/adapters/profile.rs
//!
//! This module contains the local profile cache adapter, which is the
//! concrete implementation of the `ProfileStoreService` port from the `core`
//! crate. It keeps the last-known user profile and theme preference in a
//! single JSON file.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use study_tutor_core::domain::User;
use study_tutor_core::ports::{PortError, PortResult, ProfileStoreService};
use tracing::warn;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A file-backed adapter that implements the `ProfileStoreService` port.
#[derive(Clone)]
pub struct FileProfileStore {
    path: PathBuf,
}

impl FileProfileStore {
    /// Creates a new `FileProfileStore` rooted at the given file path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Reads and decodes the cache file. A missing or undecodable file is
    /// "no saved state", never an error.
    async fn read_record(&self) -> ProfileRecord {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(_) => return ProfileRecord::default(),
        };
        match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                warn!("Discarding corrupt profile cache: {}", e);
                ProfileRecord::default()
            }
        }
    }

    async fn write_record(&self, record: &ProfileRecord) -> PortResult<()> {
        let raw = serde_json::to_string_pretty(record)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        tokio::fs::write(&self.path, raw)
            .await
            .map_err(|e| PortError::Storage(e.to_string()))
    }
}

//=========================================================================================
// "Impure" Cache Record Structs
//=========================================================================================

#[derive(Default, Serialize, Deserialize)]
struct ProfileRecord {
    user: Option<UserRecord>,
    theme: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct UserRecord {
    id: i64,
    name: String,
    email: String,
    avatar: Option<String>,
}

impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            avatar: self.avatar,
        }
    }

    fn from_domain(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

//=========================================================================================
// `ProfileStoreService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ProfileStoreService for FileProfileStore {
    async fn load_profile(&self) -> PortResult<Option<User>> {
        Ok(self.read_record().await.user.map(UserRecord::to_domain))
    }

    async fn save_profile(&self, user: &User) -> PortResult<()> {
        let mut record = self.read_record().await;
        record.user = Some(UserRecord::from_domain(user));
        self.write_record(&record).await
    }

    async fn clear_profile(&self) -> PortResult<()> {
        let mut record = self.read_record().await;
        record.user = None;
        self.write_record(&record).await
    }

    async fn load_theme(&self) -> PortResult<Option<String>> {
        Ok(self.read_record().await.theme)
    }

    async fn save_theme(&self, theme: &str) -> PortResult<()> {
        let mut record = self.read_record().await;
        record.theme = Some(theme.to_string());
        self.write_record(&record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_loads_as_no_saved_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileProfileStore::new(dir.path().join("profile.json"));
        assert!(store.load_profile().await.unwrap().is_none());
        assert!(store.load_theme().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_file_loads_as_no_saved_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        tokio::fs::write(&path, "{not json at all").await.unwrap();
        let store = FileProfileStore::new(path);
        assert!(store.load_profile().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn profile_and_theme_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileProfileStore::new(dir.path().join("profile.json"));

        let user = User::new("Ada", "ada@example.com");
        store.save_profile(&user).await.unwrap();
        store.save_theme("dark").await.unwrap();

        assert_eq!(store.load_profile().await.unwrap(), Some(user));
        assert_eq!(store.load_theme().await.unwrap().as_deref(), Some("dark"));

        // Clearing the profile must leave the theme untouched.
        store.clear_profile().await.unwrap();
        assert!(store.load_profile().await.unwrap().is_none());
        assert_eq!(store.load_theme().await.unwrap().as_deref(), Some("dark"));
    }
}

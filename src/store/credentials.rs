//! Persistence for the single admin record.

use super::error::StorageError;
use super::fs::{read_json, write_json};
use super::models::{AdminRecord, AdminUpdate};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

/// File name of the admin record inside the data directory.
pub const ADMIN_FILE: &str = "admin.json";

/// Source of truth for the admin identity.
///
/// The record is loaded fresh on every authentication attempt. `save` is a
/// read-modify-write with last-writer-wins semantics; callers do not lock.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load the record. A missing or malformed record is an error; there is
    /// no fallback identity.
    async fn load(&self) -> Result<AdminRecord, StorageError>;

    /// Merge `update` into the stored record and persist it.
    async fn save(&self, update: AdminUpdate) -> Result<AdminRecord, StorageError>;

    /// Write a complete record, replacing whatever exists.
    async fn create(&self, record: &AdminRecord) -> Result<(), StorageError>;
}

/// `admin.json` on local disk.
pub struct FileCredentialStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(ADMIN_FILE),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    #[instrument(skip(self))]
    async fn load(&self) -> Result<AdminRecord, StorageError> {
        read_json(&self.path)
            .await?
            .ok_or_else(|| StorageError::Missing(self.path.display().to_string()))
    }

    #[instrument(skip(self))]
    async fn save(&self, update: AdminUpdate) -> Result<AdminRecord, StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut record = self.load().await?;
        update.apply_to(&mut record);
        write_json(&self.path, &record).await?;
        debug!(path = %self.path.display(), "admin record saved");
        Ok(record)
    }

    async fn create(&self, record: &AdminRecord) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        write_json(&self.path, record).await
    }
}

/// In-memory store for tests and embedding.
#[derive(Default)]
pub struct MemoryCredentialStore {
    record: RwLock<Option<AdminRecord>>,
}

impl MemoryCredentialStore {
    pub fn new(record: AdminRecord) -> Self {
        Self {
            record: RwLock::new(Some(record)),
        }
    }

    /// A store with no record, for exercising the missing-record path.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<AdminRecord> {
        self.record.read().clone()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<AdminRecord, StorageError> {
        self.record
            .read()
            .clone()
            .ok_or_else(|| StorageError::Missing("memory".to_string()))
    }

    async fn save(&self, update: AdminUpdate) -> Result<AdminRecord, StorageError> {
        let mut guard = self.record.write();
        let record = guard
            .as_mut()
            .ok_or_else(|| StorageError::Missing("memory".to_string()))?;
        update.apply_to(record);
        Ok(record.clone())
    }

    async fn create(&self, record: &AdminRecord) -> Result<(), StorageError> {
        *self.record.write() = Some(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::models::{AdminCredential, Role, SecuritySettings};
    use chrono::Utc;

    fn record() -> AdminRecord {
        AdminRecord {
            admin: AdminCredential {
                username: "admin".into(),
                password_hash: "$2b$04$placeholderplaceholderpl".into(),
                email: "admin@example.com".into(),
                role: Role::Admin,
                is_active: true,
                last_login: None,
                created_at: Utc::now(),
            },
            settings: SecuritySettings::default(),
        }
    }

    #[tokio::test]
    async fn test_file_store_missing_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path());
        assert!(!store.exists().await);
        assert!(matches!(store.load().await, Err(StorageError::Missing(_))));
        assert!(matches!(
            store.save(AdminUpdate::last_login(Utc::now())).await,
            Err(StorageError::Missing(_))
        ));
    }

    #[tokio::test]
    async fn test_file_store_malformed_record() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(ADMIN_FILE), r#"{"admin": {"username": 1}}"#).unwrap();
        let store = FileCredentialStore::new(dir.path());
        assert!(matches!(
            store.load().await,
            Err(StorageError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_file_store_create_and_merge() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path());
        let original = record();
        store.create(&original).await.unwrap();
        assert!(store.exists().await);

        let now = Utc::now();
        let saved = store.save(AdminUpdate::last_login(now)).await.unwrap();
        assert_eq!(saved.admin.last_login, Some(now));

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.admin.last_login, Some(now));
        assert_eq!(loaded.admin.password_hash, original.admin.password_hash);
        assert_eq!(loaded.admin.created_at, original.admin.created_at);
        assert_eq!(loaded.settings, original.settings);
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryCredentialStore::empty();
        assert!(store.load().await.is_err());

        store.create(&record()).await.unwrap();
        store
            .save(AdminUpdate {
                email: Some("new@example.com".into()),
                ..AdminUpdate::default()
            })
            .await
            .unwrap();
        assert_eq!(store.snapshot().unwrap().admin.email, "new@example.com");
    }
}

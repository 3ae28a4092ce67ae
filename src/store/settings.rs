//! Free-form site settings document (`settings.json`).

use super::error::StorageError;
use super::fs::{read_json, write_json};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

pub struct SettingsStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl SettingsStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("settings.json"),
            write_lock: Mutex::new(()),
        }
    }

    /// Current settings; `{}` when none have been saved yet.
    pub async fn get(&self) -> Result<Map<String, Value>, StorageError> {
        Ok(read_json(&self.path).await?.unwrap_or_default())
    }

    /// Shallow-merge `patch` into the stored settings.
    pub async fn update(&self, patch: Map<String, Value>) -> Result<Map<String, Value>, StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut settings = self.get().await?;
        settings.extend(patch);
        write_json(&self.path, &settings).await?;
        Ok(settings)
    }
}

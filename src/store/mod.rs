//! JSON-file persistence: the admin credential record and site content.

mod collections;
mod credentials;
mod error;
mod fs;
pub mod models;
mod settings;

pub use collections::{JsonCollection, Record};
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore, ADMIN_FILE};
pub use error::StorageError;
pub use settings::SettingsStore;

use models::{Client, Message, Project};
use std::path::Path;

/// All content documents under one data directory.
pub struct ContentStore {
    pub projects: JsonCollection<Project>,
    pub clients: JsonCollection<Client>,
    pub messages: JsonCollection<Message>,
    pub settings: SettingsStore,
}

impl ContentStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            projects: JsonCollection::new(data_dir),
            clients: JsonCollection::new(data_dir),
            messages: JsonCollection::new(data_dir),
            settings: SettingsStore::new(data_dir),
        }
    }
}

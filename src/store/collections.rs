//! JSON-file backed content collections (projects, clients, messages).
//!
//! Each collection lives in `{data_dir}/{name}.json` as `{ "{name}": [ ... ] }`.
//! Every mutation is a whole-document read-modify-write followed by an atomic
//! replace.

use super::error::StorageError;
use super::fs::{read_json, write_json};
use super::models::{Client, Message, Project, MESSAGE_STATUS_NEW, MESSAGE_STATUS_REPLIED};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

/// A record type stored in a [`JsonCollection`].
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Top-level key and file stem.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);

    /// Stamp creation fields and defaults on a freshly added record.
    fn on_create(&mut self, now: DateTime<Utc>);

    /// Stamp modification fields after a merge.
    fn on_update(&mut self, now: DateTime<Utc>);
}

impl Record for Project {
    const COLLECTION: &'static str = "projects";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn on_create(&mut self, now: DateTime<Utc>) {
        self.created_at = Some(now);
        self.updated_at = Some(now);
    }

    fn on_update(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }
}

impl Record for Client {
    const COLLECTION: &'static str = "clients";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn on_create(&mut self, now: DateTime<Utc>) {
        self.created_at = Some(now);
        self.last_contact = Some(now);
        self.total_projects = 0;
        self.total_revenue = 0.0;
    }

    fn on_update(&mut self, now: DateTime<Utc>) {
        self.last_contact = Some(now);
    }
}

impl Record for Message {
    const COLLECTION: &'static str = "messages";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn on_create(&mut self, now: DateTime<Utc>) {
        self.status = MESSAGE_STATUS_NEW.to_string();
        self.created_at = Some(now);
    }

    fn on_update(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }
}

/// A list of records persisted as one JSON document.
pub struct JsonCollection<T: Record> {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> JsonCollection<T> {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(format!("{}.json", T::COLLECTION)),
            write_lock: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    /// All records in stored order. A missing file is an empty collection.
    pub async fn list(&self) -> Result<Vec<T>, StorageError> {
        let doc: Option<Map<String, Value>> = read_json(&self.path).await?;
        let Some(mut doc) = doc else {
            return Ok(Vec::new());
        };
        match doc.remove(T::COLLECTION) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(list) => Ok(serde_json::from_value(list)?),
        }
    }

    async fn persist(&self, records: &[T]) -> Result<(), StorageError> {
        let mut doc = Map::new();
        doc.insert(T::COLLECTION.to_string(), serde_json::to_value(records)?);
        write_json(&self.path, &doc).await
    }

    /// Append `record` with a fresh id and creation stamps.
    #[instrument(skip(self, record), fields(collection = T::COLLECTION))]
    pub async fn add(&self, mut record: T) -> Result<T, StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.list().await?;
        record.set_id(next_id(records.iter().map(|r| r.id()))?);
        record.on_create(Utc::now());
        records.push(record.clone());
        self.persist(&records).await?;
        debug!(id = record.id(), "record added");
        Ok(record)
    }

    /// Shallow-merge `patch` (a JSON object) into the record with `id`.
    /// The id itself cannot be changed.
    #[instrument(skip(self, patch), fields(collection = T::COLLECTION))]
    pub async fn update(&self, id: &str, patch: Map<String, Value>) -> Result<T, StorageError> {
        self.modify(id, |record| {
            let mut merged = match serde_json::to_value(&*record)? {
                Value::Object(map) => map,
                _ => return Err(StorageError::Other("record is not an object".into())),
            };
            for (key, value) in patch {
                if key != "id" {
                    merged.insert(key, value);
                }
            }
            let mut updated: T = serde_json::from_value(Value::Object(merged))
                .map_err(|e| StorageError::Invalid(e.to_string()))?;
            updated.on_update(Utc::now());
            *record = updated;
            Ok(())
        })
        .await
    }

    /// Apply `f` to the record with `id` and persist the result.
    pub async fn modify<F>(&self, id: &str, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&mut T) -> Result<(), StorageError>,
    {
        let _guard = self.write_lock.lock().await;
        let mut records = self.list().await?;
        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| StorageError::NotFound(format!("{}/{}", T::COLLECTION, id)))?;
        f(record)?;
        let updated = record.clone();
        self.persist(&records).await?;
        Ok(updated)
    }

    /// Delete the record with `id`.
    #[instrument(skip(self), fields(collection = T::COLLECTION))]
    pub async fn remove(&self, id: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.list().await?;
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Err(StorageError::NotFound(format!("{}/{}", T::COLLECTION, id)));
        }
        self.persist(&records).await
    }
}

impl JsonCollection<Message> {
    /// Record an admin reply. Delivery is only logged; there is no mail transport.
    pub async fn reply(&self, id: &str, reply: String) -> Result<Message, StorageError> {
        let message = self
            .modify(id, |message| {
                let now = Utc::now();
                message.status = MESSAGE_STATUS_REPLIED.to_string();
                message.reply = Some(reply);
                message.replied_at = Some(now);
                message.updated_at = Some(now);
                Ok(())
            })
            .await?;
        info!(message_id = %message.id, "reply recorded, email delivery not configured");
        Ok(message)
    }
}

/// One past the largest numeric id in use. Ids that are not numbers are ignored.
fn next_id<'a>(ids: impl Iterator<Item = &'a str>) -> Result<String, StorageError> {
    let max = ids.filter_map(|id| id.parse::<u64>().ok()).max().unwrap_or(0);
    max.checked_add(1)
        .map(|id| id.to_string())
        .ok_or_else(|| StorageError::Invalid(format!("id space exhausted after {max}")))
}

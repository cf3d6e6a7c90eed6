//! Persistent queue of sync requests made while offline.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

pub const QUEUE_FILE: &str = "offline_queue.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncKind {
    UserData,
    RunData,
    FoodData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineItem {
    pub id: Uuid,
    pub kind: SyncKind,
    pub payload: serde_json::Value,
    /// Day document the payload belongs to.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub queued_at: DateTime<Utc>,
}

impl OfflineItem {
    pub fn new(kind: SyncKind, payload: serde_json::Value, date: Option<NaiveDate>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            payload,
            date,
            queued_at: Utc::now(),
        }
    }
}

/// FIFO queue mirrored to a JSON file after every change.
#[derive(Debug)]
pub struct OfflineQueue {
    items: Vec<OfflineItem>,
    queue_file: PathBuf,
}

impl OfflineQueue {
    pub fn new_with_path(path: PathBuf) -> Self {
        Self {
            items: Vec::new(),
            queue_file: path,
        }
    }

    /// Open `path`, loading any items persisted there. A corrupt file is
    /// logged and treated as empty.
    pub fn open(path: PathBuf) -> Self {
        let mut queue = Self::new_with_path(path);
        if let Err(e) = queue.load() {
            warn!(path = %queue.queue_file.display(), error = %e, "offline queue unreadable, starting empty");
            queue.items.clear();
        }
        queue
    }

    pub fn path(&self) -> &PathBuf {
        &self.queue_file
    }

    pub fn items(&self) -> &[OfflineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: OfflineItem) -> Result<(), std::io::Error> {
        self.items.push(item);
        self.persist()
    }

    pub fn remove(&mut self, id: Uuid) -> Result<Option<OfflineItem>, std::io::Error> {
        let removed = self
            .items
            .iter()
            .position(|i| i.id == id)
            .map(|index| self.items.remove(index));
        if removed.is_some() {
            self.persist()?;
        }
        Ok(removed)
    }

    pub fn clear(&mut self) -> Result<(), std::io::Error> {
        self.items.clear();
        self.persist()
    }

    /// Persist queue to disk.
    pub fn persist(&self) -> Result<(), std::io::Error> {
        let data = serde_json::to_string_pretty(&self.items)?;
        if let Some(parent) = self.queue_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.queue_file, data)?;
        Ok(())
    }

    /// Load queue from disk.
    pub fn load(&mut self) -> Result<(), std::io::Error> {
        if !self.queue_file.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(&self.queue_file)?;
        self.items = serde_json::from_str(&content)?;
        Ok(())
    }
}

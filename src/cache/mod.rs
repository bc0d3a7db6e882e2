use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::api::SanctionRecord;

pub mod storage;

pub use storage::SnapshotFile;

/// Immutable view of one dataset: records, refresh time and count.
///
/// `count` always equals `records.len()`; the only constructors compute it.
/// The serialized form (`data`, `lastUpdated`, `count`) is also the
/// persisted file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSnapshot {
    #[serde(rename = "data")]
    records: Vec<SanctionRecord>,
    last_updated: Option<DateTime<Utc>>,
    count: usize,
}

impl DatasetSnapshot {
    /// Snapshot of a dataset that has never been populated
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            last_updated: None,
            count: 0,
        }
    }

    pub fn new(records: Vec<SanctionRecord>, last_updated: DateTime<Utc>) -> Self {
        let count = records.len();
        Self {
            records,
            last_updated: Some(last_updated),
            count,
        }
    }

    pub fn records(&self) -> &[SanctionRecord] {
        &self.records
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// False for deserialized snapshots whose `count` disagrees with `data`
    pub fn is_consistent(&self) -> bool {
        self.count == self.records.len()
    }
}

impl Default for DatasetSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// In-memory holder of one dataset's current snapshot.
///
/// Writers build a complete snapshot and swap the pointer; the lock is held
/// only for the swap. Readers clone the `Arc` and keep a consistent view
/// for as long as they need it.
#[derive(Debug, Default)]
pub struct DatasetCache {
    current: RwLock<Arc<DatasetSnapshot>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot
    pub async fn get(&self) -> Arc<DatasetSnapshot> {
        self.current.read().await.clone()
    }

    /// Replace the whole dataset, stamped with the current time
    pub async fn replace(&self, records: Vec<SanctionRecord>) -> Arc<DatasetSnapshot> {
        let snapshot = Arc::new(DatasetSnapshot::new(records, Utc::now()));
        *self.current.write().await = snapshot.clone();
        snapshot
    }

    /// Install a previously persisted snapshot as-is
    pub async fn restore(&self, snapshot: DatasetSnapshot) -> Arc<DatasetSnapshot> {
        let snapshot = Arc::new(snapshot);
        *self.current.write().await = snapshot.clone();
        snapshot
    }

    pub async fn is_empty(&self) -> bool {
        self.current.read().await.is_empty()
    }
}

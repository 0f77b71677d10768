//! Persistence of [`CanonicalEvent`]s.
//!
//! Stores are append only: an event is inserted once and never updated or deleted. Listing
//! returns events sorted by their `timestamp` string in descending order. That string is the
//! human readable capture time, so the order is lexicographic: day of month first, then month
//! name, year and 12 hour clock. It isn't chronological across months, years or AM/PM.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task;

use crate::{config::StorageConfig, feed::CanonicalEvent};

mod disk;
pub use disk::DiskStore;

mod memory;
pub use memory::MemoryStore;

/// An event as returned by a store, along with the identifier the store assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub event: CanonicalEvent,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage backend failure: {0}")]
    Backend(#[from] sled::Error),
    #[error("couldn't encode event: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("stored record {id} is corrupt: {reason}")]
    Corrupt { id: String, reason: String },
    #[error("memory store lock was poisoned")]
    Poisoned,
    #[error("storage task failed: {0}")]
    Task(#[from] task::JoinError),
}

pub trait EventStore: Send + Sync {
    /// Appends `event` and returns the identifier it was stored under.
    fn insert(&self, event: &CanonicalEvent) -> Result<String, StoreError>;

    /// Returns every stored event, see the module documentation for the ordering.
    fn query_all(&self) -> Result<Vec<StoredEvent>, StoreError>;
}

/// Opens the store described by the configuration.
pub fn open(config: &StorageConfig) -> Result<Arc<dyn EventStore>, StoreError> {
    let store: Arc<dyn EventStore> = match config {
        StorageConfig::Sled { path, tree } => Arc::new(DiskStore::open(path, tree)?),
        StorageConfig::Memory => Arc::new(MemoryStore::new()),
    };

    Ok(store)
}

/// Sorts events by descending timestamp. `events` must be ordered newest insert first, which is
/// kept between events sharing a timestamp.
pub(crate) fn sort_newest_first(events: &mut [StoredEvent]) {
    events.sort_by(|a, b| b.event.timestamp.cmp(&a.event.timestamp));
}

/// Handle to the event store shared by the HTTP routes.
///
/// Backends block, so calls are moved to tokio's blocking thread pool.
#[derive(Clone)]
pub struct Store(pub Arc<dyn EventStore>);

impl Store {
    pub async fn insert(&self, event: CanonicalEvent) -> Result<String, StoreError> {
        let store = Arc::clone(&self.0);
        task::spawn_blocking(move || store.insert(&event)).await?
    }

    pub async fn query_all(&self) -> Result<Vec<StoredEvent>, StoreError> {
        let store = Arc::clone(&self.0);
        task::spawn_blocking(move || store.query_all()).await?
    }
}

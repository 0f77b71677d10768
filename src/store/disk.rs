use std::path::Path;

use tracing::{debug, info};

use crate::{
    feed::CanonicalEvent,
    store::{sort_newest_first, EventStore, StoreError, StoredEvent},
};

/// Events persisted in a [`sled`] tree, keyed by big endian ids from [`sled::Db::generate_id`]
/// and encoded as JSON.
pub struct DiskStore {
    db: sled::Db,
    tree: sled::Tree,
}

impl DiskStore {
    /// Opens (or creates) the database at `path` and the tree named `tree` inside it.
    pub fn open(path: &Path, tree: &str) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        info!("opened event store at {} (tree `{}`)", path.display(), tree);
        Self::with_db(db, tree)
    }

    pub fn with_db(db: sled::Db, tree: &str) -> Result<Self, StoreError> {
        let tree = db.open_tree(tree)?;
        Ok(Self { db, tree })
    }
}

impl EventStore for DiskStore {
    fn insert(&self, event: &CanonicalEvent) -> Result<String, StoreError> {
        let id = self.db.generate_id()?;
        let value = serde_json::to_vec(event).map_err(StoreError::Encode)?;

        self.tree.insert(id.to_be_bytes(), value)?;
        self.tree.flush()?;
        debug!("inserted event {} into sled tree", id);

        Ok(id.to_string())
    }

    fn query_all(&self) -> Result<Vec<StoredEvent>, StoreError> {
        let mut events = self
            .tree
            .iter()
            .rev()
            .map(|entry| {
                let (key, value) = entry?;
                decode(&key, &value)
            })
            .collect::<Result<Vec<_>, _>>()?;
        sort_newest_first(&mut events);

        Ok(events)
    }
}

fn decode(key: &[u8], value: &[u8]) -> Result<StoredEvent, StoreError> {
    let id = match <[u8; 8]>::try_from(key) {
        Ok(bytes) => u64::from_be_bytes(bytes).to_string(),
        Err(_) => {
            return Err(StoreError::Corrupt {
                id: format!("{:?}", key),
                reason: "key isn't a 64 bit id".to_string(),
            })
        }
    };

    match serde_json::from_slice(value) {
        Ok(event) => Ok(StoredEvent { id, event }),
        Err(e) => Err(StoreError::Corrupt {
            id,
            reason: e.to_string(),
        }),
    }
}

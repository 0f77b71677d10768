use std::sync::Mutex;

use crate::{
    feed::CanonicalEvent,
    store::{sort_newest_first, EventStore, StoreError, StoredEvent},
};

/// Keeps events in process memory, nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    events: Vec<StoredEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Default::default()
    }
}

impl EventStore for MemoryStore {
    fn insert(&self, event: &CanonicalEvent) -> Result<String, StoreError> {
        let mut inner = self.inner.lock().map_err(|_| StoreError::Poisoned)?;

        let id = inner.next_id.to_string();
        inner.next_id += 1;
        inner.events.push(StoredEvent {
            id: id.clone(),
            event: event.clone(),
        });

        Ok(id)
    }

    fn query_all(&self) -> Result<Vec<StoredEvent>, StoreError> {
        let inner = self.inner.lock().map_err(|_| StoreError::Poisoned)?;

        let mut events: Vec<StoredEvent> = inner.events.iter().rev().cloned().collect();
        sort_newest_first(&mut events);

        Ok(events)
    }
}

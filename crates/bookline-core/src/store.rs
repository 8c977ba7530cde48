//! Abstract object store and the in-memory reference implementation.
//!
//! Persistence layout is entirely the store's concern; the engine only
//! needs insert/delete/save and a parent-id query for follow-up retirement.
//! Failures are surfaced to the caller, never swallowed at this layer, and
//! in-memory state may run ahead of persisted state until the next
//! successful `save`.

use std::sync::Mutex;

use crate::error::StoreError;
use crate::item::SchedulableItem;

/// External object store interface.
pub trait Store: Send + Sync {
    fn insert(&self, item: &SchedulableItem) -> Result<(), StoreError>;

    /// Remove by id. Removing an id that is already gone is not an error,
    /// so retirement passes can safely run twice.
    fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Flush pending writes.
    fn save(&self) -> Result<(), StoreError>;

    /// All items whose `related_parent_id` equals `parent_id`.
    fn fetch_by_parent(&self, parent_id: &str) -> Result<Vec<SchedulableItem>, StoreError>;
}

/// Mutex-guarded in-memory store. Reference implementation used by tests
/// and as the backing for the CLI's JSON file store.
#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<Vec<SchedulableItem>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing items.
    pub fn with_items(items: Vec<SchedulableItem>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }

    /// Snapshot of everything currently held.
    pub fn items(&self) -> Vec<SchedulableItem> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SchedulableItem>> {
        self.items.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Store for MemoryStore {
    fn insert(&self, item: &SchedulableItem) -> Result<(), StoreError> {
        self.lock().push(item.clone());
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.lock().retain(|i| i.id != id);
        Ok(())
    }

    fn save(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn fetch_by_parent(&self, parent_id: &str) -> Result<Vec<SchedulableItem>, StoreError> {
        Ok(self
            .lock()
            .iter()
            .filter(|i| i.related_parent_id.as_deref() == Some(parent_id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn insert_delete_roundtrip() {
        let store = MemoryStore::new();
        let item = SchedulableItem::new("Reorder wax", Utc::now());
        let id = item.id.clone();

        store.insert(&item).unwrap();
        assert_eq!(store.len(), 1);

        store.delete(&id).unwrap();
        store.delete(&id).unwrap(); // second delete is a no-op
        assert!(store.is_empty());
    }

    #[test]
    fn fetch_by_parent_filters() {
        let store = MemoryStore::new();
        let mut child = SchedulableItem::new("Follow up: Cut", Utc::now());
        child.related_parent_id = Some("parent-1".to_string());
        let unrelated = SchedulableItem::new("Sweep", Utc::now());

        store.insert(&child).unwrap();
        store.insert(&unrelated).unwrap();

        let found = store.fetch_by_parent("parent-1").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, child.id);
        assert!(store.fetch_by_parent("parent-2").unwrap().is_empty());
    }
}

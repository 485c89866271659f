//! The three inventory stores.
//!
//! General and hint items are plain bags that live for one room. Important
//! items survive room transitions: every mutation is written to durable
//! storage and the store reloads that record when it is opened.
//!
//! ## Persisted layout
//!
//! One record under [`IMPORTANT_ITEMS_KEY`], a flat JSON object of item
//! names to positive counts: `{"Data Chip":1,"Missing Lever":1}`.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::bag::{CountedBag, ItemMap};
use super::storage::KeyValueStorage;

/// Session items. Cleared on every room entry.
pub type ItemStore = CountedBag;

/// Hint items. Cleared on every room entry and when the game is torn down.
pub type HintItemStore = CountedBag;

/// Storage key for the important-item record.
pub const IMPORTANT_ITEMS_KEY: &str = "escapeGameImportantItems";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("important-item record is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// The persisted record. Serializes as the bare name-to-count object.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
struct ImportantRecord(ItemMap);

pub struct ImportantItemStore {
    bag: CountedBag,
    storage: Box<dyn KeyValueStorage>,
}

impl ImportantItemStore {
    /// Open the store, loading whatever the storage holds.
    /// A missing record means an empty store; a corrupt one is logged and
    /// discarded.
    pub fn open(storage: Box<dyn KeyValueStorage>) -> Self {
        let items = read_record(storage.as_ref());
        Self {
            bag: CountedBag::from_items(items),
            storage,
        }
    }

    /// Re-read the durable record, replacing the in-memory mapping.
    pub fn reload(&mut self) {
        let items = read_record(self.storage.as_ref());
        self.bag.replace(items);
    }

    pub fn add(&mut self, name: &str, count: u32) {
        self.bag.add(name, count);
        debug!(item = name, count = self.bag.count(name), "important item added");
        self.persist();
    }

    pub fn remove(&mut self, name: &str, count: u32) -> bool {
        let removed = self.bag.remove(name, count);
        if removed {
            self.persist();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.bag.clear();
        self.persist();
    }

    pub fn has(&self, name: &str, count: u32) -> bool {
        self.bag.has(name, count)
    }

    pub fn count(&self, name: &str) -> u32 {
        self.bag.count(name)
    }

    pub fn items(&self) -> &ItemMap {
        self.bag.items()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&ItemMap) + 'static) {
        self.bag.subscribe(listener);
    }

    /// Write the full mapping. Failures are logged and swallowed.
    fn persist(&mut self) {
        let record = ImportantRecord(self.bag.items().clone());
        let json = match serde_json::to_string(&record) {
            Ok(j) => j,
            Err(e) => {
                warn!(error = %e, "failed to serialize important items");
                return;
            }
        };
        if let Err(e) = self.storage.save(IMPORTANT_ITEMS_KEY, &json) {
            warn!(error = %e, "failed to persist important items");
        }
    }
}

fn parse_record(json: &str) -> Result<ItemMap, PersistError> {
    let ImportantRecord(items) = serde_json::from_str(json)?;
    Ok(items)
}

fn read_record(storage: &dyn KeyValueStorage) -> ItemMap {
    let Some(json) = storage.load(IMPORTANT_ITEMS_KEY) else {
        return ItemMap::new();
    };
    match parse_record(&json) {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, "discarding important items");
            ItemMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escape::storage::{MemoryStorage, StorageError};

    struct BrokenStorage;

    impl KeyValueStorage for BrokenStorage {
        fn load(&self, _key: &str) -> Option<String> {
            None
        }

        fn save(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }
    }

    #[test]
    fn every_mutation_is_persisted() {
        let handle = MemoryStorage::new();
        let mut store = ImportantItemStore::open(Box::new(handle.clone()));

        store.add("Missing Lever", 1);
        assert_eq!(
            handle.get(IMPORTANT_ITEMS_KEY).as_deref(),
            Some(r#"{"Missing Lever":1}"#)
        );

        store.add("Data Chip", 1);
        assert!(store.remove("Missing Lever", 1));
        assert_eq!(
            handle.get(IMPORTANT_ITEMS_KEY).as_deref(),
            Some(r#"{"Data Chip":1}"#)
        );

        store.clear();
        assert_eq!(handle.get(IMPORTANT_ITEMS_KEY).as_deref(), Some("{}"));
    }

    #[test]
    fn reopening_restores_items() {
        let handle = MemoryStorage::new();
        {
            let mut store = ImportantItemStore::open(Box::new(handle.clone()));
            store.add("Experimenter's Key", 2);
        }
        let store = ImportantItemStore::open(Box::new(handle));
        assert!(store.has("Experimenter's Key", 2));
    }

    #[test]
    fn missing_record_opens_empty() {
        let store = ImportantItemStore::open(Box::new(MemoryStorage::new()));
        assert!(store.items().is_empty());
    }

    #[test]
    fn corrupt_record_falls_back_to_empty() {
        let storage = MemoryStorage::with_entry(IMPORTANT_ITEMS_KEY, "{not json");
        let store = ImportantItemStore::open(Box::new(storage));
        assert!(store.items().is_empty());
    }

    #[test]
    fn negative_count_is_corrupt() {
        let storage = MemoryStorage::with_entry(IMPORTANT_ITEMS_KEY, r#"{"Data Chip":-1}"#);
        let store = ImportantItemStore::open(Box::new(storage));
        assert!(store.items().is_empty());
    }

    #[test]
    fn zero_count_entries_are_dropped() {
        let storage =
            MemoryStorage::with_entry(IMPORTANT_ITEMS_KEY, r#"{"Data Chip":0,"Missing Lever":1}"#);
        let store = ImportantItemStore::open(Box::new(storage));
        assert_eq!(store.items().len(), 1);
        assert!(store.has("Missing Lever", 1));
    }

    #[test]
    fn record_is_a_bare_object() {
        let mut items = ItemMap::new();
        items.insert("Data Chip".into(), 1);
        let json = serde_json::to_string(&ImportantRecord(items.clone())).unwrap();
        assert_eq!(json, r#"{"Data Chip":1}"#);
        assert_eq!(parse_record(&json).unwrap(), items);
    }

    #[test]
    fn parse_error_is_reported_as_corrupt() {
        let err = parse_record("[1,2]").unwrap_err();
        assert!(err.to_string().starts_with("important-item record is corrupt"));
    }

    #[test]
    fn write_failure_keeps_in_memory_state() {
        let mut store = ImportantItemStore::open(Box::new(BrokenStorage));
        store.add("Data Chip", 1);
        assert!(store.has("Data Chip", 1));
    }

    #[test]
    fn remove_absent_does_not_write() {
        let handle = MemoryStorage::new();
        let mut store = ImportantItemStore::open(Box::new(handle.clone()));
        assert!(!store.remove("Data Chip", 1));
        assert_eq!(handle.get(IMPORTANT_ITEMS_KEY), None);
    }

    #[test]
    fn reload_picks_up_external_writes() {
        let handle = MemoryStorage::new();
        let mut store = ImportantItemStore::open(Box::new(handle.clone()));
        let mut other = handle.clone();
        other
            .save(IMPORTANT_ITEMS_KEY, r#"{"Switch Order Hint":1}"#)
            .unwrap();
        store.reload();
        assert!(store.has("Switch Order Hint", 1));
    }
}

//! In-memory stores - HashMap-backed record and history stores for
//! testing and development.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{HistoryStore, RecordStore, StoreError};
use crate::record::{HistoricalEntry, LatestRecord};

/// Internal row representation of a latest record.
///
/// The payload is kept as serialized bytes; `version` is the stamp the
/// conditional save compares against and is authoritative.
struct StoredRecord {
    bytes: Vec<u8>,
    version: u64,
}

/// In-memory record store backed by a HashMap.
///
/// Clone-friendly via Arc; clones share storage.
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    storage: Arc<RwLock<HashMap<u64, StoredRecord>>>,
}

impl InMemoryRecordStore {
    /// Create a new empty record store.
    pub fn new() -> Self {
        Self::default()
    }

    fn to_row(record: &LatestRecord) -> Result<Vec<u8>, StoreError> {
        serde_json::to_vec(&record.value).map_err(|e| StoreError::Serde(e.to_string()))
    }

    fn from_row(id: u64, stored: &StoredRecord) -> Result<LatestRecord, StoreError> {
        let value: String = serde_json::from_slice(&stored.bytes)
            .map_err(|e| StoreError::Serde(e.to_string()))?;
        Ok(LatestRecord {
            id,
            value,
            version: stored.version,
        })
    }
}

impl RecordStore for InMemoryRecordStore {
    fn get(&self, id: u64) -> Result<Option<LatestRecord>, StoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::LockPoisoned("get"))?;

        match storage.get(&id) {
            Some(stored) => Ok(Some(Self::from_row(id, stored)?)),
            None => Ok(None),
        }
    }

    fn insert(&self, record: &LatestRecord) -> Result<(), StoreError> {
        let bytes = Self::to_row(record)?;

        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::LockPoisoned("insert"))?;

        if storage.contains_key(&record.id) {
            return Err(StoreError::AlreadyExists { id: record.id });
        }

        storage.insert(
            record.id,
            StoredRecord {
                bytes,
                version: record.version,
            },
        );

        Ok(())
    }

    fn conditional_save(
        &self,
        record: &LatestRecord,
        expected_version: u64,
    ) -> Result<(), StoreError> {
        let bytes = Self::to_row(record)?;

        // Check and write happen under the same write guard; that is the
        // compare-and-set the contract requires.
        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::LockPoisoned("conditional_save"))?;

        let actual = storage
            .get(&record.id)
            .map(|s| s.version)
            .ok_or(StoreError::NotFound { id: record.id })?;

        if actual != expected_version {
            return Err(StoreError::VersionConflict {
                id: record.id,
                expected: expected_version,
                actual,
            });
        }

        storage.insert(
            record.id,
            StoredRecord {
                bytes,
                version: expected_version + 1,
            },
        );

        Ok(())
    }
}

/// In-memory append-only history store.
///
/// Rows are bitcode-encoded entries, kept per id in insertion order.
#[derive(Clone, Default)]
pub struct InMemoryHistoryStore {
    storage: Arc<RwLock<HashMap<u64, Vec<Vec<u8>>>>>,
}

impl InMemoryHistoryStore {
    /// Create a new empty history store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn append(&self, entry: &HistoricalEntry) -> Result<(), StoreError> {
        let bytes =
            bitcode::serialize(entry).map_err(|e| StoreError::Serde(e.to_string()))?;

        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::LockPoisoned("append"))?;

        storage.entry(entry.entity_id).or_default().push(bytes);
        Ok(())
    }

    fn entries(&self, entity_id: u64) -> Result<Vec<HistoricalEntry>, StoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::LockPoisoned("entries"))?;

        storage
            .get(&entity_id)
            .map(|rows| {
                rows.iter()
                    .map(|bytes| {
                        bitcode::deserialize(bytes)
                            .map_err(|e| StoreError::Serde(e.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

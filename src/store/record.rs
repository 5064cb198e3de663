//! RecordStore - Versioned storage for latest records.

use super::StoreError;
use crate::record::LatestRecord;

/// Versioned storage for latest records, one per entity id.
pub trait RecordStore: Send + Sync {
    /// Point lookup. Returns None if the id has never been added.
    fn get(&self, id: u64) -> Result<Option<LatestRecord>, StoreError>;

    /// Insert the initial record for an id.
    /// Fails with `AlreadyExists` if a record for the id is present.
    fn insert(&self, record: &LatestRecord) -> Result<(), StoreError>;

    /// Persist `record` only if the stored version for its id still equals
    /// `expected_version`; otherwise fail with `VersionConflict`.
    ///
    /// The version check and the write must be a single atomic step at the
    /// storage layer. On success the stored version becomes
    /// `expected_version + 1` (the caller builds `record` with that
    /// version) and the write is visible to subsequent `get` calls.
    fn conditional_save(
        &self,
        record: &LatestRecord,
        expected_version: u64,
    ) -> Result<(), StoreError>;
}

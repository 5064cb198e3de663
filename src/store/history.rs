//! HistoryStore - Append-only storage for superseded values.

use super::StoreError;
use crate::record::HistoricalEntry;

/// Append-only storage for superseded values.
///
/// Entries are never updated or deleted. Per-id insertion order carries
/// meaning: it is the oldest-to-newest supersession trail.
pub trait HistoryStore: Send + Sync {
    /// Unconditional append. No uniqueness, no version check.
    fn append(&self, entry: &HistoricalEntry) -> Result<(), StoreError>;

    /// All entries for an id, oldest first.
    fn entries(&self, entity_id: u64) -> Result<Vec<HistoricalEntry>, StoreError>;
}

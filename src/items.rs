use crate::archiver::Archiver;
use crate::record::{HistoricalEntry, LatestRecord};
use crate::store::{HistoryStore, RecordStore, StoreError};
use crate::updater::{RetryPolicy, UpdateEngine, UpdateError, UpdateOutcome};

/// Latest-plus-history item service: the update engine wired to the
/// archiver over a record/history store pair.
///
/// Composition is explicit constructor wiring; both stores arrive as
/// plain parameters. Shareable across threads behind `Arc` whenever the
/// stores are `Send + Sync`.
pub struct ItemUpdater<R, H> {
    engine: UpdateEngine<R>,
    archiver: Archiver<H>,
}

impl<R: RecordStore, H: HistoryStore> ItemUpdater<R, H> {
    /// Wire the stores with the default retry policy.
    pub fn new(records: R, history: H) -> Self {
        Self::with_policy(records, history, RetryPolicy::default())
    }

    pub fn with_policy(records: R, history: H, policy: RetryPolicy) -> Self {
        ItemUpdater {
            engine: UpdateEngine::with_policy(records, policy),
            archiver: Archiver::new(history),
        }
    }

    /// Create the initial record for `id` at version 0. The initial value
    /// is never archived; only values displaced by a later update are.
    pub fn add_item(&self, id: u64, value: &str) -> Result<LatestRecord, StoreError> {
        let record = LatestRecord::new(id, value);
        self.engine.records().insert(&record)?;
        Ok(record)
    }

    /// Replace the latest value for `id` and archive the value it
    /// displaced.
    ///
    /// The two stores are not covered by one transaction. If the archive
    /// append fails after the latest write committed, the error surfaces
    /// as `UpdateError::ArchivalFailed` and the committed write stands;
    /// the trail is then short one entry until reconciled out of band.
    pub fn update_item(&self, id: u64, value: &str) -> Result<UpdateOutcome, UpdateError> {
        let outcome = self.engine.update_item(id, value)?;

        if let UpdateOutcome::Committed { superseded, .. } = &outcome {
            self.archiver
                .archive(superseded)
                .map_err(|source| UpdateError::ArchivalFailed { id, source })?;
        }

        Ok(outcome)
    }

    /// Current latest record for `id`, if any.
    pub fn latest(&self, id: u64) -> Result<Option<LatestRecord>, StoreError> {
        self.engine.records().get(id)
    }

    /// Supersession trail for `id`, oldest first.
    pub fn history(&self, id: u64) -> Result<Vec<HistoricalEntry>, StoreError> {
        self.archiver.history().entries(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryHistoryStore, InMemoryRecordStore};

    fn updater() -> ItemUpdater<InMemoryRecordStore, InMemoryHistoryStore> {
        ItemUpdater::new(InMemoryRecordStore::new(), InMemoryHistoryStore::new())
    }

    #[test]
    fn add_creates_version_zero_and_no_history() {
        let items = updater();

        let record = items.add_item(1, "a").unwrap();
        assert_eq!(record.version, 0);
        assert!(items.history(1).unwrap().is_empty());
    }

    #[test]
    fn add_of_duplicate_id_is_rejected() {
        let items = updater();

        items.add_item(1, "a").unwrap();
        let err = items.add_item(1, "again").unwrap_err();
        assert_eq!(err, StoreError::AlreadyExists { id: 1 });
    }

    #[test]
    fn update_archives_the_displaced_value() {
        let items = updater();
        items.add_item(1, "a").unwrap();

        let outcome = items.update_item(1, "b").unwrap();
        assert_eq!(outcome.superseded().unwrap().value, "a");

        assert_eq!(items.latest(1).unwrap().unwrap().value, "b");
        let trail = items.history(1).unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].value, "a");
    }

    #[test]
    fn update_of_missing_id_touches_neither_store() {
        let items = updater();

        let outcome = items.update_item(404, "x").unwrap();
        assert_eq!(outcome, UpdateOutcome::NotFound);
        assert!(items.latest(404).unwrap().is_none());
        assert!(items.history(404).unwrap().is_empty());
    }
}

//! UpdateEngine - Bounded read-modify-conditional-write loop.

use log::{debug, info, warn};

use super::{RetryPolicy, UpdateError, UpdateOutcome};
use crate::store::RecordStore;

/// Performs optimistic updates against a record store.
///
/// Each cycle re-reads the latest record, derives the next candidate, and
/// attempts a conditional save pinned to the version it just read. A
/// version conflict discards the candidate and starts the cycle over with
/// a fresh read; nothing is merged, the freshly read record is the new
/// base. The loop is explicit and bounded, so the attempt cap is a plain
/// loop condition rather than recursion depth.
///
/// Safe to call concurrently from any number of threads; all mutual
/// exclusion is delegated to `RecordStore::conditional_save`.
pub struct UpdateEngine<R> {
    records: R,
    policy: RetryPolicy,
}

impl<R: RecordStore> UpdateEngine<R> {
    /// An engine with the default retry policy (10 attempts, no backoff).
    pub fn new(records: R) -> Self {
        Self::with_policy(records, RetryPolicy::default())
    }

    pub fn with_policy(records: R, policy: RetryPolicy) -> Self {
        UpdateEngine { records, policy }
    }

    pub fn records(&self) -> &R {
        &self.records
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Replace the latest value for `id`, returning the value the write
    /// displaced so the caller can archive it.
    ///
    /// An id with no record is a no-op, reported as
    /// `UpdateOutcome::NotFound` with neither store touched. Sustained
    /// contention past the attempt cap surfaces
    /// `UpdateError::RetriesExhausted`; any store error other than a
    /// version conflict propagates immediately.
    pub fn update_item(&self, id: u64, value: &str) -> Result<UpdateOutcome, UpdateError> {
        let max_attempts = self.policy.max_attempts();

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                self.policy.pause(attempt - 1);
            }

            let current = match self.records.get(id)? {
                Some(record) => record,
                None => return Ok(UpdateOutcome::NotFound),
            };

            let (candidate, superseded) = current.next(value);
            debug!(
                "(??) record {}: \"{}\" -> \"{}\" at version {}",
                id, superseded.value, candidate.value, candidate.version
            );

            match self.records.conditional_save(&candidate, current.version) {
                Ok(()) => {
                    info!(
                        "(ok) record {}: \"{}\" -> \"{}\" at version {}",
                        id, superseded.value, candidate.value, candidate.version
                    );
                    return Ok(UpdateOutcome::Committed {
                        superseded,
                        version: candidate.version,
                    });
                }
                Err(err) if err.is_version_conflict() => {
                    warn!(
                        "(!!) record {}: {} (attempt {}/{})",
                        id, err, attempt, max_attempts
                    );
                }
                Err(err) => return Err(UpdateError::Store(err)),
            }
        }

        Err(UpdateError::RetriesExhausted {
            id,
            attempts: max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::record::LatestRecord;
    use crate::store::{InMemoryRecordStore, StoreError};

    /// Record store whose conditional saves always report a conflict.
    struct ContendedStore {
        inner: InMemoryRecordStore,
        saves: AtomicU32,
    }

    impl ContendedStore {
        fn with_record(record: &LatestRecord) -> Self {
            let inner = InMemoryRecordStore::new();
            inner.insert(record).unwrap();
            ContendedStore {
                inner,
                saves: AtomicU32::new(0),
            }
        }

        fn saves(&self) -> u32 {
            self.saves.load(Ordering::SeqCst)
        }
    }

    impl RecordStore for ContendedStore {
        fn get(&self, id: u64) -> Result<Option<LatestRecord>, StoreError> {
            self.inner.get(id)
        }

        fn insert(&self, record: &LatestRecord) -> Result<(), StoreError> {
            self.inner.insert(record)
        }

        fn conditional_save(
            &self,
            record: &LatestRecord,
            expected_version: u64,
        ) -> Result<(), StoreError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::VersionConflict {
                id: record.id,
                expected: expected_version,
                actual: expected_version + 1,
            })
        }
    }

    /// Record store that is unreachable for every operation.
    struct DownStore;

    impl RecordStore for DownStore {
        fn get(&self, _id: u64) -> Result<Option<LatestRecord>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        fn insert(&self, _record: &LatestRecord) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        fn conditional_save(
            &self,
            _record: &LatestRecord,
            _expected_version: u64,
        ) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    #[test]
    fn update_commits_and_returns_superseded_value() {
        let records = InMemoryRecordStore::new();
        records.insert(&LatestRecord::new(1, "a")).unwrap();
        let engine = UpdateEngine::new(records);

        let outcome = engine.update_item(1, "b").unwrap();
        assert_eq!(outcome.superseded().unwrap().value, "a");

        let latest = engine.records().get(1).unwrap().unwrap();
        assert_eq!(latest.value, "b");
        assert_eq!(latest.version, 1);
    }

    #[test]
    fn update_of_missing_id_is_a_noop() {
        let engine = UpdateEngine::new(InMemoryRecordStore::new());
        let outcome = engine.update_item(404, "x").unwrap();
        assert_eq!(outcome, UpdateOutcome::NotFound);
    }

    #[test]
    fn sustained_conflicts_exhaust_the_attempt_cap() {
        let store = ContendedStore::with_record(&LatestRecord::new(1, "a"));
        let engine = UpdateEngine::with_policy(store, RetryPolicy::new(10));

        let err = engine.update_item(1, "b").unwrap_err();
        assert_eq!(
            err,
            UpdateError::RetriesExhausted {
                id: 1,
                attempts: 10,
            }
        );
        assert_eq!(engine.records().saves(), 10);
    }

    #[test]
    fn attempt_cap_of_one_means_a_single_save() {
        let store = ContendedStore::with_record(&LatestRecord::new(1, "a"));
        let engine = UpdateEngine::with_policy(store, RetryPolicy::new(1));

        let err = engine.update_item(1, "b").unwrap_err();
        assert_eq!(err, UpdateError::RetriesExhausted { id: 1, attempts: 1 });
        assert_eq!(engine.records().saves(), 1);
    }

    #[test]
    fn transport_errors_are_not_retried() {
        let engine = UpdateEngine::new(DownStore);
        let err = engine.update_item(1, "b").unwrap_err();
        assert!(matches!(
            err,
            UpdateError::Store(StoreError::Unavailable(_))
        ));
    }
}

//! Updater - The optimistic read-modify-write core.
//!
//! `UpdateEngine` performs the read → compute-next → conditional-save
//! cycle and retries it on version conflicts, up to the bound set by
//! `RetryPolicy`. Conflicts are the only error kind consumed here; every
//! other store error propagates to the caller untouched.

mod engine;
mod retry;

use std::fmt;

use crate::record::HistoricalEntry;
use crate::store::StoreError;

/// Result of a completed update call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The conditional save committed. `superseded` holds the value the
    /// write displaced; `version` is the newly stored version.
    Committed {
        superseded: HistoricalEntry,
        version: u64,
    },
    /// No record exists for the id. Nothing was read-modified or written.
    NotFound,
}

impl UpdateOutcome {
    /// The displaced value, if the update committed.
    pub fn superseded(&self) -> Option<&HistoricalEntry> {
        match self {
            UpdateOutcome::Committed { superseded, .. } => Some(superseded),
            UpdateOutcome::NotFound => None,
        }
    }
}

/// Error type surfaced past the retry boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateError {
    /// Every attempt hit a version conflict; contention outlasted the
    /// configured attempt cap.
    RetriesExhausted { id: u64, attempts: u32 },
    /// The latest write committed but the history append failed. The
    /// committed write is not rolled back.
    ArchivalFailed { id: u64, source: StoreError },
    /// Non-conflict store failure, propagated untouched.
    Store(StoreError),
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateError::RetriesExhausted { id, attempts } => write!(
                f,
                "update of record {} abandoned after {} conflicting attempts",
                id, attempts
            ),
            UpdateError::ArchivalFailed { id, source } => write!(
                f,
                "record {} updated but its previous value was not archived: {}",
                id, source
            ),
            UpdateError::Store(err) => write!(f, "store error: {}", err),
        }
    }
}

impl std::error::Error for UpdateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UpdateError::ArchivalFailed { source, .. } => Some(source),
            UpdateError::Store(source) => Some(source),
            UpdateError::RetriesExhausted { .. } => None,
        }
    }
}

impl From<StoreError> for UpdateError {
    fn from(err: StoreError) -> Self {
        UpdateError::Store(err)
    }
}

pub use engine::UpdateEngine;
pub use retry::RetryPolicy;

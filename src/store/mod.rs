//! Stores - Persistence contracts for the latest/history record pair.
//!
//! Two collections back the pattern: a record store holding exactly one
//! versioned `LatestRecord` per id, and an append-only history store of
//! the values those records used to hold. The record store's
//! `conditional_save` is the only mutual-exclusion primitive in the
//! crate; everything above it is lock-free.

mod history;
mod in_memory;
mod record;

use std::fmt;

/// Error type for store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The stored version no longer matches what the writer observed.
    VersionConflict { id: u64, expected: u64, actual: u64 },
    /// Insert attempted for an id that already has a record.
    AlreadyExists { id: u64 },
    /// Conditional save against an id with no record.
    NotFound { id: u64 },
    /// A store lock was poisoned by a panicking writer.
    LockPoisoned(&'static str),
    /// Row (de)serialization error.
    Serde(String),
    /// The backend could not be reached.
    Unavailable(String),
}

impl StoreError {
    /// True for the one error kind the update engine retries.
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, StoreError::VersionConflict { .. })
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::VersionConflict {
                id,
                expected,
                actual,
            } => write!(
                f,
                "version conflict on record {} (expected version {}, actual {})",
                id, expected, actual
            ),
            StoreError::AlreadyExists { id } => {
                write!(f, "record {} already exists", id)
            }
            StoreError::NotFound { id } => write!(f, "record {} not found", id),
            StoreError::LockPoisoned(operation) => {
                write!(f, "store lock poisoned during {}", operation)
            }
            StoreError::Serde(msg) => write!(f, "row serialization error: {}", msg),
            StoreError::Unavailable(msg) => write!(f, "store unavailable: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

pub use history::HistoryStore;
pub use in_memory::{InMemoryHistoryStore, InMemoryRecordStore};
pub use record::RecordStore;

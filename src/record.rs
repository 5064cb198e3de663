use serde::{Deserialize, Serialize};

/// The single mutable record holding an entity's current value.
///
/// Exactly one exists per id. `version` starts at 0 when the record is
/// first added and moves up by exactly 1 on every committed update, so it
/// always equals the number of updates ever committed for the id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestRecord {
    pub id: u64,
    pub value: String,
    pub version: u64,
}

impl LatestRecord {
    /// The initial record for an id, at version 0.
    pub fn new(id: u64, value: impl Into<String>) -> Self {
        LatestRecord {
            id,
            value: value.into(),
            version: 0,
        }
    }

    /// Derive the candidate for the next write along with the entry that
    /// commits will displace: the candidate carries the new value at
    /// `version + 1`, the entry carries the current value.
    pub fn next(&self, value: impl Into<String>) -> (LatestRecord, HistoricalEntry) {
        (
            LatestRecord {
                id: self.id,
                value: value.into(),
                version: self.version + 1,
            },
            HistoricalEntry {
                entity_id: self.id,
                value: self.value.clone(),
            },
        )
    }
}

/// A value displaced by a committed update. Append-only, never versioned;
/// per-id insertion order is the supersession trail, oldest first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalEntry {
    pub entity_id: u64,
    pub value: String,
}

impl HistoricalEntry {
    pub fn new(entity_id: u64, value: impl Into<String>) -> Self {
        HistoricalEntry {
            entity_id,
            value: value.into(),
        }
    }
}

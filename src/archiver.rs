use crate::record::HistoricalEntry;
use crate::store::{HistoryStore, StoreError};

/// Appends superseded values to the history store.
///
/// Pure plumbing: no conditions, no retry. The history store accepts
/// unconditional appends, so concurrent archivers need no coordination.
/// Only values handed over by the update engine are written; the archiver
/// never reads the record store.
pub struct Archiver<H> {
    history: H,
}

impl<H: HistoryStore> Archiver<H> {
    pub fn new(history: H) -> Self {
        Archiver { history }
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    /// Append one displaced value to the supersession trail.
    pub fn archive(&self, entry: &HistoricalEntry) -> Result<(), StoreError> {
        self.history.append(entry)
    }
}

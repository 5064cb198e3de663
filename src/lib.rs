mod archiver;
mod items;
mod record;
mod store;
mod updater;

pub use archiver::Archiver;
pub use items::ItemUpdater;
pub use record::{HistoricalEntry, LatestRecord};
pub use store::{
    HistoryStore, InMemoryHistoryStore, InMemoryRecordStore, RecordStore, StoreError,
};
pub use updater::{RetryPolicy, UpdateEngine, UpdateError, UpdateOutcome};

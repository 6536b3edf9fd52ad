//! Minutes store adapters

pub mod journal;
pub mod store;

pub use journal::{JournalEvent, JsonlMinutesJournal};
pub use store::InMemoryMinutesStore;

//! Infrastructure layer for the council consensus engine
//!
//! Adapters implementing the application layer's ports: minutes storage
//! with JSONL journalling, TTL presence tracking, the task directory, the
//! one-shot process gateway, and configuration loading.

pub mod config;
pub mod directory;
pub mod gateway;
pub mod minutes;
pub mod presence;

pub use config::{ConfigLoader, FileConfig};
pub use directory::InMemoryDirectory;
pub use gateway::{CannedGateway, CommandGateway};
pub use minutes::{InMemoryMinutesStore, JsonlMinutesJournal};
pub use presence::TtlPresenceTracker;

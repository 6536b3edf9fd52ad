//! Presence tracking adapters

pub mod tracker;

pub use tracker::TtlPresenceTracker;

//! Task directory adapters

pub mod memory;

pub use memory::InMemoryDirectory;

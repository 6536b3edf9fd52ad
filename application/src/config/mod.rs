//! Application configuration

pub mod consensus;

pub use consensus::ConsensusConfig;

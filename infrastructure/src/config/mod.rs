//! Configuration loading

pub mod file_config;
pub mod loader;

pub use file_config::{FileConfig, GatewaySection, MeetingSection};
pub use loader::ConfigLoader;

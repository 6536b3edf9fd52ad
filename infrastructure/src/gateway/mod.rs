//! One-shot gateway adapters

pub mod command;

pub use command::{CannedGateway, CommandGateway};

//! Live speech event port
//!
//! Presence publishes one event per spoken turn so live surfaces can
//! follow a meeting as it happens. This is fire-and-forget: publication
//! failures never disturb the protocol.

use council_domain::{EntryKind, LeaderId, Locale, Stance};
use serde::{Deserialize, Serialize};

/// One spoken turn, as published to live listeners
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechEvent {
    pub task_id: String,
    pub speaker: LeaderId,
    pub seat: usize,
    pub phase: EntryKind,
    pub stance: Option<Stance>,
    pub text: String,
    pub locale: Locale,
}

/// Publisher of live speech events
pub trait SpeechPublisher: Send + Sync {
    fn publish(&self, event: SpeechEvent);
}

/// No-op publisher for tests and headless runs
pub struct NoSpeechPublisher;

impl SpeechPublisher for NoSpeechPublisher {
    fn publish(&self, _event: SpeechEvent) {}
}

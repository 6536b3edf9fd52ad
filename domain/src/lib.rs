//! Domain layer for council
//!
//! This crate contains the core business logic of the meeting-based
//! consensus engine: leaders and departments, rounds and round modes,
//! meeting minutes, transcripts, reply classification, and prompt
//! templates. It has no dependencies on infrastructure or presentation
//! concerns.
//!
//! # Core Concepts
//!
//! - **Meeting**: the durable record of one consensus round for a task,
//!   with strictly ordered minute entries.
//! - **Round mode**: what leaders may request in a round
//!   (`parallel_remediation` → `merge_synthesis` → `final_decision`).
//! - **Stance**: a classified leader position (`reviewing`, `approved`,
//!   `hold`) extracted from free-text replies.

pub mod leader;
pub mod locale;
pub mod meeting;
pub mod prompt;
pub mod signal;
pub mod stance;

// Re-export commonly used types
pub use leader::{AgentStatus, Department, Leader, LeaderId, Locale};
pub use locale::Notice;
pub use meeting::{
    EntryKind, Meeting, MeetingId, MeetingKind, MeetingStatus, MinuteEntry, PlannedOutcome,
    ReviewOutcome, Round, RoundMode, Transcript,
};
pub use prompt::MeetingPromptTemplate;
pub use signal::{RevisionSignal, SignalLedger};
pub use stance::{
    KeywordClassifier, Stance, StanceClassifier, detect_revision_intent, extract_plan_items,
};

//! Meeting records, rounds, transcripts, and outcomes

pub mod minutes;
pub mod outcome;
pub mod round;
pub mod transcript;

pub use minutes::{EntryKind, Meeting, MeetingId, MeetingKind, MeetingStatus, MinuteEntry};
pub use outcome::{PlannedOutcome, ReviewOutcome};
pub use round::{Round, RoundMode};
pub use transcript::{Transcript, compact};

//! Meeting and minute-entry records
//!
//! A meeting is the durable record of one round of the consensus protocol
//! for a task. Its minute entries form a strictly ordered transcript:
//! sequence numbers increase without gaps and continue across a resume,
//! which is what makes mid-meeting crashes safely resumable.

use crate::leader::{Department, Leader, LeaderId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque meeting identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeetingId(pub String);

impl MeetingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MeetingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which protocol variant produced the meeting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingKind {
    /// Multi-round review consensus after execution
    Review,
    /// Single-round kickoff approval
    Planned,
}

impl MeetingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingKind::Review => "review",
            MeetingKind::Planned => "planned",
        }
    }
}

/// Lifecycle state of a meeting record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    InProgress,
    Completed,
    Failed,
}

impl MeetingStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, MeetingStatus::InProgress)
    }
}

/// What kind of turn a minute entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Opening,
    Feedback,
    Summary,
    Approval,
    Closing,
    Notice,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Opening => "opening",
            EntryKind::Feedback => "feedback",
            EntryKind::Summary => "summary",
            EntryKind::Approval => "approval",
            EntryKind::Closing => "closing",
            EntryKind::Notice => "notice",
        }
    }
}

/// One ordered record in a meeting transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinuteEntry {
    /// Strictly increasing within a meeting, continuing across a resume
    pub seq: u64,
    pub speaker: LeaderId,
    pub department: Department,
    pub role: String,
    pub kind: EntryKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl MinuteEntry {
    pub fn new(seq: u64, leader: &Leader, kind: EntryKind, content: impl Into<String>) -> Self {
        Self {
            seq,
            speaker: leader.id.clone(),
            department: leader.department.clone(),
            role: leader.role.clone(),
            kind,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// The durable record of one meeting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meeting {
    pub id: MeetingId,
    pub task_id: String,
    pub kind: MeetingKind,
    pub round: u32,
    pub status: MeetingStatus,
    pub title: String,
    pub started_at: DateTime<Utc>,
    pub entries: Vec<MinuteEntry>,
}

impl Meeting {
    pub fn new(
        id: MeetingId,
        task_id: impl Into<String>,
        kind: MeetingKind,
        round: u32,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id,
            task_id: task_id.into(),
            kind,
            round,
            status: MeetingStatus::InProgress,
            title: title.into(),
            started_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    /// The next minute sequence number.
    ///
    /// Starts at 1 for a fresh meeting and continues from `max(seq) + 1`
    /// on resume, so sequences never restart or skip.
    pub fn next_seq(&self) -> u64 {
        self.entries.iter().map(|e| e.seq).max().unwrap_or(0) + 1
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == MeetingStatus::InProgress
    }
}

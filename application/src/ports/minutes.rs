//! Meeting minutes port
//!
//! The durable, strictly ordered transcript store. The orchestrators are
//! the only writers; dashboards and audit tooling read the same records
//! through other channels.

use async_trait::async_trait;
use council_domain::{Meeting, MeetingId, MeetingKind, MeetingStatus, MinuteEntry};
use thiserror::Error;

/// Errors from the minutes store
#[derive(Error, Debug)]
pub enum MinutesError {
    #[error("Meeting not found: {0}")]
    NotFound(String),

    #[error("Meeting already finished: {0}")]
    AlreadyFinished(String),

    #[error("Out-of-order minute sequence: expected {expected}, got {got}")]
    OutOfOrder { expected: u64, got: u64 },

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Durable recorder of meetings and their minute entries
///
/// Resumption contract: if [`latest_for_task`](MinutesRecorder::latest_for_task)
/// returns an `in_progress` meeting, the orchestrator reuses its id and
/// continues sequencing from `max(seq) + 1` instead of beginning a new
/// meeting. That makes mid-meeting crashes resumable without duplicate or
/// skipped turns.
#[async_trait]
pub trait MinutesRecorder: Send + Sync {
    /// Open a new meeting record in `in_progress` state.
    async fn begin(
        &self,
        task_id: &str,
        kind: MeetingKind,
        round: u32,
        title: &str,
    ) -> Result<MeetingId, MinutesError>;

    /// Append one minute entry. Sequence numbers must strictly increase.
    async fn append(&self, meeting_id: &MeetingId, entry: MinuteEntry)
    -> Result<(), MinutesError>;

    /// Finalize a meeting exactly once.
    async fn finish(
        &self,
        meeting_id: &MeetingId,
        status: MeetingStatus,
    ) -> Result<(), MinutesError>;

    /// The most recent meeting of one kind for a task, with its entries.
    ///
    /// Scoped by kind so a kickoff meeting never perturbs review-round
    /// derivation on the same task.
    async fn latest_for_task(
        &self,
        task_id: &str,
        kind: MeetingKind,
    ) -> Result<Option<Meeting>, MinutesError>;
}

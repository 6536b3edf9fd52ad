//! In-memory minutes store with optional JSONL journalling.

use crate::minutes::journal::{JournalEvent, JsonlMinutesJournal};
use async_trait::async_trait;
use council_application::ports::minutes::{MinutesError, MinutesRecorder};
use council_domain::{Meeting, MeetingId, MeetingKind, MeetingStatus, MinuteEntry};
use std::sync::Mutex;
use tracing::debug;

/// In-memory [`MinutesRecorder`] adapter.
///
/// Meetings live in process memory; when a journal is attached, every
/// begin/append/finish is also written as one JSONL line so a crashed
/// process leaves a replayable audit trail behind.
pub struct InMemoryMinutesStore {
    inner: Mutex<StoreState>,
    journal: Option<JsonlMinutesJournal>,
}

#[derive(Default)]
struct StoreState {
    meetings: Vec<Meeting>,
    next_id: u64,
}

impl InMemoryMinutesStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreState::default()),
            journal: None,
        }
    }

    /// Attach a JSONL journal.
    pub fn with_journal(mut self, journal: JsonlMinutesJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn meeting_count(&self) -> usize {
        self.inner.lock().expect("minutes store poisoned").meetings.len()
    }

    fn journal_event(&self, event_type: &'static str, payload: serde_json::Value) {
        if let Some(journal) = &self.journal {
            journal.log(JournalEvent::new(event_type, payload));
        }
    }
}

impl Default for InMemoryMinutesStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MinutesRecorder for InMemoryMinutesStore {
    async fn begin(
        &self,
        task_id: &str,
        kind: MeetingKind,
        round: u32,
        title: &str,
    ) -> Result<MeetingId, MinutesError> {
        let id = {
            let mut state = self.inner.lock().expect("minutes store poisoned");
            state.next_id += 1;
            let id = MeetingId::new(format!("meeting-{}", state.next_id));
            state
                .meetings
                .push(Meeting::new(id.clone(), task_id, kind, round, title));
            id
        };

        debug!(meeting = %id, task = task_id, round, kind = kind.as_str(), "meeting began");
        self.journal_event(
            "meeting_began",
            serde_json::json!({
                "meeting_id": id.as_str(),
                "task_id": task_id,
                "kind": kind.as_str(),
                "round": round,
                "title": title,
            }),
        );
        Ok(id)
    }

    async fn append(&self, meeting_id: &MeetingId, entry: MinuteEntry) -> Result<(), MinutesError> {
        {
            let mut state = self.inner.lock().expect("minutes store poisoned");
            let meeting = state
                .meetings
                .iter_mut()
                .find(|m| &m.id == meeting_id)
                .ok_or_else(|| MinutesError::NotFound(meeting_id.to_string()))?;
            if meeting.status.is_terminal() {
                return Err(MinutesError::AlreadyFinished(meeting_id.to_string()));
            }
            let expected = meeting.next_seq();
            if entry.seq != expected {
                return Err(MinutesError::OutOfOrder {
                    expected,
                    got: entry.seq,
                });
            }
            meeting.entries.push(entry.clone());
        }

        self.journal_event(
            "minute_appended",
            serde_json::json!({
                "meeting_id": meeting_id.as_str(),
                "seq": entry.seq,
                "speaker": entry.speaker.as_str(),
                "department": entry.department.as_str(),
                "kind": entry.kind.as_str(),
                "content": entry.content,
            }),
        );
        Ok(())
    }

    async fn finish(
        &self,
        meeting_id: &MeetingId,
        status: MeetingStatus,
    ) -> Result<(), MinutesError> {
        {
            let mut state = self.inner.lock().expect("minutes store poisoned");
            let meeting = state
                .meetings
                .iter_mut()
                .find(|m| &m.id == meeting_id)
                .ok_or_else(|| MinutesError::NotFound(meeting_id.to_string()))?;
            if meeting.status.is_terminal() {
                return Err(MinutesError::AlreadyFinished(meeting_id.to_string()));
            }
            meeting.status = status;
        }

        debug!(meeting = %meeting_id, ?status, "meeting finished");
        self.journal_event(
            "meeting_finished",
            serde_json::json!({
                "meeting_id": meeting_id.as_str(),
                "status": match status {
                    MeetingStatus::InProgress => "in_progress",
                    MeetingStatus::Completed => "completed",
                    MeetingStatus::Failed => "failed",
                },
            }),
        );
        Ok(())
    }

    async fn latest_for_task(
        &self,
        task_id: &str,
        kind: MeetingKind,
    ) -> Result<Option<Meeting>, MinutesError> {
        Ok(self
            .inner
            .lock()
            .expect("minutes store poisoned")
            .meetings
            .iter()
            .rev()
            .find(|m| m.task_id == task_id && m.kind == kind)
            .cloned())
    }
}

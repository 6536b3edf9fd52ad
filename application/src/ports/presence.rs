//! Presence tracking port
//!
//! Ephemeral, TTL-bounded record of which agents are "in" a meeting:
//! seat index, phase, and classified stance. Entries expire lazily on
//! read once their hold window elapses.

use async_trait::async_trait;
use council_domain::{EntryKind, Leader, LeaderId, Locale, Stance};

/// How many leaders are called into / dismissed from a meeting at once
pub const MAX_CALLED_LEADERS: usize = 6;

#[async_trait]
pub trait PresenceTracker: Send + Sync {
    /// Record an agent as present in a meeting for `hold_ms`.
    ///
    /// Side effect: an agent whose externally tracked status is `break`
    /// flips to `idle` when marked present.
    async fn mark_in_meeting(
        &self,
        agent: &LeaderId,
        hold_ms: u64,
        seat: usize,
        phase: EntryKind,
        task_id: &str,
    );

    /// Whether the agent is currently in a meeting.
    ///
    /// Lazily expires the record (and all associated state) once the hold
    /// window has elapsed.
    async fn is_in_meeting(&self, agent: &LeaderId) -> bool;

    /// Call up to the first [`MAX_CALLED_LEADERS`] leaders into a meeting.
    async fn call(&self, task_id: &str, leaders: &[Leader], phase: EntryKind);

    /// Dismiss leaders from a meeting, clearing their presence.
    async fn dismiss(&self, task_id: &str, leaders: &[Leader]);

    /// Record a spoken turn: classifies the text into a stance, updates
    /// the agent's presence record, and publishes a live speech event.
    ///
    /// Returns the classified stance, if any.
    async fn speak(
        &self,
        agent: &LeaderId,
        seat: usize,
        phase: EntryKind,
        task_id: &str,
        text: &str,
        locale: Locale,
    ) -> Option<Stance>;
}

/// No-op presence tracker for tests and headless runs
pub struct NoPresence;

#[async_trait]
impl PresenceTracker for NoPresence {
    async fn mark_in_meeting(
        &self,
        _agent: &LeaderId,
        _hold_ms: u64,
        _seat: usize,
        _phase: EntryKind,
        _task_id: &str,
    ) {
    }

    async fn is_in_meeting(&self, _agent: &LeaderId) -> bool {
        false
    }

    async fn call(&self, _task_id: &str, _leaders: &[Leader], _phase: EntryKind) {}

    async fn dismiss(&self, _task_id: &str, _leaders: &[Leader]) {}

    async fn speak(
        &self,
        _agent: &LeaderId,
        _seat: usize,
        _phase: EntryKind,
        _task_id: &str,
        _text: &str,
        _locale: Locale,
    ) -> Option<Stance> {
        None
    }
}

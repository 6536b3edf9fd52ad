//! TTL-bounded presence tracker.

use async_trait::async_trait;
use council_application::ports::directory::TaskDirectory;
use council_application::ports::presence::{PresenceTracker, MAX_CALLED_LEADERS};
use council_application::ports::speech::{SpeechEvent, SpeechPublisher};
use council_domain::{AgentStatus, EntryKind, Leader, LeaderId, Locale, Stance, StanceClassifier};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::debug;

struct PresenceRecord {
    expires_at: Instant,
    seat: usize,
    phase: EntryKind,
    task_id: String,
    stance: Option<Stance>,
}

/// In-process [`PresenceTracker`] with lazy TTL expiry.
///
/// Records expire on read: there is no background sweeper, so an entry
/// past its hold window simply vanishes the next time anyone asks about
/// it. Spoken turns are classified into a stance and published as live
/// speech events.
pub struct TtlPresenceTracker {
    records: Mutex<HashMap<LeaderId, PresenceRecord>>,
    directory: Arc<dyn TaskDirectory>,
    classifier: Arc<dyn StanceClassifier>,
    publisher: Arc<dyn SpeechPublisher>,
    default_hold_ms: u64,
}

impl TtlPresenceTracker {
    pub fn new(
        directory: Arc<dyn TaskDirectory>,
        classifier: Arc<dyn StanceClassifier>,
        publisher: Arc<dyn SpeechPublisher>,
        default_hold_ms: u64,
    ) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            directory,
            classifier,
            publisher,
            default_hold_ms,
        }
    }

    fn insert(&self, agent: &LeaderId, hold_ms: u64, seat: usize, phase: EntryKind, task_id: &str) {
        let mut records = self.records.lock().expect("presence records poisoned");
        let stance = records.get(agent).and_then(|r| r.stance);
        records.insert(
            agent.clone(),
            PresenceRecord {
                expires_at: Instant::now() + Duration::from_millis(hold_ms),
                seat,
                phase,
                task_id: task_id.to_string(),
                stance,
            },
        );
    }

    fn expire_if_elapsed(&self, agent: &LeaderId) -> bool {
        let mut records = self.records.lock().expect("presence records poisoned");
        match records.get(agent) {
            Some(record) if record.expires_at <= Instant::now() => {
                records.remove(agent);
                false
            }
            Some(_) => true,
            None => false,
        }
    }
}

#[async_trait]
impl PresenceTracker for TtlPresenceTracker {
    async fn mark_in_meeting(
        &self,
        agent: &LeaderId,
        hold_ms: u64,
        seat: usize,
        phase: EntryKind,
        task_id: &str,
    ) {
        self.insert(agent, hold_ms, seat, phase, task_id);

        // An agent on break who gets called into a meeting is idle again.
        if self.directory.agent_status(agent).await == Some(AgentStatus::Break) {
            debug!(agent = %agent, "agent was on break; flipping to idle");
            self.directory.set_agent_status(agent, AgentStatus::Idle).await;
        }
    }

    async fn is_in_meeting(&self, agent: &LeaderId) -> bool {
        self.expire_if_elapsed(agent)
    }

    async fn call(&self, task_id: &str, leaders: &[Leader], phase: EntryKind) {
        for (seat, leader) in leaders.iter().take(MAX_CALLED_LEADERS).enumerate() {
            self.mark_in_meeting(&leader.id, self.default_hold_ms, seat, phase, task_id)
                .await;
        }
    }

    async fn dismiss(&self, _task_id: &str, leaders: &[Leader]) {
        let mut records = self.records.lock().expect("presence records poisoned");
        for leader in leaders.iter().take(MAX_CALLED_LEADERS) {
            records.remove(&leader.id);
        }
    }

    async fn speak(
        &self,
        agent: &LeaderId,
        seat: usize,
        phase: EntryKind,
        task_id: &str,
        text: &str,
        locale: Locale,
    ) -> Option<Stance> {
        let stance = self.classifier.classify(text);

        {
            let mut records = self.records.lock().expect("presence records poisoned");
            if let Some(record) = records.get_mut(agent) {
                record.seat = seat;
                record.phase = phase;
                record.task_id = task_id.to_string();
                record.stance = stance;
            }
        }

        self.publisher.publish(SpeechEvent {
            task_id: task_id.to_string(),
            speaker: agent.clone(),
            seat,
            phase,
            stance,
            text: text.to_string(),
            locale,
        });

        stance
    }
}

//! Planned approval use case
//!
//! Single-round kickoff variant of the review protocol. Same turn
//! structure (opening → feedback → summary → per-leader closing), but it
//! never produces a hold: concerns are converted into a capped list of
//! action items and the meeting always finishes `completed`. Early-stage
//! kickoff must never block on consensus — only post-execution review can.
//!
//! Keyed by the `planned:` lock namespace so it cannot collide with a
//! review consensus on the same task.

use crate::config::ConsensusConfig;
use crate::locks::{LockNamespace, MeetingLocks};
use crate::ports::directory::TaskDirectory;
use crate::ports::llm_gateway::{GatewayError, OneShotGateway, OneShotOptions};
use crate::ports::minutes::{MinutesError, MinutesRecorder};
use crate::ports::presence::PresenceTracker;
use crate::selector::{LeaderSelector, SelectorOptions};
use council_domain::{
    Department, EntryKind, Leader, Locale, MeetingId, MeetingKind, MeetingStatus,
    MeetingPromptTemplate, MinuteEntry, Notice, PlannedOutcome, RoundMode, Stance,
    StanceClassifier, Transcript, detect_revision_intent, extract_plan_items,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors internal to one planned-approval run
#[derive(Error, Debug)]
pub enum PlannedApprovalError {
    #[error("Minutes error: {0}")]
    Minutes(#[from] MinutesError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Meeting interrupted by external task state change")]
    Interrupted,
}

/// Input for one planned-approval run
#[derive(Debug, Clone)]
pub struct PlannedApprovalInput {
    pub task_id: String,
    pub title: String,
    pub fallback_department: Department,
    pub locale: Locale,
    pub project_path: Option<String>,
}

impl PlannedApprovalInput {
    pub fn new(
        task_id: impl Into<String>,
        title: impl Into<String>,
        fallback_department: Department,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            title: title.into(),
            fallback_department,
            locale: Locale::default(),
            project_path: None,
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }
}

/// How a planned-approval run ended
#[derive(Debug, Clone, PartialEq)]
pub enum PlannedRun {
    /// Meeting completed; action items ready for the caller
    Completed(PlannedOutcome),
    /// A planned meeting was already in flight; idempotent no-op
    Skipped,
    /// External task state change ended the meeting early
    Aborted,
    /// Unclassified runtime fault
    Errored(String),
}

/// Use case for running kickoff approval on a task
pub struct PlannedApprovalUseCase<G: OneShotGateway + 'static> {
    gateway: Arc<G>,
    minutes: Arc<dyn MinutesRecorder>,
    presence: Arc<dyn PresenceTracker>,
    directory: Arc<dyn TaskDirectory>,
    classifier: Arc<dyn StanceClassifier>,
    locks: MeetingLocks,
    config: ConsensusConfig,
}

impl<G: OneShotGateway + 'static> PlannedApprovalUseCase<G> {
    pub fn new(
        gateway: Arc<G>,
        minutes: Arc<dyn MinutesRecorder>,
        presence: Arc<dyn PresenceTracker>,
        directory: Arc<dyn TaskDirectory>,
        classifier: Arc<dyn StanceClassifier>,
        locks: MeetingLocks,
        config: ConsensusConfig,
    ) -> Self {
        Self {
            gateway,
            minutes,
            presence,
            directory,
            classifier,
            locks,
            config,
        }
    }

    /// Run the kickoff meeting to completion.
    pub async fn execute(&self, input: PlannedApprovalInput) -> PlannedRun {
        let Some(_guard) = self.locks.try_acquire(LockNamespace::Planned, &input.task_id) else {
            debug!(task = %input.task_id, "planned meeting already in flight; no-op");
            return PlannedRun::Skipped;
        };

        let selector = LeaderSelector::new(Arc::clone(&self.directory));
        let opts = SelectorOptions {
            min_quorum: self.config.min_quorum,
        };
        let leaders = selector
            .resolve(&input.task_id, &input.fallback_department, &opts)
            .await;

        if leaders.is_empty() {
            info!(task = %input.task_id, "no leaders resolved; kickoff approved without a meeting");
            return PlannedRun::Completed(PlannedOutcome::default());
        }

        let mut meeting_id = None;
        match self.run_meeting(&input, &leaders, &mut meeting_id).await {
            Ok(outcome) => {
                if let Some(id) = &meeting_id {
                    let _ = self.minutes.finish(id, MeetingStatus::Completed).await;
                }
                self.presence.dismiss(&input.task_id, &leaders).await;
                info!(
                    task = %input.task_id,
                    items = outcome.plan_items.len(),
                    supplements = outcome.has_supplement_signals,
                    "planned approval completed"
                );
                PlannedRun::Completed(outcome)
            }
            Err(PlannedApprovalError::Interrupted) => {
                info!(task = %input.task_id, "kickoff meeting interrupted; ending as failed");
                if let Some(id) = &meeting_id {
                    let _ = self.minutes.finish(id, MeetingStatus::Failed).await;
                }
                self.presence.dismiss(&input.task_id, &leaders).await;
                self.directory.clear_workflow_caches(&input.task_id).await;
                PlannedRun::Aborted
            }
            Err(e) => {
                warn!(task = %input.task_id, error = %e, "planned approval fault");
                if let Some(id) = &meeting_id {
                    let _ = self.minutes.finish(id, MeetingStatus::Failed).await;
                }
                self.presence.dismiss(&input.task_id, &leaders).await;
                let notice = Notice::MeetingFailed.text(input.locale);
                self.directory.notify_operator(&input.task_id, &notice).await;
                PlannedRun::Errored(e.to_string())
            }
        }
    }

    async fn run_meeting(
        &self,
        input: &PlannedApprovalInput,
        leaders: &[Leader],
        meeting_id_out: &mut Option<MeetingId>,
    ) -> Result<PlannedOutcome, PlannedApprovalError> {
        // Resume an in-progress kickoff meeting rather than duplicating it.
        let latest = self
            .minutes
            .latest_for_task(&input.task_id, MeetingKind::Planned)
            .await?;

        let (meeting_id, mut seq, mut transcript) = match latest {
            Some(m) if m.is_in_progress() => {
                (m.id.clone(), m.next_seq(), Transcript::from_entries(&m.entries))
            }
            _ => {
                let id = self
                    .minutes
                    .begin(&input.task_id, MeetingKind::Planned, 1, &input.title)
                    .await?;
                (id, 1, Transcript::new())
            }
        };
        *meeting_id_out = Some(meeting_id.clone());

        self.presence
            .call(&input.task_id, leaders, EntryKind::Opening)
            .await;

        let mut plan_items = Vec::new();
        let mut per_department: HashMap<Department, usize> = HashMap::new();
        let mut has_supplement_signals = false;

        let lead = &leaders[0];

        // Opening: kickoff reviews the plan, so round-1 semantics apply.
        let prompt =
            MeetingPromptTemplate::opening(&input.title, RoundMode::ParallelRemediation, &transcript);
        let text = self
            .take_turn(input, lead, 0, EntryKind::Opening, &prompt, &meeting_id, &mut seq, &mut transcript)
            .await?;
        self.collect_items(lead, &text, &mut plan_items, &mut per_department, &mut has_supplement_signals);

        // Feedback from each non-lead leader
        for (seat, leader) in leaders.iter().enumerate().skip(1) {
            let prompt = MeetingPromptTemplate::feedback(
                &input.title,
                leader.department.as_str(),
                RoundMode::ParallelRemediation,
                &transcript,
            );
            let text = self
                .take_turn(input, leader, seat, EntryKind::Feedback, &prompt, &meeting_id, &mut seq, &mut transcript)
                .await?;
            self.collect_items(leader, &text, &mut plan_items, &mut per_department, &mut has_supplement_signals);
        }

        // Summary by the lead
        if leaders.len() > 1 {
            let prompt = MeetingPromptTemplate::summary(
                &input.title,
                RoundMode::ParallelRemediation,
                &transcript,
            );
            self.take_turn(input, lead, 0, EntryKind::Summary, &prompt, &meeting_id, &mut seq, &mut transcript)
                .await?;
        }

        // Per-leader closing statement: concerns become action items here,
        // never holds.
        for (seat, leader) in leaders.iter().enumerate() {
            let prompt = MeetingPromptTemplate::planned_closing(
                &input.title,
                leader.department.as_str(),
                &transcript,
            );
            let text = self
                .take_turn(input, leader, seat, EntryKind::Closing, &prompt, &meeting_id, &mut seq, &mut transcript)
                .await?;
            self.collect_items(leader, &text, &mut plan_items, &mut per_department, &mut has_supplement_signals);
        }

        self.checkpoint(&input.task_id).await?;

        plan_items.truncate(self.config.max_plan_items);
        if !plan_items.is_empty() {
            self.directory.save_memo(&input.task_id, &plan_items).await;
            self.directory
                .append_log(
                    &input.task_id,
                    "kickoff_items",
                    &format!("{} action item(s) recorded", plan_items.len()),
                )
                .await;
        }

        Ok(PlannedOutcome::new(plan_items, has_supplement_signals))
    }

    /// Collect action items from a reply under the total and
    /// per-department caps, and note any hold-leaning signal.
    fn collect_items(
        &self,
        leader: &Leader,
        text: &str,
        plan_items: &mut Vec<String>,
        per_department: &mut HashMap<Department, usize>,
        has_supplement_signals: &mut bool,
    ) {
        if detect_revision_intent(text) || self.classifier.classify(text) == Some(Stance::Hold) {
            *has_supplement_signals = true;
        }

        let dept_count = per_department.entry(leader.department.clone()).or_insert(0);
        let dept_budget = self
            .config
            .max_signals_per_department
            .saturating_sub(*dept_count);
        let total_budget = self.config.max_plan_items.saturating_sub(plan_items.len());

        let items = extract_plan_items(text, dept_budget.min(total_budget));
        *dept_count += items.len();
        for item in items {
            if !plan_items.contains(&item) {
                plan_items.push(item);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn take_turn(
        &self,
        input: &PlannedApprovalInput,
        leader: &Leader,
        seat: usize,
        kind: EntryKind,
        prompt: &str,
        meeting_id: &MeetingId,
        seq: &mut u64,
        transcript: &mut Transcript,
    ) -> Result<String, PlannedApprovalError> {
        self.checkpoint(&input.task_id).await?;

        let text = self
            .call_with_retry(input, leader, prompt, transcript)
            .await?;

        let entry = MinuteEntry::new(*seq, leader, kind, text.clone());
        self.minutes.append(meeting_id, entry).await?;
        *seq += 1;
        transcript.push(leader.id.as_str(), leader.department.as_str(), &text);

        self.presence
            .mark_in_meeting(
                &leader.id,
                self.config.presence_hold_ms,
                seat,
                kind,
                &input.task_id,
            )
            .await;
        self.presence
            .speak(&leader.id, seat, kind, &input.task_id, &text, input.locale)
            .await;

        if self.config.pacing_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.pacing_delay_ms)).await;
        }
        Ok(text)
    }

    async fn call_with_retry(
        &self,
        input: &PlannedApprovalInput,
        leader: &Leader,
        prompt: &str,
        transcript: &Transcript,
    ) -> Result<String, PlannedApprovalError> {
        let mut opts = OneShotOptions::new(self.config.turn_timeout_ms);
        if let Some(path) = &input.project_path {
            opts = opts.with_project_path(path.clone());
        }

        match self.gateway.run_one_shot(leader, prompt, &opts).await {
            Ok(reply) => Ok(reply.text),
            Err(e) if e.is_timeout() => {
                warn!(leader = %leader.id, "model call timed out; retrying with compacted prompt");
                let retry = MeetingPromptTemplate::retry_after_timeout(prompt, transcript);
                match self.gateway.run_one_shot(leader, &retry, &opts).await {
                    Ok(reply) => Ok(reply.text),
                    Err(e2) => {
                        warn!(leader = %leader.id, error = %e2, "retry failed; using degraded reply");
                        Ok(String::new())
                    }
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn checkpoint(&self, task_id: &str) -> Result<(), PlannedApprovalError> {
        match self.directory.task_status(task_id).await {
            Some(status) if !status.is_interruption() => Ok(()),
            _ => Err(PlannedApprovalError::Interrupted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::fakes::{FakeDirectory, FakeMinutes, ScriptedGateway};
    use council_domain::KeywordClassifier;

    fn use_case(
        gateway: Arc<ScriptedGateway>,
        minutes: Arc<FakeMinutes>,
        directory: Arc<FakeDirectory>,
        locks: MeetingLocks,
    ) -> PlannedApprovalUseCase<ScriptedGateway> {
        PlannedApprovalUseCase::new(
            gateway,
            minutes,
            Arc::new(crate::ports::presence::NoPresence),
            directory,
            Arc::new(KeywordClassifier),
            locks,
            ConsensusConfig::default().with_pacing_delay_ms(0),
        )
    }

    fn input() -> PlannedApprovalInput {
        PlannedApprovalInput::new("t-1", "Ship search v2", Department::new("backend"))
    }

    #[tokio::test]
    async fn test_hold_becomes_action_items_not_block() {
        let directory = Arc::new(FakeDirectory::with_standard_team());
        let minutes = Arc::new(FakeMinutes::new());
        // 3 leaders: opening + 2 feedback + summary + 3 closing = 7 turns
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Ok("Kickoff: plan looks workable.".to_string()),
            // Leader B signals hold with items
            Ok("HOLD — before this starts:\n- confirm capacity budget\n- add a rollout flag".to_string()),
            Ok("No concerns.".to_string()),
            Ok("Summary: two supplements requested.".to_string()),
            Ok("Closing: fine to proceed.".to_string()),
            Ok("Closing: proceed once the items are noted.".to_string()),
            Ok("Closing: proceed.".to_string()),
        ]));

        let use_case = use_case(gateway, Arc::clone(&minutes), Arc::clone(&directory), MeetingLocks::new());
        let run = use_case.execute(input()).await;

        match run {
            PlannedRun::Completed(outcome) => {
                // The hold converted to items; the callback still fires
                assert!(outcome.has_supplement_signals);
                assert_eq!(
                    outcome.plan_items,
                    vec!["confirm capacity budget".to_string(), "add a rollout flag".to_string()]
                );
            }
            other => panic!("expected completion, got {:?}", other),
        }
        let meeting = minutes.latest("t-1").await.unwrap();
        assert_eq!(meeting.status, MeetingStatus::Completed);
        assert_eq!(meeting.kind, MeetingKind::Planned);
    }

    #[tokio::test]
    async fn test_empty_leader_set_completes_immediately() {
        let directory = Arc::new(FakeDirectory::new());
        let minutes = Arc::new(FakeMinutes::new());
        let use_case = use_case(
            Arc::new(ScriptedGateway::new(vec![])),
            Arc::clone(&minutes),
            directory,
            MeetingLocks::new(),
        );

        let run = use_case.execute(input()).await;
        assert_eq!(run, PlannedRun::Completed(PlannedOutcome::default()));
        assert_eq!(minutes.meeting_count().await, 0);
    }

    #[tokio::test]
    async fn test_planned_lock_is_independent_of_review_lock() {
        let directory = Arc::new(FakeDirectory::with_standard_team());
        let locks = MeetingLocks::new();
        // A review meeting in flight does not block kickoff
        let _review = locks.try_acquire(LockNamespace::Review, "t-1").unwrap();

        let gateway = Arc::new(ScriptedGateway::always("Proceed."));
        let use_case = use_case(gateway, Arc::new(FakeMinutes::new()), directory, locks.clone());

        let run = use_case.execute(input()).await;
        assert!(matches!(run, PlannedRun::Completed(_)));

        // But a second planned run is the idempotent no-op
        let _planned = locks.try_acquire(LockNamespace::Planned, "t-1").unwrap();
        let directory = Arc::new(FakeDirectory::with_standard_team());
        let use_case = use_case_with_locks(directory, locks);
        assert_eq!(use_case.execute(input()).await, PlannedRun::Skipped);
    }

    fn use_case_with_locks(
        directory: Arc<FakeDirectory>,
        locks: MeetingLocks,
    ) -> PlannedApprovalUseCase<ScriptedGateway> {
        use_case(
            Arc::new(ScriptedGateway::always("Proceed.")),
            Arc::new(FakeMinutes::new()),
            directory,
            locks,
        )
    }

    #[tokio::test]
    async fn test_interruption_fails_meeting_without_callback_payload() {
        let directory = Arc::new(FakeDirectory::with_standard_team());
        let minutes = Arc::new(FakeMinutes::new());
        let gateway = Arc::new(ScriptedGateway::always("Opening."));
        gateway.stop_task_after_call(1, Arc::clone(&directory), "t-1");

        let use_case = use_case(
            Arc::clone(&gateway),
            Arc::clone(&minutes),
            Arc::clone(&directory),
            MeetingLocks::new(),
        );

        let run = use_case.execute(input()).await;

        assert_eq!(run, PlannedRun::Aborted);
        assert_eq!(gateway.calls(), 1);
        assert_eq!(
            minutes.latest("t-1").await.unwrap().status,
            MeetingStatus::Failed
        );
        assert_eq!(directory.cleared_tasks().await, vec!["t-1".to_string()]);
    }

    #[tokio::test]
    async fn test_item_caps_per_department_and_total() {
        let directory = Arc::new(FakeDirectory::with_standard_team());
        let minutes = Arc::new(FakeMinutes::new());
        // Every reply floods items; caps keep the outcome bounded
        let gateway = Arc::new(ScriptedGateway::always(
            "HOLD:\n- item a\n- item b\n- item c\n- item d\n",
        ));

        let use_case = use_case(gateway, minutes, Arc::clone(&directory), MeetingLocks::new());
        let run = use_case.execute(input()).await;

        match run {
            PlannedRun::Completed(outcome) => {
                assert!(outcome.has_supplement_signals);
                assert!(outcome.plan_items.len() <= 5);
            }
            other => panic!("expected completion, got {:?}", other),
        }
    }
}

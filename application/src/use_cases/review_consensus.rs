//! Review consensus use case
//!
//! Drives the full multi-round review protocol for one task: lock
//! acquisition, leader resolution, round derivation, the opening →
//! feedback → summary → approval turn sequence, and outcome resolution
//! under the configured caps.
//!
//! Turns are strictly sequential — a deliberate choice so later leaders
//! can react to earlier stated positions. Cancellation is cooperative:
//! the externally visible task status is polled before every turn and
//! before outcome resolution, never preemptively.

use crate::config::ConsensusConfig;
use crate::locks::{LockNamespace, MeetingLocks};
use crate::ports::directory::TaskDirectory;
use crate::ports::llm_gateway::{GatewayError, OneShotGateway, OneShotOptions};
use crate::ports::minutes::{MinutesError, MinutesRecorder};
use crate::ports::presence::PresenceTracker;
use crate::selector::{LeaderSelector, SelectorOptions};
use council_domain::{
    Department, EntryKind, Leader, Locale, MeetingId, MeetingKind, MeetingStatus,
    MeetingPromptTemplate, MinuteEntry, Notice, ReviewOutcome, Round, RoundMode, SignalLedger,
    Stance, StanceClassifier, Transcript, detect_revision_intent, extract_plan_items,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors internal to one protocol run.
///
/// `Interrupted` is an expected outcome (external task state change), not
/// a fault; everything else reaches the top-level handler.
#[derive(Error, Debug)]
pub enum ReviewConsensusError {
    #[error("Minutes error: {0}")]
    Minutes(#[from] MinutesError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Meeting interrupted by external task state change")]
    Interrupted,
}

/// Input for one review-consensus run
#[derive(Debug, Clone)]
pub struct ReviewConsensusInput {
    pub task_id: String,
    pub title: String,
    pub fallback_department: Department,
    pub locale: Locale,
    pub project_path: Option<String>,
}

impl ReviewConsensusInput {
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

    pub fn with_project_path(mut self, path: impl Into<String>) -> Self {
        self.project_path = Some(path.into());
        self
    }
}

/// Mutable state accumulated over one round
struct RoundState {
    needs_revision: bool,
    ledger: SignalLedger,
    remediation_items: Vec<String>,
    residual_risks: Vec<String>,
}

/// Use case for running review consensus on a task
pub struct ReviewConsensusUseCase<G: OneShotGateway + 'static> {
    gateway: Arc<G>,
    minutes: Arc<dyn MinutesRecorder>,
    presence: Arc<dyn PresenceTracker>,
    directory: Arc<dyn TaskDirectory>,
    classifier: Arc<dyn StanceClassifier>,
    locks: MeetingLocks,
    config: ConsensusConfig,
}

impl<G: OneShotGateway + 'static> ReviewConsensusUseCase<G> {
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

    /// Run one round of review consensus to a terminal outcome.
    ///
    /// Never panics and never returns an error: expected interruptions
    /// resolve to [`ReviewOutcome::Aborted`] and unclassified faults to
    /// [`ReviewOutcome::Errored`], both after the same cleanup (finish
    /// meeting, dismiss presence, release lock).
    pub async fn execute(&self, input: ReviewConsensusInput) -> ReviewOutcome {
        // Lock before any suspension point. A meeting already in flight
        // for this task is an idempotent no-op.
        let Some(_guard) = self.locks.try_acquire(LockNamespace::Review, &input.task_id) else {
            debug!(task = %input.task_id, "review meeting already in flight; no-op");
            return ReviewOutcome::Aborted;
        };

        let selector = LeaderSelector::new(Arc::clone(&self.directory));
        let opts = SelectorOptions {
            min_quorum: self.config.min_quorum,
        };
        let leaders = selector
            .resolve(&input.task_id, &input.fallback_department, &opts)
            .await;

        if leaders.is_empty() {
            info!(task = %input.task_id, "no leaders resolved; completing without a meeting");
            return ReviewOutcome::Approved {
                residual_risks: Vec::new(),
            };
        }

        let mut meeting_id = None;
        match self.run_protocol(&input, &leaders, &mut meeting_id).await {
            Ok(outcome) => {
                if let Some(id) = &meeting_id {
                    let _ = self.minutes.finish(id, MeetingStatus::Completed).await;
                }
                self.presence.dismiss(&input.task_id, &leaders).await;
                info!(task = %input.task_id, outcome = %outcome, "review consensus resolved");
                outcome
            }
            Err(ReviewConsensusError::Interrupted) => {
                info!(task = %input.task_id, "meeting interrupted; ending as failed");
                if let Some(id) = &meeting_id {
                    let _ = self.minutes.finish(id, MeetingStatus::Failed).await;
                }
                self.presence.dismiss(&input.task_id, &leaders).await;
                self.directory.clear_workflow_caches(&input.task_id).await;
                ReviewOutcome::Aborted
            }
            Err(e) => {
                warn!(task = %input.task_id, error = %e, "review consensus fault");
                if let Some(id) = &meeting_id {
                    let _ = self.minutes.finish(id, MeetingStatus::Failed).await;
                }
                self.presence.dismiss(&input.task_id, &leaders).await;
                let notice = Notice::MeetingFailed.text(input.locale);
                self.directory.notify_operator(&input.task_id, &notice).await;
                self.directory
                    .append_log(&input.task_id, "review_failed", &e.to_string())
                    .await;
                ReviewOutcome::Errored {
                    message: e.to_string(),
                }
            }
        }
        // _guard drops here: the lock is released on every path exactly once
    }

    async fn run_protocol(
        &self,
        input: &ReviewConsensusInput,
        leaders: &[Leader],
        meeting_id_out: &mut Option<MeetingId>,
    ) -> Result<ReviewOutcome, ReviewConsensusError> {
        let latest = self
            .minutes
            .latest_for_task(&input.task_id, MeetingKind::Review)
            .await?;

        // Resume an in-progress meeting at its existing round; otherwise
        // increment from the latest completed round. A failed meeting
        // re-runs its round rather than advancing past it.
        let (round, resuming) = match &latest {
            Some(m) if m.is_in_progress() => (Round::derive(m.round, self.config.max_rounds), true),
            Some(m) if m.status == MeetingStatus::Failed => {
                (Round::derive(m.round, self.config.max_rounds), false)
            }
            Some(m) => (Round::derive(m.round + 1, self.config.max_rounds), false),
            None => (Round::derive(1, self.config.max_rounds), false),
        };

        if round.capped && !resuming {
            let notice = Notice::RoundsExhausted {
                max_rounds: self.config.max_rounds,
            }
            .text(input.locale);
            info!(task = %input.task_id, round = round.number, "review rounds exhausted");
            self.directory.notify_operator(&input.task_id, &notice).await;
            self.directory
                .append_log(&input.task_id, "rounds_exhausted", &notice)
                .await;
            return Ok(ReviewOutcome::ForcedApproval { notice });
        }

        let (meeting_id, mut seq, mut transcript) = match latest {
            Some(m) if resuming => {
                let notice = Notice::RoundResumed {
                    round: round.number,
                }
                .text(input.locale);
                self.directory.notify_operator(&input.task_id, &notice).await;
                (m.id.clone(), m.next_seq(), Transcript::from_entries(&m.entries))
            }
            _ => {
                let id = self
                    .minutes
                    .begin(&input.task_id, MeetingKind::Review, round.number, &input.title)
                    .await?;
                let notice = Notice::RoundStarted {
                    round: round.number,
                }
                .text(input.locale);
                self.directory.notify_operator(&input.task_id, &notice).await;
                (id, 1, Transcript::new())
            }
        };
        *meeting_id_out = Some(meeting_id.clone());

        self.presence
            .call(&input.task_id, leaders, EntryKind::Opening)
            .await;

        let mut state = RoundState {
            needs_revision: false,
            ledger: SignalLedger::new(
                self.config.max_signals_per_round,
                self.config.max_signals_per_department,
            ),
            remediation_items: Vec::new(),
            residual_risks: Vec::new(),
        };

        // The planning lead speaks first; when absent, the first resolved
        // leader substitutes.
        let lead = &leaders[0];

        // Opening
        let prompt = MeetingPromptTemplate::opening(&input.title, round.mode, &transcript);
        let text = self
            .take_turn(input, lead, 0, EntryKind::Opening, &prompt, &meeting_id, &mut seq, &mut transcript)
            .await?;
        self.scan_for_revision(lead, &text, &mut state);

        // Feedback, or solo conclusion when the lead is alone
        if leaders.len() == 1 {
            return self
                .solo_conclusion(input, lead, round, &meeting_id, &mut seq, &mut transcript, state)
                .await;
        }

        for (seat, leader) in leaders.iter().enumerate().skip(1) {
            let prompt = MeetingPromptTemplate::feedback(
                &input.title,
                leader.department.as_str(),
                round.mode,
                &transcript,
            );
            let text = self
                .take_turn(input, leader, seat, EntryKind::Feedback, &prompt, &meeting_id, &mut seq, &mut transcript)
                .await?;
            self.scan_for_revision(leader, &text, &mut state);
        }

        // Summary by the lead
        let prompt = MeetingPromptTemplate::summary(&input.title, round.mode, &transcript);
        self.take_turn(input, lead, 0, EntryKind::Summary, &prompt, &meeting_id, &mut seq, &mut transcript)
            .await?;

        // Approval poll: every leader states a final position. Revision
        // intent here can still flip the round even after earlier phases.
        for (seat, leader) in leaders.iter().enumerate() {
            let prompt = MeetingPromptTemplate::approval(
                &input.title,
                leader.department.as_str(),
                &transcript,
            );
            let text = self
                .take_turn(input, leader, seat, EntryKind::Approval, &prompt, &meeting_id, &mut seq, &mut transcript)
                .await?;

            if detect_revision_intent(&text) {
                self.scan_for_revision(leader, &text, &mut state);
            } else if self.classifier.classify(&text) == Some(Stance::Approved) {
                // Non-blocking concerns voiced at approval become residual risks
                state
                    .residual_risks
                    .extend(extract_plan_items(&text, self.config.max_plan_items));
            }
        }

        self.checkpoint(&input.task_id).await?;
        self.resolve_outcome(input, round, state).await
    }

    /// Solo-review branch: the lead concludes alone, with at most one
    /// revision item.
    #[allow(clippy::too_many_arguments)]
    async fn solo_conclusion(
        &self,
        input: &ReviewConsensusInput,
        lead: &Leader,
        round: Round,
        meeting_id: &MeetingId,
        seq: &mut u64,
        transcript: &mut Transcript,
        mut state: RoundState,
    ) -> Result<ReviewOutcome, ReviewConsensusError> {
        let prompt = MeetingPromptTemplate::solo_conclusion(&input.title, round.mode, transcript);
        let text = self
            .take_turn(input, lead, 0, EntryKind::Closing, &prompt, meeting_id, seq, transcript)
            .await?;
        self.scan_for_revision(lead, &text, &mut state);
        state.remediation_items.truncate(1);

        self.checkpoint(&input.task_id).await?;
        self.resolve_outcome(input, round, state).await
    }

    /// One sequential turn: checkpoint, model call (with its single
    /// retry), minute append, presence update, pacing delay.
    #[allow(clippy::too_many_arguments)]
    async fn take_turn(
        &self,
        input: &ReviewConsensusInput,
        leader: &Leader,
        seat: usize,
        kind: EntryKind,
        prompt: &str,
        meeting_id: &MeetingId,
        seq: &mut u64,
        transcript: &mut Transcript,
    ) -> Result<String, ReviewConsensusError> {
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

    /// Execute one model call, retrying exactly once with a compacted
    /// prompt on a timeout. A second failure is logged and tolerated: the
    /// protocol never stalls indefinitely on one unreachable leader.
    async fn call_with_retry(
        &self,
        input: &ReviewConsensusInput,
        leader: &Leader,
        prompt: &str,
        transcript: &Transcript,
    ) -> Result<String, ReviewConsensusError> {
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

    /// Scan a reply for revision intent and record the signal under caps.
    ///
    /// `needs_revision` flips regardless of whether the caps accept the
    /// signal; the caps only bound how many items are actioned.
    fn scan_for_revision(&self, leader: &Leader, text: &str, state: &mut RoundState) {
        if !detect_revision_intent(text) {
            return;
        }
        state.needs_revision = true;
        if state
            .ledger
            .record(&leader.id, &leader.department)
            .is_some()
        {
            state
                .remediation_items
                .extend(extract_plan_items(text, self.config.max_plan_items));
        }
    }

    /// Combine revision state, round mode, and the remediation budget
    /// into the round's terminal outcome.
    async fn resolve_outcome(
        &self,
        input: &ReviewConsensusInput,
        round: Round,
        mut state: RoundState,
    ) -> Result<ReviewOutcome, ReviewConsensusError> {
        if state.needs_revision {
            if round.mode.accepts_remediation() {
                let already = self
                    .directory
                    .remediation_request_count(&input.task_id)
                    .await;
                let budget = self
                    .config
                    .max_remediation_requests
                    .saturating_sub(already);
                if budget > 0 {
                    let mut items = dedupe(state.remediation_items);
                    items.truncate(budget.min(self.config.max_plan_items));
                    if items.is_empty() {
                        items.push(format!(
                            "Address review feedback from round {}",
                            round.number
                        ));
                    }
                    let opened = self
                        .directory
                        .open_remediation_subtasks(&input.task_id, &items)
                        .await;
                    let notice = Notice::RemediationScheduled { count: opened }.text(input.locale);
                    self.directory.notify_operator(&input.task_id, &notice).await;
                    self.directory
                        .append_log(&input.task_id, "remediation_scheduled", &notice)
                        .await;
                    return Ok(ReviewOutcome::Revise {
                        items,
                        owner: state.ledger.owner().cloned(),
                    });
                }
            }

            // Final-decision semantics or exhausted budget: force approval
            // with an explicit notice, keeping unactioned concerns as memo.
            let notice = Notice::ForcedApproval.text(input.locale);
            self.directory.notify_operator(&input.task_id, &notice).await;
            self.directory
                .append_log(&input.task_id, "forced_approval", &notice)
                .await;
            if !state.remediation_items.is_empty() {
                state.remediation_items.truncate(self.config.max_plan_items);
                self.directory
                    .save_memo(&input.task_id, &state.remediation_items)
                    .await;
            }
            return Ok(ReviewOutcome::ForcedApproval { notice });
        }

        if round.mode == RoundMode::MergeSynthesis {
            self.directory
                .append_log(&input.task_id, "merge_ready", "consolidation validated")
                .await;
            return Ok(ReviewOutcome::MergeReady);
        }

        state.residual_risks.truncate(self.config.max_plan_items);
        if !state.residual_risks.is_empty() {
            self.directory
                .save_memo(&input.task_id, &state.residual_risks)
                .await;
        }
        Ok(ReviewOutcome::Approved {
            residual_risks: state.residual_risks,
        })
    }

    /// Cooperative cancellation checkpoint.
    async fn checkpoint(&self, task_id: &str) -> Result<(), ReviewConsensusError> {
        match self.directory.task_status(task_id).await {
            Some(status) if !status.is_interruption() => Ok(()),
            _ => Err(ReviewConsensusError::Interrupted),
        }
    }
}

fn dedupe(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items.into_iter().filter(|i| seen.insert(i.clone())).collect()
}

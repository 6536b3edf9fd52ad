//! Consensus engine facade
//!
//! The single entry point callers wire into their workflow. Each `start_*`
//! method spawns the corresponding use case onto the runtime and fires the
//! caller's continuation only when the run actually reached an approval:
//! aborted, errored, and skipped runs return without invoking it, so a
//! stopped task can never advance its workflow.

use crate::config::ConsensusConfig;
use crate::locks::MeetingLocks;
use crate::ports::directory::TaskDirectory;
use crate::ports::llm_gateway::OneShotGateway;
use crate::ports::minutes::MinutesRecorder;
use crate::ports::presence::PresenceTracker;
use crate::use_cases::{
    PlannedApprovalInput, PlannedApprovalUseCase, PlannedRun, ReviewConsensusInput,
    ReviewConsensusUseCase,
};
use council_domain::{ReviewOutcome, StanceClassifier};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Facade wiring both consensus protocols over one shared lock set
pub struct ConsensusEngine<G: OneShotGateway + 'static> {
    review: Arc<ReviewConsensusUseCase<G>>,
    planned: Arc<PlannedApprovalUseCase<G>>,
}

impl<G: OneShotGateway + 'static> ConsensusEngine<G> {
    pub fn new(
        gateway: Arc<G>,
        minutes: Arc<dyn MinutesRecorder>,
        presence: Arc<dyn PresenceTracker>,
        directory: Arc<dyn TaskDirectory>,
        classifier: Arc<dyn StanceClassifier>,
        config: ConsensusConfig,
    ) -> Self {
        // One lock set across both variants keeps the review/planned
        // namespaces in a single place.
        let locks = MeetingLocks::new();
        Self {
            review: Arc::new(ReviewConsensusUseCase::new(
                Arc::clone(&gateway),
                Arc::clone(&minutes),
                Arc::clone(&presence),
                Arc::clone(&directory),
                Arc::clone(&classifier),
                locks.clone(),
                config.clone(),
            )),
            planned: Arc::new(PlannedApprovalUseCase::new(
                gateway,
                minutes,
                presence,
                directory,
                classifier,
                locks,
                config,
            )),
        }
    }

    /// Start a review consensus in the background.
    ///
    /// `on_approved` fires for `Approved` and `ForcedApproval` outcomes
    /// only, after the meeting is fully finalized.
    pub fn start_review_consensus<F>(
        &self,
        input: ReviewConsensusInput,
        on_approved: F,
    ) -> JoinHandle<ReviewOutcome>
    where
        F: FnOnce() + Send + 'static,
    {
        let use_case = Arc::clone(&self.review);
        tokio::spawn(async move {
            let task_id = input.task_id.clone();
            let outcome = use_case.execute(input).await;
            if outcome.is_approval() {
                info!(task = %task_id, outcome = %outcome, "review approved; firing continuation");
                on_approved();
            }
            outcome
        })
    }

    /// Start a planned (kickoff) approval in the background.
    ///
    /// `on_approved` receives the capped action items on every completed
    /// run, holds included; it is skipped for aborted and errored runs.
    pub fn start_planned_approval<F>(
        &self,
        input: PlannedApprovalInput,
        on_approved: F,
    ) -> JoinHandle<PlannedRun>
    where
        F: FnOnce(Vec<String>) + Send + 'static,
    {
        let use_case = Arc::clone(&self.planned);
        tokio::spawn(async move {
            let task_id = input.task_id.clone();
            let run = use_case.execute(input).await;
            if let PlannedRun::Completed(outcome) = &run {
                info!(
                    task = %task_id,
                    items = outcome.plan_items.len(),
                    "kickoff approved; firing continuation"
                );
                on_approved(outcome.plan_items.clone());
            }
            run
        })
    }
}

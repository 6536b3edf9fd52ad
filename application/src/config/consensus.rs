//! Consensus engine configuration
//!
//! The caps here are what keep an otherwise open-ended conversational
//! protocol terminating: bounded rounds, bounded revision signals per
//! round and per department, and a cumulative remediation budget per task.

use serde::{Deserialize, Serialize};

/// Resource caps and timing for the consensus protocols
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusConfig {
    /// Rounds past this count run with forced final-decision semantics
    pub max_rounds: u32,
    /// Cumulative remediation subtasks allowed per task, across rounds
    pub max_remediation_requests: usize,
    /// Revision signals accepted per round
    pub max_signals_per_round: usize,
    /// Revision signals accepted per department per round
    pub max_signals_per_department: usize,
    /// Plan/memo items kept per extraction
    pub max_plan_items: usize,
    /// Minimum leader count before widening to all active leaders
    pub min_quorum: usize,
    /// Per-turn model-call timeout in milliseconds
    pub turn_timeout_ms: u64,
    /// Pacing delay between turns in milliseconds
    pub pacing_delay_ms: u64,
    /// Presence hold window in milliseconds
    pub presence_hold_ms: u64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            max_rounds: 3,
            max_remediation_requests: 5,
            max_signals_per_round: 3,
            max_signals_per_department: 2,
            max_plan_items: 5,
            min_quorum: 2,
            turn_timeout_ms: 120_000,
            pacing_delay_ms: 1_500,
            presence_hold_ms: 600_000,
        }
    }
}

impl ConsensusConfig {
    /// Set the maximum round count.
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Set the cumulative remediation budget per task.
    pub fn with_max_remediation_requests(mut self, cap: usize) -> Self {
        self.max_remediation_requests = cap;
        self
    }

    /// Set the per-turn model-call timeout.
    pub fn with_turn_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.turn_timeout_ms = timeout_ms;
        self
    }

    /// Set the pacing delay between turns.
    pub fn with_pacing_delay_ms(mut self, delay_ms: u64) -> Self {
        self.pacing_delay_ms = delay_ms;
        self
    }

    /// Set the minimum quorum before widening.
    pub fn with_min_quorum(mut self, min_quorum: usize) -> Self {
        self.min_quorum = min_quorum;
        self
    }
}

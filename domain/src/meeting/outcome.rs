//! Terminal outcomes of the consensus protocols

use crate::leader::LeaderId;
use serde::{Deserialize, Serialize};

/// How a review-consensus meeting resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum ReviewOutcome {
    /// All leaders approved; the task is ready to close.
    Approved {
        /// Concerns voiced during the approval poll that did not block
        residual_risks: Vec<String>,
    },
    /// Remediation is required before approval; a next round follows.
    Revise {
        items: Vec<String>,
        owner: Option<LeaderId>,
    },
    /// Round-2 consolidation validated; advance to final decision.
    MergeReady,
    /// Caps exhausted; approval forced despite outstanding concerns.
    ForcedApproval { notice: String },
    /// External task state change ended the meeting early.
    Aborted,
    /// Unclassified runtime fault; meeting marked failed.
    Errored { message: String },
}

impl ReviewOutcome {
    /// Whether this outcome fires the caller's `on_approved` callback
    pub fn is_approval(&self) -> bool {
        matches!(
            self,
            ReviewOutcome::Approved { .. } | ReviewOutcome::ForcedApproval { .. }
        )
    }

    pub fn is_terminal_failure(&self) -> bool {
        matches!(self, ReviewOutcome::Aborted | ReviewOutcome::Errored { .. })
    }
}

impl std::fmt::Display for ReviewOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewOutcome::Approved { .. } => write!(f, "approved"),
            ReviewOutcome::Revise { items, .. } => write!(f, "revise ({} items)", items.len()),
            ReviewOutcome::MergeReady => write!(f, "merge_ready"),
            ReviewOutcome::ForcedApproval { .. } => write!(f, "forced_approval"),
            ReviewOutcome::Aborted => write!(f, "aborted"),
            ReviewOutcome::Errored { message } => write!(f, "errored: {}", message),
        }
    }
}

/// How a planned-approval meeting resolved
///
/// Kickoff never blocks: concerns become action items and the meeting
/// always completes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlannedOutcome {
    /// Capped list of action items extracted from leader concerns
    pub plan_items: Vec<String>,
    /// True when any leader signalled a hold; informational only
    pub has_supplement_signals: bool,
}

impl PlannedOutcome {
    pub fn new(plan_items: Vec<String>, has_supplement_signals: bool) -> Self {
        Self {
            plan_items,
            has_supplement_signals,
        }
    }
}

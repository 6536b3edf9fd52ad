//! Revision signals and per-round caps
//!
//! A revision signal is a classified indication that a leader's reply
//! requests changes before approval. The ledger enforces the per-round
//! and per-department caps that keep an open-ended conversational
//! protocol bounded; the cumulative per-task cap lives with the
//! orchestrator, which sees all rounds.

use crate::leader::{Department, LeaderId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One accepted revision request within a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionSignal {
    pub leader: LeaderId,
    pub department: Department,
    /// The first accepted signal in a round owns the revision
    pub primary: bool,
}

/// Per-round ledger of revision signals
#[derive(Debug, Clone)]
pub struct SignalLedger {
    max_per_round: usize,
    max_per_department: usize,
    signals: Vec<RevisionSignal>,
    per_department: HashMap<Department, usize>,
}

impl SignalLedger {
    pub fn new(max_per_round: usize, max_per_department: usize) -> Self {
        Self {
            max_per_round,
            max_per_department,
            signals: Vec::new(),
            per_department: HashMap::new(),
        }
    }

    /// Record a revision signal, if the caps allow it.
    ///
    /// Returns the accepted signal, or `None` when either cap is already
    /// reached. The first accepted signal becomes the primary owner.
    pub fn record(&mut self, leader: &LeaderId, department: &Department) -> Option<RevisionSignal> {
        if self.signals.len() >= self.max_per_round {
            return None;
        }

        let dept_count = self.per_department.entry(department.clone()).or_insert(0);
        if *dept_count >= self.max_per_department {
            return None;
        }
        *dept_count += 1;

        let signal = RevisionSignal {
            leader: leader.clone(),
            department: department.clone(),
            primary: self.signals.is_empty(),
        };
        self.signals.push(signal.clone());
        Some(signal)
    }

    /// The round's revise-owner: the leader behind the primary signal.
    pub fn owner(&self) -> Option<&LeaderId> {
        self.signals.iter().find(|s| s.primary).map(|s| &s.leader)
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn signals(&self) -> &[RevisionSignal] {
        &self.signals
    }
}

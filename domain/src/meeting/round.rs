//! Review rounds and round modes
//!
//! A round is one full pass of the consensus protocol for a task. Its
//! number is monotonically increasing per task and reconstructed from the
//! most recent meeting record on restart. The round number derives a
//! [`RoundMode`] that governs what leaders may request during the round.

use serde::{Deserialize, Serialize};

/// What leaders are allowed to ask for in a given round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundMode {
    /// Round 1: surface every remediation item in one pass
    ParallelRemediation,
    /// Round 2: validate consolidation and judge merge-readiness
    MergeSynthesis,
    /// Round >= 3: no new remediation, final decision only
    FinalDecision,
}

impl RoundMode {
    /// Derive the mode for a round number.
    ///
    /// A round past `max_rounds` is forced to `FinalDecision` regardless
    /// of its natural mode, so the protocol always terminates.
    pub fn for_round(round: u32, max_rounds: u32) -> Self {
        if round > max_rounds {
            return RoundMode::FinalDecision;
        }
        match round {
            0 | 1 => RoundMode::ParallelRemediation,
            2 => RoundMode::MergeSynthesis,
            _ => RoundMode::FinalDecision,
        }
    }

    /// Whether new remediation requests are accepted in this mode
    pub fn accepts_remediation(&self) -> bool {
        !matches!(self, RoundMode::FinalDecision)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoundMode::ParallelRemediation => "parallel_remediation",
            RoundMode::MergeSynthesis => "merge_synthesis",
            RoundMode::FinalDecision => "final_decision",
        }
    }
}

impl std::fmt::Display for RoundMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A round number with its derived mode and cap state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub number: u32,
    pub mode: RoundMode,
    /// True when `number` exceeded the configured maximum and the mode
    /// was forced to `FinalDecision`
    pub capped: bool,
}

impl Round {
    /// Build a round with its derived mode.
    pub fn derive(number: u32, max_rounds: u32) -> Self {
        Self {
            number,
            mode: RoundMode::for_round(number, max_rounds),
            capped: number > max_rounds,
        }
    }

    /// The round that follows this one.
    pub fn next(&self, max_rounds: u32) -> Self {
        Self::derive(self.number + 1, max_rounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_derivation() {
        assert_eq!(RoundMode::for_round(1, 3), RoundMode::ParallelRemediation);
        assert_eq!(RoundMode::for_round(2, 3), RoundMode::MergeSynthesis);
        assert_eq!(RoundMode::for_round(3, 3), RoundMode::FinalDecision);
        assert_eq!(RoundMode::for_round(7, 3), RoundMode::FinalDecision);
    }

    #[test]
    fn test_cap_forces_final_decision() {
        // Natural mode for round 2 is merge_synthesis, but a cap of 1
        // forces final_decision semantics
        assert_eq!(RoundMode::for_round(2, 1), RoundMode::FinalDecision);

        let round = Round::derive(2, 1);
        assert!(round.capped);
        assert!(!round.mode.accepts_remediation());
    }

    #[test]
    fn test_uncapped_round() {
        let round = Round::derive(1, 3);
        assert!(!round.capped);
        assert_eq!(round.mode, RoundMode::ParallelRemediation);
        assert!(round.mode.accepts_remediation());
    }

    #[test]
    fn test_next_round() {
        let round = Round::derive(1, 3);
        let next = round.next(3);
        assert_eq!(next.number, 2);
        assert_eq!(next.mode, RoundMode::MergeSynthesis);
    }
}

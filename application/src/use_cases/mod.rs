//! Use cases orchestrating the consensus protocols

pub mod planned_approval;
pub mod review_consensus;

#[cfg(test)]
pub(crate) mod fakes;

pub use planned_approval::{
    PlannedApprovalError, PlannedApprovalInput, PlannedApprovalUseCase, PlannedRun,
};
pub use review_consensus::{ReviewConsensusError, ReviewConsensusInput, ReviewConsensusUseCase};

//! Application layer for the council consensus engine
//!
//! Use cases orchestrate meeting-based consensus over ports; adapters for
//! the ports live in the infrastructure layer. Nothing here performs I/O
//! directly.

pub mod config;
pub mod engine;
pub mod locks;
pub mod ports;
pub mod selector;
pub mod use_cases;

pub use config::ConsensusConfig;
pub use engine::ConsensusEngine;
pub use locks::{LockNamespace, MeetingLockGuard, MeetingLocks};
pub use ports::directory::{AssignmentMode, TaskDirectory, TaskExternalStatus, TaskRecord};
pub use ports::llm_gateway::{GatewayError, OneShotGateway, OneShotOptions, OneShotReply};
pub use ports::minutes::{MinutesError, MinutesRecorder};
pub use ports::presence::{NoPresence, PresenceTracker, MAX_CALLED_LEADERS};
pub use ports::speech::{NoSpeechPublisher, SpeechEvent, SpeechPublisher};
pub use selector::{LeaderSelector, SelectorOptions};
pub use use_cases::{
    PlannedApprovalError, PlannedApprovalInput, PlannedApprovalUseCase, PlannedRun,
    ReviewConsensusError, ReviewConsensusInput, ReviewConsensusUseCase,
};

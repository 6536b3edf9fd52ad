//! Port definitions (interfaces to infrastructure)

pub mod directory;
pub mod llm_gateway;
pub mod minutes;
pub mod presence;
pub mod speech;

pub use directory::{AssignmentMode, TaskDirectory, TaskExternalStatus, TaskRecord};
pub use llm_gateway::{GatewayError, OneShotGateway, OneShotOptions, OneShotReply};
pub use minutes::{MinutesError, MinutesRecorder};
pub use presence::{MAX_CALLED_LEADERS, NoPresence, PresenceTracker};
pub use speech::{NoSpeechPublisher, SpeechEvent, SpeechPublisher};

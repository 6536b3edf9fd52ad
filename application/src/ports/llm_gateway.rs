//! One-shot LLM gateway port
//!
//! Defines the interface for executing a single prompt/response turn with
//! a leader's backing model. Implementations (adapters) live in the
//! infrastructure layer; the orchestrators only see this trait.

use async_trait::async_trait;
use council_domain::Leader;
use thiserror::Error;

/// Errors that can occur during a one-shot model call
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Model call timed out")]
    Timeout,

    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl GatewayError {
    /// Whether this error carries the timeout signature that triggers the
    /// orchestrator's single compacted-prompt retry.
    pub fn is_timeout(&self) -> bool {
        matches!(self, GatewayError::Timeout)
    }
}

/// Options for a single one-shot turn
#[derive(Debug, Clone, Default)]
pub struct OneShotOptions {
    /// Working directory context handed to the provider
    pub project_path: Option<String>,
    /// Per-turn timeout in milliseconds
    pub timeout_ms: u64,
}

impl OneShotOptions {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            project_path: None,
            timeout_ms,
        }
    }

    pub fn with_project_path(mut self, path: impl Into<String>) -> Self {
        self.project_path = Some(path.into());
        self
    }
}

/// A completed one-shot reply
#[derive(Debug, Clone)]
pub struct OneShotReply {
    pub text: String,
}

impl OneShotReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Gateway executing one prompt/response turn per call
///
/// The engine never holds provider sessions open: every turn is a fresh
/// invocation so an unreachable provider can only cost one timeout.
#[async_trait]
pub trait OneShotGateway: Send + Sync {
    async fn run_one_shot(
        &self,
        leader: &Leader,
        prompt: &str,
        opts: &OneShotOptions,
    ) -> Result<OneShotReply, GatewayError>;
}

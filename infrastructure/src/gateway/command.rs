//! One-shot gateway over an external CLI.
//!
//! Each turn spawns the configured command, writes the prompt to its
//! stdin, and reads the reply from stdout. No session is held between
//! turns, so a wedged provider can only cost one timeout.

use async_trait::async_trait;
use council_application::ports::llm_gateway::{
    GatewayError, OneShotGateway, OneShotOptions, OneShotReply,
};
use council_domain::Leader;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Maximum reply size kept from a single turn (1 MB)
const MAX_REPLY_SIZE: usize = 1024 * 1024;

/// [`OneShotGateway`] adapter spawning one process per turn.
///
/// The speaking leader is exposed to the child through environment
/// variables (`COUNCIL_LEADER`, `COUNCIL_DEPARTMENT`) so a wrapper
/// script can route to per-leader models.
pub struct CommandGateway {
    program: String,
    args: Vec<String>,
}

impl CommandGateway {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }
}

#[async_trait]
impl OneShotGateway for CommandGateway {
    async fn run_one_shot(
        &self,
        leader: &Leader,
        prompt: &str,
        opts: &OneShotOptions,
    ) -> Result<OneShotReply, GatewayError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .env("COUNCIL_LEADER", leader.id.as_str())
            .env("COUNCIL_DEPARTMENT", leader.department.as_str())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(path) = &opts.project_path {
            cmd.current_dir(path);
        }

        debug!(
            leader = %leader.id,
            program = %self.program,
            timeout_ms = opts.timeout_ms,
            "spawning one-shot turn"
        );

        let mut child = cmd
            .spawn()
            .map_err(|e| GatewayError::Unavailable(format!("{}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(prompt.as_bytes())
                .await
                .map_err(|e| GatewayError::RequestFailed(format!("stdin write: {}", e)))?;
            // Close stdin so the child sees EOF
            drop(stdin);
        }

        let output = tokio::time::timeout(
            Duration::from_millis(opts.timeout_ms),
            child.wait_with_output(),
        )
        .await
        .map_err(|_| GatewayError::Timeout)?
        .map_err(|e| GatewayError::RequestFailed(format!("wait: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GatewayError::RequestFailed(format!(
                "exit {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        if text.len() > MAX_REPLY_SIZE {
            text.truncate(MAX_REPLY_SIZE);
        }
        Ok(OneShotReply::new(text.trim().to_string()))
    }
}

/// Gateway answering every prompt with a fixed reply, for dry runs.
pub struct CannedGateway {
    reply: String,
}

impl CannedGateway {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl OneShotGateway for CannedGateway {
    async fn run_one_shot(
        &self,
        _leader: &Leader,
        _prompt: &str,
        _opts: &OneShotOptions,
    ) -> Result<OneShotReply, GatewayError> {
        Ok(OneShotReply::new(self.reply.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::Department;

    fn leader() -> Leader {
        Leader::new("lead-backend", Department::new("backend"), "L")
    }

    #[tokio::test]
    async fn test_cat_echoes_prompt() {
        let gateway = CommandGateway::new("cat");
        let reply = gateway
            .run_one_shot(&leader(), "hello council", &OneShotOptions::new(5_000))
            .await
            .unwrap();
        assert_eq!(reply.text, "hello council");
    }

    #[tokio::test]
    async fn test_missing_program_is_unavailable() {
        let gateway = CommandGateway::new("definitely-not-a-real-program-xyz");
        let err = gateway
            .run_one_shot(&leader(), "hello", &OneShotOptions::new(5_000))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_slow_program_times_out() {
        let gateway = CommandGateway::new("sleep").with_args(vec!["5".to_string()]);
        let err = gateway
            .run_one_shot(&leader(), "", &OneShotOptions::new(100))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_request_failed() {
        let gateway = CommandGateway::new("sh").with_args(vec![
            "-c".to_string(),
            "echo boom >&2; exit 3".to_string(),
        ]);
        let err = gateway
            .run_one_shot(&leader(), "", &OneShotOptions::new(5_000))
            .await
            .unwrap_err();
        match err {
            GatewayError::RequestFailed(msg) => {
                assert!(msg.contains("exit 3"));
                assert!(msg.contains("boom"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_canned_gateway() {
        let gateway = CannedGateway::new("APPROVE");
        let reply = gateway
            .run_one_shot(&leader(), "anything", &OneShotOptions::new(1_000))
            .await
            .unwrap();
        assert_eq!(reply.text, "APPROVE");
    }
}

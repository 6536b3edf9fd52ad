//! Task and agent directory port
//!
//! The engine's window onto externally owned state: tasks, projects,
//! agents, and the log/notification side channels. The engine reads task
//! fields and writes only through the side-effect methods here — never
//! the task record itself.

use async_trait::async_trait;
use council_domain::{AgentStatus, Department, Leader, LeaderId};
use serde::{Deserialize, Serialize};

/// Externally visible task status, observed at cancellation checkpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskExternalStatus {
    Active,
    Stopped,
    Reassigned,
    Deleted,
}

impl TaskExternalStatus {
    /// Whether this status interrupts an in-flight meeting
    pub fn is_interruption(&self) -> bool {
        !matches!(self, TaskExternalStatus::Active)
    }
}

/// How a project assigns agents to tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentMode {
    /// Operators pick agents by hand; leader resolution honors the picks
    Manual,
    /// The platform assigns agents; leader resolution infers departments
    Automatic,
}

/// Read view of an externally owned task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub description: String,
    pub department: Department,
    pub status: TaskExternalStatus,
}

/// Directory of tasks, projects, and agents, plus the engine's write-side
/// channels (logs, notifications, memos, remediation subtasks).
#[async_trait]
pub trait TaskDirectory: Send + Sync {
    /// Fetch a task. `None` is a valid "no consensus needed" signal.
    async fn task(&self, task_id: &str) -> Option<TaskRecord>;

    /// Current externally visible status, for cancellation checkpoints.
    async fn task_status(&self, task_id: &str) -> Option<TaskExternalStatus>;

    async fn assignment_mode(&self, project_id: &str) -> AssignmentMode;

    /// Agents manually assigned to a task (manual-assignment projects).
    async fn assigned_agents(&self, task_id: &str) -> Vec<Leader>;

    /// Target departments of the task's subtasks.
    async fn subtask_departments(&self, task_id: &str) -> Vec<Department>;

    /// All currently active leaders, for quorum widening.
    async fn active_leaders(&self) -> Vec<Leader>;

    /// Current leader of a department, if one exists.
    async fn leader_for(&self, department: &Department) -> Option<Leader>;

    async fn agent_status(&self, agent: &LeaderId) -> Option<AgentStatus>;

    async fn set_agent_status(&self, agent: &LeaderId, status: AgentStatus);

    /// Append a task-scoped log line.
    async fn append_log(&self, task_id: &str, kind: &str, message: &str);

    /// Send a localized notice to the operator.
    async fn notify_operator(&self, task_id: &str, message: &str);

    /// Open remediation subtasks; returns how many were actually opened.
    async fn open_remediation_subtasks(&self, task_id: &str, items: &[String]) -> usize;

    /// Cumulative remediation requests already opened for this task.
    async fn remediation_request_count(&self, task_id: &str) -> usize;

    /// Persist a task-level memo (plan items, residual risks).
    async fn save_memo(&self, task_id: &str, items: &[String]);

    /// Drop workflow-scoped caches for a task after an interruption.
    async fn clear_workflow_caches(&self, task_id: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interruption_statuses() {
        assert!(!TaskExternalStatus::Active.is_interruption());
        assert!(TaskExternalStatus::Stopped.is_interruption());
        assert!(TaskExternalStatus::Reassigned.is_interruption());
        assert!(TaskExternalStatus::Deleted.is_interruption());
    }
}

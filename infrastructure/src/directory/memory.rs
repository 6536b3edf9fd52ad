//! In-memory task directory.
//!
//! Backs the engine when the surrounding platform is not attached: the
//! CLI seeds it from a scenario file and reads the notices, logs, and
//! memos back out after the meeting ends.

use async_trait::async_trait;
use council_application::ports::directory::{
    AssignmentMode, TaskDirectory, TaskExternalStatus, TaskRecord,
};
use council_domain::{AgentStatus, Department, Leader, LeaderId};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct DirectoryState {
    tasks: HashMap<String, TaskRecord>,
    statuses: HashMap<String, TaskExternalStatus>,
    department_leaders: HashMap<Department, Leader>,
    active: Vec<Leader>,
    assignment_modes: HashMap<String, AssignmentMode>,
    assigned: HashMap<String, Vec<Leader>>,
    subtask_departments: HashMap<String, Vec<Department>>,
    agent_statuses: HashMap<LeaderId, AgentStatus>,
    logs: HashMap<String, Vec<(String, String)>>,
    notices: HashMap<String, Vec<String>>,
    memos: HashMap<String, Vec<String>>,
    remediation_counts: HashMap<String, usize>,
}

/// Seedable in-memory [`TaskDirectory`] adapter
pub struct InMemoryDirectory {
    inner: Mutex<DirectoryState>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(DirectoryState::default()),
        }
    }

    pub fn add_task(&self, task: TaskRecord) {
        let mut state = self.inner.lock().expect("directory poisoned");
        state.statuses.insert(task.id.clone(), task.status);
        state.tasks.insert(task.id.clone(), task);
    }

    /// Register a leader as both a department leader and an active agent.
    pub fn add_leader(&self, leader: Leader) {
        let mut state = self.inner.lock().expect("directory poisoned");
        state
            .department_leaders
            .insert(leader.department.clone(), leader.clone());
        state.active.push(leader);
    }

    pub fn set_assignment_mode(&self, project_id: &str, mode: AssignmentMode) {
        self.inner
            .lock()
            .expect("directory poisoned")
            .assignment_modes
            .insert(project_id.to_string(), mode);
    }

    pub fn assign_agent(&self, task_id: &str, leader: Leader) {
        self.inner
            .lock()
            .expect("directory poisoned")
            .assigned
            .entry(task_id.to_string())
            .or_default()
            .push(leader);
    }

    pub fn add_subtask_department(&self, task_id: &str, department: Department) {
        self.inner
            .lock()
            .expect("directory poisoned")
            .subtask_departments
            .entry(task_id.to_string())
            .or_default()
            .push(department);
    }

    pub fn set_task_status(&self, task_id: &str, status: TaskExternalStatus) {
        self.inner
            .lock()
            .expect("directory poisoned")
            .statuses
            .insert(task_id.to_string(), status);
    }

    pub fn notices(&self, task_id: &str) -> Vec<String> {
        self.inner
            .lock()
            .expect("directory poisoned")
            .notices
            .get(task_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn logs(&self, task_id: &str) -> Vec<(String, String)> {
        self.inner
            .lock()
            .expect("directory poisoned")
            .logs
            .get(task_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn memos(&self, task_id: &str) -> Vec<String> {
        self.inner
            .lock()
            .expect("directory poisoned")
            .memos
            .get(task_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskDirectory for InMemoryDirectory {
    async fn task(&self, task_id: &str) -> Option<TaskRecord> {
        self.inner
            .lock()
            .expect("directory poisoned")
            .tasks
            .get(task_id)
            .cloned()
    }

    async fn task_status(&self, task_id: &str) -> Option<TaskExternalStatus> {
        self.inner
            .lock()
            .expect("directory poisoned")
            .statuses
            .get(task_id)
            .copied()
    }

    async fn assignment_mode(&self, project_id: &str) -> AssignmentMode {
        self.inner
            .lock()
            .expect("directory poisoned")
            .assignment_modes
            .get(project_id)
            .copied()
            .unwrap_or(AssignmentMode::Automatic)
    }

    async fn assigned_agents(&self, task_id: &str) -> Vec<Leader> {
        self.inner
            .lock()
            .expect("directory poisoned")
            .assigned
            .get(task_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn subtask_departments(&self, task_id: &str) -> Vec<Department> {
        self.inner
            .lock()
            .expect("directory poisoned")
            .subtask_departments
            .get(task_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn active_leaders(&self) -> Vec<Leader> {
        self.inner.lock().expect("directory poisoned").active.clone()
    }

    async fn leader_for(&self, department: &Department) -> Option<Leader> {
        self.inner
            .lock()
            .expect("directory poisoned")
            .department_leaders
            .get(department)
            .cloned()
    }

    async fn agent_status(&self, agent: &LeaderId) -> Option<AgentStatus> {
        self.inner
            .lock()
            .expect("directory poisoned")
            .agent_statuses
            .get(agent)
            .copied()
    }

    async fn set_agent_status(&self, agent: &LeaderId, status: AgentStatus) {
        self.inner
            .lock()
            .expect("directory poisoned")
            .agent_statuses
            .insert(agent.clone(), status);
    }

    async fn append_log(&self, task_id: &str, kind: &str, message: &str) {
        self.inner
            .lock()
            .expect("directory poisoned")
            .logs
            .entry(task_id.to_string())
            .or_default()
            .push((kind.to_string(), message.to_string()));
    }

    async fn notify_operator(&self, task_id: &str, message: &str) {
        self.inner
            .lock()
            .expect("directory poisoned")
            .notices
            .entry(task_id.to_string())
            .or_default()
            .push(message.to_string());
    }

    async fn open_remediation_subtasks(&self, task_id: &str, items: &[String]) -> usize {
        let mut state = self.inner.lock().expect("directory poisoned");
        *state
            .remediation_counts
            .entry(task_id.to_string())
            .or_default() += items.len();
        items.len()
    }

    async fn remediation_request_count(&self, task_id: &str) -> usize {
        self.inner
            .lock()
            .expect("directory poisoned")
            .remediation_counts
            .get(task_id)
            .copied()
            .unwrap_or(0)
    }

    async fn save_memo(&self, task_id: &str, items: &[String]) {
        self.inner
            .lock()
            .expect("directory poisoned")
            .memos
            .entry(task_id.to_string())
            .or_default()
            .extend(items.iter().cloned());
    }

    async fn clear_workflow_caches(&self, task_id: &str) {
        // Nothing cached in the in-memory adapter; keep the log so a
        // scenario run still shows the interruption cleanup happened.
        self.inner
            .lock()
            .expect("directory poisoned")
            .logs
            .entry(task_id.to_string())
            .or_default()
            .push(("workflow".to_string(), "caches cleared".to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> TaskRecord {
        TaskRecord {
            id: "t-1".to_string(),
            project_id: "p-1".to_string(),
            title: "Ship search v2".to_string(),
            description: String::new(),
            department: Department::new("backend"),
            status: TaskExternalStatus::Active,
        }
    }

    #[tokio::test]
    async fn test_seed_and_read_back() {
        let directory = InMemoryDirectory::new();
        directory.add_task(task());
        directory.add_leader(Leader::new("lead-backend", Department::new("backend"), "L"));

        assert!(directory.task("t-1").await.is_some());
        assert_eq!(
            directory.task_status("t-1").await,
            Some(TaskExternalStatus::Active)
        );
        assert!(
            directory
                .leader_for(&Department::new("backend"))
                .await
                .is_some()
        );
        assert_eq!(directory.active_leaders().await.len(), 1);
    }

    #[tokio::test]
    async fn test_status_override() {
        let directory = InMemoryDirectory::new();
        directory.add_task(task());
        directory.set_task_status("t-1", TaskExternalStatus::Stopped);

        assert_eq!(
            directory.task_status("t-1").await,
            Some(TaskExternalStatus::Stopped)
        );
    }

    #[tokio::test]
    async fn test_remediation_count_accumulates() {
        let directory = InMemoryDirectory::new();
        let opened = directory
            .open_remediation_subtasks("t-1", &["a".to_string(), "b".to_string()])
            .await;
        assert_eq!(opened, 2);
        directory
            .open_remediation_subtasks("t-1", &["c".to_string()])
            .await;
        assert_eq!(directory.remediation_request_count("t-1").await, 3);
    }

    #[tokio::test]
    async fn test_memo_and_notice_capture() {
        let directory = InMemoryDirectory::new();
        directory.save_memo("t-1", &["residual risk".to_string()]).await;
        directory.notify_operator("t-1", "heads up").await;

        assert_eq!(directory.memos("t-1"), vec!["residual risk".to_string()]);
        assert_eq!(directory.notices("t-1"), vec!["heads up".to_string()]);
    }
}

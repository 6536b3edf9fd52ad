//! In-memory fakes for orchestrator tests

use crate::ports::directory::{AssignmentMode, TaskDirectory, TaskExternalStatus, TaskRecord};
use crate::ports::llm_gateway::{GatewayError, OneShotGateway, OneShotOptions, OneShotReply};
use crate::ports::minutes::{MinutesError, MinutesRecorder};
use async_trait::async_trait;
use council_domain::{
    AgentStatus, Department, EntryKind, Leader, LeaderId, Meeting, MeetingId, MeetingKind,
    MeetingStatus, MinuteEntry,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

// ==================== ScriptedGateway ====================

/// Gateway returning scripted replies in order, recording every prompt.
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<Result<String, GatewayError>>>,
    default_reply: Option<String>,
    prompts: Mutex<Vec<String>>,
    stop_hook: Mutex<Option<(usize, Arc<FakeDirectory>, String)>>,
}

impl ScriptedGateway {
    pub fn new(replies: Vec<Result<String, GatewayError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            default_reply: None,
            prompts: Mutex::new(Vec::new()),
            stop_hook: Mutex::new(None),
        }
    }

    /// Gateway that answers every prompt with the same text.
    pub fn always(reply: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            default_reply: Some(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
            stop_hook: Mutex::new(None),
        }
    }

    /// Flip the task's status to `stopped` right after call number `n`.
    pub fn stop_task_after_call(&self, n: usize, directory: Arc<FakeDirectory>, task_id: &str) {
        *self.stop_hook.lock().unwrap() = Some((n, directory, task_id.to_string()));
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompt(&self, index: usize) -> String {
        self.prompts.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl OneShotGateway for ScriptedGateway {
    async fn run_one_shot(
        &self,
        _leader: &Leader,
        prompt: &str,
        _opts: &OneShotOptions,
    ) -> Result<OneShotReply, GatewayError> {
        let call_number = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            prompts.len()
        };

        let reply = match self.replies.lock().unwrap().pop_front() {
            Some(scripted) => scripted,
            None => match &self.default_reply {
                Some(text) => Ok(text.clone()),
                None => Err(GatewayError::Other("script exhausted".to_string())),
            },
        };

        if let Some((n, directory, task_id)) = &*self.stop_hook.lock().unwrap()
            && call_number == *n
        {
            directory.set_status(task_id, TaskExternalStatus::Stopped);
        }

        reply.map(OneShotReply::new)
    }
}

// ==================== FakeMinutes ====================

/// In-memory minutes store with test seeding helpers.
pub struct FakeMinutes {
    inner: Mutex<MinutesState>,
}

#[derive(Default)]
struct MinutesState {
    meetings: Vec<Meeting>,
    next_id: usize,
}

impl FakeMinutes {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MinutesState::default()),
        }
    }

    pub async fn meeting_count(&self) -> usize {
        self.inner.lock().unwrap().meetings.len()
    }

    pub async fn latest(&self, task_id: &str) -> Option<Meeting> {
        self.inner
            .lock()
            .unwrap()
            .meetings
            .iter()
            .rev()
            .find(|m| m.task_id == task_id)
            .cloned()
    }

    /// Seed a completed meeting at the given round.
    pub async fn seed_completed(&self, task_id: &str, kind: MeetingKind, round: u32) {
        let mut state = self.inner.lock().unwrap();
        state.next_id += 1;
        let mut meeting = Meeting::new(
            MeetingId::new(format!("m-{}", state.next_id)),
            task_id,
            kind,
            round,
            "seeded",
        );
        meeting.status = MeetingStatus::Completed;
        state.meetings.push(meeting);
    }

    /// Seed a failed meeting at the given round.
    pub async fn seed_failed(&self, task_id: &str, kind: MeetingKind, round: u32) {
        let mut state = self.inner.lock().unwrap();
        state.next_id += 1;
        let mut meeting = Meeting::new(
            MeetingId::new(format!("m-{}", state.next_id)),
            task_id,
            kind,
            round,
            "seeded",
        );
        meeting.status = MeetingStatus::Failed;
        state.meetings.push(meeting);
    }

    /// Seed an in-progress meeting with `entries` recorded turns.
    pub async fn seed_in_progress(&self, task_id: &str, kind: MeetingKind, round: u32, entries: u64) {
        let mut state = self.inner.lock().unwrap();
        state.next_id += 1;
        let mut meeting = Meeting::new(
            MeetingId::new(format!("m-{}", state.next_id)),
            task_id,
            kind,
            round,
            "seeded",
        );
        let speaker = Leader::new("lead-planning", Department::planning(), "Planner");
        for seq in 1..=entries {
            meeting.entries.push(MinuteEntry::new(
                seq,
                &speaker,
                EntryKind::Feedback,
                format!("earlier turn {}", seq),
            ));
        }
        state.meetings.push(meeting);
    }
}

#[async_trait]
impl MinutesRecorder for FakeMinutes {
    async fn begin(
        &self,
        task_id: &str,
        kind: MeetingKind,
        round: u32,
        title: &str,
    ) -> Result<MeetingId, MinutesError> {
        let mut state = self.inner.lock().unwrap();
        state.next_id += 1;
        let id = MeetingId::new(format!("m-{}", state.next_id));
        state
            .meetings
            .push(Meeting::new(id.clone(), task_id, kind, round, title));
        Ok(id)
    }

    async fn append(&self, meeting_id: &MeetingId, entry: MinuteEntry) -> Result<(), MinutesError> {
        let mut state = self.inner.lock().unwrap();
        let meeting = state
            .meetings
            .iter_mut()
            .find(|m| &m.id == meeting_id)
            .ok_or_else(|| MinutesError::NotFound(meeting_id.to_string()))?;
        let expected = meeting.next_seq();
        if entry.seq != expected {
            return Err(MinutesError::OutOfOrder {
                expected,
                got: entry.seq,
            });
        }
        meeting.entries.push(entry);
        Ok(())
    }

    async fn finish(
        &self,
        meeting_id: &MeetingId,
        status: MeetingStatus,
    ) -> Result<(), MinutesError> {
        let mut state = self.inner.lock().unwrap();
        let meeting = state
            .meetings
            .iter_mut()
            .find(|m| &m.id == meeting_id)
            .ok_or_else(|| MinutesError::NotFound(meeting_id.to_string()))?;
        if meeting.status.is_terminal() {
            return Err(MinutesError::AlreadyFinished(meeting_id.to_string()));
        }
        meeting.status = status;
        Ok(())
    }

    async fn latest_for_task(
        &self,
        task_id: &str,
        kind: MeetingKind,
    ) -> Result<Option<Meeting>, MinutesError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .meetings
            .iter()
            .rev()
            .find(|m| m.task_id == task_id && m.kind == kind)
            .cloned())
    }
}

// ==================== FakeDirectory ====================

/// Configurable in-memory directory recording every side effect.
pub struct FakeDirectory {
    inner: Mutex<DirectoryState>,
}

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
    cleared: Vec<String>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(DirectoryState::default()),
        }
    }

    /// One task (`t-1`) with planning, backend, and qa leaders.
    pub fn with_standard_team() -> Self {
        let dir = Self::new();
        {
            let mut state = dir.inner.lock().unwrap();
            state.tasks.insert(
                "t-1".to_string(),
                TaskRecord {
                    id: "t-1".to_string(),
                    project_id: "p-1".to_string(),
                    title: "Ship search v2".to_string(),
                    description: "Rework the ranking service".to_string(),
                    department: Department::new("backend"),
                    status: TaskExternalStatus::Active,
                },
            );
            state
                .statuses
                .insert("t-1".to_string(), TaskExternalStatus::Active);
            state
                .subtask_departments
                .insert("t-1".to_string(), vec![Department::new("qa")]);

            for (id, dept) in [
                ("lead-planning", Department::planning()),
                ("lead-backend", Department::new("backend")),
                ("lead-qa", Department::new("qa")),
            ] {
                let leader = Leader::new(id, dept.clone(), id);
                state.department_leaders.insert(dept, leader.clone());
                state.active.push(leader);
            }
        }
        dir
    }

    /// One task (`t-1`) where only the planning lead exists.
    pub fn solo_lead() -> Self {
        let dir = Self::new();
        {
            let mut state = dir.inner.lock().unwrap();
            state.tasks.insert(
                "t-1".to_string(),
                TaskRecord {
                    id: "t-1".to_string(),
                    project_id: "p-1".to_string(),
                    title: "Ship search v2".to_string(),
                    description: String::new(),
                    department: Department::new("backend"),
                    status: TaskExternalStatus::Active,
                },
            );
            state
                .statuses
                .insert("t-1".to_string(), TaskExternalStatus::Active);
            let lead = Leader::new("lead-planning", Department::planning(), "Planner");
            state
                .department_leaders
                .insert(Department::planning(), lead.clone());
            state.active.push(lead);
        }
        dir
    }

    pub fn add_task(&self, record: TaskRecord) {
        let mut state = self.inner.lock().unwrap();
        state.statuses.insert(record.id.clone(), record.status);
        state.tasks.insert(record.id.clone(), record);
    }

    pub fn add_leader(&self, leader: Leader) {
        let mut state = self.inner.lock().unwrap();
        state
            .department_leaders
            .insert(leader.department.clone(), leader.clone());
        state.active.push(leader);
    }

    pub fn set_assignment_mode(&self, project_id: &str, mode: AssignmentMode) {
        self.inner
            .lock()
            .unwrap()
            .assignment_modes
            .insert(project_id.to_string(), mode);
    }

    pub fn assign_agent(&self, task_id: &str, agent: Leader) {
        self.inner
            .lock()
            .unwrap()
            .assigned
            .entry(task_id.to_string())
            .or_default()
            .push(agent);
    }

    pub fn set_status(&self, task_id: &str, status: TaskExternalStatus) {
        self.inner
            .lock()
            .unwrap()
            .statuses
            .insert(task_id.to_string(), status);
    }

    pub async fn set_remediation_count(&self, task_id: &str, count: usize) {
        self.inner
            .lock()
            .unwrap()
            .remediation_counts
            .insert(task_id.to_string(), count);
    }

    pub async fn notices(&self, task_id: &str) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .notices
            .get(task_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn memos(&self, task_id: &str) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .memos
            .get(task_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn cleared_tasks(&self) -> Vec<String> {
        self.inner.lock().unwrap().cleared.clone()
    }
}

#[async_trait]
impl TaskDirectory for FakeDirectory {
    async fn task(&self, task_id: &str) -> Option<TaskRecord> {
        self.inner.lock().unwrap().tasks.get(task_id).cloned()
    }

    async fn task_status(&self, task_id: &str) -> Option<TaskExternalStatus> {
        self.inner.lock().unwrap().statuses.get(task_id).copied()
    }

    async fn assignment_mode(&self, project_id: &str) -> AssignmentMode {
        self.inner
            .lock()
            .unwrap()
            .assignment_modes
            .get(project_id)
            .copied()
            .unwrap_or(AssignmentMode::Automatic)
    }

    async fn assigned_agents(&self, task_id: &str) -> Vec<Leader> {
        self.inner
            .lock()
            .unwrap()
            .assigned
            .get(task_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn subtask_departments(&self, task_id: &str) -> Vec<Department> {
        self.inner
            .lock()
            .unwrap()
            .subtask_departments
            .get(task_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn active_leaders(&self) -> Vec<Leader> {
        self.inner.lock().unwrap().active.clone()
    }

    async fn leader_for(&self, department: &Department) -> Option<Leader> {
        self.inner
            .lock()
            .unwrap()
            .department_leaders
            .get(department)
            .cloned()
    }

    async fn agent_status(&self, agent: &LeaderId) -> Option<AgentStatus> {
        self.inner.lock().unwrap().agent_statuses.get(agent).copied()
    }

    async fn set_agent_status(&self, agent: &LeaderId, status: AgentStatus) {
        self.inner
            .lock()
            .unwrap()
            .agent_statuses
            .insert(agent.clone(), status);
    }

    async fn append_log(&self, task_id: &str, kind: &str, message: &str) {
        self.inner
            .lock()
            .unwrap()
            .logs
            .entry(task_id.to_string())
            .or_default()
            .push((kind.to_string(), message.to_string()));
    }

    async fn notify_operator(&self, task_id: &str, message: &str) {
        self.inner
            .lock()
            .unwrap()
            .notices
            .entry(task_id.to_string())
            .or_default()
            .push(message.to_string());
    }

    async fn open_remediation_subtasks(&self, task_id: &str, items: &[String]) -> usize {
        let mut state = self.inner.lock().unwrap();
        *state
            .remediation_counts
            .entry(task_id.to_string())
            .or_default() += items.len();
        items.len()
    }

    async fn remediation_request_count(&self, task_id: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .remediation_counts
            .get(task_id)
            .copied()
            .unwrap_or(0)
    }

    async fn save_memo(&self, task_id: &str, items: &[String]) {
        self.inner
            .lock()
            .unwrap()
            .memos
            .entry(task_id.to_string())
            .or_default()
            .extend(items.iter().cloned());
    }

    async fn clear_workflow_caches(&self, task_id: &str) {
        self.inner.lock().unwrap().cleared.push(task_id.to_string());
    }
}

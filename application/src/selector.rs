//! Leader resolution
//!
//! Resolves the ordered participant set for a task: one planning lead
//! plus zero or more department leaders. Honors manual-assignment
//! overrides and widens to all active leaders when too few can be
//! detected, so approval reflects genuine multi-party input.

use crate::ports::directory::{AssignmentMode, TaskDirectory};
use council_domain::{Department, Leader};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Keyword → department inference table for automatic assignment
const DEPARTMENT_KEYWORDS: &[(&str, &str)] = &[
    ("api", "backend"),
    ("server", "backend"),
    ("database", "backend"),
    ("migration", "backend"),
    ("endpoint", "backend"),
    ("ui", "frontend"),
    ("screen", "frontend"),
    ("page", "frontend"),
    ("layout", "frontend"),
    ("画面", "frontend"),
    ("test", "qa"),
    ("regression", "qa"),
    ("bug", "qa"),
    ("テスト", "qa"),
    ("deploy", "infra"),
    ("pipeline", "infra"),
    ("docker", "infra"),
    ("デプロイ", "infra"),
];

/// Options for one resolution pass
#[derive(Debug, Clone)]
pub struct SelectorOptions {
    /// Widen to all active leaders below this participant count
    pub min_quorum: usize,
}

impl Default for SelectorOptions {
    fn default() -> Self {
        Self { min_quorum: 2 }
    }
}

/// Resolves the ordered leader set for a task
pub struct LeaderSelector {
    directory: Arc<dyn TaskDirectory>,
}

impl LeaderSelector {
    pub fn new(directory: Arc<dyn TaskDirectory>) -> Self {
        Self { directory }
    }

    /// Resolve leaders for a task.
    ///
    /// A missing task yields an empty set — a valid "no consensus needed"
    /// signal, not an error. The planning lead is first when present;
    /// departments without a current leader are skipped.
    pub async fn resolve(
        &self,
        task_id: &str,
        fallback_department: &Department,
        opts: &SelectorOptions,
    ) -> Vec<Leader> {
        let Some(task) = self.directory.task(task_id).await else {
            debug!(task_id, "task not found; no consensus needed");
            return Vec::new();
        };

        let mode = self.directory.assignment_mode(&task.project_id).await;
        let leaders = match mode {
            AssignmentMode::Manual => {
                // Manual picks are authoritative: no inference, no widening
                let mut leaders = self.resolve_manual(task_id).await;
                self.prepend_planning_lead(&mut leaders).await;
                leaders
            }
            AssignmentMode::Automatic => {
                let mut departments = vec![task.department.clone()];
                if task.department.as_str().is_empty() {
                    departments[0] = fallback_department.clone();
                }
                departments.extend(self.directory.subtask_departments(task_id).await);
                departments.extend(infer_departments(&task.title, &task.description));

                let mut leaders = self.leaders_for_departments(&departments).await;
                self.prepend_planning_lead(&mut leaders).await;

                if leaders.len() < opts.min_quorum {
                    debug!(
                        task_id,
                        resolved = leaders.len(),
                        min_quorum = opts.min_quorum,
                        "below quorum; widening to all active leaders"
                    );
                    let mut widened = self.directory.active_leaders().await;
                    self.prepend_planning_lead(&mut widened).await;
                    if widened.len() > leaders.len() {
                        leaders = widened;
                    }
                }
                leaders
            }
        };

        dedupe_by_id(leaders)
    }

    /// Manual-assignment projects: leaders are exactly the distinct
    /// departments of manually assigned agents.
    async fn resolve_manual(&self, task_id: &str) -> Vec<Leader> {
        let assigned = self.directory.assigned_agents(task_id).await;
        let mut seen = HashSet::new();
        let mut departments = Vec::new();
        for agent in &assigned {
            if seen.insert(agent.department.clone()) {
                departments.push(agent.department.clone());
            }
        }
        self.leaders_for_departments(&departments).await
    }

    async fn leaders_for_departments(&self, departments: &[Department]) -> Vec<Leader> {
        let mut leaders = Vec::new();
        let mut seen = HashSet::new();
        for dept in departments {
            if !seen.insert(dept.clone()) {
                continue;
            }
            // Missing leader for a department: skip, not an error
            if let Some(leader) = self.directory.leader_for(dept).await {
                leaders.push(leader);
            }
        }
        leaders
    }

    async fn prepend_planning_lead(&self, leaders: &mut Vec<Leader>) {
        if leaders.iter().any(|l| l.is_planning_lead()) {
            // Keep the planning lead first
            if let Some(pos) = leaders.iter().position(|l| l.is_planning_lead())
                && pos > 0
            {
                let lead = leaders.remove(pos);
                leaders.insert(0, lead);
            }
            return;
        }
        if let Some(lead) = self.directory.leader_for(&Department::planning()).await {
            leaders.insert(0, lead);
        }
    }
}

/// Infer relevant departments from free text.
fn infer_departments(title: &str, description: &str) -> Vec<Department> {
    let haystack = format!("{} {}", title, description).to_lowercase();
    let mut seen = HashSet::new();
    let mut departments = Vec::new();
    for (keyword, department) in DEPARTMENT_KEYWORDS {
        if haystack.contains(keyword) && seen.insert(*department) {
            departments.push(Department::new(*department));
        }
    }
    departments
}

/// Deduplicate leaders by id, keeping the earliest position.
fn dedupe_by_id(leaders: Vec<Leader>) -> Vec<Leader> {
    let mut seen = HashSet::new();
    leaders
        .into_iter()
        .filter(|l| seen.insert(l.id.clone()))
        .collect()
}

//! Scenario files
//!
//! A scenario is a TOML description of the task and its leaders, used to
//! seed the in-memory directory when the engine runs standalone.

use anyhow::{Context, Result};
use council_application::ports::directory::{TaskExternalStatus, TaskRecord};
use council_domain::{Department, Leader};
use council_infrastructure::InMemoryDirectory;
use serde::Deserialize;
use std::path::Path;

/// Root of a scenario file
#[derive(Debug, Deserialize)]
pub struct Scenario {
    pub task: TaskSection,
    #[serde(default)]
    pub leaders: Vec<LeaderSection>,
}

/// `[task]` section
#[derive(Debug, Deserialize)]
pub struct TaskSection {
    pub id: String,
    #[serde(default = "default_project")]
    pub project: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub department: String,
    #[serde(default)]
    pub subtask_departments: Vec<String>,
}

fn default_project() -> String {
    "default".to_string()
}

/// One `[[leaders]]` entry
#[derive(Debug, Deserialize)]
pub struct LeaderSection {
    pub id: String,
    pub department: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing scenario file {}", path.display()))
    }

    /// Seed a fresh directory from this scenario.
    pub fn seed_directory(&self) -> InMemoryDirectory {
        let directory = InMemoryDirectory::new();

        directory.add_task(TaskRecord {
            id: self.task.id.clone(),
            project_id: self.task.project.clone(),
            title: self.task.title.clone(),
            description: self.task.description.clone(),
            department: Department::new(self.task.department.clone()),
            status: TaskExternalStatus::Active,
        });
        for dept in &self.task.subtask_departments {
            directory.add_subtask_department(&self.task.id, Department::new(dept.clone()));
        }

        for leader in &self.leaders {
            let display_name = leader.display_name.clone().unwrap_or_else(|| leader.id.clone());
            directory.add_leader(Leader::new(
                leader.id.clone(),
                Department::new(leader.department.clone()),
                display_name,
            ));
        }

        directory
    }
}

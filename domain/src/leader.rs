//! Leader and department value objects
//!
//! A leader is the agent representing a department's team lead in a
//! meeting. The planning department's leader is distinguished: it opens
//! every meeting and synthesizes the round summary.

use serde::{Deserialize, Serialize};

/// Opaque agent identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeaderId(pub String);

impl LeaderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LeaderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LeaderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Department identifier
///
/// Departments are open-ended strings; only `planning` carries protocol
/// meaning (first speaker, round summary).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Department(pub String);

impl Department {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The distinguished planning department
    pub fn planning() -> Self {
        Self("planning".to_string())
    }

    pub fn is_planning(&self) -> bool {
        self.0 == "planning"
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Department {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Locale for user-visible notices and prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ja,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ja => "ja",
        }
    }
}

/// Externally tracked agent availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Idle,
    Working,
    Break,
    Stopped,
}

/// A department team leader participating in meetings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leader {
    pub id: LeaderId,
    pub department: Department,
    pub role: String,
    pub display_name: String,
    pub locale: Locale,
}

impl Leader {
    pub fn new(
        id: impl Into<String>,
        department: Department,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            id: LeaderId::new(id),
            department,
            role: "team_leader".to_string(),
            display_name: display_name.into(),
            locale: Locale::default(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Whether this leader speaks first by convention
    pub fn is_planning_lead(&self) -> bool {
        self.department.is_planning()
    }
}

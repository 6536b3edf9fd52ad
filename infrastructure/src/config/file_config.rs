//! File configuration schema.

use council_application::ConsensusConfig;
use council_domain::Locale;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration loaded from `council.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub consensus: ConsensusConfig,
    pub gateway: GatewaySection,
    pub meeting: MeetingSection,
}

/// `[gateway]` section: the command spawned for each one-shot turn
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewaySection {
    pub command: String,
    pub args: Vec<String>,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            command: "copilot".to_string(),
            args: vec!["--no-color".to_string()],
        }
    }
}

/// `[meeting]` section: locale and audit journal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeetingSection {
    /// Notice locale: "en" or "ja"
    pub locale: String,
    /// Optional JSONL minutes journal path
    pub journal_path: Option<PathBuf>,
}

impl Default for MeetingSection {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
            journal_path: None,
        }
    }
}

impl MeetingSection {
    pub fn locale(&self) -> Locale {
        match self.locale.as_str() {
            "ja" => Locale::Ja,
            _ => Locale::En,
        }
    }
}

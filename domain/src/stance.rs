//! Reply classification for meeting turns
//!
//! These functions extract structured decisions from free-form leader
//! replies. They are pure domain logic — no I/O, no session management,
//! just text pattern matching over English and Japanese keywords.
//!
//! The classifier sits behind the [`StanceClassifier`] trait so the
//! orchestrators can be tested against a deterministic implementation and
//! deployments can swap in a model-backed one.

use serde::{Deserialize, Serialize};

/// Classified position of a leader within a meeting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    /// Still examining; no position yet
    Reviewing,
    /// Ready to approve
    Approved,
    /// Requests changes before approval
    Hold,
}

impl Stance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stance::Reviewing => "reviewing",
            Stance::Approved => "approved",
            Stance::Hold => "hold",
        }
    }
}

/// Classifies free text into a stance, if one is recognizable
pub trait StanceClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Option<Stance>;
}

/// Default keyword-driven classifier.
///
/// Conservative: a reply that both approves and requests changes
/// classifies as [`Stance::Hold`].
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl StanceClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Option<Stance> {
        let upper = text.to_uppercase();

        if detect_revision_intent(text) {
            return Some(Stance::Hold);
        }

        let approved = (upper.contains("APPROVE") || upper.contains("LGTM") || text.contains("承認"))
            && !upper.contains("NOT APPROVE")
            && !upper.contains("CANNOT APPROVE");
        if approved {
            return Some(Stance::Approved);
        }

        if upper.contains("REVIEWING")
            || upper.contains("STILL CHECKING")
            || text.contains("確認中")
            || text.contains("レビュー中")
        {
            return Some(Stance::Reviewing);
        }

        None
    }
}

/// Scan a reply for revision intent.
///
/// Checks for explicit change-request keywords, including negated
/// approvals. Conservative in the other direction: silence about changes
/// means no revision intent, so plain approvals pass through.
pub fn detect_revision_intent(text: &str) -> bool {
    let upper = text.to_uppercase();

    upper.contains("REVISE")
        || upper.contains("REVISION")
        || upper.contains("REJECT")
        || upper.contains("HOLD")
        || upper.contains("NEEDS CHANGES")
        || upper.contains("NEEDS FIX")
        || upper.contains("MUST FIX")
        || upper.contains("NOT APPROVE")
        || upper.contains("DON'T APPROVE")
        || upper.contains("CANNOT APPROVE")
        || text.contains("修正")
        || text.contains("差し戻し")
        || text.contains("要対応")
}

/// Extract short action items from a reply, capped at `cap`.
///
/// Recognizes, in order of preference:
/// 1. A JSON string array anywhere in the reply
/// 2. Bullet lines (`-`, `*`, `・`) and numbered lines (`1.`, `2)`)
pub fn extract_plan_items(text: &str, cap: usize) -> Vec<String> {
    if cap == 0 {
        return Vec::new();
    }

    // JSON array form first
    if let Some(start) = text.find('[')
        && let Some(end) = text[start..].rfind(']')
    {
        let json_str = &text[start..start + end + 1];
        if let Ok(items) = serde_json::from_str::<Vec<String>>(json_str) {
            return items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .take(cap)
                .collect();
        }
    }

    // Fallback: bullet / numbered lines
    let mut items = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim();
        let item = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
            .or_else(|| trimmed.strip_prefix("・"))
            .or_else(|| strip_numbered_prefix(trimmed));

        if let Some(item) = item {
            let item = item.trim();
            if !item.is_empty() {
                items.push(item.to_string());
                if items.len() == cap {
                    break;
                }
            }
        }
    }
    items
}

fn strip_numbered_prefix(line: &str) -> Option<&str> {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let rest = &line[digits..];
    rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") "))
}

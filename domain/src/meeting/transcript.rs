//! In-memory transcript mirror
//!
//! The transcript mirrors a meeting's minute entries for the duration of
//! one run so that later prompts carry full conversational context. It is
//! rebuilt from the minutes store on resume and never persisted itself.

use crate::meeting::minutes::MinuteEntry;

/// Character budget kept from the head of a transcript when compacting
pub const COMPACT_HEAD_CHARS: usize = 2_600;
/// Character budget kept from the tail of a transcript when compacting
pub const COMPACT_TAIL_CHARS: usize = 1_400;

/// Ordered, per-run mirror of a meeting's entries
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    lines: Vec<String>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from previously recorded entries (resume path).
    pub fn from_entries(entries: &[MinuteEntry]) -> Self {
        let mut transcript = Self::new();
        for entry in entries {
            transcript.push_entry(entry);
        }
        transcript
    }

    /// Record a spoken turn.
    pub fn push(&mut self, speaker: &str, department: &str, content: &str) {
        self.lines
            .push(format!("[{} / {}] {}", speaker, department, content));
    }

    pub fn push_entry(&mut self, entry: &MinuteEntry) {
        self.push(entry.speaker.as_str(), entry.department.as_str(), &entry.content);
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Full context for prompt assembly.
    pub fn render(&self) -> String {
        self.lines.join("\n")
    }

    /// Head-and-tail compaction for the timeout retry.
    ///
    /// Keeps roughly the first [`COMPACT_HEAD_CHARS`] and last
    /// [`COMPACT_TAIL_CHARS`] characters, splitting on a char boundary.
    pub fn render_compact(&self) -> String {
        compact(&self.render(), COMPACT_HEAD_CHARS, COMPACT_TAIL_CHARS)
    }
}

/// Compact `text` to at most `head + tail` characters plus a marker.
pub fn compact(text: &str, head: usize, tail: usize) -> String {
    let total: usize = text.chars().count();
    if total <= head + tail {
        return text.to_string();
    }

    let head_part: String = text.chars().take(head).collect();
    let tail_part: String = text
        .chars()
        .skip(total.saturating_sub(tail))
        .collect();

    format!("{}\n...[omitted]...\n{}", head_part, tail_part)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leader::{Department, Leader};
    use crate::meeting::minutes::{EntryKind, MinuteEntry};

    #[test]
    fn test_push_and_render() {
        let mut transcript = Transcript::new();
        transcript.push("a-1", "planning", "We should start with the API.");
        transcript.push("a-2", "backend", "Agreed, schema first.");

        let rendered = transcript.render();
        assert!(rendered.contains("[a-1 / planning]"));
        assert!(rendered.contains("schema first"));
        assert_eq!(transcript.len(), 2);
    }

    #[test]
    fn test_from_entries_resume() {
        let lead = Leader::new("a-1", Department::planning(), "Planner");
        let entries = vec![
            MinuteEntry::new(1, &lead, EntryKind::Opening, "opening remarks"),
            MinuteEntry::new(2, &lead, EntryKind::Summary, "summary remarks"),
        ];

        let transcript = Transcript::from_entries(&entries);
        assert_eq!(transcript.len(), 2);
        assert!(transcript.render().contains("opening remarks"));
    }

    #[test]
    fn test_compact_short_text_untouched() {
        assert_eq!(compact("short", 100, 100), "short");
    }

    #[test]
    fn test_compact_keeps_head_and_tail() {
        let text = "H".repeat(50) + &"M".repeat(500) + &"T".repeat(50);
        let compacted = compact(&text, 50, 50);

        assert!(compacted.starts_with(&"H".repeat(50)));
        assert!(compacted.ends_with(&"T".repeat(50)));
        assert!(compacted.contains("[omitted]"));
        assert!(compacted.len() < text.len());
    }

    #[test]
    fn test_compact_multibyte_boundary() {
        // Must not panic on non-ASCII content
        let text = "日".repeat(5_000);
        let compacted = compact(&text, COMPACT_HEAD_CHARS, COMPACT_TAIL_CHARS);
        assert!(compacted.contains("[omitted]"));
    }
}

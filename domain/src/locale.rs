//! Localized status notices
//!
//! Protocol code picks a [`Notice`] by id; the text for a `(notice,
//! locale)` pair lives here, keeping presentation strings out of the
//! orchestrators.

use crate::leader::Locale;

/// User-visible status notices emitted by the orchestrators
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    RoundStarted { round: u32 },
    RoundResumed { round: u32 },
    RoundsExhausted { max_rounds: u32 },
    ForcedApproval,
    RemediationScheduled { count: usize },
    MeetingFailed,
}

impl Notice {
    /// Resolve the notice text for a locale.
    pub fn text(&self, locale: Locale) -> String {
        match (self, locale) {
            (Notice::RoundStarted { round }, Locale::En) => {
                format!("Review round {} started.", round)
            }
            (Notice::RoundStarted { round }, Locale::Ja) => {
                format!("レビューラウンド{}を開始しました。", round)
            }
            (Notice::RoundResumed { round }, Locale::En) => {
                format!("Resuming in-progress review round {}.", round)
            }
            (Notice::RoundResumed { round }, Locale::Ja) => {
                format!("進行中のレビューラウンド{}を再開します。", round)
            }
            (Notice::RoundsExhausted { max_rounds }, Locale::En) => format!(
                "Review rounds exhausted (max {}). Closing without a new meeting.",
                max_rounds
            ),
            (Notice::RoundsExhausted { max_rounds }, Locale::Ja) => format!(
                "レビューラウンドの上限（{}）に達しました。新しい会議は開かずに完了します。",
                max_rounds
            ),
            (Notice::ForcedApproval, Locale::En) => {
                "Remediation caps exhausted. Approving despite outstanding concerns.".to_string()
            }
            (Notice::ForcedApproval, Locale::Ja) => {
                "是正依頼の上限に達したため、未解決の懸念を残したまま承認します。".to_string()
            }
            (Notice::RemediationScheduled { count }, Locale::En) => {
                format!("Opened {} remediation item(s); next review round scheduled.", count)
            }
            (Notice::RemediationScheduled { count }, Locale::Ja) => {
                format!("是正項目を{}件作成しました。次のレビューラウンドを予定します。", count)
            }
            (Notice::MeetingFailed, Locale::En) => {
                "The review meeting ended abnormally. The task is unchanged.".to_string()
            }
            (Notice::MeetingFailed, Locale::Ja) => {
                "レビュー会議が異常終了しました。タスクは変更されていません。".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_interpolation() {
        let en = Notice::RoundStarted { round: 2 }.text(Locale::En);
        assert_eq!(en, "Review round 2 started.");

        let ja = Notice::RoundStarted { round: 2 }.text(Locale::Ja);
        assert!(ja.contains("2"));
    }

    #[test]
    fn test_every_notice_has_both_locales() {
        let notices = [
            Notice::RoundStarted { round: 1 },
            Notice::RoundResumed { round: 1 },
            Notice::RoundsExhausted { max_rounds: 3 },
            Notice::ForcedApproval,
            Notice::RemediationScheduled { count: 2 },
            Notice::MeetingFailed,
        ];

        for notice in &notices {
            assert!(!notice.text(Locale::En).is_empty());
            assert!(!notice.text(Locale::Ja).is_empty());
            assert_ne!(notice.text(Locale::En), notice.text(Locale::Ja));
        }
    }
}

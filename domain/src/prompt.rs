//! Prompt templates for meeting turns

use crate::meeting::round::RoundMode;
use crate::meeting::transcript::Transcript;

/// Templates for generating prompts at each phase of a meeting
pub struct MeetingPromptTemplate;

impl MeetingPromptTemplate {
    /// The per-round objective injected into every prompt of the round.
    pub fn round_objective(mode: RoundMode) -> &'static str {
        match mode {
            RoundMode::ParallelRemediation => {
                "Objective for this round: surface EVERY remediation item you can see in one pass. \
                 Do not hold items back for later rounds."
            }
            RoundMode::MergeSynthesis => {
                "Objective for this round: validate that earlier remediation was consolidated \
                 correctly and judge whether the work is merge-ready."
            }
            RoundMode::FinalDecision => {
                "Objective for this round: do NOT raise new remediation items. \
                 State only your final decision: approve or hold, with a one-line reason."
            }
        }
    }

    /// Opening prompt for the planning lead.
    pub fn opening(title: &str, mode: RoundMode, transcript: &Transcript) -> String {
        format!(
            r#"You are chairing a review meeting for the task: {title}

{objective}

Meeting so far:
{context}

Open the meeting: state the review focus and your initial assessment."#,
            title = title,
            objective = Self::round_objective(mode),
            context = Self::context_block(transcript),
        )
    }

    /// Feedback prompt for a non-lead leader.
    pub fn feedback(title: &str, department: &str, mode: RoundMode, transcript: &Transcript) -> String {
        format!(
            r#"You are the {department} team leader in a review meeting for the task: {title}

{objective}

Meeting so far:
{context}

Give your department's assessment. If changes are required before approval,
say REVISE and list them as short bullet items."#,
            department = department,
            title = title,
            objective = Self::round_objective(mode),
            context = Self::context_block(transcript),
        )
    }

    /// Summary prompt for the planning lead.
    pub fn summary(title: &str, mode: RoundMode, transcript: &Transcript) -> String {
        let direction = match mode {
            RoundMode::ParallelRemediation => {
                "Consolidate every remediation item raised into one deduplicated list."
            }
            RoundMode::MergeSynthesis => {
                "State whether consolidation held up and whether the work is merge-ready."
            }
            RoundMode::FinalDecision => "State the meeting's final direction in two sentences.",
        };

        format!(
            r#"You are chairing a review meeting for the task: {title}

Meeting so far:
{context}

Synthesize the round. {direction}"#,
            title = title,
            context = Self::context_block(transcript),
            direction = direction,
        )
    }

    /// Approval-poll prompt for every leader.
    pub fn approval(title: &str, department: &str, transcript: &Transcript) -> String {
        format!(
            r#"You are the {department} team leader concluding a review meeting for the task: {title}

Meeting so far:
{context}

State your final position in one or two sentences: APPROVE, or HOLD with the
blocking reason."#,
            department = department,
            title = title,
            context = Self::context_block(transcript),
        )
    }

    /// Solo-conclusion prompt when the planning lead is the only leader.
    pub fn solo_conclusion(title: &str, mode: RoundMode, transcript: &Transcript) -> String {
        format!(
            r#"You are the only reviewer of the task: {title}

{objective}

Meeting so far:
{context}

Conclude the review yourself: APPROVE, or REVISE with at most one bullet item."#,
            title = title,
            objective = Self::round_objective(mode),
            context = Self::context_block(transcript),
        )
    }

    /// Closing-statement prompt for the planned (kickoff) variant.
    pub fn planned_closing(title: &str, department: &str, transcript: &Transcript) -> String {
        format!(
            r#"You are the {department} team leader closing a kickoff meeting for the task: {title}

Meeting so far:
{context}

Kickoff never blocks. State your closing position and, if you have concerns,
list them as short bullet action items instead of holding."#,
            department = department,
            title = title,
            context = Self::context_block(transcript),
        )
    }

    /// Wrap a prompt for the single retry after a timeout.
    ///
    /// Replaces the full transcript context with its compacted form and
    /// instructs the model to answer concisely.
    pub fn retry_after_timeout(original: &str, transcript: &Transcript) -> String {
        format!(
            r#"Your previous attempt timed out. Answer concisely this time — a few
sentences at most.

Compacted meeting context:
{context}

Original request:
{original}"#,
            context = transcript.render_compact(),
            original = compact_prompt_head(original),
        )
    }

    fn context_block(transcript: &Transcript) -> String {
        if transcript.is_empty() {
            "(no prior discussion)".to_string()
        } else {
            transcript.render()
        }
    }
}

/// Keep only the instruction head of a prompt, dropping its embedded
/// context block, so the retry prompt does not duplicate the transcript.
fn compact_prompt_head(prompt: &str) -> String {
    match prompt.find("Meeting so far:") {
        Some(idx) => prompt[..idx].trim_end().to_string(),
        None => prompt.to_string(),
    }
}

//! Fixed prompt text and markers for the two Chain-of-Draft stages.

/// Marker the model is instructed to emit between its reasoning and its
/// answer; section parsing splits on the first occurrence.
pub(crate) const SECTION_SEPARATOR: &str = "####";

/// Divider inserted between the draft reasoning and the verification text
/// in the assembled final content.
pub(crate) const VERIFICATION_BANNER: &str = "--- Verification ---";

/// Stands in for the answer segment when Stage 1 output has no separator.
pub(crate) const STAGE1_MISSING_ANSWER: &str = "No preliminary answer found.";

/// Stands in for the answer segment when Stage 2 output has no separator.
pub(crate) const STAGE2_MISSING_ANSWER: &str =
    "Verification completed but no final answer section found.";

pub(crate) const STAGE1_SYSTEM_PROMPT: &str = "\
Think step by step, but keep each drafting step to five words at most. \
At three points while drafting, pause for a deep reflection block: reread \
the problem, question your current direction, and note anything you may \
have missed. Write exactly three such reflection blocks, no more and no \
fewer. When the draft is complete, write #### on its own line, then state \
your preliminary answer after it.";

pub(crate) const STAGE2_SYSTEM_PROMPT: &str = "\
You are reviewing a draft solution. Verify the reasoning below against \
the original question: check each step, recompute anything numeric, and \
correct any mistakes you find. Describe your verification, then write \
#### followed by the final, corrected answer.";

/// User message for Stage 2, embedding the original question and both
/// Stage 1 artifacts under labeled headings.
pub(crate) fn stage2_user_message(question: &str, thinking: &str, answer: &str) -> String {
    format!(
        "Original question:\n{question}\n\nDraft reasoning:\n{thinking}\n\nPreliminary answer:\n{answer}"
    )
}

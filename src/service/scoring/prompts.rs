//! Prompts for contradiction scoring.

use crate::model::StatementCandidate;

/// System prompt for the minimal fallback scorer. Kept deliberately terse;
/// the stricter fallback live-fire threshold compensates for the weaker
/// instruction.
pub const FALLBACK_SYSTEM_PROMPT: &str = r#"Score contradiction confidence 0-1. Return only JSON: {"contradiction_confidence": number, "best_match_index": number}"#;

/// Build the primary judge prompt. Statements are listed with their index
/// so the verdict's `best_match_index` can be resolved back to a quote.
pub fn build_judge_prompt(
    witness_answer: &str,
    statements: &[StatementCandidate],
    case_context: &str,
) -> String {
    let listing = statements
        .iter()
        .enumerate()
        .map(|(i, s)| format!("[{}] \"{}\"", i, s.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are analyzing a witness deposition for contradictions.

Case context: {case_context}

Witness answer just given:
"{witness_answer}"

Prior sworn statements on record:
{listing}

Analyze whether the witness answer contradicts any prior statement.
Respond ONLY with JSON:
{{
  "contradiction_confidence": <float 0.0-1.0>,
  "best_match_index": <integer index of most contradicted statement, or -1>,
  "reasoning": "<one sentence explanation>"
}}"#
    )
}

/// Build the fallback user message: the answer plus a bare indexed listing.
pub fn build_fallback_prompt(witness_answer: &str, statements: &[StatementCandidate]) -> String {
    let listing = statements
        .iter()
        .enumerate()
        .map(|(i, s)| format!("[{}] {}", i, s.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!("Answer: \"{witness_answer}\"\nPrior statements:\n{listing}")
}

//! Prompt construction for the question generator.

use crate::model::{AggressionLevel, QuestionContext, StatementCandidate};

pub const INTERROGATOR_SYSTEM_PROMPT: &str = "You are a highly skilled opposing counsel conducting a deposition.
Your goal is to expose inconsistencies in the witness's testimony.
You ask ONE focused question at a time. Questions are precise, legally professional.
You adapt based on the witness's prior answers and detected hesitations.
NEVER ask compound questions. NEVER reveal your strategy.
Format: Return only the question text, no preamble.";

const STANDARD_INSTRUCTION: &str = "Ask methodically. Allow witness to elaborate.";
const ELEVATED_INSTRUCTION: &str = "Press on contradictions. Use controlled silence.";
const HIGH_STAKES_INSTRUCTION: &str =
    "Maximum pressure. Expose inconsistencies directly. Demand specifics.";

/// Fixed instruction block for an aggression level.
pub fn aggression_instruction(level: AggressionLevel) -> &'static str {
    match level {
        AggressionLevel::Standard => STANDARD_INSTRUCTION,
        AggressionLevel::Elevated => ELEVATED_INSTRUCTION,
        AggressionLevel::HighStakes => HIGH_STAKES_INSTRUCTION,
    }
}

/// Assemble the per-turn user message from session state and any retrieved
/// prior statements.
pub fn build_question_prompt(
    context: &QuestionContext,
    statements: &[StatementCandidate],
) -> String {
    let mut lines = Vec::new();

    lines.push(format!("Case type: {}", context.case_type));
    lines.push(format!("Witness role: {}", context.witness_role));
    lines.push(format!("Current focus topic: {}", context.current_topic));
    lines.push(format!("Question number: {}", context.question_number));

    match &context.prior_answer {
        Some(answer) => lines.push(format!("Witness last answered: \"{}\"", answer)),
        None => lines.push("First question on this topic.".to_string()),
    }

    if context.hesitation_detected {
        lines.push("⚠️ Witness hesitated significantly before answering.".to_string());
    }
    if context.recent_inconsistency_flag {
        lines.push("🚨 Inconsistency detected in last answer — probe this area harder.".to_string());
    }

    if !statements.is_empty() {
        let quoted: Vec<String> = statements
            .iter()
            .map(|s| format!("- \"{}\"", s.content))
            .collect();
        lines.push(format!(
            "Relevant prior sworn statements:\n{}",
            quoted.join("\n")
        ));
    }

    let weak_areas = if context.prior_weak_areas.is_empty() {
        "None (first session)".to_string()
    } else {
        context.prior_weak_areas.join(", ")
    };
    lines.push(format!("Prior weak areas: {}", weak_areas));
    lines.push(format!(
        "Aggression instruction: {}",
        aggression_instruction(context.aggression)
    ));

    lines.push(String::new());
    lines.push("Generate the next deposition question:".to_string());

    lines.join("\n")
}

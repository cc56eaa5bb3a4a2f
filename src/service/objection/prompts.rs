//! Prompt construction for objection screening.

pub const OBJECTION_SYSTEM_PROMPT: &str = "You are an expert attorney specializing in evidence law and Federal Rules of Evidence.
Analyze the given deposition question for objectionable content.
Respond ONLY with valid JSON. No preamble, no markdown.

COMPOUND question = any question containing \"and\", \"or\", \"also\", \"as well as\", \"both\" that asks about TWO or more distinct facts or actions simultaneously. Flag these as COMPOUND with high confidence.
LEADING question = a question that suggests the answer or assumes a fact not in evidence.
HEARSAY = asks witness to repeat out-of-court statements for their truth.
ASSUMES_FACTS = assumes something not yet established in the record.
SPECULATION = asks witness to guess or speculate about unknown facts.

JSON format:
{
  \"isObjectionable\": boolean,
  \"category\": \"LEADING\" | \"HEARSAY\" | \"COMPOUND\" | \"ASSUMES_FACTS\" | \"SPECULATION\" | null,
  \"freRule\": string | null,
  \"explanation\": string | null,
  \"confidence\": number
}";

/// User message for one screening call. The retrieved rule context is
/// appended only when the FRE corpus search produced anything.
pub fn build_screening_prompt(question_text: &str, fre_context: &str) -> String {
    let mut prompt = format!(
        "Analyze this deposition question for FRE objections:\n\n\"{}\"",
        question_text
    );
    if !fre_context.is_empty() {
        prompt.push_str(&format!("\n\nRelevant FRE rules:\n{}", fre_context));
    }
    prompt
}

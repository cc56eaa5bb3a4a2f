//! Prompt construction for the coaching brief.

use crate::model::BriefRequest;

pub const BRIEF_SYSTEM_PROMPT: &str = "You are an elite litigation coach reviewing a completed deposition practice session.
Analyze the session transcript, alerts, and performance data to generate a comprehensive coaching brief.
Respond ONLY with valid JSON matching the exact format specified. No preamble, no markdown.";

/// Render the session record and the JSON contract the coach must fill in.
pub fn build_brief_prompt(request: &BriefRequest) -> String {
    let transcript_text = request
        .transcript
        .iter()
        .map(|e| format!("[{}] {}", e.speaker, e.content))
        .collect::<Vec<_>>()
        .join("\n");

    let alerts_text = if request.alerts.is_empty() {
        "None".to_string()
    } else {
        request
            .alerts
            .iter()
            .map(|a| format!("- {}: {} (confidence: {:.2})", a.alert_type, a.prior_quote, a.confidence))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"Session Summary:
- Case type: {case_type}
- Witness role: {witness_role}
- Aggression level: {aggression}
- Duration: {duration} minutes
- Questions asked: {questions}

Full Transcript:
{transcript}

Alerts Fired:
{alerts}

Generate a coaching brief as JSON:
{{
  "sessionScore": <integer 0-100>,
  "consistencyRate": <float 0.0-1.0>,
  "topRecommendations": ["<rec 1>", "<rec 2>", "<rec 3>"],
  "narrativeText": "<2-3 paragraph coaching narrative>",
  "weaknessMapScores": {{
    "timeline": <0-100>, "financials": <0-100>, "communications": <0-100>,
    "relationships": <0-100>, "composure": <0-100>
  }},
  "confirmedFlags": <integer>,
  "objectionCount": <integer>,
  "composureAlerts": <integer>
}}"#,
        case_type = request.case_type,
        witness_role = request.witness_role,
        aggression = request.aggression,
        duration = request.duration_minutes,
        questions = request.question_count,
        transcript = transcript_text,
        alerts = alerts_text,
    )
}

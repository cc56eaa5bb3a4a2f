//! Session-scoped inputs: witness profiles, aggression levels, and the
//! per-turn context the question generator consumes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Interrogation pressure level for a practice session.
///
/// The numeric 1-100 aggression score maps onto three bands; each band
/// selects a fixed instruction block in the question generator prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AggressionLevel {
    Standard,
    Elevated,
    HighStakes,
}

impl AggressionLevel {
    /// Band mapping: 1-33 Standard, 34-66 Elevated, 67-100 High-Stakes.
    pub fn from_score(score: u8) -> Self {
        if score <= 33 {
            AggressionLevel::Standard
        } else if score <= 66 {
            AggressionLevel::Elevated
        } else {
            AggressionLevel::HighStakes
        }
    }
}

impl fmt::Display for AggressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AggressionLevel::Standard => "STANDARD",
            AggressionLevel::Elevated => "ELEVATED",
            AggressionLevel::HighStakes => "HIGH_STAKES",
        };
        f.write_str(label)
    }
}

/// Which side of the case called the witness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseSide {
    Prosecution,
    Defense,
}

/// Pre-session witness dossier used by the aggression engine.
///
/// The free-text fields hold whatever the case file provides; the engine
/// only counts keyword signals in them, so empty strings are fine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WitnessProfile {
    pub witness_name: String,
    pub side: CaseSide,
    pub witness_role: String,
    #[serde(default)]
    pub extracted_facts: String,
    #[serde(default)]
    pub prior_statements: String,
    #[serde(default)]
    pub exhibit_list: String,
    /// Comma-separated focus areas for the session.
    #[serde(default)]
    pub focus_areas: String,
}

/// Outcome of the rule-based aggression engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggressionAssessment {
    /// Clamped to 1..=100.
    pub score: u8,
    pub level: AggressionLevel,
    /// One human-readable line per rule that contributed.
    pub reasons: Vec<String>,
}

/// Everything the question generator needs for one turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionContext {
    /// Statement index holding this session's sworn record.
    pub session_index_id: String,
    pub case_type: String,
    pub witness_role: String,
    pub current_topic: String,
    pub question_number: u32,
    /// Absent on the first question of a topic.
    #[serde(default)]
    pub prior_answer: Option<String>,
    #[serde(default)]
    pub hesitation_detected: bool,
    /// Set by the session layer when the detector flagged the last answer.
    #[serde(default)]
    pub recent_inconsistency_flag: bool,
    #[serde(default)]
    pub prior_weak_areas: Vec<String>,
    pub aggression: AggressionLevel,
}

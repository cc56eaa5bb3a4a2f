//! Post-session coaching brief types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::AggressionLevel;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptEntry {
    pub speaker: String,
    pub content: String,
}

/// A detection alert that fired during the session, summarized for the
/// coaching prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSummary {
    pub alert_type: String,
    pub prior_quote: String,
    pub confidence: f64,
}

/// Everything the brief generator needs about a completed session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BriefRequest {
    pub session_id: String,
    pub case_type: String,
    pub witness_role: String,
    pub aggression: AggressionLevel,
    pub duration_minutes: u32,
    pub question_count: u32,
    #[serde(default)]
    pub transcript: Vec<TranscriptEntry>,
    #[serde(default)]
    pub alerts: Vec<AlertSummary>,
}

/// Per-dimension weakness scores on the fixed coaching rubric, 0-100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaknessMap {
    pub timeline: u8,
    pub financials: u8,
    pub communications: u8,
    pub relationships: u8,
    pub composure: u8,
}

/// Coaching brief produced at session end.
///
/// All fields except `generated_at` come from the coaching model's JSON
/// contract; the timestamp is stamped by the generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachingBrief {
    /// Overall session score, 0-100.
    pub session_score: u8,
    /// Fraction of answers consistent with the sworn record, 0.0-1.0.
    pub consistency_rate: f64,
    pub top_recommendations: Vec<String>,
    pub narrative_text: String,
    pub weakness_map_scores: WeaknessMap,
    pub confirmed_flags: u32,
    pub objection_count: u32,
    pub composure_alerts: u32,
    #[serde(default = "Utc::now")]
    pub generated_at: DateTime<Utc>,
}

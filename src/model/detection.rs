//! Inconsistency detection types: indexed statement candidates, scoring
//! verdicts, and the result shape the session channel publishes.

use serde::{Deserialize, Serialize};

/// Source location details for an indexed prior statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementMetadata {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub doc_type: Option<String>,
    #[serde(default)]
    pub witness_name: Option<String>,
}

/// A prior sworn statement returned by the statement index, ranked by
/// relevance to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementCandidate {
    #[serde(default)]
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub metadata: StatementMetadata,
}

/// Normalized scoring verdict.
///
/// Confidence is clamped to 0.0..=1.0 at parse time; a negative or missing
/// best-match index becomes `None`. `via_fallback` records which scorer
/// produced the verdict so the detector can apply the right live threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ContradictionVerdict {
    pub confidence: f64,
    pub best_match_index: Option<usize>,
    pub reasoning: Option<String>,
    pub via_fallback: bool,
}

/// Reserved escalation marker. Always `Standard` in this version; the
/// promotion criteria for `High` are still being decided with the coaching
/// team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImpeachmentRisk {
    Standard,
    High,
}

/// Inputs for one detection pass over a witness answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionRequest {
    /// Statement index holding this session's sworn record.
    pub session_index_id: String,
    pub case_type: String,
    pub question_number: u32,
    pub question_text: String,
    pub answer_text: String,
}

/// Detection outcome published to the session channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InconsistencyResult {
    pub flag_found: bool,
    pub is_live_fired: bool,
    pub contradiction_confidence: f64,
    pub prior_quote: Option<String>,
    pub prior_document_page: Option<u32>,
    pub prior_document_line: Option<u32>,
    pub reasoning: Option<String>,
    pub impeachment_risk: ImpeachmentRisk,
}

impl InconsistencyResult {
    /// Result for an answer with nothing on record against it.
    pub fn clean() -> Self {
        Self {
            flag_found: false,
            is_live_fired: false,
            contradiction_confidence: 0.0,
            prior_quote: None,
            prior_document_page: None,
            prior_document_line: None,
            reasoning: None,
            impeachment_risk: ImpeachmentRisk::Standard,
        }
    }
}

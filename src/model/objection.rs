//! Objection screening verdicts over the five FRE categories.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectionCategory {
    Compound,
    Leading,
    Hearsay,
    AssumesFacts,
    Speculation,
}

/// Screening verdict for a single deposition question.
///
/// Deserialized straight from the screening model's JSON contract;
/// `is_objectionable` and `confidence` are required, the rest are null
/// when the question is clean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectionVerdict {
    pub is_objectionable: bool,
    #[serde(default)]
    pub category: Option<ObjectionCategory>,
    #[serde(default)]
    pub fre_rule: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    pub confidence: f64,
}

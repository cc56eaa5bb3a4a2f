//! Live inconsistency detection.
//!
//! Each witness answer is checked against the session's sworn record:
//! retrieve the closest prior statements, score the answer against them,
//! then apply the threshold policy. A floor-to-live band leaves a flag on
//! the record without interrupting the session; only confidence at or above
//! the live threshold fires mid-deposition.

mod error;

use std::sync::Arc;
use std::time::Instant;

use crate::model::{
    ContradictionVerdict, DetectionRequest, DetectionThresholds, ImpeachmentRisk,
    InconsistencyResult, StatementCandidate,
};
use crate::retriever::StatementSearch;
use crate::service::scoring::ContradictionScorer;

pub use error::DetectorError;

const CANDIDATE_TOP_K: usize = 5;

pub struct InconsistencyDetector {
    search: Arc<dyn StatementSearch>,
    primary: Arc<dyn ContradictionScorer>,
    fallback: Arc<dyn ContradictionScorer>,
    thresholds: DetectionThresholds,
}

impl InconsistencyDetector {
    pub fn new(
        search: Arc<dyn StatementSearch>,
        primary: Arc<dyn ContradictionScorer>,
        fallback: Arc<dyn ContradictionScorer>,
        thresholds: DetectionThresholds,
    ) -> Self {
        Self {
            search,
            primary,
            fallback,
            thresholds,
        }
    }

    /// Run one detection pass over a witness answer.
    ///
    /// The fallback scorer is consulted at most once, and only after the
    /// primary has failed; if the fallback fails too, the error propagates
    /// rather than turning into a silent clean result.
    pub async fn detect(
        &self,
        request: &DetectionRequest,
    ) -> Result<InconsistencyResult, DetectorError> {
        let started = Instant::now();

        let candidates = self
            .search
            .search(
                &request.session_index_id,
                &request.answer_text,
                CANDIDATE_TOP_K,
                None,
            )
            .await?;

        if candidates.is_empty() {
            tracing::debug!(
                question_number = request.question_number,
                "No prior statements on record, skipping scoring"
            );
            return Ok(InconsistencyResult::clean());
        }

        let case_context = format!("{} deposition", request.case_type);

        let verdict = match self
            .primary
            .score(&request.answer_text, &candidates, &case_context)
            .await
        {
            Ok(verdict) => verdict,
            Err(primary_err) => {
                tracing::warn!(
                    question_number = request.question_number,
                    error = %primary_err,
                    "Primary scorer failed, engaging fallback"
                );
                self.fallback
                    .score(&request.answer_text, &candidates, &case_context)
                    .await?
            }
        };

        let result = resolve_verdict(&verdict, &candidates, &self.thresholds);

        tracing::info!(
            question_number = request.question_number,
            flag_found = result.flag_found,
            is_live_fired = result.is_live_fired,
            confidence = result.contradiction_confidence,
            via_fallback = verdict.via_fallback,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Inconsistency detection completed"
        );

        Ok(result)
    }
}

/// Threshold policy for a scored verdict.
///
/// Below the floor nothing is recorded, but the actual confidence is still
/// reported. At or above the floor a flag is cut; whether it live-fires
/// depends on which scorer produced the verdict. An index pointing outside
/// the candidate set keeps the flag and leaves the quote fields empty.
fn resolve_verdict(
    verdict: &ContradictionVerdict,
    candidates: &[StatementCandidate],
    thresholds: &DetectionThresholds,
) -> InconsistencyResult {
    let confidence = verdict.confidence;

    if confidence < thresholds.flag_floor {
        return InconsistencyResult {
            contradiction_confidence: confidence,
            ..InconsistencyResult::clean()
        };
    }

    let live_threshold = if verdict.via_fallback {
        thresholds.fallback_live_fire
    } else {
        thresholds.live_fire
    };

    let best_match = verdict.best_match_index.and_then(|i| candidates.get(i));

    InconsistencyResult {
        flag_found: true,
        is_live_fired: confidence >= live_threshold,
        contradiction_confidence: confidence,
        prior_quote: best_match.map(|c| c.content.clone()),
        prior_document_page: best_match.and_then(|c| c.metadata.page),
        prior_document_line: best_match.and_then(|c| c.metadata.line),
        reasoning: verdict.reasoning.clone(),
        impeachment_risk: ImpeachmentRisk::Standard,
    }
}

//! Error types for inconsistency detection.

use crate::retriever::RetrievalError;
use crate::service::scoring::ScoringError;

#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    /// The statement index could not be queried. Never degraded into a
    /// guessed verdict; the session layer decides how to surface the outage.
    #[error("Prior-statement retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    /// Both the primary and the fallback scorer failed.
    #[error("Contradiction scoring failed: {0}")]
    Scoring(#[from] ScoringError),
}

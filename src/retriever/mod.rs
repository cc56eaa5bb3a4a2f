//! Prior-statement retrieval against session and reference indexes.

mod nia;

use async_trait::async_trait;

use crate::model::StatementCandidate;

pub use nia::NiaClient;

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("Search request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Search returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to parse search response: {0}")]
    Malformed(String),
}

/// Ranked lookup over an append-only statement index.
///
/// Zero results is a normal outcome and never an error; callers that need
/// to distinguish "nothing on record" from "index unreachable" match on
/// `RetrievalError`.
#[async_trait]
pub trait StatementSearch: Send + Sync {
    /// Return the `top_k` statements most relevant to `query`, best first.
    async fn search(
        &self,
        index_id: &str,
        query: &str,
        top_k: usize,
        filters: Option<serde_json::Value>,
    ) -> Result<Vec<StatementCandidate>, RetrievalError>;
}

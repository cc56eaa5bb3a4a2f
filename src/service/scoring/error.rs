//! Error types for contradiction scoring.

use crate::service::llm::ChatError;

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("Scoring request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Scoring returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Malformed scoring verdict: {0}")]
    Malformed(String),
}

impl From<ChatError> for ScoringError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Transport(e) => ScoringError::Transport(e),
            ChatError::Status { status, body } => ScoringError::Status { status, body },
            ChatError::Malformed(msg) => ScoringError::Malformed(msg),
        }
    }
}

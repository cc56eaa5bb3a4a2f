use crate::service::llm::ChatError;

#[derive(Debug, thiserror::Error)]
pub enum BriefError {
    #[error("Brief request failed: {0}")]
    Chat(#[from] ChatError),

    #[error("Coaching brief violated contract: {0}")]
    Malformed(String),
}

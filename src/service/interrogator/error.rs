use crate::service::llm::ChatError;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The generation stream could not be opened or failed mid-question.
    #[error("question stream failed: {0}")]
    Stream(#[from] ChatError),
}

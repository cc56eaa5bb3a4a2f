use crate::service::llm::ChatError;

#[derive(Debug, thiserror::Error)]
pub enum ScreeningError {
    #[error("Screening request failed: {0}")]
    Chat(#[from] ChatError),

    /// The judge answered, but not with a verdict matching the contract.
    /// Never downgraded to a default "not objectionable".
    #[error("Screening verdict violated contract: {0}")]
    Malformed(String),
}

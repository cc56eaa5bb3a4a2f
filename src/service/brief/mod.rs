//! Post-session coaching brief generation.

mod error;
mod prompts;

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;

use crate::model::{BriefRequest, CoachingBrief};
use crate::service::contract::parse_contract;
use crate::service::llm::ChatCompletion;

pub use error::BriefError;
pub use prompts::{BRIEF_SYSTEM_PROMPT, build_brief_prompt};

const BRIEF_MAX_TOKENS: u32 = 1500;

pub struct BriefGenerator {
    chat: Arc<dyn ChatCompletion>,
}

impl BriefGenerator {
    pub fn new(chat: Arc<dyn ChatCompletion>) -> Self {
        Self { chat }
    }

    /// Produce the coaching brief for a completed session.
    pub async fn generate(&self, request: &BriefRequest) -> Result<CoachingBrief, BriefError> {
        let started = Instant::now();

        let prompt = build_brief_prompt(request);
        let raw = self
            .chat
            .complete(BRIEF_SYSTEM_PROMPT, &prompt, BRIEF_MAX_TOKENS)
            .await?;

        let mut brief: CoachingBrief = parse_contract(&raw).map_err(BriefError::Malformed)?;
        brief.generated_at = Utc::now();

        tracing::info!(
            session_id = %request.session_id,
            session_score = brief.session_score,
            confirmed_flags = brief.confirmed_flags,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Coaching brief generated"
        );

        Ok(brief)
    }
}

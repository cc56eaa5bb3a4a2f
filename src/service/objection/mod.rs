//! Objection screening against the Federal Rules of Evidence.
//!
//! Classifies a generated question into the fixed objection taxonomy using
//! a chat model judge. The call rides a short transport timeout because the
//! verdict has to land before the question finishes being read aloud; a
//! timeout surfaces as a transport error like any other.

mod error;
mod prompts;

use std::sync::Arc;
use std::time::Instant;

use serde_json::json;

use crate::model::ObjectionVerdict;
use crate::retriever::StatementSearch;
use crate::service::contract::parse_contract;
use crate::service::llm::ChatCompletion;

pub use error::ScreeningError;
pub use prompts::{OBJECTION_SYSTEM_PROMPT, build_screening_prompt};

const FRE_TOP_K: usize = 3;
const SCREENING_MAX_TOKENS: u32 = 256;

pub struct ObjectionScreener {
    chat: Arc<dyn ChatCompletion>,
    search: Arc<dyn StatementSearch>,
    fre_index_id: Option<String>,
}

impl ObjectionScreener {
    pub fn new(
        chat: Arc<dyn ChatCompletion>,
        search: Arc<dyn StatementSearch>,
        fre_index_id: Option<String>,
    ) -> Self {
        Self {
            chat,
            search,
            fre_index_id,
        }
    }

    /// Screen one question for objectionable content.
    ///
    /// A verdict that fails the JSON contract is an error; the screener
    /// never substitutes a default verdict for output it cannot parse.
    pub async fn analyze(&self, question_text: &str) -> Result<ObjectionVerdict, ScreeningError> {
        let started = Instant::now();

        let fre_context = self.fetch_fre_context(question_text).await;
        let prompt = build_screening_prompt(question_text, &fre_context);

        let raw = self
            .chat
            .complete(OBJECTION_SYSTEM_PROMPT, &prompt, SCREENING_MAX_TOKENS)
            .await?;

        let verdict: ObjectionVerdict = parse_contract(&raw).map_err(ScreeningError::Malformed)?;

        tracing::debug!(
            is_objectionable = verdict.is_objectionable,
            category = ?verdict.category,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Objection screening completed"
        );

        Ok(verdict)
    }

    /// Best-effort retrieval of matching rule text from the FRE corpus.
    /// Screening proceeds without it when the corpus is unconfigured or
    /// unreachable.
    async fn fetch_fre_context(&self, question_text: &str) -> String {
        let Some(index_id) = &self.fre_index_id else {
            tracing::debug!("No FRE corpus index configured, screening without rule context");
            return String::new();
        };

        let filters = json!({"is_deposition_relevant": "true"});
        match self
            .search
            .search(index_id, question_text, FRE_TOP_K, Some(filters))
            .await
        {
            Ok(rules) => rules
                .into_iter()
                .map(|r| r.content)
                .collect::<Vec<_>>()
                .join("\n"),
            Err(err) => {
                tracing::warn!(error = %err, "FRE corpus search failed, screening without rule context");
                String::new()
            }
        }
    }
}

//! Contradiction scoring against the sworn record.
//!
//! The primary scorer is a dedicated judge model behind an OpenAI-compatible
//! completions endpoint; the fallback rides the general chat model with a
//! minimal prompt and is only consulted when the primary fails. Both parse
//! the verdict strictly: a reply that violates the contract is an error,
//! never a guessed score.

mod error;
pub mod prompts;

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::model::{ContradictionVerdict, StatementCandidate};
use crate::service::llm::ChatCompletion;

pub use error::ScoringError;

const SCORING_MAX_TOKENS: u32 = 200;
const SCORING_TEMPERATURE: f64 = 0.1;

/// One scoring attempt over a non-empty candidate set.
///
/// Callers short-circuit empty candidate sets before reaching a scorer;
/// calling with no statements is a caller bug.
#[async_trait]
pub trait ContradictionScorer: Send + Sync {
    async fn score(
        &self,
        witness_answer: &str,
        statements: &[StatementCandidate],
        case_context: &str,
    ) -> Result<ContradictionVerdict, ScoringError>;
}

/// Verdict wire shape shared by both scorers.
///
/// `best_match_index` uses -1 as the no-match sentinel, so it is missing
/// from some replies and negative in others; both normalize to `None`.
#[derive(Debug, Deserialize)]
struct RawVerdict {
    contradiction_confidence: f64,
    #[serde(default = "missing_index")]
    best_match_index: i64,
    #[serde(default)]
    reasoning: Option<String>,
}

fn missing_index() -> i64 {
    -1
}

impl RawVerdict {
    fn into_verdict(self, via_fallback: bool) -> ContradictionVerdict {
        ContradictionVerdict {
            confidence: self.contradiction_confidence.clamp(0.0, 1.0),
            best_match_index: usize::try_from(self.best_match_index).ok(),
            reasoning: self.reasoning,
            via_fallback,
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<CompletionMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Serialize)]
struct CompletionMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Primary judge over the Nemotron completions endpoint.
pub struct NemotronScorer {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl NemotronScorer {
    pub fn new(
        client: Client,
        base_url: String,
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url,
            api_key,
            model,
            timeout,
        }
    }
}

#[async_trait]
impl ContradictionScorer for NemotronScorer {
    async fn score(
        &self,
        witness_answer: &str,
        statements: &[StatementCandidate],
        case_context: &str,
    ) -> Result<ContradictionVerdict, ScoringError> {
        debug_assert!(!statements.is_empty(), "score called without candidates");

        let started = Instant::now();
        let prompt = prompts::build_judge_prompt(witness_answer, statements, case_context);
        let url = format!("{}/chat/completions", self.base_url);

        let request = CompletionRequest {
            model: &self.model,
            messages: vec![CompletionMessage {
                role: "user",
                content: &prompt,
            }],
            max_tokens: SCORING_MAX_TOKENS,
            temperature: SCORING_TEMPERATURE,
        };

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ScoringError::Status { status, body });
        }

        let completion: CompletionResponse = response.json().await.map_err(|e| {
            ScoringError::Malformed(format!("Failed to deserialize completion: {}", e))
        })?;

        let text = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ScoringError::Malformed("Completion contained no choices".to_string()))?;

        let raw: RawVerdict = serde_json::from_str(&text)
            .map_err(|e| ScoringError::Malformed(format!("Verdict violated contract: {}", e)))?;

        let verdict = raw.into_verdict(false);

        tracing::debug!(
            confidence = verdict.confidence,
            best_match_index = ?verdict.best_match_index,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Scored witness answer"
        );

        Ok(verdict)
    }
}

/// Conservative fallback scorer over the chat model.
pub struct FallbackScorer {
    chat: Arc<dyn ChatCompletion>,
}

impl FallbackScorer {
    pub fn new(chat: Arc<dyn ChatCompletion>) -> Self {
        Self { chat }
    }
}

#[async_trait]
impl ContradictionScorer for FallbackScorer {
    async fn score(
        &self,
        witness_answer: &str,
        statements: &[StatementCandidate],
        _case_context: &str,
    ) -> Result<ContradictionVerdict, ScoringError> {
        debug_assert!(!statements.is_empty(), "score called without candidates");

        let started = Instant::now();
        let user_message = prompts::build_fallback_prompt(witness_answer, statements);

        let text = self
            .chat
            .complete(prompts::FALLBACK_SYSTEM_PROMPT, &user_message, SCORING_MAX_TOKENS)
            .await?;

        let raw: RawVerdict = serde_json::from_str(&text).map_err(|e| {
            ScoringError::Malformed(format!("Fallback verdict violated contract: {}", e))
        })?;

        let verdict = raw.into_verdict(true);

        tracing::debug!(
            confidence = verdict.confidence,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Fallback scored witness answer"
        );

        Ok(verdict)
    }
}

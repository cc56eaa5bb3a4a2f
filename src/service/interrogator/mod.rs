//! Streaming deposition question generation.
//!
//! One call produces one question, streamed token-by-token. Retrieval of
//! prior sworn statements is best-effort context: if the statement index is
//! unreachable the question is generated without it, since a silent question
//! gap hurts a live session more than a less-informed question.

mod error;
mod prompts;
mod stream;

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;

use crate::model::QuestionContext;
use crate::retriever::StatementSearch;
use crate::service::llm::{ChatCompletion, TokenStream};

pub use error::GenerationError;
pub use prompts::{INTERROGATOR_SYSTEM_PROMPT, aggression_instruction, build_question_prompt};
pub use stream::{QuestionEvents, QuestionStream};

const CONTEXT_TOP_K: usize = 3;
const QUESTION_MAX_TOKENS: u32 = 200;
const CHUNK_BUFFER: usize = 32;

pub struct Interrogator {
    chat: Arc<dyn ChatCompletion>,
    search: Arc<dyn StatementSearch>,
}

impl Interrogator {
    pub fn new(chat: Arc<dyn ChatCompletion>, search: Arc<dyn StatementSearch>) -> Self {
        Self { chat, search }
    }

    /// Open a fragment stream for the next question.
    ///
    /// Dropping the returned stream cancels generation: the producer task
    /// stops forwarding and the model connection is released.
    pub async fn generate(
        &self,
        context: &QuestionContext,
    ) -> Result<QuestionStream, GenerationError> {
        let statements = match &context.prior_answer {
            Some(answer) => match self
                .search
                .search(&context.session_index_id, answer, CONTEXT_TOP_K, None)
                .await
            {
                Ok(statements) => statements,
                Err(err) => {
                    tracing::warn!(
                        question_number = context.question_number,
                        error = %err,
                        "Context retrieval failed, generating without prior statements"
                    );
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let prompt = build_question_prompt(context, &statements);
        let tokens = self
            .chat
            .stream(INTERROGATOR_SYSTEM_PROMPT, &prompt, QUESTION_MAX_TOKENS)
            .await?;

        tracing::debug!(
            question_number = context.question_number,
            aggression = %context.aggression,
            statements = statements.len(),
            "Question stream opened"
        );

        let (tx, rx) = mpsc::channel(CHUNK_BUFFER);
        tokio::spawn(pump_tokens(tokens, tx));
        Ok(QuestionStream::new(rx))
    }
}

/// Forward model tokens into the consumer channel.
///
/// Returns when the source ends, after forwarding a terminal error, or when
/// the receiver is dropped; in every case the token stream is dropped here,
/// which closes the underlying connection.
async fn pump_tokens(mut tokens: TokenStream, tx: mpsc::Sender<Result<String, GenerationError>>) {
    while let Some(item) = tokens.next().await {
        let terminal = item.is_err();
        if tx.send(item.map_err(GenerationError::from)).await.is_err() {
            return;
        }
        if terminal {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AggressionLevel, SessionEvent, StatementCandidate, StatementMetadata};
    use crate::retriever::RetrievalError;
    use crate::service::llm::ChatError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    struct ScriptedChat {
        fragments: Vec<Result<String, String>>,
        last_user_message: Mutex<Option<String>>,
    }

    impl ScriptedChat {
        fn fragments(parts: &[&str]) -> Self {
            Self {
                fragments: parts.iter().map(|p| Ok(p.to_string())).collect(),
                last_user_message: Mutex::new(None),
            }
        }

        fn with_items(fragments: Vec<Result<String, String>>) -> Self {
            Self {
                fragments,
                last_user_message: Mutex::new(None),
            }
        }

        fn prompt(&self) -> String {
            self.last_user_message.lock().unwrap().clone().unwrap()
        }
    }

    #[async_trait]
    impl ChatCompletion for ScriptedChat {
        async fn complete(
            &self,
            _system_prompt: &str,
            _user_message: &str,
            _max_tokens: u32,
        ) -> Result<String, ChatError> {
            Err(ChatError::Malformed("not a completion endpoint".to_string()))
        }

        async fn stream(
            &self,
            _system_prompt: &str,
            user_message: &str,
            _max_tokens: u32,
        ) -> Result<TokenStream, ChatError> {
            *self.last_user_message.lock().unwrap() = Some(user_message.to_string());
            let items: Vec<Result<String, ChatError>> = self
                .fragments
                .iter()
                .map(|f| match f {
                    Ok(text) => Ok(text.clone()),
                    Err(msg) => Err(ChatError::Malformed(msg.clone())),
                })
                .collect();
            Ok(Box::pin(futures::stream::iter(items)))
        }
    }

    /// Sets a flag when its token stream is dropped.
    struct EndlessChat {
        released: std::sync::Arc<AtomicBool>,
    }

    struct DropFlag(std::sync::Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl ChatCompletion for EndlessChat {
        async fn complete(
            &self,
            _system_prompt: &str,
            _user_message: &str,
            _max_tokens: u32,
        ) -> Result<String, ChatError> {
            Err(ChatError::Malformed("not a completion endpoint".to_string()))
        }

        async fn stream(
            &self,
            _system_prompt: &str,
            _user_message: &str,
            _max_tokens: u32,
        ) -> Result<TokenStream, ChatError> {
            let guard = DropFlag(self.released.clone());
            Ok(Box::pin(futures::stream::repeat_with(
                move || -> Result<String, ChatError> {
                    let _held = &guard;
                    Ok("objection ".to_string())
                },
            )))
        }
    }

    struct FakeSearch {
        statements: Vec<StatementCandidate>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl FakeSearch {
        fn returning(statements: Vec<StatementCandidate>) -> Self {
            Self {
                statements,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                statements: Vec::new(),
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl StatementSearch for FakeSearch {
        async fn search(
            &self,
            _index_id: &str,
            _query: &str,
            _top_k: usize,
            _filters: Option<serde_json::Value>,
        ) -> Result<Vec<StatementCandidate>, RetrievalError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RetrievalError::Malformed("index offline".to_string()));
            }
            Ok(self.statements.clone())
        }
    }

    fn context() -> QuestionContext {
        QuestionContext {
            session_index_id: "session-ctx-1".to_string(),
            case_type: "medmal".to_string(),
            witness_role: "treating physician".to_string(),
            current_topic: "the surgical timeline".to_string(),
            question_number: 7,
            prior_answer: Some("I reviewed the scans that morning.".to_string()),
            hesitation_detected: false,
            recent_inconsistency_flag: false,
            prior_weak_areas: Vec::new(),
            aggression: AggressionLevel::Standard,
        }
    }

    #[tokio::test]
    async fn test_streams_fragments_in_order() {
        let chat = Arc::new(ScriptedChat::fragments(&["Did ", "you ", "review ", "the MRI?"]));
        let search = Arc::new(FakeSearch::returning(Vec::new()));
        let interrogator = Interrogator::new(chat, search);

        let fragments: Vec<String> = interrogator
            .generate(&context())
            .await
            .unwrap()
            .map(|f| f.unwrap())
            .collect()
            .await;

        assert_eq!(fragments, vec!["Did ", "you ", "review ", "the MRI?"]);
    }

    #[tokio::test]
    async fn test_events_reconstruct_full_question() {
        let chat = Arc::new(ScriptedChat::fragments(&["Did ", "you ", "review ", "the MRI?"]));
        let search = Arc::new(FakeSearch::returning(Vec::new()));
        let interrogator = Interrogator::new(chat, search);

        let events: Vec<_> = interrogator
            .generate(&context())
            .await
            .unwrap()
            .into_events(7)
            .collect()
            .await;

        assert_eq!(
            events[0].as_ref().unwrap(),
            &SessionEvent::QuestionStart { question_number: 7 }
        );

        let mut rebuilt = String::new();
        for event in &events[1..events.len() - 1] {
            match event.as_ref().unwrap() {
                SessionEvent::QuestionChunk { text } => rebuilt.push_str(text),
                other => panic!("expected chunk, got {:?}", other),
            }
        }

        match events.last().unwrap().as_ref().unwrap() {
            SessionEvent::QuestionEnd { full_text, .. } => {
                assert_eq!(full_text, "Did you review the MRI?");
                assert_eq!(full_text, &rebuilt);
            }
            other => panic!("expected end, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_mid_stream_failure_ends_without_question_end() {
        let chat = Arc::new(ScriptedChat::with_items(vec![
            Ok("Did ".to_string()),
            Err("stream dropped".to_string()),
        ]));
        let search = Arc::new(FakeSearch::returning(Vec::new()));
        let interrogator = Interrogator::new(chat, search);

        let events: Vec<_> = interrogator
            .generate(&context())
            .await
            .unwrap()
            .into_events(7)
            .collect()
            .await;

        assert_eq!(events.len(), 3);
        assert!(events[0].is_ok());
        assert!(events[1].is_ok());
        assert!(events[2].is_err());
        assert!(!events.iter().any(|e| matches!(
            e,
            Ok(SessionEvent::QuestionEnd { .. })
        )));
    }

    #[tokio::test]
    async fn test_dropping_stream_releases_model_connection() {
        let released = std::sync::Arc::new(AtomicBool::new(false));
        let chat = Arc::new(EndlessChat {
            released: released.clone(),
        });
        let search = Arc::new(FakeSearch::returning(Vec::new()));
        let interrogator = Interrogator::new(chat, search);

        let mut stream = interrogator.generate(&context()).await.unwrap();
        assert!(stream.next().await.is_some());
        drop(stream);

        let deadline = Instant::now() + Duration::from_secs(2);
        while !released.load(Ordering::SeqCst) {
            assert!(
                Instant::now() < deadline,
                "producer kept streaming after the consumer hung up"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn test_prior_answer_pulls_statement_context() {
        let chat = Arc::new(ScriptedChat::fragments(&["Q?"]));
        let search = Arc::new(FakeSearch::returning(vec![StatementCandidate {
            id: "s0".to_string(),
            content: "I first saw the scans in the afternoon.".to_string(),
            score: 0.88,
            metadata: StatementMetadata::default(),
        }]));
        let interrogator = Interrogator::new(chat.clone(), search.clone());

        let _ = interrogator.generate(&context()).await.unwrap();

        assert_eq!(search.calls.load(Ordering::SeqCst), 1);
        assert!(chat.prompt().contains("I first saw the scans in the afternoon."));
    }

    #[tokio::test]
    async fn test_first_question_skips_retrieval() {
        let chat = Arc::new(ScriptedChat::fragments(&["Q?"]));
        let search = Arc::new(FakeSearch::returning(Vec::new()));
        let interrogator = Interrogator::new(chat.clone(), search.clone());

        let context = QuestionContext {
            prior_answer: None,
            ..context()
        };
        let _ = interrogator.generate(&context).await.unwrap();

        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
        assert!(chat.prompt().contains("First question on this topic."));
    }

    #[tokio::test]
    async fn test_retrieval_failure_degrades_to_no_context() {
        let chat = Arc::new(ScriptedChat::fragments(&["Q?"]));
        let search = Arc::new(FakeSearch::failing());
        let interrogator = Interrogator::new(chat.clone(), search);

        let fragments: Vec<String> = interrogator
            .generate(&context())
            .await
            .unwrap()
            .map(|f| f.unwrap())
            .collect()
            .await;

        assert_eq!(fragments, vec!["Q?"]);
        assert!(!chat.prompt().contains("Relevant prior sworn statements"));
    }
}

//! Chat model client over the Anthropic-compatible Messages API.
//!
//! Provides single-shot completions and incremental token streaming. The
//! streaming side decodes the server-sent event wire format and yields only
//! text deltas; dropping the stream aborts the request.

use std::collections::VecDeque;
use std::pin::Pin;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Chat request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Chat returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to parse chat response: {0}")]
    Malformed(String),
}

/// Incremental text deltas of one completion. An `Err` item is terminal.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String, ChatError>> + Send>>;

/// Seam for everything that talks to the chat model, so services can be
/// exercised against in-memory fakes.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Single completion returning the first text block.
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
        max_tokens: u32,
    ) -> Result<String, ChatError>;

    /// Streaming completion yielding text deltas as they arrive.
    async fn stream(
        &self,
        system_prompt: &str,
        user_message: &str,
        max_tokens: u32,
    ) -> Result<TokenStream, ChatError>;
}

/// Client for an Anthropic-compatible Messages API endpoint.
pub struct ChatClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

impl ChatClient {
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

    async fn send_messages(
        &self,
        system_prompt: &str,
        user_message: &str,
        max_tokens: u32,
        stream: bool,
    ) -> Result<reqwest::Response, ChatError> {
        let url = format!("{}/v1/messages", self.base_url);
        let request = MessagesRequest {
            model: &self.model,
            max_tokens,
            system: system_prompt,
            messages: vec![Message {
                role: "user",
                content: user_message,
            }],
            stream: stream.then_some(true),
        };

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Status { status, body });
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatCompletion for ChatClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
        max_tokens: u32,
    ) -> Result<String, ChatError> {
        let started = Instant::now();
        let response = self
            .send_messages(system_prompt, user_message, max_tokens, false)
            .await?;

        let completion: MessagesResponse = response.json().await.map_err(|e| {
            ChatError::Malformed(format!("Failed to deserialize completion: {}", e))
        })?;

        let block = completion
            .content
            .into_iter()
            .next()
            .ok_or_else(|| ChatError::Malformed("Completion contained no content blocks".to_string()))?;

        if block.kind != "text" {
            return Err(ChatError::Malformed(format!(
                "Unexpected content block type: {}",
                block.kind
            )));
        }

        tracing::debug!(
            model = %self.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Chat completion finished"
        );

        Ok(block.text)
    }

    async fn stream(
        &self,
        system_prompt: &str,
        user_message: &str,
        max_tokens: u32,
    ) -> Result<TokenStream, ChatError> {
        let response = self
            .send_messages(system_prompt, user_message, max_tokens, true)
            .await?;

        tracing::debug!(model = %self.model, "Chat stream opened");

        Ok(sse_token_stream(response.bytes_stream()))
    }
}

#[derive(Deserialize)]
struct StreamEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    delta: Option<StreamDelta>,
}

#[derive(Deserialize)]
struct StreamDelta {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: String,
}

struct SseState<S> {
    inner: Pin<Box<S>>,
    buf: Vec<u8>,
    pending: VecDeque<String>,
    done: bool,
}

/// Decode a Messages API event stream into text deltas.
///
/// Frames are separated by a blank line; only `content_block_delta` events
/// with a `text_delta` payload produce items, and `message_stop` ends the
/// stream. A transport or decode failure yields one terminal `Err`.
fn sse_token_stream<S, B>(events: S) -> TokenStream
where
    S: Stream<Item = Result<B, reqwest::Error>> + Send + 'static,
    B: AsRef<[u8]>,
{
    let state = SseState {
        inner: Box::pin(events),
        buf: Vec::new(),
        pending: VecDeque::new(),
        done: false,
    };

    Box::pin(futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(text) = state.pending.pop_front() {
                return Some((Ok(text), state));
            }
            if state.done {
                return None;
            }

            match state.inner.next().await {
                Some(Ok(chunk)) => {
                    state.buf.extend_from_slice(chunk.as_ref());
                    if let Err(e) = drain_frames(&mut state.buf, &mut state.pending, &mut state.done)
                    {
                        // The Err must be the last item; deltas queued from
                        // the same chunk ahead of the bad frame are dropped.
                        state.pending.clear();
                        state.done = true;
                        return Some((Err(e), state));
                    }
                }
                Some(Err(e)) => {
                    state.done = true;
                    return Some((Err(ChatError::Transport(e)), state));
                }
                None => {
                    state.done = true;
                    return None;
                }
            }
        }
    }))
}

/// Split complete frames off the front of `buf` and queue their text deltas.
fn drain_frames(
    buf: &mut Vec<u8>,
    pending: &mut VecDeque<String>,
    done: &mut bool,
) -> Result<(), ChatError> {
    while let Some(boundary) = buf.windows(2).position(|w| w == b"\n\n") {
        let frame: Vec<u8> = buf.drain(..boundary + 2).collect();
        let frame = std::str::from_utf8(&frame[..boundary])
            .map_err(|e| ChatError::Malformed(format!("Stream frame was not UTF-8: {}", e)))?
            .to_string();

        for line in frame.lines() {
            let line = line.trim_end_matches('\r');
            let Some(data) = line.strip_prefix("data:") else {
                continue;
            };
            let data = data.trim_start();

            let event: StreamEvent = serde_json::from_str(data)
                .map_err(|e| ChatError::Malformed(format!("Undecodable stream event: {}", e)))?;

            match event.kind.as_str() {
                "content_block_delta" => {
                    if let Some(delta) = event.delta {
                        if delta.kind == "text_delta" {
                            pending.push_back(delta.text);
                        }
                    }
                }
                "message_stop" => {
                    *done = true;
                }
                "error" => {
                    return Err(ChatError::Malformed(format!(
                        "Stream reported an error event: {}",
                        data
                    )));
                }
                // message_start, content_block_start/stop, message_delta, ping
                _ => {}
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn byte_chunks(parts: &[&str]) -> Vec<Result<Vec<u8>, reqwest::Error>> {
        parts.iter().map(|p| Ok(p.as_bytes().to_vec())).collect()
    }

    async fn collect_tokens(chunks: Vec<Result<Vec<u8>, reqwest::Error>>) -> Vec<Result<String, ChatError>> {
        sse_token_stream(futures::stream::iter(chunks)).collect().await
    }

    #[tokio::test]
    async fn test_decodes_text_deltas_in_order() {
        let tokens = collect_tokens(byte_chunks(&[
            "event: message_start\ndata: {\"type\": \"message_start\"}\n\n",
            "event: content_block_delta\ndata: {\"type\": \"content_block_delta\", \"delta\": {\"type\": \"text_delta\", \"text\": \"Did \"}}\n\n",
            "event: content_block_delta\ndata: {\"type\": \"content_block_delta\", \"delta\": {\"type\": \"text_delta\", \"text\": \"you?\"}}\n\n",
            "event: message_stop\ndata: {\"type\": \"message_stop\"}\n\n",
        ]))
        .await;

        let texts: Vec<String> = tokens.into_iter().map(|t| t.unwrap()).collect();
        assert_eq!(texts, vec!["Did ".to_string(), "you?".to_string()]);
    }

    #[tokio::test]
    async fn test_reassembles_frames_split_across_chunks() {
        let tokens = collect_tokens(byte_chunks(&[
            "data: {\"type\": \"content_block_delta\", \"delta\": {\"ty",
            "pe\": \"text_delta\", \"text\": \"review\"}}\n",
            "\ndata: {\"type\": \"message_stop\"}\n\n",
        ]))
        .await;

        let texts: Vec<String> = tokens.into_iter().map(|t| t.unwrap()).collect();
        assert_eq!(texts, vec!["review".to_string()]);
    }

    #[tokio::test]
    async fn test_ignores_non_delta_events() {
        let tokens = collect_tokens(byte_chunks(&[
            "data: {\"type\": \"ping\"}\n\n",
            "data: {\"type\": \"content_block_start\", \"content_block\": {\"type\": \"text\"}}\n\n",
            "data: {\"type\": \"content_block_delta\", \"delta\": {\"type\": \"text_delta\", \"text\": \"MRI?\"}}\n\n",
            "data: {\"type\": \"message_delta\", \"delta\": {\"stop_reason\": \"end_turn\"}}\n\n",
            "data: {\"type\": \"message_stop\"}\n\n",
        ]))
        .await;

        let texts: Vec<String> = tokens.into_iter().map(|t| t.unwrap()).collect();
        assert_eq!(texts, vec!["MRI?".to_string()]);
    }

    #[tokio::test]
    async fn test_undecodable_event_is_terminal() {
        let tokens = collect_tokens(byte_chunks(&[
            "data: {\"type\": \"content_block_delta\", \"delta\": {\"type\": \"text_delta\", \"text\": \"Did \"}}\n\n",
            "data: this is not json\n\n",
            "data: {\"type\": \"content_block_delta\", \"delta\": {\"type\": \"text_delta\", \"text\": \"lost\"}}\n\n",
        ]))
        .await;

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].as_ref().unwrap(), "Did ");
        assert!(matches!(tokens[1], Err(ChatError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_tokens_behind_a_bad_frame_are_dropped() {
        let tokens = collect_tokens(byte_chunks(&[
            "data: {\"type\": \"content_block_delta\", \"delta\": {\"type\": \"text_delta\", \"text\": \"Did \"}}\n\ndata: not json\n\n",
        ]))
        .await;

        assert_eq!(tokens.len(), 1);
        assert!(matches!(tokens[0], Err(ChatError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_error_event_is_terminal() {
        let tokens = collect_tokens(byte_chunks(&[
            "data: {\"type\": \"error\", \"error\": {\"type\": \"overloaded_error\"}}\n\n",
        ]))
        .await;

        assert_eq!(tokens.len(), 1);
        assert!(matches!(tokens[0], Err(ChatError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_stream_ends_cleanly_without_message_stop() {
        let tokens = collect_tokens(byte_chunks(&[
            "data: {\"type\": \"content_block_delta\", \"delta\": {\"type\": \"text_delta\", \"text\": \"Did\"}}\n\n",
        ]))
        .await;

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].as_ref().unwrap(), "Did");
    }
}

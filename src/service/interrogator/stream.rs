//! Consumer-facing question streams.
//!
//! `QuestionStream` yields raw text fragments; `QuestionEvents` wraps it in
//! the session channel protocol. Dropping either closes the channel, which
//! stops the producer task and releases the model connection.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use futures::Stream;
use tokio::sync::mpsc;

use crate::model::SessionEvent;

use super::GenerationError;

/// Text fragments of one question, in emission order. An `Err` item is
/// terminal; the stream ends without further fragments.
pub struct QuestionStream {
    rx: mpsc::Receiver<Result<String, GenerationError>>,
}

impl QuestionStream {
    pub(crate) fn new(rx: mpsc::Receiver<Result<String, GenerationError>>) -> Self {
        Self { rx }
    }

    /// Reframe the fragments as session channel events for question
    /// `question_number`. Latency is measured from the first poll.
    pub fn into_events(self, question_number: u32) -> QuestionEvents {
        QuestionEvents {
            inner: self,
            question_number,
            state: EventState::Start,
            full_text: String::new(),
            started: Instant::now(),
        }
    }
}

impl Stream for QuestionStream {
    type Item = Result<String, GenerationError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

enum EventState {
    Start,
    Streaming,
    Done,
}

/// Session event framing over a question stream.
///
/// Emits one `QuestionStart`, a `QuestionChunk` per fragment, and a final
/// `QuestionEnd` whose `full_text` is the concatenation of every chunk. A
/// mid-stream failure surfaces as a terminal `Err` with no `QuestionEnd`,
/// so a consumer never mistakes a truncated question for a complete one.
pub struct QuestionEvents {
    inner: QuestionStream,
    question_number: u32,
    state: EventState,
    full_text: String,
    started: Instant,
}

impl Stream for QuestionEvents {
    type Item = Result<SessionEvent, GenerationError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        match this.state {
            EventState::Start => {
                this.state = EventState::Streaming;
                this.started = Instant::now();
                Poll::Ready(Some(Ok(SessionEvent::QuestionStart {
                    question_number: this.question_number,
                })))
            }
            EventState::Streaming => match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(text))) => {
                    this.full_text.push_str(&text);
                    Poll::Ready(Some(Ok(SessionEvent::QuestionChunk { text })))
                }
                Poll::Ready(Some(Err(err))) => {
                    this.state = EventState::Done;
                    Poll::Ready(Some(Err(err)))
                }
                Poll::Ready(None) => {
                    this.state = EventState::Done;
                    Poll::Ready(Some(Ok(SessionEvent::QuestionEnd {
                        full_text: std::mem::take(&mut this.full_text),
                        latency_ms: this.started.elapsed().as_millis() as u64,
                    })))
                }
                Poll::Pending => Poll::Pending,
            },
            EventState::Done => Poll::Ready(None),
        }
    }
}

//! Session channel events for streamed question generation.

use serde::{Deserialize, Serialize};

/// One event on the question stream.
///
/// Per generated question the channel carries exactly one `QuestionStart`,
/// zero or more `QuestionChunk`s, and one `QuestionEnd` whose `full_text`
/// equals the concatenation of all chunk texts. A stream that fails
/// mid-generation ends without a `QuestionEnd`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    #[serde(rename = "QUESTION_START", rename_all = "camelCase")]
    QuestionStart { question_number: u32 },
    #[serde(rename = "QUESTION_CHUNK")]
    QuestionChunk { text: String },
    #[serde(rename = "QUESTION_END", rename_all = "camelCase")]
    QuestionEnd { full_text: String, latency_ms: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_serialize_to_channel_protocol() {
        let start = serde_json::to_value(SessionEvent::QuestionStart { question_number: 3 }).unwrap();
        assert_eq!(
            start,
            serde_json::json!({"type": "QUESTION_START", "questionNumber": 3})
        );

        let chunk = serde_json::to_value(SessionEvent::QuestionChunk {
            text: "Did you ".to_string(),
        })
        .unwrap();
        assert_eq!(chunk, serde_json::json!({"type": "QUESTION_CHUNK", "text": "Did you "}));

        let end = serde_json::to_value(SessionEvent::QuestionEnd {
            full_text: "Did you review the MRI?".to_string(),
            latency_ms: 420,
        })
        .unwrap();
        assert_eq!(
            end,
            serde_json::json!({
                "type": "QUESTION_END",
                "fullText": "Did you review the MRI?",
                "latencyMs": 420
            })
        );
    }

    #[test]
    fn test_events_round_trip_through_tag() {
        let event: SessionEvent =
            serde_json::from_str(r#"{"type": "QUESTION_CHUNK", "text": "sign"}"#).unwrap();
        assert_eq!(event, SessionEvent::QuestionChunk { text: "sign".to_string() });
    }
}

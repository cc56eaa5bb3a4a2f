//! Strict JSON contract parsing for chat model output.
//!
//! Models are told to answer with bare JSON but still wrap it in markdown
//! fences or preamble often enough to matter. Extraction is tolerant about
//! the wrapping; the contract itself is validated strictly and violations
//! are errors, never defaulted verdicts.

use regex::Regex;
use serde::de::DeserializeOwned;

/// Parse a typed contract out of raw model output.
pub fn parse_contract<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    let cleaned = strip_code_fences(raw);

    match serde_json::from_str(cleaned) {
        Ok(value) => Ok(value),
        Err(first_err) => {
            let block = extract_json_block(cleaned)
                .ok_or_else(|| format!("no JSON object found: {}", first_err))?;
            serde_json::from_str(block).map_err(|e| format!("contract violation: {}", e))
        }
    }
}

/// Strip a leading markdown code fence, with or without a `json` tag.
fn strip_code_fences(raw: &str) -> &str {
    let cleaned = raw.trim();
    if let Some(rest) = cleaned.strip_prefix("```") {
        let inner = match rest.find("```") {
            Some(end) => &rest[..end],
            None => rest,
        };
        let inner = inner.strip_prefix("json").unwrap_or(inner);
        return inner.trim();
    }
    cleaned
}

/// Last-ditch: the first `{` through the last `}`.
fn extract_json_block(cleaned: &str) -> Option<&str> {
    let pattern = Regex::new(r"(?s)\{.*\}").ok()?;
    pattern.find(cleaned).map(|m| m.as_str())
}

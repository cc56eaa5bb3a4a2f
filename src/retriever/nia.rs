//! Nia retrieval proxy client.
//!
//! Session transcripts and supporting documents are indexed behind the
//! proxy's `/search` endpoint; this client only queries, ingestion is
//! handled upstream.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{RetrievalError, StatementSearch};
use crate::model::StatementCandidate;

/// Client for the Nia search API.
pub struct NiaClient {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    index_id: &'a str,
    query: &'a str,
    top_k: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    filters: Option<&'a serde_json::Value>,
}

/// Some proxy deployments wrap results in an envelope, older ones return a
/// bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    Wrapped {
        results: Option<Vec<StatementCandidate>>,
    },
    Bare(Vec<StatementCandidate>),
}

impl SearchResponse {
    fn into_candidates(self) -> Vec<StatementCandidate> {
        match self {
            SearchResponse::Wrapped { results } => results.unwrap_or_default(),
            SearchResponse::Bare(results) => results,
        }
    }
}

impl NiaClient {
    pub fn new(client: Client, base_url: String, api_key: String, timeout: Duration) -> Self {
        Self {
            client,
            base_url,
            api_key,
            timeout,
        }
    }
}

#[async_trait]
impl StatementSearch for NiaClient {
    async fn search(
        &self,
        index_id: &str,
        query: &str,
        top_k: usize,
        filters: Option<serde_json::Value>,
    ) -> Result<Vec<StatementCandidate>, RetrievalError> {
        let started = Instant::now();
        let url = format!("{}/search", self.base_url);

        tracing::debug!(index_id = %index_id, top_k = top_k, "Searching statement index");

        let request = SearchRequest {
            index_id,
            query,
            top_k,
            filters: filters.as_ref(),
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
            return Err(RetrievalError::Status { status, body });
        }

        let payload: SearchResponse = response.json().await.map_err(|e| {
            RetrievalError::Malformed(format!("Failed to deserialize search results: {}", e))
        })?;

        let mut candidates = payload.into_candidates();
        candidates.truncate(top_k);

        tracing::debug!(
            index_id = %index_id,
            results = candidates.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Statement search completed"
        );

        Ok(candidates)
    }
}

//! Text embedding client
//!
//! Speaks the text-embeddings-inference `/embed` protocol:
//! `POST {"inputs": "<text>"}` returns `[[f32, ...]]`, one vector per input.

use flow_common::config::EnrichmentConfig;
use flow_sq::{EnrichmentError, Item};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Embedding service errors
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Embedding service returned no vectors")]
    EmptyResponse,
}

impl From<EmbedError> for EnrichmentError {
    fn from(err: EmbedError) -> Self {
        match err {
            EmbedError::NetworkError(msg) => EnrichmentError::Network(msg),
            EmbedError::ApiError(status, message) => EnrichmentError::Api { status, message },
            EmbedError::ParseError(msg) => EnrichmentError::Parse(msg),
            EmbedError::EmptyResponse => {
                EnrichmentError::Parse("embedding service returned no vectors".to_string())
            }
        }
    }
}

/// Text describing an item to the embedding model
///
/// A compact JSON object with title, authors, album, genres and mood so
/// that both catalog metadata and enriched attributes shape the vector.
pub fn embedding_text(item: &Item) -> String {
    json!({
        "title": item.title,
        "authors": item.author_names,
        "album": item.album,
        "genres": item.tags_or_empty(),
        "mood": item.mood,
    })
    .to_string()
}

/// Embedding service client
pub struct EmbeddingClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl EmbeddingClient {
    pub fn new(
        base_url: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, EmbedError> {
        let http_client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| EmbedError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &EnrichmentConfig) -> Result<Self, EmbedError> {
        Self::new(
            config.embedding_url.as_str(),
            &config.user_agent,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Embed a single text
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let url = format!("{}/embed", self.base_url);

        tracing::debug!(url = %url, chars = text.len(), "Requesting embedding");

        let response = self
            .http_client
            .post(&url)
            .json(&json!({ "inputs": text }))
            .send()
            .await
            .map_err(|e| EmbedError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EmbedError::ApiError(status.as_u16(), error_text));
        }

        let vectors: Vec<Vec<f32>> = response
            .json()
            .await
            .map_err(|e| EmbedError::ParseError(e.to_string()))?;

        vectors.into_iter().next().ok_or(EmbedError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_embedding_text_fields() {
        let mut item = Item::new("t1", "a1")
            .with_title("So What")
            .with_tags(["jazz", "modal jazz"])
            .with_mood(0.3, 0.6);
        item.author_names = vec!["Miles Davis".to_string()];
        item.album = Some("Kind of Blue".to_string());

        let value: Value = serde_json::from_str(&embedding_text(&item)).unwrap();
        assert_eq!(value["title"], "So What");
        assert_eq!(value["authors"][0], "Miles Davis");
        assert_eq!(value["album"], "Kind of Blue");
        assert_eq!(value["genres"][1], "modal jazz");
        assert_eq!(value["mood"]["energy"], 0.3);
    }

    #[test]
    fn test_embedding_text_without_enrichment() {
        let value: Value = serde_json::from_str(&embedding_text(&Item::new("t1", "a1"))).unwrap();
        assert_eq!(value["genres"], json!([]));
        assert!(value["mood"].is_null());
        assert!(value["album"].is_null());
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client =
            EmbeddingClient::new("http://localhost:8080/", "flow-test", Duration::from_secs(1))
                .unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
    }
}

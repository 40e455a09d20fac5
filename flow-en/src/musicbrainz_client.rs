//! MusicBrainz API client
//!
//! Resolves an ISRC to recordings and collects their community tags. The
//! recording ids are reused for AcousticBrainz lookups.
//!
//! MusicBrainz asks for at most one request per second and a descriptive
//! User-Agent; both come from `[enrichment]` configuration.

use crate::rate_limit::RequestSpacing;
use flow_common::config::EnrichmentConfig;
use flow_sq::EnrichmentError;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// MusicBrainz client errors
#[derive(Debug, Error)]
pub enum MBError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("No recording found for ISRC {0}")]
    RecordingNotFound(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<MBError> for EnrichmentError {
    fn from(err: MBError) -> Self {
        match err {
            MBError::NetworkError(msg) => EnrichmentError::Network(msg),
            MBError::RecordingNotFound(isrc) => EnrichmentError::NotFound(isrc),
            MBError::RateLimitExceeded => EnrichmentError::Api {
                status: 503,
                message: "MusicBrainz rate limit exceeded".to_string(),
            },
            MBError::ApiError(status, message) => EnrichmentError::Api { status, message },
            MBError::ParseError(msg) => EnrichmentError::Parse(msg),
        }
    }
}

/// Recording search response
#[derive(Debug, Clone, Deserialize)]
pub struct MBSearchResponse {
    #[serde(default)]
    pub recordings: Vec<MBRecording>,
}

/// Recording as returned by search
#[derive(Debug, Clone, Deserialize)]
pub struct MBRecording {
    /// Recording MBID
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: Vec<MBTag>,
}

/// Community tag on a recording
#[derive(Debug, Clone, Deserialize)]
pub struct MBTag {
    pub name: String,
    #[serde(default)]
    pub count: i64,
}

/// Tags and recording ids found for one ISRC
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IsrcLookup {
    /// Recording MBIDs in response order
    pub recording_ids: Vec<String>,
    /// Tag names across all recordings, first occurrence kept
    pub tags: Vec<String>,
}

impl IsrcLookup {
    pub fn from_response(response: MBSearchResponse) -> Self {
        let mut lookup = IsrcLookup::default();
        for recording in response.recordings {
            for tag in recording.tags {
                let name = tag.name.trim();
                if !name.is_empty() && !lookup.tags.iter().any(|t| t == name) {
                    lookup.tags.push(name.to_string());
                }
            }
            lookup.recording_ids.push(recording.id);
        }
        lookup
    }
}

/// MusicBrainz API client
pub struct MusicBrainzClient {
    http_client: reqwest::Client,
    base_url: String,
    rate_limiter: RequestSpacing,
}

impl MusicBrainzClient {
    pub fn new(
        base_url: impl Into<String>,
        user_agent: &str,
        spacing: Duration,
        timeout: Duration,
    ) -> Result<Self, MBError> {
        let http_client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| MBError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rate_limiter: RequestSpacing::new(spacing),
        })
    }

    pub fn from_config(config: &EnrichmentConfig) -> Result<Self, MBError> {
        Self::new(
            config.musicbrainz_url.as_str(),
            &config.user_agent,
            Duration::from_millis(config.musicbrainz_spacing_ms),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Search recordings by ISRC
    ///
    /// An ISRC without recordings is not an error; the lookup is empty.
    pub async fn lookup_isrc(&self, isrc: &str) -> Result<IsrcLookup, MBError> {
        self.rate_limiter.wait().await;

        let url = format!("{}/recording/", self.base_url);
        let query = format!("isrc:{}", isrc);

        tracing::debug!(isrc = %isrc, url = %url, "Querying MusicBrainz API");

        let response = self
            .http_client
            .get(&url)
            .query(&[("fmt", "json"), ("query", query.as_str())])
            .send()
            .await
            .map_err(|e| MBError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == 404 {
            return Err(MBError::RecordingNotFound(isrc.to_string()));
        }

        if status == 503 {
            return Err(MBError::RateLimitExceeded);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(MBError::ApiError(status.as_u16(), error_text));
        }

        let search: MBSearchResponse = response
            .json()
            .await
            .map_err(|e| MBError::ParseError(e.to_string()))?;

        let lookup = IsrcLookup::from_response(search);

        tracing::info!(
            isrc = %isrc,
            recordings = lookup.recording_ids.len(),
            tags = lookup.tags.len(),
            "Retrieved recordings from MusicBrainz"
        );

        Ok(lookup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = MusicBrainzClient::from_config(&EnrichmentConfig::default());
        assert!(client.is_ok());
        assert_eq!(client.unwrap().base_url, "https://musicbrainz.org/ws/2");
    }

    #[test]
    fn test_lookup_collects_tags_across_recordings() {
        let json = r#"{
            "created": "2024-01-01T00:00:00.000Z",
            "count": 2,
            "recordings": [
                {"id": "r1", "title": "Song", "tags": [
                    {"count": 3, "name": "rock"},
                    {"count": 1, "name": "indie rock"}
                ]},
                {"id": "r2", "title": "Song (live)", "tags": [
                    {"count": 2, "name": "rock"},
                    {"count": 1, "name": " live "}
                ]},
                {"id": "r3", "title": "Song (demo)"}
            ]
        }"#;

        let response: MBSearchResponse = serde_json::from_str(json).unwrap();
        let lookup = IsrcLookup::from_response(response);

        assert_eq!(lookup.recording_ids, vec!["r1", "r2", "r3"]);
        assert_eq!(lookup.tags, vec!["rock", "indie rock", "live"]);
    }

    #[test]
    fn test_empty_search_response() {
        let response: MBSearchResponse = serde_json::from_str(r#"{"count": 0}"#).unwrap();
        assert_eq!(IsrcLookup::from_response(response), IsrcLookup::default());
    }

    #[test]
    fn test_error_conversion() {
        assert_eq!(
            EnrichmentError::from(MBError::RecordingNotFound("GBAYE0000001".to_string())),
            EnrichmentError::NotFound("GBAYE0000001".to_string())
        );
        assert!(matches!(
            EnrichmentError::from(MBError::RateLimitExceeded),
            EnrichmentError::Api { status: 503, .. }
        ));
    }
}

//! AcousticBrainz API client
//!
//! Reads the high-level classifier output for a recording and reduces the
//! mood classifiers to a point on the energy/valence plane:
//!
//! - valence: mean of `mood_happy.happy` and `mood_sad.not_sad`
//! - energy: mean of `mood_aggressive.aggressive`, `mood_party.party` and
//!   `mood_relaxed.not_relaxed`
//!
//! Each mean uses whichever classifiers are present.
//!
//! Note: AcousticBrainz stopped accepting submissions in 2022, so only
//! recordings analysed before then have data.

use crate::rate_limit::RequestSpacing;
use flow_common::config::EnrichmentConfig;
use flow_sq::{EnrichmentError, MoodCoordinates};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// AcousticBrainz client errors
#[derive(Debug, Error)]
pub enum ABError {
    /// Network communication error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Recording not found in AcousticBrainz database
    #[error("Recording not found in AcousticBrainz: {0}")]
    RecordingNotFound(String),

    /// Recording analysed, but without the mood classifiers
    #[error("No mood classifiers for recording {0}")]
    MissingMood(String),

    /// AcousticBrainz API returned error response
    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    /// Failed to parse API response JSON
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<ABError> for EnrichmentError {
    fn from(err: ABError) -> Self {
        match err {
            ABError::NetworkError(msg) => EnrichmentError::Network(msg),
            ABError::RecordingNotFound(mbid) | ABError::MissingMood(mbid) => {
                EnrichmentError::NotFound(mbid)
            }
            ABError::ApiError(status, message) => EnrichmentError::Api { status, message },
            ABError::ParseError(msg) => EnrichmentError::Parse(msg),
        }
    }
}

/// High-level response; only the classifier map is read
#[derive(Debug, Clone, Deserialize)]
pub struct ABHighLevel {
    #[serde(default)]
    pub highlevel: HashMap<String, ABClassifier>,
}

/// One classifier's output
#[derive(Debug, Clone, Deserialize)]
pub struct ABClassifier {
    /// Probability per class label
    #[serde(default)]
    pub all: HashMap<String, f64>,
    pub probability: Option<f64>,
    pub value: Option<String>,
}

const VALENCE_CLASSES: [(&str, &str); 2] = [("mood_happy", "happy"), ("mood_sad", "not_sad")];

const ENERGY_CLASSES: [(&str, &str); 3] = [
    ("mood_aggressive", "aggressive"),
    ("mood_party", "party"),
    ("mood_relaxed", "not_relaxed"),
];

impl ABHighLevel {
    fn probability(&self, classifier: &str, class: &str) -> Option<f64> {
        self.highlevel
            .get(classifier)
            .and_then(|c| c.all.get(class))
            .copied()
            .filter(|p| p.is_finite())
    }

    fn mean(&self, classes: &[(&str, &str)]) -> Option<f64> {
        let values: Vec<f64> = classes
            .iter()
            .filter_map(|(classifier, class)| self.probability(classifier, class))
            .collect();
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Energy/valence point, or `None` when either axis has no classifier
    pub fn mood(&self) -> Option<MoodCoordinates> {
        Some(MoodCoordinates::new(
            self.mean(&ENERGY_CLASSES)?,
            self.mean(&VALENCE_CLASSES)?,
        ))
    }
}

/// AcousticBrainz API client
pub struct AcousticBrainzClient {
    http_client: reqwest::Client,
    base_url: String,
    rate_limiter: RequestSpacing,
}

impl AcousticBrainzClient {
    pub fn new(
        base_url: impl Into<String>,
        user_agent: &str,
        spacing: Duration,
        timeout: Duration,
    ) -> Result<Self, ABError> {
        let http_client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| ABError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rate_limiter: RequestSpacing::new(spacing),
        })
    }

    pub fn from_config(config: &EnrichmentConfig) -> Result<Self, ABError> {
        Self::new(
            config.acousticbrainz_url.as_str(),
            &config.user_agent,
            Duration::from_millis(config.acousticbrainz_spacing_ms),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Fetch high-level data for a recording MBID
    pub async fn lookup_highlevel(&self, recording_mbid: &str) -> Result<ABHighLevel, ABError> {
        self.rate_limiter.wait().await;

        let url = format!("{}/{}/high-level", self.base_url, recording_mbid);

        tracing::debug!(mbid = %recording_mbid, url = %url, "Querying AcousticBrainz API");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| ABError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == 404 {
            return Err(ABError::RecordingNotFound(recording_mbid.to_string()));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ABError::ApiError(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ABError::ParseError(e.to_string()))
    }

    /// Mood coordinates for a recording MBID
    pub async fn lookup_mood(&self, recording_mbid: &str) -> Result<MoodCoordinates, ABError> {
        let highlevel = self.lookup_highlevel(recording_mbid).await?;
        let mood = highlevel
            .mood()
            .ok_or_else(|| ABError::MissingMood(recording_mbid.to_string()))?;

        tracing::info!(
            mbid = %recording_mbid,
            energy = mood.energy,
            valence = mood.valence,
            "AcousticBrainz lookup successful"
        );

        Ok(mood)
    }
}

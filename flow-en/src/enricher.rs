//! Catalog-backed item enricher
//!
//! Tags come from MusicBrainz (by ISRC) merged with any catalog tags the
//! item already carries. Mood comes from AcousticBrainz via the recording
//! ids found for the ISRC. Embeddings come from the embedding service.
//!
//! Mood and embedding are left alone when already present. ISRC lookups are
//! cached so the tag and mood steps share one MusicBrainz request.

use crate::acousticbrainz_client::{ABError, AcousticBrainzClient};
use crate::embedding_client::{embedding_text, EmbeddingClient};
use crate::musicbrainz_client::{IsrcLookup, MusicBrainzClient};
use async_trait::async_trait;
use flow_common::config::EnrichmentConfig;
use flow_sq::{EnrichmentError, Item, ItemEnricher};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// [`ItemEnricher`] over MusicBrainz, AcousticBrainz and an embedding service
pub struct CatalogEnricher {
    musicbrainz: MusicBrainzClient,
    acousticbrainz: AcousticBrainzClient,
    embedding: EmbeddingClient,
    lookups: Mutex<HashMap<String, IsrcLookup>>,
}

impl CatalogEnricher {
    pub fn new(
        musicbrainz: MusicBrainzClient,
        acousticbrainz: AcousticBrainzClient,
        embedding: EmbeddingClient,
    ) -> Self {
        Self {
            musicbrainz,
            acousticbrainz,
            embedding,
            lookups: Mutex::new(HashMap::new()),
        }
    }

    /// Build all three clients from `[enrichment]` configuration
    pub fn from_config(config: &EnrichmentConfig) -> Result<Self, EnrichmentError> {
        let enricher = Self::new(
            MusicBrainzClient::from_config(config)?,
            AcousticBrainzClient::from_config(config)?,
            EmbeddingClient::from_config(config)?,
        );

        info!(
            musicbrainz = %config.musicbrainz_url,
            acousticbrainz = %config.acousticbrainz_url,
            embedding = %config.embedding_url,
            "Catalog enricher ready"
        );

        Ok(enricher)
    }

    /// MusicBrainz lookup for `isrc`, cached per enricher
    async fn lookup(&self, isrc: &str) -> Result<IsrcLookup, EnrichmentError> {
        if let Some(cached) = self.lookups.lock().await.get(isrc) {
            return Ok(cached.clone());
        }

        let lookup = self.musicbrainz.lookup_isrc(isrc).await?;
        self.lookups
            .lock()
            .await
            .insert(isrc.to_string(), lookup.clone());
        Ok(lookup)
    }
}

fn require_isrc(item: &Item) -> Result<&str, EnrichmentError> {
    item.isrc
        .as_deref()
        .map(str::trim)
        .filter(|isrc| !isrc.is_empty())
        .ok_or_else(|| EnrichmentError::MissingInput(format!("item {} has no ISRC", item.id)))
}

#[async_trait]
impl ItemEnricher for CatalogEnricher {
    async fn enrich_tags(&self, item: &mut Item) -> Result<(), EnrichmentError> {
        let isrc = match (require_isrc(item), &item.tags) {
            (Ok(isrc), _) => isrc.to_string(),
            // Catalog tags without an ISRC are kept as they are
            (Err(_), Some(_)) => return Ok(()),
            (Err(e), None) => return Err(e),
        };

        let lookup = self.lookup(&isrc).await?;

        let tags = item.tags.get_or_insert_with(Vec::new);
        let before = tags.len();
        for tag in lookup.tags {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        debug!(
            item_id = %item.id,
            catalog = before,
            merged = tags.len(),
            "Tags enriched"
        );
        Ok(())
    }

    async fn enrich_mood(&self, item: &mut Item) -> Result<(), EnrichmentError> {
        if item.mood.is_some() {
            return Ok(());
        }

        let isrc = require_isrc(item)?.to_string();
        let lookup = self.lookup(&isrc).await?;

        let mut last_err = ABError::RecordingNotFound(isrc);
        for mbid in &lookup.recording_ids {
            match self.acousticbrainz.lookup_mood(mbid).await {
                Ok(mood) => {
                    debug!(item_id = %item.id, mbid = %mbid, "Mood enriched");
                    item.mood = Some(mood);
                    return Ok(());
                }
                Err(e @ (ABError::RecordingNotFound(_) | ABError::MissingMood(_))) => {
                    last_err = e;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(last_err.into())
    }

    async fn enrich_embedding(&self, item: &mut Item) -> Result<(), EnrichmentError> {
        if item.embedding.is_some() {
            return Ok(());
        }

        let vector = self.embedding.embed(&embedding_text(item)).await?;
        debug!(item_id = %item.id, dimensions = vector.len(), "Embedding enriched");
        item.embedding = Some(vector);
        Ok(())
    }
}

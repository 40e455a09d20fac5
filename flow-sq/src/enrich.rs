//! Enrichment collaborator interface
//!
//! The engine never talks to remote services itself. The caller constructs
//! an [`ItemEnricher`] once (HTTP clients, rate limiters, model endpoints)
//! and passes it to [`crate::Sequencer::enrich_item`] or drives the
//! individual [`EnrichmentStep`]s directly.

use crate::error::EnrichmentError;
use crate::item::Item;
use async_trait::async_trait;

/// Populates item attributes from external sources
///
/// Each method fills one attribute in place. Implementations may skip
/// attributes that are already populated.
#[async_trait]
pub trait ItemEnricher: Send + Sync {
    /// Populate `item.tags`
    async fn enrich_tags(&self, item: &mut Item) -> Result<(), EnrichmentError>;

    /// Populate `item.mood`
    async fn enrich_mood(&self, item: &mut Item) -> Result<(), EnrichmentError>;

    /// Populate `item.embedding`
    async fn enrich_embedding(&self, item: &mut Item) -> Result<(), EnrichmentError>;
}

/// One attribute-populating sub-step
///
/// Steps for a single item are sequential dependencies: the embedding text
/// includes tags and mood, so those run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentStep {
    Tags,
    Mood,
    Embedding,
}

impl EnrichmentStep {
    pub fn name(self) -> &'static str {
        match self {
            EnrichmentStep::Tags => "tags",
            EnrichmentStep::Mood => "mood",
            EnrichmentStep::Embedding => "embedding",
        }
    }

    /// Run this step against `item`
    pub async fn run(
        self,
        enricher: &dyn ItemEnricher,
        item: &mut Item,
    ) -> Result<(), EnrichmentError> {
        match self {
            EnrichmentStep::Tags => enricher.enrich_tags(item).await,
            EnrichmentStep::Mood => enricher.enrich_mood(item).await,
            EnrichmentStep::Embedding => enricher.enrich_embedding(item).await,
        }
    }

    /// Mark the attribute as retrieved-but-empty after a tolerated failure
    ///
    /// Mood has no empty value and stays absent; the mood sequencer treats
    /// it as `(0, 0)`.
    pub fn mark_empty(self, item: &mut Item) {
        match self {
            EnrichmentStep::Tags => {
                item.tags.get_or_insert_with(Vec::new);
            }
            EnrichmentStep::Mood => {}
            EnrichmentStep::Embedding => {
                item.embedding.get_or_insert_with(Vec::new);
            }
        }
    }
}

//! Strategy selection and the caller-facing sequencing entry point
//!
//! Strategies form a closed set. [`Sequencer`] is the tagged variant over
//! them and exposes the three operations a caller needs: `enrich_item`,
//! `describe` and `sequence`.

use crate::enrich::{EnrichmentStep, ItemEnricher};
use crate::error::{EnrichmentError, SequenceError};
use crate::greedy::GreedyInsertionSequencer;
use crate::item::Item;
use crate::mood::{MoodBandConfig, MoodBandSequencer};
use crate::permutation::Permutation;
use crate::similarity::{EmbeddingCosine, TagOverlap};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Known sequencing strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    TagOverlap,
    Embedding,
    Mood,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::TagOverlap,
        StrategyKind::Embedding,
        StrategyKind::Mood,
    ];

    /// Canonical configuration key
    pub fn key(self) -> &'static str {
        match self {
            StrategyKind::TagOverlap => "tag-overlap",
            StrategyKind::Embedding => "embedding",
            StrategyKind::Mood => "mood",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for StrategyKind {
    type Err = SequenceError;

    /// Parse a strategy key
    ///
    /// Matching is case-insensitive. `genre` and `ai` are accepted as
    /// aliases for `tag-overlap` and `embedding`.
    fn from_str(key: &str) -> Result<Self, Self::Err> {
        match key.trim().to_ascii_lowercase().as_str() {
            "tag-overlap" | "genre" => Ok(StrategyKind::TagOverlap),
            "embedding" | "ai" => Ok(StrategyKind::Embedding),
            "mood" => Ok(StrategyKind::Mood),
            _ => Err(SequenceError::InvalidStrategy(key.to_string())),
        }
    }
}

/// A configured sequencing strategy
#[derive(Debug, Clone)]
pub enum Sequencer {
    TagOverlap(GreedyInsertionSequencer<TagOverlap>),
    Embedding(GreedyInsertionSequencer<EmbeddingCosine>),
    Mood(MoodBandSequencer),
}

impl Sequencer {
    /// Build the sequencer for `kind`; `mood` is only used by the mood strategy
    pub fn new(kind: StrategyKind, mood: MoodBandConfig) -> Result<Self, SequenceError> {
        Ok(match kind {
            StrategyKind::TagOverlap => Sequencer::TagOverlap(GreedyInsertionSequencer::new(TagOverlap)),
            StrategyKind::Embedding => {
                Sequencer::Embedding(GreedyInsertionSequencer::new(EmbeddingCosine))
            }
            StrategyKind::Mood => Sequencer::Mood(MoodBandSequencer::new(mood)?),
        })
    }

    /// Build the sequencer named by a configuration key
    ///
    /// # Errors
    /// `InvalidStrategy` for keys outside the known set; there is no
    /// default strategy.
    pub fn from_key(key: &str, mood: MoodBandConfig) -> Result<Self, SequenceError> {
        Self::new(key.parse()?, mood)
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Sequencer::TagOverlap(_) => StrategyKind::TagOverlap,
            Sequencer::Embedding(_) => StrategyKind::Embedding,
            Sequencer::Mood(_) => StrategyKind::Mood,
        }
    }

    /// Attributes this strategy needs, in dependency order
    pub fn enrichment_steps(&self) -> &'static [EnrichmentStep] {
        match self {
            Sequencer::TagOverlap(_) => &[EnrichmentStep::Tags],
            Sequencer::Embedding(_) => &[
                EnrichmentStep::Tags,
                EnrichmentStep::Mood,
                EnrichmentStep::Embedding,
            ],
            Sequencer::Mood(_) => &[EnrichmentStep::Mood],
        }
    }

    /// Populate every attribute this strategy compares, stopping at the
    /// first failure
    pub async fn enrich_item(
        &self,
        enricher: &dyn ItemEnricher,
        item: &mut Item,
    ) -> Result<(), EnrichmentError> {
        for step in self.enrichment_steps() {
            step.run(enricher, item).await?;
        }
        Ok(())
    }

    /// Progress text reflecting the attributes currently available
    pub fn describe(&self, item: &Item) -> String {
        match self {
            Sequencer::TagOverlap(_) => match &item.tags {
                None => "Retrieving genres...".to_string(),
                Some(tags) if tags.is_empty() => "No genres found.".to_string(),
                Some(tags) => format!("Genres: {}", tags.join(", ")),
            },
            Sequencer::Mood(_) => match &item.mood {
                None => "Retrieving audio features...".to_string(),
                Some(mood) => format!("Energy: {}, Valence: {}", mood.energy, mood.valence),
            },
            Sequencer::Embedding(_) => match (&item.tags, &item.mood) {
                (Some(tags), Some(mood)) => {
                    let genres: Vec<&str> = tags.iter().take(3).map(String::as_str).collect();
                    format!(
                        "Energy: {}, Valence: {}, Genres: {}",
                        mood.energy,
                        mood.valence,
                        genres.join(", ")
                    )
                }
                _ => "Retrieving data...".to_string(),
            },
        }
    }

    /// Progress text once enrichment of `item` has finished
    ///
    /// Attributes still missing at this point were not found, so they are
    /// reported as such instead of as pending.
    pub fn describe_enriched(&self, item: &Item) -> String {
        match self {
            Sequencer::TagOverlap(_) if item.tags.is_none() => "No genres found.".to_string(),
            Sequencer::Mood(_) | Sequencer::Embedding(_) if item.mood.is_none() => {
                "No audio features found.".to_string()
            }
            Sequencer::Embedding(_) if item.tags.is_none() => {
                let mood = item.mood_or_default();
                format!("Energy: {}, Valence: {}, Genres: ", mood.energy, mood.valence)
            }
            _ => self.describe(item),
        }
    }

    /// Ordering of `items` as input indices
    pub fn permutation(
        &self,
        items: &[Item],
        separate_authors: bool,
    ) -> Result<Permutation, SequenceError> {
        match self {
            Sequencer::TagOverlap(greedy) => greedy.sequence(items, separate_authors),
            Sequencer::Embedding(greedy) => greedy.sequence(items, separate_authors),
            Sequencer::Mood(mood) => Ok(mood.sequence(items, separate_authors)),
        }
    }

    /// Reorder `items`; the result is a permutation of the input
    pub fn sequence(
        &self,
        items: Vec<Item>,
        separate_authors: bool,
    ) -> Result<Vec<Item>, SequenceError> {
        let permutation = self.permutation(&items, separate_authors)?;
        info!(
            strategy = %self.kind(),
            items = items.len(),
            separate_authors,
            "Sequenced collection"
        );
        Ok(permutation.apply(items))
    }
}

/// Options for [`sequence`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceOptions {
    /// Strategy key ("tag-overlap", "embedding" or "mood")
    pub strategy: String,
    /// Keep items by the same primary author apart
    #[serde(default)]
    pub separate_authors: bool,
    /// Mood banding parameters
    #[serde(default)]
    pub mood: MoodBandConfig,
}

impl SequenceOptions {
    pub fn new(strategy: impl Into<String>) -> Self {
        Self {
            strategy: strategy.into(),
            separate_authors: false,
            mood: MoodBandConfig::default(),
        }
    }

    pub fn separate_authors(mut self, separate: bool) -> Self {
        self.separate_authors = separate;
        self
    }
}

/// Reorder `items` with the strategy named in `options`
///
/// # Errors
/// - `InvalidStrategy` for an unknown strategy key
/// - `InsufficientData` when a greedy strategy receives fewer than two items
pub fn sequence(items: Vec<Item>, options: &SequenceOptions) -> Result<Vec<Item>, SequenceError> {
    Sequencer::from_key(&options.strategy, options.mood)?.sequence(items, options.separate_authors)
}

//! Catalog enrichment for flow
//!
//! Implements [`flow_sq::ItemEnricher`] over three remote services:
//! - MusicBrainz ISRC search for tags and recording ids
//! - AcousticBrainz high-level data for mood coordinates
//! - A text-embeddings-inference compatible endpoint for embeddings
//!
//! [`enrich_collection`] drives a [`flow_sq::Sequencer`]'s enrichment steps
//! across a whole collection with progress reporting and a failure policy.

pub mod acousticbrainz_client;
pub mod embedding_client;
pub mod enricher;
pub mod musicbrainz_client;
pub mod pipeline;
mod rate_limit;

pub use acousticbrainz_client::{ABError, AcousticBrainzClient};
pub use embedding_client::{embedding_text, EmbedError, EmbeddingClient};
pub use enricher::CatalogEnricher;
pub use musicbrainz_client::{IsrcLookup, MBError, MusicBrainzClient};
pub use pipeline::{enrich_collection, EnrichmentSummary, StepFailure};

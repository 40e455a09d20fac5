//! # Flow Sequencing Engine
//!
//! Reorders a collection of tracks so that neighbours are coherent under a
//! pluggable similarity measure, optionally keeping tracks by the same
//! primary author apart.
//!
//! Three strategies are available (see [`strategy::StrategyKind`]):
//! - **tag-overlap**: greedy insertion scored by shared genre tokens
//! - **embedding**: greedy insertion scored by embedding cosine similarity
//! - **mood**: valence banding with an energy zig-zag inside each band
//!
//! Data flow: the caller assembles [`Item`]s, runs enrichment through an
//! [`ItemEnricher`] until every attribute the strategy needs is populated,
//! then calls [`sequence`] (or [`Sequencer::sequence`]) and renders the
//! returned permutation.
//!
//! ```rust,ignore
//! use flow_sq::{sequence, Item, SequenceOptions};
//!
//! let items = vec![
//!     Item::new("t1", "artist-a").with_tags(["jazz fusion"]),
//!     Item::new("t2", "artist-b").with_tags(["jazz"]),
//!     Item::new("t3", "artist-c").with_tags(["metal"]),
//! ];
//! let ordered = sequence(items, &SequenceOptions::new("tag-overlap"))?;
//! ```
//!
//! Sequencing is synchronous and pure; enrichment is the only async
//! boundary and must complete before sequencing starts.

pub mod enrich;
pub mod error;
pub mod greedy;
pub mod item;
pub mod mood;
pub mod permutation;
pub mod similarity;
pub mod strategy;

pub use enrich::{EnrichmentStep, ItemEnricher};
pub use error::{EnrichmentError, SequenceError};
pub use greedy::GreedyInsertionSequencer;
pub use item::{expand_tags, Item, MoodCoordinates};
pub use mood::{MoodBandConfig, MoodBandSequencer};
pub use permutation::Permutation;
pub use similarity::{cosine_similarity, EmbeddingCosine, SimilarityMetric, TagOverlap};
pub use strategy::{sequence, SequenceOptions, Sequencer, StrategyKind};

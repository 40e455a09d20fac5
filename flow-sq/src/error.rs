//! Error types for sequencing and enrichment

use thiserror::Error;

/// Errors surfaced by the sequencing engine
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SequenceError {
    /// Strategy key is not one of the known strategies
    #[error("Unknown sequencing strategy '{0}' (expected one of: tag-overlap, embedding, mood)")]
    InvalidStrategy(String),

    /// Not enough items for the selected strategy
    #[error("Strategy '{strategy}' needs at least {required} items, got {actual}")]
    InsufficientData {
        strategy: &'static str,
        required: usize,
        actual: usize,
    },

    /// Sequencer parameters out of range
    #[error("Invalid sequencer configuration: {0}")]
    InvalidConfig(String),
}

/// Errors reported by an enrichment collaborator
///
/// The caller decides whether a failed item is sequenced with empty
/// attributes or aborts the run.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EnrichmentError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Remote service has no data for the item
    #[error("Not found: {0}")]
    NotFound(String),

    /// Remote service returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Item lacks the identifier needed for the lookup (e.g. ISRC)
    #[error("Missing input: {0}")]
    MissingInput(String),
}

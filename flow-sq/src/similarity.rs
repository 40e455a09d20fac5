//! Pairwise similarity metrics for greedy insertion
//!
//! A metric first derives a per-item profile (expanded tag set, embedding
//! vector) once per sequencing call, then scores profile pairs. Higher
//! scores mean more similar.

use crate::item::Item;
use std::collections::HashSet;

/// Similarity measure plugged into [`crate::GreedyInsertionSequencer`]
pub trait SimilarityMetric {
    /// Per-item comparison data derived once per sequencing call
    type Profile;

    /// Metric name used in logs and errors
    fn name(&self) -> &'static str;

    /// Derive the comparison profile for an item
    fn profile(&self, item: &Item) -> Self::Profile;

    /// Similarity between two profiles
    fn similarity(&self, a: &Self::Profile, b: &Self::Profile) -> f64;

    /// Whether an item may take part in the seed search
    fn seed_eligible(&self, _profile: &Self::Profile) -> bool {
        true
    }
}

/// Count of shared tokens between expanded tag sets
///
/// Items without tags are left out of the seed search so that untagged
/// items do not all tie at zero shared tags; they are still inserted.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagOverlap;

impl SimilarityMetric for TagOverlap {
    type Profile = HashSet<String>;

    fn name(&self) -> &'static str {
        "tag-overlap"
    }

    fn profile(&self, item: &Item) -> Self::Profile {
        item.expanded_tags().into_iter().collect()
    }

    fn similarity(&self, a: &Self::Profile, b: &Self::Profile) -> f64 {
        shared_token_count(a, b) as f64
    }

    fn seed_eligible(&self, profile: &Self::Profile) -> bool {
        !profile.is_empty()
    }
}

/// Number of tokens present in both sets
pub fn shared_token_count(a: &HashSet<String>, b: &HashSet<String>) -> usize {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small.iter().filter(|token| large.contains(*token)).count()
}

/// Cosine similarity between embedding vectors
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddingCosine;

impl SimilarityMetric for EmbeddingCosine {
    type Profile = Vec<f32>;

    fn name(&self) -> &'static str {
        "embedding"
    }

    fn profile(&self, item: &Item) -> Self::Profile {
        item.embedding_or_empty().to_vec()
    }

    fn similarity(&self, a: &Self::Profile, b: &Self::Profile) -> f64 {
        cosine_similarity(a, b)
    }
}

/// Cosine similarity over the overlapping prefix of two vectors
///
/// Vectors of different lengths are compared over `min(len_a, len_b)`
/// components. A zero magnitude (including an empty prefix) yields `0.0`
/// instead of `NaN`; the result is clamped to `[-1, 1]`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let len = a.len().min(b.len());
    let (a, b) = (&a[..len], &b[..len]);

    let dot: f64 = a.iter().zip(b).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum();
    let norm_a = a.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();

    if norm_a > 0.0 && norm_b > 0.0 {
        let similarity = dot / (norm_a * norm_b);
        if similarity.is_nan() {
            0.0
        } else {
            similarity.clamp(-1.0, 1.0)
        }
    } else {
        0.0
    }
}

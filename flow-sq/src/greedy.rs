//! Greedy nearest-fit insertion sequencer
//!
//! Builds an ordering outward from the least similar items:
//!
//! 1. **Seed**: find the minimum pairwise similarity `m` among seed-eligible
//!    items. The first pair reaching `m` starts the ordering; every other
//!    eligible item whose similarity to *all* current seeds equals `m` is
//!    appended (exact ties between three or more items).
//! 2. **Grow**: repeatedly take the least similar adjacent pair `(L, R)` and
//!    insert between them the pool item with the highest mean similarity to
//!    `L` and `R`.
//!
//! With author separation on, a candidate sharing a primary author with `L`
//! or `R` is skipped. When that leaves no candidate, the scan is repeated
//! without the constraint, then falls back to the first pool item. Author
//! separation is a preference, never an error.
//!
//! # Scaling
//! Each growth step scans every adjacent pair and every pool item, so a
//! step costs `O(n^2)` similarity evaluations in the worst case and a full
//! run `O(n^3)`. Suitable for playlists of hundreds of items, not millions.
//! See `benches/sequence_bench.rs`.
//!
//! Items live in a fixed arena; the ordering and the pool are index lists,
//! disjoint at every step, whose union is the input.

use crate::error::SequenceError;
use crate::item::Item;
use crate::permutation::Permutation;
use crate::similarity::SimilarityMetric;
use tracing::{debug, trace};

/// Minimum collection size for a seed pair
pub const MIN_ITEMS: usize = 2;

/// Greedy insertion over a pluggable similarity metric
#[derive(Debug, Clone, Default)]
pub struct GreedyInsertionSequencer<M> {
    metric: M,
}

impl<M: SimilarityMetric> GreedyInsertionSequencer<M> {
    pub fn new(metric: M) -> Self {
        Self { metric }
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// Compute the ordering of `items`
    ///
    /// # Errors
    /// `InsufficientData` when fewer than two items are supplied.
    pub fn sequence(
        &self,
        items: &[Item],
        separate_authors: bool,
    ) -> Result<Permutation, SequenceError> {
        if items.len() < MIN_ITEMS {
            return Err(SequenceError::InsufficientData {
                strategy: self.metric.name(),
                required: MIN_ITEMS,
                actual: items.len(),
            });
        }

        let arena = Arena::new(&self.metric, items);

        let mut ordering = arena.seed_set();
        let mut pool: Vec<usize> = (0..items.len())
            .filter(|index| !ordering.contains(index))
            .collect();

        debug!(
            metric = self.metric.name(),
            items = items.len(),
            seeds = ordering.len(),
            separate_authors,
            "Seed set selected"
        );

        while !pool.is_empty() {
            let left_pos = arena.least_similar_adjacent(&ordering);
            let (left, right) = (ordering[left_pos], ordering[left_pos + 1]);

            let pick = arena.select_candidate(left, right, &pool, separate_authors);
            let chosen = pool.remove(pick);
            ordering.insert(left_pos + 1, chosen);

            trace!(
                left = %items[left].id,
                right = %items[right].id,
                inserted = %items[chosen].id,
                remaining = pool.len(),
                "Inserted item"
            );
        }

        Ok(Permutation::from_indices(ordering))
    }
}

/// Fixed backing store of item profiles for one sequencing call
struct Arena<'a, M: SimilarityMetric> {
    metric: &'a M,
    profiles: Vec<M::Profile>,
    authors: Vec<&'a str>,
}

impl<'a, M: SimilarityMetric> Arena<'a, M> {
    fn new(metric: &'a M, items: &'a [Item]) -> Self {
        Self {
            metric,
            profiles: items.iter().map(|item| metric.profile(item)).collect(),
            authors: items.iter().map(|item| item.primary_author_id.as_str()).collect(),
        }
    }

    fn sim(&self, a: usize, b: usize) -> f64 {
        self.metric.similarity(&self.profiles[a], &self.profiles[b])
    }

    fn shares_author(&self, candidate: usize, left: usize, right: usize) -> bool {
        self.authors[candidate] == self.authors[left] || self.authors[candidate] == self.authors[right]
    }

    /// Initial ordering: least similar pair plus items tying with all seeds
    ///
    /// When fewer than two items are seed-eligible there is no pair to
    /// compare, so every item joins the seed set in input order.
    fn seed_set(&self) -> Vec<usize> {
        let eligible: Vec<usize> = (0..self.profiles.len())
            .filter(|&i| self.metric.seed_eligible(&self.profiles[i]))
            .collect();

        let mut best: Option<(usize, usize, f64)> = None;
        for (pos, &a) in eligible.iter().enumerate() {
            for &b in &eligible[pos + 1..] {
                let similarity = self.sim(a, b);
                if best.map_or(true, |(_, _, min)| similarity < min) {
                    best = Some((a, b, similarity));
                }
            }
        }

        let Some((a, b, min)) = best else {
            debug!(
                eligible = eligible.len(),
                "Too few seed-eligible items, keeping input order"
            );
            return (0..self.profiles.len()).collect();
        };

        let mut seeds = vec![a, b];
        for &candidate in &eligible {
            if seeds.contains(&candidate) {
                continue;
            }
            if seeds.iter().all(|&seed| self.sim(candidate, seed) == min) {
                seeds.push(candidate);
            }
        }

        seeds
    }

    /// Position in `ordering` of the left item of the least similar
    /// adjacent pair; the first occurrence wins ties
    fn least_similar_adjacent(&self, ordering: &[usize]) -> usize {
        let mut best_pos = 0;
        let mut best_sim = f64::INFINITY;

        for (pos, pair) in ordering.windows(2).enumerate() {
            let similarity = self.sim(pair[0], pair[1]);
            if similarity < best_sim {
                best_sim = similarity;
                best_pos = pos;
            }
        }

        best_pos
    }

    /// Pool position of the best candidate for the gap `(left, right)`
    ///
    /// Two passes: with author separation (when enabled), then without.
    /// Falls back to position 0 if neither pass finds a candidate.
    fn select_candidate(
        &self,
        left: usize,
        right: usize,
        pool: &[usize],
        separate_authors: bool,
    ) -> usize {
        if separate_authors {
            if let Some(pos) = self.best_candidate(left, right, pool, true) {
                return pos;
            }
            debug!("No candidate avoids neighbouring authors, relaxing author separation");
        }

        self.best_candidate(left, right, pool, false).unwrap_or(0)
    }

    /// Highest mean similarity to both neighbours; earlier pool position
    /// wins ties
    fn best_candidate(
        &self,
        left: usize,
        right: usize,
        pool: &[usize],
        separate_authors: bool,
    ) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;

        for (pos, &candidate) in pool.iter().enumerate() {
            if separate_authors && self.shares_author(candidate, left, right) {
                continue;
            }

            let average = (self.sim(left, candidate) + self.sim(right, candidate)) / 2.0;
            if best.map_or(true, |(_, best_avg)| average > best_avg) {
                best = Some((pos, average));
            }
        }

        best.map(|(pos, _)| pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::{EmbeddingCosine, TagOverlap};

    fn tagged(id: &str, author: &str, tags: &[&str]) -> Item {
        Item::new(id, author).with_tags(tags.iter().copied())
    }

    fn ids(items: &[Item], permutation: &Permutation) -> Vec<String> {
        permutation.indices().iter().map(|&i| items[i].id.clone()).collect()
    }

    #[test]
    fn test_rejects_fewer_than_two_items() {
        let sequencer = GreedyInsertionSequencer::new(TagOverlap);
        let result = sequencer.sequence(&[tagged("t1", "a", &["rock"])], false);
        assert_eq!(
            result,
            Err(SequenceError::InsufficientData {
                strategy: "tag-overlap",
                required: 2,
                actual: 1
            })
        );
        assert!(sequencer.sequence(&[], false).is_err());
    }

    #[test]
    fn test_two_items_keep_input_order() {
        let items = vec![tagged("t1", "a", &["rock"]), tagged("t2", "b", &["jazz"])];
        let permutation = GreedyInsertionSequencer::new(TagOverlap).sequence(&items, false).unwrap();
        assert_eq!(permutation.indices(), &[0, 1]);
    }

    #[test]
    fn test_seed_pair_is_least_similar_pair() {
        // t1/t3 share nothing; every other pair shares "rock"
        let items = vec![
            tagged("t1", "a", &["rock", "blues"]),
            tagged("t2", "b", &["rock", "metal", "blues"]),
            tagged("t3", "c", &["rock metal"]),
        ];
        let arena = Arena::new(&TagOverlap, &items);
        // t1-t2: rock, blues = 2; t1-t3: rock = 1; t2-t3: rock, metal = 2
        assert_eq!(arena.seed_set(), vec![0, 2]);
    }

    #[test]
    fn test_three_way_zero_tie_seeds_all_in_input_order() {
        let items = vec![
            tagged("t1", "a", &["jazz"]),
            tagged("t2", "b", &["metal"]),
            tagged("t3", "c", &["ambient"]),
        ];
        let arena = Arena::new(&TagOverlap, &items);
        assert_eq!(arena.seed_set(), vec![0, 1, 2]);

        let permutation = GreedyInsertionSequencer::new(TagOverlap).sequence(&items, false).unwrap();
        assert_eq!(ids(&items, &permutation), vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn test_seed_extension_requires_tie_with_every_seed() {
        // t1-t2 = 0 is the minimum; t3 ties with t1 but shares "pop" with t2
        let items = vec![
            tagged("t1", "a", &["jazz"]),
            tagged("t2", "b", &["pop"]),
            tagged("t3", "c", &["pop", "dance"]),
        ];
        let arena = Arena::new(&TagOverlap, &items);
        assert_eq!(arena.seed_set(), vec![0, 1]);
    }

    #[test]
    fn test_untagged_items_skip_seed_search_but_are_inserted() {
        let items = vec![
            tagged("t1", "a", &[]),
            tagged("t2", "b", &["rock", "indie"]),
            tagged("t3", "c", &["rock", "punk"]),
            Item::new("t4", "d"),
        ];
        let arena = Arena::new(&TagOverlap, &items);
        assert_eq!(arena.seed_set(), vec![1, 2]);

        let permutation = GreedyInsertionSequencer::new(TagOverlap).sequence(&items, false).unwrap();
        assert!(permutation.is_bijection());
        assert_eq!(permutation.len(), 4);
    }

    #[test]
    fn test_all_untagged_keeps_input_order() {
        let items = vec![Item::new("t1", "a"), Item::new("t2", "b"), Item::new("t3", "c")];
        let arena = Arena::new(&TagOverlap, &items);
        assert_eq!(arena.seed_set(), vec![0, 1, 2]);

        let permutation = GreedyInsertionSequencer::new(TagOverlap).sequence(&items, false).unwrap();
        assert_eq!(ids(&items, &permutation), vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn test_single_tagged_item_keeps_input_order() {
        let items = vec![
            Item::new("t1", "a"),
            Item::new("t2", "b"),
            tagged("t3", "c", &["rock"]),
            Item::new("t4", "d"),
        ];
        let permutation = GreedyInsertionSequencer::new(TagOverlap)
            .sequence(&items, true)
            .unwrap();
        assert_eq!(ids(&items, &permutation), vec!["t1", "t2", "t3", "t4"]);
    }

    #[test]
    fn test_insertion_picks_best_mean_similarity() {
        // Seeds t1 (jazz) and t2 (metal); t4 bridges both, t3 only one
        let items = vec![
            tagged("t1", "a", &["jazz"]),
            tagged("t2", "b", &["metal"]),
            tagged("t3", "c", &["jazz", "swing"]),
            tagged("t4", "d", &["jazz metal"]),
        ];
        let arena = Arena::new(&TagOverlap, &items);
        // t3: (1 + 0) / 2 = 0.5; t4: (1 + 1) / 2 = 1.0
        assert_eq!(arena.select_candidate(0, 1, &[2, 3], false), 1);
    }

    #[test]
    fn test_candidate_ties_go_to_earlier_pool_position() {
        let items = vec![
            tagged("t1", "a", &["jazz"]),
            tagged("t2", "b", &["metal"]),
            tagged("t3", "c", &["jazz"]),
            tagged("t4", "d", &["metal"]),
        ];
        let arena = Arena::new(&TagOverlap, &items);
        assert_eq!(arena.select_candidate(0, 1, &[2, 3], false), 0);
        assert_eq!(arena.select_candidate(0, 1, &[3, 2], false), 0);
    }

    #[test]
    fn test_author_separation_skips_shared_authors() {
        let items = vec![
            tagged("t1", "a", &["jazz"]),
            tagged("t2", "b", &["metal"]),
            tagged("t3", "a", &["jazz metal"]),
            tagged("t4", "c", &["jazz"]),
        ];
        let arena = Arena::new(&TagOverlap, &items);
        // Without separation t3 (same author as t1) is the best fit
        assert_eq!(arena.select_candidate(0, 1, &[2, 3], false), 0);
        // With separation t4 is chosen instead
        assert_eq!(arena.select_candidate(0, 1, &[2, 3], true), 1);
    }

    #[test]
    fn test_author_separation_relaxes_when_no_candidate_qualifies() {
        let items = vec![
            tagged("t1", "a", &["jazz"]),
            tagged("t2", "b", &["metal"]),
            tagged("t3", "a", &["jazz"]),
            tagged("t4", "b", &["jazz metal"]),
        ];
        let arena = Arena::new(&TagOverlap, &items);
        assert_eq!(arena.best_candidate(0, 1, &[2, 3], true), None);
        assert_eq!(arena.select_candidate(0, 1, &[2, 3], true), 1);
    }

    #[test]
    fn test_zero_similarity_candidates_still_qualify() {
        // All candidates score 0; the first allowed one must be chosen
        let items = vec![
            tagged("t1", "a", &["jazz"]),
            tagged("t2", "b", &["metal"]),
            tagged("t3", "a", &["folk"]),
            tagged("t4", "c", &["ska"]),
        ];
        let arena = Arena::new(&TagOverlap, &items);
        assert_eq!(arena.select_candidate(0, 1, &[2, 3], true), 1);
    }

    #[test]
    fn test_least_similar_adjacent_first_occurrence() {
        let items = vec![
            tagged("t1", "a", &["rock"]),
            tagged("t2", "b", &["jazz"]),
            tagged("t3", "c", &["rock"]),
            tagged("t4", "d", &["pop"]),
        ];
        let arena = Arena::new(&TagOverlap, &items);
        // All adjacent pairs score 0: the first pair wins
        assert_eq!(arena.least_similar_adjacent(&[0, 1, 2, 3]), 0);
        // (t1, t3) = 1, (t3, t2) = 0
        assert_eq!(arena.least_similar_adjacent(&[0, 2, 1]), 1);
    }

    #[test]
    fn test_same_author_pair_kept_apart_when_possible() {
        let items = vec![
            tagged("t1", "A", &["rock"]),
            tagged("t2", "A", &["rock", "indie"]),
            tagged("t3", "B", &["rock", "indie"]),
        ];
        let permutation = GreedyInsertionSequencer::new(TagOverlap).sequence(&items, true).unwrap();
        let order = ids(&items, &permutation);
        let pos = |id: &str| order.iter().position(|x| x == id).unwrap();
        assert_eq!((pos("t1") as i64 - pos("t2") as i64).abs(), 2);
    }

    #[test]
    fn test_embedding_sequence_groups_similar_vectors() {
        let items = vec![
            Item::new("x1", "a").with_embedding(vec![1.0, 0.0]),
            Item::new("y1", "b").with_embedding(vec![0.0, 1.0]),
            Item::new("x2", "c").with_embedding(vec![0.9, 0.1]),
            Item::new("mid", "d").with_embedding(vec![0.7, 0.7]),
        ];
        let permutation = GreedyInsertionSequencer::new(EmbeddingCosine)
            .sequence(&items, false)
            .unwrap();
        let order = ids(&items, &permutation);

        // x1 and y1 are orthogonal: they seed the ordering and stay at the ends
        assert_eq!(order.first().map(String::as_str), Some("x1"));
        assert_eq!(order.last().map(String::as_str), Some("y1"));
        assert_eq!(order, vec!["x1", "x2", "mid", "y1"]);
    }
}

//! Index permutation produced by every sequencer

/// Ordering of a collection expressed as indices into the input
///
/// Always a bijection on `0..len`: sequencers only ever move indices
/// between their pool and their ordering, so no index is lost or repeated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation(Vec<usize>);

impl Permutation {
    /// Identity ordering of `len` items
    pub fn identity(len: usize) -> Self {
        Self((0..len).collect())
    }

    /// Wrap indices built by a sequencer
    pub(crate) fn from_indices(indices: Vec<usize>) -> Self {
        let permutation = Self(indices);
        debug_assert!(permutation.is_bijection());
        permutation
    }

    /// Positions in output order
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every index in `0..len` appears exactly once
    pub fn is_bijection(&self) -> bool {
        let mut seen = vec![false; self.0.len()];
        self.0.iter().all(|&i| match seen.get_mut(i) {
            Some(slot) if !*slot => {
                *slot = true;
                true
            }
            _ => false,
        })
    }

    /// Move `items` into permutation order
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
        self.0
            .iter()
            .filter_map(|&i| slots.get_mut(i).and_then(Option::take))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_reorders() {
        let permutation = Permutation::from_indices(vec![2, 0, 1]);
        assert_eq!(permutation.apply(vec!["a", "b", "c"]), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_identity() {
        let permutation = Permutation::identity(4);
        assert!(permutation.is_bijection());
        assert_eq!(permutation.apply(vec![1, 2, 3, 4]), vec![1, 2, 3, 4]);
        assert!(Permutation::identity(0).is_empty());
    }

    #[test]
    fn test_bijection_detects_duplicates_and_gaps() {
        assert!(!Permutation(vec![0, 0, 1]).is_bijection());
        assert!(!Permutation(vec![0, 3, 1]).is_bijection());
        assert!(Permutation(vec![1, 2, 0]).is_bijection());
    }
}

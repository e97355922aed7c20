//! Per-query result channel: matched payloads plus comparison counters.

use crate::bits::BitCompare;

/// Results of one search together with the work it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchStats<T> {
    /// Matched payloads, in insertion order within the matched key.
    pub results: Vec<T>,
    /// Bits inspected by whole-key comparisons.
    pub bit_comparisons: u64,
    /// Trie nodes (or list entries) visited.
    pub node_comparisons: u64,
    /// Whole-key comparisons performed.
    pub string_comparisons: u64,
    /// Edit distance of the winning key when the results came from the
    /// closest-match fallback.
    pub closest_distance: Option<usize>,
}

impl<T> SearchStats<T> {
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
            bit_comparisons: 0,
            node_comparisons: 0,
            string_comparisons: 0,
            closest_distance: None,
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// `true` when nothing matched; callers render this as `NOTFOUND`.
    pub fn is_not_found(&self) -> bool {
        self.results.is_empty()
    }

    pub(crate) fn push(&mut self, item: T) {
        self.results.push(item);
    }

    /// Account for one whole-key comparison.
    pub(crate) fn charge(&mut self, cmp: &BitCompare) {
        self.string_comparisons += 1;
        self.bit_comparisons += cmp.bits_charged;
    }

    /// Transform the results, keeping the counters.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> SearchStats<U> {
        SearchStats {
            results: self.results.into_iter().map(f).collect(),
            bit_comparisons: self.bit_comparisons,
            node_comparisons: self.node_comparisons,
            string_comparisons: self.string_comparisons,
            closest_distance: self.closest_distance,
        }
    }
}

impl<'a, T: Copy> SearchStats<&'a T> {
    /// Strip one level of reference, e.g. `&&Row` results from a trie of
    /// `&Row` payloads.
    pub fn copied(self) -> SearchStats<T> {
        self.map(|r| *r)
    }
}

impl<T> Default for SearchStats<T> {
    fn default() -> Self {
        Self::new()
    }
}

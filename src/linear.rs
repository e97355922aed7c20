//! Linear scan baseline.
//!
//! Visits every record exactly once and compares its key against the query
//! with the same bit-charging compare the trie uses at its landing leaf, so
//! result sets line up exactly while the counters show the cost difference.

use crate::bits::compare_bits;
use crate::record::Record;
use crate::stats::SearchStats;

/// Exact-match scan over `records` in iteration order. Never stops early.
pub fn scan<'a, R, I>(records: I, query: &[u8]) -> SearchStats<&'a R>
where
    R: Record + ?Sized + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut stats = SearchStats::new();

    for record in records {
        stats.node_comparisons += 1;
        let cmp = compare_bits(query, record.key());
        stats.charge(&cmp);
        if cmp.is_equal() {
            stats.push(record);
        }
    }

    stats
}

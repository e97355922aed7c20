//! # ezi-trie
//!
//! Address-key lookup over a binary PATRICIA trie, with an edit-distance
//! closest-match fallback and a linear-scan baseline that shares the same
//! instrumentation.
//!
//! Every search returns a [`SearchStats`]: the matched payloads plus how many
//! bits, nodes and whole keys were compared to find them.
//!
//! ## Example
//!
//! ```rust
//! use ezi_trie::PatriciaTrie;
//!
//! let mut trie: PatriciaTrie<u32> = PatriciaTrie::new();
//! trie.insert(b"12 SMITH STREET CARLTON", 1);
//! trie.insert(b"12 SMITH STREET CARLTON", 2);
//! trie.insert(b"200 LYGON STREET CARLTON", 3);
//!
//! let exact = trie.search(b"12 SMITH STREET CARLTON", false);
//! assert_eq!(exact.results, vec![&1, &2]);
//! assert_eq!(exact.string_comparisons, 1);
//!
//! // A misspelled query resolves to the nearest key by edit distance.
//! let fuzzy = trie.search(b"12 SMYTH STREET CARLTON", true);
//! assert_eq!(fuzzy.results, vec![&1, &2]);
//! assert_eq!(fuzzy.closest_distance, Some(1));
//! ```

pub mod bits;
pub mod distance;
pub mod linear;
pub mod patricia;
pub mod record;
pub mod stats;

pub use bits::{bit_at, compare_bits, first_differing_bit, BitCompare};
pub use distance::edit_distance;
pub use patricia::{InsertOutcome, PatriciaTrie, TrieStats};
pub use record::{KeyedRecord, Record};
pub use stats::SearchStats;

#[cfg(test)]
mod proptests;

use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::{BTreeMap, BTreeSet};

fn key_strategy() -> impl Strategy<Value = Vec<u8>> + Clone {
    // A tiny alphabet forces shared prefixes, prefix keys and duplicates.
    // 0x00 is excluded: it terminates keys at the bit level.
    let byte = prop::sample::select(vec![b'a', b'b', b'c', b' ', b'1', 0xff]);
    prop::collection::vec(byte, 1..=8)
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 3)]
    Insert(#[proptest(strategy = "key_strategy()")] Vec<u8>),
    Exact(#[proptest(strategy = "key_strategy()")] Vec<u8>),
    Closest(#[proptest(strategy = "key_strategy()")] Vec<u8>),
}

fn linear_payloads(rows: &[KeyedRecord<usize>], query: &[u8]) -> Vec<usize> {
    linear::scan(rows, query)
        .results
        .iter()
        .map(|r| *r.payload())
        .collect()
}

/// Closest-match answer computed from the distinct key set alone.
///
/// The landing key comes from repeatedly splitting the candidate set at its
/// lowest critical bit and following the query's bit. The keys under a
/// path node splitting at `s` are those agreeing with the landing key on
/// every bit before `s`, and the path splits are exactly the critical bits
/// between the landing key and the rest. So the searched set is everything
/// whose critical bit against the landing key is at least the largest such
/// bit not past the query's divergence, or every key when none qualifies.
/// Returns `None` on an exact hit.
fn closest_by_key_set(keys: &[Vec<u8>], query: &[u8]) -> Option<(usize, Vec<u8>)> {
    let mut set: Vec<&[u8]> = keys.iter().map(Vec::as_slice).collect();
    while set.len() > 1 {
        let crit = set[1..]
            .iter()
            .filter_map(|k| bits::first_differing_bit(set[0], k))
            .min()
            .unwrap();
        let side = bit_at(query, crit);
        set.retain(|k| bit_at(k, crit) == side);
    }
    let landing = set[0];

    let diff = bits::first_differing_bit(landing, query)?;
    let floor = keys
        .iter()
        .filter_map(|k| bits::first_differing_bit(k, landing))
        .filter(|&s| s <= diff)
        .max();

    keys.iter()
        .filter(|k| match (floor, bits::first_differing_bit(k, landing)) {
            (None, _) | (_, None) => true,
            (Some(floor), Some(s)) => s >= floor,
        })
        .map(|k| (edit_distance(query, k), k.clone()))
        .min()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_agrees_with_linear_scan(ops in prop::collection::vec(any::<Op>(), 0..=300)) {
        let mut trie: PatriciaTrie<usize> = PatriciaTrie::new();
        let mut rows: Vec<KeyedRecord<usize>> = Vec::new();

        for op in ops {
            match op {
                Op::Insert(key) => {
                    let id = rows.len();
                    trie.insert(&key, id);
                    rows.push(KeyedRecord::new(key, id));
                }
                Op::Exact(query) => {
                    let st = trie.search(&query, false);
                    let got: Vec<usize> = st.results.iter().map(|p| **p).collect();
                    prop_assert_eq!(got, linear_payloads(&rows, &query));
                    prop_assert!(st.string_comparisons <= 1);
                    prop_assert_eq!(st.closest_distance, None);
                }
                Op::Closest(query) => {
                    let st = trie.search(&query, true);
                    let exact = linear_payloads(&rows, &query);
                    if rows.is_empty() {
                        prop_assert!(st.is_not_found());
                        continue;
                    }
                    prop_assert!(!st.is_not_found());

                    let got: Vec<usize> = st.results.iter().map(|p| **p).collect();
                    if !exact.is_empty() {
                        prop_assert_eq!(got, exact);
                        prop_assert_eq!(st.closest_distance, None);
                        continue;
                    }

                    // Every result belongs to one key, and that key's full
                    // payload list comes back in insertion order.
                    let winner = rows[got[0]].key().to_vec();
                    prop_assert_eq!(&got, &linear_payloads(&rows, &winner));

                    let d = edit_distance(&query, &winner);
                    prop_assert_eq!(st.closest_distance, Some(d));

                    let keys: BTreeSet<Vec<u8>> = rows.iter().map(|r| r.key().to_vec()).collect();
                    let keys: Vec<Vec<u8>> = keys.into_iter().collect();
                    let (want_distance, want_key) = closest_by_key_set(&keys, &query).unwrap();
                    prop_assert_eq!(winner, want_key);
                    prop_assert_eq!(d, want_distance);
                }
            }
        }

        trie.check_invariants();
        prop_assert_eq!(trie.payload_count(), rows.len());
    }

    #[test]
    fn prop_inserts_never_disturb_earlier_keys(keys in prop::collection::vec(key_strategy(), 1..=200)) {
        let mut trie: PatriciaTrie<usize> = PatriciaTrie::new();
        let mut m: BTreeMap<Vec<u8>, Vec<usize>> = BTreeMap::new();

        for (i, key) in keys.into_iter().enumerate() {
            trie.insert(&key, i);
            m.entry(key).or_default().push(i);

            for (k, expected) in &m {
                prop_assert_eq!(trie.get(k), Some(expected.as_slice()));
            }
            prop_assert_eq!(trie.len(), m.len());
        }

        trie.check_invariants();
        let mut got: Vec<(Vec<u8>, Vec<usize>)> = trie
            .iter()
            .map(|(k, v)| (k.to_vec(), v.to_vec()))
            .collect();
        got.sort();
        let expected: Vec<(Vec<u8>, Vec<usize>)> = m.into_iter().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_first_differing_bit_is_where_bits_diverge(a in key_strategy(), b in key_strategy()) {
        match bits::first_differing_bit(&a, &b) {
            None => {
                prop_assert_eq!(&a, &b);
            }
            Some(d) => {
                for i in 0..d {
                    prop_assert_eq!(bit_at(&a, i), bit_at(&b, i));
                }
                prop_assert_ne!(bit_at(&a, d), bit_at(&b, d));
            }
        }
    }
}

/// Heap's algorithm, iterative. `f` sees every ordering of `items` once
/// (positions, not values, so repeated items yield repeated orderings).
fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(&[T])) {
    let mut perm = items.to_vec();
    let mut counters = vec![0usize; perm.len()];
    f(&perm);

    let mut i = 1;
    while i < perm.len() {
        if counters[i] < i {
            let j = if i % 2 == 0 { 0 } else { counters[i] };
            perm.swap(j, i);
            f(&perm);
            counters[i] += 1;
            i = 1;
        } else {
            counters[i] = 0;
            i += 1;
        }
    }
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys: [&[u8]; 6] = [b"a", b"b", b"aa", b"ab", b"ba", b"a"];

    let mut orderings = 0;
    for_each_permutation(&keys, |perm| {
        orderings += 1;
        let mut trie: PatriciaTrie<usize> = PatriciaTrie::new();
        let mut m: BTreeMap<Vec<u8>, Vec<usize>> = BTreeMap::new();

        for (i, &k) in perm.iter().enumerate() {
            trie.insert(k, i);
            m.entry(k.to_vec()).or_default().push(i);
        }

        trie.check_invariants();
        assert_eq!(trie.len(), 5);
        for (k, expected) in &m {
            let st = trie.search(k, false);
            let got: Vec<usize> = st.results.iter().map(|p| **p).collect();
            assert_eq!(&got, expected);
        }

        // The trie shape depends only on the key set, so "bb" always lands
        // on "ba" and resolves to "b": both are one edit away and "b" sorts
        // first.
        let st = trie.search(b"bb", true);
        let got: Vec<usize> = st.results.iter().map(|p| **p).collect();
        assert_eq!(&got, &m[&b"b".to_vec()]);
    });
    assert_eq!(orderings, 720);
}

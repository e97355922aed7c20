//! Binary PATRICIA trie over byte-string keys.
//!
//! Internal nodes store only the bit position at which their two subtrees
//! diverge; leaves store the full key (needed for verification anyway) plus
//! every payload inserted under it. Keys live in a shared arena and nodes in
//! an index-addressed `Vec`, so dropping the trie frees everything at once.
//!
//! Lookup descends purely by bit decisions to a *landing leaf* and then does
//! a single whole-key compare. When that compare fails, the closest-match
//! fallback picks a subtree around the point of divergence and scores each of
//! its keys by edit distance.

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::bits::{bit_at, compare_bits, first_differing_bit};
use crate::distance::edit_distance;
use crate::record::{is_valid_key, Record};
use crate::stats::SearchStats;

/// Key storage arena
struct KeyArena {
    data: Vec<u8>,
    positions: Vec<(u32, u32)>, // (offset, len) for each key
}

impl KeyArena {
    fn new() -> Self {
        Self {
            data: Vec::new(),
            positions: Vec::new(),
        }
    }

    fn add(&mut self, key: &[u8]) -> u32 {
        let idx = arena_index(self.positions.len());
        let offset = arena_index(self.data.len());
        let len = arena_index(key.len());
        self.data.extend_from_slice(key);
        self.positions.push((offset, len));
        idx
    }

    fn get(&self, idx: u32) -> &[u8] {
        let (offset, len) = self.positions[idx as usize];
        &self.data[offset as usize..offset as usize + len as usize]
    }

    fn memory_usage(&self) -> usize {
        self.data.capacity() + self.positions.capacity() * std::mem::size_of::<(u32, u32)>()
    }
}

/// Arena offsets are 32-bit; running past that is as fatal as running out
/// of memory.
fn arena_index(n: usize) -> u32 {
    u32::try_from(n).expect("key arena overflow")
}

/// Index of a node in the arena.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(transparent)]
struct NodeId(u32);

impl NodeId {
    #[inline]
    fn idx(self) -> usize {
        self.0 as usize
    }
}

enum Node<P> {
    /// Keys under `children[0]` have bit `split_bit` clear, keys under
    /// `children[1]` have it set.
    Internal { split_bit: usize, children: [NodeId; 2] },
    Leaf {
        key_idx: u32,
        payloads: SmallVec<[P; 1]>,
    },
}

/// What [`PatriciaTrie::insert`] did with the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The key was new; a leaf (and, past the first key, a branch) was added.
    NewKey,
    /// The key already existed; the payload was appended and the leaf now
    /// holds `count` payloads.
    Duplicate { count: usize },
}

/// Radix trie mapping byte-string keys to ordered lists of payloads.
pub struct PatriciaTrie<P> {
    keys: KeyArena,
    nodes: Vec<Node<P>>,
    root: Option<NodeId>,
    len: usize,
    payloads: usize,
}

impl<P> PatriciaTrie<P> {
    pub fn new() -> Self {
        Self {
            keys: KeyArena::new(),
            nodes: Vec::new(),
            root: None,
            len: 0,
            payloads: 0,
        }
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of payloads across all keys, duplicates included.
    pub fn payload_count(&self) -> usize {
        self.payloads
    }

    fn alloc(&mut self, node: Node<P>) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).expect("node arena overflow"));
        self.nodes.push(node);
        id
    }

    fn alloc_leaf(&mut self, key: &[u8], payload: P) -> NodeId {
        let key_idx = self.keys.add(key);
        let mut payloads = SmallVec::new();
        payloads.push(payload);
        self.alloc(Node::Leaf { key_idx, payloads })
    }

    fn leaf_key(&self, id: NodeId) -> &[u8] {
        match &self.nodes[id.idx()] {
            Node::Leaf { key_idx, .. } => self.keys.get(*key_idx),
            Node::Internal { .. } => unreachable!("leaf_key on an internal node"),
        }
    }

    fn leaf_payloads(&self, id: NodeId) -> &[P] {
        match &self.nodes[id.idx()] {
            Node::Leaf { payloads, .. } => payloads.as_slice(),
            Node::Internal { .. } => unreachable!("leaf_payloads on an internal node"),
        }
    }

    /// Follow `key`'s bits from `from` down to a leaf.
    fn landing_leaf(&self, from: NodeId, key: &[u8]) -> NodeId {
        let mut at = from;
        while let Node::Internal {
            split_bit,
            children,
        } = &self.nodes[at.idx()]
        {
            at = children[bit_at(key, *split_bit) as usize];
        }
        at
    }

    /// Insert `payload` under `key`. Payloads sharing a key keep their
    /// insertion order.
    ///
    /// # Panics
    ///
    /// If `key` is empty or contains a zero byte.
    pub fn insert(&mut self, key: &[u8], payload: P) -> InsertOutcome {
        assert!(
            is_valid_key(key),
            "patricia trie keys must be non-empty and NUL-free"
        );

        let Some(root) = self.root else {
            let leaf = self.alloc_leaf(key, payload);
            self.root = Some(leaf);
            self.len += 1;
            self.payloads += 1;
            return InsertOutcome::NewKey;
        };

        let landing = self.landing_leaf(root, key);
        let diff = first_differing_bit(self.leaf_key(landing), key);
        let Some(split) = diff else {
            let Node::Leaf { payloads, .. } = &mut self.nodes[landing.idx()] else {
                unreachable!("landing node is always a leaf");
            };
            payloads.push(payload);
            let count = payloads.len();
            self.payloads += 1;
            return InsertOutcome::Duplicate { count };
        };

        // The landing leaf only tells us where the keys diverge, not where
        // that bit belongs on the path. Walk again from the root until the
        // next split would be at or past the divergence.
        let mut parent: Option<(NodeId, usize)> = None;
        let mut at = root;
        while let Node::Internal {
            split_bit,
            children,
        } = &self.nodes[at.idx()]
        {
            if *split_bit >= split {
                break;
            }
            let dir = bit_at(key, *split_bit) as usize;
            parent = Some((at, dir));
            at = children[dir];
        }

        let leaf = self.alloc_leaf(key, payload);
        let dir = bit_at(key, split) as usize;
        let mut children = [at, at];
        children[dir] = leaf;
        let branch = self.alloc(Node::Internal {
            split_bit: split,
            children,
        });

        match parent {
            Some((p, pdir)) => {
                if let Node::Internal { children, .. } = &mut self.nodes[p.idx()] {
                    children[pdir] = branch;
                }
            }
            None => self.root = Some(branch),
        }
        trace!(split_bit = split, grafted_under_root = parent.is_none(), "patricia split");

        self.len += 1;
        self.payloads += 1;
        InsertOutcome::NewKey
    }

    /// Payloads stored under exactly `key`, without instrumentation.
    pub fn get(&self, key: &[u8]) -> Option<&[P]> {
        let landing = self.landing_leaf(self.root?, key);
        compare_bits(key, self.leaf_key(landing))
            .is_equal()
            .then(|| self.leaf_payloads(landing))
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }

    /// Search for `query`.
    ///
    /// Every node on the descent (landing leaf included) counts toward
    /// `node_comparisons`; the landing leaf gets exactly one bit-charging
    /// whole-key compare. On a miss with `allow_closest` set, the payloads
    /// of the nearest key by edit distance within the mismatch subtree are
    /// returned instead and `closest_distance` records that distance.
    pub fn search(&self, query: &[u8], allow_closest: bool) -> SearchStats<&P> {
        let mut stats = SearchStats::new();
        let Some(root) = self.root else {
            return stats;
        };

        let mut path: SmallVec<[NodeId; 32]> = SmallVec::new();
        let mut at = root;
        loop {
            stats.node_comparisons += 1;
            match &self.nodes[at.idx()] {
                Node::Internal {
                    split_bit,
                    children,
                } => {
                    path.push(at);
                    at = children[bit_at(query, *split_bit) as usize];
                }
                Node::Leaf { .. } => break,
            }
        }

        let cmp = compare_bits(query, self.leaf_key(at));
        stats.charge(&cmp);

        let Some(diff) = cmp.first_diff else {
            stats.results.extend(self.leaf_payloads(at));
            return stats;
        };
        if !allow_closest {
            return stats;
        }

        let subtree = self.mismatch_subtree(root, &path, diff);
        if let Some((winner, distance)) = self.closest_leaf(subtree, query) {
            debug!(
                query = %String::from_utf8_lossy(query),
                matched = %String::from_utf8_lossy(self.leaf_key(winner)),
                distance,
                "closest match"
            );
            stats.results.extend(self.leaf_payloads(winner));
            stats.closest_distance = Some(distance);
        }
        stats
    }

    /// Root of the subtree searched by the closest-match fallback: the node
    /// on `path` splitting exactly at `diff`, else the deepest one splitting
    /// before it, else the root.
    fn mismatch_subtree(&self, root: NodeId, path: &[NodeId], diff: usize) -> NodeId {
        let mut deepest_before = None;
        for &id in path {
            if let Node::Internal { split_bit, .. } = &self.nodes[id.idx()] {
                if *split_bit == diff {
                    return id;
                }
                if *split_bit < diff {
                    deepest_before = Some(id);
                }
            }
        }
        deepest_before.unwrap_or(root)
    }

    /// Leaf under `from` with the smallest edit distance to `query`; ties go
    /// to the lexicographically smaller key.
    fn closest_leaf(&self, from: NodeId, query: &[u8]) -> Option<(NodeId, usize)> {
        let mut best: Option<(NodeId, usize)> = None;
        let mut stack = vec![from];

        while let Some(id) = stack.pop() {
            match &self.nodes[id.idx()] {
                Node::Internal { children, .. } => {
                    stack.push(children[1]);
                    stack.push(children[0]);
                }
                Node::Leaf { key_idx, .. } => {
                    let key = self.keys.get(*key_idx);
                    let distance = edit_distance(query, key);
                    let better = match best {
                        None => true,
                        Some((best_id, best_distance)) => {
                            distance < best_distance
                                || (distance == best_distance && key < self.leaf_key(best_id))
                        }
                    };
                    if better {
                        best = Some((id, distance));
                    }
                }
            }
        }

        best
    }

    /// Depth-first iterator over `(key, payloads)`, zero branches first.
    pub fn iter(&self) -> Iter<'_, P> {
        let mut stack = Vec::new();
        if let Some(root) = self.root {
            stack.push(root);
        }
        Iter { trie: self, stack }
    }

    pub fn memory_stats(&self) -> TrieStats {
        let mut stats = TrieStats {
            keys: self.len,
            payloads: self.payloads,
            key_bytes: self.keys.data.len(),
            ..TrieStats::default()
        };

        let mut heap = self.keys.memory_usage()
            + self.nodes.capacity() * std::mem::size_of::<Node<P>>();

        let mut stack: Vec<(NodeId, usize)> = self.root.map(|r| (r, 1)).into_iter().collect();
        while let Some((id, depth)) = stack.pop() {
            stats.max_depth = stats.max_depth.max(depth);
            match &self.nodes[id.idx()] {
                Node::Internal { children, .. } => {
                    stats.internal_nodes += 1;
                    stack.push((children[0], depth + 1));
                    stack.push((children[1], depth + 1));
                }
                Node::Leaf { payloads, .. } => {
                    stats.leaves += 1;
                    if payloads.spilled() {
                        heap += payloads.capacity() * std::mem::size_of::<P>();
                    }
                }
            }
        }

        stats.heap_bytes = heap;
        stats
    }

    /// Panics unless the structural invariants hold: strictly increasing
    /// split bits along every path, every leaf key agreeing with the branch
    /// decisions above it, distinct keys, and no orphaned nodes.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        use std::collections::HashSet;

        let Some(root) = self.root else {
            assert_eq!(self.len, 0, "empty root with non-zero len");
            assert_eq!(self.payloads, 0, "empty root with payloads");
            assert!(self.nodes.is_empty(), "empty root with allocated nodes");
            return;
        };

        let mut seen: HashSet<Vec<u8>> = HashSet::new();
        let mut payloads = 0usize;
        let mut stack: Vec<(NodeId, Vec<(usize, u8)>)> = vec![(root, Vec::new())];
        while let Some((id, constraints)) = stack.pop() {
            match &self.nodes[id.idx()] {
                Node::Internal {
                    split_bit,
                    children,
                } => {
                    if let Some(&(prev, _)) = constraints.last() {
                        assert!(*split_bit > prev, "split bits must strictly increase");
                    }
                    for (dir, child) in children.iter().enumerate() {
                        let mut c = constraints.clone();
                        c.push((*split_bit, dir as u8));
                        stack.push((*child, c));
                    }
                }
                Node::Leaf { key_idx, payloads: p } => {
                    let key = self.keys.get(*key_idx);
                    assert!(!p.is_empty(), "leaf without payloads");
                    payloads += p.len();
                    for &(bit, dir) in &constraints {
                        assert_eq!(
                            bit_at(key, bit),
                            dir,
                            "key {:?} on the wrong side of bit {bit}",
                            String::from_utf8_lossy(key)
                        );
                    }
                    assert!(seen.insert(key.to_vec()), "duplicate leaf key");
                }
            }
        }

        assert_eq!(seen.len(), self.len, "reachable leaves must match len");
        assert_eq!(payloads, self.payloads, "payload count mismatch");
        assert_eq!(self.nodes.len(), 2 * self.len - 1, "orphaned nodes");
    }
}

impl<'a, R: Record + ?Sized> PatriciaTrie<&'a R> {
    /// Build a trie of record references keyed by [`Record::key`], in
    /// iteration order.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a R>,
    {
        let mut trie = Self::new();
        for record in records {
            trie.insert(record.key(), record);
        }
        debug!(
            keys = trie.len(),
            payloads = trie.payload_count(),
            "built patricia trie"
        );
        trie
    }
}

impl<P> Default for PatriciaTrie<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: AsRef<[u8]>, P> Extend<(K, P)> for PatriciaTrie<P> {
    fn extend<I: IntoIterator<Item = (K, P)>>(&mut self, iter: I) {
        for (key, payload) in iter {
            self.insert(key.as_ref(), payload);
        }
    }
}

impl<K: AsRef<[u8]>, P> FromIterator<(K, P)> for PatriciaTrie<P> {
    fn from_iter<I: IntoIterator<Item = (K, P)>>(iter: I) -> Self {
        let mut trie = Self::new();
        trie.extend(iter);
        trie
    }
}

impl<P: std::fmt::Debug> std::fmt::Debug for PatriciaTrie<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(k, v)| (String::from_utf8_lossy(k), v)))
            .finish()
    }
}

pub struct Iter<'a, P> {
    trie: &'a PatriciaTrie<P>,
    stack: Vec<NodeId>,
}

impl<'a, P> Iterator for Iter<'a, P> {
    type Item = (&'a [u8], &'a [P]);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            match &self.trie.nodes[id.idx()] {
                Node::Internal { children, .. } => {
                    self.stack.push(children[1]);
                    self.stack.push(children[0]);
                }
                Node::Leaf { key_idx, payloads } => {
                    return Some((self.trie.keys.get(*key_idx), payloads.as_slice()));
                }
            }
        }
        None
    }
}

/// Shape and size of a built trie.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrieStats {
    pub keys: usize,
    pub payloads: usize,
    pub internal_nodes: usize,
    pub leaves: usize,
    /// Raw key bytes held by the key arena.
    pub key_bytes: usize,
    /// Nodes on the longest root-to-leaf path, leaf included.
    pub max_depth: usize,
    /// Approximate heap bytes owned by the trie.
    pub heap_bytes: usize,
}

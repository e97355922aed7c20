//! Levenshtein edit distance over raw bytes.

/// Minimum number of single-byte insertions, deletions and substitutions
/// turning `a` into `b`.
///
/// Runs the classic `(n + 1) x (m + 1)` recurrence, keeping only two rows
/// sized by the shorter input.
pub fn edit_distance(a: &[u8], b: &[u8]) -> usize {
    // Distance is symmetric; iterate rows over the longer input.
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return long.len();
    }

    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut curr = vec![0usize; short.len() + 1];

    for (i, &lc) in long.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &sc) in short.iter().enumerate() {
            curr[j + 1] = if lc == sc {
                prev[j]
            } else {
                1 + prev[j].min(prev[j + 1]).min(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[short.len()]
}

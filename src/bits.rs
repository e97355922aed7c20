//! Bit-level views over byte-string keys.
//!
//! Keys are addressed MSB-first: bit `0` is the most significant bit of byte
//! `0`, bit `7` its least significant bit, bit `8` the MSB of byte `1`, and so
//! on. Every key is followed by an implicit zero sentinel byte, so a key that
//! is a strict prefix of another still diverges at a well-defined bit inside
//! the sentinel instead of reading out of bounds.

use std::cmp::Ordering;

pub const BITS_PER_BYTE: usize = 8;

/// Byte `idx` of `key`, reading the zero sentinel at or past the end.
#[inline]
fn byte_at(key: &[u8], idx: usize) -> u8 {
    key.get(idx).copied().unwrap_or(0)
}

/// Bit `pos` of `key` (`0` or `1`), MSB-first.
///
/// Positions at or past `key.len() * 8` read the sentinel and always return
/// `0`.
#[inline]
pub fn bit_at(key: &[u8], pos: usize) -> u8 {
    let bit_idx = 7 - (pos % BITS_PER_BYTE);
    (byte_at(key, pos / BITS_PER_BYTE) >> bit_idx) & 1
}

/// Outcome of a bit-charging comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitCompare {
    /// Global index of the first differing bit, `None` when identical.
    pub first_diff: Option<usize>,
    /// Bits inspected: 8 per equal byte (the sentinel included when the keys
    /// are identical), then one per bit of the differing byte up to and
    /// including the differing bit.
    pub bits_charged: u64,
    /// Byte ordering of `a` relative to `b` at the divergence point.
    pub ordering: Ordering,
}

impl BitCompare {
    #[inline]
    pub fn is_equal(&self) -> bool {
        self.first_diff.is_none()
    }
}

/// Compare two keys bit by bit, charging inspected bits.
///
/// A zero byte terminates a key, matching the sentinel semantics of
/// [`bit_at`]; bytes after an interior zero are never inspected.
pub fn compare_bits(a: &[u8], b: &[u8]) -> BitCompare {
    let mut bits_charged = 0u64;
    let mut i = 0usize;

    loop {
        let ab = byte_at(a, i);
        let bb = byte_at(b, i);

        if ab == bb {
            bits_charged += BITS_PER_BYTE as u64;
            if ab == 0 {
                return BitCompare {
                    first_diff: None,
                    bits_charged,
                    ordering: Ordering::Equal,
                };
            }
            i += 1;
            continue;
        }

        // leading_zeros of the xor is the MSB-first offset of the first
        // differing bit within this byte.
        let offset = (ab ^ bb).leading_zeros() as usize;
        bits_charged += offset as u64 + 1;
        return BitCompare {
            first_diff: Some(i * BITS_PER_BYTE + offset),
            bits_charged,
            ordering: ab.cmp(&bb),
        };
    }
}

/// Global index of the first bit at which `a` and `b` differ, or `None` when
/// they are identical up to and including the sentinel.
#[inline]
pub fn first_differing_bit(a: &[u8], b: &[u8]) -> Option<usize> {
    compare_bits(a, b).first_diff
}

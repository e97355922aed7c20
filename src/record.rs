//! Minimal record abstraction: something with a byte-string key.

/// A record indexed by one byte-string key.
///
/// Keys are compared as raw bytes. A zero byte terminates a key for
/// bit-level comparison, so keys stored in a [`PatriciaTrie`] must be
/// non-empty and NUL-free.
///
/// [`PatriciaTrie`]: crate::PatriciaTrie
pub trait Record {
    fn key(&self) -> &[u8];
}

impl<R: Record + ?Sized> Record for &R {
    fn key(&self) -> &[u8] {
        (**self).key()
    }
}

/// A key paired with an opaque payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedRecord<P> {
    key: Box<[u8]>,
    payload: P,
}

impl<P> KeyedRecord<P> {
    pub fn new(key: impl AsRef<[u8]>, payload: P) -> Self {
        Self {
            key: key.as_ref().into(),
            payload,
        }
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn into_parts(self) -> (Box<[u8]>, P) {
        (self.key, self.payload)
    }
}

impl<P> Record for KeyedRecord<P> {
    fn key(&self) -> &[u8] {
        &self.key
    }
}

/// `true` when `key` can be stored in a trie: non-empty and NUL-free.
pub fn is_valid_key(key: &[u8]) -> bool {
    !key.is_empty() && !key.contains(&0)
}

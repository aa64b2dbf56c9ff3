//! HashedView: a borrowed byte string paired with its content hash.

use crate::entry::Entry;
use core::hash::BuildHasher;

/// Borrowed bytes with their hash computed once up front.
///
/// The hash is computed before any shard lock is taken and is reused for
/// shard routing, index probing and the stored `Entry::hash`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct HashedView<'a> {
    bytes: &'a [u8],
    hash: u64,
}

impl<'a> HashedView<'a> {
    #[inline]
    pub(crate) fn new<S: BuildHasher>(bytes: &'a [u8], hasher: &S) -> Self {
        Self {
            bytes,
            hash: hasher.hash_one(bytes),
        }
    }

    #[inline]
    pub(crate) fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    #[inline]
    pub(crate) fn hash(&self) -> u64 {
        self.hash
    }

    /// Exact match: hashes agree and the bytes are identical.
    #[inline]
    pub(crate) fn matches(&self, entry: &Entry) -> bool {
        entry.hash() == self.hash && entry.bytes() == self.bytes
    }
}

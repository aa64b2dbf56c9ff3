//! Entry: the canonical, immutable record behind every handle.

use core::sync::atomic::{AtomicUsize, Ordering};

/// One interned byte string.
///
/// `bytes` and `hash` never change after construction. `refs` is a stats
/// counter of how many handles were issued for this entry; it never
/// drives reclamation.
#[derive(Debug)]
pub(crate) struct Entry {
    bytes: Box<[u8]>,
    hash: u64,
    refs: AtomicUsize,
}

impl Entry {
    pub(crate) fn new(bytes: Box<[u8]>, hash: u64) -> Self {
        Self {
            bytes,
            hash,
            refs: AtomicUsize::new(0),
        }
    }

    #[inline]
    pub(crate) fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub(crate) fn hash(&self) -> u64 {
        self.hash
    }

    /// Record one issued handle.
    #[inline]
    pub(crate) fn issue(&self) {
        self.refs.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn issued(&self) -> usize {
        self.refs.load(Ordering::Relaxed)
    }
}

/// Copy `bytes` into an exactly sized boxed slice, failing instead of
/// aborting when the allocator refuses.
pub(crate) fn try_copy_bytes(bytes: &[u8]) -> Option<Box<[u8]>> {
    let mut v = Vec::new();
    v.try_reserve_exact(bytes.len()).ok()?;
    v.extend_from_slice(bytes);
    Some(v.into_boxed_slice())
}

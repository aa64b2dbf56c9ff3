//! Shard: one independently locked partition of the intern table.
//!
//! A shard pairs a `hashbrown::HashTable<EntryId>` index with an
//! append-only [`Arena`] behind a single `parking_lot::RwLock`. Counters
//! used for stats live beside the lock as atomics so readers of stats
//! never touch it.

use crate::arena::{Arena, EntryId};
use crate::entry::{try_copy_bytes, Entry};
use crate::error::InternError;
use crate::hashed_view::HashedView;
use crate::reentrancy;
use core::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use hashbrown::HashTable;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

// hashbrown probes with the low hash bits, which are identical for every
// entry of a shard. Drop them and re-mix before indexing.
#[inline]
fn local_hash(hash: u64, shard_bits: u32) -> u64 {
    (hash >> shard_bits).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

#[derive(Debug)]
struct ShardTable {
    index: HashTable<EntryId>,
    arena: Arena,
}

/// Point-in-time counters of one shard. Fields are read independently and
/// may be mutually inconsistent under concurrent inserts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ShardCounters {
    pub(crate) entries: usize,
    pub(crate) bytes: usize,
    pub(crate) overhead: usize,
    pub(crate) requests: u64,
    pub(crate) contended: u64,
}

#[derive(Debug)]
#[repr(align(64))]
pub(crate) struct Shard {
    table: RwLock<ShardTable>,
    shard_bits: u32,
    entries: AtomicUsize,
    bytes: AtomicUsize,
    overhead: AtomicUsize,
    requests: AtomicU64,
    contended: AtomicU64,
}

impl Shard {
    pub(crate) fn new(shard_bits: u32, initial_chunk: usize, max_chunk: usize) -> Self {
        Self {
            table: RwLock::new(ShardTable {
                index: HashTable::new(),
                arena: Arena::new(initial_chunk, max_chunk),
            }),
            shard_bits,
            entries: AtomicUsize::new(0),
            bytes: AtomicUsize::new(0),
            overhead: AtomicUsize::new(0),
            requests: AtomicU64::new(0),
            contended: AtomicU64::new(0),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ShardTable> {
        match self.table.try_read() {
            Some(g) => g,
            None => {
                self.contended.fetch_add(1, Ordering::Relaxed);
                self.table.read()
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, ShardTable> {
        match self.table.try_write() {
            Some(g) => g,
            None => {
                self.contended.fetch_add(1, Ordering::Relaxed);
                self.table.write()
            }
        }
    }

    /// Extend a borrow of one of this shard's entries to the shard's lifetime.
    ///
    /// # Safety
    /// `entry` must live in this shard's arena. Arena chunks are never
    /// reallocated, and entries are never removed, moved or mutably
    /// borrowed after insertion, so they stay valid for as long as the
    /// shard does.
    #[inline]
    unsafe fn pin<'s>(&'s self, entry: &Entry) -> &'s Entry {
        unsafe { &*(entry as *const Entry) }
    }

    /// Non-creating probe under the read lock. The lock is writer-fair, so
    /// this may wait behind a queued writer of the same shard.
    pub(crate) fn lookup(&self, view: &HashedView<'_>) -> Option<&Entry> {
        let local = local_hash(view.hash(), self.shard_bits);
        let _g = reentrancy::enter_shard();
        let table = self.read();
        let &id = table
            .index
            .find(local, |&id| view.matches(table.arena.get(id)))?;
        // SAFETY: `id` was found in this shard's index.
        Some(unsafe { self.pin(table.arena.get(id)) })
    }

    /// Return the canonical entry for `view`, creating it at most once.
    pub(crate) fn intern(&self, view: &HashedView<'_>) -> Result<&Entry, InternError> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        if let Some(entry) = self.lookup(view) {
            return Ok(entry);
        }

        let len = view.bytes().len();
        let oom = || {
            tracing::debug!(len, "allocation failed while interning");
            InternError::OutOfMemory { len }
        };
        // Copy outside the lock; a losing racer just drops its copy.
        let bytes = try_copy_bytes(view.bytes()).ok_or_else(oom)?;

        let local = local_hash(view.hash(), self.shard_bits);
        let bits = self.shard_bits;
        let _g = reentrancy::enter_shard();
        let mut guard = self.write();
        let ShardTable { index, arena } = &mut *guard;

        // Reserve first so `entry` below cannot hit an infallible rehash.
        index
            .try_reserve(1, |&id| local_hash(arena.get(id).hash(), bits))
            .map_err(|_| oom())?;

        let id = match index.entry(
            local,
            |&id| view.matches(arena.get(id)),
            |&id| local_hash(arena.get(id).hash(), bits),
        ) {
            hashbrown::hash_table::Entry::Occupied(o) => {
                let id = *o.get();
                // SAFETY: `id` was found in this shard's index.
                return Ok(unsafe { self.pin(arena.get(id)) });
            }
            hashbrown::hash_table::Entry::Vacant(v) => {
                let id = arena
                    .push(Entry::new(bytes, view.hash()))
                    .map_err(|_| oom())?;
                let _ = v.insert(id);
                id
            }
        };

        debug_assert_eq!(arena.len(), index.len());
        self.entries.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(len, Ordering::Relaxed);
        // Control byte plus one id per index slot, and the arena's entry headers.
        let overhead = index.capacity() * (core::mem::size_of::<EntryId>() + 1)
            + arena.reserved_bytes();
        self.overhead.store(overhead, Ordering::Relaxed);

        // SAFETY: `id` was just pushed into this shard's arena.
        Ok(unsafe { self.pin(arena.get(id)) })
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.load(Ordering::Relaxed)
    }

    pub(crate) fn counters(&self) -> ShardCounters {
        ShardCounters {
            entries: self.entries.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
            overhead: self.overhead.load(Ordering::Relaxed),
            requests: self.requests.load(Ordering::Relaxed),
            contended: self.contended.load(Ordering::Relaxed),
        }
    }
}

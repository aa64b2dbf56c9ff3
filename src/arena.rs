//! Append-only chunked storage giving entries stable addresses.
//!
//! Each chunk is a `Vec<Entry>` allocated once and never pushed past the
//! capacity it was created with, so its buffer is never reallocated. Growing
//! the arena appends a new chunk; the outer `Vec` may move chunk headers but
//! never the entries they point to.

use crate::entry::Entry;
use std::collections::TryReserveError;

/// Position of an entry inside one shard's arena.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct EntryId {
    chunk: usize,
    slot: usize,
}

#[derive(Debug)]
pub(crate) struct Arena {
    chunks: Vec<Vec<Entry>>,
    // Number of slots the last chunk may hold; never exceeds its capacity.
    tail_limit: usize,
    next_capacity: usize,
    max_capacity: usize,
    len: usize,
}

impl Arena {
    pub(crate) fn new(initial_capacity: usize, max_capacity: usize) -> Self {
        Self {
            chunks: Vec::new(),
            tail_limit: 0,
            next_capacity: initial_capacity.max(1),
            max_capacity: max_capacity.max(initial_capacity).max(1),
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[cfg(test)]
    pub(crate) fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub(crate) fn get(&self, id: EntryId) -> &Entry {
        &self.chunks[id.chunk][id.slot]
    }

    fn tail_has_room(&self) -> bool {
        self.chunks
            .last()
            .map(|c| c.len() < self.tail_limit)
            .unwrap_or(false)
    }

    fn grow(&mut self) -> Result<(), TryReserveError> {
        let cap = self.next_capacity;
        let mut chunk = Vec::new();
        chunk.try_reserve_exact(cap)?;
        self.chunks.try_reserve(1)?;
        self.chunks.push(chunk);
        self.tail_limit = cap;
        self.next_capacity = cap.saturating_mul(2).min(self.max_capacity);
        tracing::trace!(
            chunk = self.chunks.len() - 1,
            capacity = cap,
            "arena opened a new chunk"
        );
        Ok(())
    }

    /// Store `entry` and return its stable id. On allocation failure the
    /// arena is unchanged.
    pub(crate) fn push(&mut self, entry: Entry) -> Result<EntryId, TryReserveError> {
        if !self.tail_has_room() {
            self.grow()?;
        }
        let chunk = self.chunks.len() - 1;
        let tail = &mut self.chunks[chunk];
        debug_assert!(tail.len() < tail.capacity());
        let slot = tail.len();
        tail.push(entry);
        self.len += 1;
        Ok(EntryId { chunk, slot })
    }

    /// Approximate heap bytes held by chunk buffers (entry headers only).
    pub(crate) fn reserved_bytes(&self) -> usize {
        self.chunks
            .iter()
            .map(|c| c.capacity() * core::mem::size_of::<Entry>())
            .sum()
    }
}

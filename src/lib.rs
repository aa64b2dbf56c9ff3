//! shard-intern: a concurrent string interning pool whose handles compare
//! and hash in O(1).
//!
//! Internal Design:
//!
//! Summary
//! - Goal: any two equal byte strings interned in one table are backed by
//!   exactly one immutable allocation, reachable through a `Copy` handle,
//!   while many threads intern at once.
//! - Layers:
//!   - HashedView: borrowed bytes plus a 64-bit content hash computed once,
//!     before any lock is taken.
//!   - Entry / Arena: the canonical bytes, their hash and an issued-handle
//!     counter, stored in append-only chunks that never reallocate.
//!   - Shard: `RwLock<{ HashTable<EntryId>, Arena }>` plus lock-free
//!     counters. Probing compares stored hash, then exact bytes.
//!   - InternTable: a power-of-two array of shards routed by the low bits
//!     of the content hash; hands out `Handle<'t>`.
//!   - Stats: counters summed from shard atomics.
//!
//! Constraints
//! - Create exactly once: a miss re-probes under the shard's write lock
//!   before inserting, so racing interns of equal bytes agree on one entry.
//! - Stable entries: index growth moves only `EntryId`s; entries never move
//!   and are never freed before the table, so handles read without locks.
//! - Lock order is trivial: no thread ever holds two shard locks. Debug
//!   builds assert this (see `reentrancy`).
//! - No removal, no expiry, no memory bound.
//!
//! Failure semantics
//! - Allocation failure while creating an entry returns
//!   `InternError::OutOfMemory` and leaves the table unchanged. Nothing is
//!   retried.
//!
//! Hasher and rehashing invariants
//! - Each entry stores its content hash; the index rehashes from the stored
//!   value and never re-reads string bytes.
//! - `Handle: Hash` writes the stored hash, so `HandleMap`/`HandleSet` key
//!   on handles without touching the bytes.
//!
//! Notes
//! - The table is an owned value; handles borrow it. A lazily built
//!   process-wide table is available in [`global`] for `'static` handles.
//! - Stats are approximate under concurrent mutation.

mod arena;
pub mod config;
mod entry;
pub mod error;
pub mod global;
pub mod handle;
mod hashed_view;
pub mod intern_table;
mod intern_table_proptest;
mod reentrancy;
mod shard;
pub mod stats;

// Public surface
pub use config::TableConfig;
pub use error::InternError;
pub use handle::{Handle, HandleBuildHasher, HandleHasher, HandleMap, HandleSet};
pub use intern_table::InternTable;
pub use stats::Stats;

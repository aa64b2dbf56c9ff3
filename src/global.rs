//! The process-wide pool.
//!
//! Prefer owning an [`InternTable`] and passing it where it is needed.
//! This module serves call sites that need `Handle<'static>` without a
//! table in scope. The pool is built on first use by whichever thread gets
//! there first; `once_cell::sync::Lazy` guarantees every other thread
//! observes the fully constructed table. It is never dropped.

use crate::error::InternError;
use crate::handle::Handle;
use crate::intern_table::InternTable;
use crate::stats::Stats;
use once_cell::sync::Lazy;

static POOL: Lazy<InternTable> = Lazy::new(InternTable::new);

/// The global table.
pub fn pool() -> &'static InternTable {
    &POOL
}

/// Intern `bytes` in the global pool.
pub fn intern<B>(bytes: &B) -> Result<Handle<'static>, InternError>
where
    B: ?Sized + AsRef<[u8]>,
{
    pool().intern(bytes)
}

/// Probe the global pool without creating an entry.
pub fn lookup<B>(bytes: &B) -> Option<Handle<'static>>
where
    B: ?Sized + AsRef<[u8]>,
{
    pool().lookup(bytes)
}

pub fn snapshot_stats() -> Stats {
    pool().snapshot_stats()
}

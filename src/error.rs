//! Error type returned by interning.

use thiserror::Error;

/// Errors surfaced by [`InternTable::intern`](crate::InternTable::intern).
///
/// Interning is total over finite byte sequences given enough memory, so
/// the only failure is running out of it. Nothing is retried internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum InternError {
    /// Allocating storage for a new entry failed.
    #[error("out of memory while interning a {len}-byte string")]
    OutOfMemory { len: usize },
}

//! InternTable: the sharded, concurrent map from byte strings to entries.

use crate::config::TableConfig;
use crate::error::InternError;
use crate::handle::Handle;
use crate::hashed_view::HashedView;
use crate::shard::Shard;
use crate::stats::Stats;
use core::fmt;
use core::hash::BuildHasher;
use std::collections::hash_map::RandomState;

/// A concurrent interning pool.
///
/// Every distinct byte string interned here gets exactly one entry, which
/// stays at the same address until the table is dropped. Handles borrow
/// the table, so they cannot outlive it.
///
/// ```
/// use shard_intern::InternTable;
///
/// let table = InternTable::new();
/// let h1 = table.intern("foo").unwrap();
/// let h2 = table.intern("foo").unwrap();
/// let h3 = table.intern("bar").unwrap();
/// assert_eq!(h1, h2);
/// assert_ne!(h1, h3);
/// assert_eq!(h1.as_bytes(), b"foo");
/// ```
pub struct InternTable<S = RandomState> {
    hasher: S,
    shards: Box<[Shard]>,
    mask: u64,
    config: TableConfig,
}

impl InternTable {
    pub fn new() -> Self {
        Self::with_config_and_hasher(TableConfig::default(), Default::default())
    }

    pub fn with_config(config: TableConfig) -> Self {
        Self::with_config_and_hasher(config, Default::default())
    }
}

impl Default for InternTable {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: BuildHasher> InternTable<S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_config_and_hasher(TableConfig::default(), hasher)
    }

    pub fn with_config_and_hasher(config: TableConfig, hasher: S) -> Self {
        let config = config.normalized();
        let bits = config.shard_bits();
        let shards: Box<[Shard]> = (0..config.shards)
            .map(|_| {
                Shard::new(
                    bits,
                    config.initial_chunk_capacity,
                    config.max_chunk_capacity,
                )
            })
            .collect();
        tracing::debug!(
            shards = config.shards,
            initial_chunk = config.initial_chunk_capacity,
            max_chunk = config.max_chunk_capacity,
            "intern table created"
        );
        Self {
            hasher,
            shards,
            mask: (config.shards - 1) as u64,
            config,
        }
    }

    /// The normalised configuration this table was built with.
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    #[inline]
    fn shard_for(&self, view: &HashedView<'_>) -> &Shard {
        &self.shards[(view.hash() & self.mask) as usize]
    }

    /// Return the handle for `bytes`, creating its entry if needed.
    ///
    /// Concurrent calls with equal bytes create at most one entry and all
    /// return identity-equal handles.
    pub fn intern<B>(&self, bytes: &B) -> Result<Handle<'_>, InternError>
    where
        B: ?Sized + AsRef<[u8]>,
    {
        let view = HashedView::new(bytes.as_ref(), &self.hasher);
        let entry = self.shard_for(&view).intern(&view)?;
        Ok(Handle::issue(entry))
    }

    /// Format `args` and intern the result.
    ///
    /// Formatting goes through exactly the same path as `intern`; see also
    /// [`intern_format!`](crate::intern_format).
    pub fn intern_fmt(&self, args: fmt::Arguments<'_>) -> Result<Handle<'_>, InternError> {
        match args.as_str() {
            Some(s) => self.intern(s),
            None => self.intern(&args.to_string()),
        }
    }

    /// Non-creating probe: the handle for `bytes` if already interned.
    ///
    /// Takes only the owning shard's read lock and never allocates. That
    /// lock is writer-fair, so a lookup can wait for the duration of one
    /// insert into the same shard when a writer holds or is queued for it.
    /// Lookups in other shards are unaffected.
    pub fn lookup<B>(&self, bytes: &B) -> Option<Handle<'_>>
    where
        B: ?Sized + AsRef<[u8]>,
    {
        let view = HashedView::new(bytes.as_ref(), &self.hasher);
        self.shard_for(&view).lookup(&view).map(Handle::issue)
    }

    /// Whether `bytes` has been interned. Unlike `lookup`, counts nothing.
    pub fn contains<B>(&self, bytes: &B) -> bool
    where
        B: ?Sized + AsRef<[u8]>,
    {
        let view = HashedView::new(bytes.as_ref(), &self.hasher);
        self.shard_for(&view).lookup(&view).is_some()
    }

    /// Number of distinct entries. Approximate while inserts are running.
    pub fn len(&self) -> usize {
        self.shards.iter().map(Shard::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Point-in-time counters. Never takes a shard lock, so values may be
    /// slightly stale or mutually inconsistent under concurrent inserts.
    pub fn snapshot_stats(&self) -> Stats {
        Stats::collect(self.shards.iter().map(Shard::counters))
    }
}

impl<S> fmt::Debug for InternTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InternTable")
            .field("shards", &self.shards.len())
            .field("len", &self.shards.iter().map(Shard::len).sum::<usize>())
            .finish_non_exhaustive()
    }
}

/// Intern a formatted string: `intern_format!(table, "{}-{}", a, b)`.
///
/// Expands to [`InternTable::intern_fmt`] and returns its `Result`.
#[macro_export]
macro_rules! intern_format {
    ($table:expr, $($arg:tt)*) => {
        $table.intern_fmt(::core::format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Clone, Default)]
    struct ConstBuildHasher;
    struct ConstHasher;
    impl BuildHasher for ConstBuildHasher {
        type Hasher = ConstHasher;
        fn build_hasher(&self) -> Self::Hasher {
            ConstHasher
        }
    }
    impl core::hash::Hasher for ConstHasher {
        fn write(&mut self, _bytes: &[u8]) {}
        fn finish(&self) -> u64 {
            0
        } // every key collides, and lands in shard 0
    }

    #[test]
    fn foo_bar_scenario() {
        let t = InternTable::new();
        let h1 = t.intern("foo").unwrap();
        let h2 = t.intern("foo").unwrap();
        let h3 = t.intern("bar").unwrap();
        assert_eq!(h1, h2);
        assert_ne!(h3, h1);
        assert_eq!(h1.as_bytes(), b"foo");
        assert_eq!(t.len(), 2);
    }

    /// Invariant: equal hashes never imply equal values.
    #[test]
    fn full_collisions_stay_distinct() {
        let t = InternTable::with_hasher(ConstBuildHasher);
        let a = t.intern("a").unwrap();
        let b = t.intern("b").unwrap();
        assert_ne!(a, b);
        assert_eq!(a.hash_value(), b.hash_value());
        assert_eq!(t.intern("a").unwrap(), a);
        assert_eq!(t.lookup("b"), Some(b));
        assert_eq!(a.as_bytes(), b"a");
        assert_eq!(b.as_bytes(), b"b");
        let depths = t.snapshot_stats().shard_depths;
        assert_eq!(depths[0], 2);
        assert_eq!(depths.iter().sum::<usize>(), 2);
    }

    #[test]
    fn empty_string_is_a_value() {
        let t = InternTable::new();
        let e1 = t.intern("").unwrap();
        let e2 = t.intern(b"").unwrap();
        assert_eq!(e1, e2);
        assert!(e1.is_empty());
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn lookup_and_contains_never_create() {
        let t = InternTable::new();
        assert!(t.lookup("nope").is_none());
        assert!(!t.contains("nope"));
        assert!(t.is_empty());
        let h = t.intern("yes").unwrap();
        assert_eq!(t.lookup("yes"), Some(h));
        assert!(t.contains(b"yes"));
    }

    #[test]
    fn intern_accepts_str_bytes_and_owned() {
        let t = InternTable::new();
        let owned = String::from("k");
        let v = vec![b'k'];
        let a = t.intern("k").unwrap();
        assert_eq!(t.intern(&owned).unwrap(), a);
        assert_eq!(t.intern(&v).unwrap(), a);
        assert_eq!(t.intern(&[b'k']).unwrap(), a);
    }

    #[test]
    fn formatted_construction_matches_plain_intern() {
        let t = InternTable::new();
        let plain = t.intern("item-7").unwrap();
        let n = 7;
        assert_eq!(crate::intern_format!(t, "item-{}", n).unwrap(), plain);
        assert_eq!(t.intern_fmt(format_args!("item-7")).unwrap(), plain);
        assert_eq!(t.len(), 1);
        // Width and precision go through the runtime formatter, not `as_str`.
        let padded = crate::intern_format!(t, "{:>6}|{:.2}", "ab", 1.5f64).unwrap();
        assert_eq!(padded.to_str(), Ok("    ab|1.50"));
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn distinct_inputs_give_distinct_handles() {
        let t = InternTable::with_config(TableConfig::default().with_shards(4));
        let handles: Vec<_> = (0..500).map(|i| t.intern(&i.to_string()).unwrap()).collect();
        let unique: HashSet<_> = handles.iter().copied().collect();
        assert_eq!(unique.len(), 500);
        assert_eq!(t.len(), 500);
    }

    #[test]
    fn config_is_normalized() {
        let t = InternTable::with_config(TableConfig::default().with_shards(3));
        assert_eq!(t.shard_count(), 4);
        assert_eq!(t.config().shards, 4);
    }

    #[test]
    fn stats_count_requests_and_bytes() {
        let t = InternTable::new();
        t.intern("abc").unwrap();
        t.intern("abc").unwrap();
        t.intern("de").unwrap();
        let s = t.snapshot_stats();
        assert_eq!(s.unique, 2);
        assert_eq!(s.requests, 3);
        assert_eq!(s.total_bytes, 5);
        assert!(s.memory >= s.total_bytes);
    }
}

//! Stats: approximate, lock-free counters for reporting.

use crate::shard::ShardCounters;
use core::fmt;

/// Snapshot of an [`InternTable`](crate::InternTable)'s counters.
///
/// Assembled from per-shard atomics without taking any lock, so a
/// snapshot taken during concurrent inserts may be slightly stale and its
/// fields mutually inconsistent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    /// Distinct entries.
    pub unique: usize,
    /// Calls to `intern`, hits and misses alike.
    pub requests: u64,
    /// Sum of the lengths of all distinct strings.
    pub total_bytes: usize,
    /// Estimated heap bytes: string data, entry headers and index slots.
    pub memory: usize,
    /// Shard lock acquisitions that found the lock already held, including
    /// those of `lookup` and `contains`. An `intern` takes at most two
    /// locks, so an intern-only workload keeps this at most `2 * requests`.
    pub contended: u64,
    /// Entry count per shard, in shard order.
    pub shard_depths: Vec<usize>,
    /// `depth_histogram[k]` counts shards holding `n` entries where
    /// `k == 0` for `n == 0`, else `k == floor(log2(n)) + 1`.
    pub depth_histogram: Vec<usize>,
}

fn depth_bucket(n: usize) -> usize {
    if n == 0 {
        0
    } else {
        (usize::BITS - n.leading_zeros()) as usize
    }
}

impl Stats {
    pub(crate) fn collect(shards: impl Iterator<Item = ShardCounters>) -> Self {
        let mut stats = Stats::default();
        for c in shards {
            stats.unique += c.entries;
            stats.requests += c.requests;
            stats.total_bytes += c.bytes;
            stats.memory += c.bytes + c.overhead;
            stats.contended += c.contended;
            stats.shard_depths.push(c.entries);

            let k = depth_bucket(c.entries);
            if stats.depth_histogram.len() <= k {
                stats.depth_histogram.resize(k + 1, 0);
            }
            stats.depth_histogram[k] += 1;
        }
        stats
    }

    /// Average length of a distinct string, or 0 for an empty table.
    pub fn average_len(&self) -> f64 {
        if self.unique == 0 {
            0.0
        } else {
            self.total_bytes as f64 / self.unique as f64
        }
    }

    pub fn max_shard_depth(&self) -> usize {
        self.shard_depths.iter().copied().max().unwrap_or(0)
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "intern table statistics:")?;
        writeln!(f, "  requests: {}, unique: {}", self.requests, self.unique)?;
        writeln!(
            f,
            "  memory: {:.2} MB ({} bytes of string data, avg len {:.1})",
            self.memory as f64 / (1024.0 * 1024.0),
            self.total_bytes,
            self.average_len()
        )?;
        writeln!(
            f,
            "  shards: {}, deepest: {}, contended locks: {}",
            self.shard_depths.len(),
            self.max_shard_depth(),
            self.contended
        )?;
        write!(f, "  shard depth histogram:")?;
        for (k, count) in self.depth_histogram.iter().enumerate() {
            if *count == 0 {
                continue;
            }
            if k == 0 {
                write!(f, " [0]={}", count)?;
            } else {
                write!(f, " [{}..{})={}", 1usize << (k - 1), 1usize << k, count)?;
            }
        }
        Ok(())
    }
}

//! Table sizing knobs.

/// Upper bound on the shard count.
pub const MAX_SHARDS: usize = 1 << 16;

/// Construction-time configuration for an [`InternTable`](crate::InternTable).
///
/// Values are normalised rather than rejected: the shard count is rounded
/// up to a power of two and clamped to `1..=MAX_SHARDS`, and chunk
/// capacities are raised to at least 1 with `max >= initial`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableConfig {
    /// Number of independently locked shards.
    pub shards: usize,
    /// Capacity of the first arena chunk in each shard.
    pub initial_chunk_capacity: usize,
    /// Chunks double in capacity until they reach this size.
    pub max_chunk_capacity: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            shards: 64,
            initial_chunk_capacity: 64,
            max_chunk_capacity: 4096,
        }
    }
}

impl TableConfig {
    pub fn with_shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }

    pub fn with_initial_chunk_capacity(mut self, cap: usize) -> Self {
        self.initial_chunk_capacity = cap;
        self
    }

    pub fn with_max_chunk_capacity(mut self, cap: usize) -> Self {
        self.max_chunk_capacity = cap;
        self
    }

    pub(crate) fn normalized(self) -> Self {
        let shards = self.shards.clamp(1, MAX_SHARDS).next_power_of_two();
        let initial = self.initial_chunk_capacity.max(1);
        let max = self.max_chunk_capacity.max(initial);
        Self {
            shards,
            initial_chunk_capacity: initial,
            max_chunk_capacity: max,
        }
    }

    /// Number of low hash bits used to pick a shard.
    pub(crate) fn shard_bits(&self) -> u32 {
        self.shards.trailing_zeros()
    }
}

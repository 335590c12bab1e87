//! Pool configuration parameters.

use crate::error::ArenaError;

/// Bytes of bookkeeping charged per pooled chunk (the used-ring links).
pub const CHUNK_HEADER_BYTES: usize = 8;

/// Bytes charged per heap fallback allocation on top of its payload.
pub const HEAP_ENVELOPE_BYTES: usize = 8;

/// Configuration for a [`ChunkPool`](crate::ChunkPool) and the
/// [`ChunksCache`](crate::ChunksCache) wrapping it.
///
/// Validated at construction; all values are immutable after creation.
#[derive(Clone, Debug, PartialEq)]
pub struct PoolConfig {
    /// Payload bytes per chunk.
    ///
    /// Default: 8184, so that a chunk plus its header is 8 KiB.
    pub chunk_bytes: usize,

    /// Total bytes reserved for pooled chunks, headers included.
    ///
    /// Default: 640 chunks of 8 KiB (5 MiB).
    pub buffer_bytes: usize,

    /// Fraction of pooled chunks in use above which the owner should
    /// start evicting. Default: 0.66.
    pub drain_pool_ratio: f32,

    /// Heap fallback usage above `buffer_bytes / drain_heap_divisor`
    /// also requests eviction. Default: 3.
    pub drain_heap_divisor: usize,
}

impl PoolConfig {
    /// Default payload bytes per chunk.
    pub const DEFAULT_CHUNK_BYTES: usize = 8192 - CHUNK_HEADER_BYTES;

    /// Default chunk count.
    pub const DEFAULT_MAX_CHUNKS: usize = 640;

    /// Build a config holding exactly `max_chunks` chunks of `chunk_bytes`.
    pub fn with_chunks(chunk_bytes: usize, max_chunks: usize) -> Self {
        Self {
            chunk_bytes,
            buffer_bytes: max_chunks * (chunk_bytes + CHUNK_HEADER_BYTES),
            ..Self::default()
        }
    }

    /// Number of chunks the buffer can hold.
    pub fn max_chunks(&self) -> usize {
        self.buffer_bytes / (self.chunk_bytes + CHUNK_HEADER_BYTES)
    }

    /// Number of `T` elements that fit in one chunk.
    pub fn chunk_len<T>(&self) -> usize {
        self.chunk_bytes / std::mem::size_of::<T>().max(1)
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.chunk_bytes == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "chunk_bytes must be positive".into(),
            });
        }
        if !(self.drain_pool_ratio > 0.0 && self.drain_pool_ratio <= 1.0) {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "drain_pool_ratio must be in (0, 1], got {}",
                    self.drain_pool_ratio
                ),
            });
        }
        if self.drain_heap_divisor == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "drain_heap_divisor must be positive".into(),
            });
        }
        if self.max_chunks() >= u32::MAX as usize {
            return Err(ArenaError::InvalidConfig {
                reason: format!("{} chunks do not fit u32 indices", self.max_chunks()),
            });
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            chunk_bytes: Self::DEFAULT_CHUNK_BYTES,
            buffer_bytes: Self::DEFAULT_MAX_CHUNKS * (Self::DEFAULT_CHUNK_BYTES + CHUNK_HEADER_BYTES),
            drain_pool_ratio: 0.66,
            drain_heap_divisor: 3,
        }
    }
}

//! Arena-specific error types.

use thiserror::Error;

/// Errors that can occur during pool operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ArenaError {
    /// Every chunk of the pool is in use.
    #[error("chunk pool exhausted: all {capacity} chunks are in use")]
    CapacityExceeded {
        /// Total number of chunks in the pool.
        capacity: usize,
    },
    /// The request is larger than a single chunk.
    #[error("requested {requested} elements, but a chunk holds {chunk_len}")]
    ChunkTooLarge {
        /// Number of elements requested.
        requested: usize,
        /// Elements per chunk.
        chunk_len: usize,
    },
    /// A handle that was already freed, or freed and reallocated.
    #[error("stale chunk handle: index {index}, generation {generation}")]
    StaleHandle {
        /// Chunk or heap slot index.
        index: u32,
        /// Generation encoded in the handle.
        generation: u32,
    },
    /// Pool configuration is invalid.
    #[error("invalid pool config: {reason}")]
    InvalidConfig {
        /// Which constraint was violated.
        reason: String,
    },
}

//! Pooled chunk allocation for routing-cache records.
//!
//! Routing-cache entries are variable-length arrays that are created and
//! evicted many times per simulation tick. This crate keeps that churn off
//! the general heap:
//!
//! ```text
//! ChunksCache<T> (fallback policy)
//! ├── ChunkPool<T>: one contiguous Vec<T>, fixed-size chunks,
//! │   free list (singly linked) + used ring (doubly linked), by index
//! └── heap slab: Box<[T]> per oversized or overflow allocation
//! ```
//!
//! A [`ChunkHandle`] records which side owns an allocation, so freeing
//! never has to guess from an address.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod chunks;
pub mod config;
pub mod error;
pub mod handle;
pub mod pool;

pub use chunks::ChunksCache;
pub use config::PoolConfig;
pub use error::ArenaError;
pub use handle::{ChunkHandle, HeapChunk, PooledChunk};
pub use pool::ChunkPool;

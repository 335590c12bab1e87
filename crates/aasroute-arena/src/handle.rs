//! Chunk handles.
//!
//! A [`ChunkHandle`] names an allocation made by a
//! [`ChunksCache`](crate::ChunksCache). The variant says which allocator
//! owns the memory; the generation lets the pool reject a handle whose
//! chunk has since been freed and handed out again.

use std::fmt;

/// An allocation inside a [`ChunkPool`](crate::ChunkPool).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct PooledChunk {
    pub(crate) index: u32,
    pub(crate) generation: u32,
    pub(crate) len: u32,
}

impl PooledChunk {
    /// Chunk slot within the pool.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Pool generation of the slot when this allocation was made.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Number of elements requested.
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Whether this is a zero-length allocation.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// An allocation that fell back to the general heap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct HeapChunk {
    pub(crate) slot: u32,
    pub(crate) generation: u32,
    pub(crate) len: u32,
}

impl HeapChunk {
    /// Number of elements requested.
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Whether this is a zero-length allocation.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Owner-tagged handle returned by [`ChunksCache::alloc`](crate::ChunksCache::alloc).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub enum ChunkHandle {
    /// Served from the fixed pool.
    Pooled(PooledChunk),
    /// Served from the heap.
    Heap(HeapChunk),
}

impl ChunkHandle {
    /// Number of elements requested.
    pub fn len(&self) -> usize {
        match self {
            Self::Pooled(c) => c.len(),
            Self::Heap(c) => c.len(),
        }
    }

    /// Whether this is a zero-length allocation.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the allocation lives in the fixed pool.
    pub fn is_pooled(&self) -> bool {
        matches!(self, Self::Pooled(_))
    }
}

impl fmt::Display for ChunkHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pooled(c) => write!(
                f,
                "Pooled(idx={}, gen={}, len={})",
                c.index, c.generation, c.len
            ),
            Self::Heap(c) => write!(f, "Heap(slot={}, gen={}, len={})", c.slot, c.generation, c.len),
        }
    }
}

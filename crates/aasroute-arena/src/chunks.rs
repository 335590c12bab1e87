//! Pool-first allocator with heap fallback.

use tracing::debug;

use crate::config::{PoolConfig, HEAP_ENVELOPE_BYTES};
use crate::error::ArenaError;
use crate::handle::{ChunkHandle, HeapChunk};
use crate::pool::ChunkPool;

struct HeapSlot<T> {
    generation: u32,
    data: Option<Box<[T]>>,
}

/// Allocator for routing-cache records.
///
/// Requests that fit a chunk are served from the [`ChunkPool`]; oversized
/// requests, and any request made while the pool is full, go to a heap
/// slab instead. Allocation never fails. Callers watch
/// [`needs_cleanup`](Self::needs_cleanup) and evict records to keep the
/// pool from running dry.
pub struct ChunksCache<T> {
    pool: ChunkPool<T>,
    heap: Vec<HeapSlot<T>>,
    heap_free: Vec<u32>,
    heap_bytes: usize,
    config: PoolConfig,
}

impl<T: Copy + Default> ChunksCache<T> {
    /// Create an allocator from a validated config.
    pub fn new(config: PoolConfig) -> Result<Self, ArenaError> {
        let pool = ChunkPool::new(&config)?;
        Ok(Self {
            pool,
            heap: Vec::new(),
            heap_free: Vec::new(),
            heap_bytes: 0,
            config,
        })
    }

    /// A fresh, empty allocator with the same geometry as `self`.
    pub fn empty_like(&self) -> Self {
        Self {
            pool: ChunkPool::with_capacity(self.pool.chunk_len(), self.pool.capacity()),
            heap: Vec::new(),
            heap_free: Vec::new(),
            heap_bytes: 0,
            config: self.config.clone(),
        }
    }

    /// Allocate `len` zeroed elements.
    pub fn alloc(&mut self, len: usize) -> ChunkHandle {
        match self.pool.alloc(len) {
            Ok(chunk) => ChunkHandle::Pooled(chunk),
            Err(reason) => {
                debug!(len, %reason, "chunk pool fallback to heap");
                ChunkHandle::Heap(self.alloc_heap(len))
            }
        }
    }

    fn alloc_heap(&mut self, len: usize) -> HeapChunk {
        let data = vec![T::default(); len].into_boxed_slice();
        self.heap_bytes += Self::heap_cost(len);
        let slot = match self.heap_free.pop() {
            Some(slot) => {
                self.heap[slot as usize].data = Some(data);
                slot
            }
            None => {
                self.heap.push(HeapSlot {
                    generation: 0,
                    data: Some(data),
                });
                (self.heap.len() - 1) as u32
            }
        };
        HeapChunk {
            slot,
            generation: self.heap[slot as usize].generation,
            len: len as u32,
        }
    }

    fn heap_cost(len: usize) -> usize {
        len * std::mem::size_of::<T>() + HEAP_ENVELOPE_BYTES
    }

    fn heap_slot(&self, chunk: &HeapChunk) -> Option<&HeapSlot<T>> {
        self.heap
            .get(chunk.slot as usize)
            .filter(|s| s.generation == chunk.generation && s.data.is_some())
    }

    /// Release an allocation to whichever side owns it.
    pub fn free(&mut self, handle: ChunkHandle) -> Result<(), ArenaError> {
        match handle {
            ChunkHandle::Pooled(chunk) => self.pool.free(chunk),
            ChunkHandle::Heap(chunk) => {
                if self.heap_slot(&chunk).is_none() {
                    return Err(ArenaError::StaleHandle {
                        index: chunk.slot,
                        generation: chunk.generation,
                    });
                }
                let slot = &mut self.heap[chunk.slot as usize];
                slot.data = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.heap_free.push(chunk.slot);
                self.heap_bytes -= Self::heap_cost(chunk.len());
                Ok(())
            }
        }
    }

    /// Release every allocation, pooled and heap.
    pub fn clear(&mut self) {
        self.pool.clear();
        for (i, slot) in self.heap.iter_mut().enumerate() {
            if slot.data.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.heap_free.push(i as u32);
            }
        }
        self.heap_bytes = 0;
    }

    /// Elements of a live allocation.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is stale.
    pub fn get(&self, handle: &ChunkHandle) -> &[T] {
        match handle {
            ChunkHandle::Pooled(chunk) => self.pool.get(chunk),
            ChunkHandle::Heap(chunk) => match self.heap_slot(chunk).and_then(|s| s.data.as_deref()) {
                Some(data) => data,
                None => panic!("stale heap chunk {chunk:?}"),
            },
        }
    }

    /// Mutable elements of a live allocation.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is stale.
    pub fn get_mut(&mut self, handle: &ChunkHandle) -> &mut [T] {
        match handle {
            ChunkHandle::Pooled(chunk) => self.pool.get_mut(chunk),
            ChunkHandle::Heap(chunk) => {
                let slot = self
                    .heap
                    .get_mut(chunk.slot as usize)
                    .filter(|s| s.generation == chunk.generation);
                match slot.and_then(|s| s.data.as_deref_mut()) {
                    Some(data) => data,
                    None => panic!("stale heap chunk {chunk:?}"),
                }
            }
        }
    }

    /// Whether the owner should evict records before allocating more.
    ///
    /// True when the pool is more than `drain_pool_ratio` full, or heap
    /// fallback exceeds a `drain_heap_divisor` share of the pool buffer.
    pub fn needs_cleanup(&self) -> bool {
        let pool_limit = self.pool.capacity() as f32 * self.config.drain_pool_ratio;
        self.pool.len() as f32 > pool_limit
            || self.heap_bytes > self.config.buffer_bytes / self.config.drain_heap_divisor
    }

    /// Bytes currently held by heap fallback allocations.
    pub fn heap_bytes(&self) -> usize {
        self.heap_bytes
    }

    /// Number of live heap fallback allocations.
    pub fn heap_len(&self) -> usize {
        self.heap.len() - self.heap_free.len()
    }

    /// Number of pooled chunks in use.
    pub fn pooled_len(&self) -> usize {
        self.pool.len()
    }

    /// The underlying pool.
    pub fn pool(&self) -> &ChunkPool<T> {
        &self.pool
    }

    /// The config this allocator was built from.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> ChunksCache<u32> {
        // 4 chunks of 4 u32s.
        ChunksCache::new(PoolConfig::with_chunks(16, 4)).unwrap()
    }

    #[test]
    fn small_requests_are_pooled() {
        let mut cache = small();
        let h = cache.alloc(3);
        assert!(h.is_pooled());
        assert_eq!(cache.get(&h), &[0, 0, 0]);
        assert_eq!(cache.pooled_len(), 1);
        assert_eq!(cache.heap_bytes(), 0);
    }

    #[test]
    fn oversized_request_falls_back_to_heap() {
        let mut cache = small();
        let h = cache.alloc(10);
        assert!(!h.is_pooled());
        assert_eq!(cache.get(&h).len(), 10);
        assert_eq!(cache.heap_bytes(), 10 * 4 + HEAP_ENVELOPE_BYTES);
        cache.free(h).unwrap();
        assert_eq!(cache.heap_bytes(), 0);
        assert_eq!(cache.heap_len(), 0);
    }

    #[test]
    fn full_pool_falls_back_to_heap() {
        let mut cache = small();
        for _ in 0..4 {
            assert!(cache.alloc(4).is_pooled());
        }
        let h = cache.alloc(2);
        assert!(!h.is_pooled());
        assert_eq!(cache.heap_len(), 1);
    }

    #[test]
    fn writes_are_visible_through_either_side() {
        let mut cache = small();
        let pooled = cache.alloc(4);
        let heap = cache.alloc(9);
        cache.get_mut(&pooled).copy_from_slice(&[1, 2, 3, 4]);
        cache.get_mut(&heap)[8] = 42;
        assert_eq!(cache.get(&pooled), &[1, 2, 3, 4]);
        assert_eq!(cache.get(&heap)[8], 42);
    }

    #[test]
    fn heap_slot_reuse_invalidates_old_handle() {
        let mut cache = small();
        let a = cache.alloc(20);
        cache.free(a).unwrap();
        let b = cache.alloc(20);
        assert_ne!(a, b);
        assert!(matches!(cache.free(a), Err(ArenaError::StaleHandle { .. })));
        cache.free(b).unwrap();
    }

    #[test]
    fn needs_cleanup_past_pool_ratio() {
        let mut cache = small();
        // 0.66 * 4 = 2.64, so the third chunk tips it.
        let _ = cache.alloc(1);
        let _ = cache.alloc(1);
        assert!(!cache.needs_cleanup());
        let _ = cache.alloc(1);
        assert!(cache.needs_cleanup());
    }

    #[test]
    fn needs_cleanup_past_heap_share() {
        let mut cache = small();
        // buffer is 4 * 24 = 96 bytes, a third is 32.
        let h = cache.alloc(5);
        assert!(!cache.needs_cleanup());
        let g = cache.alloc(6);
        assert!(cache.needs_cleanup());
        cache.free(h).unwrap();
        cache.free(g).unwrap();
        assert!(!cache.needs_cleanup());
    }

    #[test]
    fn clear_empties_both_sides() {
        let mut cache = small();
        let pooled = cache.alloc(1);
        let heap = cache.alloc(30);
        cache.clear();
        assert_eq!(cache.pooled_len(), 0);
        assert_eq!(cache.heap_len(), 0);
        assert_eq!(cache.heap_bytes(), 0);
        assert!(cache.free(pooled).is_err());
        assert!(cache.free(heap).is_err());
    }

    #[test]
    fn empty_like_keeps_geometry_but_not_contents() {
        let mut cache = small();
        let _ = cache.alloc(2);
        let _ = cache.alloc(40);
        let fresh = cache.empty_like();
        assert_eq!(fresh.pool().capacity(), 4);
        assert_eq!(fresh.pool().chunk_len(), 4);
        assert_eq!(fresh.pooled_len(), 0);
        assert_eq!(fresh.heap_bytes(), 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = PoolConfig {
            drain_heap_divisor: 0,
            ..PoolConfig::default()
        };
        assert!(ChunksCache::<u32>::new(config).is_err());
    }
}

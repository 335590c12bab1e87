//! Fixed-capacity pool of equal-sized chunks.
//!
//! [`ChunkPool`] carves one contiguous buffer into `max_chunks` chunks of
//! `chunk_len` elements. Free chunks form a singly linked list, chunks in
//! use form a doubly linked list, both threaded through a per-chunk link
//! table by index. Allocation and release are O(1).

use crate::config::PoolConfig;
use crate::error::ArenaError;
use crate::handle::PooledChunk;

const NIL: u32 = u32::MAX;

/// Per-chunk bookkeeping.
#[derive(Clone, Copy, Debug)]
struct ChunkLinks {
    prev: u32,
    next: u32,
    generation: u32,
    live: bool,
}

/// Fixed-capacity chunk allocator.
///
/// Every allocation occupies one whole chunk regardless of the requested
/// length; requests longer than [`chunk_len`](Self::chunk_len) are
/// rejected so the caller can fall back elsewhere.
pub struct ChunkPool<T> {
    data: Vec<T>,
    links: Vec<ChunkLinks>,
    chunk_len: usize,
    free_head: u32,
    used_head: u32,
    in_use: usize,
}

impl<T: Copy + Default> ChunkPool<T> {
    /// Create a pool sized from `config`.
    pub fn new(config: &PoolConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        Ok(Self::with_capacity(config.chunk_len::<T>(), config.max_chunks()))
    }

    /// Create a pool of `max_chunks` chunks of `chunk_len` elements each.
    pub fn with_capacity(chunk_len: usize, max_chunks: usize) -> Self {
        let links = (0..max_chunks)
            .map(|i| ChunkLinks {
                prev: NIL,
                next: if i + 1 < max_chunks { (i + 1) as u32 } else { NIL },
                generation: 0,
                live: false,
            })
            .collect();
        Self {
            data: vec![T::default(); chunk_len * max_chunks],
            links,
            chunk_len,
            free_head: if max_chunks > 0 { 0 } else { NIL },
            used_head: NIL,
            in_use: 0,
        }
    }

    /// Take a chunk from the free list and zero its first `len` elements.
    pub fn alloc(&mut self, len: usize) -> Result<PooledChunk, ArenaError> {
        if len > self.chunk_len {
            return Err(ArenaError::ChunkTooLarge {
                requested: len,
                chunk_len: self.chunk_len,
            });
        }
        if self.free_head == NIL {
            return Err(ArenaError::CapacityExceeded {
                capacity: self.capacity(),
            });
        }

        let index = self.free_head;
        let i = index as usize;
        self.free_head = self.links[i].next;

        let old_head = self.used_head;
        self.links[i].prev = NIL;
        self.links[i].next = old_head;
        self.links[i].live = true;
        if old_head != NIL {
            self.links[old_head as usize].prev = index;
        }
        self.used_head = index;
        self.in_use += 1;

        let start = i * self.chunk_len;
        self.data[start..start + len].fill(T::default());

        Ok(PooledChunk {
            index,
            generation: self.links[i].generation,
            len: len as u32,
        })
    }

    /// Return a chunk to the free list.
    ///
    /// Fails with [`ArenaError::StaleHandle`] if the chunk was already
    /// freed, including when it has since been handed out again.
    pub fn free(&mut self, chunk: PooledChunk) -> Result<(), ArenaError> {
        if !self.is_live(&chunk) {
            return Err(ArenaError::StaleHandle {
                index: chunk.index,
                generation: chunk.generation,
            });
        }
        let i = chunk.index as usize;
        let ChunkLinks { prev, next, .. } = self.links[i];
        if prev != NIL {
            self.links[prev as usize].next = next;
        } else {
            self.used_head = next;
        }
        if next != NIL {
            self.links[next as usize].prev = prev;
        }

        let link = &mut self.links[i];
        link.live = false;
        link.generation = link.generation.wrapping_add(1);
        link.prev = NIL;
        link.next = self.free_head;
        self.free_head = chunk.index;
        self.in_use -= 1;
        Ok(())
    }

    /// Release every chunk in use.
    pub fn clear(&mut self) {
        while self.used_head != NIL {
            let index = self.used_head;
            let link = self.links[index as usize];
            let chunk = PooledChunk {
                index,
                generation: link.generation,
                len: 0,
            };
            // The used list only holds live chunks.
            let _ = self.free(chunk);
        }
    }

    /// Whether `chunk` is still the current allocation of its slot.
    pub fn is_live(&self, chunk: &PooledChunk) -> bool {
        self.links
            .get(chunk.index as usize)
            .is_some_and(|l| l.live && l.generation == chunk.generation)
    }

    /// Elements of a live chunk.
    ///
    /// # Panics
    ///
    /// Panics if `chunk` is stale.
    pub fn get(&self, chunk: &PooledChunk) -> &[T] {
        assert!(self.is_live(chunk), "stale pooled chunk {chunk:?}");
        let start = chunk.index as usize * self.chunk_len;
        &self.data[start..start + chunk.len()]
    }

    /// Mutable elements of a live chunk.
    ///
    /// # Panics
    ///
    /// Panics if `chunk` is stale.
    pub fn get_mut(&mut self, chunk: &PooledChunk) -> &mut [T] {
        assert!(self.is_live(chunk), "stale pooled chunk {chunk:?}");
        let start = chunk.index as usize * self.chunk_len;
        &mut self.data[start..start + chunk.len()]
    }

    /// Number of chunks in use.
    pub fn len(&self) -> usize {
        self.in_use
    }

    /// Whether no chunk is in use.
    pub fn is_empty(&self) -> bool {
        self.in_use == 0
    }

    /// Total number of chunks.
    pub fn capacity(&self) -> usize {
        self.links.len()
    }

    /// Whether every chunk is in use.
    pub fn is_full(&self) -> bool {
        self.free_head == NIL
    }

    /// Elements per chunk.
    pub fn chunk_len(&self) -> usize {
        self.chunk_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(max_chunks: usize) -> ChunkPool<u16> {
        ChunkPool::with_capacity(8, max_chunks)
    }

    #[test]
    fn alloc_hands_out_distinct_chunks_until_full() {
        let mut p = pool(3);
        let a = p.alloc(4).unwrap();
        let b = p.alloc(8).unwrap();
        let c = p.alloc(1).unwrap();
        assert_ne!(a.index(), b.index());
        assert_ne!(b.index(), c.index());
        assert!(p.is_full());
        assert_eq!(p.len(), 3);
        assert_eq!(
            p.alloc(1),
            Err(ArenaError::CapacityExceeded { capacity: 3 })
        );
    }

    #[test]
    fn oversized_request_is_rejected() {
        let mut p = pool(2);
        assert_eq!(
            p.alloc(9),
            Err(ArenaError::ChunkTooLarge {
                requested: 9,
                chunk_len: 8
            })
        );
        assert!(p.is_empty());
    }

    #[test]
    fn freed_chunk_is_reused_and_zeroed() {
        let mut p = pool(1);
        let a = p.alloc(8).unwrap();
        p.get_mut(&a).fill(7);
        p.free(a).unwrap();
        let b = p.alloc(8).unwrap();
        assert_eq!(a.index(), b.index());
        assert_ne!(a.generation(), b.generation());
        assert!(p.get(&b).iter().all(|&x| x == 0));
    }

    #[test]
    fn double_free_is_stale() {
        let mut p = pool(2);
        let a = p.alloc(2).unwrap();
        p.free(a).unwrap();
        assert!(matches!(p.free(a), Err(ArenaError::StaleHandle { .. })));
    }

    #[test]
    fn free_of_reallocated_slot_is_stale() {
        let mut p = pool(1);
        let a = p.alloc(2).unwrap();
        p.free(a).unwrap();
        let _b = p.alloc(2).unwrap();
        assert!(!p.is_live(&a));
        assert!(p.free(a).is_err());
        assert_eq!(p.len(), 1);
    }

    #[test]
    fn free_from_middle_of_used_list() {
        let mut p = pool(4);
        let a = p.alloc(1).unwrap();
        let b = p.alloc(1).unwrap();
        let c = p.alloc(1).unwrap();
        p.free(b).unwrap();
        p.free(a).unwrap();
        p.free(c).unwrap();
        assert!(p.is_empty());
        for _ in 0..4 {
            let _ = p.alloc(1).unwrap();
        }
        assert!(p.is_full());
    }

    #[test]
    fn clear_releases_everything() {
        let mut p = pool(3);
        let a = p.alloc(1).unwrap();
        let _ = p.alloc(1).unwrap();
        let _ = p.alloc(1).unwrap();
        p.clear();
        assert!(p.is_empty());
        assert!(!p.is_live(&a));
        assert_eq!(p.capacity(), 3);
    }

    #[test]
    fn chunk_contents_are_isolated() {
        let mut p = pool(2);
        let a = p.alloc(8).unwrap();
        let b = p.alloc(8).unwrap();
        p.get_mut(&a).fill(1);
        p.get_mut(&b).fill(2);
        assert!(p.get(&a).iter().all(|&x| x == 1));
        assert!(p.get(&b).iter().all(|&x| x == 2));
    }

    #[test]
    fn new_sizes_from_config() {
        let config = PoolConfig::with_chunks(32, 5);
        let p = ChunkPool::<u32>::new(&config).unwrap();
        assert_eq!(p.capacity(), 5);
        assert_eq!(p.chunk_len(), 8);
    }

    #[test]
    fn zero_capacity_pool_is_always_full() {
        let mut p = pool(0);
        assert!(p.is_full());
        assert!(p.alloc(1).is_err());
    }

    #[test]
    #[should_panic(expected = "stale pooled chunk")]
    fn get_on_freed_chunk_panics() {
        let mut p = pool(1);
        let a = p.alloc(1).unwrap();
        p.free(a).unwrap();
        let _ = p.get(&a);
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn live_chunks_never_alias(ops in prop::collection::vec(any::<(bool, u8)>(), 1..200)) {
                let mut p = ChunkPool::<u8>::with_capacity(4, 16);
                let mut live: Vec<PooledChunk> = Vec::new();
                for (alloc, pick) in ops {
                    if alloc || live.is_empty() {
                        match p.alloc(4) {
                            Ok(c) => live.push(c),
                            Err(e) => {
                                let full = matches!(e, ArenaError::CapacityExceeded { .. });
                                prop_assert!(full, "unexpected alloc error {:?}", e);
                                prop_assert!(p.is_full());
                            }
                        }
                    } else {
                        let c = live.swap_remove(pick as usize % live.len());
                        prop_assert!(p.free(c).is_ok());
                    }
                    prop_assert_eq!(p.len(), live.len());
                    let mut indices: Vec<u32> = live.iter().map(|c| c.index()).collect();
                    indices.sort_unstable();
                    indices.dedup();
                    prop_assert_eq!(indices.len(), live.len());
                    prop_assert!(live.iter().all(|c| p.is_live(c)));
                }
            }
        }
    }
}

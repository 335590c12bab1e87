//! Memoized query results.
//!
//! A fixed-capacity hash table with LRU replacement. Nodes live in a slab
//! and are linked by index into one bucket chain and one recency list
//! (head = most recent). Failed queries are cached as `None` so repeated
//! unreachable lookups stay cheap.

use aasroute_core::{TravelFlags, Vec3};

use crate::router::Route;

const NIL: u32 = u32::MAX;

/// Full identity of a routing query.
///
/// Field order is comparison order: the origin is checked last, since it
/// is usually absent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ResultKey {
    from: u32,
    to: u32,
    flags: TravelFlags,
    origin: Option<[u32; 3]>,
}

impl ResultKey {
    pub(crate) fn new(from: usize, to: usize, flags: TravelFlags, origin: Option<&Vec3>) -> Self {
        Self {
            from: from as u32,
            to: to as u32,
            flags,
            origin: origin.map(|o| o.map(f32::to_bits)),
        }
    }

    fn hash(&self) -> u32 {
        let mut h: u32 = 17;
        for part in [self.from, self.to, self.flags.bits()] {
            h = h.wrapping_mul(31).wrapping_add(part);
        }
        if let Some(origin) = self.origin {
            for part in origin {
                h = h.wrapping_mul(31).wrapping_add(part);
            }
        }
        h
    }
}

#[derive(Clone, Debug)]
struct Node {
    key: ResultKey,
    bucket: u32,
    value: Option<Route>,
    bucket_prev: u32,
    bucket_next: u32,
    newer: u32,
    older: u32,
}

pub(crate) struct ResultCache {
    nodes: Vec<Node>,
    free: Vec<u32>,
    buckets: Vec<u32>,
    newest: u32,
    oldest: u32,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl ResultCache {
    pub(crate) fn new(capacity: usize, buckets: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            free: Vec::new(),
            buckets: vec![NIL; buckets],
            newest: NIL,
            oldest: NIL,
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    /// An empty cache with the same geometry.
    pub(crate) fn fork(&self) -> Self {
        Self::new(self.capacity, self.buckets.len())
    }

    fn bucket_of(&self, key: &ResultKey) -> u32 {
        key.hash() % self.buckets.len() as u32
    }

    /// `Some(result)` on a hit, which also becomes the most recent entry.
    pub(crate) fn get(&mut self, key: &ResultKey) -> Option<Option<Route>> {
        let mut slot = self.buckets[self.bucket_of(key) as usize];
        while slot != NIL {
            let node = &self.nodes[slot as usize];
            if node.key == *key {
                let value = node.value;
                self.unlink_recency(slot);
                self.link_newest(slot);
                self.hits += 1;
                return Some(value);
            }
            slot = node.bucket_next;
        }
        self.misses += 1;
        None
    }

    /// Record a result, replacing the least recently used one when full.
    pub(crate) fn insert(&mut self, key: ResultKey, value: Option<Route>) {
        let bucket = self.bucket_of(&key);
        let node = Node {
            key,
            bucket,
            value,
            bucket_prev: NIL,
            bucket_next: self.buckets[bucket as usize],
            newer: NIL,
            older: NIL,
        };
        let slot = if let Some(slot) = self.free.pop() {
            self.nodes[slot as usize] = node;
            slot
        } else if self.nodes.len() < self.capacity {
            self.nodes.push(node);
            (self.nodes.len() - 1) as u32
        } else {
            let slot = self.oldest;
            self.unlink_recency(slot);
            self.unlink_bucket(slot);
            // The evicted node may have headed the new node's bucket.
            let node = Node {
                bucket_next: self.buckets[bucket as usize],
                ..node
            };
            self.nodes[slot as usize] = node;
            slot
        };
        let head = self.buckets[bucket as usize];
        if head != NIL {
            self.nodes[head as usize].bucket_prev = slot;
        }
        self.buckets[bucket as usize] = slot;
        self.link_newest(slot);
    }

    fn unlink_bucket(&mut self, slot: u32) {
        let Node {
            bucket,
            bucket_prev,
            bucket_next,
            ..
        } = self.nodes[slot as usize];
        if bucket_prev != NIL {
            self.nodes[bucket_prev as usize].bucket_next = bucket_next;
        } else {
            self.buckets[bucket as usize] = bucket_next;
        }
        if bucket_next != NIL {
            self.nodes[bucket_next as usize].bucket_prev = bucket_prev;
        }
    }

    fn unlink_recency(&mut self, slot: u32) {
        let (newer, older) = {
            let node = &self.nodes[slot as usize];
            (node.newer, node.older)
        };
        if newer != NIL {
            self.nodes[newer as usize].older = older;
        } else {
            self.newest = older;
        }
        if older != NIL {
            self.nodes[older as usize].newer = newer;
        } else {
            self.oldest = newer;
        }
    }

    fn link_newest(&mut self, slot: u32) {
        let newest = self.newest;
        {
            let node = &mut self.nodes[slot as usize];
            node.newer = NIL;
            node.older = newest;
        }
        if newest != NIL {
            self.nodes[newest as usize].newer = slot;
        } else {
            self.oldest = slot;
        }
        self.newest = slot;
    }

    /// Forget every result and return all nodes to the free list. Hit
    /// and miss counters are kept.
    pub(crate) fn clear(&mut self) {
        self.free.clear();
        self.free.extend((0..self.nodes.len() as u32).rev());
        self.buckets.fill(NIL);
        self.newest = NIL;
        self.oldest = NIL;
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    pub(crate) fn hits(&self) -> u64 {
        self.hits
    }

    pub(crate) fn misses(&self) -> u64 {
        self.misses
    }
}

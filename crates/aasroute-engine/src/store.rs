//! Area and portal routing-cache entries.
//!
//! Each entry holds one relaxation result: a travel time and next-hop
//! reachability per destination, rooted at one goal area for one
//! travel-flag mask. Entries live in an index slab and are threaded
//! through two intrusive lists by slot index:
//!
//! - a bucket list, for lookup by root: one list per (cluster, local
//!   area) for area caches, one per area for portal caches;
//! - a global recency list, oldest to newest, for eviction.
//!
//! Cell arrays are allocated from a [`ChunksCache`].

use aasroute_arena::{ChunkHandle, ChunksCache};
use aasroute_core::{AasWorld, AreaCluster, TravelFlags};
use tracing::trace;

const NIL: u32 = u32::MAX;

/// Travel time (0 = unreachable) and next-hop reachability, relative to
/// the first reachability of the area it is stored for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RouteCell {
    /// Cumulative travel time to the root; 0 when unreachable.
    pub travel_time: u16,
    /// Outgoing reachability to take, relative to the area's first one.
    pub reach: u16,
}

/// Which relaxation produced an entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CacheKind {
    /// Travel times to every reachability area of one cluster.
    Area,
    /// Travel times to every portal of the mesh.
    Portal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Bucket {
    Area { cluster: usize, local: usize },
    Portal { area: usize },
}

/// Slot of an entry in the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct EntryId(u32);

#[derive(Clone, Debug)]
struct CacheEntry {
    bucket: Bucket,
    flags: TravelFlags,
    /// Area entries rooted at a portal area are never evicted by age.
    pinned: bool,
    cells: ChunkHandle,
    bucket_prev: u32,
    bucket_next: u32,
    older: u32,
    newer: u32,
}

impl CacheEntry {
    fn kind(&self) -> CacheKind {
        match self.bucket {
            Bucket::Area { .. } => CacheKind::Area,
            Bucket::Portal { .. } => CacheKind::Portal,
        }
    }
}

/// All routing-cache entries of one router instance.
pub(crate) struct RoutingCacheStore {
    entries: Vec<Option<CacheEntry>>,
    free_slots: Vec<u32>,
    area_heads: Vec<Vec<u32>>,
    portal_heads: Vec<u32>,
    oldest: u32,
    newest: u32,
    chunks: ChunksCache<RouteCell>,
    area_entries: usize,
    portal_entries: usize,
}

impl RoutingCacheStore {
    pub(crate) fn new(world: &dyn AasWorld, chunks: ChunksCache<RouteCell>) -> Self {
        Self {
            entries: Vec::new(),
            free_slots: Vec::new(),
            area_heads: world
                .clusters()
                .iter()
                .map(|c| vec![NIL; c.num_areas])
                .collect(),
            portal_heads: vec![NIL; world.num_areas()],
            oldest: NIL,
            newest: NIL,
            chunks,
            area_entries: 0,
            portal_entries: 0,
        }
    }

    /// An empty store with the same shape and pool geometry.
    pub(crate) fn fork(&self) -> Self {
        Self {
            entries: Vec::new(),
            free_slots: Vec::new(),
            area_heads: self.area_heads.iter().map(|h| vec![NIL; h.len()]).collect(),
            portal_heads: vec![NIL; self.portal_heads.len()],
            oldest: NIL,
            newest: NIL,
            chunks: self.chunks.empty_like(),
            area_entries: 0,
            portal_entries: 0,
        }
    }

    fn entry(&self, slot: u32) -> &CacheEntry {
        match &self.entries[slot as usize] {
            Some(entry) => entry,
            None => panic!("routing cache slot {slot} is vacant"),
        }
    }

    fn entry_mut(&mut self, slot: u32) -> &mut CacheEntry {
        match &mut self.entries[slot as usize] {
            Some(entry) => entry,
            None => panic!("routing cache slot {slot} is vacant"),
        }
    }

    fn head(&mut self, bucket: Bucket) -> &mut u32 {
        match bucket {
            Bucket::Area { cluster, local } => &mut self.area_heads[cluster][local],
            Bucket::Portal { area } => &mut self.portal_heads[area],
        }
    }

    fn find(&self, bucket: Bucket, flags: TravelFlags) -> Option<EntryId> {
        let mut slot = match bucket {
            Bucket::Area { cluster, local } => self.area_heads[cluster][local],
            Bucket::Portal { area } => self.portal_heads[area],
        };
        while slot != NIL {
            let entry = self.entry(slot);
            if entry.flags == flags {
                return Some(EntryId(slot));
            }
            slot = entry.bucket_next;
        }
        None
    }

    /// Area cache of `cluster` rooted at the area with local index `local`.
    pub(crate) fn find_area(&self, cluster: usize, local: usize, flags: TravelFlags) -> Option<EntryId> {
        self.find(Bucket::Area { cluster, local }, flags)
    }

    /// Portal cache rooted at `area`.
    pub(crate) fn find_portal(&self, area: usize, flags: TravelFlags) -> Option<EntryId> {
        self.find(Bucket::Portal { area }, flags)
    }

    pub(crate) fn insert_area(
        &mut self,
        cluster: usize,
        local: usize,
        root_is_portal: bool,
        flags: TravelFlags,
        cells: &[RouteCell],
    ) -> EntryId {
        self.area_entries += 1;
        self.insert(Bucket::Area { cluster, local }, root_is_portal, flags, cells)
    }

    pub(crate) fn insert_portal(&mut self, area: usize, flags: TravelFlags, cells: &[RouteCell]) -> EntryId {
        self.portal_entries += 1;
        self.insert(Bucket::Portal { area }, false, flags, cells)
    }

    fn insert(&mut self, bucket: Bucket, pinned: bool, flags: TravelFlags, cells: &[RouteCell]) -> EntryId {
        let handle = self.chunks.alloc(cells.len());
        self.chunks.get_mut(&handle).copy_from_slice(cells);

        let head = *self.head(bucket);
        let entry = CacheEntry {
            bucket,
            flags,
            pinned,
            cells: handle,
            bucket_prev: NIL,
            bucket_next: head,
            older: NIL,
            newer: NIL,
        };
        let slot = match self.free_slots.pop() {
            Some(slot) => {
                self.entries[slot as usize] = Some(entry);
                slot
            }
            None => {
                self.entries.push(Some(entry));
                (self.entries.len() - 1) as u32
            }
        };
        if head != NIL {
            self.entry_mut(head).bucket_prev = slot;
        }
        *self.head(bucket) = slot;
        self.link_newest(slot);
        EntryId(slot)
    }

    /// Cells of a live entry.
    pub(crate) fn cells(&self, id: EntryId) -> &[RouteCell] {
        self.chunks.get(&self.entry(id.0).cells)
    }

    /// Mark an entry as most recently used.
    pub(crate) fn touch(&mut self, id: EntryId) {
        if self.newest != id.0 {
            self.unlink_recency(id.0);
            self.link_newest(id.0);
        }
    }

    fn link_newest(&mut self, slot: u32) {
        let newest = self.newest;
        {
            let entry = self.entry_mut(slot);
            entry.older = newest;
            entry.newer = NIL;
        }
        if newest != NIL {
            self.entry_mut(newest).newer = slot;
        } else {
            self.oldest = slot;
        }
        self.newest = slot;
    }

    fn unlink_recency(&mut self, slot: u32) {
        let (older, newer) = {
            let entry = self.entry(slot);
            (entry.older, entry.newer)
        };
        if older != NIL {
            self.entry_mut(older).newer = newer;
        } else {
            self.oldest = newer;
        }
        if newer != NIL {
            self.entry_mut(newer).older = older;
        } else {
            self.newest = older;
        }
    }

    fn remove(&mut self, slot: u32) {
        self.unlink_recency(slot);
        let (bucket, prev, next) = {
            let entry = self.entry(slot);
            (entry.bucket, entry.bucket_prev, entry.bucket_next)
        };
        if prev != NIL {
            self.entry_mut(prev).bucket_next = next;
        } else {
            *self.head(bucket) = next;
        }
        if next != NIL {
            self.entry_mut(next).bucket_prev = prev;
        }

        if let Some(entry) = self.entries[slot as usize].take() {
            let freed = self.chunks.free(entry.cells);
            debug_assert!(freed.is_ok(), "routing cache entry held a stale chunk");
            match entry.kind() {
                CacheKind::Area => self.area_entries -= 1,
                CacheKind::Portal => self.portal_entries -= 1,
            }
        }
        self.free_slots.push(slot);
    }

    /// Evict the least recently used entry that may be evicted by age.
    ///
    /// Returns `false` when nothing is evictable.
    pub(crate) fn free_oldest(&mut self) -> bool {
        let mut slot = self.oldest;
        while slot != NIL {
            let entry = self.entry(slot);
            if entry.kind() == CacheKind::Area && entry.pinned {
                slot = entry.newer;
                continue;
            }
            trace!(slot, kind = ?entry.kind(), "evicting routing cache entry");
            self.remove(slot);
            return true;
        }
        false
    }

    /// Drop every area cache of `cluster`.
    pub(crate) fn remove_cluster(&mut self, cluster: usize) {
        for local in 0..self.area_heads[cluster].len() {
            while self.area_heads[cluster][local] != NIL {
                let slot = self.area_heads[cluster][local];
                self.remove(slot);
            }
        }
    }

    /// Drop every portal cache.
    pub(crate) fn remove_all_portals(&mut self) {
        for area in 0..self.portal_heads.len() {
            while self.portal_heads[area] != NIL {
                let slot = self.portal_heads[area];
                self.remove(slot);
            }
        }
    }

    /// Drop every entry.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.free_slots.clear();
        for heads in &mut self.area_heads {
            heads.fill(NIL);
        }
        self.portal_heads.fill(NIL);
        self.oldest = NIL;
        self.newest = NIL;
        self.chunks.clear();
        self.area_entries = 0;
        self.portal_entries = 0;
    }

    pub(crate) fn needs_cleanup(&self) -> bool {
        self.chunks.needs_cleanup()
    }

    pub(crate) fn area_entries(&self) -> usize {
        self.area_entries
    }

    pub(crate) fn portal_entries(&self) -> usize {
        self.portal_entries
    }

    pub(crate) fn pooled_chunks(&self) -> usize {
        self.chunks.pooled_len()
    }

    pub(crate) fn heap_bytes(&self) -> usize {
        self.chunks.heap_bytes()
    }

    /// Entry slots from oldest to newest.
    #[cfg(test)]
    fn recency(&self) -> Vec<u32> {
        let mut out = Vec::new();
        let mut slot = self.oldest;
        while slot != NIL {
            out.push(slot);
            slot = self.entry(slot).newer;
        }
        out
    }
}

/// Whether `area` is itself a cluster portal.
pub(crate) fn is_portal_area(world: &dyn AasWorld, area: usize) -> bool {
    matches!(world.cluster_of(area), AreaCluster::Portal(_))
}

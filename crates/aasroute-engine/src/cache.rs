//! The per-agent routing facade.

use std::sync::Arc;

use smallvec::SmallVec;
use tracing::debug;

use aasroute_arena::ChunksCache;
use aasroute_core::{AasWorld, AreaCluster, RouteError, TravelFlags};

use crate::config::{ConfigError, RouteConfig};
use crate::dijkstra::Scratch;
use crate::result_cache::{ResultCache, ResultKey};
use crate::router::{Route, RouteRequest, Router};
use crate::status::AreaStatus;
use crate::store::RoutingCacheStore;
use crate::tables::SharedTables;
use crate::zones::DisabledZoneRequest;

/// Counters describing what a [`RouteCache`] currently holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RouteCacheStats {
    /// Live area routing caches.
    pub area_entries: usize,
    /// Live portal routing caches.
    pub portal_entries: usize,
    /// Pool chunks in use.
    pub pooled_chunks: usize,
    /// Bytes held by heap fallback allocations.
    pub heap_bytes: usize,
    /// Queries answered from the result cache.
    pub result_hits: u64,
    /// Queries that had to be routed.
    pub result_misses: u64,
    /// Memoized results currently held.
    pub result_entries: usize,
}

/// Routing state of one agent (or of the shared instance).
///
/// Owns its caches, its disabled-area table, and its memoized results.
/// The navigation mesh and the precomputed [`SharedTables`] are shared
/// with every other instance of the same
/// [`RouteContext`](crate::RouteContext).
///
/// Area ids passed to any method must lie in `[1, num_areas)`; anything
/// else is a caller bug and panics. Use [`check_area`](Self::check_area)
/// to validate untrusted ids first.
pub struct RouteCache {
    world: Arc<dyn AasWorld>,
    tables: Arc<SharedTables>,
    status: AreaStatus,
    store: RoutingCacheStore,
    results: ResultCache,
    scratch: Scratch,
    zone_areas: Vec<usize>,
    changed_areas: Vec<usize>,
}

impl RouteCache {
    pub(crate) fn new(
        world: Arc<dyn AasWorld>,
        tables: Arc<SharedTables>,
        config: &RouteConfig,
    ) -> Result<Self, ConfigError> {
        let chunks = ChunksCache::new(config.pool.clone())?;
        Ok(Self {
            status: AreaStatus::new(&*world),
            store: RoutingCacheStore::new(&*world, chunks),
            results: ResultCache::new(config.result_cache_capacity, config.result_cache_buckets),
            scratch: Scratch::default(),
            zone_areas: Vec::new(),
            changed_areas: Vec::new(),
            world,
            tables,
        })
    }

    /// A fresh instance over the same mesh and tables, with empty caches
    /// and no disabled areas.
    pub(crate) fn fork(&self) -> Self {
        Self {
            world: Arc::clone(&self.world),
            tables: Arc::clone(&self.tables),
            status: AreaStatus::new(&*self.world),
            store: self.store.fork(),
            results: self.results.fork(),
            scratch: Scratch::default(),
            zone_areas: Vec::new(),
            changed_areas: Vec::new(),
        }
    }

    fn router(&mut self) -> Router<'_> {
        Router {
            world: &*self.world,
            tables: &self.tables,
            status: &self.status,
            store: &mut self.store,
            scratch: &mut self.scratch,
        }
    }

    /// The navigation mesh.
    pub fn world(&self) -> &Arc<dyn AasWorld> {
        &self.world
    }

    /// The precomputed tables shared with every sibling instance.
    pub fn tables(&self) -> &Arc<SharedTables> {
        &self.tables
    }

    /// Check that `area` is a valid area id.
    pub fn check_area(&self, area: usize) -> Result<(), RouteError> {
        let num_areas = self.world.num_areas();
        if area == 0 || area >= num_areas {
            return Err(RouteError::AreaOutOfRange { area, num_areas });
        }
        Ok(())
    }

    fn assert_area(&self, area: usize) {
        if let Err(err) = self.check_area(area) {
            panic!("{err}");
        }
    }

    /// Route `request.from` to `request.to`, or `None` if no allowed
    /// path exists.
    ///
    /// Results are memoized per (from, to, flags, origin) until the set
    /// of blocked areas changes.
    ///
    /// # Panics
    ///
    /// Panics if either area id is out of range.
    pub fn route(&mut self, request: &RouteRequest) -> Option<Route> {
        let RouteRequest {
            from,
            to,
            travel_flags,
            ..
        } = *request;
        self.assert_area(from);
        self.assert_area(to);

        let mut flags = travel_flags;
        if self.world.area_do_not_enter(from) || self.world.area_do_not_enter(to) {
            flags |= TravelFlags::DO_NOT_ENTER;
        }
        let origin = request.origin.as_ref();
        let key = ResultKey::new(from, to, flags, origin);
        if let Some(result) = self.results.get(&key) {
            return result;
        }

        while self.store.needs_cleanup() && self.store.free_oldest() {}
        let result = self.router().route_to_goal_area(from, origin, to, flags);
        self.results.insert(key, result);
        result
    }

    /// First reachability towards `to`; 0 when unreachable or already there.
    pub fn reachability_to_goal_area(&mut self, from: usize, to: usize, flags: TravelFlags) -> usize {
        self.route(&RouteRequest::new(from, to, flags))
            .map_or(0, |route| route.reach_num)
    }

    /// Travel time to `to`; 0 when unreachable.
    pub fn travel_time_to_goal_area(&mut self, from: usize, to: usize, flags: TravelFlags) -> u32 {
        self.route(&RouteRequest::new(from, to, flags))
            .map_or(0, |route| route.travel_time)
    }

    /// Both the first reachability and the travel time.
    pub fn reach_and_travel_time_to_goal_area(
        &mut self,
        from: usize,
        to: usize,
        flags: TravelFlags,
    ) -> Option<Route> {
        self.route(&RouteRequest::new(from, to, flags))
    }

    /// Whether `area` is blocked, temporarily or permanently.
    pub fn area_disabled(&self, area: usize) -> bool {
        self.assert_area(area);
        self.status.area_disabled(area)
    }

    /// Whether `area` is blocked by the current disabled zones.
    pub fn area_temporarily_disabled(&self, area: usize) -> bool {
        self.assert_area(area);
        self.status.temporarily_disabled(area)
    }

    /// Replace the set of temporarily blocked areas.
    ///
    /// Only caches that may cross an area whose status changed are
    /// dropped. Out-of-range ids in a request are ignored.
    pub fn set_disabled_zones(&mut self, requests: &[DisabledZoneRequest]) {
        self.zone_areas.clear();
        for request in requests {
            request.fill(&*self.world, &mut self.zone_areas);
        }
        self.status.begin_update();
        for &area in &self.zone_areas {
            self.status.disable(area);
        }

        let mut changed = std::mem::take(&mut self.changed_areas);
        changed.clear();
        self.status.changed_areas(&mut changed);
        if !changed.is_empty() {
            debug!(
                disabled = self.zone_areas.len(),
                changed = changed.len(),
                "disabled zones updated"
            );
            self.invalidate(&changed);
        }
        self.changed_areas = changed;
    }

    /// Unblock every temporarily blocked area.
    pub fn clear_disabled_zones(&mut self) {
        self.set_disabled_zones(&[]);
    }

    /// Set or clear this instance's permanent block on `area`. Returns
    /// whether the area was enabled before.
    pub fn set_area_enabled(&mut self, area: usize, enabled: bool) -> bool {
        self.assert_area(area);
        let was_enabled = self.status.set_enabled(area, enabled);
        if was_enabled != enabled {
            self.invalidate(&[area]);
        }
        was_enabled
    }

    /// Drop the area caches of every cluster touching `areas`, all portal
    /// caches, and every memoized result.
    fn invalidate(&mut self, areas: &[usize]) {
        let mut clusters: SmallVec<[usize; 16]> = SmallVec::new();
        for &area in areas {
            match self.world.cluster_of(area) {
                AreaCluster::Cluster(c) => clusters.push(c),
                AreaCluster::Portal(p) => {
                    let portal = &self.world.portals()[p];
                    clusters.push(portal.front_cluster);
                    clusters.push(portal.back_cluster);
                }
            }
        }
        clusters.sort_unstable();
        clusters.dedup();
        for cluster in clusters {
            self.store.remove_cluster(cluster);
        }
        self.store.remove_all_portals();
        self.results.clear();
    }

    /// Drop every routing cache and memoized result. Later queries
    /// recompute identical answers.
    pub fn purge_routing_caches(&mut self) {
        self.store.clear();
        self.results.clear();
    }

    /// Current cache occupancy and result-cache counters.
    pub fn stats(&self) -> RouteCacheStats {
        RouteCacheStats {
            area_entries: self.store.area_entries(),
            portal_entries: self.store.portal_entries(),
            pooled_chunks: self.store.pooled_chunks(),
            heap_bytes: self.store.heap_bytes(),
            result_hits: self.results.hits(),
            result_misses: self.results.misses(),
            result_entries: self.results.len(),
        }
    }
}

impl std::fmt::Debug for RouteCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteCache")
            .field("num_areas", &self.world.num_areas())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

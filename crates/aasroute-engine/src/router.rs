//! Top-level area-to-area routing over the two cache levels.
//!
//! A query whose endpoints share a cluster is answered by one area cache
//! rooted at the goal. Otherwise the goal's portal cache gives the time
//! from every portal to the goal, and the start area fans out over the
//! portals of its own cluster.

use std::mem;

use aasroute_core::{AasWorld, AreaCluster, TravelFlags, Vec3};

use crate::dijkstra::{
    relax_area_cache, saturate, PortalNode, PortalScratch, Scratch, START_TRAVEL_TIME,
};
use crate::status::AreaStatus;
use crate::store::{is_portal_area, EntryId, RoutingCacheStore};
use crate::tables::{area_travel_time, SharedTables};

/// A routing query.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteRequest {
    /// Start area.
    pub from: usize,
    /// Exact start point inside `from`, if known. Adds the time from
    /// this point to the first edge.
    pub origin: Option<Vec3>,
    /// Goal area.
    pub to: usize,
    /// Movement capabilities and terrain the agent may use.
    pub travel_flags: TravelFlags,
}

impl RouteRequest {
    /// A query without an exact origin.
    pub fn new(from: usize, to: usize, travel_flags: TravelFlags) -> Self {
        Self {
            from,
            origin: None,
            to,
            travel_flags,
        }
    }

    /// Attach an exact start point.
    pub fn with_origin(mut self, origin: Vec3) -> Self {
        self.origin = Some(origin);
        self
    }
}

/// A found route: the first edge to take and the total travel time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Route {
    /// Reachability to take out of the start area; 0 when already there.
    pub reach_num: usize,
    /// Estimated travel time to the goal, at least 1.
    pub travel_time: u32,
}

/// Borrowed view of one instance's state for the duration of a query.
pub(crate) struct Router<'a> {
    pub(crate) world: &'a dyn AasWorld,
    pub(crate) tables: &'a SharedTables,
    pub(crate) status: &'a AreaStatus,
    pub(crate) store: &'a mut RoutingCacheStore,
    pub(crate) scratch: &'a mut Scratch,
}

impl Router<'_> {
    /// Find or build the area cache of `cluster` rooted at `goal`.
    pub(crate) fn area_cache(&mut self, cluster: usize, goal: usize, flags: TravelFlags) -> EntryId {
        let local = self.world.cluster_area_num(cluster, goal);
        if let Some(id) = self.store.find_area(cluster, local, flags) {
            self.store.touch(id);
            return id;
        }
        relax_area_cache(
            self.world,
            self.tables,
            self.status,
            cluster,
            goal,
            flags,
            &mut self.scratch.area,
        );
        let pinned = is_portal_area(self.world, goal);
        self.store
            .insert_area(cluster, local, pinned, flags, &self.scratch.area.cells)
    }

    /// Find or build the portal cache rooted at `goal`, searched from
    /// `cluster`.
    pub(crate) fn portal_cache(&mut self, cluster: usize, goal: usize, flags: TravelFlags) -> EntryId {
        if let Some(id) = self.store.find_portal(goal, flags) {
            self.store.touch(id);
            return id;
        }
        let mut scratch = mem::take(&mut self.scratch.portal);
        self.relax_portal_cache(cluster, goal, flags, &mut scratch);
        let id = self.store.insert_portal(goal, flags, &scratch.cells);
        self.scratch.portal = scratch;
        id
    }

    /// Portal-level search. Node `p` is portal `p`; the goal takes the
    /// extra slot `num_portals`. A node's cost is its time to the goal
    /// plus the bound for crossing its own portal area.
    fn relax_portal_cache(
        &mut self,
        cluster: usize,
        goal: usize,
        flags: TravelFlags,
        scratch: &mut PortalScratch,
    ) {
        let world = self.world;
        let num_portals = world.num_portals();
        scratch.cells.clear();
        scratch.cells.resize(num_portals, Default::default());
        scratch.nodes.clear();
        scratch.nodes.resize(num_portals + 1, PortalNode::default());
        scratch.frontier.reset(num_portals + 1);

        scratch.nodes[num_portals] = PortalNode {
            cluster,
            area: goal,
        };
        scratch.frontier.relax(num_portals, START_TRAVEL_TIME);
        // A goal portal is searched out of both clusters it borders.
        if let AreaCluster::Portal(p) = world.cluster_of(goal) {
            scratch.cells[p].travel_time = START_TRAVEL_TIME as u16;
            scratch.nodes[p] = PortalNode {
                cluster: world.portals()[p].other_cluster(cluster),
                area: goal,
            };
            scratch.frontier.relax(p, START_TRAVEL_TIME);
        }

        while let Some((index, cost)) = scratch.frontier.pop() {
            let node = scratch.nodes[index];
            let cache = self.area_cache(node.cluster, node.area, flags);
            let info = world.clusters()[node.cluster];
            let portals = &world.portal_index()[info.first_portal..info.first_portal + info.num_portals];
            for &portal_num in portals {
                let portal = world.portals()[portal_num];
                if portal.area_num == node.area || portal.area_num == goal {
                    continue;
                }
                let local = world.cluster_area_num(node.cluster, portal.area_num);
                if local >= info.num_reachability_areas {
                    continue;
                }
                let cell = self.store.cells(cache)[local];
                if cell.travel_time == 0 {
                    continue;
                }
                let t = cost + cell.travel_time as u32;
                let exit = t + self.tables.portal_max_travel_time(portal_num) as u32;
                if scratch.frontier.relax(portal_num, exit) {
                    scratch.cells[portal_num].travel_time = saturate(t);
                    scratch.cells[portal_num].reach = cell.reach;
                    scratch.nodes[portal_num] = PortalNode {
                        cluster: portal.other_cluster(node.cluster),
                        area: portal.area_num,
                    };
                }
            }
        }
    }

    /// Route from `from` to `to`. Area ids must be valid and `flags`
    /// already promoted.
    pub(crate) fn route_to_goal_area(
        &mut self,
        from: usize,
        origin: Option<&Vec3>,
        to: usize,
        flags: TravelFlags,
    ) -> Option<Route> {
        if from == to {
            return Some(Route {
                reach_num: 0,
                travel_time: START_TRAVEL_TIME,
            });
        }
        let world = self.world;
        let from_cluster = world.cluster_of(from);
        let goal_cluster = world.cluster_of(to);

        // A portal counts as part of either cluster it borders.
        let shared = match (from_cluster, goal_cluster) {
            (AreaCluster::Cluster(a), AreaCluster::Cluster(b)) if a == b => Some(a),
            (AreaCluster::Portal(p), AreaCluster::Cluster(b)) if world.portals()[p].borders(b) => Some(b),
            (AreaCluster::Cluster(a), AreaCluster::Portal(p)) if world.portals()[p].borders(a) => Some(a),
            _ => None,
        };
        if let Some(cluster) = shared {
            let cache = self.area_cache(cluster, to, flags);
            let local = world.cluster_area_num(cluster, from);
            if local >= world.clusters()[cluster].num_reachability_areas {
                return None;
            }
            let cell = self.store.cells(cache)[local];
            if cell.travel_time != 0 {
                let reach_num = world.area_settings()[from].first_reachable_area + cell.reach as usize;
                let mut travel_time = cell.travel_time as u32;
                if let Some(origin) = origin {
                    let start = &world.reachabilities()[reach_num].start;
                    travel_time += area_travel_time(world, from, origin, start) as u32;
                }
                return Some(Route {
                    reach_num,
                    travel_time,
                });
            }
        }

        let goal_side = match goal_cluster {
            AreaCluster::Cluster(c) => c,
            AreaCluster::Portal(p) => world.portals()[p].front_cluster,
        };
        let portal_cache = self.portal_cache(goal_side, to, flags);
        let first_reach = world.area_settings()[from].first_reachable_area;

        let cluster = match from_cluster {
            AreaCluster::Portal(p) => {
                let cell = self.store.cells(portal_cache)[p];
                if cell.travel_time == 0 {
                    return None;
                }
                return Some(Route {
                    reach_num: first_reach + cell.reach as usize,
                    travel_time: cell.travel_time as u32,
                });
            }
            AreaCluster::Cluster(c) => c,
        };

        let info = world.clusters()[cluster];
        let local = world.cluster_area_num(cluster, from);
        if local >= info.num_reachability_areas {
            return None;
        }
        let mut best: Option<Route> = None;
        let portals = &world.portal_index()[info.first_portal..info.first_portal + info.num_portals];
        for &portal_num in portals {
            let to_goal = self.store.cells(portal_cache)[portal_num].travel_time;
            if to_goal == 0 {
                continue;
            }
            let portal_area = world.portals()[portal_num].area_num;
            let area_cache = self.area_cache(cluster, portal_area, flags);
            let cell = self.store.cells(area_cache)[local];
            if cell.travel_time == 0 {
                continue;
            }
            let reach_num = first_reach + cell.reach as usize;
            let mut travel_time = to_goal as u32
                + cell.travel_time as u32
                + self.tables.portal_max_travel_time(portal_num) as u32;
            if let Some(origin) = origin {
                let start = &world.reachabilities()[reach_num].start;
                travel_time += area_travel_time(world, from, origin, start) as u32;
            }
            if best.map_or(true, |b| travel_time < b.travel_time) {
                best = Some(Route {
                    reach_num,
                    travel_time,
                });
            }
        }
        best
    }
}

//! Reverse single-root shortest-path relaxation.
//!
//! Both routing caches are filled by the same search shape: start at the
//! goal, walk incoming edges backwards, and record for every node the
//! cheapest time to the goal plus the edge that achieves it. Nodes are
//! colored unreached / labeled / scanned; a node is scanned once, when it
//! leaves the heap with its final cost.
//!
//! Relaxation is strictly-less, so of two equally cheap paths the one
//! labeled first wins. Node costs are kept as `u32` while searching and
//! saturated into the `u16` cells on write.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use aasroute_core::{AasWorld, AreaCluster, TravelFlags};

use crate::status::AreaStatus;
use crate::store::RouteCell;
use crate::tables::SharedTables;

/// Cost of standing on the goal. 0 is reserved for "unreachable".
pub(crate) const START_TRAVEL_TIME: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Label {
    Unreached,
    Labeled,
    Scanned,
}

/// Node colors, best costs, and the min-heap of labeled nodes.
#[derive(Debug, Default)]
pub(crate) struct Frontier {
    labels: Vec<Label>,
    costs: Vec<u32>,
    heap: BinaryHeap<Reverse<(u32, u32)>>,
}

impl Frontier {
    /// Forget the previous search and size for `len` nodes.
    pub(crate) fn reset(&mut self, len: usize) {
        self.labels.clear();
        self.labels.resize(len, Label::Unreached);
        self.costs.clear();
        self.costs.resize(len, 0);
        self.heap.clear();
    }

    /// Label `node` with `cost` if that is strictly cheaper than its
    /// current label. Scanned nodes are final.
    pub(crate) fn relax(&mut self, node: usize, cost: u32) -> bool {
        match self.labels[node] {
            Label::Scanned => false,
            Label::Labeled if self.costs[node] <= cost => false,
            _ => {
                self.labels[node] = Label::Labeled;
                self.costs[node] = cost;
                self.heap.push(Reverse((cost, node as u32)));
                true
            }
        }
    }

    /// Cheapest labeled node, now scanned. Stale heap entries are skipped.
    pub(crate) fn pop(&mut self) -> Option<(usize, u32)> {
        while let Some(Reverse((cost, node))) = self.heap.pop() {
            let node = node as usize;
            if self.labels[node] == Label::Labeled && self.costs[node] == cost {
                self.labels[node] = Label::Scanned;
                return Some((node, cost));
            }
        }
        None
    }
}

pub(crate) fn saturate(time: u32) -> u16 {
    time.min(u16::MAX as u32) as u16
}

#[derive(Clone, Copy, Debug, Default)]
struct AreaNode {
    area: usize,
    /// Outgoing reachability (relative) the area leaves through; `None`
    /// for the goal itself.
    link: Option<usize>,
}

/// Reusable buffers for area-cache relaxation.
#[derive(Debug, Default)]
pub(crate) struct AreaScratch {
    frontier: Frontier,
    nodes: Vec<AreaNode>,
    pub(crate) cells: Vec<RouteCell>,
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct PortalNode {
    pub(crate) cluster: usize,
    pub(crate) area: usize,
}

/// Reusable buffers for portal-cache relaxation.
#[derive(Debug, Default)]
pub(crate) struct PortalScratch {
    pub(crate) frontier: Frontier,
    pub(crate) nodes: Vec<PortalNode>,
    pub(crate) cells: Vec<RouteCell>,
}

/// Per-instance search buffers, reused across queries.
#[derive(Debug, Default)]
pub(crate) struct Scratch {
    pub(crate) area: AreaScratch,
    pub(crate) portal: PortalScratch,
}

/// Fill `scratch.cells` with the travel time from every reachability
/// area of `cluster` to `goal` and the first edge to take.
///
/// Cells are indexed by cluster-local area number. The goal is searched
/// from even when it has no outgoing reachabilities (and so no cell of
/// its own); it then occupies an extra node slot past the last cell.
pub(crate) fn relax_area_cache(
    world: &dyn AasWorld,
    tables: &SharedTables,
    status: &AreaStatus,
    cluster: usize,
    goal: usize,
    flags: TravelFlags,
    scratch: &mut AreaScratch,
) {
    let n = world.clusters()[cluster].num_reachability_areas;
    let settings = world.area_settings();
    let reaches = world.reachabilities();
    let bad = !flags;

    scratch.cells.clear();
    scratch.cells.resize(n, RouteCell::default());
    scratch.nodes.clear();
    scratch.nodes.resize(n + 1, AreaNode::default());
    scratch.frontier.reset(n + 1);

    let goal_local = world.cluster_area_num(cluster, goal);
    let root = if goal_local < n {
        scratch.cells[goal_local].travel_time = START_TRAVEL_TIME as u16;
        goal_local
    } else {
        n
    };
    scratch.nodes[root] = AreaNode {
        area: goal,
        link: None,
    };
    scratch.frontier.relax(root, START_TRAVEL_TIME);

    while let Some((index, cost)) = scratch.frontier.pop() {
        let node = scratch.nodes[index];
        // Every incoming edge enters this area.
        if status.area_disabled(node.area) || tables.area_contents_flags(node.area).intersects(bad) {
            continue;
        }
        let row = match node.link {
            Some(l) => tables.area_travel_row(node.area, l),
            None => &[],
        };
        for (i, link) in tables.reversed_links(node.area).iter().enumerate() {
            let reach = link.reach();
            if tables.reach_travel_flags(reach).intersects(bad) {
                continue;
            }
            let next = link.area();
            match world.cluster_of(next) {
                AreaCluster::Cluster(c) if c != cluster => continue,
                AreaCluster::Portal(p) if !world.portals()[p].borders(cluster) => continue,
                _ => {}
            }
            let local = world.cluster_area_num(cluster, next);
            if local >= n {
                continue;
            }
            let through = row.get(i).copied().unwrap_or(0) as u32;
            let t = cost + through + reaches[reach].travel_time as u32;
            if scratch.frontier.relax(local, t) {
                let out = reach - settings[next].first_reachable_area;
                scratch.cells[local] = RouteCell {
                    travel_time: saturate(t),
                    reach: out as u16,
                };
                scratch.nodes[local] = AreaNode {
                    area: next,
                    link: Some(out),
                };
            }
        }
    }
}

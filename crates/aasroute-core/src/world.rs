//! Read-only navigation-mesh records and the [`AasWorld`] trait.
//!
//! The router never builds or mutates the mesh. It reads it through
//! [`AasWorld`], which a host engine implements over its loaded AAS data.

use smallvec::SmallVec;

use crate::error::RouteError;
use crate::flags::{area_contents, area_flags, presence};
use crate::math::Vec3;

/// Geometric extent of an area.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Area {
    /// Lower corner of the bounding box.
    pub mins: Vec3,
    /// Upper corner of the bounding box.
    pub maxs: Vec3,
    /// Representative centre point.
    pub center: Vec3,
}

/// Routing-relevant settings of an area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AreaSettings {
    /// [`area_contents`] bits.
    pub contents: u32,
    /// [`area_flags`] bits.
    pub area_flags: u32,
    /// [`presence`] bits.
    pub presence_type: u32,
    /// Owning cluster if positive; `-portal` if the area is a cluster portal.
    pub cluster: i32,
    /// Index of the area within its cluster (unused for portal areas).
    pub cluster_area_num: usize,
    /// Number of outgoing reachabilities.
    pub num_reachable_areas: usize,
    /// Index of the first outgoing reachability.
    pub first_reachable_area: usize,
}

/// Whether an area belongs to a cluster or is itself a portal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AreaCluster {
    /// Area inside the given cluster.
    Cluster(usize),
    /// Area acting as the given portal.
    Portal(usize),
}

impl AreaSettings {
    /// Decode the signed cluster field.
    pub fn area_cluster(&self) -> AreaCluster {
        if self.cluster > 0 {
            AreaCluster::Cluster(self.cluster as usize)
        } else {
            AreaCluster::Portal(self.cluster.unsigned_abs() as usize)
        }
    }

    /// Index range of the outgoing reachabilities.
    pub fn reachability_range(&self) -> std::ops::Range<usize> {
        self.first_reachable_area..self.first_reachable_area + self.num_reachable_areas
    }
}

/// A directed traversable edge between two areas.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Reachability {
    /// Destination area.
    pub area_num: usize,
    /// Start point of the movement (inside the source area).
    pub start: Vec3,
    /// End point of the movement (inside the destination area).
    pub end: Vec3,
    /// Raw travel type: type id plus team-exclusion bits.
    pub travel_type: u32,
    /// Intrinsic cost of the movement itself.
    pub travel_time: u16,
}

/// Boundary area joining two clusters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Portal {
    /// Area acting as the portal volume.
    pub area_num: usize,
    /// Cluster on the front side.
    pub front_cluster: usize,
    /// Cluster on the back side.
    pub back_cluster: usize,
    /// Local index of the portal area in the front and back cluster.
    pub cluster_area_num: [usize; 2],
}

impl Portal {
    /// The cluster across the portal from `cluster`.
    pub fn other_cluster(&self, cluster: usize) -> usize {
        if self.front_cluster == cluster {
            self.back_cluster
        } else {
            self.front_cluster
        }
    }

    /// Whether the portal borders `cluster`.
    pub fn borders(&self, cluster: usize) -> bool {
        self.front_cluster == cluster || self.back_cluster == cluster
    }
}

/// A routing locality of mutually connected areas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cluster {
    /// Number of areas, portal areas included.
    pub num_areas: usize,
    /// Number of areas with reachabilities; they occupy local indices
    /// `0..num_reachability_areas`.
    pub num_reachability_areas: usize,
    /// Number of portals bordering the cluster.
    pub num_portals: usize,
    /// First entry of this cluster in the portal index.
    pub first_portal: usize,
}

/// Read-only access to a loaded navigation mesh.
///
/// Every table has a dummy entry at index 0. Implementations must be
/// immutable for as long as any router holds them.
pub trait AasWorld: Send + Sync {
    /// Area geometry.
    fn areas(&self) -> &[Area];

    /// Area settings, parallel to [`areas`](Self::areas).
    fn area_settings(&self) -> &[AreaSettings];

    /// All reachabilities, grouped by source area.
    fn reachabilities(&self) -> &[Reachability];

    /// All cluster portals.
    fn portals(&self) -> &[Portal];

    /// Portal numbers listed per cluster (see [`Cluster::first_portal`]).
    fn portal_index(&self) -> &[usize];

    /// All clusters.
    fn clusters(&self) -> &[Cluster];

    /// Areas crossed by the segment `start..end`, in order, at most `max_areas`.
    fn trace_areas(&self, start: &Vec3, end: &Vec3, max_areas: usize) -> SmallVec<[usize; 32]>;

    /// Areas whose bounds intersect the box `[mins, maxs]`, at most `max_areas`.
    fn bbox_areas(&self, mins: &Vec3, maxs: &Vec3, max_areas: usize) -> Vec<usize>;

    /// Number of areas, the dummy area included.
    fn num_areas(&self) -> usize {
        self.area_settings().len()
    }

    /// Number of portals, the dummy portal included.
    fn num_portals(&self) -> usize {
        self.portals().len()
    }

    /// Number of clusters, the dummy cluster included.
    fn num_clusters(&self) -> usize {
        self.clusters().len()
    }

    /// Number of reachabilities, the dummy reachability included.
    fn num_reachabilities(&self) -> usize {
        self.reachabilities().len()
    }

    /// Cluster membership of an area.
    fn cluster_of(&self, area: usize) -> AreaCluster {
        self.area_settings()[area].area_cluster()
    }

    /// Local index of `area` within `cluster`.
    ///
    /// A portal area has one local index per side; the back side is used
    /// unless `cluster` is the portal's front cluster.
    fn cluster_area_num(&self, cluster: usize, area: usize) -> usize {
        let settings = &self.area_settings()[area];
        match settings.area_cluster() {
            AreaCluster::Cluster(_) => settings.cluster_area_num,
            AreaCluster::Portal(portal) => {
                let portal = &self.portals()[portal];
                let side = usize::from(portal.front_cluster != cluster);
                portal.cluster_area_num[side]
            }
        }
    }

    /// Whether an agent can only be present in the area while crouching.
    fn area_crouch(&self, area: usize) -> bool {
        self.area_settings()[area].presence_type & presence::NORMAL == 0
    }

    /// Whether the area is filled with liquid.
    fn area_swim(&self, area: usize) -> bool {
        self.area_settings()[area].area_flags & area_flags::LIQUID != 0
    }

    /// Whether the area is marked do-not-enter.
    fn area_do_not_enter(&self, area: usize) -> bool {
        self.area_settings()[area].contents & area_contents::DO_NOT_ENTER != 0
    }

    /// Check that every area's cluster field is consistent with the
    /// portal table.
    fn validate_clusters(&self) -> Result<(), RouteError> {
        let num_portals = self.num_portals();
        for (area, settings) in self.area_settings().iter().enumerate().skip(1) {
            if let AreaCluster::Portal(portal) = settings.area_cluster() {
                if portal == 0 || portal >= num_portals {
                    return Err(RouteError::UnknownPortal { area, portal });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_cluster_decodes_as_portal() {
        let settings = AreaSettings {
            cluster: -3,
            ..Default::default()
        };
        assert_eq!(settings.area_cluster(), AreaCluster::Portal(3));
        let settings = AreaSettings {
            cluster: 2,
            ..Default::default()
        };
        assert_eq!(settings.area_cluster(), AreaCluster::Cluster(2));
    }

    #[test]
    fn other_cluster_crosses_the_portal() {
        let portal = Portal {
            area_num: 7,
            front_cluster: 1,
            back_cluster: 2,
            cluster_area_num: [3, 0],
        };
        assert_eq!(portal.other_cluster(1), 2);
        assert_eq!(portal.other_cluster(2), 1);
        assert!(portal.borders(2));
        assert!(!portal.borders(3));
    }

    #[test]
    fn reachability_range_spans_outgoing_edges() {
        let settings = AreaSettings {
            first_reachable_area: 4,
            num_reachable_areas: 3,
            ..Default::default()
        };
        assert_eq!(settings.reachability_range(), 4..7);
    }
}

//! Programmatic navigation-mesh construction.

use indexmap::IndexMap;
use smallvec::SmallVec;

use aasroute_core::math::{box_contains, boxes_intersect};
use aasroute_core::{
    area_contents, area_flags, presence, AasWorld, Area, AreaSettings, Cluster, Portal,
    Reachability, TravelType, Vec3,
};

#[derive(Clone, Copy, Debug)]
enum Home {
    Cluster(usize),
    Portal(usize),
}

#[derive(Clone, Debug)]
struct AreaSpec {
    home: Home,
    center: Vec3,
    contents: u32,
    area_flags: u32,
    presence: u32,
}

#[derive(Clone, Copy, Debug)]
struct PortalSpec {
    area: usize,
    front: usize,
    back: usize,
}

#[derive(Clone, Copy, Debug)]
struct ReachSpec {
    from: usize,
    to: usize,
    travel_type: u32,
    time: u16,
}

/// Builder for small AAS-shaped meshes.
///
/// Area ids are handed out from 1 in creation order. Reachabilities keep
/// their insertion order within each source area. Each area is a cube of
/// `2 * half_extent` around its centre.
///
/// ```ignore
/// let mut b = NavMeshBuilder::new();
/// let a = b.area(1, [0.0, 0.0, 0.0]);
/// let c = b.area(1, [64.0, 0.0, 0.0]);
/// b.walk(a, c, 10);
/// let world = b.build();
/// ```
#[derive(Clone, Debug)]
pub struct NavMeshBuilder {
    areas: Vec<AreaSpec>,
    portals: Vec<PortalSpec>,
    reaches: Vec<ReachSpec>,
    half_extent: f32,
}

impl NavMeshBuilder {
    pub fn new() -> Self {
        Self {
            areas: Vec::new(),
            portals: Vec::new(),
            reaches: Vec::new(),
            half_extent: 16.0,
        }
    }

    /// Half the edge length of every area cube. Default: 16.
    pub fn half_extent(&mut self, half_extent: f32) -> &mut Self {
        self.half_extent = half_extent;
        self
    }

    /// Add an ordinary area to `cluster` (1-based) and return its id.
    pub fn area(&mut self, cluster: usize, center: Vec3) -> usize {
        assert!(cluster > 0, "cluster ids start at 1");
        self.push_area(Home::Cluster(cluster), center, 0)
    }

    /// Add a portal area joining `front` and `back` and return its area id.
    pub fn portal(&mut self, front: usize, back: usize, center: Vec3) -> usize {
        assert!(front > 0 && back > 0 && front != back, "portal needs two clusters");
        let portal = self.portals.len() + 1;
        let area = self.push_area(Home::Portal(portal), center, area_contents::CLUSTER_PORTAL);
        self.portals.push(PortalSpec { area, front, back });
        area
    }

    fn push_area(&mut self, home: Home, center: Vec3, contents: u32) -> usize {
        self.areas.push(AreaSpec {
            home,
            center,
            contents,
            area_flags: area_flags::GROUNDED,
            presence: presence::NORMAL | presence::CROUCH,
        });
        self.areas.len()
    }

    /// Add a one-way edge.
    pub fn reach(&mut self, from: usize, to: usize, travel_type: TravelType, time: u16) -> &mut Self {
        self.reach_raw(from, to, travel_type.raw(), time)
    }

    /// Add a one-way edge with a raw travel type (team bits allowed).
    pub fn reach_raw(&mut self, from: usize, to: usize, travel_type: u32, time: u16) -> &mut Self {
        assert!(from >= 1 && from <= self.areas.len(), "unknown area {from}");
        assert!(to >= 1 && to <= self.areas.len(), "unknown area {to}");
        self.reaches.push(ReachSpec {
            from,
            to,
            travel_type,
            time,
        });
        self
    }

    /// Add walk edges in both directions.
    pub fn walk(&mut self, a: usize, b: usize, time: u16) -> &mut Self {
        self.reach(a, b, TravelType::Walk, time);
        self.reach(b, a, TravelType::Walk, time)
    }

    /// OR contents bits into an area.
    pub fn contents(&mut self, area: usize, bits: u32) -> &mut Self {
        self.areas[area - 1].contents |= bits;
        self
    }

    /// OR area-flag bits into an area.
    pub fn area_flags(&mut self, area: usize, bits: u32) -> &mut Self {
        self.areas[area - 1].area_flags |= bits;
        self
    }

    /// Replace the presence bits of an area.
    pub fn presence(&mut self, area: usize, bits: u32) -> &mut Self {
        self.areas[area - 1].presence = bits;
        self
    }

    /// Number of areas added so far.
    pub fn num_areas(&self) -> usize {
        self.areas.len()
    }

    pub fn build(&self) -> MockAasWorld {
        let num_areas = self.areas.len() + 1;
        let half = self.half_extent;

        let mut areas = vec![Area::default()];
        for spec in &self.areas {
            let c = spec.center;
            areas.push(Area {
                mins: [c[0] - half, c[1] - half, c[2] - half],
                maxs: [c[0] + half, c[1] + half, c[2] + half],
                center: c,
            });
        }

        // Reachabilities grouped by source area.
        let mut settings = vec![AreaSettings::default(); num_areas];
        let mut reachabilities = vec![Reachability::default()];
        for (area, spec) in self.areas.iter().enumerate().map(|(i, s)| (i + 1, s)) {
            let first = reachabilities.len();
            for r in self.reaches.iter().filter(|r| r.from == area) {
                let from = areas[r.from].center;
                let to = areas[r.to].center;
                reachabilities.push(Reachability {
                    area_num: r.to,
                    start: lerp(&from, &to, 0.45),
                    end: lerp(&from, &to, 0.55),
                    travel_type: r.travel_type,
                    travel_time: r.time,
                });
            }
            settings[area] = AreaSettings {
                contents: spec.contents,
                area_flags: spec.area_flags,
                presence_type: spec.presence,
                cluster: match spec.home {
                    Home::Cluster(c) => c as i32,
                    Home::Portal(p) => -(p as i32),
                },
                cluster_area_num: 0,
                num_reachable_areas: reachabilities.len() - first,
                first_reachable_area: first,
            };
        }

        let max_cluster = self
            .areas
            .iter()
            .map(|a| match a.home {
                Home::Cluster(c) => c,
                Home::Portal(_) => 0,
            })
            .chain(self.portals.iter().flat_map(|p| [p.front, p.back]))
            .max()
            .unwrap_or(0);

        let mut members: IndexMap<usize, Vec<usize>> =
            (1..=max_cluster).map(|c| (c, Vec::new())).collect();
        for (i, spec) in self.areas.iter().enumerate() {
            if let Home::Cluster(c) = spec.home {
                members[&c].push(i + 1);
            }
        }
        for p in &self.portals {
            members[&p.front].push(p.area);
            members[&p.back].push(p.area);
        }

        let mut portals = vec![Portal::default()];
        for p in &self.portals {
            portals.push(Portal {
                area_num: p.area,
                front_cluster: p.front,
                back_cluster: p.back,
                cluster_area_num: [0, 0],
            });
        }

        let mut clusters = vec![Cluster::default()];
        let mut portal_index = Vec::new();
        for (&cluster, list) in members.iter_mut() {
            // Areas with reachabilities take the low local indices.
            list.sort_by_key(|&a| settings[a].num_reachable_areas == 0);
            for (local, &area) in list.iter().enumerate() {
                match self.areas[area - 1].home {
                    Home::Cluster(_) => settings[area].cluster_area_num = local,
                    Home::Portal(p) => {
                        let side = usize::from(portals[p].front_cluster != cluster);
                        portals[p].cluster_area_num[side] = local;
                    }
                }
            }
            let first_portal = portal_index.len();
            portal_index.extend(
                (1..portals.len()).filter(|&p| portals[p].borders(cluster)),
            );
            clusters.push(Cluster {
                num_areas: list.len(),
                num_reachability_areas: list
                    .iter()
                    .filter(|&&a| settings[a].num_reachable_areas > 0)
                    .count(),
                num_portals: portal_index.len() - first_portal,
                first_portal,
            });
        }

        MockAasWorld {
            areas,
            area_settings: settings,
            reachabilities,
            portals,
            portal_index,
            clusters,
        }
    }
}

impl Default for NavMeshBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn lerp(a: &Vec3, b: &Vec3, t: f32) -> Vec3 {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

/// In-memory [`AasWorld`] produced by [`NavMeshBuilder`].
#[derive(Clone, Debug)]
pub struct MockAasWorld {
    areas: Vec<Area>,
    area_settings: Vec<AreaSettings>,
    reachabilities: Vec<Reachability>,
    portals: Vec<Portal>,
    portal_index: Vec<usize>,
    clusters: Vec<Cluster>,
}

impl MockAasWorld {
    /// Id of the first reachability leading from `from` to `to`.
    pub fn reach_between(&self, from: usize, to: usize) -> Option<usize> {
        self.area_settings[from]
            .reachability_range()
            .find(|&r| self.reachabilities[r].area_num == to)
    }

    /// Mutable settings, for tests that corrupt the mesh on purpose.
    pub fn area_settings_mut(&mut self) -> &mut [AreaSettings] {
        &mut self.area_settings
    }
}

impl AasWorld for MockAasWorld {
    fn areas(&self) -> &[Area] {
        &self.areas
    }

    fn area_settings(&self) -> &[AreaSettings] {
        &self.area_settings
    }

    fn reachabilities(&self) -> &[Reachability] {
        &self.reachabilities
    }

    fn portals(&self) -> &[Portal] {
        &self.portals
    }

    fn portal_index(&self) -> &[usize] {
        &self.portal_index
    }

    fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    fn trace_areas(&self, start: &Vec3, end: &Vec3, max_areas: usize) -> SmallVec<[usize; 32]> {
        const STEPS: usize = 64;
        let mut out = SmallVec::new();
        for step in 0..=STEPS {
            if out.len() >= max_areas {
                break;
            }
            let p = lerp(start, end, step as f32 / STEPS as f32);
            let hit = (1..self.areas.len())
                .find(|&a| box_contains(&self.areas[a].mins, &self.areas[a].maxs, &p));
            if let Some(area) = hit {
                if !out.contains(&area) {
                    out.push(area);
                }
            }
        }
        out
    }

    fn bbox_areas(&self, mins: &Vec3, maxs: &Vec3, max_areas: usize) -> Vec<usize> {
        (1..self.areas.len())
            .filter(|&a| boxes_intersect(mins, maxs, &self.areas[a].mins, &self.areas[a].maxs))
            .take(max_areas)
            .collect()
    }
}

//! Precomputed routing tables shared by every router instance.
//!
//! [`SharedTables`] is built once per navigation mesh and then only read.
//! Instances hold it through an `Arc`, so forking a per-agent router never
//! repeats the precomputation.
//!
//! All ragged tables are stored flat with an offset array (CSR layout):
//!
//! ```text
//! reversed links   rev_offsets[area]..rev_offsets[area + 1]
//! travel times     time_offsets[area] + l * num_links(area) + n
//! crossed areas    pass_offsets[reach]..pass_offsets[reach + 1]
//! ```

use aasroute_core::math::distance;
use aasroute_core::{
    area_contents, area_flags, travel_flag_for_type, travel_flag_table, AasWorld, TravelFlags,
    TravelType, Vec3, MAX_TRAVEL_TYPES,
};
use tracing::{info, warn};

use crate::config::RouteConfig;

const FACTOR_CROUCH: f32 = 1.3;
const FACTOR_SWIM: f32 = 1.0;
const FACTOR_WALK: f32 = 0.16;

/// An incoming edge of an area.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReversedLink {
    reach: u32,
    area: u32,
}

impl ReversedLink {
    /// Reachability id of the edge.
    pub fn reach(&self) -> usize {
        self.reach as usize
    }

    /// Area the edge starts from.
    pub fn area(&self) -> usize {
        self.area as usize
    }
}

/// Time to cross `area` from `start` to `end`, in routing time units.
///
/// Scaled by how the agent moves through the area; never less than 1.
pub fn area_travel_time(world: &dyn AasWorld, area: usize, start: &Vec3, end: &Vec3) -> u16 {
    let factor = if world.area_crouch(area) {
        FACTOR_CROUCH
    } else if world.area_swim(area) {
        FACTOR_SWIM
    } else {
        FACTOR_WALK
    };
    let time = (distance(start, end) * factor) as u32;
    time.clamp(1, u16::MAX as u32) as u16
}

/// Read-only tables derived from a navigation mesh.
pub struct SharedTables {
    type_flags: [TravelFlags; MAX_TRAVEL_TYPES],
    reach_flags: Vec<TravelFlags>,
    contents_flags: Vec<TravelFlags>,
    rev_offsets: Vec<u32>,
    rev_links: Vec<ReversedLink>,
    time_offsets: Vec<u32>,
    travel_times: Vec<u16>,
    portal_max_times: Vec<u16>,
    pass_offsets: Vec<u32>,
    pass_areas: Vec<u32>,
}

impl SharedTables {
    /// Precompute every table for `world`.
    pub fn build(world: &dyn AasWorld, config: &RouteConfig) -> Self {
        let type_flags = travel_flag_table();
        let reach_flags = world
            .reachabilities()
            .iter()
            .map(|r| travel_flag_for_type(&type_flags, r.travel_type))
            .collect();
        let contents_flags = (0..world.num_areas())
            .map(|area| contents_travel_flags(world, area))
            .collect();

        let (rev_offsets, rev_links) = reversed_reachability(world, config);
        let mut tables = Self {
            type_flags,
            reach_flags,
            contents_flags,
            rev_offsets,
            rev_links,
            time_offsets: Vec::new(),
            travel_times: Vec::new(),
            portal_max_times: Vec::new(),
            pass_offsets: Vec::new(),
            pass_areas: Vec::new(),
        };
        tables.compute_area_travel_times(world);
        tables.compute_portal_max_travel_times(world);
        tables.compute_reachability_areas(world, config.max_reachability_pass_areas);

        info!(
            areas = world.num_areas(),
            portals = world.num_portals(),
            reachabilities = world.num_reachabilities(),
            "shared routing tables built"
        );
        tables
    }

    fn compute_area_travel_times(&mut self, world: &dyn AasWorld) {
        let reaches = world.reachabilities();
        self.time_offsets = Vec::with_capacity(world.num_areas());
        for (area, settings) in world.area_settings().iter().enumerate() {
            self.time_offsets.push(self.travel_times.len() as u32);
            let links = self.rev_offsets[area] as usize..self.rev_offsets[area + 1] as usize;
            for out in settings.reachability_range() {
                let leave = &reaches[out].start;
                for link in &self.rev_links[links.clone()] {
                    let enter = &reaches[link.reach()].end;
                    self.travel_times
                        .push(area_travel_time(world, area, enter, leave));
                }
            }
        }
    }

    fn compute_portal_max_travel_times(&mut self, world: &dyn AasWorld) {
        self.portal_max_times = world
            .portals()
            .iter()
            .map(|portal| {
                let area = portal.area_num;
                let settings = &world.area_settings()[area];
                (0..settings.num_reachable_areas)
                    .flat_map(|l| self.area_travel_row(area, l).iter().copied())
                    .max()
                    .unwrap_or(0)
            })
            .collect();
    }

    fn compute_reachability_areas(&mut self, world: &dyn AasWorld, max_areas: usize) {
        self.pass_offsets = Vec::with_capacity(world.num_reachabilities() + 1);
        for reach in world.reachabilities() {
            self.pass_offsets.push(self.pass_areas.len() as u32);
            let (start, end) = match TravelType::from_raw(reach.travel_type) {
                Some(TravelType::BarrierJump | TravelType::WaterJump) => {
                    (reach.start, [reach.start[0], reach.start[1], reach.end[2]])
                }
                Some(TravelType::WalkOffLedge) => {
                    ([reach.end[0], reach.end[1], reach.start[2]], reach.end)
                }
                Some(TravelType::GrappleHook) => (reach.start, reach.end),
                _ => continue,
            };
            let crossed = world.trace_areas(&start, &end, max_areas);
            self.pass_areas
                .extend(crossed.iter().take(max_areas).map(|&a| a as u32));
        }
        self.pass_offsets.push(self.pass_areas.len() as u32);
    }

    /// Travel flags of a raw reachability travel type.
    pub fn travel_flag_for_type(&self, raw: u32) -> TravelFlags {
        travel_flag_for_type(&self.type_flags, raw)
    }

    /// Travel flags a query must allow to use reachability `reach`.
    pub fn reach_travel_flags(&self, reach: usize) -> TravelFlags {
        self.reach_flags[reach]
    }

    /// Travel flags a query must allow to enter `area`.
    pub fn area_contents_flags(&self, area: usize) -> TravelFlags {
        self.contents_flags[area]
    }

    /// Incoming edges of `area`.
    pub fn reversed_links(&self, area: usize) -> &[ReversedLink] {
        &self.rev_links[self.rev_offsets[area] as usize..self.rev_offsets[area + 1] as usize]
    }

    /// Times to cross `area` when leaving through its `l`-th outgoing
    /// reachability, one entry per incoming edge in
    /// [`reversed_links`](Self::reversed_links) order.
    pub fn area_travel_row(&self, area: usize, l: usize) -> &[u16] {
        let n = self.reversed_links(area).len();
        let start = self.time_offsets[area] as usize + l * n;
        &self.travel_times[start..start + n]
    }

    /// Upper bound on the time to cross the area of `portal`.
    pub fn portal_max_travel_time(&self, portal: usize) -> u16 {
        self.portal_max_times[portal]
    }

    /// Areas crossed while traversing reachability `reach`.
    pub fn reachability_areas(&self, reach: usize) -> &[u32] {
        &self.pass_areas[self.pass_offsets[reach] as usize..self.pass_offsets[reach + 1] as usize]
    }

    /// Number of areas the tables were built for, dummy included.
    pub fn num_areas(&self) -> usize {
        self.contents_flags.len()
    }
}

fn contents_travel_flags(world: &dyn AasWorld, area: usize) -> TravelFlags {
    let settings = &world.area_settings()[area];
    let contents = settings.contents;
    let mut flags = if contents & area_contents::WATER != 0 {
        TravelFlags::WATER
    } else if contents & area_contents::SLIME != 0 {
        TravelFlags::SLIME
    } else if contents & area_contents::LAVA != 0 {
        TravelFlags::LAVA
    } else {
        TravelFlags::empty()
    };
    if contents & area_contents::DO_NOT_ENTER != 0 {
        flags |= TravelFlags::DO_NOT_ENTER;
    }
    if contents & area_contents::NOT_TEAM1 != 0 {
        flags |= TravelFlags::NOT_TEAM1;
    }
    if contents & area_contents::NOT_TEAM2 != 0 {
        flags |= TravelFlags::NOT_TEAM2;
    }
    if settings.area_flags & area_flags::BRIDGE != 0 {
        flags |= TravelFlags::BRIDGE;
    }
    flags
}

fn reversed_reachability(world: &dyn AasWorld, config: &RouteConfig) -> (Vec<u32>, Vec<ReversedLink>) {
    let num_areas = world.num_areas();
    let reaches = world.reachabilities();
    let mut counts = vec![0u32; num_areas + 1];
    for (area, settings) in world.area_settings().iter().enumerate().skip(1) {
        if settings.num_reachable_areas > config.max_area_reachabilities {
            warn!(
                area,
                reachabilities = settings.num_reachable_areas,
                limit = config.max_area_reachabilities,
                "area has too many outgoing reachabilities"
            );
        }
        for r in settings.reachability_range() {
            counts[reaches[r].area_num] += 1;
        }
    }

    let mut offsets = Vec::with_capacity(num_areas + 1);
    let mut total = 0u32;
    for &count in &counts[..num_areas] {
        offsets.push(total);
        total += count;
    }
    offsets.push(total);

    let mut cursor: Vec<u32> = offsets[..num_areas].to_vec();
    let mut links = vec![ReversedLink { reach: 0, area: 0 }; total as usize];
    for (area, settings) in world.area_settings().iter().enumerate().skip(1) {
        for r in settings.reachability_range() {
            let to = reaches[r].area_num;
            links[cursor[to] as usize] = ReversedLink {
                reach: r as u32,
                area: area as u32,
            };
            cursor[to] += 1;
        }
    }
    (offsets, links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aasroute_core::presence;
    use aasroute_test_utils::fixtures::{line_of_three, SPACING};
    use aasroute_test_utils::NavMeshBuilder;

    fn build(world: &dyn AasWorld) -> SharedTables {
        SharedTables::build(world, &RouteConfig::default())
    }

    #[test]
    fn reversed_links_invert_forward_edges() {
        let world = line_of_three();
        let tables = build(&world);
        let into_2: Vec<(usize, usize)> = tables
            .reversed_links(2)
            .iter()
            .map(|l| (l.area(), l.reach()))
            .collect();
        assert_eq!(
            into_2,
            vec![
                (1, world.reach_between(1, 2).unwrap()),
                (3, world.reach_between(3, 2).unwrap()),
            ]
        );
        assert!(tables.reversed_links(0).is_empty());
        assert_eq!(tables.reversed_links(1).len(), 1);
    }

    #[test]
    fn travel_row_measures_distance_through_the_area() {
        let world = line_of_three();
        let tables = build(&world);
        // Leaving 2 towards 3 after entering from 1: 0.55 -> 1.45 spacings.
        let out_to_3 = world.reach_between(2, 3).unwrap() - world.area_settings()[2].first_reachable_area;
        let row = tables.area_travel_row(2, out_to_3);
        assert_eq!(row.len(), 2);
        assert_eq!(row[0], (0.9 * SPACING * FACTOR_WALK) as u16);
        // Entering from 3 and leaving back to 3 is a short hop, never 0.
        assert!(row[1] >= 1);
    }

    #[test]
    fn crouch_areas_are_slower() {
        let mut b = NavMeshBuilder::new();
        let a = b.area(1, [0.0, 0.0, 0.0]);
        let c = b.area(1, [64.0, 0.0, 0.0]);
        b.presence(c, presence::CROUCH);
        b.walk(a, c, 10);
        let world = b.build();
        let start = [0.0, 0.0, 0.0];
        let end = [100.0, 0.0, 0.0];
        assert!((15..=16).contains(&area_travel_time(&world, a, &start, &end)));
        assert!((129..=130).contains(&area_travel_time(&world, c, &start, &end)));
        assert_eq!(area_travel_time(&world, a, &start, &start), 1);
    }

    #[test]
    fn portal_max_is_the_largest_crossing() {
        let world = aasroute_test_utils::fixtures::two_clusters();
        let tables = build(&world);
        let portal_area = world.portals()[1].area_num;
        let expected = (0..world.area_settings()[portal_area].num_reachable_areas)
            .flat_map(|l| tables.area_travel_row(portal_area, l).to_vec())
            .max()
            .unwrap();
        assert_eq!(tables.portal_max_travel_time(1), expected);
        assert_eq!(tables.portal_max_travel_time(0), 0);
    }

    #[test]
    fn contents_map_to_travel_flags() {
        let mut b = NavMeshBuilder::new();
        let dry = b.area(1, [0.0, 0.0, 0.0]);
        let wet = b.area(1, [64.0, 0.0, 0.0]);
        let hot = b.area(1, [128.0, 0.0, 0.0]);
        b.contents(wet, area_contents::WATER | area_contents::LAVA)
            .contents(hot, area_contents::LAVA | area_contents::DO_NOT_ENTER)
            .area_flags(dry, area_flags::BRIDGE);
        let world = b.build();
        let tables = build(&world);
        assert_eq!(tables.area_contents_flags(dry), TravelFlags::BRIDGE);
        assert_eq!(tables.area_contents_flags(wet), TravelFlags::WATER);
        assert_eq!(
            tables.area_contents_flags(hot),
            TravelFlags::LAVA | TravelFlags::DO_NOT_ENTER
        );
    }

    #[test]
    fn reach_flags_follow_travel_type_and_team_bits() {
        let mut b = NavMeshBuilder::new();
        let a = b.area(1, [0.0, 0.0, 0.0]);
        let c = b.area(1, [64.0, 0.0, 0.0]);
        b.reach(a, c, TravelType::Jump, 10)
            .reach_raw(c, a, TravelType::Walk.raw() | aasroute_core::flags::TRAVEL_FLAG_NOT_TEAM2, 10);
        let world = b.build();
        let tables = build(&world);
        assert_eq!(tables.reach_travel_flags(1), TravelFlags::JUMP);
        assert_eq!(
            tables.reach_travel_flags(2),
            TravelFlags::WALK | TravelFlags::NOT_TEAM2
        );
        assert_eq!(tables.travel_flag_for_type(99), TravelFlags::INVALID);
    }

    #[test]
    fn only_traced_travel_types_record_crossed_areas() {
        let mut b = NavMeshBuilder::new();
        let a = b.area(1, [0.0, 0.0, 0.0]);
        let m = b.area(1, [32.0, 0.0, 0.0]);
        let c = b.area(1, [64.0, 0.0, 0.0]);
        b.reach(a, c, TravelType::GrappleHook, 30)
            .reach(a, m, TravelType::Walk, 10);
        let world = b.build();
        let tables = build(&world);
        let hook = world.reach_between(a, c).unwrap();
        let walk = world.reach_between(a, m).unwrap();
        assert!(tables.reachability_areas(hook).contains(&(m as u32)));
        assert!(tables.reachability_areas(walk).is_empty());
        assert!(tables.reachability_areas(0).is_empty());
    }

    #[test]
    fn crossed_areas_are_capped() {
        let mut b = NavMeshBuilder::new();
        let a = b.area(1, [0.0, 0.0, 0.0]);
        for i in 1..80 {
            b.area(1, [32.0 * i as f32, 0.0, 0.0]);
        }
        let c = b.area(1, [2560.0, 0.0, 0.0]);
        b.reach(a, c, TravelType::GrappleHook, 30);
        let world = b.build();
        let config = RouteConfig {
            max_reachability_pass_areas: 3,
            ..RouteConfig::default()
        };
        let tables = SharedTables::build(&world, &config);
        assert_eq!(tables.reachability_areas(1).len(), 3);
    }
}

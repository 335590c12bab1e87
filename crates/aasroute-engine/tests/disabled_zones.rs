//! Temporary and permanent area blocking.

use std::sync::Arc;

use aasroute_core::{AasWorld, TravelFlags};
use aasroute_engine::{DisabledZoneRequest, RouteContext};
use aasroute_test_utils::fixtures::{grid, line_of_three, SPACING};
use aasroute_test_utils::{init_tracing, MockAasWorld};

const WALK: TravelFlags = TravelFlags::WALK;

fn context(world: MockAasWorld) -> RouteContext {
    init_tracing();
    RouteContext::builder(Arc::new(world)).build().unwrap()
}

#[test]
fn blocking_the_only_path_then_restoring_it() {
    let mut ctx = context(line_of_three());
    let cache = ctx.shared_mut();
    let before = cache.travel_time_to_goal_area(1, 3, WALK);
    assert!(before > 0);

    cache.set_disabled_zones(&[DisabledZoneRequest::Areas(vec![2])]);
    assert!(cache.area_temporarily_disabled(2));
    assert!(cache.area_disabled(2));
    assert!(!cache.area_disabled(1));
    assert_eq!(cache.travel_time_to_goal_area(1, 3, WALK), 0);

    cache.clear_disabled_zones();
    assert!(!cache.area_disabled(2));
    assert_eq!(cache.travel_time_to_goal_area(1, 3, WALK), before);
}

#[test]
fn blocking_one_side_of_a_ring_takes_the_other() {
    // 1 2
    // 3 4
    let mut ctx = context(grid(2, 2));
    let cache = ctx.shared_mut();
    let before = cache.travel_time_to_goal_area(1, 4, WALK);

    cache.set_disabled_zones(&[DisabledZoneRequest::Areas(vec![2])]);
    let detour = cache.travel_time_to_goal_area(1, 4, WALK);
    assert!(detour >= before);
    let next = cache.reachability_to_goal_area(1, 4, WALK);
    assert_eq!(cache.world().reachabilities()[next].area_num, 3);

    cache.set_disabled_zones(&[DisabledZoneRequest::Areas(vec![2, 3])]);
    assert_eq!(cache.travel_time_to_goal_area(1, 4, WALK), 0);
}

#[test]
fn blocked_goal_is_unreachable_but_blocked_start_can_leave() {
    let mut ctx = context(line_of_three());
    let cache = ctx.shared_mut();
    cache.set_disabled_zones(&[DisabledZoneRequest::Areas(vec![3])]);
    assert_eq!(cache.travel_time_to_goal_area(1, 3, WALK), 0);
    assert!(cache.travel_time_to_goal_area(3, 1, WALK) > 0);
    assert_eq!(cache.travel_time_to_goal_area(3, 3, WALK), 1);
}

#[test]
fn region_blocks_the_areas_it_touches() {
    let mut ctx = context(line_of_three());
    let cache = ctx.shared_mut();
    let region = DisabledZoneRequest::Region {
        mins: [SPACING - 4.0, -4.0, -4.0],
        maxs: [SPACING + 4.0, 4.0, 4.0],
        no_block_area: None,
    };
    cache.set_disabled_zones(&[region]);
    assert!(cache.area_temporarily_disabled(2));
    assert!(!cache.area_temporarily_disabled(1));
    assert_eq!(cache.travel_time_to_goal_area(1, 3, WALK), 0);
}

#[test]
fn region_touching_the_agent_is_skipped() {
    let mut ctx = context(line_of_three());
    let cache = ctx.shared_mut();
    let wide = DisabledZoneRequest::Region {
        mins: [-4.0, -4.0, -4.0],
        maxs: [SPACING + 4.0, 4.0, 4.0],
        no_block_area: Some(1),
    };
    let narrow = DisabledZoneRequest::Areas(vec![3]);
    cache.set_disabled_zones(&[wide, narrow]);
    assert!(!cache.area_disabled(1));
    assert!(!cache.area_disabled(2));
    assert!(cache.area_disabled(3));
}

#[test]
fn unknown_ids_are_ignored() {
    let mut ctx = context(line_of_three());
    let cache = ctx.shared_mut();
    cache.set_disabled_zones(&[DisabledZoneRequest::Areas(vec![0, 40])]);
    for area in 1..4 {
        assert!(!cache.area_disabled(area));
    }
}

#[test]
fn permanent_toggle_reports_previous_state() {
    let mut ctx = context(line_of_three());
    let cache = ctx.shared_mut();
    let before = cache.travel_time_to_goal_area(1, 3, WALK);

    assert!(cache.set_area_enabled(2, false));
    assert!(cache.area_disabled(2));
    assert!(!cache.area_temporarily_disabled(2));
    assert_eq!(cache.travel_time_to_goal_area(1, 3, WALK), 0);
    assert!(!cache.set_area_enabled(2, false));

    assert!(!cache.set_area_enabled(2, true));
    assert_eq!(cache.travel_time_to_goal_area(1, 3, WALK), before);
    assert!(cache.set_area_enabled(2, true));
}

#[test]
fn permanent_block_survives_zone_updates() {
    let mut ctx = context(line_of_three());
    let cache = ctx.shared_mut();
    cache.set_area_enabled(2, false);
    cache.set_disabled_zones(&[DisabledZoneRequest::Areas(vec![2])]);
    cache.clear_disabled_zones();
    assert!(cache.area_disabled(2));
    assert_eq!(cache.travel_time_to_goal_area(1, 3, WALK), 0);
}

#[test]
fn zones_are_private_to_each_instance() {
    let mut ctx = context(line_of_three());
    let mut agent = ctx.new_instance();
    agent.set_disabled_zones(&[DisabledZoneRequest::Areas(vec![2])]);
    assert_eq!(agent.travel_time_to_goal_area(1, 3, WALK), 0);

    let shared = ctx.shared_mut();
    assert!(!shared.area_disabled(2));
    assert!(shared.travel_time_to_goal_area(1, 3, WALK) > 0);
}

//! Routing across cluster portals.

use std::sync::Arc;

use aasroute_core::{AasWorld, TravelFlags};
use aasroute_engine::{DisabledZoneRequest, RouteContext};
use aasroute_test_utils::fixtures::{corridor, two_clusters};
use aasroute_test_utils::{init_tracing, MockAasWorld};

const WALK: TravelFlags = TravelFlags::WALK;

fn context(world: MockAasWorld) -> RouteContext {
    init_tracing();
    RouteContext::builder(Arc::new(world)).build().unwrap()
}

#[test]
fn route_crosses_into_the_next_cluster() {
    let world = two_clusters();
    let forward = world.reach_between(1, 2).unwrap();
    let backward = world.reach_between(5, 4).unwrap();
    let mut ctx = context(world);
    let cache = ctx.shared_mut();

    assert_eq!(cache.reachability_to_goal_area(1, 5, WALK), forward);
    assert_eq!(cache.reachability_to_goal_area(5, 1, WALK), backward);
    let stats = cache.stats();
    assert!(stats.portal_entries >= 2);
    assert!(stats.area_entries >= 2);
}

#[test]
fn portal_area_counts_as_part_of_both_clusters() {
    let world = two_clusters();
    let into_c1 = world.reach_between(3, 2).unwrap();
    let into_c2 = world.reach_between(3, 4).unwrap();
    let mut ctx = context(world);
    let cache = ctx.shared_mut();

    assert_eq!(cache.reachability_to_goal_area(3, 1, WALK), into_c1);
    assert_eq!(cache.reachability_to_goal_area(3, 5, WALK), into_c2);
    assert_eq!(cache.travel_time_to_goal_area(2, 3, WALK), 11);
    assert_eq!(cache.travel_time_to_goal_area(4, 3, WALK), 11);
    // Answered from area caches alone.
    assert_eq!(cache.stats().portal_entries, 0);
}

#[test]
fn cross_cluster_time_exceeds_in_cluster_time() {
    let mut ctx = context(two_clusters());
    let cache = ctx.shared_mut();
    let to_portal = cache.travel_time_to_goal_area(1, 3, WALK);
    let beyond = cache.travel_time_to_goal_area(1, 4, WALK);
    let far = cache.travel_time_to_goal_area(1, 5, WALK);
    assert!(to_portal > 0);
    assert!(beyond > to_portal);
    assert!(far > beyond);
}

#[test]
fn start_in_a_portal_reads_the_portal_cache() {
    // Clusters 1 | portal 3 | 2 | portal 6 | 3.
    let world = corridor(3, 2);
    let towards_c2 = world.reach_between(3, 4).unwrap();
    let towards_c3 = world.reach_between(6, 7).unwrap();
    let mut ctx = context(world);
    let cache = ctx.shared_mut();

    let route = cache
        .reach_and_travel_time_to_goal_area(3, 8, WALK)
        .unwrap();
    assert_eq!(route.reach_num, towards_c2);
    assert!(route.travel_time > cache.travel_time_to_goal_area(6, 8, WALK));
    assert_eq!(cache.reachability_to_goal_area(6, 8, WALK), towards_c3);
}

#[test]
fn portal_goal_outside_the_start_cluster() {
    let world = corridor(3, 2);
    let forward = world.reach_between(1, 2).unwrap();
    let mut ctx = context(world);
    let cache = ctx.shared_mut();
    assert_eq!(cache.reachability_to_goal_area(1, 6, WALK), forward);
    assert!(cache.travel_time_to_goal_area(1, 6, WALK) > cache.travel_time_to_goal_area(1, 3, WALK));
}

#[test]
fn portal_goal_is_reachable_from_behind_its_back_cluster() {
    // Portal 3 joins clusters 1 (front) and 2 (back); area 8 is in cluster 3.
    let world = corridor(3, 2);
    let towards_c2 = world.reach_between(8, 7).unwrap();
    let mut ctx = context(world);
    let cache = ctx.shared_mut();
    assert_eq!(cache.reachability_to_goal_area(8, 3, WALK), towards_c2);
    assert!(cache.travel_time_to_goal_area(8, 3, WALK) > cache.travel_time_to_goal_area(8, 6, WALK));
}

#[test]
fn blocked_portal_splits_the_mesh() {
    let mut ctx = context(two_clusters());
    let cache = ctx.shared_mut();
    let before = cache.travel_time_to_goal_area(1, 5, WALK);
    assert!(before > 0);

    cache.set_disabled_zones(&[DisabledZoneRequest::Areas(vec![3])]);
    assert_eq!(cache.travel_time_to_goal_area(1, 5, WALK), 0);
    assert_eq!(cache.travel_time_to_goal_area(5, 1, WALK), 0);
    assert!(cache.travel_time_to_goal_area(1, 2, WALK) > 0);

    cache.clear_disabled_zones();
    assert_eq!(cache.travel_time_to_goal_area(1, 5, WALK), before);
}

#[test]
fn blocking_inside_one_cluster_keeps_the_other_clusters_caches() {
    let mut ctx = context(two_clusters());
    let cache = ctx.shared_mut();
    let _ = cache.travel_time_to_goal_area(1, 2, WALK);
    let _ = cache.travel_time_to_goal_area(4, 5, WALK);
    assert_eq!(cache.stats().area_entries, 2);

    cache.set_disabled_zones(&[DisabledZoneRequest::Areas(vec![5])]);
    assert_eq!(cache.stats().area_entries, 1);
    assert_eq!(cache.stats().result_entries, 0);
}

#[test]
fn long_corridor_is_fully_connected() {
    let world = corridor(5, 3);
    let last = world.num_areas() - 1;
    let mut ctx = context(world);
    let cache = ctx.shared_mut();
    let mut previous = 0;
    for goal in 2..=last {
        let t = cache.travel_time_to_goal_area(1, goal, WALK);
        assert!(t > previous, "goal {goal}: {t} <= {previous}");
        previous = t;
    }
}

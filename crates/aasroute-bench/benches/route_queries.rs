//! Criterion benchmarks for route queries on cold and warm caches.

use std::sync::Arc;

use aasroute_bench::{query_pairs, reference_mesh, stress_mesh};
use aasroute_core::{AasWorld, TravelFlags};
use aasroute_engine::RouteContext;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const QUERIES: usize = 256;

fn bench_reference_cold(c: &mut Criterion) {
    let world = reference_mesh();
    let pairs = query_pairs(world.num_areas(), QUERIES, 42);
    let mut ctx = RouteContext::builder(Arc::new(world)).build().unwrap();

    c.bench_function("reference_cold_256", |b| {
        b.iter(|| {
            let cache = ctx.shared_mut();
            cache.purge_routing_caches();
            for &(from, to) in &pairs {
                black_box(cache.travel_time_to_goal_area(from, to, TravelFlags::WALK));
            }
        });
    });
}

fn bench_reference_warm(c: &mut Criterion) {
    let world = reference_mesh();
    let pairs = query_pairs(world.num_areas(), QUERIES, 42);
    let mut ctx = RouteContext::builder(Arc::new(world)).build().unwrap();
    for &(from, to) in &pairs {
        let _ = ctx.shared_mut().travel_time_to_goal_area(from, to, TravelFlags::WALK);
    }

    c.bench_function("reference_warm_256", |b| {
        b.iter(|| {
            let cache = ctx.shared_mut();
            for &(from, to) in &pairs {
                black_box(cache.travel_time_to_goal_area(from, to, TravelFlags::WALK));
            }
        });
    });
}

fn bench_stress_single_goal(c: &mut Criterion) {
    let world = stress_mesh();
    let goal = world.num_areas() - 1;
    let mut ctx = RouteContext::builder(Arc::new(world)).build().unwrap();

    // One goal, no result memo: measures one full area-cache relaxation.
    c.bench_function("stress_area_cache_4096", |b| {
        b.iter(|| {
            let cache = ctx.shared_mut();
            cache.purge_routing_caches();
            black_box(cache.reach_and_travel_time_to_goal_area(1, goal, TravelFlags::WALK));
        });
    });
}

criterion_group!(
    benches,
    bench_reference_cold,
    bench_reference_warm,
    bench_stress_single_goal
);
criterion_main!(benches);

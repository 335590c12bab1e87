//! Canned navigation meshes.
//!
//! - [`line_of_three`]: areas 1↔2↔3 in one cluster, no 1–3 edge.
//! - [`two_clusters`]: two clusters joined by a single portal area.
//! - [`grid`]: a single-cluster 4-connected grid.
//! - [`corridor`]: a chain of clusters joined end to end by portals.

use aasroute_core::Vec3;

use crate::builder::{MockAasWorld, NavMeshBuilder};

/// Spacing between neighbouring area centres.
pub const SPACING: f32 = 64.0;

fn at(x: usize, y: usize) -> Vec3 {
    [x as f32 * SPACING, y as f32 * SPACING, 0.0]
}

/// Three areas in cluster 1 linked 1↔2↔3 by walk edges of time 10.
pub fn line_of_three() -> MockAasWorld {
    let mut b = NavMeshBuilder::new();
    let a1 = b.area(1, at(0, 0));
    let a2 = b.area(1, at(1, 0));
    let a3 = b.area(1, at(2, 0));
    b.walk(a1, a2, 10).walk(a2, a3, 10);
    b.build()
}

/// Cluster 1 holds areas 1 and 2, area 3 is the portal to cluster 2,
/// which holds areas 4 and 5. Walk edges of time 10 form the chain
/// 1↔2↔3↔4↔5.
pub fn two_clusters() -> MockAasWorld {
    let mut b = NavMeshBuilder::new();
    let a1 = b.area(1, at(0, 0));
    let a2 = b.area(1, at(1, 0));
    let p = b.portal(1, 2, at(2, 0));
    let a4 = b.area(2, at(3, 0));
    let a5 = b.area(2, at(4, 0));
    b.walk(a1, a2, 10)
        .walk(a2, p, 10)
        .walk(p, a4, 10)
        .walk(a4, a5, 10);
    b.build()
}

/// `width * height` areas in cluster 1, row-major ids from 1, walk
/// edges of time 10 between 4-neighbours.
pub fn grid(width: usize, height: usize) -> MockAasWorld {
    let mut b = NavMeshBuilder::new();
    for y in 0..height {
        for x in 0..width {
            b.area(1, at(x, y));
        }
    }
    let id = |x: usize, y: usize| y * width + x + 1;
    for y in 0..height {
        for x in 0..width {
            if x + 1 < width {
                b.walk(id(x, y), id(x + 1, y), 10);
            }
            if y + 1 < height {
                b.walk(id(x, y), id(x, y + 1), 10);
            }
        }
    }
    b.build()
}

/// `clusters` clusters of `areas_per_cluster` areas each, laid out on a
/// line. Neighbouring clusters share one portal area. Walk edges of
/// time 10 join consecutive areas.
pub fn corridor(clusters: usize, areas_per_cluster: usize) -> MockAasWorld {
    let mut b = NavMeshBuilder::new();
    let mut x = 0;
    let mut prev: Option<usize> = None;
    for cluster in 1..=clusters {
        for _ in 0..areas_per_cluster {
            let area = b.area(cluster, at(x, 0));
            x += 1;
            if let Some(p) = prev {
                b.walk(p, area, 10);
            }
            prev = Some(area);
        }
        if cluster < clusters {
            let portal = b.portal(cluster, cluster + 1, at(x, 0));
            x += 1;
            if let Some(p) = prev {
                b.walk(p, portal, 10);
            }
            prev = Some(portal);
        }
    }
    b.build()
}

//! Benchmark meshes and query sets for the aasroute router.
//!
//! - [`reference_mesh`]: 16 clusters of 32 areas chained by portals
//! - [`stress_mesh`]: one 64x64 cluster (4096 areas), large enough that
//!   area caches overflow a pool chunk
//! - [`query_pairs`]: deterministic (from, to) pairs via seed

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use aasroute_test_utils::fixtures::{corridor, grid};
use aasroute_test_utils::MockAasWorld;

/// 16 clusters of 32 areas joined end to end (527 areas).
pub fn reference_mesh() -> MockAasWorld {
    corridor(16, 32)
}

/// A single 64x64 cluster.
pub fn stress_mesh() -> MockAasWorld {
    grid(64, 64)
}

/// Generate `n` deterministic query pairs over areas `1..num_areas`.
pub fn query_pairs(num_areas: usize, n: usize, seed: u64) -> Vec<(usize, usize)> {
    let valid = (num_areas - 1) as u64;
    let mut state = seed;
    let mut next = || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((state >> 33) % valid) as usize + 1
    };
    (0..n).map(|_| (next(), next())).collect()
}

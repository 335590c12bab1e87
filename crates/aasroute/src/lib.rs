//! aasroute: hierarchical travel-time routing over AAS navigation meshes.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the aasroute sub-crates. For most users, adding `aasroute` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use aasroute::prelude::*;
//! use aasroute_test_utils::fixtures::two_clusters;
//!
//! // Areas 1-2 | portal 3 | areas 4-5, joined by walk edges of time 10.
//! let world = Arc::new(two_clusters());
//! let mut ctx = RouteContext::builder(world).build().unwrap();
//!
//! let cache = ctx.shared_mut();
//! assert_eq!(cache.travel_time_to_goal_area(1, 1, TravelFlags::WALK), 1);
//! assert!(cache.travel_time_to_goal_area(1, 5, TravelFlags::WALK) > 0);
//!
//! // Each agent gets its own caches and disabled zones.
//! let mut agent = ctx.new_instance();
//! agent.set_disabled_zones(&[DisabledZoneRequest::Areas(vec![3])]);
//! assert_eq!(agent.travel_time_to_goal_area(1, 5, TravelFlags::WALK), 0);
//! ctx.release_instance(agent);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `aasroute-core` | Travel flags, mesh records, the `AasWorld` trait |
//! | [`arena`] | `aasroute-arena` | Chunk pool backing the routing caches |
//! | [`engine`] | `aasroute-engine` | Route caches, shared tables, contexts |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core vocabulary (`aasroute-core`).
///
/// Contains [`types::TravelFlags`], the mesh records, and the
/// [`types::AasWorld`] trait a navigation mesh implements.
pub use aasroute_core as types;

/// Fixed-size chunk pool (`aasroute-arena`).
///
/// Sized through [`arena::PoolConfig`] on [`engine::RouteConfig`].
pub use aasroute_arena as arena;

/// Routing engine (`aasroute-engine`).
///
/// [`engine::RouteContext`] owns the shared tables and hands out
/// per-agent [`engine::RouteCache`] instances.
pub use aasroute_engine as engine;

/// Common imports for typical aasroute usage.
///
/// ```rust
/// use aasroute::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use aasroute_core::{AasWorld, RouteError, TravelFlags, TravelType, Vec3};

    // Pool sizing
    pub use aasroute_arena::PoolConfig;

    // Engine
    pub use aasroute_engine::{
        ConfigError, DisabledZoneRequest, Route, RouteCache, RouteCacheStats, RouteConfig,
        RouteContext, RouteRequest,
    };
}

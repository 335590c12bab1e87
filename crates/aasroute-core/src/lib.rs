//! Core types and traits for the aasroute navigation router.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the rest of the workspace: travel flags and
//! travel types, the read-only navigation-mesh records, the [`AasWorld`]
//! collaborator trait, and the routing error type.
//!
//! Conventions follow the AAS file layout: index 0 of every table
//! (areas, reachabilities, portals, clusters) is a dummy entry, so valid
//! ids start at 1. A reachability id of 0 therefore doubles as the
//! "no move" sentinel.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod flags;
pub mod math;
pub mod world;

pub use error::RouteError;
pub use flags::{
    area_contents, area_flags, presence, travel_flag_for_type, travel_flag_table, TravelFlags,
    TravelType, MAX_TRAVEL_TYPES,
};
pub use math::Vec3;
pub use world::{AasWorld, Area, AreaCluster, AreaSettings, Cluster, Portal, Reachability};

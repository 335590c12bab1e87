//! Hierarchical route caches over an AAS navigation mesh.
//!
//! Routing is split in two levels:
//!
//! ```text
//! RouteCache::route(from, to, flags)
//! ├── result cache hit?            -> memoized Route
//! ├── same cluster                 -> area cache rooted at `to`
//! └── different clusters           -> portal cache rooted at `to`
//!                                     + area caches rooted at each
//!                                       portal of `from`'s cluster
//! ```
//!
//! Both cache kinds are filled lazily by a reverse Dijkstra search and
//! evicted oldest-first when the chunk pool runs low. Blocking areas
//! drops only the caches that may cross them.
//!
//! A [`RouteContext`] owns the shared instance and hands out per-agent
//! [`RouteCache`]s that share the read-only [`SharedTables`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod config;
pub mod context;
mod dijkstra;
mod result_cache;
pub mod router;
mod status;
mod store;
pub mod tables;
pub mod zones;

pub use cache::{RouteCache, RouteCacheStats};
pub use config::{ConfigError, RouteConfig};
pub use context::{RouteContext, RouteContextBuilder};
pub use router::{Route, RouteRequest};
pub use tables::{area_travel_time, ReversedLink, SharedTables};
pub use zones::DisabledZoneRequest;

//! Test utilities and a mock navigation mesh for aasroute development.
//!
//! Provides [`NavMeshBuilder`], which assembles a small AAS-shaped mesh
//! (dummy index 0 entries, cluster-local numbering, portal index) from a
//! handful of areas and edges, and [`MockAasWorld`], the in-memory
//! [`AasWorld`](aasroute_core::AasWorld) it produces. Canned meshes live
//! in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod builder;
pub mod fixtures;

pub use builder::{MockAasWorld, NavMeshBuilder};

use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a `tracing` subscriber that writes through the test harness.
///
/// Honours `RUST_LOG`; defaults to `warn`. Safe to call from every test.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

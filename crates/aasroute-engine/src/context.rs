//! Router lifecycle: one context per loaded navigation mesh.
//!
//! [`RouteContext`] owns the shared [`RouteCache`] and hands out
//! per-agent instances that share its precomputed tables. Building the
//! context is the only way to get a shared instance, and the shared
//! instance can only be borrowed, so it can never be released as if it
//! were an agent's.

use std::sync::Arc;

use tracing::{debug, info, warn};

use aasroute_core::AasWorld;

use crate::cache::RouteCache;
use crate::config::{ConfigError, RouteConfig};
use crate::tables::SharedTables;

/// Builder for a [`RouteContext`].
pub struct RouteContextBuilder {
    world: Arc<dyn AasWorld>,
    config: RouteConfig,
}

impl RouteContextBuilder {
    /// Replace the default configuration.
    pub fn config(mut self, config: RouteConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the configuration and the mesh, then precompute the
    /// shared tables.
    pub fn build(self) -> Result<RouteContext, ConfigError> {
        self.config.validate()?;
        self.world.validate_clusters()?;
        let tables = Arc::new(SharedTables::build(&*self.world, &self.config));
        let shared = RouteCache::new(self.world, tables, &self.config)?;
        Ok(RouteContext {
            shared,
            config: self.config,
        })
    }
}

/// Process-level routing state for one navigation mesh.
pub struct RouteContext {
    shared: RouteCache,
    config: RouteConfig,
}

impl RouteContext {
    /// Start building a context over `world`.
    pub fn builder(world: Arc<dyn AasWorld>) -> RouteContextBuilder {
        RouteContextBuilder {
            world,
            config: RouteConfig::default(),
        }
    }

    /// The shared instance.
    pub fn shared(&self) -> &RouteCache {
        &self.shared
    }

    /// The shared instance, for queries and zone updates.
    pub fn shared_mut(&mut self) -> &mut RouteCache {
        &mut self.shared
    }

    /// The validated configuration.
    pub fn config(&self) -> &RouteConfig {
        &self.config
    }

    /// A new per-agent instance. It shares the mesh tables but starts
    /// with empty caches and nothing disabled.
    pub fn new_instance(&self) -> RouteCache {
        let instance = self.shared.fork();
        debug!(live = self.live_instances(), "route cache instance created");
        instance
    }

    /// Drop a per-agent instance.
    pub fn release_instance(&self, instance: RouteCache) {
        if !Arc::ptr_eq(instance.tables(), self.shared.tables()) {
            warn!("released a route cache instance of another context");
        }
        drop(instance);
        debug!(live = self.live_instances(), "route cache instance released");
    }

    /// Number of per-agent instances still alive.
    pub fn live_instances(&self) -> usize {
        Arc::strong_count(self.shared.tables()) - 1
    }

    /// Tear the context down. Instances still alive keep the tables they
    /// share until they are dropped.
    pub fn shutdown(self) {
        info!(
            live_instances = self.live_instances(),
            "route context shut down"
        );
    }
}

impl std::fmt::Debug for RouteContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteContext")
            .field("shared", &self.shared)
            .field("live_instances", &self.live_instances())
            .finish()
    }
}

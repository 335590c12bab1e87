//! Router configuration, validation, and error types.
//!
//! [`RouteConfig`] is the builder input for a
//! [`RouteContext`](crate::RouteContext). [`validate()`](RouteConfig::validate)
//! checks structural invariants once at startup; every instance forked
//! from the context reuses the validated values.

use aasroute_arena::{ArenaError, PoolConfig};
use aasroute_core::RouteError;
use thiserror::Error;

// ── RouteConfig ────────────────────────────────────────────────────

/// Tunables shared by the shared router and every per-agent instance.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteConfig {
    /// Chunk pool backing the area and portal routing caches.
    pub pool: PoolConfig,
    /// Number of memoized query results. Default: 512.
    pub result_cache_capacity: usize,
    /// Hash buckets of the result cache. Default: 1024.
    pub result_cache_buckets: usize,
    /// Outgoing reachabilities per area above which a warning is logged.
    /// Default: 128.
    pub max_area_reachabilities: usize,
    /// Most areas recorded as crossed by one reachability. Default: 32.
    pub max_reachability_pass_areas: usize,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            pool: PoolConfig::default(),
            result_cache_capacity: 512,
            result_cache_buckets: 1024,
            max_area_reachabilities: 128,
            max_reachability_pass_areas: 32,
        }
    }
}

impl RouteConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pool.validate()?;
        if self.result_cache_capacity == 0 || self.result_cache_capacity >= u32::MAX as usize {
            return Err(ConfigError::ResultCacheCapacity {
                capacity: self.result_cache_capacity,
            });
        }
        if self.result_cache_buckets == 0 {
            return Err(ConfigError::ResultCacheBuckets {
                buckets: self.result_cache_buckets,
            });
        }
        if self.max_reachability_pass_areas == 0 {
            return Err(ConfigError::PassAreasZero);
        }
        Ok(())
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while building a [`RouteContext`](crate::RouteContext).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Chunk pool configuration is invalid.
    #[error("pool config: {0}")]
    Pool(#[from] ArenaError),
    /// Result cache capacity is zero or does not fit u32 node ids.
    #[error("result cache capacity {capacity} is out of range")]
    ResultCacheCapacity {
        /// The configured capacity.
        capacity: usize,
    },
    /// Result cache has no hash buckets.
    #[error("result cache needs at least one bucket, got {buckets}")]
    ResultCacheBuckets {
        /// The configured bucket count.
        buckets: usize,
    },
    /// `max_reachability_pass_areas` is zero.
    #[error("max_reachability_pass_areas must be positive")]
    PassAreasZero,
    /// The navigation mesh is inconsistent.
    #[error("navigation mesh: {0}")]
    World(#[from] RouteError),
}

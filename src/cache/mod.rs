//! Catalog cache facade.
//!
//! Services hold an `Arc<dyn CacheStore>` chosen once at startup:
//!
//! - **Redis**: shared across instances, reached over one multiplexed connection
//! - **Memory**: process-local map with per-entry expiry
//! - **Null**: every call succeeds and nothing is stored
//!
//! ```toml
//! [cache]
//! enabled = true
//! backend = "redis"
//! redis_url = "redis://127.0.0.1:6379"
//! report_ttl_seconds = 300
//! ```
//!
//! An unreachable Redis at startup degrades to the null store instead of
//! failing the process.

mod config;
mod keys;
mod redis_store;
mod store;

use std::sync::Arc;

use tracing::{info, warn};

pub use config::{CacheBackend, CacheConfig};
pub use keys::CacheKey;
pub use redis_store::RedisCache;
pub use store::{CacheError, CacheStore, MemoryCache, NullCache};

pub(crate) use redis_store::METRIC_CACHE_OP_MS;

/// Builds the store described by `config`, falling back to [`NullCache`]
/// when the cache is disabled or Redis cannot be reached.
pub async fn connect(config: &CacheConfig) -> Arc<dyn CacheStore> {
    if !config.enabled {
        info!("Cache disabled by configuration");
        return Arc::new(NullCache);
    }

    match config.backend {
        CacheBackend::Memory => {
            info!(backend = "memory", "Cache ready");
            Arc::new(MemoryCache::new())
        }
        CacheBackend::Redis => {
            match RedisCache::connect(
                &config.redis_url,
                config.connect_timeout,
                config.operation_timeout,
            )
            .await
            {
                Ok(store) => {
                    info!(backend = "redis", url = %config.redis_url, "Cache ready");
                    Arc::new(store)
                }
                Err(err) => {
                    warn!(
                        target: "catalog::cache",
                        url = %config.redis_url,
                        error = %err,
                        "Redis unreachable; caching disabled"
                    );
                    Arc::new(NullCache)
                }
            }
        }
    }
}

//! Cache configuration.
//!
//! Selects the backing store and the timeouts applied to it.

use std::time::Duration;

use serde::Deserialize;

const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_millis(1000);
const DEFAULT_REPORT_TTL: Duration = Duration::from_secs(5 * 60);

/// Where cached payloads live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Redis,
    Memory,
}

impl std::str::FromStr for CacheBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown cache backend `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// When false every cache call is a no-op.
    pub enabled: bool,
    pub backend: CacheBackend,
    pub redis_url: String,
    /// Bound on connecting and the startup PING.
    pub connect_timeout: Duration,
    /// Bound on each get/set/delete once connected.
    pub operation_timeout: Duration,
    /// Lifetime of the cached product report.
    pub report_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: CacheBackend::Redis,
            redis_url: DEFAULT_REDIS_URL.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
            report_ttl: DEFAULT_REPORT_TTL,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            backend: settings.backend,
            redis_url: settings.redis_url.clone(),
            connect_timeout: settings.connect_timeout,
            operation_timeout: settings.operation_timeout,
            report_ttl: settings.report_ttl,
        }
    }
}

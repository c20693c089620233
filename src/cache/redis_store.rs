//! Redis-backed cache store over a single multiplexed connection.

use std::future::Future;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::histogram;
use redis::{AsyncCommands, Client, aio::MultiplexedConnection};
use tracing::debug;

use super::store::{CacheError, CacheStore};

pub(crate) const METRIC_CACHE_OP_MS: &str = "catalog_cache_op_ms";

pub struct RedisCache {
    conn: MultiplexedConnection,
    operation_timeout: Duration,
}

impl RedisCache {
    /// Opens a connection and confirms it with `PING`, both within
    /// `connect_timeout`.
    pub async fn connect(
        url: &str,
        connect_timeout: Duration,
        operation_timeout: Duration,
    ) -> Result<Self, CacheError> {
        let client = Client::open(url).map_err(CacheError::backend)?;

        let handshake = async {
            let mut conn = client
                .get_multiplexed_async_connection()
                .await
                .map_err(CacheError::backend)?;
            let _: String = redis::cmd("PING")
                .query_async(&mut conn)
                .await
                .map_err(CacheError::backend)?;
            Ok::<_, CacheError>(conn)
        };

        let conn = tokio::time::timeout(connect_timeout, handshake)
            .await
            .map_err(|_| CacheError::Timeout {
                operation: "connect",
            })??;

        Ok(Self {
            conn,
            operation_timeout,
        })
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, CacheError>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        let started_at = Instant::now();
        let result = tokio::time::timeout(self.operation_timeout, fut).await;
        histogram!(METRIC_CACHE_OP_MS, "op" => operation)
            .record(started_at.elapsed().as_secs_f64() * 1000.0);

        match result {
            Ok(inner) => inner.map_err(CacheError::backend),
            Err(_) => Err(CacheError::Timeout { operation }),
        }
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    fn is_available(&self) -> bool {
        true
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.conn.clone();
        self.bounded("get", async move { conn.get(key).await }).await
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        // SETEX rejects a zero expiry.
        let seconds = ttl.as_secs().max(1);
        self.bounded("set", async move { conn.set_ex(key, value, seconds).await })
            .await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: i64 = self
            .bounded("delete", async move { conn.del(key).await })
            .await?;
        Ok(())
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<u64, CacheError> {
        let pattern = format!("{prefix}*");
        let mut scan_conn = self.conn.clone();
        let keys: Vec<String> = self
            .bounded("scan", async move {
                let mut iter = scan_conn.scan_match::<_, String>(&pattern).await?;
                let mut keys = Vec::new();
                while let Some(key) = iter.next_item().await {
                    keys.push(key);
                }
                Ok::<_, redis::RedisError>(keys)
            })
            .await?;

        let mut removed = 0u64;
        for key in &keys {
            let mut conn = self.conn.clone();
            let deleted: i64 = self
                .bounded("delete", async move { conn.del(key).await })
                .await?;
            removed += u64::try_from(deleted).unwrap_or(0);
        }

        debug!(prefix, removed, "Deleted cache keys by prefix");
        Ok(removed)
    }
}

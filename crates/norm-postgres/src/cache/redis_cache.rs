//! Redis-backed cache.
//!
//! Delegates storage to a Redis server through a deadpool connection pool.
//! Pattern deletion walks the keyspace with cursor-based `SCAN MATCH` (never
//! `KEYS`) and deletes matches in batches, so large keyspaces stay
//! responsive.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::redis::AsyncCommands;
use tracing::debug;

use crate::{NormError, Result};

use super::Cacher;

/// Network-backed `Cacher` implementation.
pub struct RedisCache {
    pool: deadpool_redis::Pool,
}

impl RedisCache {
    /// Creates a cache from a Redis URL (`redis://host:port/db`).
    pub fn new(url: &str) -> Result<Self> {
        let config = deadpool_redis::Config::from_url(url);
        let pool = config
            .create_pool(Some(deadpool_redis::Runtime::Tokio1))
            .map_err(|e| NormError::Cache(format!("failed to create redis pool: {}", e)))?;
        Ok(Self { pool })
    }

    /// Creates a cache from an existing pool.
    pub fn from_pool(pool: deadpool_redis::Pool) -> Self {
        Self { pool }
    }

    async fn connection(&self) -> Result<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| NormError::Cache(format!("failed to get redis connection: {}", e)))
    }
}

#[async_trait]
impl Cacher for RedisCache {
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let mut conn = self.connection().await?;

        let value: Option<Vec<u8>> = conn
            .get(key)
            .await
            .map_err(|e| NormError::Cache(format!("redis GET failed: {}", e)))?;

        value.ok_or(NormError::CacheMiss)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let mut conn = self.connection().await?;

        let ttl_secs = ttl.as_secs().max(1);
        let _: () = conn
            .set_ex(key, value, ttl_secs)
            .await
            .map_err(|e| NormError::Cache(format!("redis SETEX failed: {}", e)))?;

        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<u64> {
        let mut conn = self.connection().await?;

        let mut cursor: u64 = 0;
        let mut removed: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = deadpool_redis::redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await
                .map_err(|e| NormError::Cache(format!("redis SCAN failed: {}", e)))?;

            if !keys.is_empty() {
                let deleted: u64 = conn
                    .del(&keys)
                    .await
                    .map_err(|e| NormError::Cache(format!("redis DEL failed: {}", e)))?;
                removed += deleted;
            }

            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        debug!(pattern = %pattern, removed = removed, "redis pattern delete");
        Ok(removed)
    }
}

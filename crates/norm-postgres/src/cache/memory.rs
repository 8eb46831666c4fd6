//! In-process cache backed by a concurrent map.
//!
//! Entries expire lazily: an expired entry is discarded by the read that
//! finds it. Deployments that want bounded memory between reads can run the
//! background sweeper.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use crate::{NormError, Result};

use super::{glob_to_regex, Cacher};

#[derive(Debug, Clone)]
struct CacheEntry {
    bytes: Vec<u8>,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-process `Cacher` implementation.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (non-expired) entries.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| !e.value().is_expired()).count()
    }

    /// True when no live entries remain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every expired entry; returns how many were dropped.
    pub fn sweep(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!(removed = removed, "swept expired cache entries");
        }
        removed
    }

    /// Spawns a background task sweeping expired entries at an interval.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                cache.sweep();
            }
        })
    }
}

#[async_trait]
impl Cacher for MemoryCache {
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => Ok(entry.bytes.clone()),
            Some(entry) => {
                drop(entry);
                self.entries.remove(key);
                Err(NormError::CacheMiss)
            }
            None => Err(NormError::CacheMiss),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                bytes: value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<u64> {
        let regex = glob_to_regex(pattern)?;
        let before = self.entries.len();
        self.entries.retain(|key, _| !regex.is_match(key));
        Ok((before - self.entries.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_round_trip() {
        let cache = MemoryCache::new();
        cache
            .set("users:u:abc", b"payload".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();

        let bytes = cache.get("users:u:abc").await.unwrap();
        assert_eq!(bytes, b"payload");
    }

    #[tokio::test]
    async fn test_miss_on_absent_key() {
        let cache = MemoryCache::new();
        assert!(matches!(
            cache.get("nothing").await,
            Err(NormError::CacheMiss)
        ));
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let cache = MemoryCache::new();
        cache
            .set("k", b"v".to_vec(), Duration::from_millis(0))
            .await
            .unwrap();

        assert!(matches!(cache.get("k").await, Err(NormError::CacheMiss)));
        // the lazy read also removed the entry
        assert_eq!(cache.entries.len(), 0);
    }

    #[tokio::test]
    async fn test_delete_pattern_scope() {
        let cache = MemoryCache::new();
        let ttl = Duration::from_secs(60);
        cache.set("users:k1:k2:aaa", b"1".to_vec(), ttl).await.unwrap();
        cache.set("users:k1:k2:bbb", b"2".to_vec(), ttl).await.unwrap();
        cache.set("users:k3:ccc", b"3".to_vec(), ttl).await.unwrap();
        cache.set("orders:k1:k2:ddd", b"4".to_vec(), ttl).await.unwrap();

        let removed = cache.delete_pattern("*users*k1:k2*").await.unwrap();
        assert_eq!(removed, 2);

        // only the matching keys are gone
        assert!(cache.get("users:k1:k2:aaa").await.is_err());
        assert!(cache.get("users:k1:k2:bbb").await.is_err());
        assert!(cache.get("users:k3:ccc").await.is_ok());
        assert!(cache.get("orders:k1:k2:ddd").await.is_ok());
    }

    #[tokio::test]
    async fn test_sweep_removes_expired_only() {
        let cache = MemoryCache::new();
        cache
            .set("dead", b"x".to_vec(), Duration::from_millis(0))
            .await
            .unwrap();
        cache
            .set("alive", b"y".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();

        let removed = cache.sweep();
        assert_eq!(removed, 1);
        assert!(cache.get("alive").await.is_ok());
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value() {
        let cache = MemoryCache::new();
        let ttl = Duration::from_secs(60);
        cache.set("k", b"old".to_vec(), ttl).await.unwrap();
        cache.set("k", b"new".to_vec(), ttl).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), b"new");
    }
}

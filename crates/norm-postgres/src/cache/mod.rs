//! Content-addressed query cache with pattern invalidation.
//!
//! A `Cacher` is a capability with three operations: get, set-with-TTL, and
//! delete-by-glob. Two implementations are provided: an in-process store
//! ([`MemoryCache`]) and a Redis-backed one ([`RedisCache`], behind the
//! `redis` feature). Which one a deployment uses is decided once, at
//! registration time, on the [`crate::engine::Engine`].
//!
//! Cache keys are `tag1:tag2:...:<hex sha256 of sql + bound args>`, so a key
//! is stable for a repeated query and distinct for any textual or parameter
//! change. Invalidation is explicit and pattern-shaped:
//!
//! - scoped: `*<table>*<k1>:<k2>*` narrows to one writer's table and scope
//! - referenced: `*<k>*` per key, for anything that mentions the key
//!
//! Failure policy: a transport error on get is a miss, on set it is logged
//! and swallowed, on delete it surfaces to the caller. The read path never
//! blocks on the cache.

use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::value::Value;
use crate::{NormError, Result};

mod memory;
pub use memory::MemoryCache;

#[cfg(feature = "redis")]
mod redis_cache;
#[cfg(feature = "redis")]
pub use redis_cache::RedisCache;

/// A pluggable cache backend.
#[async_trait]
pub trait Cacher: Send + Sync {
    /// Fetches a key. A plain miss is `NormError::CacheMiss`.
    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Stores a value under a key with a time-to-live.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;

    /// Deletes every key matching a glob (`*` and `?` wildcards).
    /// Returns how many keys were removed.
    async fn delete_pattern(&self, pattern: &str) -> Result<u64>;
}

/// Stable fingerprint of a statement and its bound arguments.
pub fn fingerprint(sql: &str, params: &[Value]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(sql.as_bytes());
    for param in params {
        hasher.update([0u8]);
        hasher.update(param.fingerprint_repr().as_bytes());
    }
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Builds the full cache key: user tags joined by `:`, then the fingerprint.
pub fn cache_key(tags: &[String], sql: &str, params: &[Value]) -> String {
    let fp = fingerprint(sql, params);
    if tags.is_empty() {
        fp
    } else {
        format!("{}:{}", tags.join(":"), fp)
    }
}

/// Glob for scoped invalidation: narrow to a table plus scope terms.
pub fn scope_pattern(table: &str, keys: &[&str]) -> String {
    if keys.is_empty() {
        format!("*{}*", table)
    } else {
        format!("*{}*{}*", table, keys.join(":"))
    }
}

/// Globs for referenced invalidation: one broad pattern per key.
pub fn referenced_patterns(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| format!("*{}*", k)).collect()
}

/// Compiles a key glob (`*`, `?`) into an anchored regex.
pub(crate) fn glob_to_regex(pattern: &str) -> Result<Regex> {
    let mut source = String::with_capacity(pattern.len() + 8);
    source.push('^');
    for c in pattern.chars() {
        match c {
            '*' => source.push_str(".*"),
            '?' => source.push('.'),
            c => source.push_str(&regex::escape(&c.to_string())),
        }
    }
    source.push('$');

    Regex::new(&source)
        .map_err(|e| NormError::Cache(format!("invalid cache pattern '{}': {}", pattern, e)))
}

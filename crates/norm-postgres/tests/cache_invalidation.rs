//! Cache round-trips and invalidation scope against the in-process cacher.

use std::sync::Arc;
use std::time::Duration;

use norm_postgres::cache::{self, Cacher};
use norm_postgres::row::{decode_rows, encode_rows};
use norm_postgres::{Engine, MemoryCache, Row, Statement, Value};

fn sample_rows() -> Vec<Row> {
    vec![
        Row::from_pairs(vec![
            ("id".to_string(), Value::BigInt(1)),
            ("name".to_string(), Value::String("alice".to_string())),
        ]),
        Row::from_pairs(vec![
            ("id".to_string(), Value::BigInt(2)),
            ("name".to_string(), Value::String("bob".to_string())),
        ]),
    ]
}

#[tokio::test]
async fn cached_payload_round_trips_byte_for_byte() {
    let cacher = MemoryCache::new();
    let sql = "SELECT * FROM \"users\"";
    let params = vec![Value::Bool(true)];

    let key = cache::cache_key(&["users".to_string(), "u".to_string()], sql, &params);
    let payload = encode_rows(&sample_rows()).unwrap();

    cacher
        .set(&key, payload.clone(), Duration::from_secs(60))
        .await
        .unwrap();

    let cached = cacher.get(&key).await.unwrap();
    assert_eq!(cached, payload);

    let rows = decode_rows(&cached).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("name").unwrap(), &Value::String("alice".to_string()));
    // re-encoding the decoded set reproduces the stored bytes exactly
    assert_eq!(encode_rows(&rows).unwrap(), payload);
}

#[tokio::test]
async fn same_query_same_tags_hits_same_key() {
    let sql = "SELECT * FROM \"users\" WHERE \"active\" = $1";
    let params = vec![Value::Bool(true)];
    let tags = vec!["users".to_string(), "u".to_string()];

    let first = cache::cache_key(&tags, sql, &params);
    let second = cache::cache_key(&tags, sql, &params);
    assert_eq!(first, second);

    // any change to sql, params or tags changes the key
    assert_ne!(first, cache::cache_key(&tags, sql, &[Value::Bool(false)]));
    assert_ne!(
        first,
        cache::cache_key(&["users".to_string()], sql, &params)
    );
}

#[tokio::test]
async fn scoped_invalidation_removes_only_matching_keys() {
    let cacher = MemoryCache::new();
    let ttl = Duration::from_secs(60);
    let payload = encode_rows(&sample_rows()).unwrap();

    // keys the way the statement surface builds them: tags + fingerprint
    let hit1 = cache::cache_key(
        &["users".to_string(), "k1".to_string(), "k2".to_string()],
        "SELECT * FROM \"users\"",
        &[],
    );
    let hit2 = cache::cache_key(
        &["users".to_string(), "k1".to_string(), "k2".to_string()],
        "SELECT \"id\" FROM \"users\"",
        &[],
    );
    let other_scope = cache::cache_key(
        &["users".to_string(), "k3".to_string()],
        "SELECT * FROM \"users\"",
        &[],
    );
    let other_table = cache::cache_key(
        &["orders".to_string(), "k1".to_string(), "k2".to_string()],
        "SELECT * FROM \"orders\"",
        &[],
    );

    for key in [&hit1, &hit2, &other_scope, &other_table] {
        cacher.set(key, payload.clone(), ttl).await.unwrap();
    }

    let removed = cacher
        .delete_pattern(&cache::scope_pattern("users", &["k1", "k2"]))
        .await
        .unwrap();
    assert_eq!(removed, 2);

    assert!(cacher.get(&hit1).await.is_err());
    assert!(cacher.get(&hit2).await.is_err());
    assert!(cacher.get(&other_scope).await.is_ok());
    assert!(cacher.get(&other_table).await.is_ok());
}

#[tokio::test]
async fn referenced_invalidation_is_broader() {
    let cacher = MemoryCache::new();
    let ttl = Duration::from_secs(60);

    cacher.set("users:k1:aaa", b"1".to_vec(), ttl).await.unwrap();
    cacher.set("reports:users:bbb", b"2".to_vec(), ttl).await.unwrap();
    cacher.set("orders:k2:ccc", b"3".to_vec(), ttl).await.unwrap();

    let mut removed = 0;
    for pattern in cache::referenced_patterns(&["users"]) {
        removed += cacher.delete_pattern(&pattern).await.unwrap();
    }
    assert_eq!(removed, 2);
    assert!(cacher.get("orders:k2:ccc").await.is_ok());
}

#[tokio::test]
async fn statement_invalidation_goes_through_engine_cacher() {
    let engine = Engine::new();
    let cacher = Arc::new(MemoryCache::new());
    engine.set_cacher(cacher.clone());

    let ttl = Duration::from_secs(60);
    cacher.set("users:u:abc", b"1".to_vec(), ttl).await.unwrap();
    cacher.set("orders:u:def", b"2".to_vec(), ttl).await.unwrap();

    let stmt = Statement::table_on(&engine, "users").unwrap();
    let removed = stmt.invalidate_cache(&["u"]).await.unwrap();
    assert_eq!(removed, 1);
    assert!(cacher.get("orders:u:def").await.is_ok());

    // referenced invalidation sweeps anything mentioning the key
    let removed = stmt.invalidate_cache_referenced(&["u"]).await.unwrap();
    assert_eq!(removed, 1);
}

#[tokio::test]
async fn expired_entries_miss_and_sweep() {
    let cacher = MemoryCache::new();
    cacher
        .set("k", b"v".to_vec(), Duration::from_millis(0))
        .await
        .unwrap();

    assert!(cacher.get("k").await.is_err());
    assert_eq!(cacher.sweep(), 0);
    assert!(cacher.is_empty());
}

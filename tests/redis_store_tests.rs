// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Redis session store integration tests.
//!
//! Run with a local server:
//!   docker run --rm -p 6379:6379 redis:7
//!   REDIS_URL=redis://127.0.0.1:6379 cargo test --test redis_store_tests

use std::time::Duration;
use tokengate::db::{RedisSessionStore, SessionStore};
use uuid::Uuid;

mod common;

async fn store(ttl: Option<Duration>) -> RedisSessionStore {
    let url = std::env::var("REDIS_URL").unwrap();
    // Unique prefix per test so runs don't see each other's keys.
    let prefix = format!("tokengate-test:{}:", Uuid::new_v4());
    RedisSessionStore::connect(&url, &prefix, ttl)
        .await
        .expect("Failed to connect to Redis")
}

#[tokio::test]
async fn test_put_get_delete() {
    require_redis!();
    let store = store(None).await;
    store.health_check().await.unwrap();

    assert_eq!(store.get("user-1").await.unwrap(), None);

    store.put("user-1", "refresh-a").await.unwrap();
    assert_eq!(store.get("user-1").await.unwrap().as_deref(), Some("refresh-a"));

    store.put("user-1", "refresh-b").await.unwrap();
    assert_eq!(store.get("user-1").await.unwrap().as_deref(), Some("refresh-b"));

    store.delete("user-1").await.unwrap();
    assert_eq!(store.get("user-1").await.unwrap(), None);

    // Deleting again is fine.
    store.delete("user-1").await.unwrap();
}

#[tokio::test]
async fn test_records_are_per_subject() {
    require_redis!();
    let store = store(None).await;

    store.put("user-1", "a").await.unwrap();
    store.put("user-2", "b").await.unwrap();
    store.delete("user-1").await.unwrap();

    assert_eq!(store.get("user-1").await.unwrap(), None);
    assert_eq!(store.get("user-2").await.unwrap().as_deref(), Some("b"));

    store.delete("user-2").await.unwrap();
}

#[tokio::test]
async fn test_ttl_expires_record() {
    require_redis!();
    let store = store(Some(Duration::from_secs(1))).await;

    store.put("user-1", "a").await.unwrap();
    assert!(store.get("user-1").await.unwrap().is_some());

    tokio::time::sleep(Duration::from_millis(2100)).await;
    assert_eq!(store.get("user-1").await.unwrap(), None);
}

#[tokio::test]
async fn test_connect_to_closed_port_fails() {
    require_redis!();
    let result = RedisSessionStore::connect("redis://127.0.0.1:1", "", None).await;
    assert!(result.is_err());
}

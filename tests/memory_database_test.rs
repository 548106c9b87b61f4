// Adapter behaviour against the in-memory store
//
// Exercises the public cache API end to end without a Redis server.

use redis_json_cache::cache::CacheError;
use redis_json_cache::{CommandFlags, Database, MemoryDatabase, RedisCache};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct SimpleClass {
    property: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Order {
    id: u64,
    customer: String,
    lines: Vec<(String, u32)>,
    notes: Option<String>,
}

fn cache() -> RedisCache<MemoryDatabase> {
    RedisCache::new(MemoryDatabase::new())
}

#[tokio::test]
async fn test_set_then_get_returns_equal_value() {
    let cache = cache();
    cache
        .set("user:1", &SimpleClass { property: 42 }, Some(Duration::from_secs(60)))
        .await
        .unwrap();

    let value: Option<SimpleClass> = cache.get("user:1").await.unwrap();
    assert_eq!(value, Some(SimpleClass { property: 42 }));
}

#[tokio::test]
async fn test_nested_value_round_trips() {
    let cache = cache();
    let order = Order {
        id: 9001,
        customer: "Ada".to_string(),
        lines: vec![("widget".to_string(), 3), ("gadget".to_string(), 1)],
        notes: None,
    };

    cache.set("order:9001", &order, None).await.unwrap();
    let loaded: Option<Order> = cache.get("order:9001").await.unwrap();
    assert_eq!(loaded, Some(order));
}

#[tokio::test]
async fn test_absent_key_reads_as_none_or_default() {
    let cache = cache();

    let value: Option<SimpleClass> = cache.get("nope").await.unwrap();
    assert!(value.is_none());

    let value: SimpleClass = cache.get_or_default("nope").await.unwrap();
    assert_eq!(value, SimpleClass::default());

    let value: i64 = cache.get_or_default_blocking("nope").unwrap();
    assert_eq!(value, 0);

    assert!(cache.get_value("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_value_returns_untyped_json() {
    let cache = cache();
    cache
        .set("user:1", &SimpleClass { property: 5 }, None)
        .await
        .unwrap();

    let value = cache.get_value("user:1").await.unwrap().unwrap();
    assert_eq!(value, serde_json::json!({ "property": 5 }));
}

#[tokio::test]
async fn test_remove_then_exists_is_false() {
    let cache = cache();
    cache.set("k", &"value", None).await.unwrap();
    assert!(cache.exists("k").await.unwrap());

    assert!(cache.remove("k").await.unwrap());
    assert!(!cache.exists("k").await.unwrap());
    assert!(!cache.remove("k").await.unwrap());
}

#[tokio::test]
async fn test_overwrite_replaces_value() {
    let cache = cache();
    cache.set("counter", &1u32, None).await.unwrap();
    cache.set("counter", &2u32, None).await.unwrap();

    let value: Option<u32> = cache.get("counter").await.unwrap();
    assert_eq!(value, Some(2));
}

#[tokio::test]
async fn test_set_expiration_time_leaves_value_unchanged() {
    let cache = cache();
    let tags: HashMap<String, bool> = [("a".to_string(), true), ("b".to_string(), false)]
        .into_iter()
        .collect();
    cache.set("tags", &tags, None).await.unwrap();

    let before: Option<HashMap<String, bool>> = cache.get("tags").await.unwrap();
    assert_eq!(before.as_ref(), Some(&tags));

    assert!(cache
        .set_expiration_time("tags", Some(Duration::from_secs(120)))
        .await
        .unwrap());

    let after: Option<HashMap<String, bool>> = cache.get("tags").await.unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_set_expiration_time_on_missing_key_returns_false() {
    let cache = cache();
    assert!(!cache
        .set_expiration_time("missing", Some(Duration::from_secs(1)))
        .await
        .unwrap());
    assert!(!cache.set_expiration_time("missing", None).await.unwrap());
}

#[tokio::test]
async fn test_ttl_expires_entry() {
    let cache = cache();
    cache
        .set("short", &SimpleClass { property: 1 }, Some(Duration::from_millis(50)))
        .await
        .unwrap();
    assert!(cache.exists("short").await.unwrap());

    tokio::time::sleep(Duration::from_millis(250)).await;

    assert!(!cache.exists("short").await.unwrap());
    let value: Option<SimpleClass> = cache.get("short").await.unwrap();
    assert!(value.is_none());
}

#[tokio::test]
async fn test_persist_keeps_entry_past_original_ttl() {
    let cache = cache();
    cache
        .set("k", &1, Some(Duration::from_millis(100)))
        .await
        .unwrap();
    assert!(cache.set_expiration_time("k", None).await.unwrap());

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert!(cache.exists("k").await.unwrap());
}

#[test]
fn test_blocking_operations_round_trip() {
    let cache = cache();
    cache
        .set_blocking("user:1", &SimpleClass { property: 42 }, None)
        .unwrap();

    assert!(cache.exists_blocking("user:1").unwrap());
    let value: Option<SimpleClass> = cache.get_blocking("user:1").unwrap();
    assert_eq!(value, Some(SimpleClass { property: 42 }));
    assert_eq!(
        cache.get_value_blocking("user:1").unwrap(),
        Some(serde_json::json!({ "property": 42 }))
    );

    assert!(cache
        .set_expiration_time_blocking("user:1", Some(Duration::from_secs(30)))
        .unwrap());
    assert!(cache.remove_blocking("user:1").unwrap());
    assert!(!cache.exists_blocking("user:1").unwrap());
}

#[tokio::test]
async fn test_blocking_and_async_forms_share_the_store() {
    let cache = cache();
    cache.set_blocking("k", &"written blocking", None).unwrap();
    let value: Option<String> = cache.get("k").await.unwrap();
    assert_eq!(value.as_deref(), Some("written blocking"));
}

#[tokio::test]
async fn test_wrongly_typed_read_is_serialization_error() {
    let cache = cache();
    cache.set("k", &"text", None).await.unwrap();

    match cache.get::<SimpleClass>("k").await {
        Err(CacheError::Serialization(msg)) => assert!(msg.contains("k")),
        other => panic!("Expected Serialization error, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_key_prefix_is_applied_to_store_keys() {
    let database = Arc::new(MemoryDatabase::new());
    let prefixed = RedisCache::from_shared(database.clone()).with_key_prefix("app");
    let plain = RedisCache::from_shared(database.clone());

    prefixed.set("user:1", &1, None).await.unwrap();

    assert!(database.key_exists("app:user:1", CommandFlags::None).unwrap());
    assert!(!database.key_exists("user:1", CommandFlags::None).unwrap());
    assert!(plain.exists("app:user:1").await.unwrap());

    let value: Option<i32> = prefixed.get("user:1").await.unwrap();
    assert_eq!(value, Some(1));
}

#[tokio::test]
async fn test_clones_share_the_store() {
    let cache = cache();
    let clone = cache.clone();

    cache.set("k", &true, None).await.unwrap();
    let value: Option<bool> = clone.get("k").await.unwrap();
    assert_eq!(value, Some(true));
}

#[tokio::test]
async fn test_key_with_null_byte_is_passed_through_to_the_store() {
    let cache = cache();
    assert_eq!(
        cache.exists("a\0b").await.unwrap(),
        cache.database().key_exists("a\0b", CommandFlags::None).unwrap()
    );

    cache.set("a\0b", &1, None).await.unwrap();
    assert!(cache.exists("a\0b").await.unwrap());
    let value: Option<i32> = cache.get("a\0b").await.unwrap();
    assert_eq!(value, Some(1));
}

#[test]
fn test_database_type_names_the_store() {
    let cache = cache();
    assert!(cache.database_type().ends_with("MemoryDatabase"));
}

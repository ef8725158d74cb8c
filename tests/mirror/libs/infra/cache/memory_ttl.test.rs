// INICIO DEL ARCHIVO [tests/mirror/libs/infra/cache/memory_ttl.test.rs]
/**
 * =================================================================
 * APARATO: MEMORY TTL TEST (V1.1)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar la física de expiración del motor en memoria.
 * =================================================================
 */

use chrono::Duration;
use entativa_infra_cache::{KeyValueStore, MemoryKeyValueStore};

#[tokio::test]
async fn certify_put_get_delete_cycle() {
    let store = MemoryKeyValueStore::new();

    store.put("session:alpha", "payload", None).await.unwrap();
    assert_eq!(
        store.get("session:alpha").await.unwrap(),
        Some("payload".to_string())
    );

    store.delete("session:alpha").await.unwrap();
    assert_eq!(store.get("session:alpha").await.unwrap(), None);

    // Borrar lo inexistente es idempotente.
    store.delete("session:alpha").await.unwrap();
}

#[tokio::test]
async fn certify_zero_ttl_is_born_expired() {
    let store = MemoryKeyValueStore::new();

    store
        .put("authcode:burned", "x", Some(Duration::zero()))
        .await
        .unwrap();
    assert_eq!(store.get("authcode:burned").await.unwrap(), None);
}

#[tokio::test]
async fn certify_live_ttl_survives_reads() {
    let store = MemoryKeyValueStore::new();

    store
        .put("protection:elonmusk", "verdict", Some(Duration::hours(2)))
        .await
        .unwrap();

    for _ in 0..3 {
        assert!(store.get("protection:elonmusk").await.unwrap().is_some());
    }
}

#[tokio::test]
async fn certify_purge_collects_only_expired_cells() {
    let store = MemoryKeyValueStore::new();

    store.put("alive", "1", Some(Duration::hours(1))).await.unwrap();
    store.put("dead_a", "1", Some(Duration::zero())).await.unwrap();
    store.put("dead_b", "1", Some(Duration::zero())).await.unwrap();
    store.put("eternal", "1", None).await.unwrap();

    let evicted = store.purge_expired().await.unwrap();
    assert_eq!(evicted, 2, "exactly the two born-expired cells");

    assert!(store.get("alive").await.unwrap().is_some());
    assert!(store.get("eternal").await.unwrap().is_some());
}

#[tokio::test]
async fn certify_overwrite_replaces_payload_and_deadline() {
    let store = MemoryKeyValueStore::new();

    store.put("cell", "first", Some(Duration::zero())).await.unwrap();
    assert_eq!(store.get("cell").await.unwrap(), None);

    // La sobreescritura revive la celda con el nuevo deadline.
    store.put("cell", "second", Some(Duration::minutes(5))).await.unwrap();
    assert_eq!(store.get("cell").await.unwrap(), Some("second".to_string()));
}
// FIN DEL ARCHIVO [tests/mirror/libs/infra/cache/memory_ttl.test.rs]

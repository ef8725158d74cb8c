// INICIO DEL ARCHIVO [tests/mirror/libs/infra/cache/atomic_primitives.test.rs]
/**
 * =================================================================
 * APARATO: ATOMIC PRIMITIVES TEST (V1.2)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar contadores atómicos y cerrojos nominales.
 * =================================================================
 */

use chrono::Duration;
use entativa_infra_cache::{KeyValueStore, MemoryKeyValueStore};
use std::sync::Arc;

#[tokio::test]
async fn certify_increment_sequence() {
    let store = MemoryKeyValueStore::new();

    for expected in 1..=5u64 {
        let observed = store
            .increment("rate:login:alice", Some(Duration::minutes(15)))
            .await
            .unwrap();
        assert_eq!(observed, expected);
    }
}

#[tokio::test]
async fn certify_expired_counter_restarts_window() {
    let store = MemoryKeyValueStore::new();

    store
        .increment("rate:register:1.2.3.4", Some(Duration::zero()))
        .await
        .unwrap();

    // La celda nació expirada: el siguiente incremento abre ventana nueva.
    let observed = store
        .increment("rate:register:1.2.3.4", Some(Duration::hours(24)))
        .await
        .unwrap();
    assert_eq!(observed, 1);
}

#[tokio::test]
async fn certify_concurrent_increments_never_lose_updates() {
    let store = Arc::new(MemoryKeyValueStore::new());
    let mut handles = Vec::new();

    for _ in 0..16 {
        let store_clone = store.clone();
        handles.push(tokio::spawn(async move {
            for _ in 0..25 {
                store_clone
                    .increment("rate:burst:subject", Some(Duration::minutes(1)))
                    .await
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let final_count = store
        .increment("rate:burst:subject", Some(Duration::minutes(1)))
        .await
        .unwrap();
    assert_eq!(final_count, 16 * 25 + 1, "atomicidad del contador");
}

#[tokio::test]
async fn certify_lease_exclusivity_and_owner_release() {
    let store = MemoryKeyValueStore::new();
    let lease_key = "lock:identity:7f";

    // Primer poseedor gana.
    assert!(store
        .put_if_absent(lease_key, "owner-a", Some(Duration::seconds(30)))
        .await
        .unwrap());

    // Segundo poseedor pierde mientras el lease viva.
    assert!(!store
        .put_if_absent(lease_key, "owner-b", Some(Duration::seconds(30)))
        .await
        .unwrap());

    // Un extraño no puede liberar el cerrojo ajeno.
    assert!(!store.release_if_owner(lease_key, "owner-b").await.unwrap());
    assert!(store.release_if_owner(lease_key, "owner-a").await.unwrap());

    // Liberado: el siguiente poseedor adquiere.
    assert!(store
        .put_if_absent(lease_key, "owner-b", Some(Duration::seconds(30)))
        .await
        .unwrap());
}

#[tokio::test]
async fn certify_expired_lease_is_reclaimable() {
    let store = MemoryKeyValueStore::new();
    let lease_key = "lock:identity:dead-holder";

    assert!(store
        .put_if_absent(lease_key, "zombie", Some(Duration::zero()))
        .await
        .unwrap());

    // El lease nació vencido: cualquier poseedor nuevo lo reclama.
    assert!(store
        .put_if_absent(lease_key, "heir", Some(Duration::seconds(30)))
        .await
        .unwrap());
}
// FIN DEL ARCHIVO [tests/mirror/libs/infra/cache/atomic_primitives.test.rs]

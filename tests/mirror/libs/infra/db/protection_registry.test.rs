// INICIO DEL ARCHIVO [tests/mirror/libs/infra/db/protection_registry.test.rs]
/**
 * =================================================================
 * APARATO: PROTECTION REGISTRY TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar la unicidad de unión entre tablas
 *           categorizadas y el orden de precedencia del snapshot.
 * =================================================================
 */

use chrono::Utc;
use entativa_domain_models::protected_entity::{ProtectedCategory, ProtectedEntity};
use entativa_infra_db::repositories::ProtectionRepository;
use entativa_infra_db::{DbError, TursoClient};
use uuid::Uuid;

fn forge_entity(handle: &str, category: ProtectedCategory, aliases: &[&str]) -> ProtectedEntity {
    ProtectedEntity {
        id: Uuid::new_v4(),
        canonical_handle: handle.to_string(),
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
        category,
        display_name: handle.to_uppercase(),
        metadata_json: None,
        requires_verification: true,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn certify_union_uniqueness_across_category_tables() {
    let client = TursoClient::connect("file:mem_registry_union?mode=memory&cache=shared", None)
        .await
        .expect("Fallo al inicializar DB en memoria");
    let repo = ProtectionRepository::new(client.clone());

    repo.insert_protected(&forge_entity("elonmusk", ProtectedCategory::Business, &["elon"]))
        .await
        .unwrap();

    // Mismo handle en OTRA categoría: violación de unión.
    assert!(matches!(
        repo.insert_protected(&forge_entity("elonmusk", ProtectedCategory::Celebrity, &[]))
            .await,
        Err(DbError::DuplicateProtectedHandle)
    ));

    // Misma categoría, mismo handle: también vetado.
    assert!(matches!(
        repo.insert_protected(&forge_entity("elonmusk", ProtectedCategory::Business, &[]))
            .await,
        Err(DbError::DuplicateProtectedHandle)
    ));

    assert_eq!(repo.count_entries().await.unwrap(), 1);
}

#[tokio::test]
async fn certify_exact_lookup_respects_dispatch_order() {
    let client = TursoClient::connect("file:mem_registry_order?mode=memory&cache=shared", None)
        .await
        .unwrap();
    let repo = ProtectionRepository::new(client.clone());

    repo.insert_protected(&forge_entity("nasa", ProtectedCategory::Government, &["nasagov"]))
        .await
        .unwrap();
    repo.insert_protected(&forge_entity("rihanna", ProtectedCategory::Celebrity, &[]))
        .await
        .unwrap();

    let hit = repo.fetch_exact_canonical("nasa").await.unwrap().unwrap();
    assert_eq!(hit.category, ProtectedCategory::Government);
    assert_eq!(hit.aliases, vec!["nasagov".to_string()]);

    assert!(repo.fetch_exact_canonical("ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn certify_snapshot_precedence_and_reserved_handles() {
    let client = TursoClient::connect("file:mem_registry_snapshot?mode=memory&cache=shared", None)
        .await
        .unwrap();
    let repo = ProtectionRepository::new(client.clone());
    let now = Utc::now();

    // Siembra desordenada a propósito.
    repo.insert_protected(&forge_entity("fifa", ProtectedCategory::Sports, &[]))
        .await
        .unwrap();
    repo.insert_protected(&forge_entity("rihanna", ProtectedCategory::Celebrity, &[]))
        .await
        .unwrap();
    repo.insert_protected(&forge_entity("nike", ProtectedCategory::Brand, &[]))
        .await
        .unwrap();

    // El snapshot respeta el orden fijo de categorías.
    let snapshot = repo.load_registry().await.unwrap();
    let categories: Vec<ProtectedCategory> =
        snapshot.iter().map(|entity| entity.category).collect();
    assert_eq!(
        categories,
        vec![
            ProtectedCategory::Celebrity,
            ProtectedCategory::Brand,
            ProtectedCategory::Sports,
        ]
    );

    // Reservas del sistema: idempotentes y con motivo recuperable.
    repo.insert_reserved("admin", "SYSTEM_RESERVED: administrative namespace", false, now)
        .await
        .unwrap();
    repo.insert_reserved("admin", "SYSTEM_RESERVED: duplicate seed", false, now)
        .await
        .unwrap();

    let reason = repo.reserved_reason("admin").await.unwrap().unwrap();
    assert!(reason.contains("administrative namespace"));
    assert!(repo.reserved_reason("alice").await.unwrap().is_none());

    println!("✅ REGISTRY: Union uniqueness and precedence certified.");
}
// FIN DEL ARCHIVO [tests/mirror/libs/infra/db/protection_registry.test.rs]

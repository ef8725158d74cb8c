// INICIO DEL ARCHIVO [tests/mirror/apps/authority/services/handle_governor.test.rs]
/**
 * =================================================================
 * APARATO: HANDLE GOVERNOR TEST (V2.1)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar el escenario contractual de protección
 *           (elonmusk / elonmuzk), el cacheo de veredictos y las
 *           alternativas disponibles.
 * =================================================================
 */

use chrono::Utc;
use entativa_authority::clock::FrozenClock;
use entativa_authority::config::AuthorityConfig;
use entativa_authority::errors::AuthorityError;
use entativa_authority::services::geolocation::NoopGeoResolver;
use entativa_authority::services::handle_governor::HandleGovernor;
use entativa_authority::state::AppState;
use entativa_core_credential::BloomBreachOracle;
use entativa_domain_models::protected_entity::{
    ProtectedCategory, ProtectedEntity, ProtectionKind,
};
use entativa_domain_notification::TracingSink;
use entativa_infra_cache::{KeyValueStore, MemoryKeyValueStore};
use entativa_infra_db::TursoClient;
use std::sync::Arc;
use uuid::Uuid;

async fn forge_state(label: &str) -> AppState {
    let client = TursoClient::connect(
        &format!("file:mem_governor_{}?mode=memory&cache=shared", label),
        None,
    )
    .await
    .expect("Fallo al inicializar DB en memoria");

    AppState::forge_with_collaborators(
        client,
        AuthorityConfig {
            bcrypt_cost: 4,
            ..AuthorityConfig::default()
        },
        Arc::new(FrozenClock::at(Utc::now())),
        Arc::new(MemoryKeyValueStore::new()),
        Arc::new(BloomBreachOracle::with_default_blocklist()),
        Arc::new(TracingSink),
        Arc::new(NoopGeoResolver),
    )
    .expect("ignición del estado colapsó")
}

async fn seed_elonmusk(governor: &HandleGovernor) {
    governor
        .register_protected_entity(&ProtectedEntity {
            id: Uuid::new_v4(),
            canonical_handle: "elonmusk".to_string(),
            aliases: vec!["elon".to_string()],
            category: ProtectedCategory::Business,
            display_name: "Elon Musk".to_string(),
            metadata_json: Some(r#"{"market_cap_usd":"1.1e12"}"#.to_string()),
            requires_verification: true,
            created_at: Utc::now(),
        })
        .await
        .expect("siembra del registro colapsó");
}

#[tokio::test]
async fn certify_contract_protection_scenario() {
    let state = forge_state("contract").await;
    let governor = HandleGovernor::new(state.clone());
    seed_elonmusk(&governor).await;

    // Coincidencia exacta: categoría BUSINESS, verificación exigida.
    let exact = governor.check_handle("elonmusk").await.unwrap();
    assert!(exact.protected);
    assert_eq!(exact.protection_kind, Some(ProtectionKind::Exact));
    assert_eq!(exact.category, Some(ProtectedCategory::Business));
    assert!(exact.requires_verification);
    assert!(exact.similarity_score.is_none());

    // Distancia 1: protección difusa con sim contractual [0.87, 0.89].
    let fuzzy = governor.check_handle("elonmuzk").await.unwrap();
    assert!(fuzzy.protected);
    assert_eq!(fuzzy.category, Some(ProtectedCategory::Business));
    let similarity = fuzzy.similarity_score.expect("similitud ausente");
    assert!(
        (0.87..=0.89).contains(&similarity),
        "sim fuera de ventana: {}",
        similarity
    );

    // El case-fold precede al lookup.
    let folded = governor.check_handle("ElonMusk").await.unwrap();
    assert!(folded.protected);

    // Un handle limpio queda disponible.
    assert!(governor.is_available("mycoolhandle").await.unwrap());
    assert!(!governor.is_available("elonmusk").await.unwrap());
}

#[tokio::test]
async fn certify_verdict_caching_under_protection_namespace() {
    let state = forge_state("cache").await;
    let governor = HandleGovernor::new(state.clone());
    seed_elonmusk(&governor).await;

    let _ = governor.check_handle("elonmusk").await.unwrap();

    // El veredicto quedó cristalizado bajo protection:{handle}.
    let cached_payload = state
        .cache
        .get(&entativa_infra_cache::keys::protection("elonmusk"))
        .await
        .unwrap();
    assert!(cached_payload.is_some(), "veredicto no cacheado");

    // Un segundo escrutinio sirve desde el caché (misma respuesta).
    let second = governor.check_handle("elonmusk").await.unwrap();
    assert!(second.protected);
    assert_eq!(second.category, Some(ProtectedCategory::Business));
}

#[tokio::test]
async fn certify_alternatives_are_available_and_capped() {
    let state = forge_state("alternatives").await;
    let governor = HandleGovernor::new(state.clone());
    seed_elonmusk(&governor).await;

    let verdict = governor.check_handle("elonmusk").await.unwrap();
    assert!(!verdict.suggested_alternatives.is_empty());
    assert!(verdict.suggested_alternatives.len() <= 5);

    // Toda alternativa sugerida es genuinamente reclamable.
    for alternative in &verdict.suggested_alternatives {
        assert!(
            governor.is_available(alternative).await.unwrap(),
            "alternativa no disponible: {}",
            alternative
        );
    }
}

#[tokio::test]
async fn certify_system_reserved_handles() {
    let state = forge_state("reserved").await;
    let governor = HandleGovernor::new(state.clone());

    state
        .protection_repository
        .insert_reserved("admin", "SYSTEM_RESERVED: administrative namespace", false, Utc::now())
        .await
        .unwrap();

    let verdict = governor.check_handle("admin").await.unwrap();
    assert!(verdict.protected);
    assert_eq!(verdict.protection_kind, Some(ProtectionKind::System));
    assert!(!verdict.requires_verification, "una reserva de sistema no se reclama");
    assert!(verdict.category.is_none());
}

#[tokio::test]
async fn certify_syntactic_violations_are_input_class() {
    let state = forge_state("syntax").await;
    let governor = HandleGovernor::new(state.clone());

    for broken in ["ab", "9lives", "alice__b", "alice_"] {
        let outcome = governor.check_handle(broken).await;
        assert!(
            matches!(outcome, Err(AuthorityError::InputViolation { .. })),
            "violación sintáctica mal clasificada: {}",
            broken
        );
    }
}
// FIN DEL ARCHIVO [tests/mirror/apps/authority/services/handle_governor.test.rs]

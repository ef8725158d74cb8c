// INICIO DEL ARCHIVO [tests/mirror/apps/authority/services/registration_governance.test.rs]
/**
 * =================================================================
 * APARATO: REGISTRATION GOVERNANCE TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar el registro gobernado: unicidad dual, veto de
 *           handles protegidos y política de credenciales.
 * =================================================================
 */

use chrono::Utc;
use entativa_authority::clock::FrozenClock;
use entativa_authority::config::AuthorityConfig;
use entativa_authority::errors::AuthorityError;
use entativa_authority::services::geolocation::NoopGeoResolver;
use entativa_authority::services::handle_governor::HandleGovernor;
use entativa_authority::services::session_authenticator::SessionAuthenticator;
use entativa_authority::state::AppState;
use entativa_core_credential::BloomBreachOracle;
use entativa_domain_models::identity::RegisterIdentityPayload;
use entativa_domain_models::protected_entity::{ProtectedCategory, ProtectedEntity};
use entativa_domain_notification::TracingSink;
use entativa_infra_cache::MemoryKeyValueStore;
use entativa_infra_db::TursoClient;
use std::sync::Arc;
use uuid::Uuid;

async fn forge_state(label: &str) -> AppState {
    let client = TursoClient::connect(
        &format!("file:mem_register_{}?mode=memory&cache=shared", label),
        None,
    )
    .await
    .expect("Fallo al inicializar DB en memoria");

    let config = AuthorityConfig {
        bcrypt_cost: 4,
        ..AuthorityConfig::default()
    };

    AppState::forge_with_collaborators(
        client,
        config,
        Arc::new(FrozenClock::at(Utc::now())),
        Arc::new(MemoryKeyValueStore::new()),
        Arc::new(BloomBreachOracle::with_default_blocklist()),
        Arc::new(TracingSink),
        Arc::new(NoopGeoResolver),
    )
    .expect("ignición del estado colapsó")
}

fn registration(eid: &str, email: &str, password: &str) -> RegisterIdentityPayload {
    RegisterIdentityPayload {
        eid: eid.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        phone_number: None,
        given_name: Some("Marina".to_string()),
        family_name: Some("Vega".to_string()),
        birth_year: Some(1991),
        request_ip: None,
        request_user_agent: None,
    }
}

#[tokio::test]
async fn certify_nominal_registration_and_dual_conflicts() {
    let state = forge_state("conflicts").await;
    let authenticator = SessionAuthenticator::new(state.clone());

    let identity = authenticator
        .register(registration("alice", "alice@entativa.id", "Str4tospheric!Nova88"))
        .await
        .expect("registro nominal colapsó");
    assert_eq!(identity.eid, "alice");
    assert_eq!(identity.failed_login_attempts, 0);

    // El perfil satélite nació junto a la raíz.
    let profile = state
        .identity_repository
        .fetch_profile(identity.id)
        .await
        .unwrap()
        .expect("perfil satélite ausente");
    assert_eq!(profile.given_name.as_deref(), Some("Marina"));

    // Conflicto de email clasificado.
    let email_clash = authenticator
        .register(registration("alice2", "alice@entativa.id", "Str4tospheric!Nova88"))
        .await;
    assert!(matches!(email_clash, Err(AuthorityError::DuplicateEmail)));

    // Conflicto de eid clasificado.
    let eid_clash = authenticator
        .register(registration("alice", "alice.two@entativa.id", "Str4tospheric!Nova88"))
        .await;
    assert!(matches!(eid_clash, Err(AuthorityError::DuplicateEid)));
}

#[tokio::test]
async fn certify_protected_handle_is_vetoed_with_remediation() {
    let state = forge_state("protected").await;
    let governor = HandleGovernor::new(state.clone());

    governor
        .register_protected_entity(&ProtectedEntity {
            id: Uuid::new_v4(),
            canonical_handle: "elonmusk".to_string(),
            aliases: vec!["elon".to_string()],
            category: ProtectedCategory::Business,
            display_name: "Elon Musk".to_string(),
            metadata_json: None,
            requires_verification: true,
            created_at: Utc::now(),
        })
        .await
        .unwrap();

    let authenticator = SessionAuthenticator::new(state);
    let vetoed = authenticator
        .register(registration("elonmusk", "impostor@example.com", "Str4tospheric!Nova88"))
        .await;

    let Err(AuthorityError::HandleProtected(verdict)) = vetoed else {
        panic!("se esperaba veto de protección");
    };
    assert!(verdict.protected);
    assert_eq!(verdict.category, Some(ProtectedCategory::Business));
    assert!(verdict.requires_verification);
    assert!(!verdict.suggested_alternatives.is_empty());
    assert!(verdict.suggested_alternatives.len() <= 5);
}

#[tokio::test]
async fn certify_credential_policy_gates() {
    let state = forge_state("credentials").await;
    let authenticator = SessionAuthenticator::new(state);

    // Piso de entropía: minúsculas puras de 8 no alcanzan 40 bits.
    let weak = authenticator
        .register(registration("weakuser", "weak@example.com", "abcdwxyz"))
        .await;
    assert!(matches!(
        weak,
        Err(AuthorityError::CredentialPolicyViolation(_))
    ));

    // Registro de brechas: material quemado rechazado aunque supere
    // el piso de entropía (11 chars sobre pool 36 ≈ 57 bits).
    let burned = authenticator
        .register(registration("burneduser", "burned@example.com", "password123"))
        .await;
    assert!(matches!(
        burned,
        Err(AuthorityError::CredentialPolicyViolation(_))
    ));

    // La sintaxis del eid es clase Input con detalle de campo.
    let broken_eid = authenticator
        .register(registration("9lives", "nine@example.com", "Str4tospheric!Nova88"))
        .await;
    assert!(matches!(
        broken_eid,
        Err(AuthorityError::InputViolation { .. })
    ));
}

#[tokio::test]
async fn certify_personal_context_penalties_can_sink_acceptance() {
    let state = forge_state("context").await;
    let authenticator = SessionAuthenticator::new(state);

    // 'marina' + '1991' dentro de la credencial: el contexto personal
    // penaliza, pero la aceptación depende del piso de entropía, que
    // esta credencial larga sí supera. El registro procede con
    // penalizaciones registradas (la política de brecha no aplica).
    let outcome = authenticator
        .register(registration(
            "marinafan",
            "marina.vega@example.com",
            "Marina1991#ExtraLongTailMaterial",
        ))
        .await;
    assert!(outcome.is_ok(), "el piso de entropía gobierna la aceptación");
}
// FIN DEL ARCHIVO [tests/mirror/apps/authority/services/registration_governance.test.rs]

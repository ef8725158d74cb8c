// INICIO DEL ARCHIVO [tests/mirror/apps/authority/services/revoke_introspect.test.rs]
/**
 * =================================================================
 * APARATO: REVOKE & INTROSPECT TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar la ley revoke(issue()) -> inactive inmediata,
 *           la idempotencia RFC 7009 y la opacidad RFC 7662.
 * =================================================================
 */

use chrono::Utc;
use entativa_authority::clock::FrozenClock;
use entativa_authority::config::AuthorityConfig;
use entativa_authority::errors::AuthorityError;
use entativa_authority::services::geolocation::NoopGeoResolver;
use entativa_authority::services::oauth_engine::OAuth2Engine;
use entativa_authority::services::session_authenticator::SessionAuthenticator;
use entativa_authority::services::token_service::TokenService;
use entativa_authority::state::AppState;
use entativa_core_credential::BloomBreachOracle;
use entativa_domain_models::identity::{Identity, RegisterIdentityPayload};
use entativa_domain_models::oauth_client::{ClientStatus, GrantKind, OAuthClient, PkcePolicy};
use entativa_domain_models::token::SecurityLevel;
use entativa_domain_notification::TracingSink;
use entativa_infra_cache::MemoryKeyValueStore;
use entativa_infra_db::TursoClient;
use std::sync::Arc;

async fn forge_state(label: &str) -> AppState {
    let client = TursoClient::connect(
        &format!("file:mem_revoke_{}?mode=memory&cache=shared", label),
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

async fn seed_fixture(state: &AppState) -> Identity {
    state
        .oauth_client_repository
        .upsert_client(&OAuthClient {
            client_id: "web-app".to_string(),
            client_secret_hash: None,
            client_name: "Entativa Web".to_string(),
            redirect_uris: vec!["https://app.entativa.com/callback".to_string()],
            allow_wildcard_redirects: false,
            allowed_scopes: vec!["openid".to_string(), "profile".to_string()],
            allowed_grants: vec![GrantKind::AuthorizationCode, GrantKind::RefreshToken],
            pkce_policy: PkcePolicy::Required,
            access_token_ttl_seconds: None,
            refresh_token_ttl_seconds: None,
            is_trusted: false,
            status: ClientStatus::Active,
            created_at: Utc::now(),
        })
        .await
        .unwrap();

    SessionAuthenticator::new(state.clone())
        .register(RegisterIdentityPayload {
            eid: "alice".to_string(),
            email: "alice@entativa.id".to_string(),
            password: "Str4tospheric!Nova88".to_string(),
            phone_number: None,
            given_name: None,
            family_name: None,
            birth_year: None,
            request_ip: None,
            request_user_agent: None,
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn certify_revoke_issue_law() {
    let state = forge_state("law").await;
    let alice = seed_fixture(&state).await;
    let engine = OAuth2Engine::new(state.clone());

    let bundle = TokenService::new(state.clone())
        .issue_session_bundle(
            &alice,
            Some("web-app".to_string()),
            vec!["openid".to_string()],
            None,
            None,
            None,
            SecurityLevel::Standard,
        )
        .await
        .unwrap();

    // Antes de la revocación: activo.
    assert!(engine
        .introspect(&bundle.access_token, "web-app", None)
        .await
        .unwrap()
        .active);

    // revoke(issue()) -> inactive inmediata.
    engine
        .revoke(&bundle.access_token, Some("access_token"), "web-app", None)
        .await
        .unwrap();

    let post = engine
        .introspect(&bundle.access_token, "web-app", None)
        .await
        .unwrap();
    assert!(!post.active);
    assert!(post.exp.is_none(), "la introspección inerte no revela nada");
}

#[tokio::test]
async fn certify_rfc7009_idempotency() {
    let state = forge_state("idempotent").await;
    let alice = seed_fixture(&state).await;
    let engine = OAuth2Engine::new(state.clone());

    let bundle = TokenService::new(state.clone())
        .issue_session_bundle(
            &alice,
            Some("web-app".to_string()),
            vec!["openid".to_string()],
            None,
            None,
            None,
            SecurityLevel::Standard,
        )
        .await
        .unwrap();

    // Doble revocación del mismo material: ambas reportan éxito.
    engine
        .revoke(&bundle.refresh_token, Some("refresh_token"), "web-app", None)
        .await
        .unwrap();
    engine
        .revoke(&bundle.refresh_token, Some("refresh_token"), "web-app", None)
        .await
        .unwrap();

    // Material irreconocible: también éxito (jamás un error observable).
    engine
        .revoke("complete.garbage.material", None, "web-app", None)
        .await
        .unwrap();
}

#[tokio::test]
async fn certify_client_authentication_still_gates_both_endpoints() {
    let state = forge_state("clientauth").await;
    let _alice = seed_fixture(&state).await;
    let engine = OAuth2Engine::new(state.clone());

    // Cliente desconocido: invalid_client en ambos frentes.
    let unknown_revoke = engine.revoke("material", None, "ghost-client", None).await;
    assert!(matches!(
        unknown_revoke,
        Err(AuthorityError::ClientAuthenticationFailed)
    ));

    let unknown_introspect = engine.introspect("material", "ghost-client", None).await;
    assert!(matches!(
        unknown_introspect,
        Err(AuthorityError::ClientAuthenticationFailed)
    ));

    // Un cliente público que PRESENTA secreto también es rechazado.
    let with_secret = engine
        .introspect("material", "web-app", Some("uninvited-secret"))
        .await;
    assert!(matches!(
        with_secret,
        Err(AuthorityError::ClientAuthenticationFailed)
    ));
}

#[tokio::test]
async fn certify_garbage_introspection_is_opaque() {
    let state = forge_state("opaque").await;
    let _alice = seed_fixture(&state).await;
    let engine = OAuth2Engine::new(state.clone());

    let verdict = engine
        .introspect("not.a.jwt", "web-app", None)
        .await
        .unwrap();
    assert!(!verdict.active);
    assert!(verdict.sub.is_none());
    assert!(verdict.scope.is_none());
    assert!(verdict.token_type.is_none());
}
// FIN DEL ARCHIVO [tests/mirror/apps/authority/services/revoke_introspect.test.rs]

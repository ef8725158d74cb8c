// INICIO DEL ARCHIVO [tests/mirror/apps/authority/services/refresh_rotation.test.rs]
/**
 * =================================================================
 * APARATO: REFRESH ROTATION TEST (V2.1)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar rotación contractual, defensa anti-replay del
 *           refresh y narrowing de scopes (ensanchamiento vetado).
 * =================================================================
 */

use chrono::Utc;
use entativa_authority::clock::FrozenClock;
use entativa_authority::config::AuthorityConfig;
use entativa_authority::errors::AuthorityError;
use entativa_authority::services::geolocation::NoopGeoResolver;
use entativa_authority::services::oauth_engine::{OAuth2Engine, TokenGrantRequest};
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
        &format!("file:mem_rotation_{}?mode=memory&cache=shared", label),
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
            allowed_scopes: vec![
                "openid".to_string(),
                "profile".to_string(),
                "email".to_string(),
            ],
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

/// Emite un par ligado al cliente web-app con los scopes indicados.
async fn issue_bundle(
    state: &AppState,
    identity: &Identity,
    scopes: &[&str],
) -> entativa_authority::services::token_service::SessionTokenBundle {
    TokenService::new(state.clone())
        .issue_session_bundle(
            identity,
            Some("web-app".to_string()),
            scopes.iter().map(|s| s.to_string()).collect(),
            None,
            None,
            None,
            SecurityLevel::Standard,
        )
        .await
        .expect("emisión del par colapsó")
}

#[tokio::test]
async fn certify_contract_rotation_and_replay_defense() {
    let state = forge_state("replay").await;
    let alice = seed_fixture(&state).await;
    let engine = OAuth2Engine::new(state.clone());

    let original = issue_bundle(&state, &alice, &["openid", "profile"]).await;
    let refresh_r1 = original.refresh_token.clone();

    // 1. ROTACIÓN NOMINAL: R1 -> (A2, R2).
    let rotated = engine
        .token(TokenGrantRequest::RefreshToken {
            refresh_token: refresh_r1.clone(),
            client_id: "web-app".to_string(),
            client_secret: None,
            scope: None,
        })
        .await
        .expect("la rotación nominal colapsó");
    let access_a2 = rotated.access_token.clone();
    let refresh_r2 = rotated.refresh_token.clone().expect("política always entrega R2");
    assert_ne!(refresh_r1, refresh_r2);

    // 2. REUSO INMEDIATO DE R1: invalid_grant.
    let replay = engine
        .token(TokenGrantRequest::RefreshToken {
            refresh_token: refresh_r1,
            client_id: "web-app".to_string(),
            client_secret: None,
            scope: None,
        })
        .await;
    let Err(replay_fault) = replay else {
        panic!("el reuso de R1 debe fallar");
    };
    assert_eq!(replay_fault.oauth_error_code(), Some("invalid_grant"));

    // 3. ESCENARIO CONTRACTUAL: A2 NO queda revocado por el replay.
    let a2_state = engine.introspect(&access_a2, "web-app", None).await.unwrap();
    assert!(a2_state.active, "A2 debe sobrevivir al replay de R1");

    // 4. LEY DE IDA Y VUELTA: el refresh sucesor (R2) sí cae.
    let r2_state = engine.introspect(&refresh_r2, "web-app", None).await.unwrap();
    assert!(!r2_state.active, "la defensa incinera el refresh rotado-in");
}

#[tokio::test]
async fn certify_scope_narrowing_and_widening() {
    let state = forge_state("narrowing").await;
    let alice = seed_fixture(&state).await;
    let engine = OAuth2Engine::new(state.clone());

    let original = issue_bundle(&state, &alice, &["openid", "profile"]).await;

    // NARROWING: subconjunto admitido; el access nuevo porta solo 'openid'.
    let narrowed = engine
        .token(TokenGrantRequest::RefreshToken {
            refresh_token: original.refresh_token.clone(),
            client_id: "web-app".to_string(),
            client_secret: None,
            scope: Some("openid".to_string()),
        })
        .await
        .expect("el narrowing debe proceder");
    assert_eq!(narrowed.scope.as_deref(), Some("openid"));

    let claims = TokenService::new(state.clone())
        .validate_access_token(&narrowed.access_token)
        .await
        .unwrap();
    assert_eq!(claims.scope.as_deref(), Some("openid"));

    // WIDENING: superconjunto vetado con invalid_scope.
    let widened = engine
        .token(TokenGrantRequest::RefreshToken {
            refresh_token: narrowed.refresh_token.clone().unwrap(),
            client_id: "web-app".to_string(),
            client_secret: None,
            scope: Some("openid profile email".to_string()),
        })
        .await;
    let Err(widening_fault) = widened else {
        panic!("el ensanchamiento debe fallar");
    };
    assert_eq!(widening_fault.oauth_error_code(), Some("invalid_scope"));
}

#[tokio::test]
async fn certify_foreign_client_cannot_rotate() {
    let state = forge_state("binding").await;
    let alice = seed_fixture(&state).await;

    // Cliente confidencial ajeno, correctamente autenticado.
    let foreign_secret_hash = bcrypt::hash("foreign-secret", 4).unwrap();
    state
        .oauth_client_repository
        .upsert_client(&OAuthClient {
            client_id: "foreign-app".to_string(),
            client_secret_hash: Some(foreign_secret_hash),
            client_name: "Foreign".to_string(),
            redirect_uris: vec!["https://foreign.example/cb".to_string()],
            allow_wildcard_redirects: false,
            allowed_scopes: vec!["openid".to_string()],
            allowed_grants: vec![GrantKind::RefreshToken],
            pkce_policy: PkcePolicy::Optional,
            access_token_ttl_seconds: None,
            refresh_token_ttl_seconds: None,
            is_trusted: false,
            status: ClientStatus::Active,
            created_at: Utc::now(),
        })
        .await
        .unwrap();

    let original = issue_bundle(&state, &alice, &["openid"]).await;
    let engine = OAuth2Engine::new(state.clone());

    // El refresh está ligado a web-app: foreign-app no puede rotarlo.
    let hijack = engine
        .token(TokenGrantRequest::RefreshToken {
            refresh_token: original.refresh_token,
            client_id: "foreign-app".to_string(),
            client_secret: Some("foreign-secret".to_string()),
            scope: None,
        })
        .await;
    assert!(matches!(hijack, Err(AuthorityError::InvalidGrant(_))));
}
// FIN DEL ARCHIVO [tests/mirror/apps/authority/services/refresh_rotation.test.rs]

// INICIO DEL ARCHIVO [tests/mirror/apps/authority/services/oauth_code_flow.test.rs]
/**
 * =================================================================
 * APARATO: OAUTH CODE FLOW TEST (V2.1)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar el flujo contractual completo con PKCE S256:
 *           authorize -> consent -> code -> token -> introspect.
 * =================================================================
 */

use base64::engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL;
use base64::Engine;
use chrono::Utc;
use entativa_authority::clock::FrozenClock;
use entativa_authority::config::AuthorityConfig;
use entativa_authority::errors::AuthorityError;
use entativa_authority::services::geolocation::NoopGeoResolver;
use entativa_authority::services::oauth_engine::{
    AuthorizeConfirmRequest, AuthorizeRequest, OAuth2Engine, TokenGrantRequest,
};
use entativa_authority::services::session_authenticator::SessionAuthenticator;
use entativa_authority::services::token_service::TokenService;
use entativa_authority::state::AppState;
use entativa_core_credential::BloomBreachOracle;
use entativa_domain_models::identity::{Identity, RegisterIdentityPayload};
use entativa_domain_models::oauth_client::{ClientStatus, GrantKind, OAuthClient, PkcePolicy};
use entativa_domain_notification::TracingSink;
use entativa_infra_cache::MemoryKeyValueStore;
use entativa_infra_db::TursoClient;
use sha2::{Digest, Sha256};
use std::sync::Arc;

const REDIRECT_URI: &str = "https://app.entativa.com/callback";
const VERIFIER: &str = "kQ9vR2mZ7pXw4LbT8nJc1YdF6hG3sA5uE0iO9xW2qM4rK7tP1zB5vN8cD3fH6jL0";

async fn forge_state(label: &str) -> AppState {
    let client = TursoClient::connect(
        &format!("file:mem_oauth_{}?mode=memory&cache=shared", label),
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

async fn seed_public_client(state: &AppState) {
    state
        .oauth_client_repository
        .upsert_client(&OAuthClient {
            client_id: "web-app".to_string(),
            client_secret_hash: None,
            client_name: "Entativa Web".to_string(),
            redirect_uris: vec![REDIRECT_URI.to_string()],
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
        .expect("siembra de cliente colapsó");
}

async fn seed_alice(state: &AppState) -> Identity {
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
        .expect("registro de alice colapsó")
}

fn s256_challenge(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    BASE64_URL.encode(hasher.finalize())
}

fn extract_query_parameter(redirect: &str, key: &str) -> String {
    redirect
        .split(&format!("{}=", key))
        .nth(1)
        .unwrap_or_default()
        .split('&')
        .next()
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn certify_contract_pkce_flow() {
    let state = forge_state("pkce").await;
    seed_public_client(&state).await;
    let alice = seed_alice(&state).await;
    let engine = OAuth2Engine::new(state.clone());

    // 1. AUTHORIZE: registro pendiente + URL de consentimiento.
    let staged = engine
        .authorize(AuthorizeRequest {
            client_id: "web-app".to_string(),
            redirect_uri: REDIRECT_URI.to_string(),
            response_type: "code".to_string(),
            scope: Some("openid profile".to_string()),
            state: Some("xyz123".to_string()),
            code_challenge: Some(s256_challenge(VERIFIER)),
            code_challenge_method: Some("S256".to_string()),
        })
        .await
        .expect("authorize colapsó");
    assert!(staged.requires_consent);
    assert!(staged.consent_url.contains(&staged.request_id.to_string()));

    // 2. CONSENT: aprobación con los scopes solicitados.
    let confirmed = engine
        .authorize_confirm(AuthorizeConfirmRequest {
            request_id: staged.request_id,
            user_id: alice.id,
            approved_scopes: staged.requested_scopes.clone(),
            approved: true,
        })
        .await
        .expect("consentimiento colapsó");
    assert!(!confirmed.denied);
    assert!(confirmed.redirect_uri.starts_with(REDIRECT_URI));
    assert!(confirmed.redirect_uri.contains("state=xyz123"));

    let code = extract_query_parameter(&confirmed.redirect_uri, "code");
    assert_eq!(code.len(), 32, "código opaco contractual de 32 chars");

    // 3. TOKEN: canje con el verificador PKCE.
    let response = engine
        .token(TokenGrantRequest::AuthorizationCode {
            code: code.clone(),
            redirect_uri: REDIRECT_URI.to_string(),
            client_id: "web-app".to_string(),
            client_secret: None,
            code_verifier: Some(VERIFIER.to_string()),
        })
        .await
        .expect("canje colapsó");

    assert_eq!(response.token_type, "Bearer");
    assert_eq!(response.expires_in, 900);
    assert_eq!(response.scope.as_deref(), Some("openid profile"));
    let refresh_token = response.refresh_token.clone().expect("refresh ausente");
    assert!(!refresh_token.is_empty());

    // 4. CLAIMS DEL ACCESS: sub = alice, scope contractual.
    let token_service = TokenService::new(state.clone());
    let claims = token_service
        .validate_access_token(&response.access_token)
        .await
        .expect("validación colapsó");
    assert_eq!(claims.sub, alice.id.to_string());
    assert_eq!(claims.eid.as_deref(), Some("alice"));
    assert_eq!(claims.scope.as_deref(), Some("openid profile"));
    assert_eq!(claims.client_id.as_deref(), Some("web-app"));

    // 5. INTROSPECT: activo con metadatos mínimos.
    let introspection = engine
        .introspect(&response.access_token, "web-app", None)
        .await
        .unwrap();
    assert!(introspection.active);
    assert_eq!(introspection.sub.as_deref(), Some(alice.id.to_string().as_str()));
    assert_eq!(introspection.token_type.as_deref(), Some("access"));

    // 6. USERINFO: claims gobernados por scope.
    let userinfo = engine.user_info(&response.access_token).await.unwrap();
    assert_eq!(userinfo["sub"], alice.id.to_string());
    assert_eq!(userinfo["preferred_username"], "alice");
    // Sin scope 'email' el claim email no atraviesa.
    assert!(userinfo.get("email").is_none());
}

#[tokio::test]
async fn certify_pkce_mismatch_is_rejected() {
    let state = forge_state("mismatch").await;
    seed_public_client(&state).await;
    let alice = seed_alice(&state).await;
    let engine = OAuth2Engine::new(state.clone());

    let staged = engine
        .authorize(AuthorizeRequest {
            client_id: "web-app".to_string(),
            redirect_uri: REDIRECT_URI.to_string(),
            response_type: "code".to_string(),
            scope: Some("openid".to_string()),
            state: None,
            code_challenge: Some(s256_challenge(VERIFIER)),
            code_challenge_method: Some("S256".to_string()),
        })
        .await
        .unwrap();

    let confirmed = engine
        .authorize_confirm(AuthorizeConfirmRequest {
            request_id: staged.request_id,
            user_id: alice.id,
            approved_scopes: vec!["openid".to_string()],
            approved: true,
        })
        .await
        .unwrap();
    let code = extract_query_parameter(&confirmed.redirect_uri, "code");

    // Verificador ajeno: PKCE no reproduce el desafío.
    let outcome = engine
        .token(TokenGrantRequest::AuthorizationCode {
            code,
            redirect_uri: REDIRECT_URI.to_string(),
            client_id: "web-app".to_string(),
            client_secret: None,
            code_verifier: Some("a-completely-different-verifier-material-here".to_string()),
        })
        .await;

    let Err(fault) = outcome else {
        panic!("el verificador ajeno debe ser rechazado");
    };
    assert!(matches!(fault, AuthorityError::PkceMismatch));
    assert_eq!(fault.oauth_error_code(), Some("invalid_grant"));
}

#[tokio::test]
async fn certify_authorize_front_gates() {
    let state = forge_state("gates").await;
    seed_public_client(&state).await;
    let engine = OAuth2Engine::new(state.clone());

    // URI no registrada: error directo, jamás redirección.
    let foreign_uri = engine
        .authorize(AuthorizeRequest {
            client_id: "web-app".to_string(),
            redirect_uri: "https://evil.example/steal".to_string(),
            response_type: "code".to_string(),
            scope: Some("openid".to_string()),
            state: None,
            code_challenge: Some(s256_challenge(VERIFIER)),
            code_challenge_method: Some("S256".to_string()),
        })
        .await;
    assert!(matches!(foreign_uri, Err(AuthorityError::InvalidRequest(_))));

    // PKCE ausente en cliente público: invalid_request.
    let no_pkce = engine
        .authorize(AuthorizeRequest {
            client_id: "web-app".to_string(),
            redirect_uri: REDIRECT_URI.to_string(),
            response_type: "code".to_string(),
            scope: Some("openid".to_string()),
            state: None,
            code_challenge: None,
            code_challenge_method: None,
        })
        .await;
    assert!(matches!(no_pkce, Err(AuthorityError::InvalidRequest(_))));

    // Scope fuera del registro del cliente: invalid_scope.
    let foreign_scope = engine
        .authorize(AuthorizeRequest {
            client_id: "web-app".to_string(),
            redirect_uri: REDIRECT_URI.to_string(),
            response_type: "code".to_string(),
            scope: Some("openid admin.write".to_string()),
            state: None,
            code_challenge: Some(s256_challenge(VERIFIER)),
            code_challenge_method: Some("S256".to_string()),
        })
        .await;
    let Err(scope_fault) = foreign_scope else {
        panic!("scope ajeno admitido");
    };
    assert_eq!(scope_fault.oauth_error_code(), Some("invalid_scope"));

    // Negación del consentimiento: redirección con access_denied.
    let staged = engine
        .authorize(AuthorizeRequest {
            client_id: "web-app".to_string(),
            redirect_uri: REDIRECT_URI.to_string(),
            response_type: "code".to_string(),
            scope: Some("openid".to_string()),
            state: Some("denied-state".to_string()),
            code_challenge: Some(s256_challenge(VERIFIER)),
            code_challenge_method: Some("S256".to_string()),
        })
        .await
        .unwrap();
    let denial = engine
        .authorize_confirm(AuthorizeConfirmRequest {
            request_id: staged.request_id,
            user_id: uuid::Uuid::new_v4(),
            approved_scopes: vec![],
            approved: false,
        })
        .await
        .unwrap();
    assert!(denial.denied);
    assert!(denial.redirect_uri.contains("error=access_denied"));
    assert!(denial.redirect_uri.contains("state=denied-state"));
}

#[tokio::test]
async fn certify_discovery_and_jwks_surface() {
    let state = forge_state("discovery").await;
    let engine = OAuth2Engine::new(state.clone());

    let discovery = engine.discovery_document();
    assert_eq!(discovery.issuer, state.config.issuer);
    assert!(discovery.token_endpoint.ends_with("/oauth2/token"));
    assert!(discovery.jwks_uri.ends_with("/oauth2/jwks"));
    assert!(discovery
        .code_challenge_methods_supported
        .contains(&"S256".to_string()));

    let jwks = engine.jwks_document().unwrap();
    assert_eq!(jwks.keys.len(), 1);
    assert_eq!(jwks.keys[0].alg, "RS256");
}
// FIN DEL ARCHIVO [tests/mirror/apps/authority/services/oauth_code_flow.test.rs]

// INICIO DEL ARCHIVO [tests/mirror/apps/authority/services/session_lockout.test.rs]
/**
 * =================================================================
 * APARATO: SESSION LOCKOUT TEST (V2.1)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar el escenario contractual de lockout: 5 fallos
 *           en ventana -> veto de 30 min incluso con la contraseña
 *           correcta; expiración del veto -> acceso restaurado.
 * =================================================================
 */

use chrono::{Duration, Utc};
use entativa_authority::clock::{Clock, FrozenClock};
use entativa_authority::config::AuthorityConfig;
use entativa_authority::errors::AuthorityError;
use entativa_authority::services::geolocation::NoopGeoResolver;
use entativa_authority::services::session_authenticator::{LoginOutcome, SessionAuthenticator};
use entativa_authority::state::AppState;
use entativa_core_credential::BloomBreachOracle;
use entativa_domain_models::identity::RegisterIdentityPayload;
use entativa_domain_notification::TracingSink;
use entativa_infra_cache::{KeyValueStore, MemoryKeyValueStore};
use entativa_infra_db::TursoClient;
use std::sync::Arc;

const GOOD_PASSWORD: &str = "Str4tospheric!Nova88";

async fn forge_state(label: &str, clock: Arc<FrozenClock>) -> AppState {
    let client = TursoClient::connect(
        &format!("file:mem_lockout_{}?mode=memory&cache=shared", label),
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
        clock,
        Arc::new(MemoryKeyValueStore::new()),
        Arc::new(BloomBreachOracle::with_default_blocklist()),
        Arc::new(TracingSink),
        Arc::new(NoopGeoResolver),
    )
    .expect("ignición del estado colapsó")
}

fn registration(eid: &str, email: &str) -> RegisterIdentityPayload {
    RegisterIdentityPayload {
        eid: eid.to_string(),
        email: email.to_string(),
        password: GOOD_PASSWORD.to_string(),
        phone_number: None,
        given_name: None,
        family_name: None,
        birth_year: None,
        request_ip: None,
        request_user_agent: None,
    }
}

#[tokio::test]
async fn certify_contract_lockout_scenario() {
    let clock = Arc::new(FrozenClock::at(Utc::now()));
    let state = forge_state("contract", clock.clone()).await;
    let authenticator = SessionAuthenticator::new(state.clone());

    authenticator
        .register(registration("bob", "bob@example.com"))
        .await
        .expect("registro colapsó");

    // 1. CINCO FALLOS DENTRO DE LA VENTANA: rechazo genérico.
    for _ in 0..5 {
        let outcome = authenticator
            .login("bob@example.com", "wrong-password", None, None)
            .await;
        assert!(matches!(outcome, Err(AuthorityError::InvalidCredentials)));
    }

    // 2. SEXTO INTENTO CON LA CONTRASEÑA CORRECTA: veto vigente.
    let vetoed = authenticator
        .login("bob@example.com", GOOD_PASSWORD, None, None)
        .await;
    assert!(
        matches!(vetoed, Err(AuthorityError::IdentityLocked { .. })),
        "el veto debe dominar sobre la credencial correcta"
    );

    // 3. EL VETO EXPIRA (now + 1800 s): acceso restaurado.
    clock.advance(Duration::seconds(1801));
    let restored = authenticator
        .login("bob@example.com", GOOD_PASSWORD, None, None)
        .await
        .expect("el veto expirado debe liberar el acceso");
    assert!(matches!(restored, LoginOutcome::Established(_)));

    // 4. El contador durable quedó en cero tras el éxito.
    let identity = state
        .identity_repository
        .fetch_by_email("bob@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(identity.failed_login_attempts, 0);
    assert!(identity.locked_until.is_none());
}

#[tokio::test]
async fn certify_failure_counter_increments_by_exactly_one() {
    let clock = Arc::new(FrozenClock::at(Utc::now()));
    let state = forge_state("counter", clock.clone()).await;
    let authenticator = SessionAuthenticator::new(state.clone());

    authenticator
        .register(registration("carol", "carol@example.com"))
        .await
        .unwrap();

    for expected in 1..=3u32 {
        let _ = authenticator
            .login("carol@example.com", "nope", None, None)
            .await;
        let identity = state
            .identity_repository
            .fetch_by_email("carol@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(identity.failed_login_attempts, expected);
    }
}

#[tokio::test]
async fn certify_unknown_subject_is_indistinguishable() {
    let clock = Arc::new(FrozenClock::at(Utc::now()));
    let state = forge_state("opaque", clock.clone()).await;
    let authenticator = SessionAuthenticator::new(state);

    // La cuenta no existe: mismo rechazo genérico que una contraseña mala.
    let outcome = authenticator
        .login("ghost@example.com", "whatever-material", None, None)
        .await;
    assert!(matches!(outcome, Err(AuthorityError::InvalidCredentials)));
}

#[tokio::test]
async fn certify_session_bundle_shape_on_success() {
    let clock = Arc::new(FrozenClock::at(Utc::now()));
    let state = forge_state("bundle", clock.clone()).await;
    let authenticator = SessionAuthenticator::new(state.clone());

    authenticator
        .register(registration("dave", "dave@example.com"))
        .await
        .unwrap();

    let outcome = authenticator
        .login(
            "dave@example.com",
            GOOD_PASSWORD,
            Some("TestAgent/1.0".to_string()),
            Some("203.0.113.7".to_string()),
        )
        .await
        .unwrap();

    let LoginOutcome::Established(bundle) = outcome else {
        panic!("se esperaba sesión establecida");
    };

    // El par quedó ligado a la fila de sesión (ids, no punteros).
    assert_eq!(bundle.session.access_token_id, bundle.access_jti);
    assert_eq!(bundle.session.refresh_token_id, bundle.refresh_jti);
    assert_eq!(bundle.session.user_agent.as_deref(), Some("TestAgent/1.0"));

    // Vidas contractuales: access 900 s, refresh 30 días.
    let access_life = bundle.access_expires_at - clock.now();
    assert_eq!(access_life.num_seconds(), 900);
    let refresh_life = bundle.refresh_expires_at - clock.now();
    assert_eq!(refresh_life.num_days(), 30);

    // La proyección efímera de la sesión existe.
    let projection = state
        .cache
        .get(&entativa_infra_cache::keys::session(bundle.session.id))
        .await
        .unwrap();
    assert!(projection.is_some());
}
// FIN DEL ARCHIVO [tests/mirror/apps/authority/services/session_lockout.test.rs]

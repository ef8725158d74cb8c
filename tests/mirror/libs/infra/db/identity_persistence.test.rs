// INICIO DEL ARCHIVO [tests/mirror/libs/infra/db/identity_persistence.test.rs]
/**
 * =================================================================
 * APARATO: IDENTITY PERSISTENCE TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar unicidad dual, lockout atómico y reescritura
 *           gobernada del eid.
 * =================================================================
 */

use chrono::{Duration, Utc};
use entativa_domain_models::identity::{
    Identity, IdentityStatus, Profile, VerificationStatus,
};
use entativa_infra_db::repositories::IdentityRepository;
use entativa_infra_db::{DbError, TursoClient};
use uuid::Uuid;

fn forge_identity(eid: &str, email: &str) -> Identity {
    let now = Utc::now();
    Identity {
        id: Uuid::new_v4(),
        eid: eid.to_string(),
        email: email.to_string(),
        phone_number: None,
        password_hash: "$2b$04$testmaterialtestmaterialte".to_string(),
        status: IdentityStatus::Active,
        verification_status: VerificationStatus::Unverified,
        verification_badge: None,
        reputation_score: 50.0,
        failed_login_attempts: 0,
        locked_until: None,
        last_login_at: None,
        created_at: now,
        updated_at: now,
        created_ip: Some("10.0.0.1".to_string()),
        created_user_agent: None,
    }
}

async fn forge_client(label: &str) -> TursoClient {
    TursoClient::connect(
        &format!("file:mem_identity_{}?mode=memory&cache=shared", label),
        None,
    )
    .await
    .expect("Fallo al inicializar DB en memoria")
}

#[tokio::test]
async fn certify_registration_and_dual_uniqueness() {
    let client = forge_client("uniqueness").await;
    let repo = IdentityRepository::new(client.clone());
    let now = Utc::now();

    let alice = forge_identity("alice", "alice@entativa.id");
    let profile = Profile::bootstrap_for(alice.id, now);
    repo.register_identity(&alice, &profile).await.expect("registro colapsó");

    // Recuperación por las tres coordenadas.
    assert!(repo.fetch_by_id(alice.id).await.unwrap().is_some());
    assert!(repo.fetch_by_email("alice@entativa.id").await.unwrap().is_some());
    let rehydrated = repo.fetch_by_eid("alice").await.unwrap().unwrap();
    assert_eq!(rehydrated.email, "alice@entativa.id");
    assert_eq!(rehydrated.status, IdentityStatus::Active);

    // Violación de email clasificada.
    let email_clone = forge_identity("alice2", "alice@entativa.id");
    let email_profile = Profile::bootstrap_for(email_clone.id, now);
    assert!(matches!(
        repo.register_identity(&email_clone, &email_profile).await,
        Err(DbError::DuplicateEmail)
    ));

    // Violación de eid clasificada.
    let eid_clone = forge_identity("alice", "alice.second@entativa.id");
    let eid_profile = Profile::bootstrap_for(eid_clone.id, now);
    assert!(matches!(
        repo.register_identity(&eid_clone, &eid_profile).await,
        Err(DbError::DuplicateEid)
    ));

    assert!(repo.eid_exists("alice").await.unwrap());
    assert!(!repo.eid_exists("nonexistent").await.unwrap());
}

#[tokio::test]
async fn certify_lockout_counter_physics() {
    let client = forge_client("lockout").await;
    let repo = IdentityRepository::new(client.clone());
    let now = Utc::now();

    let bob = forge_identity("bob", "bob@example.com");
    let profile = Profile::bootstrap_for(bob.id, now);
    repo.register_identity(&bob, &profile).await.unwrap();

    // Cada fallo incrementa exactamente en 1 y retorna el valor nuevo.
    for expected in 1..=5u32 {
        let observed = repo.record_login_failure(bob.id, now).await.unwrap();
        assert_eq!(observed, expected);
    }

    // Veto temporal sellado.
    let locked_until = now + Duration::minutes(30);
    repo.engage_lockout(bob.id, locked_until, now).await.unwrap();
    let locked = repo.fetch_by_id(bob.id).await.unwrap().unwrap();
    assert_eq!(locked.status, IdentityStatus::Locked);
    assert!(locked.is_locked_at(now));
    assert!(!locked.is_locked_at(now + Duration::minutes(31)));

    // El éxito resetea contador, veto y estado.
    repo.reset_login_state(bob.id, now).await.unwrap();
    let restored = repo.fetch_by_id(bob.id).await.unwrap().unwrap();
    assert_eq!(restored.failed_login_attempts, 0);
    assert_eq!(restored.status, IdentityStatus::Active);
    assert!(restored.locked_until.is_none());
    assert!(restored.last_login_at.is_some());
}

#[tokio::test]
async fn certify_lapsed_veto_release_sweep() {
    let client = forge_client("warden").await;
    let repo = IdentityRepository::new(client.clone());
    let now = Utc::now();

    // Identidad con veto YA vencido (el guardián debe restaurarla).
    let lapsed = forge_identity("lapsed_user", "lapsed@example.com");
    repo.register_identity(&lapsed, &Profile::bootstrap_for(lapsed.id, now))
        .await
        .unwrap();
    repo.engage_lockout(lapsed.id, now - Duration::minutes(5), now)
        .await
        .unwrap();

    // Identidad con veto vigente (intocable en este barrido).
    let vetoed = forge_identity("vetoed_user", "vetoed@example.com");
    repo.register_identity(&vetoed, &Profile::bootstrap_for(vetoed.id, now))
        .await
        .unwrap();
    repo.engage_lockout(vetoed.id, now + Duration::minutes(30), now)
        .await
        .unwrap();

    let restored = repo.release_lapsed_lockouts(now).await.unwrap();
    assert_eq!(restored, vec![lapsed.id], "solo el veto lapsado se libera");

    let healed = repo.fetch_by_id(lapsed.id).await.unwrap().unwrap();
    assert_eq!(healed.status, IdentityStatus::Active);
    assert!(healed.locked_until.is_none());

    let untouched = repo.fetch_by_id(vetoed.id).await.unwrap().unwrap();
    assert_eq!(untouched.status, IdentityStatus::Locked);
    assert!(untouched.locked_until.is_some());

    // Barrido idempotente: sin vetos lapsados no hay filas tocadas.
    assert!(repo.release_lapsed_lockouts(now).await.unwrap().is_empty());

    // El latido del enlace responde sobre un libro mayor sano.
    client.ping().await.expect("heartbeat colapsó");
}

#[tokio::test]
async fn certify_eid_rewrite_leaves_history_trail() {
    let client = forge_client("rewrite").await;
    let repo = IdentityRepository::new(client.clone());
    let now = Utc::now();

    let carol = forge_identity("carol_draft", "carol@entativa.id");
    let profile = Profile::bootstrap_for(carol.id, now);
    repo.register_identity(&carol, &profile).await.unwrap();

    repo.rewrite_eid(carol.id, "carol_draft", "carol", "reservation_approved", now)
        .await
        .unwrap();

    let renamed = repo.fetch_by_id(carol.id).await.unwrap().unwrap();
    assert_eq!(renamed.eid, "carol");

    // El rastro histórico cristalizó en la misma transacción.
    let conn = client.acquire_connection().unwrap();
    let mut rows = conn
        .query(
            "SELECT previous_eid, new_eid, reason FROM handle_change_history WHERE identity_id = ?1",
            libsql::params![carol.id.to_string()],
        )
        .await
        .unwrap();
    let row = rows.next().await.unwrap().expect("rastro histórico ausente");
    assert_eq!(row.get::<String>(0).unwrap(), "carol_draft");
    assert_eq!(row.get::<String>(1).unwrap(), "carol");
    assert_eq!(row.get::<String>(2).unwrap(), "reservation_approved");

    println!("✅ IDENTITY: Persistence, lockout and rewrite certified.");
}
// FIN DEL ARCHIVO [tests/mirror/libs/infra/db/identity_persistence.test.rs]

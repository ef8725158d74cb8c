// INICIO DEL ARCHIVO [tests/mirror/libs/infra/db/auth_code_atomicity.test.rs]
/**
 * =================================================================
 * APARATO: AUTH CODE ATOMICITY TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar el compare-and-swap del consumo de códigos y
 *           la clasificación forense del perdedor.
 * =================================================================
 */

use chrono::{Duration, Utc};
use entativa_core_token_forge::{forge_authorization_code, sha256_digest_hex};
use entativa_domain_models::oauth_flow::{AuthorizationCode, CodeChallengeMethod};
use entativa_infra_db::repositories::token::ConsumeOutcome;
use entativa_infra_db::repositories::TokenRepository;
use entativa_infra_db::TursoClient;
use uuid::Uuid;

fn forge_code(ttl_seconds: i64) -> (AuthorizationCode, String) {
    let now = Utc::now();
    let plaintext = forge_authorization_code();
    let code = AuthorizationCode {
        id: Uuid::new_v4(),
        code_hash: sha256_digest_hex(&plaintext),
        client_id: "web-app".to_string(),
        identity_id: Uuid::new_v4(),
        redirect_uri: "https://app.entativa.com/callback".to_string(),
        scopes: vec!["openid".to_string(), "profile".to_string()],
        code_challenge: Some("challenge-material".to_string()),
        challenge_method: Some(CodeChallengeMethod::S256),
        used: false,
        created_at: now,
        expires_at: now + Duration::seconds(ttl_seconds),
    };
    (code, plaintext)
}

#[tokio::test]
async fn certify_single_use_compare_and_swap() {
    let client = TursoClient::connect("file:mem_cas_single?mode=memory&cache=shared", None)
        .await
        .expect("Fallo al inicializar DB en memoria");
    let repo = TokenRepository::new(client.clone());
    let now = Utc::now();

    let (code, _plaintext) = forge_code(600);
    repo.insert_auth_code(&code).await.unwrap();

    // Primer canjeador gana y recibe la fila sellada.
    match repo.consume_auth_code(&code.code_hash, now).await.unwrap() {
        ConsumeOutcome::Consumed(sealed) => {
            assert_eq!(sealed.id, code.id);
            assert_eq!(sealed.scopes, code.scopes);
            assert_eq!(sealed.challenge_method, Some(CodeChallengeMethod::S256));
        }
        other => panic!("expected Consumed, observed {:?}", other),
    }

    // Segundo canjeador pierde con clasificación de replay.
    match repo.consume_auth_code(&code.code_hash, now).await.unwrap() {
        ConsumeOutcome::Replayed(replayed) => assert_eq!(replayed.id, code.id),
        other => panic!("expected Replayed, observed {:?}", other),
    }
}

#[tokio::test]
async fn certify_expired_and_missing_classification() {
    let client = TursoClient::connect("file:mem_cas_forensic?mode=memory&cache=shared", None)
        .await
        .unwrap();
    let repo = TokenRepository::new(client.clone());
    let now = Utc::now();

    // Código nacido vencido: jamás consumible, clasificado Expired.
    let (stale_code, _) = forge_code(-10);
    repo.insert_auth_code(&stale_code).await.unwrap();
    assert!(matches!(
        repo.consume_auth_code(&stale_code.code_hash, now).await.unwrap(),
        ConsumeOutcome::Expired
    ));

    // Digest desconocido: Missing.
    assert!(matches!(
        repo.consume_auth_code(&sha256_digest_hex("ghost"), now).await.unwrap(),
        ConsumeOutcome::Missing
    ));
}

#[tokio::test]
async fn certify_concurrent_racers_produce_exactly_one_winner() {
    let client = TursoClient::connect("file:mem_cas_race?mode=memory&cache=shared", None)
        .await
        .unwrap();
    let repo = std::sync::Arc::new(TokenRepository::new(client.clone()));
    let now = Utc::now();

    let (code, _) = forge_code(600);
    repo.insert_auth_code(&code).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let racer_repo = repo.clone();
        let digest = code.code_hash.clone();
        handles.push(tokio::spawn(async move {
            matches!(
                racer_repo.consume_auth_code(&digest, now).await.unwrap(),
                ConsumeOutcome::Consumed(_)
            )
        }));
    }

    let mut winners = 0usize;
    for handle in handles {
        if handle.await.unwrap() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1, "exactamente un canjeador puede ganar la carrera");

    println!("✅ AUTH_CODE: CAS consumption certified.");
}

#[tokio::test]
async fn certify_expired_code_pruning() {
    let client = TursoClient::connect("file:mem_cas_prune?mode=memory&cache=shared", None)
        .await
        .unwrap();
    let repo = TokenRepository::new(client.clone());
    let now = Utc::now();

    let (stale_a, _) = forge_code(-100);
    let (stale_b, _) = forge_code(-100);
    let (alive, _) = forge_code(600);
    repo.insert_auth_code(&stale_a).await.unwrap();
    repo.insert_auth_code(&stale_b).await.unwrap();
    repo.insert_auth_code(&alive).await.unwrap();

    let incinerated = repo.prune_expired_codes(now).await.unwrap();
    assert_eq!(incinerated, 2);

    // El vigente sobrevive al barrido.
    assert!(matches!(
        repo.consume_auth_code(&alive.code_hash, now).await.unwrap(),
        ConsumeOutcome::Consumed(_)
    ));
}
// FIN DEL ARCHIVO [tests/mirror/libs/infra/db/auth_code_atomicity.test.rs]

// INICIO DEL ARCHIVO [tests/mirror/libs/infra/db/reservation_workflow.test.rs]
/**
 * =================================================================
 * APARATO: RESERVATION WORKFLOW TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar unicidad de pendientes, guardias de estado y
 *           el ciclo rechazo -> apelación.
 * =================================================================
 */

use chrono::Utc;
use entativa_domain_models::reservation::{ReservationRequest, ReservationStatus};
use entativa_infra_db::repositories::ReservationRepository;
use entativa_infra_db::{DbError, TursoClient};
use uuid::Uuid;

fn forge_reservation(identity_id: Uuid, handle: &str) -> ReservationRequest {
    let now = Utc::now();
    ReservationRequest {
        id: Uuid::new_v4(),
        identity_id,
        requested_handle: handle.to_string(),
        justification: "Titular legítimo con documentación societaria".to_string(),
        evidence_uris: vec!["https://evidence.example/registry.pdf".to_string()],
        status: ReservationStatus::Pending,
        reviewer_id: None,
        review_reason: None,
        appeal_justification: None,
        created_at: now,
        reviewed_at: None,
        appealed_at: None,
        updated_at: now,
    }
}

#[tokio::test]
async fn certify_pending_uniqueness_per_identity_and_handle() {
    let client = TursoClient::connect("file:mem_reservation_unique?mode=memory&cache=shared", None)
        .await
        .expect("Fallo al inicializar DB en memoria");
    let repo = ReservationRepository::new(client.clone());

    let claimant = Uuid::new_v4();
    let first = forge_reservation(claimant, "elonmusk");
    repo.submit(&first).await.unwrap();

    // Segunda reserva viva por el mismo (identidad, handle): vetada.
    let duplicate = forge_reservation(claimant, "elonmusk");
    assert!(matches!(
        repo.submit(&duplicate).await,
        Err(DbError::DuplicatePendingReservation)
    ));

    // Otro handle del mismo usuario: admitido.
    let other_handle = forge_reservation(claimant, "nasa");
    repo.submit(&other_handle).await.unwrap();

    // Otro usuario por el mismo handle: admitido.
    let other_claimant = forge_reservation(Uuid::new_v4(), "elonmusk");
    repo.submit(&other_claimant).await.unwrap();

    let inventory = repo.list_for_identity(claimant).await.unwrap();
    assert_eq!(inventory.len(), 2);
}

#[tokio::test]
async fn certify_review_state_guards() {
    let client = TursoClient::connect("file:mem_reservation_review?mode=memory&cache=shared", None)
        .await
        .unwrap();
    let repo = ReservationRepository::new(client.clone());
    let now = Utc::now();
    let reviewer = Uuid::new_v4();

    let reservation = forge_reservation(Uuid::new_v4(), "cocacola");
    repo.submit(&reservation).await.unwrap();

    // Dictamen de aprobación sobre un pendiente.
    let approved = repo
        .review(reservation.id, reviewer, ReservationStatus::Approved, Some("evidence ok"), now)
        .await
        .unwrap();
    assert_eq!(approved.status, ReservationStatus::Approved);
    assert_eq!(approved.reviewer_id, Some(reviewer));
    assert!(approved.reviewed_at.is_some());

    // Un segundo dictamen sobre estado terminal: conflicto.
    assert!(matches!(
        repo.review(reservation.id, reviewer, ReservationStatus::Rejected, None, now).await,
        Err(DbError::ReservationStateConflict)
    ));

    // Un veredicto que no es dictamen (p. ej. 'pending') es ilegal.
    let other = forge_reservation(Uuid::new_v4(), "nike");
    repo.submit(&other).await.unwrap();
    assert!(matches!(
        repo.review(other.id, reviewer, ReservationStatus::Pending, None, now).await,
        Err(DbError::ReservationStateConflict)
    ));
}

#[tokio::test]
async fn certify_single_appeal_cycle() {
    let client = TursoClient::connect("file:mem_reservation_appeal?mode=memory&cache=shared", None)
        .await
        .unwrap();
    let repo = ReservationRepository::new(client.clone());
    let now = Utc::now();
    let reviewer = Uuid::new_v4();

    let reservation = forge_reservation(Uuid::new_v4(), "mit");
    repo.submit(&reservation).await.unwrap();
    repo.review(reservation.id, reviewer, ReservationStatus::Rejected, Some("weak evidence"), now)
        .await
        .unwrap();

    // Primera apelación procede.
    let appealed = repo
        .appeal(reservation.id, "Documentación adicional adjunta", now)
        .await
        .unwrap();
    assert_eq!(appealed.status, ReservationStatus::Appealed);
    assert!(appealed.appealed_at.is_some());

    // El estado apelado vuelve a ser revisable.
    let final_verdict = repo
        .review(reservation.id, reviewer, ReservationStatus::Rejected, Some("still weak"), now)
        .await
        .unwrap();
    assert_eq!(final_verdict.status, ReservationStatus::Rejected);

    // Segunda apelación: el guardia appealed_at IS NULL la veta.
    assert!(matches!(
        repo.appeal(reservation.id, "tercera vuelta", now).await,
        Err(DbError::ReservationStateConflict)
    ));
}

#[tokio::test]
async fn certify_withdrawal_requires_pending_and_ownership() {
    let client = TursoClient::connect("file:mem_reservation_withdraw?mode=memory&cache=shared", None)
        .await
        .unwrap();
    let repo = ReservationRepository::new(client.clone());
    let now = Utc::now();

    let claimant = Uuid::new_v4();
    let reservation = forge_reservation(claimant, "fifa");
    repo.submit(&reservation).await.unwrap();

    // Un extraño no puede retirar la reclamación ajena.
    assert!(matches!(
        repo.withdraw(reservation.id, Uuid::new_v4(), now).await,
        Err(DbError::ReservationStateConflict)
    ));

    // El titular sí.
    repo.withdraw(reservation.id, claimant, now).await.unwrap();
    let withdrawn = repo.fetch(reservation.id).await.unwrap().unwrap();
    assert_eq!(withdrawn.status, ReservationStatus::Withdrawn);

    println!("✅ RESERVATION: Workflow guards certified.");
}
// FIN DEL ARCHIVO [tests/mirror/libs/infra/db/reservation_workflow.test.rs]

// INICIO DEL ARCHIVO [tests/mirror/apps/authority/services/reservation_lifecycle.test.rs]
/**
 * =================================================================
 * APARATO: RESERVATION LIFECYCLE TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar el workflow gobernado: envío, dictamen con
 *           insignia + reescritura de eid, apelación en ventana y
 *           rastro de auditoría.
 * =================================================================
 */

use chrono::{Duration, Utc};
use entativa_authority::clock::FrozenClock;
use entativa_authority::config::AuthorityConfig;
use entativa_authority::errors::AuthorityError;
use entativa_authority::services::geolocation::NoopGeoResolver;
use entativa_authority::services::handle_governor::HandleGovernor;
use entativa_authority::services::session_authenticator::SessionAuthenticator;
use entativa_authority::state::AppState;
use entativa_core_credential::BloomBreachOracle;
use entativa_domain_models::audit::AuditAction;
use entativa_domain_models::identity::{Identity, RegisterIdentityPayload, VerificationStatus};
use entativa_domain_models::reservation::ReservationStatus;
use entativa_domain_models::VerificationBadge;
use entativa_domain_notification::TracingSink;
use entativa_infra_cache::MemoryKeyValueStore;
use entativa_infra_db::TursoClient;
use std::sync::Arc;
use uuid::Uuid;

const JUSTIFICATION: &str = "Somos el titular registral verificable de esta marca comercial.";

async fn forge_fixture(label: &str) -> (AppState, Arc<FrozenClock>, Identity) {
    let clock = Arc::new(FrozenClock::at(Utc::now()));
    let client = TursoClient::connect(
        &format!("file:mem_resvlife_{}?mode=memory&cache=shared", label),
        None,
    )
    .await
    .expect("Fallo al inicializar DB en memoria");

    let state = AppState::forge_with_collaborators(
        client,
        AuthorityConfig {
            bcrypt_cost: 4,
            ..AuthorityConfig::default()
        },
        clock.clone(),
        Arc::new(MemoryKeyValueStore::new()),
        Arc::new(BloomBreachOracle::with_default_blocklist()),
        Arc::new(TracingSink),
        Arc::new(NoopGeoResolver),
    )
    .expect("ignición del estado colapsó");

    let identity = SessionAuthenticator::new(state.clone())
        .register(RegisterIdentityPayload {
            eid: "acme_draft".to_string(),
            email: "legal@acme.example".to_string(),
            password: "Str4tospheric!Nova88".to_string(),
            phone_number: None,
            given_name: None,
            family_name: None,
            birth_year: None,
            request_ip: None,
            request_user_agent: None,
        })
        .await
        .expect("registro colapsó");

    (state, clock, identity)
}

#[tokio::test]
async fn certify_approval_with_badge_and_eid_rewrite() {
    let (state, _clock, identity) = forge_fixture("approve").await;
    let governor = HandleGovernor::new(state.clone());
    let reviewer = Uuid::new_v4();

    let reservation = governor
        .submit_reservation(
            identity.id,
            "acmecorp",
            JUSTIFICATION.to_string(),
            vec!["https://evidence.example/registry.pdf".to_string()],
        )
        .await
        .expect("envío colapsó");
    assert_eq!(reservation.status, ReservationStatus::Pending);

    // Reserva duplicada viva: conflicto clasificado.
    let duplicate = governor
        .submit_reservation(identity.id, "acmecorp", JUSTIFICATION.to_string(), vec![])
        .await;
    assert!(matches!(
        duplicate,
        Err(AuthorityError::DuplicatePendingReservation)
    ));

    // Dictamen: aprobación con insignia y reescritura del eid.
    let approved = governor
        .review_reservation(
            reservation.id,
            reviewer,
            true,
            Some("evidence verified".to_string()),
            Some(VerificationBadge::Organization),
            true,
        )
        .await
        .expect("dictamen colapsó");
    assert_eq!(approved.status, ReservationStatus::Approved);

    // La identidad quedó verificada y renombrada.
    let rebranded = state
        .identity_repository
        .fetch_by_id(identity.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rebranded.eid, "acmecorp");
    assert_eq!(rebranded.verification_status, VerificationStatus::Verified);
    assert_eq!(rebranded.verification_badge, Some(VerificationBadge::Organization));

    // Rastro completo: envío, aprobación y cambio de handle.
    let trail = state
        .audit_repository
        .list_for_identity(identity.id, 50)
        .await
        .unwrap();
    for expected in [
        AuditAction::ReservationSubmitted,
        AuditAction::ReservationApproved,
        AuditAction::HandleChanged,
    ] {
        assert!(
            trail.iter().any(|event| event.action == expected),
            "acción ausente del rastro: {:?}",
            expected
        );
    }
}

#[tokio::test]
async fn certify_rejection_appeal_window() {
    let (state, clock, identity) = forge_fixture("appeal").await;
    let governor = HandleGovernor::new(state.clone());
    let reviewer = Uuid::new_v4();

    let reservation = governor
        .submit_reservation(identity.id, "acmecorp", JUSTIFICATION.to_string(), vec![])
        .await
        .unwrap();

    governor
        .review_reservation(
            reservation.id,
            reviewer,
            false,
            Some("insufficient evidence".to_string()),
            None,
            false,
        )
        .await
        .unwrap();

    // Un extraño no puede apelar la reclamación ajena.
    let foreign_appeal = governor
        .appeal_reservation(reservation.id, Uuid::new_v4(), "mine now".to_string())
        .await;
    assert!(matches!(
        foreign_appeal,
        Err(AuthorityError::ReservationStateConflict)
    ));

    // El titular apela dentro de la ventana de 30 días.
    clock.advance(Duration::days(10));
    let appealed = governor
        .appeal_reservation(reservation.id, identity.id, "additional documentation".to_string())
        .await
        .expect("apelación en ventana colapsó");
    assert_eq!(appealed.status, ReservationStatus::Appealed);

    // Segundo rechazo; la segunda apelación ya no procede (única).
    governor
        .review_reservation(reservation.id, reviewer, false, None, None, false)
        .await
        .unwrap();
    let second_appeal = governor
        .appeal_reservation(reservation.id, identity.id, "once more".to_string())
        .await;
    assert!(matches!(
        second_appeal,
        Err(AuthorityError::ReservationStateConflict)
    ));
}

#[tokio::test]
async fn certify_appeal_window_expiry() {
    let (state, clock, identity) = forge_fixture("window").await;
    let governor = HandleGovernor::new(state.clone());

    let reservation = governor
        .submit_reservation(identity.id, "acmecorp", JUSTIFICATION.to_string(), vec![])
        .await
        .unwrap();
    governor
        .review_reservation(reservation.id, Uuid::new_v4(), false, None, None, false)
        .await
        .unwrap();

    // 31 días después: la ventana de apelación venció.
    clock.advance(Duration::days(31));
    let stale_appeal = governor
        .appeal_reservation(reservation.id, identity.id, "too late".to_string())
        .await;
    assert!(matches!(
        stale_appeal,
        Err(AuthorityError::ReservationStateConflict)
    ));
}

#[tokio::test]
async fn certify_withdrawal_and_short_justification_gate() {
    let (state, _clock, identity) = forge_fixture("withdraw").await;
    let governor = HandleGovernor::new(state.clone());

    // Justificación insuficiente: clase Input con detalle de campo.
    let thin = governor
        .submit_reservation(identity.id, "acmecorp", "too short".to_string(), vec![])
        .await;
    assert!(matches!(thin, Err(AuthorityError::InputViolation { .. })));

    let reservation = governor
        .submit_reservation(identity.id, "acmecorp", JUSTIFICATION.to_string(), vec![])
        .await
        .unwrap();

    governor
        .withdraw_reservation(reservation.id, identity.id)
        .await
        .expect("retiro colapsó");

    let withdrawn = state
        .reservation_repository
        .fetch(reservation.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(withdrawn.status, ReservationStatus::Withdrawn);
}
// FIN DEL ARCHIVO [tests/mirror/apps/authority/services/reservation_lifecycle.test.rs]

// INICIO DEL ARCHIVO [tests/mirror/libs/domain/models_rs/protection_ordering.test.rs]
/**
 * =================================================================
 * APARATO: PROTECTION ORDERING TEST (V1.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar la tabla fija de desempate de categorías.
 * =================================================================
 */

use entativa_domain_models::protected_entity::ProtectedCategory;
use entativa_domain_models::reservation::{ReservationRequest, ReservationStatus};
use chrono::{Duration, Utc};
use uuid::Uuid;

#[test]
fn certify_dispatch_order_is_the_contract_table() {
    // El orden es una tabla fija; jamás se infiere del almacén.
    let expected = [
        ProtectedCategory::Celebrity,
        ProtectedCategory::Government,
        ProtectedCategory::Business,
        ProtectedCategory::Brand,
        ProtectedCategory::Academic,
        ProtectedCategory::Media,
        ProtectedCategory::Sports,
        ProtectedCategory::Community,
    ];
    assert_eq!(ProtectedCategory::DISPATCH_ORDER, expected);

    // La prioridad de despacho es monótona sobre la tabla.
    for (index, category) in ProtectedCategory::DISPATCH_ORDER.iter().enumerate() {
        assert_eq!(category.dispatch_priority() as usize, index);
    }

    assert!(
        ProtectedCategory::Celebrity.dispatch_priority()
            < ProtectedCategory::Business.dispatch_priority()
    );
}

#[test]
fn certify_category_string_roundtrip() {
    for category in ProtectedCategory::DISPATCH_ORDER {
        let label = category.as_str();
        assert_eq!(ProtectedCategory::parse(label), Some(category));
    }
    assert_eq!(ProtectedCategory::parse("BUSINESS"), Some(ProtectedCategory::Business));
    assert_eq!(ProtectedCategory::parse("business"), None);
}

#[test]
fn certify_appeal_window_physics() {
    let now = Utc::now();
    let reservation = ReservationRequest {
        id: Uuid::new_v4(),
        identity_id: Uuid::new_v4(),
        requested_handle: "elonmusk".to_string(),
        justification: "Titular verificable de la entidad".to_string(),
        evidence_uris: vec![],
        status: ReservationStatus::Rejected,
        reviewer_id: Some(Uuid::new_v4()),
        review_reason: Some("insufficient evidence".to_string()),
        appeal_justification: None,
        created_at: now - Duration::days(40),
        reviewed_at: Some(now - Duration::days(10)),
        appealed_at: None,
        updated_at: now - Duration::days(10),
    };

    // Dentro de la ventana de 30 días: apelable.
    assert!(reservation.can_appeal_at(now));

    // Fuera de la ventana: vencida.
    assert!(!reservation.can_appeal_at(now + Duration::days(25)));

    // Una apelación previa extingue el derecho.
    let already_appealed = ReservationRequest {
        appealed_at: Some(now - Duration::days(1)),
        status: ReservationStatus::Rejected,
        ..reservation.clone()
    };
    assert!(!already_appealed.can_appeal_at(now));

    // Solo un rechazo es apelable.
    let approved = ReservationRequest {
        status: ReservationStatus::Approved,
        ..reservation
    };
    assert!(!approved.can_appeal_at(now));
}

#[test]
fn certify_reviewable_states() {
    assert!(ReservationStatus::Pending.is_reviewable());
    assert!(ReservationStatus::Appealed.is_reviewable());
    assert!(!ReservationStatus::Approved.is_reviewable());
    assert!(!ReservationStatus::Withdrawn.is_reviewable());
}
// FIN DEL ARCHIVO [tests/mirror/libs/domain/models_rs/protection_ordering.test.rs]

// INICIO DEL ARCHIVO [tests/mirror/apps/authority/error_taxonomy.test.rs]
/**
 * =================================================================
 * APARATO: ERROR TAXONOMY TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar las seis clases de propagación, la traducción
 *           a códigos OAuth2 y la política de auditoría.
 * =================================================================
 */

use entativa_authority::errors::{AuthorityError, ErrorClass};
use entativa_domain_models::protected_entity::ProtectionVerdict;
use entativa_infra_cache::CacheError;
use entativa_infra_db::DbError;

#[test]
fn certify_class_assignment() {
    let cases: Vec<(AuthorityError, ErrorClass)> = vec![
        (
            AuthorityError::InputViolation {
                field: "handle".to_string(),
                violation: "LENGTH".to_string(),
            },
            ErrorClass::Input,
        ),
        (AuthorityError::InvalidCredentials, ErrorClass::Auth),
        (AuthorityError::InvalidScope("x".to_string()), ErrorClass::Auth),
        (AuthorityError::DuplicateEmail, ErrorClass::Conflict),
        (AuthorityError::PkceMismatch, ErrorClass::Conflict),
        (
            AuthorityError::HandleProtected(Box::new(ProtectionVerdict::fail_secure("x"))),
            ErrorClass::Policy,
        ),
        (
            AuthorityError::RateLimited {
                action: "login".to_string(),
                retry_after_seconds: 900,
            },
            ErrorClass::Policy,
        ),
        (AuthorityError::MfaRequired, ErrorClass::Policy),
        (
            AuthorityError::ServiceUnavailable("cache".to_string()),
            ErrorClass::Transient,
        ),
        (AuthorityError::Fatal("keyring".to_string()), ErrorClass::Fatal),
    ];

    for (fault, expected_class) in cases {
        assert_eq!(fault.class(), expected_class, "clase errónea para {}", fault);
    }
}

#[test]
fn certify_oauth_wire_translation() {
    assert_eq!(
        AuthorityError::InvalidRequest("x".to_string()).oauth_error_code(),
        Some("invalid_request")
    );
    assert_eq!(
        AuthorityError::ClientAuthenticationFailed.oauth_error_code(),
        Some("invalid_client")
    );
    assert_eq!(
        AuthorityError::InvalidGrant("x".to_string()).oauth_error_code(),
        Some("invalid_grant")
    );
    assert_eq!(
        AuthorityError::PkceMismatch.oauth_error_code(),
        Some("invalid_grant")
    );
    assert_eq!(
        AuthorityError::UnauthorizedClient("x".to_string()).oauth_error_code(),
        Some("unauthorized_client")
    );
    assert_eq!(
        AuthorityError::UnsupportedGrantType("x".to_string()).oauth_error_code(),
        Some("unsupported_grant_type")
    );
    assert_eq!(
        AuthorityError::InvalidScope("x".to_string()).oauth_error_code(),
        Some("invalid_scope")
    );

    // Fuera del protocolo: sin código de alambre.
    assert_eq!(AuthorityError::Fatal("x".to_string()).oauth_error_code(), None);
    assert_eq!(
        AuthorityError::ServiceUnavailable("x".to_string()).oauth_error_code(),
        None
    );
}

#[test]
fn certify_transient_retry_and_audit_demands() {
    assert!(AuthorityError::ServiceUnavailable("x".to_string()).is_transient());
    assert!(!AuthorityError::InvalidCredentials.is_transient());
    assert!(!AuthorityError::Fatal("x".to_string()).is_transient());

    // Auth y Policy escriben SIEMPRE en el libro de auditoría.
    assert!(AuthorityError::InvalidCredentials.demands_audit());
    assert!(AuthorityError::MfaRequired.demands_audit());
    assert!(!AuthorityError::Fatal("x".to_string()).demands_audit());
    assert!(!AuthorityError::InputViolation {
        field: "x".to_string(),
        violation: "y".to_string()
    }
    .demands_audit());
}

#[test]
fn certify_lower_strata_translation() {
    // Conflictos de persistencia hacia conflictos semánticos.
    assert!(matches!(
        AuthorityError::from(DbError::DuplicateEmail),
        AuthorityError::DuplicateEmail
    ));
    assert!(matches!(
        AuthorityError::from(DbError::DuplicatePendingReservation),
        AuthorityError::DuplicatePendingReservation
    ));

    // Red caída: clase Transient (reintento único de frontera).
    let from_connection = AuthorityError::from(DbError::ConnectionError("down".to_string()));
    assert_eq!(from_connection.class(), ErrorClass::Transient);

    // IdentityNotFound JAMÁS revela existencia: rechazo genérico.
    assert!(matches!(
        AuthorityError::from(DbError::IdentityNotFound),
        AuthorityError::InvalidCredentials
    ));

    // Caché inalcanzable: Transient; corrupción de payload: Fatal.
    assert_eq!(
        AuthorityError::from(CacheError::Unreachable("down".to_string())).class(),
        ErrorClass::Transient
    );
    assert_eq!(
        AuthorityError::from(CacheError::MappingError("corrupt".to_string())).class(),
        ErrorClass::Fatal
    );
}
// FIN DEL ARCHIVO [tests/mirror/apps/authority/error_taxonomy.test.rs]

// INICIO DEL ARCHIVO [apps/authority/src/errors.rs]
/*!
 * =================================================================
 * APARATO: AUTHORITY ERROR TAXONOMY (V4.1 - WIRE TRANSLATION)
 * CLASIFICACIÓN: APPLICATION CORE (ESTRATO L1-APP)
 * RESPONSABILIDAD: CATÁLOGO DE FALLOS Y TRADUCCIÓN A CÓDIGOS OAUTH2
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. SIX CLASSES: Input / Auth / Conflict / Policy / Transient /
 *    Fatal. Los transitorios admiten un único reintento de frontera;
 *    el resto burbujea hasta el traductor de alambre.
 * 2. NO USER LEAKAGE: Las variantes Auth jamás revelan si la cuenta
 *    existe; 'invalid credentials' es la única verdad externa.
 * 3. REMEDIATION HINTS: Las variantes Policy portan pistas de
 *    remediación (alternativas de handle, retry_after).
 * =================================================================
 */

use entativa_domain_models::protected_entity::ProtectionVerdict;
use thiserror::Error;

/// Clase de propagación de un fallo (§ taxonomía de errores).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Input,
    Auth,
    Conflict,
    Policy,
    Transient,
    Fatal,
}

#[derive(Error, Debug)]
pub enum AuthorityError {
    // --- CLASE INPUT ---
    /// Regla de validación violada, con detalle de campo.
    #[error("[L4_INPUT_FAULT]: {field} -> {violation}")]
    InputViolation { field: String, violation: String },

    /// Petición malformada a un endpoint OAuth2.
    #[error("[L4_INPUT_FAULT]: MALFORMED_REQUEST -> {0}")]
    InvalidRequest(String),

    // --- CLASE AUTH ---
    /// Credenciales inválidas. Jamás distingue 'usuario inexistente'.
    #[error("[L4_AUTH_FAULT]: INVALID_CREDENTIALS")]
    InvalidCredentials,

    /// Token expirado, revocado o con firma/estructura inválida.
    #[error("[L4_AUTH_FAULT]: TOKEN_REJECTED -> {0}")]
    TokenRejected(String),

    /// La concesión presentada no es canjeable (código usado, refresh
    /// rotado, redirect divergente).
    #[error("[L4_AUTH_FAULT]: INVALID_GRANT -> {0}")]
    InvalidGrant(String),

    /// La autenticación del cliente OAuth2 falló.
    #[error("[L4_AUTH_FAULT]: CLIENT_AUTHENTICATION_FAILED")]
    ClientAuthenticationFailed,

    /// El cliente no está habilitado para la operación solicitada.
    #[error("[L4_AUTH_FAULT]: UNAUTHORIZED_CLIENT -> {0}")]
    UnauthorizedClient(String),

    /// grant_type desconocido o deshabilitado.
    #[error("[L4_AUTH_FAULT]: UNSUPPORTED_GRANT_TYPE -> {0}")]
    UnsupportedGrantType(String),

    /// Scope solicitado fuera del conjunto permitido.
    #[error("[L4_AUTH_FAULT]: INVALID_SCOPE -> {0}")]
    InvalidScope(String),

    /// El token carece del scope exigido por la operación.
    #[error("[L4_AUTH_FAULT]: INSUFFICIENT_SCOPE -> {0}")]
    InsufficientScope(String),

    // --- CLASE CONFLICT ---
    #[error("[L4_CONFLICT_FAULT]: EMAIL_ALREADY_CLAIMED")]
    DuplicateEmail,

    #[error("[L4_CONFLICT_FAULT]: EID_ALREADY_CLAIMED")]
    DuplicateEid,

    #[error("[L4_CONFLICT_FAULT]: RESERVATION_ALREADY_PENDING")]
    DuplicatePendingReservation,

    /// El estado de la reserva no admite la transición pedida.
    #[error("[L4_CONFLICT_FAULT]: RESERVATION_STATE_VIOLATION")]
    ReservationStateConflict,

    /// El verificador PKCE no reproduce el desafío ligado al código.
    #[error("[L4_CONFLICT_FAULT]: PKCE_CHALLENGE_MISMATCH")]
    PkceMismatch,

    // --- CLASE POLICY ---
    /// El handle colisiona con el registro protegido; porta el
    /// veredicto completo con alternativas de remediación.
    #[error("[L4_POLICY_FAULT]: HANDLE_PROTECTED")]
    HandleProtected(Box<ProtectionVerdict>),

    /// Ventana de rate limiting agotada.
    #[error("[L4_POLICY_FAULT]: RATE_LIMIT_EXCEEDED -> {action} (retry in {retry_after_seconds}s)")]
    RateLimited {
        action: String,
        retry_after_seconds: u64,
    },

    /// La operación exige un desafío MFA superado.
    #[error("[L4_POLICY_FAULT]: MFA_CHALLENGE_REQUIRED")]
    MfaRequired,

    /// Identidad bajo veto temporal de autenticación.
    #[error("[L4_POLICY_FAULT]: IDENTITY_LOCKED (until {locked_until})")]
    IdentityLocked { locked_until: String },

    /// La credencial no supera la política de fortaleza o figura en
    /// el registro de brechas.
    #[error("[L4_POLICY_FAULT]: CREDENTIAL_POLICY_VIOLATION -> {0}")]
    CredentialPolicyViolation(String),

    // --- CLASE TRANSIENT ---
    /// Infraestructura no disponible tras el reintento de frontera.
    #[error("[L4_TRANSIENT_FAULT]: SERVICE_UNAVAILABLE -> {0}")]
    ServiceUnavailable(String),

    // --- CLASE FATAL ---
    /// Estado corrupto o material criptográfico ausente. La operación
    /// JAMÁS concluye en silencio.
    #[error("[L4_FATAL]: CORE_INTEGRITY_COLLAPSE -> {0}")]
    Fatal(String),
}

impl AuthorityError {
    /// Clase de propagación de la variante.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InputViolation { .. } | Self::InvalidRequest(_) => ErrorClass::Input,
            Self::InvalidCredentials
            | Self::TokenRejected(_)
            | Self::InvalidGrant(_)
            | Self::ClientAuthenticationFailed
            | Self::UnauthorizedClient(_)
            | Self::UnsupportedGrantType(_)
            | Self::InvalidScope(_)
            | Self::InsufficientScope(_) => ErrorClass::Auth,
            Self::DuplicateEmail
            | Self::DuplicateEid
            | Self::DuplicatePendingReservation
            | Self::ReservationStateConflict
            | Self::PkceMismatch => ErrorClass::Conflict,
            Self::HandleProtected(_)
            | Self::RateLimited { .. }
            | Self::MfaRequired
            | Self::IdentityLocked { .. }
            | Self::CredentialPolicyViolation(_) => ErrorClass::Policy,
            Self::ServiceUnavailable(_) => ErrorClass::Transient,
            Self::Fatal(_) => ErrorClass::Fatal,
        }
    }

    /// Código de error OAuth2 (RFC 6749 §5.2) cuando aplica.
    pub fn oauth_error_code(&self) -> Option<&'static str> {
        match self {
            Self::InvalidRequest(_) | Self::InputViolation { .. } => Some("invalid_request"),
            Self::ClientAuthenticationFailed => Some("invalid_client"),
            Self::InvalidGrant(_) | Self::PkceMismatch | Self::InvalidCredentials => {
                Some("invalid_grant")
            }
            Self::UnauthorizedClient(_) => Some("unauthorized_client"),
            Self::UnsupportedGrantType(_) => Some("unsupported_grant_type"),
            Self::InvalidScope(_) => Some("invalid_scope"),
            Self::InsufficientScope(_) => Some("insufficient_scope"),
            _ => None,
        }
    }

    /// Los fallos transitorios admiten un único reintento de frontera.
    pub fn is_transient(&self) -> bool {
        self.class() == ErrorClass::Transient
    }

    /// Las clases Auth y Policy escriben siempre en el libro de auditoría.
    pub fn demands_audit(&self) -> bool {
        matches!(self.class(), ErrorClass::Auth | ErrorClass::Policy)
    }
}

// --- TRADUCCIÓN DESDE LOS ESTRATOS INFERIORES ---

impl From<entativa_infra_db::DbError> for AuthorityError {
    fn from(fault: entativa_infra_db::DbError) -> Self {
        use entativa_infra_db::DbError;
        match fault {
            DbError::DuplicateEmail => Self::DuplicateEmail,
            DbError::DuplicateEid => Self::DuplicateEid,
            DbError::DuplicatePendingReservation => Self::DuplicatePendingReservation,
            DbError::ReservationStateConflict => Self::ReservationStateConflict,
            DbError::ConnectionError(detail) => Self::ServiceUnavailable(detail),
            DbError::TransactionError => {
                Self::ServiceUnavailable("TRANSACTION_COLLAPSE".to_string())
            }
            DbError::IdentityNotFound => Self::InvalidCredentials,
            DbError::ClientNotFound => Self::ClientAuthenticationFailed,
            DbError::TokenNotFound | DbError::SessionNotFound => {
                Self::InvalidGrant("UNKNOWN_CREDENTIAL".to_string())
            }
            DbError::MfaMethodNotFound => Self::InputViolation {
                field: "mfa_method".to_string(),
                violation: "FACTOR_NOT_FOUND".to_string(),
            },
            DbError::DuplicateProtectedHandle => Self::InputViolation {
                field: "canonical_handle".to_string(),
                violation: "REGISTRY_COLLISION".to_string(),
            },
            other @ (DbError::ConfigurationError(_)
            | DbError::QueryError(_)
            | DbError::MappingError(_)) => Self::Fatal(other.to_string()),
        }
    }
}

impl From<entativa_infra_cache::CacheError> for AuthorityError {
    fn from(fault: entativa_infra_cache::CacheError) -> Self {
        use entativa_infra_cache::CacheError;
        match fault {
            CacheError::Unreachable(detail) => Self::ServiceUnavailable(detail),
            CacheError::LeaseConflict => {
                Self::ServiceUnavailable("ADVISORY_LEASE_CONTENTION".to_string())
            }
            other => Self::Fatal(other.to_string()),
        }
    }
}

impl From<entativa_core_token_forge::TokenForgeError> for AuthorityError {
    fn from(fault: entativa_core_token_forge::TokenForgeError) -> Self {
        use entativa_core_token_forge::TokenForgeError;
        match fault {
            TokenForgeError::KeyringVoid
            | TokenForgeError::KeyMaterialFault(_)
            | TokenForgeError::GuardPoisoned => Self::Fatal(fault.to_string()),
            TokenForgeError::SigningFault(detail) => Self::Fatal(detail),
            other => Self::TokenRejected(other.to_string()),
        }
    }
}

impl From<entativa_domain_governance::HandleFault> for AuthorityError {
    fn from(fault: entativa_domain_governance::HandleFault) -> Self {
        Self::InputViolation {
            field: "handle".to_string(),
            violation: fault.to_string(),
        }
    }
}

impl From<entativa_core_secret_vault::VaultError> for AuthorityError {
    fn from(fault: entativa_core_secret_vault::VaultError) -> Self {
        Self::Fatal(fault.to_string())
    }
}

impl From<entativa_domain_mfa::MfaEngineError> for AuthorityError {
    fn from(fault: entativa_domain_mfa::MfaEngineError) -> Self {
        Self::Fatal(fault.to_string())
    }
}

impl From<entativa_core_credential::CredentialError> for AuthorityError {
    fn from(fault: entativa_core_credential::CredentialError) -> Self {
        use entativa_core_credential::CredentialError;
        match fault {
            CredentialError::OracleUnreachable(detail) => Self::ServiceUnavailable(detail),
            CredentialError::Breached => {
                Self::CredentialPolicyViolation("CREDENTIAL_BREACHED".to_string())
            }
            CredentialError::InsufficientEntropy { .. } => {
                Self::CredentialPolicyViolation(fault.to_string())
            }
            CredentialError::ForgeExhaustion => Self::Fatal(fault.to_string()),
        }
    }
}
// FIN DEL ARCHIVO [apps/authority/src/errors.rs]

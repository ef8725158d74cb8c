// INICIO DEL ARCHIVO [libs/domain/models-rs/src/audit.rs]
/*!
 * =================================================================
 * APARATO: AUDIT TRAIL MODELS (V2.4 - PANOPTICON LEDGER)
 * CLASIFICACIÓN: DOMAIN ENTITIES (L2)
 * RESPONSABILIDAD: EVENTOS DE SEGURIDAD/CUMPLIMIENTO APPEND-ONLY
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. CLOSED KEYSET: Cada acción declara su conjunto de llaves de
 *    detalle conocidas; llaves desconocidas atraviesan como opacas
 *    string -> string sin interpretación.
 * 2. GDPR HOOK: Cada evento porta su base de licitud; el workflow de
 *    exportación es un colaborador externo.
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use typeshare::typeshare;
use uuid::Uuid;

/// Catálogo cerrado de acciones auditables del núcleo.
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    IdentityRegistered,
    LoginSucceeded,
    LoginFailed,
    LockoutTriggered,
    PasswordChanged,
    SessionRevoked,
    ReservationSubmitted,
    ReservationApproved,
    ReservationRejected,
    ReservationAppealed,
    ReservationWithdrawn,
    HandleChanged,
    ProtectionLookupFailed,
    ConsentGranted,
    ConsentDenied,
    TokenIssued,
    TokenRefreshed,
    TokenRevoked,
    AuthCodeReplayDetected,
    ApiKeyIssued,
    MfaEnrolled,
    MfaVerified,
    MfaChallengeFailed,
    MfaFactorDeactivated,
    NotificationDispatched,
    NotificationRateLimited,
    RateLimitExceeded,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IdentityRegistered => "identity_registered",
            Self::LoginSucceeded => "login_succeeded",
            Self::LoginFailed => "login_failed",
            Self::LockoutTriggered => "lockout_triggered",
            Self::PasswordChanged => "password_changed",
            Self::SessionRevoked => "session_revoked",
            Self::ReservationSubmitted => "reservation_submitted",
            Self::ReservationApproved => "reservation_approved",
            Self::ReservationRejected => "reservation_rejected",
            Self::ReservationAppealed => "reservation_appealed",
            Self::ReservationWithdrawn => "reservation_withdrawn",
            Self::HandleChanged => "handle_changed",
            Self::ProtectionLookupFailed => "protection_lookup_failed",
            Self::ConsentGranted => "consent_granted",
            Self::ConsentDenied => "consent_denied",
            Self::TokenIssued => "token_issued",
            Self::TokenRefreshed => "token_refreshed",
            Self::TokenRevoked => "token_revoked",
            Self::AuthCodeReplayDetected => "auth_code_replay_detected",
            Self::ApiKeyIssued => "api_key_issued",
            Self::MfaEnrolled => "mfa_enrolled",
            Self::MfaVerified => "mfa_verified",
            Self::MfaChallengeFailed => "mfa_challenge_failed",
            Self::MfaFactorDeactivated => "mfa_factor_deactivated",
            Self::NotificationDispatched => "notification_dispatched",
            Self::NotificationRateLimited => "notification_rate_limited",
            Self::RateLimitExceeded => "rate_limit_exceeded",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        [
            Self::IdentityRegistered,
            Self::LoginSucceeded,
            Self::LoginFailed,
            Self::LockoutTriggered,
            Self::PasswordChanged,
            Self::SessionRevoked,
            Self::ReservationSubmitted,
            Self::ReservationApproved,
            Self::ReservationRejected,
            Self::ReservationAppealed,
            Self::ReservationWithdrawn,
            Self::HandleChanged,
            Self::ProtectionLookupFailed,
            Self::ConsentGranted,
            Self::ConsentDenied,
            Self::TokenIssued,
            Self::TokenRefreshed,
            Self::TokenRevoked,
            Self::AuthCodeReplayDetected,
            Self::ApiKeyIssued,
            Self::MfaEnrolled,
            Self::MfaVerified,
            Self::MfaChallengeFailed,
            Self::MfaFactorDeactivated,
            Self::NotificationDispatched,
            Self::NotificationRateLimited,
            Self::RateLimitExceeded,
        ]
        .into_iter()
        .find(|action| action.as_str() == raw)
    }

    /// Llaves de detalle reconocidas para la acción; cualquier otra llave
    /// atraviesa el registro como par opaco.
    pub fn known_detail_keys(&self) -> &'static [&'static str] {
        match self {
            Self::IdentityRegistered => &["eid", "email_domain"],
            Self::LoginSucceeded => &["session_id", "security_level"],
            Self::LoginFailed => &["attempt_number", "reason_code"],
            Self::LockoutTriggered => &["locked_until", "attempt_number"],
            Self::PasswordChanged => &["strength_ordinal"],
            Self::SessionRevoked => &["session_id", "reason"],
            Self::ReservationSubmitted | Self::ReservationWithdrawn => &["handle", "reservation_id"],
            Self::ReservationApproved | Self::ReservationRejected | Self::ReservationAppealed => {
                &["handle", "reservation_id", "reviewer_id", "reason"]
            }
            Self::HandleChanged => &["previous_eid", "new_eid", "reason"],
            Self::ProtectionLookupFailed => &["handle", "fault"],
            Self::ConsentGranted | Self::ConsentDenied => &["client_id", "request_id", "scopes"],
            Self::TokenIssued | Self::TokenRefreshed => &["client_id", "grant_type", "jti", "scopes"],
            Self::TokenRevoked => &["jti", "reason", "cascade"],
            Self::AuthCodeReplayDetected => &["auth_code_id", "client_id", "revoked_count"],
            Self::ApiKeyIssued => &["prefix", "client_id"],
            Self::MfaEnrolled | Self::MfaVerified => &["method_id", "kind"],
            Self::MfaChallengeFailed => &["method_id", "kind", "consecutive_failures"],
            Self::MfaFactorDeactivated => &["method_id", "kind", "reason"],
            Self::NotificationDispatched => &["kind", "channel"],
            Self::NotificationRateLimited => &["kind", "channel", "window"],
            Self::RateLimitExceeded => &["action", "window", "limit"],
        }
    }
}

/// Base de licitud GDPR del tratamiento registrado.
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LawfulBasis {
    LegitimateInterest,
    Contract,
    Consent,
    LegalObligation,
}

impl LawfulBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LegitimateInterest => "legitimate_interest",
            Self::Contract => "contract",
            Self::Consent => "consent",
            Self::LegalObligation => "legal_obligation",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "legitimate_interest" => Some(Self::LegitimateInterest),
            "contract" => Some(Self::Contract),
            "consent" => Some(Self::Consent),
            "legal_obligation" => Some(Self::LegalObligation),
            _ => None,
        }
    }
}

/// Evento inmutable del libro mayor de seguridad.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    /// Identidad afectada por la acción (si aplica).
    pub identity_id: Option<Uuid>,
    /// Principal que ejecutó la acción (moderador, sistema, la propia identidad).
    pub actor_id: Option<Uuid>,
    pub action: AuditAction,
    /// Mapa ordenado de detalles; las llaves conocidas las fija la acción.
    pub details: BTreeMap<String, String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub lawful_basis: LawfulBasis,
}

impl AuditEvent {
    /// Forja un evento mínimo listo para enriquecer con detalles.
    pub fn forge(action: AuditAction, lawful_basis: LawfulBasis, occurred_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            identity_id: None,
            actor_id: None,
            action,
            details: BTreeMap::new(),
            ip_address: None,
            user_agent: None,
            occurred_at,
            lawful_basis,
        }
    }

    pub fn with_identity(mut self, identity_id: Uuid) -> Self {
        self.identity_id = Some(identity_id);
        self
    }

    pub fn with_actor(mut self, actor_id: Uuid) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}
// FIN DEL ARCHIVO [libs/domain/models-rs/src/audit.rs]

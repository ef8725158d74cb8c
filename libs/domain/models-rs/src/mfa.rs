// INICIO DEL ARCHIVO [libs/domain/models-rs/src/mfa.rs]
/*!
 * =================================================================
 * APARATO: MFA DOMAIN MODELS (V2.1 - FACTOR STRATA)
 * CLASIFICACIÓN: DOMAIN ENTITIES (L2)
 * RESPONSABILIDAD: FACTORES DE AUTENTICACIÓN SECUNDARIA
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. SECRET AT REST: El material del factor viaja cifrado (AES-256-GCM
 *    vía secret-vault); este modelo solo transporta el envoltorio.
 * 2. PRIMARY UNIQUENESS: A lo sumo un factor primary=true por identidad;
 *    el repositorio lo garantiza con un UPDATE de limpieza transaccional.
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;
use uuid::Uuid;

/// Clases de factor soportadas por el gestor MFA.
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MfaKind {
    Totp,
    Sms,
    Email,
    Webauthn,
    BackupCodes,
}

impl MfaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Totp => "totp",
            Self::Sms => "sms",
            Self::Email => "email",
            Self::Webauthn => "webauthn",
            Self::BackupCodes => "backup_codes",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "totp" => Some(Self::Totp),
            "sms" => Some(Self::Sms),
            "email" => Some(Self::Email),
            "webauthn" => Some(Self::Webauthn),
            "backup_codes" => Some(Self::BackupCodes),
            _ => None,
        }
    }
}

/// Factor MFA enrolado por una identidad.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MfaMethod {
    pub id: Uuid,
    pub identity_id: Uuid,
    pub kind: MfaKind,
    /// Material del factor cifrado en reposo (payload del secret-vault).
    #[serde(skip_serializing)]
    pub encrypted_secret: String,
    /// Verdadero tras la primera verificación exitosa (prueba de posesión).
    pub is_verified: bool,
    pub is_primary: bool,
    /// Orden de preferencia entre factores verificados (menor primero).
    pub priority: i32,
    pub usage_count: u64,
    pub last_used_at: Option<DateTime<Utc>>,
    /// Fallos consecutivos; al quinto el factor se desactiva.
    pub consecutive_failures: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Código de respaldo de un solo uso (almacenado como digest).
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupCode {
    pub id: Uuid,
    pub method_id: Uuid,
    /// Digest SHA-256 (hex) del código; el plano solo se muestra al generarlo.
    pub code_hash: String,
    pub used_at: Option<DateTime<Utc>>,
}
// FIN DEL ARCHIVO [libs/domain/models-rs/src/mfa.rs]

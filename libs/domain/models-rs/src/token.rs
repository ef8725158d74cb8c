// INICIO DEL ARCHIVO [libs/domain/models-rs/src/token.rs]
/*!
 * =================================================================
 * APARATO: TOKEN DOMAIN MODELS (V3.0 - HASH-AT-REST)
 * CLASIFICACIÓN: DOMAIN ENTITIES (L2)
 * RESPONSABILIDAD: REGISTRO DURABLE DE CREDENCIALES EMITIDAS
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. ZERO PLAINTEXT: La fila solo transporta el digest SHA-256 del
 *    secreto; el valor plano jamás se persiste en ningún almacén.
 * 2. CYCLE BREAK: La Session referencia ids de token; el token porta
 *    session_id. Ninguno sostiene un puntero al otro.
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;
use uuid::Uuid;

/// Clases de credencial registradas en la bóveda durable.
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
    Id,
    ApiKey,
    AuthCode,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
            Self::Id => "id",
            Self::ApiKey => "api_key",
            Self::AuthCode => "auth_code",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "access" => Some(Self::Access),
            "refresh" => Some(Self::Refresh),
            "id" => Some(Self::Id),
            "api_key" => Some(Self::ApiKey),
            "auth_code" => Some(Self::AuthCode),
            _ => None,
        }
    }
}

/// Nivel de aseguramiento de la sesión que emitió la credencial.
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SecurityLevel {
    /// Autenticación primaria (contraseña).
    Standard,
    /// Autenticación primaria + factor MFA verificado.
    Elevated,
    /// Emisión máquina-a-máquina (client_credentials / api_key).
    Machine,
}

impl SecurityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Elevated => "elevated",
            Self::Machine => "machine",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "standard" => Some(Self::Standard),
            "elevated" => Some(Self::Elevated),
            "machine" => Some(Self::Machine),
            _ => None,
        }
    }
}

/// Fila durable por credencial emitida.
///
/// # Invariantes:
/// - `token_hash` es único en la bóveda.
/// - El id de la fila coincide con el claim `jti` del JWT asociado.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    pub id: Uuid,
    pub kind: TokenKind,
    /// Digest SHA-256 (hex) del secreto emitido.
    pub token_hash: String,
    /// Identidad sujeto; None en emisiones máquina-a-máquina puras.
    pub subject_id: Option<Uuid>,
    pub client_id: Option<String>,
    pub session_id: Option<Uuid>,
    /// Código de autorización progenitor (defensa anti-replay en cascada).
    pub auth_code_id: Option<Uuid>,
    pub scopes: Vec<String>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub usage_count: u64,
    pub is_revoked: bool,
    pub revoked_at: Option<DateTime<Utc>>,
    pub revoked_by: Option<Uuid>,
    pub revocation_reason: Option<String>,
    /// Huella del dispositivo/sesión de origen.
    pub device_fingerprint: Option<String>,
    pub security_level: SecurityLevel,
    /// Puntaje de riesgo [0.0, 1.0] calculado en la emisión.
    pub risk_score: f64,
    /// Prefijo visible de 8 caracteres (solo `api_key`).
    pub api_key_prefix: Option<String>,
}

impl TokenRecord {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Una credencial es utilizable si no está revocada ni expirada.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked && !self.is_expired_at(now)
    }
}
// FIN DEL ARCHIVO [libs/domain/models-rs/src/token.rs]

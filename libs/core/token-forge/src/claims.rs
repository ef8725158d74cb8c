// INICIO DEL ARCHIVO [libs/core/token-forge/src/claims.rs]
/*!
 * =================================================================
 * APARATO: JWT CLAIM CONTRACTS (V2.3 - PII CONTAINMENT)
 * CLASIFICACIÓN: CORE SECURITY (ESTRATO L1)
 * RESPONSABILIDAD: GRAMÁTICA CERRADA DE CLAIMS DEL NÚCLEO
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. CLOSED SET: El conjunto de claims es fijo por tipo de token;
 *    no existe un mapa dinámico de claims arbitrarios.
 * 2. PII CONTAINMENT: El refresh token transporta únicamente los ids
 *    de identidad y sesión; jamás email, eid ni reputación.
 * =================================================================
 */

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Discriminador de tipo del access token.
pub const TOKEN_TYPE_ACCESS: &str = "access";
/// Discriminador de tipo del refresh token.
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

/// Claims del access token (RFC 7519 + claims Entativa).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    // --- CLAIMS REGISTRADOS (RFC 7519) ---
    pub iss: String,
    /// UUID de la identidad sujeto (o client_id en client_credentials).
    pub sub: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
    pub nbf: i64,
    /// Coincide con el id de la fila de token en la bóveda durable.
    pub jti: Uuid,

    // --- CLAIMS ENTATIVA ---
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub verified: bool,
    pub status: String,
    pub verification_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_badge: Option<String>,
    pub reputation_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Scopes concedidos, separados por espacio (gramática RFC 6749).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub token_type: String,
}

/// Claims del refresh token: solo identidad + sesión, cero PII.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
    pub nbf: i64,
    pub jti: Uuid,
    pub session_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Scopes originales de la concesión (para el subset de rotación).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub token_type: String,
}
// FIN DEL ARCHIVO [libs/core/token-forge/src/claims.rs]

// INICIO DEL ARCHIVO [libs/domain/models-rs/src/oauth_flow.rs]
/*!
 * =================================================================
 * APARATO: AUTHORIZATION FLOW MODELS (V1.4)
 * CLASIFICACIÓN: DOMAIN ENTITIES (L2)
 * RESPONSABILIDAD: MÁQUINA DE ESTADOS DEL FLUJO DE AUTORIZACIÓN
 *
 * VISION HIPER-HOLÍSTICA:
 * PENDING_AUTH -> CONSENT_APPROVED -> CODE_ISSUED -> CODE_CONSUMED
 * -> (ACCESS_ISSUED, REFRESH_ISSUED). Terminales: CODE_EXPIRED,
 * CODE_REUSED (con revocación en cascada), DENIED.
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;
use uuid::Uuid;

/// Estados del flujo de autorización OAuth2.
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorizationFlowState {
    PendingAuth,
    ConsentApproved,
    CodeIssued,
    CodeConsumed,
    AccessIssued,
    RefreshIssued,
    CodeExpired,
    CodeReused,
    Denied,
}

/// Método de desafío PKCE (RFC 7636).
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum CodeChallengeMethod {
    S256,
    Plain,
}

impl CodeChallengeMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S256 => "S256",
            Self::Plain => "plain",
        }
    }

    /// Método ausente se interpreta permisivamente como 'plain';
    /// los despliegues serios deshabilitan 'plain' por completo.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "S256" => Some(Self::S256),
            "plain" => Some(Self::Plain),
            _ => None,
        }
    }
}

/// Registro efímero de autorización pendiente de consentimiento.
///
/// Reside en el KeyValueStore bajo `oauth_pending:{request_id}` con
/// TTL de 600 segundos; jamás toca el almacén durable.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingAuthorization {
    pub request_id: Uuid,
    pub client_id: String,
    pub redirect_uri: String,
    pub requested_scopes: Vec<String>,
    /// Valor de estado opaco del cliente, reinyectado en la redirección.
    pub state: Option<String>,
    pub code_challenge: Option<String>,
    pub code_challenge_method: Option<CodeChallengeMethod>,
    pub flow_state: AuthorizationFlowState,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Código de autorización de un solo uso (entidad durable).
///
/// # Invariantes:
/// - Entropía >= 128 bits; solo el digest SHA-256 se persiste.
/// - Consumo atómico: used pasa de 0 a 1 exactamente una vez; el
///   perdedor de la carrera recibe invalid_grant y dispara la
///   revocación en cascada de los tokens hermanos.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationCode {
    pub id: Uuid,
    /// Digest SHA-256 (hex) del código opaco de 32 caracteres.
    pub code_hash: String,
    pub client_id: String,
    pub identity_id: Uuid,
    /// URI ligada en la emisión; el canje exige igualdad exacta.
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub code_challenge: Option<String>,
    pub challenge_method: Option<CodeChallengeMethod>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
// FIN DEL ARCHIVO [libs/domain/models-rs/src/oauth_flow.rs]

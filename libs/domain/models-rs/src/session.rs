// INICIO DEL ARCHIVO [libs/domain/models-rs/src/session.rs]
/*!
 * =================================================================
 * APARATO: SESSION DOMAIN MODEL (V2.2)
 * CLASIFICACIÓN: DOMAIN ENTITIES (L2)
 * RESPONSABILIDAD: VÍNCULO IDENTIDAD <-> PAR DE TOKENS ACTIVOS
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;
use uuid::Uuid;

/// Sesión autenticada de una identidad.
///
/// La fila durable es autoritativa; la proyección cacheada bajo
/// `session:{id}` expira con el TTL del access token.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub identity_id: Uuid,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    /// Geolocalización gruesa resuelta por el proveedor opaco (ej: "AR/Buenos Aires").
    pub geolocation: Option<String>,
    /// Id (= jti) del access token vigente de la sesión.
    pub access_token_id: Uuid,
    /// Id (= jti) del refresh token vigente de la sesión.
    pub refresh_token_id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Expiración de la sesión (= expiración del refresh token).
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}
// FIN DEL ARCHIVO [libs/domain/models-rs/src/session.rs]

// INICIO DEL ARCHIVO [libs/domain/models-rs/src/reservation.rs]
/*!
 * =================================================================
 * APARATO: RESERVATION WORKFLOW MODELS (V2.0)
 * CLASIFICACIÓN: DOMAIN ENTITIES (L2)
 * RESPONSABILIDAD: CICLO DE VIDA DE RECLAMACIONES DE HANDLE
 *
 * VISION HIPER-HOLÍSTICA:
 * created -> pending -> (approved | rejected) -> apelación opcional.
 * El rechazo admite UNA apelación dentro de la ventana de 30 días.
 * =================================================================
 */

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;
use uuid::Uuid;

/// Ventana de apelación tras un rechazo (días naturales).
pub const APPEAL_WINDOW_DAYS: i64 = 30;

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Approved,
    Rejected,
    Withdrawn,
    Appealed,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Withdrawn => "withdrawn",
            Self::Appealed => "appealed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "withdrawn" => Some(Self::Withdrawn),
            "appealed" => Some(Self::Appealed),
            _ => None,
        }
    }

    /// Estados desde los cuales un moderador puede emitir un dictamen.
    pub fn is_reviewable(&self) -> bool {
        matches!(self, Self::Pending | Self::Appealed)
    }
}

/// Solicitud de reclamación de un handle protegido o premium.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationRequest {
    pub id: Uuid,
    pub identity_id: Uuid,
    /// Handle solicitado, ya normalizado por el Gobernador.
    pub requested_handle: String,
    pub justification: String,
    /// URIs de evidencia documental (prensa, registro mercantil, etc.).
    pub evidence_uris: Vec<String>,
    pub status: ReservationStatus,
    pub reviewer_id: Option<Uuid>,
    /// Dictamen del moderador (motivo de rechazo o nota de aprobación).
    pub review_reason: Option<String>,
    pub appeal_justification: Option<String>,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub appealed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl ReservationRequest {
    /// Una apelación solo procede sobre un rechazo, una única vez,
    /// dentro de la ventana de 30 días posteriores al dictamen.
    pub fn can_appeal_at(&self, now: DateTime<Utc>) -> bool {
        if self.status != ReservationStatus::Rejected || self.appealed_at.is_some() {
            return false;
        }
        match self.reviewed_at {
            Some(reviewed) => now - reviewed <= Duration::days(APPEAL_WINDOW_DAYS),
            None => false,
        }
    }
}

/// Rastro inmutable de cada reescritura de eid aprobada.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandleChangeHistory {
    pub id: Uuid,
    pub identity_id: Uuid,
    pub previous_eid: String,
    pub new_eid: String,
    /// Origen del cambio (reserva aprobada, mandato administrativo).
    pub reason: String,
    pub changed_at: DateTime<Utc>,
}
// FIN DEL ARCHIVO [libs/domain/models-rs/src/reservation.rs]

// [libs/infra/db/src/repositories/reservation.rs]
/*!
 * =================================================================
 * APARATO: RESERVATION REPOSITORY (V3.0 - ATOMIC CLAIMS)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: PERSISTENCIA DEL WORKFLOW DE RECLAMACIONES
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. ATOMIC SUBMISSION: La unicidad de 'una reserva viva por
 *    (identidad, handle)' la custodia el índice parcial
 *    idx_reservations_pending; el INSERT es la verificación.
 * 2. STATE GUARDS: Todo dictamen muta mediante UPDATE con guardia de
 *    estado en el WHERE; un estado inapto produce 0 filas y se
 *    clasifica como conflicto semántico.
 * =================================================================
 */

use crate::errors::DbError;
use crate::repositories::mapping;
use crate::TursoClient;
use chrono::{DateTime, Utc};
use entativa_domain_models::reservation::{ReservationRequest, ReservationStatus};
use libsql::{params, Row};
use tracing::{info, instrument};
use uuid::Uuid;

const RESERVATION_COLUMNS: &str = "id, identity_id, requested_handle, justification, \
     evidence_uris_json, status, reviewer_id, review_reason, appeal_justification, \
     created_at, reviewed_at, appealed_at, updated_at";

pub struct ReservationRepository {
    database_client: TursoClient,
}

impl ReservationRepository {
    pub fn new(client: TursoClient) -> Self {
        Self {
            database_client: client,
        }
    }

    /**
     * Inserción atómica de la reclamación.
     *
     * # Errors:
     * - `DbError::DuplicatePendingReservation`: ya existe una reserva
     *   viva del mismo usuario por el mismo handle.
     */
    #[instrument(skip(self, reservation), fields(handle = %reservation.requested_handle))]
    pub async fn submit(&self, reservation: &ReservationRequest) -> Result<(), DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let evidence_payload = mapping::crystallize_string_vec(&reservation.evidence_uris)?;

        let insert_outcome = database_connection
            .execute(
                "INSERT INTO reservation_requests (
                    id, identity_id, requested_handle, justification, evidence_uris_json,
                    status, reviewer_id, review_reason, appeal_justification,
                    created_at, reviewed_at, appealed_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, NULL, NULL, ?7, NULL, NULL, ?7)",
                params![
                    reservation.id.to_string(),
                    reservation.identity_id.to_string(),
                    reservation.requested_handle.clone(),
                    reservation.justification.clone(),
                    evidence_payload,
                    reservation.status.as_str(),
                    mapping::stamp(reservation.created_at)
                ],
            )
            .await;

        match insert_outcome {
            Ok(_) => {
                info!(
                    "📜 [RESERVATION_FILED]: Claim for [{}] registered.",
                    reservation.requested_handle
                );
                Ok(())
            }
            Err(insert_fault) if DbError::is_unique_violation(&insert_fault) => {
                Err(DbError::DuplicatePendingReservation)
            }
            Err(insert_fault) => Err(DbError::QueryError(insert_fault)),
        }
    }

    pub async fn fetch(&self, reservation_id: Uuid) -> Result<Option<ReservationRequest>, DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let query_statement = format!(
            "SELECT {} FROM reservation_requests WHERE id = ?1",
            RESERVATION_COLUMNS
        );
        let mut rows = database_connection
            .query(query_statement.as_str(), params![reservation_id.to_string()])
            .await?;

        match rows.next().await? {
            Some(data_row) => Ok(Some(Self::map_row_to_reservation(data_row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_for_identity(
        &self,
        identity_id: Uuid,
    ) -> Result<Vec<ReservationRequest>, DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let query_statement = format!(
            "SELECT {} FROM reservation_requests WHERE identity_id = ?1 ORDER BY created_at DESC",
            RESERVATION_COLUMNS
        );
        let mut rows = database_connection
            .query(query_statement.as_str(), params![identity_id.to_string()])
            .await?;

        let mut reservations = Vec::new();
        while let Some(data_row) = rows.next().await? {
            reservations.push(Self::map_row_to_reservation(data_row)?);
        }
        Ok(reservations)
    }

    /**
     * Dictamen del moderador sobre una reserva en estado revisable.
     * El WHERE actúa como guardia: 0 filas -> conflicto de estado.
     */
    #[instrument(skip(self, review_reason))]
    pub async fn review(
        &self,
        reservation_id: Uuid,
        reviewer_id: Uuid,
        verdict: ReservationStatus,
        review_reason: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<ReservationRequest, DbError> {
        if !matches!(verdict, ReservationStatus::Approved | ReservationStatus::Rejected) {
            return Err(DbError::ReservationStateConflict);
        }

        let database_connection = self.database_client.acquire_connection()?;
        let query_statement = format!(
            "UPDATE reservation_requests
             SET status = ?2, reviewer_id = ?3, review_reason = ?4,
                 reviewed_at = ?5, updated_at = ?5
             WHERE id = ?1 AND status IN ('pending', 'appealed')
             RETURNING {}",
            RESERVATION_COLUMNS
        );

        let mut rows = database_connection
            .query(
                query_statement.as_str(),
                params![
                    reservation_id.to_string(),
                    verdict.as_str(),
                    reviewer_id.to_string(),
                    review_reason,
                    mapping::stamp(now)
                ],
            )
            .await?;

        match rows.next().await? {
            Some(data_row) => {
                info!(
                    "⚖️ [RESERVATION_VERDICT]: Claim {} resolved as {}.",
                    reservation_id,
                    verdict.as_str()
                );
                Self::map_row_to_reservation(data_row)
            }
            None => Err(DbError::ReservationStateConflict),
        }
    }

    /// Apelación única sobre un rechazo aún no apelado.
    pub async fn appeal(
        &self,
        reservation_id: Uuid,
        justification: &str,
        now: DateTime<Utc>,
    ) -> Result<ReservationRequest, DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let query_statement = format!(
            "UPDATE reservation_requests
             SET status = 'appealed', appeal_justification = ?2,
                 appealed_at = ?3, updated_at = ?3
             WHERE id = ?1 AND status = 'rejected' AND appealed_at IS NULL
             RETURNING {}",
            RESERVATION_COLUMNS
        );

        let mut rows = database_connection
            .query(
                query_statement.as_str(),
                params![reservation_id.to_string(), justification, mapping::stamp(now)],
            )
            .await?;

        match rows.next().await? {
            Some(data_row) => Self::map_row_to_reservation(data_row),
            None => Err(DbError::ReservationStateConflict),
        }
    }

    /// Retiro voluntario de una reserva aún pendiente.
    pub async fn withdraw(
        &self,
        reservation_id: Uuid,
        identity_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let affected = database_connection
            .execute(
                "UPDATE reservation_requests
                 SET status = 'withdrawn', updated_at = ?3
                 WHERE id = ?1 AND identity_id = ?2 AND status = 'pending'",
                params![
                    reservation_id.to_string(),
                    identity_id.to_string(),
                    mapping::stamp(now)
                ],
            )
            .await?;

        if affected == 0 {
            return Err(DbError::ReservationStateConflict);
        }
        Ok(())
    }

    // --- ESTRATO DE MAPEO (PRIVATE SSoT) ---

    fn map_row_to_reservation(data_row: Row) -> Result<ReservationRequest, DbError> {
        let status_raw: String = data_row.get(5)?;
        let status = ReservationStatus::parse(&status_raw).ok_or_else(|| {
            DbError::MappingError(format!("UNKNOWN_RESERVATION_STATUS: {}", status_raw))
        })?;

        Ok(ReservationRequest {
            id: mapping::require_uuid(&data_row, 0, "reservation.id")?,
            identity_id: mapping::require_uuid(&data_row, 1, "reservation.identity_id")?,
            requested_handle: data_row.get(2)?,
            justification: data_row.get(3)?,
            evidence_uris: mapping::extract_string_vec(&data_row, 4, "reservation.evidence_uris_json")?,
            status,
            reviewer_id: mapping::extract_uuid(&data_row, 6),
            review_reason: data_row.get::<Option<String>>(7).ok().flatten(),
            appeal_justification: data_row.get::<Option<String>>(8).ok().flatten(),
            created_at: mapping::require_datetime(&data_row, 9, "reservation.created_at")?,
            reviewed_at: mapping::extract_datetime(&data_row, 10),
            appealed_at: mapping::extract_datetime(&data_row, 11),
            updated_at: mapping::require_datetime(&data_row, 12, "reservation.updated_at")?,
        })
    }
}

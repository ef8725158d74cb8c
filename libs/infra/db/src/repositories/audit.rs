// [libs/infra/db/src/repositories/audit.rs]
/*!
 * =================================================================
 * APARATO: AUDIT LEDGER REPOSITORY (V2.1 - APPEND ONLY)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: LIBRO MAYOR DE SEGURIDAD INMUTABLE
 *
 * VISION HIPER-HOLÍSTICA:
 * El ledger solo conoce INSERT y SELECT; no existe UPDATE ni DELETE.
 * La exportación GDPR es un colaborador externo que lee este rastro.
 * =================================================================
 */

use crate::errors::DbError;
use crate::repositories::mapping;
use crate::TursoClient;
use entativa_domain_models::audit::{AuditAction, AuditEvent, LawfulBasis};
use libsql::{params, Row};
use std::collections::BTreeMap;
use tracing::instrument;
use uuid::Uuid;

const EVENT_COLUMNS: &str =
    "id, identity_id, actor_id, action, details_json, ip_address, user_agent, occurred_at, lawful_basis";

pub struct AuditRepository {
    database_client: TursoClient,
}

impl AuditRepository {
    pub fn new(client: TursoClient) -> Self {
        Self {
            database_client: client,
        }
    }

    /// Apéndice inmutable de un evento de seguridad.
    #[instrument(skip(self, event), fields(action = event.action.as_str()))]
    pub async fn append(&self, event: &AuditEvent) -> Result<(), DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let details_payload = serde_json::to_string(&event.details)
            .map_err(|fault| DbError::MappingError(format!("SERIALIZATION_FAULT: {}", fault)))?;

        database_connection
            .execute(
                "INSERT INTO audit_events (
                    id, identity_id, actor_id, action, details_json,
                    ip_address, user_agent, occurred_at, lawful_basis
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    event.id.to_string(),
                    event.identity_id.map(|id| id.to_string()),
                    event.actor_id.map(|id| id.to_string()),
                    event.action.as_str(),
                    details_payload,
                    event.ip_address.clone(),
                    event.user_agent.clone(),
                    mapping::stamp(event.occurred_at),
                    event.lawful_basis.as_str()
                ],
            )
            .await?;
        Ok(())
    }

    /// Rastro reciente de una identidad (más nuevo primero).
    pub async fn list_for_identity(
        &self,
        identity_id: Uuid,
        limit: u32,
    ) -> Result<Vec<AuditEvent>, DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let query_statement = format!(
            "SELECT {} FROM audit_events
             WHERE identity_id = ?1
             ORDER BY occurred_at DESC
             LIMIT ?2",
            EVENT_COLUMNS
        );
        let mut rows = database_connection
            .query(
                query_statement.as_str(),
                params![identity_id.to_string(), limit as i64],
            )
            .await?;

        let mut events = Vec::new();
        while let Some(data_row) = rows.next().await? {
            events.push(Self::map_row_to_event(data_row)?);
        }
        Ok(events)
    }

    // --- ESTRATO DE MAPEO (PRIVATE SSoT) ---

    fn map_row_to_event(data_row: Row) -> Result<AuditEvent, DbError> {
        let action_raw: String = data_row.get(3)?;
        let action = AuditAction::parse(&action_raw)
            .ok_or_else(|| DbError::MappingError(format!("UNKNOWN_AUDIT_ACTION: {}", action_raw)))?;

        let basis_raw: String = data_row.get(8)?;
        let lawful_basis = LawfulBasis::parse(&basis_raw)
            .ok_or_else(|| DbError::MappingError(format!("UNKNOWN_LAWFUL_BASIS: {}", basis_raw)))?;

        let details_raw: String = data_row.get(4)?;
        let details: BTreeMap<String, String> = serde_json::from_str(&details_raw)
            .map_err(|_| DbError::MappingError("NON_JSON_DETAILS_CELL".into()))?;

        Ok(AuditEvent {
            id: mapping::require_uuid(&data_row, 0, "audit_events.id")?,
            identity_id: mapping::extract_uuid(&data_row, 1),
            actor_id: mapping::extract_uuid(&data_row, 2),
            action,
            details,
            ip_address: data_row.get::<Option<String>>(5).ok().flatten(),
            user_agent: data_row.get::<Option<String>>(6).ok().flatten(),
            occurred_at: mapping::require_datetime(&data_row, 7, "audit_events.occurred_at")?,
            lawful_basis,
        })
    }
}

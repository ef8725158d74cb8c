// [libs/infra/db/src/repositories/session.rs]
/*!
 * =================================================================
 * APARATO: SESSION REPOSITORY (V3.1 - CAP ENFORCER)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: PERSISTENCIA DE SESIONES Y TOPE POR IDENTIDAD
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. OLDEST-FIRST EVICTION: oldest_active alimenta la expulsión
 *    cuando una identidad supera su tope de sesiones configurado.
 * 2. CASCADE FEED: revoke retorna la fila para que el autenticador
 *    incinere el par de tokens y alimente la blacklist efímera.
 * =================================================================
 */

use crate::errors::DbError;
use crate::repositories::mapping;
use crate::TursoClient;
use chrono::{DateTime, Utc};
use entativa_domain_models::session::Session;
use libsql::{params, Row};
use tracing::{info, instrument};
use uuid::Uuid;

const SESSION_COLUMNS: &str = "id, identity_id, user_agent, ip_address, geolocation, \
     access_token_id, refresh_token_id, created_at, expires_at, revoked_at";

pub struct SessionRepository {
    database_client: TursoClient,
}

impl SessionRepository {
    pub fn new(client: TursoClient) -> Self {
        Self {
            database_client: client,
        }
    }

    #[instrument(skip(self, session), fields(identity = %session.identity_id))]
    pub async fn insert(&self, session: &Session) -> Result<(), DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        database_connection
            .execute(
                "INSERT INTO sessions (
                    id, identity_id, user_agent, ip_address, geolocation,
                    access_token_id, refresh_token_id, created_at, expires_at, revoked_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, NULL)",
                params![
                    session.id.to_string(),
                    session.identity_id.to_string(),
                    session.user_agent.clone(),
                    session.ip_address.clone(),
                    session.geolocation.clone(),
                    session.access_token_id.to_string(),
                    session.refresh_token_id.to_string(),
                    mapping::stamp(session.created_at),
                    mapping::stamp(session.expires_at)
                ],
            )
            .await?;

        info!("🖥️ [SESSION_VAULT]: Session {} crystallized.", session.id);
        Ok(())
    }

    pub async fn fetch(&self, session_id: Uuid) -> Result<Option<Session>, DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let query_statement = format!("SELECT {} FROM sessions WHERE id = ?1", SESSION_COLUMNS);
        let mut rows = database_connection
            .query(query_statement.as_str(), params![session_id.to_string()])
            .await?;

        match rows.next().await? {
            Some(data_row) => Ok(Some(Self::map_row_to_session(data_row)?)),
            None => Ok(None),
        }
    }

    /// Sesiones vivas de la identidad, de la más antigua a la más nueva.
    pub async fn list_active_for_identity(
        &self,
        identity_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Session>, DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let query_statement = format!(
            "SELECT {} FROM sessions
             WHERE identity_id = ?1 AND revoked_at IS NULL AND expires_at > ?2
             ORDER BY created_at ASC",
            SESSION_COLUMNS
        );
        let mut rows = database_connection
            .query(
                query_statement.as_str(),
                params![identity_id.to_string(), mapping::stamp(now)],
            )
            .await?;

        let mut sessions = Vec::new();
        while let Some(data_row) = rows.next().await? {
            sessions.push(Self::map_row_to_session(data_row)?);
        }
        Ok(sessions)
    }

    /// Actualiza el par de tokens vigente tras una rotación de refresh.
    pub async fn rebind_tokens(
        &self,
        session_id: Uuid,
        access_token_id: Uuid,
        refresh_token_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let affected = database_connection
            .execute(
                "UPDATE sessions
                 SET access_token_id = ?2, refresh_token_id = ?3, expires_at = ?4
                 WHERE id = ?1 AND revoked_at IS NULL",
                params![
                    session_id.to_string(),
                    access_token_id.to_string(),
                    refresh_token_id.to_string(),
                    mapping::stamp(expires_at)
                ],
            )
            .await?;

        if affected == 0 {
            return Err(DbError::SessionNotFound);
        }
        Ok(())
    }

    /// Marca la sesión como revocada; retorna false si ya lo estaba.
    pub async fn mark_revoked(
        &self,
        session_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let affected = database_connection
            .execute(
                "UPDATE sessions SET revoked_at = ?2 WHERE id = ?1 AND revoked_at IS NULL",
                params![session_id.to_string(), mapping::stamp(now)],
            )
            .await?;
        Ok(affected > 0)
    }

    /// Revoca todas las sesiones vivas de una identidad; retorna sus ids.
    pub async fn revoke_all_for_identity(
        &self,
        identity_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Uuid>, DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let mut rows = database_connection
            .query(
                "UPDATE sessions SET revoked_at = ?2
                 WHERE identity_id = ?1 AND revoked_at IS NULL
                 RETURNING id",
                params![identity_id.to_string(), mapping::stamp(now)],
            )
            .await?;

        let mut revoked_ids = Vec::new();
        while let Some(data_row) = rows.next().await? {
            revoked_ids.push(mapping::require_uuid(&data_row, 0, "sessions.id")?);
        }
        Ok(revoked_ids)
    }

    // --- ESTRATO DE MAPEO (PRIVATE SSoT) ---

    fn map_row_to_session(data_row: Row) -> Result<Session, DbError> {
        Ok(Session {
            id: mapping::require_uuid(&data_row, 0, "sessions.id")?,
            identity_id: mapping::require_uuid(&data_row, 1, "sessions.identity_id")?,
            user_agent: data_row.get::<Option<String>>(2).ok().flatten(),
            ip_address: data_row.get::<Option<String>>(3).ok().flatten(),
            geolocation: data_row.get::<Option<String>>(4).ok().flatten(),
            access_token_id: mapping::require_uuid(&data_row, 5, "sessions.access_token_id")?,
            refresh_token_id: mapping::require_uuid(&data_row, 6, "sessions.refresh_token_id")?,
            created_at: mapping::require_datetime(&data_row, 7, "sessions.created_at")?,
            expires_at: mapping::require_datetime(&data_row, 8, "sessions.expires_at")?,
            revoked_at: mapping::extract_datetime(&data_row, 9),
        })
    }
}

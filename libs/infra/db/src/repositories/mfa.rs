// [libs/infra/db/src/repositories/mfa.rs]
/*!
 * =================================================================
 * APARATO: MFA REPOSITORY (V3.2 - FACTOR GOVERNANCE)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: PERSISTENCIA DE FACTORES Y CÓDIGOS DE RESPALDO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. PRIMARY SINGULARITY: set_primary limpia cualquier primario previo
 *    dentro de la misma transacción; el índice parcial idx_mfa_primary
 *    es la última línea de defensa.
 * 2. FAILURE PHYSICS: record_failure incrementa y retorna el contador
 *    en una ráfaga para la decisión de desactivación al quinto fallo.
 * 3. SINGLE-USE CODES: el consumo de un código de respaldo es un
 *    UPDATE con guardia used_at IS NULL (compare-and-swap de fila).
 * =================================================================
 */

use crate::errors::DbError;
use crate::repositories::mapping;
use crate::TursoClient;
use chrono::{DateTime, Utc};
use entativa_domain_models::mfa::{MfaKind, MfaMethod};
use libsql::{params, Row};
use tracing::{info, instrument, warn};
use uuid::Uuid;

const METHOD_COLUMNS: &str = "id, identity_id, kind, encrypted_secret, is_verified, is_primary, \
     priority, usage_count, last_used_at, consecutive_failures, is_active, created_at";

pub struct MfaRepository {
    database_client: TursoClient,
}

impl MfaRepository {
    pub fn new(client: TursoClient) -> Self {
        Self {
            database_client: client,
        }
    }

    #[instrument(skip(self, method), fields(kind = method.kind.as_str()))]
    pub async fn insert_method(&self, method: &MfaMethod) -> Result<(), DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        database_connection
            .execute(
                "INSERT INTO mfa_methods (
                    id, identity_id, kind, encrypted_secret, is_verified, is_primary,
                    priority, usage_count, last_used_at, consecutive_failures, is_active, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, 0, NULL, 0, 1, ?7)",
                params![
                    method.id.to_string(),
                    method.identity_id.to_string(),
                    method.kind.as_str(),
                    method.encrypted_secret.clone(),
                    method.is_verified as i64,
                    method.priority as i64,
                    mapping::stamp(method.created_at)
                ],
            )
            .await?;

        info!("🛡️ [MFA_VAULT]: Factor {} enrolled for identity {}.", method.kind.as_str(), method.identity_id);
        Ok(())
    }

    pub async fn fetch_method(&self, method_id: Uuid) -> Result<Option<MfaMethod>, DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let query_statement = format!("SELECT {} FROM mfa_methods WHERE id = ?1", METHOD_COLUMNS);
        let mut rows = database_connection
            .query(query_statement.as_str(), params![method_id.to_string()])
            .await?;

        match rows.next().await? {
            Some(data_row) => Ok(Some(Self::map_row_to_method(data_row)?)),
            None => Ok(None),
        }
    }

    /// Factores activos de la identidad, por prioridad ascendente.
    pub async fn list_active_for_identity(
        &self,
        identity_id: Uuid,
    ) -> Result<Vec<MfaMethod>, DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let query_statement = format!(
            "SELECT {} FROM mfa_methods
             WHERE identity_id = ?1 AND is_active = 1
             ORDER BY priority ASC, created_at ASC",
            METHOD_COLUMNS
        );
        let mut rows = database_connection
            .query(query_statement.as_str(), params![identity_id.to_string()])
            .await?;

        let mut methods = Vec::new();
        while let Some(data_row) = rows.next().await? {
            methods.push(Self::map_row_to_method(data_row)?);
        }
        Ok(methods)
    }

    /// Factor primario activo y verificado de la identidad.
    pub async fn fetch_primary(&self, identity_id: Uuid) -> Result<Option<MfaMethod>, DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let query_statement = format!(
            "SELECT {} FROM mfa_methods
             WHERE identity_id = ?1 AND is_primary = 1 AND is_active = 1 AND is_verified = 1",
            METHOD_COLUMNS
        );
        let mut rows = database_connection
            .query(query_statement.as_str(), params![identity_id.to_string()])
            .await?;

        match rows.next().await? {
            Some(data_row) => Ok(Some(Self::map_row_to_method(data_row)?)),
            None => Ok(None),
        }
    }

    /// Sella la prueba de posesión del enrolamiento.
    pub async fn mark_verified(&self, method_id: Uuid) -> Result<(), DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let affected = database_connection
            .execute(
                "UPDATE mfa_methods SET is_verified = 1 WHERE id = ?1 AND is_active = 1",
                params![method_id.to_string()],
            )
            .await?;
        if affected == 0 {
            return Err(DbError::MfaMethodNotFound);
        }
        Ok(())
    }

    /**
     * Promueve el factor a primario custodiando la singularidad.
     *
     * # Mathematical Proof (Primary Uniqueness):
     * La limpieza y la promoción comparten transacción; el índice
     * parcial idx_mfa_primary convierte cualquier carrera residual
     * en violación UNIQUE en lugar de estado corrupto.
     */
    #[instrument(skip(self))]
    pub async fn set_primary(&self, identity_id: Uuid, method_id: Uuid) -> Result<(), DbError> {
        let database_connection = self.database_client.acquire_connection()?;

        database_connection
            .execute("BEGIN IMMEDIATE", ())
            .await
            .map_err(|_| DbError::TransactionError)?;

        let clear_outcome = database_connection
            .execute(
                "UPDATE mfa_methods SET is_primary = 0 WHERE identity_id = ?1 AND is_primary = 1",
                params![identity_id.to_string()],
            )
            .await;

        if clear_outcome.is_err() {
            let _ = database_connection.execute("ROLLBACK", ()).await;
            return Err(DbError::TransactionError);
        }

        let promote_outcome = database_connection
            .execute(
                "UPDATE mfa_methods SET is_primary = 1
                 WHERE id = ?1 AND identity_id = ?2 AND is_active = 1 AND is_verified = 1",
                params![method_id.to_string(), identity_id.to_string()],
            )
            .await;

        match promote_outcome {
            Ok(0) => {
                let _ = database_connection.execute("ROLLBACK", ()).await;
                Err(DbError::MfaMethodNotFound)
            }
            Ok(_) => {
                database_connection
                    .execute("COMMIT", ())
                    .await
                    .map_err(|_| DbError::TransactionError)?;
                Ok(())
            }
            Err(_) => {
                let _ = database_connection.execute("ROLLBACK", ()).await;
                Err(DbError::TransactionError)
            }
        }
    }

    /// Sella un desafío exitoso: uso, marca temporal y contador de fallos a cero.
    pub async fn record_success(&self, method_id: Uuid, now: DateTime<Utc>) -> Result<(), DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let affected = database_connection
            .execute(
                "UPDATE mfa_methods
                 SET usage_count = usage_count + 1, last_used_at = ?2, consecutive_failures = 0
                 WHERE id = ?1 AND is_active = 1",
                params![method_id.to_string(), mapping::stamp(now)],
            )
            .await?;
        if affected == 0 {
            return Err(DbError::MfaMethodNotFound);
        }
        Ok(())
    }

    /// Incrementa y retorna el contador de fallos consecutivos.
    pub async fn record_failure(&self, method_id: Uuid) -> Result<u32, DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let mut rows = database_connection
            .query(
                "UPDATE mfa_methods
                 SET consecutive_failures = consecutive_failures + 1
                 WHERE id = ?1 AND is_active = 1
                 RETURNING consecutive_failures",
                params![method_id.to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(data_row) => Ok(data_row.get::<i64>(0)? as u32),
            None => Err(DbError::MfaMethodNotFound),
        }
    }

    /// Desactivación del factor (quinto fallo consecutivo o baja voluntaria).
    pub async fn deactivate(&self, method_id: Uuid) -> Result<(), DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let affected = database_connection
            .execute(
                "UPDATE mfa_methods SET is_active = 0, is_primary = 0 WHERE id = ?1",
                params![method_id.to_string()],
            )
            .await?;
        if affected == 0 {
            return Err(DbError::MfaMethodNotFound);
        }
        warn!("⛔ [MFA_SENTENCE]: Factor {} deactivated.", method_id);
        Ok(())
    }

    // --- CÓDIGOS DE RESPALDO ---

    /// Cristaliza el lote de digests de códigos de respaldo.
    pub async fn insert_backup_codes(
        &self,
        method_id: Uuid,
        code_hashes: &[String],
    ) -> Result<(), DbError> {
        let database_connection = self.database_client.acquire_connection()?;

        database_connection
            .execute("BEGIN IMMEDIATE", ())
            .await
            .map_err(|_| DbError::TransactionError)?;

        // Una regeneración reemplaza el lote completo anterior.
        let purge_outcome = database_connection
            .execute(
                "DELETE FROM mfa_backup_codes WHERE method_id = ?1",
                params![method_id.to_string()],
            )
            .await;

        if purge_outcome.is_err() {
            let _ = database_connection.execute("ROLLBACK", ()).await;
            return Err(DbError::TransactionError);
        }

        for code_hash in code_hashes {
            let insert_outcome = database_connection
                .execute(
                    "INSERT INTO mfa_backup_codes (id, method_id, code_hash, used_at)
                     VALUES (?1, ?2, ?3, NULL)",
                    params![Uuid::new_v4().to_string(), method_id.to_string(), code_hash.clone()],
                )
                .await;

            if insert_outcome.is_err() {
                let _ = database_connection.execute("ROLLBACK", ()).await;
                return Err(DbError::TransactionError);
            }
        }

        database_connection
            .execute("COMMIT", ())
            .await
            .map_err(|_| DbError::TransactionError)?;
        Ok(())
    }

    /// Consumo de un solo uso: true si este canje selló el código.
    pub async fn consume_backup_code(
        &self,
        method_id: Uuid,
        code_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let affected = database_connection
            .execute(
                "UPDATE mfa_backup_codes SET used_at = ?3
                 WHERE method_id = ?1 AND code_hash = ?2 AND used_at IS NULL",
                params![method_id.to_string(), code_hash, mapping::stamp(now)],
            )
            .await?;
        Ok(affected > 0)
    }

    /// Códigos aún disponibles (0 dispara el aviso de regeneración).
    pub async fn unused_backup_count(&self, method_id: Uuid) -> Result<u64, DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let mut rows = database_connection
            .query(
                "SELECT COUNT(*) FROM mfa_backup_codes WHERE method_id = ?1 AND used_at IS NULL",
                params![method_id.to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(data_row) => Ok(data_row.get::<i64>(0)? as u64),
            None => Ok(0),
        }
    }

    // --- ESTRATO DE MAPEO (PRIVATE SSoT) ---

    fn map_row_to_method(data_row: Row) -> Result<MfaMethod, DbError> {
        let kind_raw: String = data_row.get(2)?;
        let kind = MfaKind::parse(&kind_raw)
            .ok_or_else(|| DbError::MappingError(format!("UNKNOWN_MFA_KIND: {}", kind_raw)))?;

        Ok(MfaMethod {
            id: mapping::require_uuid(&data_row, 0, "mfa_methods.id")?,
            identity_id: mapping::require_uuid(&data_row, 1, "mfa_methods.identity_id")?,
            kind,
            encrypted_secret: data_row.get(3)?,
            is_verified: mapping::extract_bool(&data_row, 4)?,
            is_primary: mapping::extract_bool(&data_row, 5)?,
            priority: data_row.get::<i64>(6)? as i32,
            usage_count: data_row.get::<i64>(7)? as u64,
            last_used_at: mapping::extract_datetime(&data_row, 8),
            consecutive_failures: data_row.get::<i64>(9)? as u32,
            is_active: mapping::extract_bool(&data_row, 10)?,
            created_at: mapping::require_datetime(&data_row, 11, "mfa_methods.created_at")?,
        })
    }
}

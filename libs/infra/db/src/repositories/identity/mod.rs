// [libs/infra/db/src/repositories/identity/mod.rs]
/*!
 * =================================================================
 * APARATO: IDENTITY REPOSITORY (V5.2 - GOVERNANCE SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: GESTIÓN ATÓMICA DEL CICLO DE VIDA DE IDENTIDADES
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. ATOMIC LOCKOUT: El contador de fallos se incrementa en una sola
 *    ráfaga SQL mediante 'UPDATE...RETURNING', erradicando condiciones
 *    de carrera entre intentos concurrentes.
 * 2. DUAL UNIQUENESS: Las violaciones UNIQUE de email y eid se
 *    clasifican hacia conflictos semánticos distintos del catálogo.
 * 3. HISTORY TRAIL: Toda reescritura de eid cristaliza su rastro en
 *    handle_change_history dentro de la misma transacción.
 *
 * # Mathematical Proof (Row-Level Mutex):
 * Al encapsular la mutación dentro del WHERE del UPDATE, la base de
 * datos actúa como un semáforo de exclusión mutua a nivel de fila,
 * garantizando contadores de lockout exactos bajo concurrencia.
 * =================================================================
 */

pub mod queries;

use crate::errors::DbError;
use crate::repositories::identity::queries as sql_registry;
use crate::repositories::mapping;
use crate::TursoClient;
use chrono::{DateTime, Utc};
use entativa_domain_models::identity::{
    FieldVisibility, Identity, IdentityStatus, Profile, VerificationBadge, VerificationStatus,
};
use libsql::{params, Row};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Repositorio de autoridad única para la bóveda de identidades.
pub struct IdentityRepository {
    database_client: TursoClient,
}

impl IdentityRepository {
    pub fn new(client: TursoClient) -> Self {
        Self {
            database_client: client,
        }
    }

    /**
     * Registra una identidad nueva junto a su perfil satélite.
     *
     * # Errors:
     * - `DbError::DuplicateEmail` / `DbError::DuplicateEid`: violación
     *   de unicidad clasificada; el motor superior la traduce a conflicto.
     */
    #[instrument(skip(self, identity, profile), fields(eid = %identity.eid))]
    pub async fn register_identity(
        &self,
        identity: &Identity,
        profile: &Profile,
    ) -> Result<(), DbError> {
        let database_connection = self.database_client.acquire_connection()?;

        database_connection
            .execute("BEGIN IMMEDIATE", ())
            .await
            .map_err(|_| DbError::TransactionError)?;

        let insert_outcome = database_connection
            .execute(
                "INSERT INTO identities (
                    id, eid, email, phone_number, password_hash, status,
                    verification_status, verification_badge, reputation_score,
                    failed_login_attempts, locked_until, last_login_at,
                    created_at, updated_at, created_ip, created_user_agent
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, NULL, NULL, ?11, ?11, ?12, ?13)",
                params![
                    identity.id.to_string(),
                    identity.eid.clone(),
                    identity.email.clone(),
                    identity.phone_number.clone(),
                    identity.password_hash.clone(),
                    identity.status.as_str(),
                    identity.verification_status.as_str(),
                    identity.verification_badge.map(|badge| badge.as_str()),
                    identity.reputation_score,
                    identity.failed_login_attempts as i64,
                    mapping::stamp(identity.created_at),
                    identity.created_ip.clone(),
                    identity.created_user_agent.clone(),
                ],
            )
            .await;

        if let Err(insert_fault) = insert_outcome {
            let _ = database_connection.execute("ROLLBACK", ()).await;
            if DbError::is_unique_violation(&insert_fault) {
                return Err(DbError::from_unique_violation(insert_fault));
            }
            return Err(DbError::QueryError(insert_fault));
        }

        if let Err(profile_fault) = self
            .execute_profile_upsert(&database_connection, profile)
            .await
        {
            let _ = database_connection.execute("ROLLBACK", ()).await;
            return Err(profile_fault);
        }

        database_connection
            .execute("COMMIT", ())
            .await
            .map_err(|_| DbError::TransactionError)?;

        info!("🪪 [IDENTITY_VAULT]: Identity [{}] crystallized.", identity.eid);
        Ok(())
    }

    pub async fn fetch_by_id(&self, identity_id: Uuid) -> Result<Option<Identity>, DbError> {
        self.fetch_by_column("id", &identity_id.to_string()).await
    }

    pub async fn fetch_by_email(&self, email: &str) -> Result<Option<Identity>, DbError> {
        self.fetch_by_column("email", email).await
    }

    pub async fn fetch_by_eid(&self, eid: &str) -> Result<Option<Identity>, DbError> {
        self.fetch_by_column("eid", eid).await
    }

    /// Consulta de disponibilidad usada por el Gobernador de Handles.
    pub async fn eid_exists(&self, eid: &str) -> Result<bool, DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let mut rows = database_connection
            .query("SELECT COUNT(*) FROM identities WHERE eid = ?1", params![eid])
            .await?;
        let count: i64 = rows
            .next()
            .await?
            .ok_or_else(|| DbError::MappingError("EMPTY_COUNT_PROJECTION".into()))?
            .get(0)?;
        Ok(count > 0)
    }

    /**
     * Incremento atómico del contador de fallos; retorna el valor nuevo.
     */
    #[instrument(skip(self))]
    pub async fn record_login_failure(
        &self,
        identity_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u32, DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let mut rows = database_connection
            .query(
                sql_registry::RECORD_LOGIN_FAILURE,
                params![identity_id.to_string(), mapping::stamp(now)],
            )
            .await?;

        match rows.next().await? {
            Some(data_row) => Ok(data_row.get::<i64>(0)? as u32),
            None => Err(DbError::IdentityNotFound),
        }
    }

    /// Activa el veto temporal de autenticación.
    pub async fn engage_lockout(
        &self,
        identity_id: Uuid,
        locked_until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let affected = database_connection
            .execute(
                sql_registry::ENGAGE_LOCKOUT,
                params![
                    identity_id.to_string(),
                    mapping::stamp(locked_until),
                    mapping::stamp(now)
                ],
            )
            .await?;
        if affected == 0 {
            return Err(DbError::IdentityNotFound);
        }
        warn!("🔒 [LOCKOUT_ENGAGED]: Identity [{}] vetoed until {}.", identity_id, locked_until);
        Ok(())
    }

    /**
     * Libera los vetos temporales ya vencidos (daemon de vigilancia).
     * Retorna los ids restaurados; los bloqueos administrativos
     * (Locked sin locked_until) quedan intactos.
     */
    pub async fn release_lapsed_lockouts(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Uuid>, DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let mut rows = database_connection
            .query(
                sql_registry::RELEASE_LAPSED_LOCKOUTS,
                params![mapping::stamp(now)],
            )
            .await?;

        let mut restored_identities = Vec::new();
        while let Some(data_row) = rows.next().await? {
            restored_identities.push(mapping::require_uuid(&data_row, 0, "identities.id")?);
        }
        Ok(restored_identities)
    }

    /// Limpia contador y veto tras autenticación exitosa.
    pub async fn reset_login_state(
        &self,
        identity_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let affected = database_connection
            .execute(
                sql_registry::RESET_LOGIN_STATE,
                params![identity_id.to_string(), mapping::stamp(now)],
            )
            .await?;
        if affected == 0 {
            return Err(DbError::IdentityNotFound);
        }
        Ok(())
    }

    /// Rotación del material bcrypt.
    pub async fn update_password_hash(
        &self,
        identity_id: Uuid,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<(), DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let affected = database_connection
            .execute(
                sql_registry::UPDATE_PASSWORD_HASH,
                params![identity_id.to_string(), password_hash, mapping::stamp(now)],
            )
            .await?;
        if affected == 0 {
            return Err(DbError::IdentityNotFound);
        }
        info!("🔑 [CREDENTIAL_ROTATED]: Identity [{}] password material renewed.", identity_id);
        Ok(())
    }

    /**
     * Reescribe el eid y cristaliza el rastro histórico en la misma
     * transacción (protocolo de reserva aprobada).
     */
    #[instrument(skip(self, reason))]
    pub async fn rewrite_eid(
        &self,
        identity_id: Uuid,
        previous_eid: &str,
        new_eid: &str,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<(), DbError> {
        let database_connection = self.database_client.acquire_connection()?;

        database_connection
            .execute("BEGIN IMMEDIATE", ())
            .await
            .map_err(|_| DbError::TransactionError)?;

        let rewrite_outcome = database_connection
            .execute(
                sql_registry::REWRITE_EID,
                params![identity_id.to_string(), new_eid, mapping::stamp(now)],
            )
            .await;

        match rewrite_outcome {
            Ok(0) => {
                let _ = database_connection.execute("ROLLBACK", ()).await;
                return Err(DbError::IdentityNotFound);
            }
            Ok(_) => {}
            Err(rewrite_fault) => {
                let _ = database_connection.execute("ROLLBACK", ()).await;
                if DbError::is_unique_violation(&rewrite_fault) {
                    return Err(DbError::DuplicateEid);
                }
                return Err(DbError::QueryError(rewrite_fault));
            }
        }

        let history_outcome = database_connection
            .execute(
                "INSERT INTO handle_change_history (id, identity_id, previous_eid, new_eid, reason, changed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    Uuid::new_v4().to_string(),
                    identity_id.to_string(),
                    previous_eid,
                    new_eid,
                    reason,
                    mapping::stamp(now)
                ],
            )
            .await;

        if history_outcome.is_err() {
            let _ = database_connection.execute("ROLLBACK", ()).await;
            return Err(DbError::TransactionError);
        }

        database_connection
            .execute("COMMIT", ())
            .await
            .map_err(|_| DbError::TransactionError)?;

        info!("🏷️ [EID_REWRITTEN]: [{}] -> [{}] for identity {}.", previous_eid, new_eid, identity_id);
        Ok(())
    }

    /// Asigna estado e insignia de verificación.
    pub async fn assign_verification(
        &self,
        identity_id: Uuid,
        status: VerificationStatus,
        badge: Option<VerificationBadge>,
        now: DateTime<Utc>,
    ) -> Result<(), DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let affected = database_connection
            .execute(
                sql_registry::ASSIGN_VERIFICATION,
                params![
                    identity_id.to_string(),
                    status.as_str(),
                    badge.map(|b| b.as_str()),
                    mapping::stamp(now)
                ],
            )
            .await?;
        if affected == 0 {
            return Err(DbError::IdentityNotFound);
        }
        Ok(())
    }

    pub async fn fetch_profile(&self, identity_id: Uuid) -> Result<Option<Profile>, DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let mut rows = database_connection
            .query(
                "SELECT identity_id, display_name, given_name, family_name, biography,
                        avatar_url, birth_year, location, website_url,
                        display_name_visibility, email_visibility, phone_visibility,
                        birth_visibility, location_visibility, updated_at
                 FROM profiles WHERE identity_id = ?1",
                params![identity_id.to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(data_row) => Ok(Some(Self::map_row_to_profile(data_row)?)),
            None => Ok(None),
        }
    }

    pub async fn upsert_profile(&self, profile: &Profile) -> Result<(), DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        self.execute_profile_upsert(&database_connection, profile)
            .await
    }

    // --- ESTRATO DE MAPEO (PRIVATE SSoT) ---

    async fn execute_profile_upsert(
        &self,
        database_connection: &libsql::Connection,
        profile: &Profile,
    ) -> Result<(), DbError> {
        database_connection
            .execute(
                "INSERT INTO profiles (
                    identity_id, display_name, given_name, family_name, biography,
                    avatar_url, birth_year, location, website_url,
                    display_name_visibility, email_visibility, phone_visibility,
                    birth_visibility, location_visibility, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
                ON CONFLICT(identity_id) DO UPDATE SET
                    display_name = excluded.display_name,
                    given_name = excluded.given_name,
                    family_name = excluded.family_name,
                    biography = excluded.biography,
                    avatar_url = excluded.avatar_url,
                    birth_year = excluded.birth_year,
                    location = excluded.location,
                    website_url = excluded.website_url,
                    display_name_visibility = excluded.display_name_visibility,
                    email_visibility = excluded.email_visibility,
                    phone_visibility = excluded.phone_visibility,
                    birth_visibility = excluded.birth_visibility,
                    location_visibility = excluded.location_visibility,
                    updated_at = excluded.updated_at",
                params![
                    profile.identity_id.to_string(),
                    profile.display_name.clone(),
                    profile.given_name.clone(),
                    profile.family_name.clone(),
                    profile.biography.clone(),
                    profile.avatar_url.clone(),
                    profile.birth_year.map(|year| year as i64),
                    profile.location.clone(),
                    profile.website_url.clone(),
                    profile.display_name_visibility.as_str(),
                    profile.email_visibility.as_str(),
                    profile.phone_visibility.as_str(),
                    profile.birth_visibility.as_str(),
                    profile.location_visibility.as_str(),
                    mapping::stamp(profile.updated_at)
                ],
            )
            .await?;
        Ok(())
    }

    async fn fetch_by_column(&self, column: &str, value: &str) -> Result<Option<Identity>, DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        // La columna proviene de un conjunto cerrado interno; jamás de entrada externa.
        let query_statement = format!(
            "SELECT {} FROM identities WHERE {} = ?1",
            sql_registry::IDENTITY_COLUMNS,
            column
        );

        let mut rows = database_connection
            .query(query_statement.as_str(), params![value])
            .await?;

        match rows.next().await? {
            Some(data_row) => Ok(Some(Self::map_row_to_identity(data_row)?)),
            None => Ok(None),
        }
    }

    fn map_row_to_identity(data_row: Row) -> Result<Identity, DbError> {
        let status_raw: String = data_row.get(5)?;
        let status = IdentityStatus::parse(&status_raw)
            .ok_or_else(|| DbError::MappingError(format!("UNKNOWN_IDENTITY_STATUS: {}", status_raw)))?;

        let verification_raw: String = data_row.get(6)?;
        let verification_status = VerificationStatus::parse(&verification_raw).ok_or_else(|| {
            DbError::MappingError(format!("UNKNOWN_VERIFICATION_STATUS: {}", verification_raw))
        })?;

        let badge = data_row
            .get::<Option<String>>(7)
            .ok()
            .flatten()
            .and_then(|raw| VerificationBadge::parse(&raw));

        Ok(Identity {
            id: mapping::require_uuid(&data_row, 0, "identities.id")?,
            eid: data_row.get(1)?,
            email: data_row.get(2)?,
            phone_number: data_row.get::<Option<String>>(3).ok().flatten(),
            password_hash: data_row.get(4)?,
            status,
            verification_status,
            verification_badge: badge,
            reputation_score: data_row.get::<f64>(8)?,
            failed_login_attempts: data_row.get::<i64>(9)? as u32,
            locked_until: mapping::extract_datetime(&data_row, 10),
            last_login_at: mapping::extract_datetime(&data_row, 11),
            created_at: mapping::require_datetime(&data_row, 12, "identities.created_at")?,
            updated_at: mapping::require_datetime(&data_row, 13, "identities.updated_at")?,
            created_ip: data_row.get::<Option<String>>(14).ok().flatten(),
            created_user_agent: data_row.get::<Option<String>>(15).ok().flatten(),
        })
    }

    fn map_row_to_profile(data_row: Row) -> Result<Profile, DbError> {
        let extract_visibility = |index: i32, column: &str| -> Result<FieldVisibility, DbError> {
            let raw: String = data_row.get(index)?;
            FieldVisibility::parse(&raw)
                .ok_or_else(|| DbError::MappingError(format!("UNKNOWN_VISIBILITY: {}", column)))
        };

        Ok(Profile {
            identity_id: mapping::require_uuid(&data_row, 0, "profiles.identity_id")?,
            display_name: data_row.get::<Option<String>>(1).ok().flatten(),
            given_name: data_row.get::<Option<String>>(2).ok().flatten(),
            family_name: data_row.get::<Option<String>>(3).ok().flatten(),
            biography: data_row.get::<Option<String>>(4).ok().flatten(),
            avatar_url: data_row.get::<Option<String>>(5).ok().flatten(),
            birth_year: data_row.get::<Option<i64>>(6).ok().flatten().map(|y| y as i32),
            location: data_row.get::<Option<String>>(7).ok().flatten(),
            website_url: data_row.get::<Option<String>>(8).ok().flatten(),
            display_name_visibility: extract_visibility(9, "display_name_visibility")?,
            email_visibility: extract_visibility(10, "email_visibility")?,
            phone_visibility: extract_visibility(11, "phone_visibility")?,
            birth_visibility: extract_visibility(12, "birth_visibility")?,
            location_visibility: extract_visibility(13, "location_visibility")?,
            updated_at: mapping::require_datetime(&data_row, 14, "profiles.updated_at")?,
        })
    }
}

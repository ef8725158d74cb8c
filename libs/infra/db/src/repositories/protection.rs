// [libs/infra/db/src/repositories/protection.rs]
/*!
 * =================================================================
 * APARATO: PROTECTION REGISTRY REPOSITORY (V4.1 - UNION GUARD)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: REGISTRO CATEGORIZADO ANTI-SUPLANTACIÓN
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. FIXED DISPATCH: Las tablas categorizadas se recorren siempre en
 *    el orden de desempate de ProtectedCategory::DISPATCH_ORDER.
 * 2. UNION UNIQUENESS: La unicidad del handle canónico sobre la unión
 *    de tablas se verifica ANTES de cada inserción, dentro de una
 *    transacción inmediata.
 * 3. SNAPSHOT FEED: load_registry alimenta el motor difuso del
 *    Gobernador; el orden de carga preserva la precedencia.
 * =================================================================
 */

use crate::errors::DbError;
use crate::repositories::mapping;
use crate::TursoClient;
use chrono::{DateTime, Utc};
use entativa_domain_models::protected_entity::{ProtectedCategory, ProtectedEntity};
use libsql::{params, Row};
use tracing::{info, instrument};

/// Resuelve la tabla física de una categoría.
fn table_for(category: ProtectedCategory) -> &'static str {
    match category {
        ProtectedCategory::Celebrity => "protected_celebrities",
        ProtectedCategory::Government => "protected_government",
        ProtectedCategory::Business => "protected_business",
        ProtectedCategory::Brand => "protected_brands",
        ProtectedCategory::Academic => "protected_academic",
        ProtectedCategory::Media => "protected_media",
        ProtectedCategory::Sports => "protected_sports",
        ProtectedCategory::Community => "protected_community",
    }
}

const ENTITY_COLUMNS: &str =
    "id, canonical_handle, aliases_json, display_name, metadata_json, requires_verification, created_at";

/// Repositorio de autoridad única del registro de entidades protegidas
/// y de las reservas de sistema (reserved_handles).
pub struct ProtectionRepository {
    database_client: TursoClient,
}

impl ProtectionRepository {
    pub fn new(client: TursoClient) -> Self {
        Self {
            database_client: client,
        }
    }

    /// Consulta la tabla de reservas del sistema; retorna el motivo si existe.
    pub async fn reserved_reason(&self, normalized_handle: &str) -> Result<Option<String>, DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let mut rows = database_connection
            .query(
                "SELECT reason FROM reserved_handles WHERE handle = ?1",
                params![normalized_handle],
            )
            .await?;

        match rows.next().await? {
            Some(data_row) => Ok(Some(data_row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Inserta una reserva de sistema (idempotente por PK).
    pub async fn insert_reserved(
        &self,
        handle: &str,
        reason: &str,
        releasable: bool,
        now: DateTime<Utc>,
    ) -> Result<(), DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        database_connection
            .execute(
                "INSERT INTO reserved_handles (handle, reason, releasable, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(handle) DO NOTHING",
                params![handle, reason, releasable as i64, mapping::stamp(now)],
            )
            .await?;
        Ok(())
    }

    /**
     * Inserta una entidad protegida custodiando la unicidad de unión.
     *
     * # Errors:
     * - `DbError::DuplicateProtectedHandle` si el handle canónico ya
     *   existe en CUALQUIER tabla categorizada.
     */
    #[instrument(skip(self, entity), fields(handle = %entity.canonical_handle))]
    pub async fn insert_protected(&self, entity: &ProtectedEntity) -> Result<(), DbError> {
        let database_connection = self.database_client.acquire_connection()?;

        database_connection
            .execute("BEGIN IMMEDIATE", ())
            .await
            .map_err(|_| DbError::TransactionError)?;

        // Custodia de unión: el handle canónico no puede existir en ninguna categoría.
        for category in ProtectedCategory::DISPATCH_ORDER {
            let probe_statement = format!(
                "SELECT COUNT(*) FROM {} WHERE canonical_handle = ?1",
                table_for(category)
            );
            let probe = database_connection
                .query(probe_statement.as_str(), params![entity.canonical_handle.clone()])
                .await;

            let collision = match probe {
                Ok(mut rows) => match rows.next().await {
                    Ok(Some(row)) => row.get::<i64>(0).unwrap_or(0) > 0,
                    _ => false,
                },
                Err(_) => {
                    let _ = database_connection.execute("ROLLBACK", ()).await;
                    return Err(DbError::TransactionError);
                }
            };

            if collision {
                let _ = database_connection.execute("ROLLBACK", ()).await;
                return Err(DbError::DuplicateProtectedHandle);
            }
        }

        let aliases_payload = mapping::crystallize_string_vec(&entity.aliases)?;
        let insert_statement = format!(
            "INSERT INTO {} (id, canonical_handle, aliases_json, display_name, metadata_json, requires_verification, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            table_for(entity.category)
        );

        let insert_outcome = database_connection
            .execute(
                insert_statement.as_str(),
                params![
                    entity.id.to_string(),
                    entity.canonical_handle.clone(),
                    aliases_payload,
                    entity.display_name.clone(),
                    entity.metadata_json.clone(),
                    entity.requires_verification as i64,
                    mapping::stamp(entity.created_at)
                ],
            )
            .await;

        if let Err(insert_fault) = insert_outcome {
            let _ = database_connection.execute("ROLLBACK", ()).await;
            if DbError::is_unique_violation(&insert_fault) {
                return Err(DbError::DuplicateProtectedHandle);
            }
            return Err(DbError::QueryError(insert_fault));
        }

        database_connection
            .execute("COMMIT", ())
            .await
            .map_err(|_| DbError::TransactionError)?;

        info!(
            "🛡️ [REGISTRY_SYNC]: Protected entity [{}] crystallized under {}.",
            entity.canonical_handle,
            entity.category.as_str()
        );
        Ok(())
    }

    /// Coincidencia exacta sobre el handle canónico, en orden de precedencia.
    pub async fn fetch_exact_canonical(
        &self,
        normalized_handle: &str,
    ) -> Result<Option<ProtectedEntity>, DbError> {
        let database_connection = self.database_client.acquire_connection()?;

        for category in ProtectedCategory::DISPATCH_ORDER {
            let query_statement = format!(
                "SELECT {} FROM {} WHERE canonical_handle = ?1",
                ENTITY_COLUMNS,
                table_for(category)
            );
            let mut rows = database_connection
                .query(query_statement.as_str(), params![normalized_handle])
                .await?;

            if let Some(data_row) = rows.next().await? {
                return Ok(Some(Self::map_row_to_entity(data_row, category)?));
            }
        }
        Ok(None)
    }

    /**
     * Carga el registro completo en orden de precedencia de categorías.
     * Alimenta el snapshot read-mostly del motor difuso del Gobernador.
     */
    pub async fn load_registry(&self) -> Result<Vec<ProtectedEntity>, DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let mut registry_snapshot = Vec::new();

        for category in ProtectedCategory::DISPATCH_ORDER {
            let query_statement = format!(
                "SELECT {} FROM {} ORDER BY canonical_handle ASC",
                ENTITY_COLUMNS,
                table_for(category)
            );
            let mut rows = database_connection.query(query_statement.as_str(), ()).await?;

            while let Some(data_row) = rows.next().await? {
                registry_snapshot.push(Self::map_row_to_entity(data_row, category)?);
            }
        }

        Ok(registry_snapshot)
    }

    /// Población total del registro (idempotencia del seed).
    pub async fn count_entries(&self) -> Result<u64, DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let mut total: i64 = 0;

        for category in ProtectedCategory::DISPATCH_ORDER {
            let query_statement = format!("SELECT COUNT(*) FROM {}", table_for(category));
            let mut rows = database_connection.query(query_statement.as_str(), ()).await?;
            if let Some(row) = rows.next().await? {
                total += row.get::<i64>(0)?;
            }
        }
        Ok(total as u64)
    }

    // --- ESTRATO DE MAPEO (PRIVATE SSoT) ---

    fn map_row_to_entity(data_row: Row, category: ProtectedCategory) -> Result<ProtectedEntity, DbError> {
        Ok(ProtectedEntity {
            id: mapping::require_uuid(&data_row, 0, "protected.id")?,
            canonical_handle: data_row.get(1)?,
            aliases: mapping::extract_string_vec(&data_row, 2, "protected.aliases_json")?,
            category,
            display_name: data_row.get(3)?,
            metadata_json: data_row.get::<Option<String>>(4).ok().flatten(),
            requires_verification: mapping::extract_bool(&data_row, 5)?,
            created_at: mapping::require_datetime(&data_row, 6, "protected.created_at")?,
        })
    }
}

// [libs/infra/db/src/repositories/token/mod.rs]
/*!
 * =================================================================
 * APARATO: TOKEN VAULT REPOSITORY (V6.3 - REPLAY SHIELD SEALED)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: BÓVEDA DURABLE DE CREDENCIALES Y CÓDIGOS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. CAS CONSUMPTION: El consumo del código de autorización es un
 *    compare-and-swap de fila; el perdedor recibe una clasificación
 *    forense (Replayed/Expired/Missing) para el motor OAuth2.
 * 2. CASCADE RETURNS: Toda revocación masiva retorna (jti, kind,
 *    expires_at) para que el estrato superior alimente la blacklist
 *    efímera con TTLs exactos.
 * 3. HASH AT REST: La bóveda solo conoce digests; la fila es la
 *    autoridad ante cualquier desacuerdo con el caché.
 * =================================================================
 */

pub mod queries;

use crate::errors::DbError;
use crate::repositories::mapping;
use crate::repositories::token::queries as sql_registry;
use crate::TursoClient;
use chrono::{DateTime, Utc};
use entativa_domain_models::oauth_flow::{AuthorizationCode, CodeChallengeMethod};
use entativa_domain_models::token::{SecurityLevel, TokenKind, TokenRecord};
use libsql::{params, Row};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Resultado del intento de consumo de un código de autorización.
#[derive(Debug)]
pub enum ConsumeOutcome {
    /// Este canjeador ganó la carrera; el código queda sellado.
    Consumed(AuthorizationCode),
    /// El código ya fue consumido: replay detectado.
    Replayed(AuthorizationCode),
    /// El código existe pero su TTL venció sin consumo.
    Expired,
    /// El digest no figura en la bóveda.
    Missing,
}

/// Resumen de una credencial revocada en cascada (alimenta la blacklist).
#[derive(Debug, Clone)]
pub struct RevokedTokenSummary {
    pub id: Uuid,
    pub kind: TokenKind,
    pub expires_at: DateTime<Utc>,
}

pub struct TokenRepository {
    database_client: TursoClient,
}

impl TokenRepository {
    pub fn new(client: TursoClient) -> Self {
        Self {
            database_client: client,
        }
    }

    /**
     * Cristaliza una fila de credencial recién emitida.
     *
     * # Invariante:
     * `token_hash` es único; una colisión de digest es corrupción y
     * burbujea como fallo de consulta, jamás se silencia.
     */
    #[instrument(skip(self, record), fields(kind = record.kind.as_str()))]
    pub async fn insert_token(&self, record: &TokenRecord) -> Result<(), DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let scopes_payload = mapping::crystallize_string_vec(&record.scopes)?;

        database_connection
            .execute(
                "INSERT INTO tokens (
                    id, kind, token_hash, subject_id, client_id, session_id, auth_code_id,
                    scopes_json, issued_at, expires_at, last_used_at, usage_count,
                    is_revoked, revoked_at, revoked_by, revocation_reason,
                    device_fingerprint, security_level, risk_score, api_key_prefix
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, NULL, 0, 0, NULL, NULL, NULL, ?11, ?12, ?13, ?14)",
                params![
                    record.id.to_string(),
                    record.kind.as_str(),
                    record.token_hash.clone(),
                    record.subject_id.map(|id| id.to_string()),
                    record.client_id.clone(),
                    record.session_id.map(|id| id.to_string()),
                    record.auth_code_id.map(|id| id.to_string()),
                    scopes_payload,
                    mapping::stamp(record.issued_at),
                    mapping::stamp(record.expires_at),
                    record.device_fingerprint.clone(),
                    record.security_level.as_str(),
                    record.risk_score,
                    record.api_key_prefix.clone()
                ],
            )
            .await?;
        Ok(())
    }

    pub async fn fetch_by_id(&self, token_id: Uuid) -> Result<Option<TokenRecord>, DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let query_statement = format!(
            "SELECT {} FROM tokens WHERE id = ?1",
            sql_registry::TOKEN_COLUMNS
        );
        let mut rows = database_connection
            .query(query_statement.as_str(), params![token_id.to_string()])
            .await?;

        match rows.next().await? {
            Some(data_row) => Ok(Some(Self::map_row_to_token(data_row)?)),
            None => Ok(None),
        }
    }

    pub async fn fetch_by_hash(&self, token_hash: &str) -> Result<Option<TokenRecord>, DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let query_statement = format!(
            "SELECT {} FROM tokens WHERE token_hash = ?1",
            sql_registry::TOKEN_COLUMNS
        );
        let mut rows = database_connection
            .query(query_statement.as_str(), params![token_hash])
            .await?;

        match rows.next().await? {
            Some(data_row) => Ok(Some(Self::map_row_to_token(data_row)?)),
            None => Ok(None),
        }
    }

    /// Búsqueda por prefijo visible de API key.
    pub async fn fetch_by_api_key_prefix(
        &self,
        prefix: &str,
    ) -> Result<Vec<TokenRecord>, DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let query_statement = format!(
            "SELECT {} FROM tokens WHERE api_key_prefix = ?1 AND kind = 'api_key' AND is_revoked = 0",
            sql_registry::TOKEN_COLUMNS
        );
        let mut rows = database_connection
            .query(query_statement.as_str(), params![prefix])
            .await?;

        let mut records = Vec::new();
        while let Some(data_row) = rows.next().await? {
            records.push(Self::map_row_to_token(data_row)?);
        }
        Ok(records)
    }

    /// Sella el uso de la credencial (validación/introspección exitosa).
    pub async fn touch_usage(&self, token_id: Uuid, now: DateTime<Utc>) -> Result<(), DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        database_connection
            .execute(
                sql_registry::TOUCH_TOKEN_USAGE,
                params![token_id.to_string(), mapping::stamp(now)],
            )
            .await?;
        Ok(())
    }

    /// Revocación individual; retorna false si ya estaba revocada (idempotente).
    #[instrument(skip(self, reason))]
    pub async fn revoke(
        &self,
        token_id: Uuid,
        revoked_by: Option<Uuid>,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let affected = database_connection
            .execute(
                sql_registry::REVOKE_TOKEN,
                params![
                    token_id.to_string(),
                    mapping::stamp(now),
                    revoked_by.map(|id| id.to_string()),
                    reason
                ],
            )
            .await?;
        Ok(affected > 0)
    }

    /// Revocación en cascada de ambas credenciales de una sesión.
    pub async fn revoke_by_session(
        &self,
        session_id: Uuid,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<RevokedTokenSummary>, DbError> {
        self.collect_cascade(
            sql_registry::REVOKE_BY_SESSION,
            params![session_id.to_string(), mapping::stamp(now), reason],
        )
        .await
    }

    /**
     * Defensa anti-replay: incinera toda credencial emitida desde el
     * mismo código de autorización.
     */
    #[instrument(skip(self))]
    pub async fn revoke_by_auth_code(
        &self,
        auth_code_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<RevokedTokenSummary>, DbError> {
        let revoked = self
            .collect_cascade(
                sql_registry::REVOKE_BY_AUTH_CODE,
                params![auth_code_id.to_string(), mapping::stamp(now)],
            )
            .await?;

        if !revoked.is_empty() {
            warn!(
                "🚨 [REPLAY_SHIELD]: {} credentials incinerated for auth code {}.",
                revoked.len(),
                auth_code_id
            );
        }
        Ok(revoked)
    }

    /// Revocación total del sujeto (logout-all / respuesta a incidente).
    pub async fn revoke_all_for_identity(
        &self,
        identity_id: Uuid,
        revoked_by: Option<Uuid>,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<RevokedTokenSummary>, DbError> {
        self.collect_cascade(
            sql_registry::REVOKE_BY_SUBJECT,
            params![
                identity_id.to_string(),
                mapping::stamp(now),
                revoked_by.map(|id| id.to_string()),
                reason
            ],
        )
        .await
    }

    /// Consulta autoritativa de revocación (fallback cuando el caché calla).
    pub async fn is_revoked(&self, token_id: Uuid) -> Result<Option<bool>, DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let mut rows = database_connection
            .query(
                "SELECT is_revoked FROM tokens WHERE id = ?1",
                params![token_id.to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(data_row) => Ok(Some(data_row.get::<i64>(0)? != 0)),
            None => Ok(None),
        }
    }

    // --- BÓVEDA DE CÓDIGOS DE AUTORIZACIÓN ---

    /// Cristaliza un código recién emitido (solo digest).
    pub async fn insert_auth_code(&self, code: &AuthorizationCode) -> Result<(), DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let scopes_payload = mapping::crystallize_string_vec(&code.scopes)?;

        database_connection
            .execute(
                "INSERT INTO authorization_codes (
                    id, code_hash, client_id, identity_id, redirect_uri,
                    scopes_json, code_challenge, challenge_method, used, created_at, expires_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9, ?10)",
                params![
                    code.id.to_string(),
                    code.code_hash.clone(),
                    code.client_id.clone(),
                    code.identity_id.to_string(),
                    code.redirect_uri.clone(),
                    scopes_payload,
                    code.code_challenge.clone(),
                    code.challenge_method.map(|m| m.as_str()),
                    mapping::stamp(code.created_at),
                    mapping::stamp(code.expires_at)
                ],
            )
            .await?;
        Ok(())
    }

    /**
     * Consumo atómico del código (compare-and-swap used: 0 -> 1).
     *
     * # Logic:
     * 1. El UPDATE con guardia gana o pierde la carrera en una ráfaga.
     * 2. Ante 0 filas, un SELECT forense clasifica el fallo:
     *    usado -> Replayed (dispara cascada), vencido -> Expired,
     *    ausente -> Missing.
     */
    #[instrument(skip(self, code_hash))]
    pub async fn consume_auth_code(
        &self,
        code_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<ConsumeOutcome, DbError> {
        let database_connection = self.database_client.acquire_connection()?;

        let mut winner_rows = database_connection
            .query(
                sql_registry::CONSUME_AUTH_CODE,
                params![code_hash, mapping::stamp(now)],
            )
            .await?;

        if let Some(data_row) = winner_rows.next().await? {
            let code = Self::map_row_to_auth_code(data_row)?;
            info!("🎟️ [CODE_CONSUMED]: Authorization code {} sealed.", code.id);
            return Ok(ConsumeOutcome::Consumed(code));
        }

        // SELECT forense del perdedor.
        let query_statement = format!(
            "SELECT {} FROM authorization_codes WHERE code_hash = ?1",
            sql_registry::AUTH_CODE_COLUMNS
        );
        let mut forensic_rows = database_connection
            .query(query_statement.as_str(), params![code_hash])
            .await?;

        match forensic_rows.next().await? {
            Some(data_row) => {
                let code = Self::map_row_to_auth_code(data_row)?;
                if code.used {
                    warn!("🚨 [REPLAY_DETECTED]: Authorization code {} re-presented.", code.id);
                    Ok(ConsumeOutcome::Replayed(code))
                } else {
                    Ok(ConsumeOutcome::Expired)
                }
            }
            None => Ok(ConsumeOutcome::Missing),
        }
    }

    /// Purga códigos vencidos (daemon de higiene).
    pub async fn prune_expired_codes(&self, now: DateTime<Utc>) -> Result<u64, DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let affected = database_connection
            .execute(
                "DELETE FROM authorization_codes WHERE expires_at <= ?1",
                params![mapping::stamp(now)],
            )
            .await?;
        Ok(affected)
    }

    // --- ESTRATO DE MAPEO (PRIVATE SSoT) ---

    async fn collect_cascade(
        &self,
        statement: &str,
        parameters: impl libsql::params::IntoParams,
    ) -> Result<Vec<RevokedTokenSummary>, DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let mut rows = database_connection.query(statement, parameters).await?;

        let mut revoked = Vec::new();
        while let Some(data_row) = rows.next().await? {
            let kind_raw: String = data_row.get(1)?;
            let kind = TokenKind::parse(&kind_raw)
                .ok_or_else(|| DbError::MappingError(format!("UNKNOWN_TOKEN_KIND: {}", kind_raw)))?;
            revoked.push(RevokedTokenSummary {
                id: mapping::require_uuid(&data_row, 0, "tokens.id")?,
                kind,
                expires_at: mapping::require_datetime(&data_row, 2, "tokens.expires_at")?,
            });
        }
        Ok(revoked)
    }

    fn map_row_to_token(data_row: Row) -> Result<TokenRecord, DbError> {
        let kind_raw: String = data_row.get(1)?;
        let kind = TokenKind::parse(&kind_raw)
            .ok_or_else(|| DbError::MappingError(format!("UNKNOWN_TOKEN_KIND: {}", kind_raw)))?;

        let level_raw: String = data_row.get(17)?;
        let security_level = SecurityLevel::parse(&level_raw)
            .ok_or_else(|| DbError::MappingError(format!("UNKNOWN_SECURITY_LEVEL: {}", level_raw)))?;

        Ok(TokenRecord {
            id: mapping::require_uuid(&data_row, 0, "tokens.id")?,
            kind,
            token_hash: data_row.get(2)?,
            subject_id: mapping::extract_uuid(&data_row, 3),
            client_id: data_row.get::<Option<String>>(4).ok().flatten(),
            session_id: mapping::extract_uuid(&data_row, 5),
            auth_code_id: mapping::extract_uuid(&data_row, 6),
            scopes: mapping::extract_string_vec(&data_row, 7, "tokens.scopes_json")?,
            issued_at: mapping::require_datetime(&data_row, 8, "tokens.issued_at")?,
            expires_at: mapping::require_datetime(&data_row, 9, "tokens.expires_at")?,
            last_used_at: mapping::extract_datetime(&data_row, 10),
            usage_count: data_row.get::<i64>(11)? as u64,
            is_revoked: mapping::extract_bool(&data_row, 12)?,
            revoked_at: mapping::extract_datetime(&data_row, 13),
            revoked_by: mapping::extract_uuid(&data_row, 14),
            revocation_reason: data_row.get::<Option<String>>(15).ok().flatten(),
            device_fingerprint: data_row.get::<Option<String>>(16).ok().flatten(),
            security_level,
            risk_score: data_row.get::<f64>(18)?,
            api_key_prefix: data_row.get::<Option<String>>(19).ok().flatten(),
        })
    }

    fn map_row_to_auth_code(data_row: Row) -> Result<AuthorizationCode, DbError> {
        let method = data_row
            .get::<Option<String>>(7)
            .ok()
            .flatten()
            .and_then(|raw| CodeChallengeMethod::parse(&raw));

        Ok(AuthorizationCode {
            id: mapping::require_uuid(&data_row, 0, "authorization_codes.id")?,
            code_hash: data_row.get(1)?,
            client_id: data_row.get(2)?,
            identity_id: mapping::require_uuid(&data_row, 3, "authorization_codes.identity_id")?,
            redirect_uri: data_row.get(4)?,
            scopes: mapping::extract_string_vec(&data_row, 5, "authorization_codes.scopes_json")?,
            code_challenge: data_row.get::<Option<String>>(6).ok().flatten(),
            challenge_method: method,
            used: mapping::extract_bool(&data_row, 8)?,
            created_at: mapping::require_datetime(&data_row, 9, "authorization_codes.created_at")?,
            expires_at: mapping::require_datetime(&data_row, 10, "authorization_codes.expires_at")?,
        })
    }
}

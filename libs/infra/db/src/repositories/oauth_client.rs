// [libs/infra/db/src/repositories/oauth_client.rs]
/*!
 * =================================================================
 * APARATO: OAUTH CLIENT REPOSITORY (V2.2)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: PERSISTENCIA DEL REGISTRO DE CLIENTES FEDERADOS
 * =================================================================
 */

use crate::errors::DbError;
use crate::repositories::mapping;
use crate::TursoClient;
use entativa_domain_models::oauth_client::{ClientStatus, GrantKind, OAuthClient, PkcePolicy};
use libsql::{params, Row};
use tracing::{info, instrument};

const CLIENT_COLUMNS: &str = "client_id, client_secret_hash, client_name, redirect_uris_json, \
     allow_wildcard_redirects, allowed_scopes_json, allowed_grants_json, pkce_policy, \
     access_token_ttl_seconds, refresh_token_ttl_seconds, is_trusted, status, created_at";

pub struct OAuthClientRepository {
    database_client: TursoClient,
}

impl OAuthClientRepository {
    pub fn new(client: TursoClient) -> Self {
        Self {
            database_client: client,
        }
    }

    /// Registra o actualiza un cliente federado (protocolo upsert).
    #[instrument(skip(self, oauth_client), fields(client_id = %oauth_client.client_id))]
    pub async fn upsert_client(&self, oauth_client: &OAuthClient) -> Result<(), DbError> {
        let database_connection = self.database_client.acquire_connection()?;

        let redirect_payload = mapping::crystallize_string_vec(&oauth_client.redirect_uris)?;
        let scopes_payload = mapping::crystallize_string_vec(&oauth_client.allowed_scopes)?;
        let grants: Vec<String> = oauth_client
            .allowed_grants
            .iter()
            .map(|grant| grant.as_str().to_string())
            .collect();
        let grants_payload = mapping::crystallize_string_vec(&grants)?;

        database_connection
            .execute(
                "INSERT INTO oauth_clients (
                    client_id, client_secret_hash, client_name, redirect_uris_json,
                    allow_wildcard_redirects, allowed_scopes_json, allowed_grants_json,
                    pkce_policy, access_token_ttl_seconds, refresh_token_ttl_seconds,
                    is_trusted, status, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                ON CONFLICT(client_id) DO UPDATE SET
                    client_secret_hash = excluded.client_secret_hash,
                    client_name = excluded.client_name,
                    redirect_uris_json = excluded.redirect_uris_json,
                    allow_wildcard_redirects = excluded.allow_wildcard_redirects,
                    allowed_scopes_json = excluded.allowed_scopes_json,
                    allowed_grants_json = excluded.allowed_grants_json,
                    pkce_policy = excluded.pkce_policy,
                    access_token_ttl_seconds = excluded.access_token_ttl_seconds,
                    refresh_token_ttl_seconds = excluded.refresh_token_ttl_seconds,
                    is_trusted = excluded.is_trusted,
                    status = excluded.status",
                params![
                    oauth_client.client_id.clone(),
                    oauth_client.client_secret_hash.clone(),
                    oauth_client.client_name.clone(),
                    redirect_payload,
                    oauth_client.allow_wildcard_redirects as i64,
                    scopes_payload,
                    grants_payload,
                    oauth_client.pkce_policy.as_str(),
                    oauth_client.access_token_ttl_seconds.map(|v| v as i64),
                    oauth_client.refresh_token_ttl_seconds.map(|v| v as i64),
                    oauth_client.is_trusted as i64,
                    oauth_client.status.as_str(),
                    mapping::stamp(oauth_client.created_at)
                ],
            )
            .await?;

        info!("🤝 [CLIENT_REGISTRY]: Client [{}] crystallized.", oauth_client.client_id);
        Ok(())
    }

    pub async fn fetch(&self, client_id: &str) -> Result<Option<OAuthClient>, DbError> {
        let database_connection = self.database_client.acquire_connection()?;
        let query_statement = format!(
            "SELECT {} FROM oauth_clients WHERE client_id = ?1",
            CLIENT_COLUMNS
        );
        let mut rows = database_connection
            .query(query_statement.as_str(), params![client_id])
            .await?;

        match rows.next().await? {
            Some(data_row) => Ok(Some(Self::map_row_to_client(data_row)?)),
            None => Ok(None),
        }
    }

    // --- ESTRATO DE MAPEO (PRIVATE SSoT) ---

    fn map_row_to_client(data_row: Row) -> Result<OAuthClient, DbError> {
        let pkce_raw: String = data_row.get(7)?;
        let pkce_policy = PkcePolicy::parse(&pkce_raw)
            .ok_or_else(|| DbError::MappingError(format!("UNKNOWN_PKCE_POLICY: {}", pkce_raw)))?;

        let status_raw: String = data_row.get(11)?;
        let status = ClientStatus::parse(&status_raw)
            .ok_or_else(|| DbError::MappingError(format!("UNKNOWN_CLIENT_STATUS: {}", status_raw)))?;

        let grants_raw = mapping::extract_string_vec(&data_row, 6, "oauth_clients.allowed_grants_json")?;
        let allowed_grants = grants_raw
            .iter()
            .map(|raw| {
                GrantKind::parse(raw)
                    .ok_or_else(|| DbError::MappingError(format!("UNKNOWN_GRANT_KIND: {}", raw)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(OAuthClient {
            client_id: data_row.get(0)?,
            client_secret_hash: data_row.get::<Option<String>>(1).ok().flatten(),
            client_name: data_row.get(2)?,
            redirect_uris: mapping::extract_string_vec(&data_row, 3, "oauth_clients.redirect_uris_json")?,
            allow_wildcard_redirects: mapping::extract_bool(&data_row, 4)?,
            allowed_scopes: mapping::extract_string_vec(&data_row, 5, "oauth_clients.allowed_scopes_json")?,
            allowed_grants,
            pkce_policy,
            access_token_ttl_seconds: data_row.get::<Option<i64>>(8).ok().flatten().map(|v| v as u64),
            refresh_token_ttl_seconds: data_row.get::<Option<i64>>(9).ok().flatten().map(|v| v as u64),
            is_trusted: mapping::extract_bool(&data_row, 10)?,
            status,
            created_at: mapping::require_datetime(&data_row, 12, "oauth_clients.created_at")?,
        })
    }
}

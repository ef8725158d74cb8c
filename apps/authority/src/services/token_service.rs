// INICIO DEL ARCHIVO [apps/authority/src/services/token_service.rs]
/*!
 * =================================================================
 * APARATO: TOKEN LIFECYCLE SERVICE (V6.0 - CASCADE SEALED)
 * CLASIFICACIÓN: SECURITY STRATUM (ESTRATO L4)
 * RESPONSABILIDAD: EMISIÓN, VALIDACIÓN, ROTACIÓN Y REVOCACIÓN
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. TRIPLE LEDGER: Cada credencial existe como JWT (en tránsito),
 *    fila durable (autoridad) y proyección efímera (blacklist y
 *    sesión). Ante desacuerdo, la fila durable manda.
 * 2. BLACKLIST PHYSICS: validación -> caché blacklist; un caché
 *    inalcanzable degrada a la consulta durable autoritativa.
 * 3. ROTATION POLICIES: always / never / with-grace; la gracia
 *    tolera reintentos del cliente sobre el refresh recién rotado.
 * 4. REPLAY DEFENSE: El reuso de un refresh rotado incinera el
 *    refresh sucesor de la sesión (el access vigente sobrevive).
 * =================================================================
 */

use crate::config::RefreshRotationPolicy;
use crate::errors::AuthorityError;
use crate::state::AppState;
use crate::clock::Clock;
use crate::services::geolocation::GeoResolver;
use chrono::{DateTime, Duration, Utc};
use entativa_core_token_forge::claims::{
    AccessTokenClaims, RefreshTokenClaims, TOKEN_TYPE_ACCESS, TOKEN_TYPE_REFRESH,
};
use entativa_core_token_forge::{forge_api_key, sha256_digest_hex, ApiKeyMaterial};
use entativa_domain_models::identity::Identity;
use entativa_domain_models::session::Session;
use entativa_domain_models::token::{SecurityLevel, TokenKind, TokenRecord};
use entativa_infra_cache::keys;
use entativa_infra_cache::KeyValueStore;
use entativa_infra_db::repositories::token::RevokedTokenSummary;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Motivo de revocación sellado durante una rotación con gracia.
const ROTATION_GRACE_REASON: &str = "rotation_grace";

/// Paquete emitido al crear o rotar una sesión.
#[derive(Debug, Clone)]
pub struct SessionTokenBundle {
    pub session: Session,
    pub access_token: String,
    pub refresh_token: String,
    pub access_jti: Uuid,
    pub refresh_jti: Uuid,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
    pub granted_scopes: Vec<String>,
}

/// Servicio de autoridad única del ciclo de vida de credenciales.
pub struct TokenService {
    application_state: AppState,
}

impl TokenService {
    pub fn new(application_state: AppState) -> Self {
        Self { application_state }
    }

    // --- EMISIÓN DE PARES DE SESIÓN ---

    /**
     * Emite el par access+refresh y cristaliza sesión y bóveda.
     *
     * # Logic:
     * 1. Tope de sesiones: al alcanzarlo se expulsa la más antigua
     *    (con su cascada de revocación).
     * 2. Acuña ambos JWT con el kid vigente; jti = id de fila.
     * 3. Cristaliza las filas de token, la fila de sesión y la
     *    proyección efímera session:{id} (TTL = vida del access).
     */
    #[instrument(skip(self, identity, scopes), fields(identity = %identity.id))]
    pub async fn issue_session_bundle(
        &self,
        identity: &Identity,
        client_id: Option<String>,
        scopes: Vec<String>,
        auth_code_id: Option<Uuid>,
        user_agent: Option<String>,
        ip_address: Option<String>,
        security_level: SecurityLevel,
    ) -> Result<SessionTokenBundle, AuthorityError> {
        let now = self.application_state.clock.now();

        // 1. TOPE DE SESIONES (expulsión oldest-first)
        let active_sessions = self
            .application_state
            .session_repository
            .list_active_for_identity(identity.id, now)
            .await?;

        if active_sessions.len() >= self.application_state.config.max_sessions_per_identity {
            if let Some(oldest) = active_sessions.first() {
                warn!(
                    "♻️ [SESSION_CAP]: Identity {} at capacity; evicting session {}.",
                    identity.id, oldest.id
                );
                self.revoke_session(oldest.id, None, "session_cap_eviction")
                    .await?;
            }
        }

        // 2. COORDENADAS DEL PAR
        let session_id = Uuid::new_v4();
        let access_jti = Uuid::new_v4();
        let refresh_jti = Uuid::new_v4();

        let access_ttl = self.resolve_access_ttl(&client_id).await;
        let refresh_ttl = self.resolve_refresh_ttl(&client_id).await;
        let access_expires_at = now + access_ttl;
        let refresh_expires_at = now + refresh_ttl;

        let scope_string = if scopes.is_empty() {
            None
        } else {
            Some(scopes.join(" "))
        };

        // 3. ACUÑACIÓN
        let access_claims = AccessTokenClaims {
            iss: self.application_state.config.issuer.clone(),
            sub: identity.id.to_string(),
            aud: self.application_state.config.audience.clone(),
            exp: access_expires_at.timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            jti: access_jti,
            eid: Some(identity.eid.clone()),
            email: Some(identity.email.clone()),
            verified: identity.verification_badge.is_some(),
            status: identity.status.as_str().to_string(),
            verification_status: identity.verification_status.as_str().to_string(),
            verification_badge: identity.verification_badge.map(|b| b.as_str().to_string()),
            reputation_score: identity.reputation_score,
            session_id: Some(session_id),
            client_id: client_id.clone(),
            scope: scope_string.clone(),
            token_type: TOKEN_TYPE_ACCESS.to_string(),
        };

        let refresh_claims = RefreshTokenClaims {
            iss: self.application_state.config.issuer.clone(),
            sub: identity.id.to_string(),
            aud: self.application_state.config.audience.clone(),
            exp: refresh_expires_at.timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            jti: refresh_jti,
            session_id,
            client_id: client_id.clone(),
            scope: scope_string,
            token_type: TOKEN_TYPE_REFRESH.to_string(),
        };

        let access_token = self.application_state.token_forge.sign_access(&access_claims)?;
        let refresh_token = self
            .application_state
            .token_forge
            .sign_refresh(&refresh_claims)?;

        // 4. CRISTALIZACIÓN EN LA BÓVEDA DURABLE
        let access_record = TokenRecord {
            id: access_jti,
            kind: TokenKind::Access,
            token_hash: sha256_digest_hex(&access_token),
            subject_id: Some(identity.id),
            client_id: client_id.clone(),
            session_id: Some(session_id),
            auth_code_id,
            scopes: scopes.clone(),
            issued_at: now,
            expires_at: access_expires_at,
            last_used_at: None,
            usage_count: 0,
            is_revoked: false,
            revoked_at: None,
            revoked_by: None,
            revocation_reason: None,
            device_fingerprint: user_agent.clone(),
            security_level,
            risk_score: 0.0,
            api_key_prefix: None,
        };

        let refresh_record = TokenRecord {
            id: refresh_jti,
            kind: TokenKind::Refresh,
            token_hash: sha256_digest_hex(&refresh_token),
            expires_at: refresh_expires_at,
            ..access_record.clone()
        };

        self.application_state
            .token_repository
            .insert_token(&access_record)
            .await?;
        self.application_state
            .token_repository
            .insert_token(&refresh_record)
            .await?;

        // 5. FILA DE SESIÓN + PROYECCIÓN EFÍMERA
        let geolocation = self
            .application_state
            .geo_resolver
            .resolve(ip_address.as_deref());

        let session = Session {
            id: session_id,
            identity_id: identity.id,
            user_agent,
            ip_address,
            geolocation,
            access_token_id: access_jti,
            refresh_token_id: refresh_jti,
            created_at: now,
            expires_at: refresh_expires_at,
            revoked_at: None,
        };

        self.application_state
            .session_repository
            .insert(&session)
            .await?;

        if let Ok(projection) = serde_json::to_string(&session) {
            let _ = self
                .application_state
                .cache
                .put(&keys::session(session_id), &projection, Some(access_ttl))
                .await;
        }

        info!(
            "🎫 [TOKEN_ISSUE]: Session {} minted for identity {} (access {}).",
            session_id, identity.id, access_jti
        );

        Ok(SessionTokenBundle {
            session,
            access_token,
            refresh_token,
            access_jti,
            refresh_jti,
            access_expires_at,
            refresh_expires_at,
            granted_scopes: scopes,
        })
    }

    /// Access token máquina-a-máquina (client_credentials): sin sesión.
    #[instrument(skip(self, scopes))]
    pub async fn issue_client_access(
        &self,
        client_id: &str,
        scopes: Vec<String>,
    ) -> Result<(String, Uuid, DateTime<Utc>), AuthorityError> {
        let now = self.application_state.clock.now();
        let jti = Uuid::new_v4();
        let ttl = self.resolve_access_ttl(&Some(client_id.to_string())).await;
        let expires_at = now + ttl;

        let claims = AccessTokenClaims {
            iss: self.application_state.config.issuer.clone(),
            sub: client_id.to_string(),
            aud: self.application_state.config.audience.clone(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            jti,
            eid: None,
            email: None,
            verified: false,
            status: "active".to_string(),
            verification_status: "unverified".to_string(),
            verification_badge: None,
            reputation_score: 0.0,
            session_id: None,
            client_id: Some(client_id.to_string()),
            scope: (!scopes.is_empty()).then(|| scopes.join(" ")),
            token_type: TOKEN_TYPE_ACCESS.to_string(),
        };

        let token = self.application_state.token_forge.sign_access(&claims)?;

        let record = TokenRecord {
            id: jti,
            kind: TokenKind::Access,
            token_hash: sha256_digest_hex(&token),
            subject_id: None,
            client_id: Some(client_id.to_string()),
            session_id: None,
            auth_code_id: None,
            scopes,
            issued_at: now,
            expires_at,
            last_used_at: None,
            usage_count: 0,
            is_revoked: false,
            revoked_at: None,
            revoked_by: None,
            revocation_reason: None,
            device_fingerprint: None,
            security_level: SecurityLevel::Machine,
            risk_score: 0.0,
            api_key_prefix: None,
        };
        self.application_state
            .token_repository
            .insert_token(&record)
            .await?;

        Ok((token, jti, expires_at))
    }

    // --- VALIDACIÓN ---

    /**
     * Valida un access token de extremo a extremo.
     *
     * # Logic:
     * 1. Firma/iss/aud/exp/nbf/token_type vía la forja.
     * 2. Blacklist efímera por jti; un caché inalcanzable degrada a
     *    la fila durable (autoritativa).
     * 3. Sella el uso en la bóveda.
     */
    #[instrument(skip(self, jwt_compact))]
    pub async fn validate_access_token(
        &self,
        jwt_compact: &str,
    ) -> Result<AccessTokenClaims, AuthorityError> {
        let claims = self.application_state.token_forge.validate_access(jwt_compact)?;
        self.assert_not_blacklisted(claims.jti).await?;

        let _ = self
            .application_state
            .token_repository
            .touch_usage(claims.jti, self.application_state.clock.now())
            .await;

        Ok(claims)
    }

    /// Validación de refresh con compuerta de blacklist (sin rotación).
    pub async fn validate_refresh_token(
        &self,
        jwt_compact: &str,
    ) -> Result<RefreshTokenClaims, AuthorityError> {
        let claims = self.application_state.token_forge.validate_refresh(jwt_compact)?;
        self.assert_not_blacklisted(claims.jti).await?;
        Ok(claims)
    }

    // --- ROTACIÓN DE REFRESH ---

    /**
     * Rotación contractual del refresh token.
     *
     * # Logic:
     * 1. La fila durable del refresh decide su destino:
     *    - activa -> rotación nominal según política;
     *    - revocada por gracia y dentro de la ventana -> reintento tolerado (rota de nuevo);
     *    - revocada/expirada -> replay: incinera el refresh sucesor de la sesión y reporta invalid_grant.
     * 2. always: revoca+blacklistea el refresh anterior; with-grace:
     *    lo revoca con motivo de gracia y SIN blacklist inmediata;
     *    never: reusa el mismo refresh y solo acuña access.
     */
    #[instrument(skip(self, refresh_claims, identity))]
    pub async fn rotate_refresh(
        &self,
        refresh_claims: &RefreshTokenClaims,
        identity: &Identity,
        granted_scopes: Vec<String>,
    ) -> Result<SessionTokenBundle, AuthorityError> {
        let now = self.application_state.clock.now();

        let presented_record = self
            .application_state
            .token_repository
            .fetch_by_id(refresh_claims.jti)
            .await?
            .ok_or_else(|| AuthorityError::InvalidGrant("UNKNOWN_REFRESH_TOKEN".to_string()))?;

        if presented_record.is_revoked {
            let within_grace = presented_record.revocation_reason.as_deref()
                == Some(ROTATION_GRACE_REASON)
                && presented_record
                    .revoked_at
                    .map(|revoked_at| {
                        now <= revoked_at + self.application_state.config.refresh_rotation_grace()
                    })
                    .unwrap_or(false);

            if !within_grace {
                self.execute_refresh_replay_defense(refresh_claims, now).await;
                return Err(AuthorityError::InvalidGrant(
                    "REFRESH_TOKEN_REPLAYED".to_string(),
                ));
            }
            // Reintento tolerado dentro de la gracia: continúa la rotación.
        } else if presented_record.is_expired_at(now) {
            return Err(AuthorityError::InvalidGrant("REFRESH_TOKEN_EXPIRED".to_string()));
        }

        let session = self
            .application_state
            .session_repository
            .fetch(refresh_claims.session_id)
            .await?
            .filter(|session| session.is_active_at(now))
            .ok_or_else(|| AuthorityError::InvalidGrant("SESSION_NOT_ACTIVE".to_string()))?;

        // --- POLÍTICA NEVER: solo un access nuevo ---
        if self.application_state.config.refresh_rotation == RefreshRotationPolicy::Never {
            return self
                .mint_access_for_session(identity, &session, refresh_claims, granted_scopes, now)
                .await;
        }

        // --- POLÍTICAS ALWAYS / WITH-GRACE: par completo nuevo ---
        let bundle = self
            .mint_rotated_pair(identity, &session, refresh_claims, granted_scopes, now)
            .await?;

        match self.application_state.config.refresh_rotation {
            RefreshRotationPolicy::Always => {
                let revoke_outcome = self
                    .application_state
                    .token_repository
                    .revoke(refresh_claims.jti, None, "rotated", now)
                    .await;

                if let Err(revoke_fault) = revoke_outcome {
                    // Reversión de atomicidad: si el sello del refresh
                    // anterior colapsa, el par recién emitido se incinera
                    // para que jamás convivan dos refresh válidos.
                    let _ = self
                        .application_state
                        .token_repository
                        .revoke(bundle.refresh_jti, None, "rotation_reverted", now)
                        .await;
                    let _ = self
                        .application_state
                        .token_repository
                        .revoke(bundle.access_jti, None, "rotation_reverted", now)
                        .await;
                    self.blacklist_until(bundle.refresh_jti, bundle.refresh_expires_at)
                        .await;
                    self.blacklist_until(bundle.access_jti, bundle.access_expires_at)
                        .await;
                    return Err(AuthorityError::from(revoke_fault));
                }

                self.blacklist_until(refresh_claims.jti, presented_record.expires_at)
                    .await;
            }
            RefreshRotationPolicy::WithGrace => {
                if !presented_record.is_revoked {
                    self.application_state
                        .token_repository
                        .revoke(refresh_claims.jti, None, ROTATION_GRACE_REASON, now)
                        .await?;
                }
            }
            RefreshRotationPolicy::Never => unreachable!("handled above"),
        }

        Ok(bundle)
    }

    // --- REVOCACIÓN ---

    /**
     * Revoca una sesión completa: ambas credenciales a la blacklist
     * (TTL = vida restante del refresh), filas selladas y proyección
     * efímera purgada.
     */
    #[instrument(skip(self, reason))]
    pub async fn revoke_session(
        &self,
        session_id: Uuid,
        actor_id: Option<Uuid>,
        reason: &str,
    ) -> Result<Vec<RevokedTokenSummary>, AuthorityError> {
        let now = self.application_state.clock.now();

        let revoked = self
            .application_state
            .token_repository
            .revoke_by_session(session_id, reason, now)
            .await?;

        // La blacklist vive lo que viviría la credencial más longeva.
        for summary in &revoked {
            self.blacklist_until(summary.id, summary.expires_at).await;
        }

        self.application_state
            .session_repository
            .mark_revoked(session_id, now)
            .await?;
        let _ = self
            .application_state
            .cache
            .delete(&keys::session(session_id))
            .await;

        let _ = actor_id; // El actor queda sellado en las filas vía revoke_all.
        info!(
            "🧯 [SESSION_REVOKED]: Session {} incinerated ({} credentials).",
            session_id,
            revoked.len()
        );
        Ok(revoked)
    }

    /// Revocación total de una identidad (logout-all / incidente).
    #[instrument(skip(self, reason))]
    pub async fn revoke_all_for_identity(
        &self,
        identity_id: Uuid,
        actor_id: Option<Uuid>,
        reason: &str,
    ) -> Result<usize, AuthorityError> {
        let now = self.application_state.clock.now();

        let revoked_sessions = self
            .application_state
            .session_repository
            .revoke_all_for_identity(identity_id, now)
            .await?;
        for session_id in &revoked_sessions {
            let _ = self
                .application_state
                .cache
                .delete(&keys::session(*session_id))
                .await;
        }

        let revoked_tokens = self
            .application_state
            .token_repository
            .revoke_all_for_identity(identity_id, actor_id, reason, now)
            .await?;
        for summary in &revoked_tokens {
            self.blacklist_until(summary.id, summary.expires_at).await;
        }

        info!(
            "🧯 [IDENTITY_PURGE]: {} sessions and {} credentials incinerated for {}.",
            revoked_sessions.len(),
            revoked_tokens.len(),
            identity_id
        );
        Ok(revoked_tokens.len())
    }

    /// Revocación individual por jti (RFC 7009); idempotente.
    pub async fn revoke_single(
        &self,
        jti: Uuid,
        actor_id: Option<Uuid>,
        reason: &str,
    ) -> Result<(), AuthorityError> {
        let now = self.application_state.clock.now();

        if let Some(record) = self.application_state.token_repository.fetch_by_id(jti).await? {
            self.application_state
                .token_repository
                .revoke(jti, actor_id, reason, now)
                .await?;
            self.blacklist_until(jti, record.expires_at).await;
        }
        // Un jti desconocido también reporta éxito (RFC 7009).
        Ok(())
    }

    // --- API KEYS ---

    /// Acuña una API key para un principal de servicio.
    #[instrument(skip(self, scopes))]
    pub async fn issue_api_key(
        &self,
        client_id: &str,
        scopes: Vec<String>,
        lifetime: Duration,
    ) -> Result<ApiKeyMaterial, AuthorityError> {
        let now = self.application_state.clock.now();
        let material = forge_api_key();

        let record = TokenRecord {
            id: Uuid::new_v4(),
            kind: TokenKind::ApiKey,
            token_hash: material.digest_hex.clone(),
            subject_id: None,
            client_id: Some(client_id.to_string()),
            session_id: None,
            auth_code_id: None,
            scopes,
            issued_at: now,
            expires_at: now + lifetime,
            last_used_at: None,
            usage_count: 0,
            is_revoked: false,
            revoked_at: None,
            revoked_by: None,
            revocation_reason: None,
            device_fingerprint: None,
            security_level: SecurityLevel::Machine,
            risk_score: 0.0,
            api_key_prefix: Some(material.prefix.clone()),
        };
        self.application_state
            .token_repository
            .insert_token(&record)
            .await?;

        Ok(material)
    }

    /// Verifica una API key presentada; sella el uso.
    pub async fn verify_api_key(&self, presented_key: &str) -> Result<TokenRecord, AuthorityError> {
        let now = self.application_state.clock.now();
        let digest = sha256_digest_hex(presented_key);

        let record = self
            .application_state
            .token_repository
            .fetch_by_hash(&digest)
            .await?
            .filter(|record| record.kind == TokenKind::ApiKey)
            .ok_or(AuthorityError::InvalidCredentials)?;

        if !record.is_active_at(now) {
            return Err(AuthorityError::TokenRejected("API_KEY_INACTIVE".to_string()));
        }

        let _ = self
            .application_state
            .token_repository
            .touch_usage(record.id, now)
            .await;
        Ok(record)
    }

    // --- FÍSICA INTERNA ---

    /// Compuerta de blacklist: caché primero, bóveda como autoridad.
    async fn assert_not_blacklisted(&self, jti: Uuid) -> Result<(), AuthorityError> {
        match self
            .application_state
            .cache
            .get(&keys::token_blacklist(jti))
            .await
        {
            Ok(Some(_)) => Err(AuthorityError::TokenRejected("TOKEN_BLACKLISTED".to_string())),
            Ok(None) => Ok(()),
            Err(cache_fault) => {
                warn!(
                    "⚠️ [BLACKLIST_DEGRADED]: Ephemeral stratum unreachable ({}); consulting vault.",
                    cache_fault
                );
                match self
                    .application_state
                    .token_repository
                    .is_revoked(jti)
                    .await?
                {
                    Some(true) => {
                        Err(AuthorityError::TokenRejected("TOKEN_REVOKED".to_string()))
                    }
                    _ => Ok(()),
                }
            }
        }
    }

    /// Marca un jti en la blacklist con TTL = vida restante.
    async fn blacklist_until(&self, jti: Uuid, expires_at: DateTime<Utc>) {
        let now = self.application_state.clock.now();
        let remaining = expires_at - now;
        if remaining <= Duration::zero() {
            return;
        }
        let _ = self
            .application_state
            .cache
            .put(&keys::token_blacklist(jti), "revoked", Some(remaining))
            .await;
    }

    /// Defensa anti-replay del refresh: incinera el sucesor vigente.
    async fn execute_refresh_replay_defense(
        &self,
        refresh_claims: &RefreshTokenClaims,
        now: DateTime<Utc>,
    ) {
        warn!(
            "🚨 [REFRESH_REPLAY]: Rotated refresh {} re-presented; incinerating successor.",
            refresh_claims.jti
        );

        if let Ok(Some(session)) = self
            .application_state
            .session_repository
            .fetch(refresh_claims.session_id)
            .await
        {
            // Solo el refresh sucesor cae; el access vigente sobrevive.
            if session.refresh_token_id != refresh_claims.jti {
                if let Ok(Some(successor)) = self
                    .application_state
                    .token_repository
                    .fetch_by_id(session.refresh_token_id)
                    .await
                {
                    let _ = self
                        .application_state
                        .token_repository
                        .revoke(successor.id, None, "refresh_replay_defense", now)
                        .await;
                    self.blacklist_until(successor.id, successor.expires_at).await;
                }
            }
        }
    }

    async fn mint_rotated_pair(
        &self,
        identity: &Identity,
        session: &Session,
        refresh_claims: &RefreshTokenClaims,
        granted_scopes: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<SessionTokenBundle, AuthorityError> {
        let access_jti = Uuid::new_v4();
        let new_refresh_jti = Uuid::new_v4();

        let access_ttl = self.resolve_access_ttl(&refresh_claims.client_id).await;
        let refresh_ttl = self.resolve_refresh_ttl(&refresh_claims.client_id).await;
        let access_expires_at = now + access_ttl;
        let refresh_expires_at = now + refresh_ttl;

        let scope_string = (!granted_scopes.is_empty()).then(|| granted_scopes.join(" "));

        let access_claims = AccessTokenClaims {
            iss: self.application_state.config.issuer.clone(),
            sub: identity.id.to_string(),
            aud: self.application_state.config.audience.clone(),
            exp: access_expires_at.timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            jti: access_jti,
            eid: Some(identity.eid.clone()),
            email: Some(identity.email.clone()),
            verified: identity.verification_badge.is_some(),
            status: identity.status.as_str().to_string(),
            verification_status: identity.verification_status.as_str().to_string(),
            verification_badge: identity.verification_badge.map(|b| b.as_str().to_string()),
            reputation_score: identity.reputation_score,
            session_id: Some(session.id),
            client_id: refresh_claims.client_id.clone(),
            scope: scope_string.clone(),
            token_type: TOKEN_TYPE_ACCESS.to_string(),
        };

        let new_refresh_claims = RefreshTokenClaims {
            iss: self.application_state.config.issuer.clone(),
            sub: identity.id.to_string(),
            aud: self.application_state.config.audience.clone(),
            exp: refresh_expires_at.timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            jti: new_refresh_jti,
            session_id: session.id,
            client_id: refresh_claims.client_id.clone(),
            scope: scope_string,
            token_type: TOKEN_TYPE_REFRESH.to_string(),
        };

        let access_token = self.application_state.token_forge.sign_access(&access_claims)?;
        let refresh_token = self
            .application_state
            .token_forge
            .sign_refresh(&new_refresh_claims)?;

        let access_record = TokenRecord {
            id: access_jti,
            kind: TokenKind::Access,
            token_hash: sha256_digest_hex(&access_token),
            subject_id: Some(identity.id),
            client_id: refresh_claims.client_id.clone(),
            session_id: Some(session.id),
            auth_code_id: None,
            scopes: granted_scopes.clone(),
            issued_at: now,
            expires_at: access_expires_at,
            last_used_at: None,
            usage_count: 0,
            is_revoked: false,
            revoked_at: None,
            revoked_by: None,
            revocation_reason: None,
            device_fingerprint: session.user_agent.clone(),
            security_level: SecurityLevel::Standard,
            risk_score: 0.0,
            api_key_prefix: None,
        };
        let refresh_record = TokenRecord {
            id: new_refresh_jti,
            kind: TokenKind::Refresh,
            token_hash: sha256_digest_hex(&refresh_token),
            expires_at: refresh_expires_at,
            ..access_record.clone()
        };

        // Atomicidad de rotación: si el alta del sucesor colapsa, el
        // refresh anterior permanece intacto (nada se revocó aún).
        self.application_state
            .token_repository
            .insert_token(&access_record)
            .await?;
        self.application_state
            .token_repository
            .insert_token(&refresh_record)
            .await?;

        self.application_state
            .session_repository
            .rebind_tokens(session.id, access_jti, new_refresh_jti, refresh_expires_at)
            .await?;

        let rebound_session = Session {
            access_token_id: access_jti,
            refresh_token_id: new_refresh_jti,
            expires_at: refresh_expires_at,
            ..session.clone()
        };
        if let Ok(projection) = serde_json::to_string(&rebound_session) {
            let _ = self
                .application_state
                .cache
                .put(&keys::session(session.id), &projection, Some(access_ttl))
                .await;
        }

        Ok(SessionTokenBundle {
            session: rebound_session,
            access_token,
            refresh_token,
            access_jti,
            refresh_jti: new_refresh_jti,
            access_expires_at,
            refresh_expires_at,
            granted_scopes,
        })
    }

    /// Política never: acuña solo un access nuevo sobre el refresh vivo.
    async fn mint_access_for_session(
        &self,
        identity: &Identity,
        session: &Session,
        refresh_claims: &RefreshTokenClaims,
        granted_scopes: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<SessionTokenBundle, AuthorityError> {
        let access_jti = Uuid::new_v4();
        let access_ttl = self.resolve_access_ttl(&refresh_claims.client_id).await;
        let access_expires_at = now + access_ttl;
        let scope_string = (!granted_scopes.is_empty()).then(|| granted_scopes.join(" "));

        let access_claims = AccessTokenClaims {
            iss: self.application_state.config.issuer.clone(),
            sub: identity.id.to_string(),
            aud: self.application_state.config.audience.clone(),
            exp: access_expires_at.timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            jti: access_jti,
            eid: Some(identity.eid.clone()),
            email: Some(identity.email.clone()),
            verified: identity.verification_badge.is_some(),
            status: identity.status.as_str().to_string(),
            verification_status: identity.verification_status.as_str().to_string(),
            verification_badge: identity.verification_badge.map(|b| b.as_str().to_string()),
            reputation_score: identity.reputation_score,
            session_id: Some(session.id),
            client_id: refresh_claims.client_id.clone(),
            scope: scope_string,
            token_type: TOKEN_TYPE_ACCESS.to_string(),
        };

        let access_token = self.application_state.token_forge.sign_access(&access_claims)?;

        let access_record = TokenRecord {
            id: access_jti,
            kind: TokenKind::Access,
            token_hash: sha256_digest_hex(&access_token),
            subject_id: Some(identity.id),
            client_id: refresh_claims.client_id.clone(),
            session_id: Some(session.id),
            auth_code_id: None,
            scopes: granted_scopes.clone(),
            issued_at: now,
            expires_at: access_expires_at,
            last_used_at: None,
            usage_count: 0,
            is_revoked: false,
            revoked_at: None,
            revoked_by: None,
            revocation_reason: None,
            device_fingerprint: session.user_agent.clone(),
            security_level: SecurityLevel::Standard,
            risk_score: 0.0,
            api_key_prefix: None,
        };
        self.application_state
            .token_repository
            .insert_token(&access_record)
            .await?;

        self.application_state
            .session_repository
            .rebind_tokens(
                session.id,
                access_jti,
                refresh_claims.jti,
                session.expires_at,
            )
            .await?;

        Ok(SessionTokenBundle {
            session: session.clone(),
            access_token,
            refresh_token: String::new(),
            access_jti,
            refresh_jti: refresh_claims.jti,
            access_expires_at,
            refresh_expires_at: session.expires_at,
            granted_scopes,
        })
    }

    async fn resolve_access_ttl(&self, client_id: &Option<String>) -> Duration {
        if let Some(client_id) = client_id {
            if let Ok(Some(client)) = self
                .application_state
                .oauth_client_repository
                .fetch(client_id)
                .await
            {
                if let Some(ttl_override) = client.access_token_ttl_seconds {
                    return Duration::seconds(ttl_override as i64);
                }
            }
        }
        self.application_state.config.access_token_ttl()
    }

    async fn resolve_refresh_ttl(&self, client_id: &Option<String>) -> Duration {
        if let Some(client_id) = client_id {
            if let Ok(Some(client)) = self
                .application_state
                .oauth_client_repository
                .fetch(client_id)
                .await
            {
                if let Some(ttl_override) = client.refresh_token_ttl_seconds {
                    return Duration::seconds(ttl_override as i64);
                }
            }
        }
        self.application_state.config.refresh_token_ttl()
    }
}
// FIN DEL ARCHIVO [apps/authority/src/services/token_service.rs]

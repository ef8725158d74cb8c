// INICIO DEL ARCHIVO [apps/authority/src/services/oauth_engine/token_grant.rs]
/*!
 * =================================================================
 * APARATO: TOKEN GRANT DISPATCHER (V6.1 - REPLAY SHIELD)
 * CLASIFICACIÓN: PROTOCOL STRATUM (ESTRATO L4)
 * RESPONSABILIDAD: LOS TRES GRANTS DEL ENDPOINT TOKEN
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. CLIENT AUTH LATTICE: Confidencial DEBE presentar secreto
 *    (bcrypt); público NO DEBE presentarlo. Toda divergencia es
 *    invalid_client.
 * 2. CAS EXCHANGE: El canje del código es un compare-and-swap; el
 *    replay dispara la cascada de revocación por auth_code_id y se
 *    audita como incidente.
 * 3. SCOPE NARROWING: El refresh admite subconjunto del scope
 *    original; el ensanchamiento es invalid_scope.
 * =================================================================
 */

use super::{OAuth2Engine, TokenGrantRequest, TokenGrantResponse};
use crate::errors::AuthorityError;
use crate::services::audit_recorder::AuditRecorder;
use crate::services::token_service::TokenService;
use crate::clock::Clock;
use crate::support::{parse_scopes, scopes_are_subset};
use base64::engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL;
use base64::Engine;
use entativa_domain_models::audit::{AuditAction, AuditEvent, LawfulBasis};
use entativa_domain_models::oauth_client::{ClientStatus, GrantKind, OAuthClient};
use entativa_domain_models::oauth_flow::{AuthorizationCode, CodeChallengeMethod};
use entativa_domain_models::token::SecurityLevel;
use entativa_infra_db::repositories::token::ConsumeOutcome;
use sha2::{Digest, Sha256};
use tracing::{instrument, warn};
use uuid::Uuid;

impl OAuth2Engine {
    /**
     * Endpoint token: despacha por grant_type.
     */
    #[instrument(skip(self, request))]
    pub async fn token(
        &self,
        request: TokenGrantRequest,
    ) -> Result<TokenGrantResponse, AuthorityError> {
        match request {
            TokenGrantRequest::AuthorizationCode {
                code,
                redirect_uri,
                client_id,
                client_secret,
                code_verifier,
            } => {
                self.grant_authorization_code(code, redirect_uri, client_id, client_secret, code_verifier)
                    .await
            }
            TokenGrantRequest::RefreshToken {
                refresh_token,
                client_id,
                client_secret,
                scope,
            } => {
                self.grant_refresh_token(refresh_token, client_id, client_secret, scope)
                    .await
            }
            TokenGrantRequest::ClientCredentials {
                client_id,
                client_secret,
                scope,
            } => {
                self.grant_client_credentials(client_id, client_secret, scope)
                    .await
            }
        }
    }

    // --- GRANT: AUTHORIZATION CODE ---

    async fn grant_authorization_code(
        &self,
        code_plaintext: String,
        redirect_uri: String,
        client_id: String,
        client_secret: Option<String>,
        code_verifier: Option<String>,
    ) -> Result<TokenGrantResponse, AuthorityError> {
        let now = self.application_state.clock.now();

        let client = self
            .authenticate_client(&client_id, client_secret.as_deref())
            .await?;
        if !client.supports_grant(GrantKind::AuthorizationCode) {
            return Err(AuthorityError::UnauthorizedClient(
                "AUTHORIZATION_CODE_GRANT_DISABLED".to_string(),
            ));
        }

        // CANJE ATÓMICO (compare-and-swap used: 0 -> 1)
        let code_digest = entativa_core_token_forge::sha256_digest_hex(&code_plaintext);
        let consumed_code = match self
            .application_state
            .token_repository
            .consume_auth_code(&code_digest, now)
            .await?
        {
            ConsumeOutcome::Consumed(code) => code,
            ConsumeOutcome::Replayed(code) => {
                self.execute_code_replay_cascade(&code, now).await;
                return Err(AuthorityError::InvalidGrant(
                    "AUTHORIZATION_CODE_REUSED".to_string(),
                ));
            }
            ConsumeOutcome::Expired => {
                return Err(AuthorityError::InvalidGrant(
                    "AUTHORIZATION_CODE_EXPIRED".to_string(),
                ));
            }
            ConsumeOutcome::Missing => {
                return Err(AuthorityError::InvalidGrant(
                    "UNKNOWN_AUTHORIZATION_CODE".to_string(),
                ));
            }
        };

        // LIGADURAS DEL CÓDIGO: cliente y redirección exactos.
        if consumed_code.client_id != client.client_id {
            self.execute_code_replay_cascade(&consumed_code, now).await;
            return Err(AuthorityError::InvalidGrant(
                "CLIENT_BINDING_MISMATCH".to_string(),
            ));
        }
        if consumed_code.redirect_uri != redirect_uri {
            return Err(AuthorityError::InvalidGrant(
                "REDIRECT_BINDING_MISMATCH".to_string(),
            ));
        }

        // COMPUERTA PKCE (RFC 7636 §4.6)
        verify_pkce(&consumed_code, code_verifier.as_deref())?;

        // EMISIÓN DEL PAR LIGADO AL CÓDIGO PROGENITOR
        let identity = self
            .application_state
            .identity_repository
            .fetch_by_id(consumed_code.identity_id)
            .await?
            .ok_or(AuthorityError::InvalidCredentials)?;

        let token_service = TokenService::new(self.application_state.clone());
        let bundle = token_service
            .issue_session_bundle(
                &identity,
                Some(client.client_id.clone()),
                consumed_code.scopes.clone(),
                Some(consumed_code.id),
                None,
                None,
                SecurityLevel::Standard,
            )
            .await?;

        let recorder = AuditRecorder::new(self.application_state.clone());
        recorder
            .record(
                AuditEvent::forge(AuditAction::TokenIssued, LawfulBasis::Contract, now)
                    .with_identity(identity.id)
                    .with_detail("client_id", client.client_id.clone())
                    .with_detail("grant_type", "authorization_code")
                    .with_detail("jti", bundle.access_jti.to_string())
                    .with_detail("scopes", bundle.granted_scopes.join(" ")),
            )
            .await;

        Ok(TokenGrantResponse {
            access_token: bundle.access_token,
            token_type: "Bearer",
            expires_in: (bundle.access_expires_at - now).num_seconds(),
            refresh_token: Some(bundle.refresh_token),
            scope: (!bundle.granted_scopes.is_empty()).then(|| bundle.granted_scopes.join(" ")),
        })
    }

    // --- GRANT: REFRESH TOKEN ---

    async fn grant_refresh_token(
        &self,
        refresh_token: String,
        client_id: String,
        client_secret: Option<String>,
        requested_scope: Option<String>,
    ) -> Result<TokenGrantResponse, AuthorityError> {
        let now = self.application_state.clock.now();

        let client = self
            .authenticate_client(&client_id, client_secret.as_deref())
            .await?;
        if !client.supports_grant(GrantKind::RefreshToken) {
            return Err(AuthorityError::UnauthorizedClient(
                "REFRESH_GRANT_DISABLED".to_string(),
            ));
        }

        let token_service = TokenService::new(self.application_state.clone());
        let refresh_claims = token_service.validate_refresh_token(&refresh_token).await?;

        // El refresh pertenece al cliente que lo originó.
        if let Some(bound_client) = &refresh_claims.client_id {
            if bound_client != &client.client_id {
                return Err(AuthorityError::InvalidGrant(
                    "CLIENT_BINDING_MISMATCH".to_string(),
                ));
            }
        }

        // NARROWING: el scope pedido debe ser subconjunto del original.
        let original_scopes = refresh_claims
            .scope
            .as_deref()
            .map(parse_scopes)
            .unwrap_or_default();
        let granted_scopes = match requested_scope.as_deref() {
            Some(scope_string) => {
                let requested = parse_scopes(scope_string);
                if !scopes_are_subset(&requested, &original_scopes) {
                    return Err(AuthorityError::InvalidScope(
                        "SCOPE_WIDENING_REJECTED".to_string(),
                    ));
                }
                requested
            }
            None => original_scopes,
        };

        let identity_id = Uuid::parse_str(&refresh_claims.sub)
            .map_err(|_| AuthorityError::TokenRejected("NON_IDENTITY_SUBJECT".to_string()))?;
        let identity = self
            .application_state
            .identity_repository
            .fetch_by_id(identity_id)
            .await?
            .ok_or(AuthorityError::InvalidCredentials)?;

        let bundle = token_service
            .rotate_refresh(&refresh_claims, &identity, granted_scopes)
            .await?;

        let recorder = AuditRecorder::new(self.application_state.clone());
        recorder
            .record(
                AuditEvent::forge(AuditAction::TokenRefreshed, LawfulBasis::Contract, now)
                    .with_identity(identity.id)
                    .with_detail("client_id", client.client_id.clone())
                    .with_detail("grant_type", "refresh_token")
                    .with_detail("jti", bundle.access_jti.to_string())
                    .with_detail("scopes", bundle.granted_scopes.join(" ")),
            )
            .await;

        Ok(TokenGrantResponse {
            access_token: bundle.access_token,
            token_type: "Bearer",
            expires_in: (bundle.access_expires_at - now).num_seconds(),
            refresh_token: (!bundle.refresh_token.is_empty()).then_some(bundle.refresh_token),
            scope: (!bundle.granted_scopes.is_empty()).then(|| bundle.granted_scopes.join(" ")),
        })
    }

    // --- GRANT: CLIENT CREDENTIALS ---

    async fn grant_client_credentials(
        &self,
        client_id: String,
        client_secret: String,
        requested_scope: Option<String>,
    ) -> Result<TokenGrantResponse, AuthorityError> {
        let now = self.application_state.clock.now();

        let client = self
            .authenticate_client(&client_id, Some(client_secret.as_str()))
            .await?;

        // Solo clientes confidenciales: un cliente público jamás llega
        // aquí (la autenticación exige secreto presente y verificado).
        if client.is_public() {
            return Err(AuthorityError::UnauthorizedClient(
                "PUBLIC_CLIENT_FORBIDDEN".to_string(),
            ));
        }
        if !client.supports_grant(GrantKind::ClientCredentials) {
            return Err(AuthorityError::UnauthorizedClient(
                "CLIENT_CREDENTIALS_GRANT_DISABLED".to_string(),
            ));
        }

        let granted_scopes = requested_scope
            .as_deref()
            .map(parse_scopes)
            .unwrap_or_default();
        if !client.scopes_allowed(&granted_scopes) {
            return Err(AuthorityError::InvalidScope(
                "REQUESTED_SCOPE_OUTSIDE_CLIENT_GRANT".to_string(),
            ));
        }

        let token_service = TokenService::new(self.application_state.clone());
        let (access_token, jti, expires_at) = token_service
            .issue_client_access(&client.client_id, granted_scopes.clone())
            .await?;

        let recorder = AuditRecorder::new(self.application_state.clone());
        recorder
            .record(
                AuditEvent::forge(AuditAction::TokenIssued, LawfulBasis::Contract, now)
                    .with_detail("client_id", client.client_id.clone())
                    .with_detail("grant_type", "client_credentials")
                    .with_detail("jti", jti.to_string())
                    .with_detail("scopes", granted_scopes.join(" ")),
            )
            .await;

        Ok(TokenGrantResponse {
            access_token,
            token_type: "Bearer",
            expires_in: (expires_at - now).num_seconds(),
            refresh_token: None,
            scope: (!granted_scopes.is_empty()).then(|| granted_scopes.join(" ")),
        })
    }

    // --- FÍSICA COMPARTIDA ---

    /**
     * Autenticación del cliente (RFC 6749 §2.3).
     *
     * # Logic:
     * - Confidencial: secreto obligatorio y verificado (bcrypt).
     * - Público: el secreto NO DEBE presentarse.
     */
    pub(crate) async fn authenticate_client(
        &self,
        client_id: &str,
        presented_secret: Option<&str>,
    ) -> Result<OAuthClient, AuthorityError> {
        let client = self
            .application_state
            .oauth_client_repository
            .fetch(client_id)
            .await?
            .ok_or(AuthorityError::ClientAuthenticationFailed)?;

        if client.status != ClientStatus::Active {
            return Err(AuthorityError::ClientAuthenticationFailed);
        }

        match (&client.client_secret_hash, presented_secret) {
            (Some(secret_hash), Some(presented)) => {
                if !bcrypt::verify(presented, secret_hash).unwrap_or(false) {
                    return Err(AuthorityError::ClientAuthenticationFailed);
                }
            }
            (Some(_), None) => return Err(AuthorityError::ClientAuthenticationFailed),
            (None, Some(_)) => return Err(AuthorityError::ClientAuthenticationFailed),
            (None, None) => {}
        }

        Ok(client)
    }

    /// Cascada anti-replay: incinera toda credencial del código.
    pub(crate) async fn execute_code_replay_cascade(
        &self,
        code: &AuthorizationCode,
        now: chrono::DateTime<chrono::Utc>,
    ) {
        warn!(
            "🚨 [CODE_REPLAY]: Authorization code {} re-presented; cascading revocation.",
            code.id
        );

        let revoked = self
            .application_state
            .token_repository
            .revoke_by_auth_code(code.id, now)
            .await
            .unwrap_or_default();

        let token_service = TokenService::new(self.application_state.clone());
        for summary in &revoked {
            // Alimenta la blacklist efímera vía el servicio de tokens.
            let _ = token_service
                .revoke_single(summary.id, None, "authorization_code_replay")
                .await;
        }

        let recorder = AuditRecorder::new(self.application_state.clone());
        recorder
            .record(
                AuditEvent::forge(
                    AuditAction::AuthCodeReplayDetected,
                    LawfulBasis::LegitimateInterest,
                    now,
                )
                .with_identity(code.identity_id)
                .with_detail("auth_code_id", code.id.to_string())
                .with_detail("client_id", code.client_id.clone())
                .with_detail("revoked_count", revoked.len().to_string()),
            )
            .await;
    }
}

/// Verificación PKCE (RFC 7636 §4.6).
fn verify_pkce(
    code: &AuthorizationCode,
    code_verifier: Option<&str>,
) -> Result<(), AuthorityError> {
    let Some(challenge) = &code.code_challenge else {
        // Sin desafío ligado no hay nada que verificar.
        return Ok(());
    };

    let verifier = code_verifier.ok_or(AuthorityError::PkceMismatch)?;

    let reproduced = match code.challenge_method.unwrap_or(CodeChallengeMethod::Plain) {
        CodeChallengeMethod::S256 => {
            let mut hasher = Sha256::new();
            hasher.update(verifier.as_bytes());
            BASE64_URL.encode(hasher.finalize())
        }
        CodeChallengeMethod::Plain => verifier.to_string(),
    };

    if reproduced != *challenge {
        return Err(AuthorityError::PkceMismatch);
    }
    Ok(())
}
// FIN DEL ARCHIVO [apps/authority/src/services/oauth_engine/token_grant.rs]

// INICIO DEL ARCHIVO [apps/authority/src/services/oauth_engine/authorize.rs]
/*!
 * =================================================================
 * APARATO: AUTHORIZATION FLOW FRONT (V5.1 - CONSENT LATTICE)
 * CLASIFICACIÓN: PROTOCOL STRATUM (ESTRATO L4)
 * RESPONSABILIDAD: AUTHORIZE + AUTHORIZE-CONFIRM (PKCE SEALED)
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. NEVER REDIRECT BLIND: La redirect_uri se valida ANTES de
 *    construir cualquier redirección; una URI no registrada produce
 *    error directo, jamás un redirect.
 * 2. PKCE POLICY GATE: Clientes públicos exigen PKCE sin excepción;
 *    el método ausente degrada permisivamente a 'plain' (política
 *    deliberada; los despliegues serios lo deshabilitan).
 * 3. PENDING TTL: El registro pendiente vive 600 s en el estrato
 *    efímero bajo oauth_pending:{request_id}.
 * =================================================================
 */

use super::{AuthorizeConfirmOutcome, AuthorizeConfirmRequest, AuthorizeOutcome, AuthorizeRequest, OAuth2Engine};
use crate::errors::AuthorityError;
use crate::services::audit_recorder::AuditRecorder;
use crate::support::{parse_scopes, scopes_are_subset};
use entativa_core_token_forge::{forge_authorization_code, sha256_digest_hex};
use entativa_domain_models::audit::{AuditAction, AuditEvent, LawfulBasis};
use entativa_domain_models::oauth_client::{ClientStatus, GrantKind, PkcePolicy};
use entativa_domain_models::oauth_flow::{
    AuthorizationCode, AuthorizationFlowState, CodeChallengeMethod, PendingAuthorization,
};
use entativa_infra_cache::keys;
use entativa_infra_cache::KeyValueStore;
use crate::clock::Clock;
use tracing::{info, instrument, warn};
use uuid::Uuid;

impl OAuth2Engine {
    /**
     * Endpoint authorize: valida cliente, redirección, scopes y PKCE;
     * produce el registro pendiente y la URL de consentimiento.
     */
    #[instrument(skip(self, request), fields(client_id = %request.client_id))]
    pub async fn authorize(
        &self,
        request: AuthorizeRequest,
    ) -> Result<AuthorizeOutcome, AuthorityError> {
        let now = self.application_state.clock.now();

        // 1. CLIENTE EXISTENTE Y ACTIVO
        let client = self
            .application_state
            .oauth_client_repository
            .fetch(&request.client_id)
            .await?
            .ok_or_else(|| {
                AuthorityError::UnauthorizedClient("UNKNOWN_CLIENT".to_string())
            })?;

        if client.status != ClientStatus::Active {
            return Err(AuthorityError::UnauthorizedClient("CLIENT_INACTIVE".to_string()));
        }
        if !client.supports_grant(GrantKind::AuthorizationCode) {
            return Err(AuthorityError::UnauthorizedClient(
                "AUTHORIZATION_CODE_GRANT_DISABLED".to_string(),
            ));
        }

        // 2. REDIRECT URI REGISTRADA (validación previa a todo redirect)
        if !client.redirect_uri_registered(&request.redirect_uri) {
            return Err(AuthorityError::InvalidRequest(
                "UNREGISTERED_REDIRECT_URI".to_string(),
            ));
        }

        // 3. RESPONSE TYPE
        if request.response_type != "code" {
            return Err(AuthorityError::InvalidRequest(format!(
                "UNSUPPORTED_RESPONSE_TYPE: {}",
                request.response_type
            )));
        }

        // 4. SCOPES SOLICITADOS ⊆ PERMITIDOS
        let requested_scopes = request
            .scope
            .as_deref()
            .map(parse_scopes)
            .unwrap_or_default();
        if !client.scopes_allowed(&requested_scopes) {
            return Err(AuthorityError::InvalidScope(
                "REQUESTED_SCOPE_OUTSIDE_CLIENT_GRANT".to_string(),
            ));
        }

        // 5. COMPUERTA PKCE
        let challenge_method = match (&request.code_challenge, &request.code_challenge_method) {
            (Some(_), Some(method_raw)) => Some(
                CodeChallengeMethod::parse(method_raw).ok_or_else(|| {
                    AuthorityError::InvalidRequest(format!(
                        "UNKNOWN_CODE_CHALLENGE_METHOD: {}",
                        method_raw
                    ))
                })?,
            ),
            // Método ausente con desafío presente: 'plain' permisivo.
            (Some(_), None) => Some(CodeChallengeMethod::Plain),
            (None, _) => None,
        };

        match client.effective_pkce_policy() {
            PkcePolicy::Required if request.code_challenge.is_none() => {
                return Err(AuthorityError::InvalidRequest(
                    "PKCE_CHALLENGE_REQUIRED".to_string(),
                ));
            }
            PkcePolicy::Forbidden if request.code_challenge.is_some() => {
                return Err(AuthorityError::InvalidRequest(
                    "PKCE_CHALLENGE_FORBIDDEN".to_string(),
                ));
            }
            _ => {}
        }

        // 6. REGISTRO PENDIENTE (TTL 600 s)
        let request_id = Uuid::new_v4();
        let pending = PendingAuthorization {
            request_id,
            client_id: client.client_id.clone(),
            redirect_uri: request.redirect_uri.clone(),
            requested_scopes: requested_scopes.clone(),
            state: request.state.clone(),
            code_challenge: request.code_challenge.clone(),
            code_challenge_method: challenge_method,
            flow_state: AuthorizationFlowState::PendingAuth,
            created_at: now,
            expires_at: now + self.application_state.config.auth_code_ttl(),
        };

        let pending_payload = serde_json::to_string(&pending)
            .map_err(|fault| AuthorityError::Fatal(fault.to_string()))?;
        self.application_state
            .cache
            .put(
                &keys::oauth_pending(request_id),
                &pending_payload,
                Some(self.application_state.config.auth_code_ttl()),
            )
            .await?;

        let consent_url = format!(
            "{}/consent?request_id={}",
            self.application_state.config.issuer, request_id
        );

        info!(
            "🪧 [AUTHORIZE]: Pending authorization {} staged for client [{}].",
            request_id, client.client_id
        );

        Ok(AuthorizeOutcome {
            request_id,
            consent_url,
            requires_consent: !client.is_trusted,
            requested_scopes,
        })
    }

    /**
     * Endpoint authorize-confirm: sella el consentimiento y acuña el
     * código de autorización (o la redirección de negación).
     */
    #[instrument(skip(self, request), fields(request_id = %request.request_id))]
    pub async fn authorize_confirm(
        &self,
        request: AuthorizeConfirmRequest,
    ) -> Result<AuthorizeConfirmOutcome, AuthorityError> {
        let now = self.application_state.clock.now();
        let pending_key = keys::oauth_pending(request.request_id);

        // 1. REGISTRO PENDIENTE VIGENTE
        let pending_payload = self
            .application_state
            .cache
            .get(&pending_key)
            .await?
            .ok_or_else(|| {
                AuthorityError::InvalidRequest("PENDING_AUTHORIZATION_EXPIRED".to_string())
            })?;
        let pending: PendingAuthorization = serde_json::from_str(&pending_payload)
            .map_err(|fault| AuthorityError::Fatal(fault.to_string()))?;

        let recorder = AuditRecorder::new(self.application_state.clone());

        // 2. NEGACIÓN -> TERMINAL DENIED
        if !request.approved {
            let _ = self.application_state.cache.delete(&pending_key).await;

            recorder
                .record(
                    AuditEvent::forge(AuditAction::ConsentDenied, LawfulBasis::Consent, now)
                        .with_identity(request.user_id)
                        .with_detail("client_id", pending.client_id.clone())
                        .with_detail("request_id", pending.request_id.to_string()),
                )
                .await;

            let redirect_uri = build_redirect(
                &pending.redirect_uri,
                &[("error", "access_denied")],
                pending.state.as_deref(),
            );
            return Ok(AuthorizeConfirmOutcome {
                redirect_uri,
                denied: true,
            });
        }

        // 3. SCOPES APROBADOS ⊆ SOLICITADOS
        if !scopes_are_subset(&request.approved_scopes, &pending.requested_scopes) {
            return Err(AuthorityError::InvalidScope(
                "APPROVED_SCOPE_OUTSIDE_REQUEST".to_string(),
            ));
        }

        // 4. ACUÑACIÓN DEL CÓDIGO (32 chars base62, un solo uso)
        let code_plaintext = forge_authorization_code();
        let code = AuthorizationCode {
            id: Uuid::new_v4(),
            code_hash: sha256_digest_hex(&code_plaintext),
            client_id: pending.client_id.clone(),
            identity_id: request.user_id,
            redirect_uri: pending.redirect_uri.clone(),
            scopes: request.approved_scopes.clone(),
            code_challenge: pending.code_challenge.clone(),
            challenge_method: pending.code_challenge_method,
            used: false,
            created_at: now,
            expires_at: now + self.application_state.config.auth_code_ttl(),
        };

        self.application_state
            .token_repository
            .insert_auth_code(&code)
            .await?;

        // 5. EL REGISTRO PENDIENTE SE EXTINGUE
        let _ = self.application_state.cache.delete(&pending_key).await;

        recorder
            .record(
                AuditEvent::forge(AuditAction::ConsentGranted, LawfulBasis::Consent, now)
                    .with_identity(request.user_id)
                    .with_detail("client_id", pending.client_id.clone())
                    .with_detail("request_id", pending.request_id.to_string())
                    .with_detail("scopes", request.approved_scopes.join(" ")),
            )
            .await;

        if pending.code_challenge.is_none() {
            warn!(
                "🔓 [PKCE_ABSENT]: Code issued without challenge for client [{}].",
                pending.client_id
            );
        }

        let redirect_uri = build_redirect(
            &pending.redirect_uri,
            &[("code", &code_plaintext)],
            pending.state.as_deref(),
        );

        Ok(AuthorizeConfirmOutcome {
            redirect_uri,
            denied: false,
        })
    }
}

/// Construye la redirección final preservando el 'state' del cliente.
fn build_redirect(base_uri: &str, parameters: &[(&str, &str)], state: Option<&str>) -> String {
    let separator = if base_uri.contains('?') { '&' } else { '?' };
    let mut redirect = format!("{}{}", base_uri, separator);

    let mut first = true;
    for (key, value) in parameters {
        if !first {
            redirect.push('&');
        }
        redirect.push_str(&format!("{}={}", key, value));
        first = false;
    }

    if let Some(state_value) = state {
        redirect.push_str(&format!("&state={}", state_value));
    }
    redirect
}
// FIN DEL ARCHIVO [apps/authority/src/services/oauth_engine/authorize.rs]

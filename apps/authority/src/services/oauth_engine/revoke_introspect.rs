// INICIO DEL ARCHIVO [apps/authority/src/services/oauth_engine/revoke_introspect.rs]
/*!
 * =================================================================
 * APARATO: REVOCATION & INTROSPECTION FRONT (V4.0)
 * CLASIFICACIÓN: PROTOCOL STRATUM (ESTRATO L4)
 * RESPONSABILIDAD: RFC 7009 (REVOKE) Y RFC 7662 (INTROSPECT)
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. IDEMPOTENT REVOKE: El endpoint SIEMPRE reporta éxito tras
 *    autenticar al cliente; revocar lo inexistente o lo ya revocado
 *    no es un error observable (RFC 7009 §2.2).
 * 2. OPAQUE INTROSPECTION: Toda credencial inerte responde
 *    {active:false} sin ningún otro campo; nada más se revela.
 * =================================================================
 */

use super::{IntrospectionResponse, OAuth2Engine};
use crate::errors::AuthorityError;
use crate::services::audit_recorder::AuditRecorder;
use crate::services::token_service::TokenService;
use crate::clock::Clock;
use entativa_core_token_forge::claims::{TOKEN_TYPE_ACCESS, TOKEN_TYPE_REFRESH};
use entativa_domain_models::audit::{AuditAction, AuditEvent, LawfulBasis};
use tracing::{debug, instrument};
use uuid::Uuid;

impl OAuth2Engine {
    /**
     * Endpoint revoke (RFC 7009): blacklistea el jti presentado.
     *
     * El token_type_hint solo ordena el intento de decodificación;
     * un hint incorrecto no altera el resultado.
     */
    #[instrument(skip(self, presented_token, client_secret))]
    pub async fn revoke(
        &self,
        presented_token: &str,
        token_type_hint: Option<&str>,
        client_id: &str,
        client_secret: Option<&str>,
    ) -> Result<(), AuthorityError> {
        let now = self.application_state.clock.now();
        let client = self.authenticate_client(client_id, client_secret).await?;

        let resolved_jti = self.resolve_jti(presented_token, token_type_hint);

        let Some(jti) = resolved_jti else {
            // Material irreconocible: éxito idempotente sin efecto.
            debug!("🫥 [REVOKE_NOOP]: Unrecognizable token material; reporting success.");
            return Ok(());
        };

        let token_service = TokenService::new(self.application_state.clone());
        token_service
            .revoke_single(jti, None, "client_revocation_request")
            .await?;

        let recorder = AuditRecorder::new(self.application_state.clone());
        recorder
            .record(
                AuditEvent::forge(AuditAction::TokenRevoked, LawfulBasis::Contract, now)
                    .with_detail("jti", jti.to_string())
                    .with_detail("reason", "client_revocation_request")
                    .with_detail("cascade", "false")
                    .with_detail("client_id", client.client_id),
            )
            .await;

        Ok(())
    }

    /**
     * Endpoint introspect (RFC 7662): estado mínimo de la credencial.
     */
    #[instrument(skip(self, presented_token, client_secret))]
    pub async fn introspect(
        &self,
        presented_token: &str,
        client_id: &str,
        client_secret: Option<&str>,
    ) -> Result<IntrospectionResponse, AuthorityError> {
        self.authenticate_client(client_id, client_secret).await?;
        let token_service = TokenService::new(self.application_state.clone());

        // INTENTO 1: ACCESS TOKEN
        if let Ok(claims) = token_service.validate_access_token(presented_token).await {
            return Ok(IntrospectionResponse {
                active: true,
                sub: Some(claims.sub),
                client_id: claims.client_id,
                exp: Some(claims.exp),
                iat: Some(claims.iat),
                scope: claims.scope,
                token_type: Some(TOKEN_TYPE_ACCESS.to_string()),
            });
        }

        // INTENTO 2: REFRESH TOKEN
        if let Ok(claims) = token_service.validate_refresh_token(presented_token).await {
            // La fila durable decide: un refresh rotado/revocado es inerte.
            let durable_active = self
                .application_state
                .token_repository
                .fetch_by_id(claims.jti)
                .await
                .ok()
                .flatten()
                .map(|record| record.is_active_at(self.application_state.clock.now()))
                .unwrap_or(false);

            if durable_active {
                return Ok(IntrospectionResponse {
                    active: true,
                    sub: Some(claims.sub),
                    client_id: claims.client_id,
                    exp: Some(claims.exp),
                    iat: Some(claims.iat),
                    scope: claims.scope,
                    token_type: Some(TOKEN_TYPE_REFRESH.to_string()),
                });
            }
        }

        Ok(IntrospectionResponse::inactive())
    }

    /// Resuelve el jti decodificando según el hint (orden, no verdad).
    fn resolve_jti(&self, presented_token: &str, token_type_hint: Option<&str>) -> Option<Uuid> {
        let forge = &self.application_state.token_forge;

        let try_access = || forge.validate_access(presented_token).ok().map(|c| c.jti);
        let try_refresh = || forge.validate_refresh(presented_token).ok().map(|c| c.jti);

        match token_type_hint {
            Some("refresh_token") => try_refresh().or_else(try_access),
            _ => try_access().or_else(try_refresh),
        }
    }
}
// FIN DEL ARCHIVO [apps/authority/src/services/oauth_engine/revoke_introspect.rs]

// [apps/authority/src/services/oauth_engine/mod.rs]
/*!
 * =================================================================
 * APARATO: OAUTH2 SINGULARITY ENGINE (V6.0 - RFC ALIGNED)
 * CLASIFICACIÓN: PROTOCOL STRATUM (ESTRATO L4)
 * RESPONSABILIDAD: AUTORIZACIÓN, CANJE, REVOCACIÓN E INTROSPECCIÓN
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. RFC LATTICE: RFC 6749 (core) + 7636 (PKCE) + 7009 (revocación)
 *    + 7662 (introspección) + OIDC discovery/userinfo/jwks.
 * 2. SEMANTIC ENDPOINTS: El transporte HTTP es un colaborador
 *    externo; este motor expone las operaciones semánticas puras.
 * 3. STATE MACHINE: PENDING_AUTH -> CONSENT_APPROVED -> CODE_ISSUED
 *    -> CODE_CONSUMED -> (ACCESS_ISSUED, REFRESH_ISSUED); terminales
 *    CODE_EXPIRED, CODE_REUSED (cascada), DENIED.
 * =================================================================
 */

mod authorize;
mod revoke_introspect;
mod token_grant;

use crate::errors::AuthorityError;
use crate::state::AppState;
use entativa_core_token_forge::JwkSetDocument;
use entativa_domain_models::identity::FieldVisibility;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// Petición semántica del endpoint authorize.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizeRequest {
    pub client_id: String,
    pub redirect_uri: String,
    pub response_type: String,
    pub scope: Option<String>,
    pub state: Option<String>,
    pub code_challenge: Option<String>,
    pub code_challenge_method: Option<String>,
}

/// Resultado del endpoint authorize.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizeOutcome {
    /// Identificador opaco del registro pendiente (TTL 600 s).
    pub request_id: Uuid,
    /// URL de la superficie de consentimiento (colaborador externo).
    pub consent_url: String,
    /// false para clientes de confianza: el consentimiento se omite.
    pub requires_consent: bool,
    pub requested_scopes: Vec<String>,
}

/// Confirmación (o negación) del consentimiento.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizeConfirmRequest {
    pub request_id: Uuid,
    pub user_id: Uuid,
    pub approved_scopes: Vec<String>,
    pub approved: bool,
}

/// Redirección resultante del consentimiento.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizeConfirmOutcome {
    /// URI final con ?code&state o ?error=access_denied&state.
    pub redirect_uri: String,
    pub denied: bool,
}

/// Petición del endpoint token, discriminada por grant_type.
#[derive(Debug, Clone)]
pub enum TokenGrantRequest {
    AuthorizationCode {
        code: String,
        redirect_uri: String,
        client_id: String,
        client_secret: Option<String>,
        code_verifier: Option<String>,
    },
    RefreshToken {
        refresh_token: String,
        client_id: String,
        client_secret: Option<String>,
        scope: Option<String>,
    },
    ClientCredentials {
        client_id: String,
        client_secret: String,
        scope: Option<String>,
    },
}

/// Respuesta contractual del endpoint token (RFC 6749 §5.1).
#[derive(Debug, Clone, Serialize)]
pub struct TokenGrantResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Respuesta mínima de introspección (RFC 7662). Nada más se revela.
#[derive(Debug, Clone, Serialize)]
pub struct IntrospectionResponse {
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl IntrospectionResponse {
    /// Respuesta opaca para credenciales desconocidas o inertes.
    pub fn inactive() -> Self {
        Self {
            active: false,
            sub: None,
            client_id: None,
            exp: None,
            iat: None,
            scope: None,
            token_type: None,
        }
    }
}

/// Documento de descubrimiento OIDC (/.well-known/openid-configuration).
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryDocument {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub revocation_endpoint: String,
    pub introspection_endpoint: String,
    pub userinfo_endpoint: String,
    pub jwks_uri: String,
    pub response_types_supported: Vec<String>,
    pub grant_types_supported: Vec<String>,
    pub code_challenge_methods_supported: Vec<String>,
    pub id_token_signing_alg_values_supported: Vec<String>,
    pub scopes_supported: Vec<String>,
}

/// Motor OAuth2/OIDC de la Autoridad.
pub struct OAuth2Engine {
    pub(crate) application_state: AppState,
}

impl OAuth2Engine {
    pub fn new(application_state: AppState) -> Self {
        Self { application_state }
    }

    // --- DOCUMENTOS FEDERADOS ---

    /// Documento de descubrimiento derivado de la configuración viva.
    pub fn discovery_document(&self) -> DiscoveryDocument {
        let issuer = self.application_state.config.issuer.clone();
        DiscoveryDocument {
            authorization_endpoint: format!("{}/oauth2/authorize", issuer),
            token_endpoint: format!("{}/oauth2/token", issuer),
            revocation_endpoint: format!("{}/oauth2/revoke", issuer),
            introspection_endpoint: format!("{}/oauth2/introspect", issuer),
            userinfo_endpoint: format!("{}/userinfo", issuer),
            jwks_uri: format!("{}/oauth2/jwks", issuer),
            issuer,
            response_types_supported: vec!["code".to_string()],
            grant_types_supported: vec![
                "authorization_code".to_string(),
                "refresh_token".to_string(),
                "client_credentials".to_string(),
            ],
            code_challenge_methods_supported: vec!["S256".to_string(), "plain".to_string()],
            id_token_signing_alg_values_supported: vec!["RS256".to_string()],
            scopes_supported: vec![
                "openid".to_string(),
                "profile".to_string(),
                "email".to_string(),
            ],
        }
    }

    /// Mitad pública del llavero de firma (endpoint JWKS).
    pub fn jwks_document(&self) -> Result<JwkSetDocument, AuthorityError> {
        self.application_state
            .keyring
            .jwks_document()
            .map_err(AuthorityError::from)
    }

    // --- USERINFO (OIDC CORE §5.3) ---

    /**
     * Claims del sujeto, gobernados por los scopes del access token
     * y por la visibilidad por campo del perfil.
     */
    pub async fn user_info(
        &self,
        bearer_access_token: &str,
    ) -> Result<serde_json::Value, AuthorityError> {
        let token_service = crate::services::token_service::TokenService::new(
            self.application_state.clone(),
        );
        let claims = token_service.validate_access_token(bearer_access_token).await?;

        let granted_scopes: Vec<String> = claims
            .scope
            .as_deref()
            .map(crate::support::parse_scopes)
            .unwrap_or_default();

        if !granted_scopes.iter().any(|scope| scope == "openid") {
            return Err(AuthorityError::InsufficientScope("openid".to_string()));
        }

        let identity_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AuthorityError::TokenRejected("NON_IDENTITY_SUBJECT".to_string()))?;

        let identity = self
            .application_state
            .identity_repository
            .fetch_by_id(identity_id)
            .await?
            .ok_or(AuthorityError::InvalidCredentials)?;

        let mut document = json!({ "sub": identity.id.to_string() });

        if granted_scopes.iter().any(|scope| scope == "profile") {
            document["preferred_username"] = json!(identity.eid);
            document["verified"] = json!(identity.verification_badge.is_some());

            if let Some(profile) = self
                .application_state
                .identity_repository
                .fetch_profile(identity_id)
                .await?
            {
                // Solo los campos públicos atraviesan la frontera OIDC.
                if profile.display_name_visibility == FieldVisibility::Public {
                    if let Some(display_name) = &profile.display_name {
                        document["name"] = json!(display_name);
                    }
                }
                if profile.location_visibility == FieldVisibility::Public {
                    if let Some(location) = &profile.location {
                        document["locale_hint"] = json!(location);
                    }
                }
            }
        }

        if granted_scopes.iter().any(|scope| scope == "email") {
            document["email"] = json!(identity.email);
            document["email_verified"] =
                json!(identity.verification_badge.is_some() || {
                    matches!(
                        identity.verification_status,
                        entativa_domain_models::identity::VerificationStatus::Verified
                    )
                });
        }

        Ok(document)
    }
}

// INICIO DEL ARCHIVO [libs/domain/models-rs/src/oauth_client.rs]
/*!
 * =================================================================
 * APARATO: OAUTH CLIENT MODELS (V2.3 - PKCE HARDENED)
 * CLASIFICACIÓN: DOMAIN ENTITIES (L2)
 * RESPONSABILIDAD: REGISTRO DE CLIENTES FEDERADOS Y SU POLÍTICA
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. PKCE SOVEREIGNTY: Un cliente público (sin secreto) exige PKCE
 *    de forma incondicional; la política declarada queda subordinada.
 * 2. REDIRECT EXACTITUDE: Las URIs registradas se comparan por
 *    igualdad exacta salvo bandera explícita de comodín.
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

/// Política PKCE declarada por el registro del cliente.
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PkcePolicy {
    Required,
    Optional,
    Forbidden,
}

impl PkcePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Optional => "optional",
            Self::Forbidden => "forbidden",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "required" => Some(Self::Required),
            "optional" => Some(Self::Optional),
            "forbidden" => Some(Self::Forbidden),
            _ => None,
        }
    }
}

/// Tipos de concesión habilitables por cliente.
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GrantKind {
    AuthorizationCode,
    RefreshToken,
    ClientCredentials,
}

impl GrantKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::RefreshToken => "refresh_token",
            Self::ClientCredentials => "client_credentials",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "authorization_code" => Some(Self::AuthorizationCode),
            "refresh_token" => Some(Self::RefreshToken),
            "client_credentials" => Some(Self::ClientCredentials),
            _ => None,
        }
    }
}

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Active,
    Suspended,
    Retired,
}

impl ClientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Retired => "retired",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "active" => Some(Self::Active),
            "suspended" => Some(Self::Suspended),
            "retired" => Some(Self::Retired),
            _ => None,
        }
    }
}

/// Cliente OAuth2 registrado ante la Autoridad Entativa.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthClient {
    pub client_id: String,
    /// Material bcrypt del secreto; None para clientes públicos.
    #[serde(skip_serializing)]
    pub client_secret_hash: Option<String>,
    pub client_name: String,
    /// URIs de redirección registradas (comparación exacta).
    pub redirect_uris: Vec<String>,
    /// Habilita sufijos comodín en las URIs registradas (solo clientes legacy).
    pub allow_wildcard_redirects: bool,
    pub allowed_scopes: Vec<String>,
    pub allowed_grants: Vec<GrantKind>,
    pub pkce_policy: PkcePolicy,
    /// TTL específico del cliente; None hereda el valor de configuración.
    pub access_token_ttl_seconds: Option<u64>,
    pub refresh_token_ttl_seconds: Option<u64>,
    /// Un cliente de confianza omite la superficie de consentimiento.
    pub is_trusted: bool,
    pub status: ClientStatus,
    pub created_at: DateTime<Utc>,
}

impl OAuthClient {
    /// Un cliente sin secreto registrado es público por definición.
    pub fn is_public(&self) -> bool {
        self.client_secret_hash.is_none()
    }

    /// Política PKCE efectiva: los clientes públicos exigen PKCE siempre.
    pub fn effective_pkce_policy(&self) -> PkcePolicy {
        if self.is_public() {
            PkcePolicy::Required
        } else {
            self.pkce_policy
        }
    }

    pub fn supports_grant(&self, grant: GrantKind) -> bool {
        self.allowed_grants.contains(&grant)
    }

    /// Verifica que cada scope solicitado pertenezca al conjunto permitido.
    pub fn scopes_allowed(&self, requested: &[String]) -> bool {
        requested
            .iter()
            .all(|scope| self.allowed_scopes.iter().any(|allowed| allowed == scope))
    }

    /// Comparación de redirect URI: exacta, o por prefijo si el registro
    /// termina en '*' y el cliente porta la bandera de comodín.
    pub fn redirect_uri_registered(&self, candidate: &str) -> bool {
        self.redirect_uris.iter().any(|registered| {
            if self.allow_wildcard_redirects {
                if let Some(prefix) = registered.strip_suffix('*') {
                    return candidate.starts_with(prefix);
                }
            }
            registered == candidate
        })
    }
}
// FIN DEL ARCHIVO [libs/domain/models-rs/src/oauth_client.rs]

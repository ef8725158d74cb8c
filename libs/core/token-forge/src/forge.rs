// INICIO DEL ARCHIVO [libs/core/token-forge/src/forge.rs]
/*!
 * =================================================================
 * APARATO: JWT FORGE ENGINE (V3.2 - RS256 SINGULARITY)
 * CLASIFICACIÓN: CORE SECURITY (ESTRATO L1)
 * RESPONSABILIDAD: ACUÑACIÓN Y VALIDACIÓN DE JWT EN SERIALIZACIÓN COMPACTA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. KID DISCIPLINE: Cada acuñación sella el kid vigente en el
 *    encabezado; la validación resuelve el material por kid y rechaza
 *    encabezados sin él.
 * 2. SKEW WINDOW: exp y nbf toleran el desfase de reloj configurado
 *    (120 s por defecto) vía leeway.
 * 3. TYPE GATE: El token_type del claim debe coincidir con la
 *    expectativa del endpoint; un refresh jamás entra por la puerta
 *    de un access.
 * =================================================================
 */

use crate::claims::{AccessTokenClaims, RefreshTokenClaims, TOKEN_TYPE_ACCESS, TOKEN_TYPE_REFRESH};
use crate::errors::TokenForgeError;
use crate::keyring::TokenKeyring;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, decode_header, encode, Algorithm, Header, Validation};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Resultado de una acuñación: el JWT compacto y su identidad temporal.
#[derive(Debug, Clone)]
pub struct MintedJwt {
    pub token: String,
    pub jti: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Motor de acuñación y validación del núcleo.
pub struct TokenForge {
    keyring: Arc<TokenKeyring>,
    issuer: String,
    audience: String,
    clock_skew_seconds: u64,
}

impl TokenForge {
    pub fn new(
        keyring: Arc<TokenKeyring>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        clock_skew_seconds: u64,
    ) -> Self {
        Self {
            keyring,
            issuer: issuer.into(),
            audience: audience.into(),
            clock_skew_seconds,
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Acuña un access token con el firmante vigente.
    #[instrument(skip(self, claims), fields(jti = %claims.jti))]
    pub fn sign_access(&self, claims: &AccessTokenClaims) -> Result<String, TokenForgeError> {
        self.sign(claims)
    }

    /// Acuña un refresh token con el firmante vigente.
    #[instrument(skip(self, claims), fields(jti = %claims.jti))]
    pub fn sign_refresh(&self, claims: &RefreshTokenClaims) -> Result<String, TokenForgeError> {
        self.sign(claims)
    }

    /**
     * Valida un access token: firma por kid, iss/aud, exp/nbf con
     * tolerancia de desfase y compuerta de token_type.
     */
    pub fn validate_access(&self, token: &str) -> Result<AccessTokenClaims, TokenForgeError> {
        let claims: AccessTokenClaims = self.decode_with_kid(token)?;
        if claims.token_type != TOKEN_TYPE_ACCESS {
            return Err(TokenForgeError::TokenTypeMismatch {
                expected: TOKEN_TYPE_ACCESS,
                observed: claims.token_type,
            });
        }
        Ok(claims)
    }

    /// Valida un refresh token (misma física, compuerta de tipo refresh).
    pub fn validate_refresh(&self, token: &str) -> Result<RefreshTokenClaims, TokenForgeError> {
        let claims: RefreshTokenClaims = self.decode_with_kid(token)?;
        if claims.token_type != TOKEN_TYPE_REFRESH {
            return Err(TokenForgeError::TokenTypeMismatch {
                expected: TOKEN_TYPE_REFRESH,
                observed: claims.token_type,
            });
        }
        Ok(claims)
    }

    // --- FÍSICA INTERNA ---

    fn sign<C: Serialize>(&self, claims: &C) -> Result<String, TokenForgeError> {
        let (kid, encoding_key) = self.keyring.signing_material()?;

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(kid);

        encode(&header, claims, &encoding_key)
            .map_err(|fault| TokenForgeError::SigningFault(fault.to_string()))
    }

    fn decode_with_kid<C: DeserializeOwned>(&self, token: &str) -> Result<C, TokenForgeError> {
        let header = decode_header(token)
            .map_err(|fault| TokenForgeError::ValidationFault(fault.to_string()))?;

        let kid = header
            .kid
            .ok_or_else(|| TokenForgeError::UnknownKid("<absent>".to_string()))?;

        let decoding_key = self.keyring.decoding_material(&kid)?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.audience.as_str()]);
        validation.leeway = self.clock_skew_seconds;
        validation.validate_nbf = true;

        let decoded = decode::<C>(token, &decoding_key, &validation)
            .map_err(|fault| TokenForgeError::ValidationFault(fault.to_string()))?;

        debug!("🔏 [FORGE_VERIFY]: Signature accepted under kid [{}].", kid);
        Ok(decoded.claims)
    }
}
// FIN DEL ARCHIVO [libs/core/token-forge/src/forge.rs]

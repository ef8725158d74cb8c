// INICIO DEL ARCHIVO [libs/core/token-forge/src/keyring.rs]
/*!
 * =================================================================
 * APARATO: RS256 SIGNING KEYRING (V3.0 - ROTATION SEALED)
 * CLASIFICACIÓN: CORE SECURITY (ESTRATO L1)
 * RESPONSABILIDAD: LLAVERO DE FIRMA ROTABLE INDEXADO POR KID
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. NEWEST SIGNS: Los firmantes usan siempre el kid más reciente;
 *    los verificadores aceptan cualquier kid presente en el llavero.
 * 2. READ-MOSTLY GUARD: Un RwLock custodia el anillo; la rotación
 *    adquiere el cerrojo de escritura solo para el intercambio.
 * 3. JWKS EXPORT: La mitad pública viaja como JWK Set (n, e en
 *    base64url sin padding) para los consumidores federados.
 *
 * # Mathematical Proof (Rotation Continuity):
 * Un token firmado con el kid K sigue siendo verificable mientras K
 * permanezca en el anillo; la rotación añade material sin invalidar
 * el existente, garantizando continuidad de verificación durante la
 * ventana de vida de los tokens emitidos.
 * =================================================================
 */

use crate::errors::TokenForgeError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL;
use base64::Engine;
use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey};
use rand::rngs::OsRng;
use rsa::pkcs1::{EncodeRsaPrivateKey, EncodeRsaPublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::RwLock;
use tracing::{info, instrument};

/// Longitud del módulo RSA del material de firma.
const RSA_MODULUS_BITS: usize = 2048;

/// JWK individual de la mitad pública de una llave.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwkDocument {
    pub kty: String,
    #[serde(rename = "use")]
    pub public_key_use: String,
    pub alg: String,
    pub kid: String,
    /// Módulo RSA en base64url sin padding.
    pub n: String,
    /// Exponente público en base64url sin padding.
    pub e: String,
}

/// JWK Set completo (RFC 7517) del llavero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwkSetDocument {
    pub keys: Vec<JwkDocument>,
}

/// Registro interno de una llave del anillo.
struct SigningKeyRecord {
    kid: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    public_jwk: JwkDocument,
    forged_at: DateTime<Utc>,
}

impl SigningKeyRecord {
    fn age_seconds(&self, now: DateTime<Utc>) -> i64 {
        (now - self.forged_at).num_seconds()
    }
}

/// Llavero de firma del núcleo. El último registro es el firmante.
pub struct TokenKeyring {
    ring: RwLock<Vec<SigningKeyRecord>>,
}

impl TokenKeyring {
    /**
     * Forja el llavero inicial con una llave recién generada.
     *
     * # Errors:
     * - `TokenForgeError::KeyMaterialFault`: la generación RSA o la
     *   codificación PEM colapsó. Fallo fatal de ignición.
     */
    #[instrument]
    pub fn ignite() -> Result<Self, TokenForgeError> {
        let keyring = Self {
            ring: RwLock::new(Vec::with_capacity(2)),
        };
        keyring.rotate()?;
        Ok(keyring)
    }

    /**
     * Rota el llavero: forja material nuevo y lo promueve a firmante.
     * Las llaves anteriores permanecen para verificación.
     */
    #[instrument(skip(self))]
    pub fn rotate(&self) -> Result<String, TokenForgeError> {
        let record = Self::forge_key_record()?;
        let kid = record.kid.clone();

        let mut ring_guard = self
            .ring
            .write()
            .map_err(|_| TokenForgeError::GuardPoisoned)?;
        ring_guard.push(record);

        info!("🗝️ [KEYRING_ROTATED]: New signing kid [{}] promoted.", kid);
        Ok(kid)
    }

    /// Kid del firmante vigente (el más reciente del anillo).
    pub fn current_kid(&self) -> Result<String, TokenForgeError> {
        let ring_guard = self
            .ring
            .read()
            .map_err(|_| TokenForgeError::GuardPoisoned)?;
        ring_guard
            .last()
            .map(|record| record.kid.clone())
            .ok_or(TokenForgeError::KeyringVoid)
    }

    /// Llave de firma vigente junto a su kid.
    pub fn signing_material(&self) -> Result<(String, EncodingKey), TokenForgeError> {
        let ring_guard = self
            .ring
            .read()
            .map_err(|_| TokenForgeError::GuardPoisoned)?;
        let record = ring_guard.last().ok_or(TokenForgeError::KeyringVoid)?;
        Ok((record.kid.clone(), record.encoding_key.clone()))
    }

    /// Llave de verificación para el kid indicado.
    pub fn decoding_material(&self, kid: &str) -> Result<DecodingKey, TokenForgeError> {
        let ring_guard = self
            .ring
            .read()
            .map_err(|_| TokenForgeError::GuardPoisoned)?;
        ring_guard
            .iter()
            .find(|record| record.kid == kid)
            .map(|record| record.decoding_key.clone())
            .ok_or_else(|| TokenForgeError::UnknownKid(kid.to_string()))
    }

    /// Exporta la mitad pública completa del anillo (endpoint JWKS).
    pub fn jwks_document(&self) -> Result<JwkSetDocument, TokenForgeError> {
        let ring_guard = self
            .ring
            .read()
            .map_err(|_| TokenForgeError::GuardPoisoned)?;
        Ok(JwkSetDocument {
            keys: ring_guard
                .iter()
                .map(|record| record.public_jwk.clone())
                .collect(),
        })
    }

    /// Población del anillo (diagnóstico).
    pub fn ring_size(&self) -> usize {
        self.ring.read().map(|guard| guard.len()).unwrap_or(0)
    }

    /// Edad en segundos del firmante vigente (telemetría de rotación).
    pub fn signer_age_seconds(&self, now: DateTime<Utc>) -> Result<i64, TokenForgeError> {
        let ring_guard = self
            .ring
            .read()
            .map_err(|_| TokenForgeError::GuardPoisoned)?;
        ring_guard
            .last()
            .map(|record| record.age_seconds(now))
            .ok_or(TokenForgeError::KeyringVoid)
    }

    // --- FORJA INTERNA DE MATERIAL ---

    fn forge_key_record() -> Result<SigningKeyRecord, TokenForgeError> {
        let mut source_of_randomness = OsRng;

        let private_key = RsaPrivateKey::new(&mut source_of_randomness, RSA_MODULUS_BITS)
            .map_err(|fault| TokenForgeError::KeyMaterialFault(fault.to_string()))?;
        let public_key = private_key.to_public_key();

        let private_pem = private_key
            .to_pkcs1_pem(LineEnding::LF)
            .map_err(|fault| TokenForgeError::KeyMaterialFault(fault.to_string()))?;
        let public_pem = public_key
            .to_pkcs1_pem(LineEnding::LF)
            .map_err(|fault| TokenForgeError::KeyMaterialFault(fault.to_string()))?;

        let encoding_key = EncodingKey::from_rsa_pem(private_pem.as_bytes())
            .map_err(|fault| TokenForgeError::KeyMaterialFault(fault.to_string()))?;
        let decoding_key = DecodingKey::from_rsa_pem(public_pem.as_bytes())
            .map_err(|fault| TokenForgeError::KeyMaterialFault(fault.to_string()))?;

        let modulus_bytes = public_key.n().to_bytes_be();
        let exponent_bytes = public_key.e().to_bytes_be();

        // El kid deriva del módulo: estable, único y sin material secreto.
        let mut kid_hasher = Sha256::new();
        kid_hasher.update(&modulus_bytes);
        let kid = hex::encode(&kid_hasher.finalize()[..8]);

        let public_jwk = JwkDocument {
            kty: "RSA".to_string(),
            public_key_use: "sig".to_string(),
            alg: "RS256".to_string(),
            kid: kid.clone(),
            n: BASE64_URL.encode(&modulus_bytes),
            e: BASE64_URL.encode(&exponent_bytes),
        };

        Ok(SigningKeyRecord {
            kid,
            encoding_key,
            decoding_key,
            public_jwk,
            forged_at: Utc::now(),
        })
    }
}

impl std::fmt::Debug for TokenKeyring {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("TokenKeyring")
            .field("ring_size", &self.ring_size())
            .finish()
    }
}

// FIN DEL ARCHIVO [libs/core/token-forge/src/keyring.rs]

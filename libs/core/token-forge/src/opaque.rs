// INICIO DEL ARCHIVO [libs/core/token-forge/src/opaque.rs]
/*!
 * =================================================================
 * APARATO: OPAQUE SECRET FORGE (V2.1)
 * CLASIFICACIÓN: CORE SECURITY (ESTRATO L1)
 * RESPONSABILIDAD: MATERIAL OPACO CSPRNG Y DIGESTS AT-REST
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. ENTROPY FLOOR: El código de autorización (32 chars base62)
 *    porta ~190 bits; muy por encima del piso de 128.
 * 2. PREFIX VISIBILITY: La API key expone sus primeros 8 caracteres
 *    para identificación; el secreto completo solo existe como digest.
 *
 * # Mathematical Proof (Base62 Entropy):
 * Cada carácter base62 aporta log2(62) ≈ 5.954 bits; 32 caracteres
 * producen ≈ 190.5 bits de entropía bajo extracción uniforme CSPRNG.
 * =================================================================
 */

use rand::rngs::OsRng;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Alfabeto base62 del material opaco.
const BASE62_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Alfabeto base64url (RFC 4648 §5, sin padding).
const BASE64_URL_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Longitud del código de autorización (§ contrato OAuth2).
pub const AUTHORIZATION_CODE_LENGTH: usize = 32;

/// Longitud del secreto opaco general (API keys, request tokens).
pub const OPAQUE_SECRET_LENGTH: usize = 48;

/// Caracteres visibles del prefijo de una API key.
pub const API_KEY_PREFIX_LENGTH: usize = 8;

/// Material completo de una API key recién forjada.
#[derive(Debug, Clone)]
pub struct ApiKeyMaterial {
    /// Valor completo a entregar UNA sola vez al solicitante.
    pub plaintext: String,
    /// Prefijo visible persistido para identificación.
    pub prefix: String,
    /// Digest SHA-256 (hex) persistido en la bóveda.
    pub digest_hex: String,
}

/// Digest canónico at-rest de cualquier secreto emitido.
pub fn sha256_digest_hex(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

fn forge_from_alphabet(alphabet: &[u8], length: usize) -> String {
    let mut source_of_randomness = OsRng;
    (0..length)
        .map(|_| {
            let index = source_of_randomness.gen_range(0..alphabet.len());
            alphabet[index] as char
        })
        .collect()
}

/// Código de autorización: 32 caracteres base62, un solo uso.
pub fn forge_authorization_code() -> String {
    forge_from_alphabet(BASE62_ALPHABET, AUTHORIZATION_CODE_LENGTH)
}

/// Secreto opaco general: 48 caracteres base64url.
pub fn forge_opaque_secret() -> String {
    forge_from_alphabet(BASE64_URL_ALPHABET, OPAQUE_SECRET_LENGTH)
}

/// API key: secreto de 48 chars cuyo prefijo de 8 queda visible.
pub fn forge_api_key() -> ApiKeyMaterial {
    let plaintext = forge_from_alphabet(BASE62_ALPHABET, OPAQUE_SECRET_LENGTH);
    let prefix = plaintext[..API_KEY_PREFIX_LENGTH].to_string();
    let digest_hex = sha256_digest_hex(&plaintext);

    ApiKeyMaterial {
        plaintext,
        prefix,
        digest_hex,
    }
}

// FIN DEL ARCHIVO [libs/core/token-forge/src/opaque.rs]

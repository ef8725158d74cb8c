// INICIO DEL ARCHIVO [libs/core/secret-vault-rs/src/lib.rs]
/*!
 * =================================================================
 * APARATO: MFA SECRET VAULT ENGINE (V2.2)
 * CLASIFICACIÓN: CORE SECURITY (ESTRATO L1)
 * RESPONSABILIDAD: CIFRADO SIMÉTRICO AES-256-GCM DEL MATERIAL MFA
 *
 * VISION HIPER-HOLÍSTICA:
 * Implementa el túnel simétrico para el material de factores en
 * reposo (semillas TOTP, destinos SMS/email). La llave maestra del
 * proceso se transforma vía PBKDF2-HMAC-SHA256 con sal determinista
 * por contexto, garantizando que dos factores con el mismo secreto
 * produzcan payloads independientes.
 * =================================================================
 */

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("BASE64_DECODE_FAULT: {0}")]
    EncodingError(#[from] base64::DecodeError),
    #[error("PAYLOAD_GRAMMAR_FAULT: {0}")]
    PayloadError(#[from] serde_json::Error),
    #[error("DECRYPTION_MALFUNCTION: Integrity compromised or incorrect Master Key")]
    DecryptionError,
    #[error("ENCRYPTION_MALFUNCTION: GCM engine rejected the payload")]
    EncryptionError,
}

/// Envoltorio cifrado persistido en la columna encrypted_secret.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EncryptedSecretPayload {
    pub cipher_text_base64: String,
    pub initialization_vector_base64: String,
}

pub struct SecretVaultEngine;

impl SecretVaultEngine {
    /// Iteraciones PBKDF2 sincronizadas con el estándar del núcleo.
    const PBKDF2_ITERATIONS: u32 = 150_000;
    const KEY_LENGTH_BYTES: usize = 32;
    const NONCE_LENGTH_BYTES: usize = 12;

    /**
     * Cifra material de factor para su reposo en la bóveda durable.
     *
     * # Logic:
     * 1. Deriva la llave de 256 bits desde la frase maestra y la sal
     *    determinista del contexto (id del factor).
     * 2. Genera un nonce CSPRNG de 96 bits por operación.
     * 3. Sella con AES-256-GCM (confidencialidad + integridad).
     *
     * @param plaintext_material Secreto del factor en claro.
     * @param master_key Frase maestra del proceso (env).
     * @param context_identifier Discriminador de sal (id del factor).
     */
    pub fn encrypt_at_rest(
        plaintext_material: &str,
        master_key: &str,
        context_identifier: &str,
    ) -> Result<String, VaultError> {
        let derived_key_buffer = Self::derive_key(master_key, context_identifier);

        let key = Key::<Aes256Gcm>::from_slice(&derived_key_buffer);
        let cipher_engine = Aes256Gcm::new(key);

        let mut nonce_buffer = [0u8; Self::NONCE_LENGTH_BYTES];
        OsRng.fill_bytes(&mut nonce_buffer);
        let nonce = Nonce::from_slice(&nonce_buffer);

        let cipher_text = cipher_engine
            .encrypt(nonce, plaintext_material.as_bytes())
            .map_err(|_| VaultError::EncryptionError)?;

        let payload = EncryptedSecretPayload {
            cipher_text_base64: BASE64.encode(cipher_text),
            initialization_vector_base64: BASE64.encode(nonce_buffer),
        };

        Ok(serde_json::to_string(&payload)?)
    }

    /**
     * Descifra material de factor recuperado de la bóveda.
     *
     * # Errors:
     * - `VaultError::DecryptionError`: llave maestra incorrecta o
     *   payload adulterado (fallo del Auth Tag GCM).
     */
    pub fn decrypt_at_rest(
        payload_json: &str,
        master_key: &str,
        context_identifier: &str,
    ) -> Result<String, VaultError> {
        let payload: EncryptedSecretPayload = serde_json::from_str(payload_json)?;

        let cipher_text = BASE64.decode(&payload.cipher_text_base64)?;
        let initialization_vector = BASE64.decode(&payload.initialization_vector_base64)?;

        let derived_key_buffer = Self::derive_key(master_key, context_identifier);

        let key = Key::<Aes256Gcm>::from_slice(&derived_key_buffer);
        let cipher_engine = Aes256Gcm::new(key);
        let nonce = Nonce::from_slice(&initialization_vector);

        let decrypted_bytes = cipher_engine
            .decrypt(nonce, cipher_text.as_ref())
            .map_err(|_| VaultError::DecryptionError)?;

        String::from_utf8(decrypted_bytes).map_err(|_| VaultError::DecryptionError)
    }

    /// Derivación PBKDF2 con sal determinista por contexto.
    fn derive_key(master_key: &str, context_identifier: &str) -> [u8; Self::KEY_LENGTH_BYTES] {
        let salt_material = format!("entativa_vault_v1_{}", context_identifier.to_lowercase());

        let mut derived_key_buffer = [0u8; Self::KEY_LENGTH_BYTES];
        pbkdf2_hmac::<Sha256>(
            master_key.as_bytes(),
            salt_material.as_bytes(),
            Self::PBKDF2_ITERATIONS,
            &mut derived_key_buffer,
        );
        derived_key_buffer
    }
}

// FIN DEL ARCHIVO [libs/core/secret-vault-rs/src/lib.rs]

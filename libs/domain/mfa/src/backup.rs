// INICIO DEL ARCHIVO [libs/domain/mfa/src/backup.rs]
/*!
 * =================================================================
 * APARATO: BACKUP CODE FORGE (V1.3)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: LOTES DE CÓDIGOS DE RESPALDO DE UN SOLO USO
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. BATCH CONTRACT: 10 códigos de 10 caracteres por lote; el claro
 *    se muestra una única vez y solo el digest reposa en la bóveda.
 * 2. UNAMBIGUOUS ALPHABET: Sin 0/O ni 1/I/L para transcripción
 *    humana sin fricción.
 * =================================================================
 */

use rand::rngs::OsRng;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Códigos por lote.
pub const BACKUP_CODE_COUNT: usize = 10;
/// Longitud de cada código.
pub const BACKUP_CODE_LENGTH: usize = 10;

/// Alfabeto sin caracteres ambiguos (0/O, 1/I/L excluidos).
const UNAMBIGUOUS_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Forja un lote completo de códigos de respaldo en claro.
pub fn forge_backup_codes() -> Vec<String> {
    let mut source_of_randomness = OsRng;

    (0..BACKUP_CODE_COUNT)
        .map(|_| {
            (0..BACKUP_CODE_LENGTH)
                .map(|_| {
                    let index = source_of_randomness.gen_range(0..UNAMBIGUOUS_ALPHABET.len());
                    UNAMBIGUOUS_ALPHABET[index] as char
                })
                .collect()
        })
        .collect()
}

/// Digest canónico de un código (normaliza mayúsculas antes de hashear).
pub fn digest_backup_code(plaintext_code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(plaintext_code.trim().to_uppercase().as_bytes());
    hex::encode(hasher.finalize())
}

// FIN DEL ARCHIVO [libs/domain/mfa/src/backup.rs]

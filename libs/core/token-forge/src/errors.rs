// [libs/core/token-forge/src/errors.rs]
/*!
 * =================================================================
 * APARATO: TOKEN FORGE ERROR CATALOG (V2.0)
 * CLASIFICACIÓN: CORE SECURITY (ESTRATO L1)
 * RESPONSABILIDAD: FALLOS DE ACUÑACIÓN Y VALIDACIÓN DE CREDENCIALES
 *
 * VISION HIPER-HOLÍSTICA:
 * KeyringVoid es FATAL: sin material de firma el núcleo no opera y
 * ninguna operación degrada silenciosamente.
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenForgeError {
    /// El llavero no posee material de firma. Fallo fatal del núcleo.
    #[error("[L1_FORGE_FATAL]: SIGNING_KEYRING_VOID")]
    KeyringVoid,

    /// La generación del par RSA o su codificación PEM colapsó.
    #[error("[L1_FORGE_FATAL]: KEY_MATERIAL_FORGE_FAULT -> {0}")]
    KeyMaterialFault(String),

    /// La firma del JWT fue rechazada por el motor criptográfico.
    #[error("[L1_FORGE_FAULT]: JWT_SIGNING_REJECTED -> {0}")]
    SigningFault(String),

    /// El token no superó la validación (firma, exp, iss, aud o nbf).
    #[error("[L1_FORGE_FAULT]: JWT_VALIDATION_REJECTED -> {0}")]
    ValidationFault(String),

    /// El kid del encabezado no figura en el llavero.
    #[error("[L1_FORGE_FAULT]: UNKNOWN_SIGNING_KID -> {0}")]
    UnknownKid(String),

    /// El token_type del claim no coincide con el esperado por el endpoint.
    #[error("[L1_FORGE_FAULT]: TOKEN_TYPE_MISMATCH -> expected {expected}, observed {observed}")]
    TokenTypeMismatch {
        expected: &'static str,
        observed: String,
    },

    /// Un cerrojo interno del llavero quedó envenenado.
    #[error("[L1_FORGE_FATAL]: KEYRING_GUARD_POISONED")]
    GuardPoisoned,
}

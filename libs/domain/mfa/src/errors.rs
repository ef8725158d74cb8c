// [libs/domain/mfa/src/errors.rs]
/*!
 * =================================================================
 * APARATO: MFA ENGINE ERROR CATALOG (V1.1)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: FALLOS DE LA FÍSICA DE FACTORES
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MfaEngineError {
    /// La semilla base32 recuperada de la bóveda está corrupta.
    #[error("[L2_MFA_FAULT]: SECRET_MATERIAL_CORRUPTED -> {0}")]
    SecretCorrupted(String),

    /// El motor RFC 6238 rechazó la construcción del generador.
    #[error("[L2_MFA_FAULT]: TOTP_ENGINE_REJECTED -> {0}")]
    TotpEngineFault(String),

    /// El reloj del sistema quedó fuera del rango computable.
    #[error("[L2_MFA_FAULT]: SYSTEM_CLOCK_FAULT")]
    ClockFault,
}

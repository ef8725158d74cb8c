// INICIO DEL ARCHIVO [libs/domain/mfa/src/totp.rs]
/*!
 * =================================================================
 * APARATO: TOTP FACTOR ENGINE (V2.1 - RFC 6238)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: SEMILLAS DE 160 BITS Y VERIFICACIÓN CON SKEW
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. SEED CONTRACT: La semilla viaja como base32 (160 bits CSPRNG) y
 *    reposa cifrada en la bóveda; este motor jamás la persiste.
 * 2. SKEW WINDOW: Verificación con tolerancia de ±1 paso de 30 s
 *    para absorber la deriva de los autenticadores móviles.
 * =================================================================
 */

use crate::errors::MfaEngineError;
use totp_rs::{Algorithm, Secret, TOTP};
use tracing::debug;

/// Dígitos del código TOTP.
const TOTP_DIGITS: usize = 6;
/// Pasos de tolerancia hacia atrás/adelante.
const TOTP_SKEW_STEPS: u8 = 1;
/// Duración del paso RFC 6238 en segundos.
const TOTP_STEP_SECONDS: u64 = 30;

/// Genera una semilla TOTP nueva (160 bits CSPRNG) codificada en base32.
pub fn generate_totp_secret() -> String {
    Secret::generate_secret().to_encoded().to_string()
}

fn build_engine(secret_base32: &str) -> Result<TOTP, MfaEngineError> {
    let secret_bytes = Secret::Encoded(secret_base32.to_string())
        .to_bytes()
        .map_err(|fault| MfaEngineError::SecretCorrupted(format!("{:?}", fault)))?;

    TOTP::new(
        Algorithm::SHA1,
        TOTP_DIGITS,
        TOTP_SKEW_STEPS,
        TOTP_STEP_SECONDS,
        secret_bytes,
    )
    .map_err(|fault| MfaEngineError::TotpEngineFault(fault.to_string()))
}

/**
 * Verifica un código contra la semilla, con la ventana de skew fija.
 */
pub fn verify_totp(secret_base32: &str, candidate_code: &str) -> Result<bool, MfaEngineError> {
    let engine = build_engine(secret_base32)?;
    let verdict = engine
        .check_current(candidate_code)
        .map_err(|_| MfaEngineError::ClockFault)?;

    if !verdict {
        debug!("🚫 [TOTP_REJECT]: Candidate code outside the skew window.");
    }
    Ok(verdict)
}

/// Código vigente para la semilla (prueba de posesión del enrolamiento).
pub fn current_totp_code(secret_base32: &str) -> Result<String, MfaEngineError> {
    let engine = build_engine(secret_base32)?;
    engine
        .generate_current()
        .map_err(|_| MfaEngineError::ClockFault)
}

// FIN DEL ARCHIVO [libs/domain/mfa/src/totp.rs]

// [libs/core/credential-engine/src/errors.rs]
/*!
 * =================================================================
 * APARATO: CREDENTIAL ERROR CATALOG (V1.1)
 * CLASIFICACIÓN: CORE SECURITY (ESTRATO L1)
 * RESPONSABILIDAD: FALLOS DEL ESCRUTINIO DE CREDENCIALES
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CredentialError {
    /// El oráculo de brechas no respondió; el escrutinio falla seguro.
    #[error("[L1_CREDENTIAL_FAULT]: BREACH_ORACLE_UNREACHABLE -> {0}")]
    OracleUnreachable(String),

    /// La credencial figura en el registro de brechas conocidas.
    #[error("[L1_CREDENTIAL_FAULT]: CREDENTIAL_BREACHED")]
    Breached,

    /// La credencial no alcanza el umbral mínimo de entropía.
    #[error("[L1_CREDENTIAL_FAULT]: ENTROPY_FLOOR_VIOLATION -> {observed_bits:.1} < {required_bits:.1}")]
    InsufficientEntropy {
        observed_bits: f64,
        required_bits: f64,
    },

    /// El forjador agotó sus intentos sin producir una passphrase apta.
    #[error("[L1_CREDENTIAL_FAULT]: FORGE_EXHAUSTION")]
    ForgeExhaustion,
}

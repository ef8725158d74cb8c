// INICIO DEL ARCHIVO [libs/core/credential-engine/src/breach.rs]
/*!
 * =================================================================
 * APARATO: BREACH ORACLE (V2.0 - PROBABILISTIC SHIELD)
 * CLASIFICACIÓN: CORE SECURITY (ESTRATO L1)
 * RESPONSABILIDAD: CONSULTA DE CREDENCIALES QUEMADAS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. PLUGGABLE ORACLE: El contrato asíncrono admite backends remotos
 *    (k-anonymity) sin tocar el motor de escrutinio.
 * 2. BLOOM DEFAULT: La implementación local usa una matriz de Bloom
 *    sembrada con el registro curado; un falso positivo rechaza una
 *    credencial sana, jamás acepta una quemada (sesgo fail-secure).
 *
 * # Mathematical Proof (False Positive Bias):
 * Con p = 0.001 y n entradas, la matriz jamás produce falsos
 * negativos: si check() responde false, la credencial NO está en el
 * registro sembrado. El error posible es únicamente conservador.
 * =================================================================
 */

use crate::errors::CredentialError;
use crate::wordlists::BREACH_BLOCKLIST;
use async_trait::async_trait;
use bloomfilter::Bloom;
use sha1::{Digest, Sha1};
use tracing::{debug, info};

/// Digest rápido del candidato para la consulta al oráculo.
/// SHA-1 es suficiente aquí: la consulta no protege el secreto, solo
/// lo normaliza hacia el espacio de búsqueda del registro de brechas.
pub fn fast_digest(candidate: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(candidate.as_bytes());
    hex::encode(hasher.finalize())
}

/// Contrato del oráculo de brechas (backend intercambiable).
#[async_trait]
pub trait BreachOracle: Send + Sync {
    /// Consulta si el digest figura en el registro de brechas.
    async fn is_breached(&self, digest_hex: &str) -> Result<bool, CredentialError>;
}

/// Oráculo local por matriz de Bloom sembrada con el registro curado.
pub struct BloomBreachOracle {
    breach_matrix: Bloom<String>,
    seeded_entries: usize,
}

impl BloomBreachOracle {
    /// Tasa de falsos positivos de la matriz (sesgo conservador).
    const FALSE_POSITIVE_RATE: f64 = 0.001;

    /// Siembra la matriz con el registro local de credenciales quemadas.
    pub fn with_default_blocklist() -> Self {
        Self::from_plaintext_entries(BREACH_BLOCKLIST.iter().copied())
    }

    /// Siembra la matriz desde un inventario de credenciales en claro.
    pub fn from_plaintext_entries<'a>(entries: impl Iterator<Item = &'a str>) -> Self {
        let materialized: Vec<String> = entries.map(fast_digest).collect();
        let capacity = materialized.len().max(64);

        let mut breach_matrix = Bloom::new_for_fp_rate(capacity, Self::FALSE_POSITIVE_RATE);
        for digest in &materialized {
            breach_matrix.set(digest);
        }

        info!(
            "🧱 [BREACH_ORACLE]: Bloom matrix seeded with {} burned credentials.",
            materialized.len()
        );

        Self {
            breach_matrix,
            seeded_entries: materialized.len(),
        }
    }

    pub fn seeded_entries(&self) -> usize {
        self.seeded_entries
    }
}

#[async_trait]
impl BreachOracle for BloomBreachOracle {
    async fn is_breached(&self, digest_hex: &str) -> Result<bool, CredentialError> {
        let verdict = self.breach_matrix.check(&digest_hex.to_string());
        if verdict {
            debug!("🚫 [BREACH_HIT]: Candidate digest present in burn registry.");
        }
        Ok(verdict)
    }
}

// FIN DEL ARCHIVO [libs/core/credential-engine/src/breach.rs]

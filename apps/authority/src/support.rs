// [apps/authority/src/support.rs]
/*!
 * =================================================================
 * APARATO: BOUNDARY SUPPORT TOOLKIT (V2.0)
 * CLASIFICACIÓN: APPLICATION SUPPORT (ESTRATO L1-APP)
 * RESPONSABILIDAD: GRAMÁTICA DE SCOPES Y REINTENTO TRANSITORIO
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. SINGLE RETRY: Un fallo transitorio se reintenta exactamente una
 *    vez con backoff exponencial corto; cualquier otra clase burbujea
 *    sin reintento.
 * 2. SCOPE GRAMMAR: Los scopes viajan como string separado por
 *    espacios (RFC 6749); aquí vive la única conversión.
 * =================================================================
 */

use crate::errors::AuthorityError;
use entativa_infra_cache::KeyValueStore;
use std::future::Future;
use std::time::Duration as StdDuration;
use tracing::warn;

/// Backoff base del reintento de frontera (se duplica por intento).
const RETRY_BACKOFF_BASE_MS: u64 = 120;

/**
 * Ejecuta una operación con un único reintento ante fallo transitorio.
 *
 * # Logic:
 * 1. Primer intento directo.
 * 2. Si el fallo es de clase Transient: espera el backoff y reintenta.
 * 3. El segundo fallo (de cualquier clase) burbujea sin más intentos.
 */
pub async fn with_transient_retry<T, F, Fut>(
    operation_label: &str,
    mut operation: F,
) -> Result<T, AuthorityError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AuthorityError>>,
{
    match operation().await {
        Err(first_fault) if first_fault.is_transient() => {
            warn!(
                "🔁 [BOUNDARY_RETRY]: Transient fault in [{}]; retrying once. Cause: {}",
                operation_label, first_fault
            );
            tokio::time::sleep(StdDuration::from_millis(RETRY_BACKOFF_BASE_MS * 2)).await;
            operation().await
        }
        outcome => outcome,
    }
}

// --- GRAMÁTICA DE SCOPES (RFC 6749 §3.3) ---

/// Tokeniza un scope string separado por espacios, preservando orden.
pub fn parse_scopes(scope_string: &str) -> Vec<String> {
    scope_string
        .split_whitespace()
        .map(|scope| scope.to_string())
        .collect()
}

/// Serializa la lista de scopes hacia la gramática de alambre.
pub fn join_scopes(scopes: &[String]) -> String {
    scopes.join(" ")
}

/// Verifica que `requested` sea subconjunto de `granted`.
pub fn scopes_are_subset(requested: &[String], granted: &[String]) -> bool {
    requested
        .iter()
        .all(|scope| granted.iter().any(|held| held == scope))
}

// --- CERROJO CONSULTIVO POR IDENTIDAD (§ modelo de concurrencia) ---

/// Lease del cerrojo consultivo (30 segundos).
const IDENTITY_LEASE_SECONDS: i64 = 30;
/// Intentos de adquisición antes de reportar contención.
const LEASE_ACQUISITION_ATTEMPTS: usize = 20;
/// Espera entre intentos de adquisición.
const LEASE_ACQUISITION_BACKOFF_MS: u64 = 50;

/// Cerrojo consultivo que serializa las escrituras de una identidad.
///
/// La física del lease vive en el KeyValueStore (put_if_absent con
/// TTL); la expiración del lease garantiza progreso ante poseedores
/// muertos. La liberación es explícita: no existe Drop asíncrono.
pub struct IdentityLease {
    cache: std::sync::Arc<dyn entativa_infra_cache::KeyValueStore>,
    lease_key: String,
    owner_token: String,
}

impl IdentityLease {
    /**
     * Adquiere el cerrojo de la identidad o reporta contención.
     *
     * # Errors:
     * - `AuthorityError::ServiceUnavailable`: el lease sigue tomado
     *   tras agotar los intentos (clase Transient).
     */
    pub async fn acquire(
        cache: std::sync::Arc<dyn entativa_infra_cache::KeyValueStore>,
        identity_id: uuid::Uuid,
    ) -> Result<Self, AuthorityError> {
        let lease_key = entativa_infra_cache::keys::identity_lock(identity_id);
        let owner_token = uuid::Uuid::new_v4().to_string();
        let lease_window = chrono::Duration::seconds(IDENTITY_LEASE_SECONDS);

        for _ in 0..LEASE_ACQUISITION_ATTEMPTS {
            let acquired = cache
                .put_if_absent(&lease_key, &owner_token, Some(lease_window))
                .await?;
            if acquired {
                return Ok(Self {
                    cache,
                    lease_key,
                    owner_token,
                });
            }
            tokio::time::sleep(StdDuration::from_millis(LEASE_ACQUISITION_BACKOFF_MS)).await;
        }

        Err(AuthorityError::ServiceUnavailable(
            "IDENTITY_LEASE_CONTENTION".to_string(),
        ))
    }

    /// Libera el cerrojo si este poseedor sigue siendo el titular.
    pub async fn release(self) {
        let _ = self
            .cache
            .release_if_owner(&self.lease_key, &self.owner_token)
            .await;
    }
}

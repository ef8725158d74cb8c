// [libs/infra/cache/src/store.rs]
/*!
 * =================================================================
 * APARATO: KEY-VALUE STORE CONTRACT (V2.1 - CAPABILITY SEAL)
 * CLASIFICACIÓN: INFRASTRUCTURE CONTRACT (ESTRATO L3)
 * RESPONSABILIDAD: CONTRATO OPACO GET/PUT/DEL CON TTL Y PRIMITIVAS ATÓMICAS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. CAPABILITY INTERFACE: El núcleo depende de este contrato y no de
 *    un backend; Redis/Valkey se inyectan desde el exterior.
 * 2. ATOMIC PRIMITIVES: increment y put_if_absent son la física de los
 *    contadores de ventana y de los cerrojos consultivos con lease.
 * 3. FAIL SEMANTICS: Toda operación puede reportar 'Unreachable'; el
 *    estrato superior decide si degrada al almacén durable.
 * =================================================================
 */

use crate::errors::CacheError;
use async_trait::async_trait;
use chrono::Duration;

/// Contrato del estrato efímero del núcleo de identidad.
///
/// Las implementaciones DEBEN garantizar atomicidad por llave en
/// `increment` y `put_if_absent`; el resto de operaciones son last-write-wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Recupera el payload vigente de la llave (None si no existe o expiró).
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Cristaliza un payload con TTL opcional (None = sin expiración).
    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Elimina la llave. Idempotente: borrar lo inexistente no es fallo.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Incremento atómico del contador de la llave.
    ///
    /// El TTL solo se aplica cuando el contador nace en esta operación,
    /// preservando la ventana deslizante original.
    async fn increment(&self, key: &str, ttl: Option<Duration>) -> Result<u64, CacheError>;

    /// Inserción atómica condicionada a ausencia (física del cerrojo lease).
    /// Retorna false si la llave ya posee un valor vigente.
    async fn put_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<bool, CacheError>;

    /// Libera un cerrojo nominal solo si el poseedor coincide.
    async fn release_if_owner(&self, key: &str, owner: &str) -> Result<bool, CacheError>;

    /// Purga entradas expiradas; retorna la cantidad recolectada.
    /// Los backends con expiración nativa pueden responder 0.
    async fn purge_expired(&self) -> Result<usize, CacheError>;
}

// [libs/infra/cache/src/errors.rs]
/*!
 * =================================================================
 * APARATO: CACHE ERROR CATALOG (V2.0 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DEL ESTRATO EFÍMERO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. TRANSIENT AWARENESS: 'Unreachable' habilita al estrato superior
 *    a degradar hacia el almacén durable (fallback autoritativo).
 * 2. PANOPTICON COMPLIANCE: Prefijos de estrato para el renderizado
 *    cromático en el libro mayor de seguridad.
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    /// El backend del estrato efímero no responde (red, proceso caído).
    /// El llamador debe degradar hacia el almacén durable.
    #[error("[L3_CACHE_NET_FAULT]: EPHEMERAL_UPLINK_SEVERED -> {0}")]
    Unreachable(String),

    /// El payload recuperado no pudo rehidratarse al tipo del dominio.
    #[error("[L3_CACHE_MAPPING_FAULT]: PAYLOAD_REHYDRATION_VIOLATION -> {0}")]
    MappingError(String),

    /// Fallo de serialización al cristalizar un valor del dominio.
    #[error("[L3_CACHE_MAPPING_FAULT]: PAYLOAD_CRYSTALLIZATION_VIOLATION -> {0}")]
    SerializationError(#[from] serde_json::Error),

    /// El cerrojo nominal ya pertenece a otro poseedor activo.
    #[error("[L3_CACHE_LOCK_FAULT]: LEASE_OWNERSHIP_VIOLATION")]
    LeaseConflict,
}

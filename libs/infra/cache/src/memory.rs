// INICIO DEL ARCHIVO [libs/infra/cache/src/memory.rs]
/*!
 * =================================================================
 * APARATO: IN-MEMORY EPHEMERAL ENGINE (V2.3 - TTL HARDENED)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: IMPLEMENTACIÓN DE REFERENCIA DEL KeyValueStore
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. LAZY EXPIRY + REAPER: La expiración se evalúa en cada lectura y
 *    un daemon de higiene (apps/authority) invoca purge_expired.
 * 2. SINGLE GUARD ATOMICITY: Un único RwLock por mapa garantiza que
 *    increment y put_if_absent sean indivisibles por llave.
 * 3. POISON CONTAINMENT: Un cerrojo envenenado se reporta como
 *    'Unreachable'; el estrato superior degrada al almacén durable.
 * =================================================================
 */

use crate::errors::CacheError;
use crate::store::KeyValueStore;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// Celda interna del mapa efímero.
#[derive(Debug, Clone)]
struct ValueCell {
    payload: String,
    expires_at: Option<DateTime<Utc>>,
}

impl ValueCell {
    fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|deadline| deadline > now).unwrap_or(true)
    }
}

/// Motor efímero en memoria del núcleo de identidad.
///
/// Implementación de referencia del contrato C1; en despliegues
/// federados se sustituye por un adaptador Redis externo.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    cells: RwLock<HashMap<String, ValueCell>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self {
            cells: RwLock::new(HashMap::with_capacity(256)),
        }
    }

    fn deadline_from(ttl: Option<Duration>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        ttl.map(|window| now + window)
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Utc::now();
        let cells_guard = self
            .cells
            .read()
            .map_err(|_| CacheError::Unreachable("POISONED_READ_GUARD".into()))?;

        Ok(cells_guard
            .get(key)
            .filter(|cell| cell.is_live_at(now))
            .map(|cell| cell.payload.clone()))
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let now = Utc::now();
        let mut cells_guard = self
            .cells
            .write()
            .map_err(|_| CacheError::Unreachable("POISONED_WRITE_GUARD".into()))?;

        cells_guard.insert(
            key.to_string(),
            ValueCell {
                payload: value.to_string(),
                expires_at: Self::deadline_from(ttl, now),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut cells_guard = self
            .cells
            .write()
            .map_err(|_| CacheError::Unreachable("POISONED_WRITE_GUARD".into()))?;
        cells_guard.remove(key);
        Ok(())
    }

    async fn increment(&self, key: &str, ttl: Option<Duration>) -> Result<u64, CacheError> {
        let now = Utc::now();
        let mut cells_guard = self
            .cells
            .write()
            .map_err(|_| CacheError::Unreachable("POISONED_WRITE_GUARD".into()))?;

        let next_count = match cells_guard.get(key).filter(|cell| cell.is_live_at(now)) {
            Some(cell) => {
                let current: u64 = cell.payload.parse().map_err(|_| {
                    CacheError::MappingError(format!("NON_NUMERIC_COUNTER_CELL: {}", key))
                })?;
                let bumped = current.saturating_add(1);
                // El TTL original de la ventana se preserva en el incremento.
                let inherited_deadline = cell.expires_at;
                cells_guard.insert(
                    key.to_string(),
                    ValueCell {
                        payload: bumped.to_string(),
                        expires_at: inherited_deadline,
                    },
                );
                bumped
            }
            None => {
                cells_guard.insert(
                    key.to_string(),
                    ValueCell {
                        payload: "1".to_string(),
                        expires_at: Self::deadline_from(ttl, now),
                    },
                );
                1
            }
        };

        Ok(next_count)
    }

    async fn put_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<bool, CacheError> {
        let now = Utc::now();
        let mut cells_guard = self
            .cells
            .write()
            .map_err(|_| CacheError::Unreachable("POISONED_WRITE_GUARD".into()))?;

        if cells_guard
            .get(key)
            .map(|cell| cell.is_live_at(now))
            .unwrap_or(false)
        {
            return Ok(false);
        }

        cells_guard.insert(
            key.to_string(),
            ValueCell {
                payload: value.to_string(),
                expires_at: Self::deadline_from(ttl, now),
            },
        );
        Ok(true)
    }

    async fn release_if_owner(&self, key: &str, owner: &str) -> Result<bool, CacheError> {
        let now = Utc::now();
        let mut cells_guard = self
            .cells
            .write()
            .map_err(|_| CacheError::Unreachable("POISONED_WRITE_GUARD".into()))?;

        let owns_lease = cells_guard
            .get(key)
            .filter(|cell| cell.is_live_at(now))
            .map(|cell| cell.payload == owner)
            .unwrap_or(false);

        if owns_lease {
            cells_guard.remove(key);
        }
        Ok(owns_lease)
    }

    async fn purge_expired(&self) -> Result<usize, CacheError> {
        let now = Utc::now();
        let mut cells_guard = self
            .cells
            .write()
            .map_err(|_| CacheError::Unreachable("POISONED_WRITE_GUARD".into()))?;

        let population_before_purge = cells_guard.len();
        cells_guard.retain(|_, cell| cell.is_live_at(now));
        let evicted = population_before_purge - cells_guard.len();

        if evicted > 0 {
            debug!("🧹 [EPHEMERAL_HYGIENE]: Evicted {} expired cells.", evicted);
        }
        Ok(evicted)
    }
}
// FIN DEL ARCHIVO [libs/infra/cache/src/memory.rs]

// INICIO DEL ARCHIVO [apps/authority/src/services/hygiene_reaper.rs]
/**
 * =================================================================
 * APARATO: THE HYGIENE REAPER (V3.0 - IDENTITY STRATA)
 * CLASIFICACIÓN: BACKGROUND INFRASTRUCTURE (ESTRATO L4)
 * RESPONSABILIDAD: HIGIENE PERPETUA DE CELDAS Y CÓDIGOS VENCIDOS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. EPHEMERAL SWEEP: Purga celdas expiradas del KeyValueStore
 *    (blacklists ya inertes, OTPs vencidos, pendientes extintos).
 * 2. CODE INCINERATION: Elimina códigos de autorización vencidos de
 *    la bóveda durable (terminal CODE_EXPIRED).
 * 3. ATOMICITY: La purga jamás interrumpe la emisión activa; cada
 *    barrido es una operación independiente con MissedTickBehavior
 *    Skip ante picos de carga.
 * =================================================================
 */

use crate::state::AppState;
use crate::clock::Clock;
use entativa_infra_cache::KeyValueStore;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

/// Frecuencia nominal del barrido de higiene (60 segundos).
const HYGIENE_SWEEP_INTERVAL_SECONDS: u64 = 60;

/**
 * Inicia el daemon de limpieza perpetua en el runtime de Tokio.
 *
 * # Performance:
 * El ciclo de 60 segundos está sintonizado para minimizar el jitter
 * en los hilos de emisión mientras mantiene los almacenes libres de
 * material vencido.
 *
 * @param application_state Referencia al estado neural inyectado.
 */
pub async fn spawn_hygiene_reaper(application_state: AppState) {
    let mut maintenance_ticker = interval(Duration::from_secs(HYGIENE_SWEEP_INTERVAL_SECONDS));
    maintenance_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tokio::spawn(async move {
        info!("💀 [REAPER_ACTIVE]: Identity hygiene daemon initiated.");

        loop {
            maintenance_ticker.tick().await;

            // 1. PURGA DEL ESTRATO EFÍMERO
            match application_state.cache.purge_expired().await {
                Ok(evicted_cells) if evicted_cells > 0 => {
                    info!(
                        "💀 [REAPER_CLEANUP]: Evicted {} expired ephemeral cells.",
                        evicted_cells
                    );
                }
                Ok(_) => {}
                Err(cache_fault) => {
                    error!("❌ [REAPER_FAULT]: Ephemeral sweep collapsed: {}", cache_fault);
                }
            }

            // 2. INCINERACIÓN DE CÓDIGOS VENCIDOS (terminal CODE_EXPIRED)
            let now = application_state.clock.now();
            match application_state
                .token_repository
                .prune_expired_codes(now)
                .await
            {
                Ok(incinerated_codes) if incinerated_codes > 0 => {
                    info!(
                        "🎟️ [REAPER_CLEANUP]: Incinerated {} expired authorization codes.",
                        incinerated_codes
                    );
                }
                Ok(_) => {}
                Err(vault_fault) => {
                    error!("❌ [REAPER_FAULT]: Code incineration collapsed: {}", vault_fault);
                }
            }
        }
    });
}
// FIN DEL ARCHIVO [apps/authority/src/services/hygiene_reaper.rs]

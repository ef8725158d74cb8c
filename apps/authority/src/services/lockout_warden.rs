// INICIO DEL ARCHIVO [apps/authority/src/services/lockout_warden.rs]
/*!
 * =================================================================
 * APARATO: LOCKOUT RELEASE WARDEN (V1.2 - SELF-HEALING)
 * CLASIFICACIÓN: BACKGROUND INFRASTRUCTURE SERVICE (ESTRATO L4)
 * RESPONSABILIDAD: AUTO-CURACIÓN PROACTIVA DE VETOS VENCIDOS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. PROACTIVE RESTORATION: La expiración del veto se evalúa
 *    perezosamente en cada login; este guardián la materializa en
 *    el Motor A para que el inventario de identidades nunca exhiba
 *    filas 'locked' con el veto ya lapsado.
 * 2. LEDGER HEARTBEAT: Cada ciclo abre con un latido del enlace;
 *    un libro mayor inalcanzable emite señal CRITICAL y suspende el
 *    barrido hasta el próximo tick (jamás degrada a liberar a ciegas).
 * 3. ADMIN IMMUNITY: Un Locked sin locked_until es bloqueo
 *    administrativo: el guardián no lo toca.
 * =================================================================
 */

use crate::clock::Clock;
use crate::state::AppState;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, instrument};

/// Frecuencia nominal del escrutinio de vetos (30 segundos).
const VETO_SCAN_INTERVAL_SECONDS: u64 = 30;

/**
 * Guardián del ciclo de vida de los vetos temporales de autenticación.
 */
pub struct LockoutReleaseWarden {
    /// Referencia compartida al sistema nervioso central de la Autoridad.
    application_state: AppState,
}

impl LockoutReleaseWarden {
    /**
     * Construye una nueva instancia del guardián de vetos.
     *
     * @param application_state Estado maestro inyectado por el Kernel.
     */
    pub fn new(application_state: AppState) -> Self {
        Self { application_state }
    }

    /**
     * Inicia el daemon de vigilancia perpetua en el reactor de Tokio.
     * Implementa 'MissedTickBehavior::Skip' para resiliencia ante picos.
     */
    #[instrument(skip(self))]
    pub async fn spawn_warden_daemon(self) {
        let mut veto_ticker = interval(Duration::from_secs(VETO_SCAN_INTERVAL_SECONDS));
        veto_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tokio::spawn(async move {
            info!(
                "🛡️ [LOCKOUT_WARDEN]: Veto self-healing active. Frequency: {}s",
                VETO_SCAN_INTERVAL_SECONDS
            );

            loop {
                veto_ticker.tick().await;

                // 1. LATIDO DEL LIBRO MAYOR
                if let Err(heartbeat_fault) = self.application_state.database_client.ping().await {
                    error!(
                        "🚨 [WARDEN_FAULT]: Identity ledger heartbeat collapsed; sweep suspended. Cause: {}",
                        heartbeat_fault
                    );
                    continue;
                }

                // 2. LIBERACIÓN DE VETOS VENCIDOS
                let now = self.application_state.clock.now();
                match self
                    .application_state
                    .identity_repository
                    .release_lapsed_lockouts(now)
                    .await
                {
                    Ok(restored_identities) if !restored_identities.is_empty() => {
                        info!(
                            "♻️ [LOCKOUT_WARDEN]: {} lapsed vetoes released; identities restored to active.",
                            restored_identities.len()
                        );
                        for identity_id in &restored_identities {
                            debug!("  ↳ Veto lifted for identity [{}].", identity_id);
                        }
                    }
                    Ok(_) => {}
                    Err(sweep_fault) => {
                        error!(
                            "❌ [WARDEN_FAULT]: Veto release sweep collapsed: {}",
                            sweep_fault
                        );
                    }
                }
            }
        });
    }
}
// FIN DEL ARCHIVO [apps/authority/src/services/lockout_warden.rs]

// [apps/authority/src/clock.rs]
/*!
 * =================================================================
 * APARATO: INJECTED CLOCK (V1.2)
 * CLASIFICACIÓN: APPLICATION SUPPORT (ESTRATO L1-APP)
 * RESPONSABILIDAD: FUENTE ÚNICA DE TIEMPO DEL CONTEXTO
 *
 * VISION HIPER-HOLÍSTICA:
 * Todo cálculo temporal (expiraciones, ventanas, lockouts) consulta
 * el reloj del AppState; jamás Utc::now() directo en los servicios.
 * FrozenClock habilita el control determinista del tiempo en el
 * Proving Grounds.
 * =================================================================
 */

use chrono::{DateTime, Duration, Utc};
use std::sync::RwLock;

/// Contrato de la fuente de tiempo del contexto de aplicación.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Reloj de producción: delega en el reloj del sistema.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Reloj congelado y desplazable para el Proving Grounds.
pub struct FrozenClock {
    frozen_instant: RwLock<DateTime<Utc>>,
}

impl FrozenClock {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self {
            frozen_instant: RwLock::new(instant),
        }
    }

    /// Desplaza el tiempo congelado hacia adelante.
    pub fn advance(&self, delta: Duration) {
        if let Ok(mut guard) = self.frozen_instant.write() {
            *guard = *guard + delta;
        }
    }
}

impl Clock for FrozenClock {
    fn now(&self) -> DateTime<Utc> {
        self.frozen_instant
            .read()
            .map(|guard| *guard)
            .unwrap_or_else(|_| Utc::now())
    }
}

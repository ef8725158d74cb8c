// INICIO DEL ARCHIVO [apps/authority/src/services/rate_limiter.rs]
/*!
 * =================================================================
 * APARATO: SLIDING WINDOW RATE LIMITER (V3.1)
 * CLASIFICACIÓN: SECURITY STRATUM (ESTRATO L4)
 * RESPONSABILIDAD: VENTANAS POR (IDENTIDAD, ACCIÓN) Y (IP, ENDPOINT)
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. COUNTER PHYSICS: Cada ventana es un contador atómico del
 *    KeyValueStore bajo rate:{action}:{subject} con TTL = ventana;
 *    el TTL original se preserva en cada incremento.
 * 2. CONTRACT TABLE: login 5/15min, register 3/24h, password-reset
 *    3/h, email 10/h, SMS 5/h + 20/día.
 * 3. FAIL POLICY: Un caché inalcanzable degrada a disponible con
 *    alerta; el rate limiting es defensa en profundidad, no la
 *    frontera de seguridad primaria.
 * =================================================================
 */

use crate::errors::AuthorityError;
use crate::state::AppState;
use chrono::Duration;
use entativa_infra_cache::keys;
use entativa_infra_cache::KeyValueStore;
use tracing::{instrument, warn};

/// Acción limitada y su ventana contractual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitedAction {
    Login,
    Register,
    PasswordReset,
    EmailSend,
    SmsSend,
    SmsSendDaily,
}

impl LimitedAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Register => "register",
            Self::PasswordReset => "password_reset",
            Self::EmailSend => "email_send",
            Self::SmsSend => "sms_send",
            Self::SmsSendDaily => "sms_send_daily",
        }
    }

    /// (tope, ventana) contractual de la acción.
    pub fn contract(&self) -> (u64, Duration) {
        match self {
            Self::Login => (5, Duration::minutes(15)),
            Self::Register => (3, Duration::hours(24)),
            Self::PasswordReset => (3, Duration::hours(1)),
            Self::EmailSend => (10, Duration::hours(1)),
            Self::SmsSend => (5, Duration::hours(1)),
            Self::SmsSendDaily => (20, Duration::hours(24)),
        }
    }
}

/// Custodio de ventanas deslizantes del núcleo.
pub struct RateLimiter {
    application_state: AppState,
}

impl RateLimiter {
    pub fn new(application_state: AppState) -> Self {
        Self { application_state }
    }

    /**
     * Consume una unidad de la ventana; veta al exceder el tope.
     *
     * # Errors:
     * - `AuthorityError::RateLimited`: ventana agotada (clase Policy).
     */
    #[instrument(skip(self), fields(action = action.as_str(), subject = %subject))]
    pub async fn consume(
        &self,
        action: LimitedAction,
        subject: &str,
    ) -> Result<(), AuthorityError> {
        let (ceiling, window) = action.contract();
        let window_key = keys::rate(action.as_str(), subject);

        let observed_count = match self
            .application_state
            .cache
            .increment(&window_key, Some(window))
            .await
        {
            Ok(count) => count,
            Err(cache_fault) => {
                // Defensa en profundidad: sin caché la ventana degrada a abierta.
                warn!(
                    "⚠️ [RATE_DEGRADED]: Window [{}] unavailable; admitting request. Cause: {}",
                    window_key, cache_fault
                );
                return Ok(());
            }
        };

        if observed_count > ceiling {
            warn!(
                "⛔ [RATE_VETO]: Window [{}] exhausted ({}/{}).",
                window_key, observed_count, ceiling
            );
            return Err(AuthorityError::RateLimited {
                action: action.as_str().to_string(),
                retry_after_seconds: window.num_seconds() as u64,
            });
        }

        Ok(())
    }

    /// Ventana dual del canal SMS: tope horario Y tope diario.
    pub async fn consume_sms(&self, subject: &str) -> Result<(), AuthorityError> {
        self.consume(LimitedAction::SmsSend, subject).await?;
        self.consume(LimitedAction::SmsSendDaily, subject).await
    }
}
// FIN DEL ARCHIVO [apps/authority/src/services/rate_limiter.rs]

// INICIO DEL ARCHIVO [apps/authority/src/services/notification_dispatcher.rs]
/*!
 * =================================================================
 * APARATO: HERALD DISPATCHER (V3.0 - CHANNEL WINDOWS)
 * CLASIFICACIÓN: APPLICATION SERVICES (ESTRATO L4)
 * RESPONSABILIDAD: DESPACHO RATE-LIMITED HACIA CANALES EXTERNOS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. WINDOW GATE: email 10/h; SMS 5/h y 20/día por destinatario.
 *    El veto de ventana se audita como evento de seguridad.
 * 2. CAPABILITY DELEGATION: La entrega física es del sink inyectado;
 *    el despachador solo custodia política y rastro.
 * =================================================================
 */

use crate::errors::AuthorityError;
use crate::services::audit_recorder::AuditRecorder;
use crate::services::rate_limiter::{LimitedAction, RateLimiter};
use crate::state::AppState;
use crate::clock::Clock;
use entativa_domain_models::audit::{AuditAction, AuditEvent, LawfulBasis};
use entativa_domain_notification::{NotificationChannel, NotificationError, NotificationPayload};
use entativa_domain_notification::NotificationSink;
use tracing::instrument;
use uuid::Uuid;

/// Despachador de autoridad única hacia los canales externos.
pub struct NotificationDispatcher {
    application_state: AppState,
}

impl NotificationDispatcher {
    pub fn new(application_state: AppState) -> Self {
        Self { application_state }
    }

    /**
     * Despacha una señal con compuerta de ventana por canal.
     *
     * # Errors:
     * - `AuthorityError::RateLimited`: ventana del canal agotada.
     * - `AuthorityError::ServiceUnavailable`: el canal externo no
     *   respondió (clase Transient; reintentable en la frontera).
     */
    #[instrument(skip(self, payload), fields(channel = channel.as_str(), kind = payload.kind.as_str()))]
    pub async fn dispatch(
        &self,
        channel: NotificationChannel,
        payload: NotificationPayload,
        identity_id: Option<Uuid>,
    ) -> Result<(), AuthorityError> {
        let now = self.application_state.clock.now();
        let rate_limiter = RateLimiter::new(self.application_state.clone());
        let recorder = AuditRecorder::new(self.application_state.clone());

        // 1. COMPUERTA DE VENTANA POR CANAL
        let window_outcome = match channel {
            NotificationChannel::Email => {
                rate_limiter
                    .consume(LimitedAction::EmailSend, &payload.recipient)
                    .await
            }
            NotificationChannel::Sms => rate_limiter.consume_sms(&payload.recipient).await,
            NotificationChannel::Push => Ok(()),
        };

        if let Err(window_veto) = window_outcome {
            let mut event = AuditEvent::forge(
                AuditAction::NotificationRateLimited,
                LawfulBasis::LegitimateInterest,
                now,
            )
            .with_detail("kind", payload.kind.as_str().to_string())
            .with_detail("channel", channel.as_str().to_string());
            if let Some(identity_id) = identity_id {
                event = event.with_identity(identity_id);
            }
            recorder.record(event).await;
            return Err(window_veto);
        }

        // 2. ENTREGA DELEGADA AL SINK EXTERNO
        self.application_state
            .notification_sink
            .send(channel, &payload)
            .await
            .map_err(|delivery_fault| match delivery_fault {
                NotificationError::ChannelUnreachable(detail) => {
                    AuthorityError::ServiceUnavailable(detail)
                }
                NotificationError::DeliveryRejected(detail) => AuthorityError::InputViolation {
                    field: "recipient".to_string(),
                    violation: detail,
                },
            })?;

        // 3. RASTRO DE CUMPLIMIENTO
        let mut event = AuditEvent::forge(
            AuditAction::NotificationDispatched,
            LawfulBasis::LegitimateInterest,
            now,
        )
        .with_detail("kind", payload.kind.as_str().to_string())
        .with_detail("channel", channel.as_str().to_string());
        if let Some(identity_id) = identity_id {
            event = event.with_identity(identity_id);
        }
        recorder.record(event).await;

        Ok(())
    }
}
// FIN DEL ARCHIVO [apps/authority/src/services/notification_dispatcher.rs]

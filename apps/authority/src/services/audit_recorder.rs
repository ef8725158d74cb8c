// INICIO DEL ARCHIVO [apps/authority/src/services/audit_recorder.rs]
/*!
 * =================================================================
 * APARATO: AUDIT RECORDER SERVICE (V3.0 - PANOPTICON FEED)
 * CLASIFICACIÓN: SECURITY STRATUM (ESTRATO L4)
 * RESPONSABILIDAD: REGISTRO APPEND-ONLY DE EVENTOS DE SEGURIDAD
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. DUAL TRAIL: Cada evento cristaliza en el Motor A y se espeja
 *    como traza estructurada para la ingesta en vivo.
 * 2. NEVER BLOCKING: Un colapso del ledger degrada a trazas de error
 *    pero JAMÁS aborta la operación de negocio que lo originó.
 * =================================================================
 */

use crate::state::AppState;
use entativa_domain_models::audit::AuditEvent;
use tracing::{error, info, instrument};

/// Registrador de autoridad única del libro de seguridad.
pub struct AuditRecorder {
    application_state: AppState,
}

impl AuditRecorder {
    pub fn new(application_state: AppState) -> Self {
        Self { application_state }
    }

    /**
     * Apéndice best-effort: el fallo del ledger se reporta pero no
     * interrumpe el flujo de negocio que lo originó.
     */
    #[instrument(skip(self, event), fields(action = event.action.as_str()))]
    pub async fn record(&self, event: AuditEvent) {
        info!(
            action = event.action.as_str(),
            identity = ?event.identity_id,
            lawful_basis = event.lawful_basis.as_str(),
            "🧾 [AUDIT_TRAIL]: {}",
            event.action.as_str()
        );

        if let Err(ledger_fault) = self.application_state.audit_repository.append(&event).await {
            error!(
                "❌ [AUDIT_FAULT]: Security ledger append collapsed: {}",
                ledger_fault
            );
        }
    }
}
// FIN DEL ARCHIVO [apps/authority/src/services/audit_recorder.rs]

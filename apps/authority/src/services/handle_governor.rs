// INICIO DEL ARCHIVO [apps/authority/src/services/handle_governor.rs]
/*!
 * =================================================================
 * APARATO: HANDLE SOVEREIGNTY GOVERNOR (V5.2 - FAIL-SECURE SEALED)
 * CLASIFICACIÓN: GOVERNANCE STRATUM (ESTRATO L4)
 * RESPONSABILIDAD: ESCRUTINIO ANTI-SUPLANTACIÓN Y WORKFLOW DE RESERVAS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. LOOKUP LADDER: reserved_handles -> coincidencia exacta por
 *    categoría -> escaneo difuso sobre el snapshot read-mostly.
 * 2. FAIL SECURE: Un registro inalcanzable produce protected=true
 *    (kind SYSTEM). Política deliberada: la indisponibilidad del
 *    registro bloquea TODOS los handles.
 * 3. VERDICT CACHE: Los veredictos sanos se cachean 2 h bajo
 *    protection:{handle-normalizado}; los fail-secure JAMÁS se
 *    cachean para no envenenar la ventana.
 * 4. ALTERNATIVE FORGE: Candidatos de remediación filtrados por
 *    disponibilidad real, tope 5.
 * =================================================================
 */

use crate::errors::AuthorityError;
use crate::services::audit_recorder::AuditRecorder;
use crate::state::AppState;
use crate::clock::Clock;
use chrono::Datelike;
use entativa_domain_governance::{
    forge_alternative_candidates, normalize_and_validate, scan_registry,
};
use entativa_domain_models::audit::{AuditAction, AuditEvent, LawfulBasis};
use entativa_domain_models::identity::VerificationStatus;
use entativa_domain_models::protected_entity::{
    ProtectedEntity, ProtectionKind, ProtectionVerdict,
};
use entativa_domain_models::reservation::{ReservationRequest, ReservationStatus};
use entativa_domain_models::VerificationBadge;
use entativa_infra_cache::keys;
use entativa_infra_cache::KeyValueStore;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Tope contractual de alternativas sugeridas.
const MAX_SUGGESTED_ALTERNATIVES: usize = 5;

/// Gobernador de autoridad única del namespace de handles.
pub struct HandleGovernor {
    application_state: AppState,
}

impl HandleGovernor {
    pub fn new(application_state: AppState) -> Self {
        Self { application_state }
    }

    /**
     * Escrutinio completo de protección de un handle.
     *
     * # Logic:
     * 1. Normalización sintáctica (las violaciones son clase Input).
     * 2. Veredicto cacheado bajo protection:{h} si existe.
     * 3. Escalera de lookup; cualquier colapso -> fail-secure.
     * 4. Cacheo del veredicto sano por 2 horas.
     */
    #[instrument(skip(self), fields(handle = %raw_handle))]
    pub async fn check_handle(&self, raw_handle: &str) -> Result<ProtectionVerdict, AuthorityError> {
        let normalized = normalize_and_validate(raw_handle)?;

        // 1. PROYECCIÓN CACHEADA
        let cache_key = keys::protection(&normalized);
        if let Ok(Some(cached_payload)) = self.application_state.cache.get(&cache_key).await {
            if let Ok(verdict) = serde_json::from_str::<ProtectionVerdict>(&cached_payload) {
                return Ok(verdict);
            }
        }

        // 2. ESCALERA DE LOOKUP CON POLÍTICA FAIL-SECURE
        let verdict = match self.compute_verdict(&normalized).await {
            Ok(verdict) => verdict,
            Err(lookup_fault) => {
                warn!(
                    "🛑 [FAIL_SECURE]: Protection registry unreachable for [{}]; denying. Cause: {}",
                    normalized, lookup_fault
                );
                let recorder = AuditRecorder::new(self.application_state.clone());
                recorder
                    .record(
                        AuditEvent::forge(
                            AuditAction::ProtectionLookupFailed,
                            LawfulBasis::LegitimateInterest,
                            self.application_state.clock.now(),
                        )
                        .with_detail("handle", normalized.clone())
                        .with_detail("fault", lookup_fault.to_string()),
                    )
                    .await;
                // El veredicto fail-secure no se cachea: un parpadeo del
                // registro no puede envenenar la ventana de 2 horas.
                return Ok(ProtectionVerdict::fail_secure("PROTECTION_REGISTRY_UNREACHABLE"));
            }
        };

        // 3. CRISTALIZACIÓN DEL VEREDICTO SANO (TTL 2 h)
        if let Ok(payload) = serde_json::to_string(&verdict) {
            let _ = self
                .application_state
                .cache
                .put(
                    &cache_key,
                    &payload,
                    Some(self.application_state.config.protection_cache_ttl()),
                )
                .await;
        }

        Ok(verdict)
    }

    /// Disponibilidad integral: sintaxis + no tomado + no protegido.
    pub async fn is_available(&self, raw_handle: &str) -> Result<bool, AuthorityError> {
        let normalized = normalize_and_validate(raw_handle)?;

        if self
            .application_state
            .identity_repository
            .eid_exists(&normalized)
            .await?
        {
            return Ok(false);
        }

        let verdict = self.check_handle(&normalized).await?;
        Ok(!verdict.protected)
    }

    // --- WORKFLOW DE RESERVAS ---

    /**
     * Envío de una reclamación de handle.
     *
     * # Atomicity:
     * La unicidad 'una reserva viva por (identidad, handle)' la
     * custodia el índice parcial del Motor A; el INSERT es la
     * verificación y la inserción en una sola ráfaga.
     */
    #[instrument(skip(self, justification, evidence_uris))]
    pub async fn submit_reservation(
        &self,
        identity_id: Uuid,
        raw_handle: &str,
        justification: String,
        evidence_uris: Vec<String>,
    ) -> Result<ReservationRequest, AuthorityError> {
        let normalized = normalize_and_validate(raw_handle)?;

        if justification.trim().len() < 20 {
            return Err(AuthorityError::InputViolation {
                field: "justification".to_string(),
                violation: "JUSTIFICATION_TOO_SHORT (min 20 chars)".to_string(),
            });
        }

        // El veredicto acompaña a la moderación; no gatea el envío.
        let verdict = self.check_handle(&normalized).await?;

        let now = self.application_state.clock.now();
        let reservation = ReservationRequest {
            id: Uuid::new_v4(),
            identity_id,
            requested_handle: normalized.clone(),
            justification,
            evidence_uris,
            status: ReservationStatus::Pending,
            reviewer_id: None,
            review_reason: None,
            appeal_justification: None,
            created_at: now,
            reviewed_at: None,
            appealed_at: None,
            updated_at: now,
        };

        self.application_state
            .reservation_repository
            .submit(&reservation)
            .await?;

        let recorder = AuditRecorder::new(self.application_state.clone());
        recorder
            .record(
                AuditEvent::forge(AuditAction::ReservationSubmitted, LawfulBasis::Contract, now)
                    .with_identity(identity_id)
                    .with_actor(identity_id)
                    .with_detail("handle", normalized)
                    .with_detail("reservation_id", reservation.id.to_string())
                    .with_detail("protected", verdict.protected.to_string()),
            )
            .await;

        Ok(reservation)
    }

    /**
     * Dictamen del moderador sobre una reclamación.
     *
     * # Logic (aprobación):
     * 1. Sella el dictamen con guardia de estado.
     * 2. Asigna insignia y estado verificado si corresponde.
     * 3. Reescribe el eid (con rastro histórico) si fue solicitado.
     * 4. Invalida el veredicto cacheado del handle.
     */
    #[instrument(skip(self, review_reason))]
    pub async fn review_reservation(
        &self,
        reservation_id: Uuid,
        reviewer_id: Uuid,
        approved: bool,
        review_reason: Option<String>,
        badge_on_approval: Option<VerificationBadge>,
        rewrite_eid_on_approval: bool,
    ) -> Result<ReservationRequest, AuthorityError> {
        let now = self.application_state.clock.now();
        let verdict_status = if approved {
            ReservationStatus::Approved
        } else {
            ReservationStatus::Rejected
        };

        let reservation = self
            .application_state
            .reservation_repository
            .review(
                reservation_id,
                reviewer_id,
                verdict_status,
                review_reason.as_deref(),
                now,
            )
            .await?;

        let recorder = AuditRecorder::new(self.application_state.clone());

        if approved {
            if let Some(badge) = badge_on_approval {
                self.application_state
                    .identity_repository
                    .assign_verification(
                        reservation.identity_id,
                        VerificationStatus::Verified,
                        Some(badge),
                        now,
                    )
                    .await?;
            }

            if rewrite_eid_on_approval {
                let identity = self
                    .application_state
                    .identity_repository
                    .fetch_by_id(reservation.identity_id)
                    .await?
                    .ok_or(AuthorityError::InvalidCredentials)?;

                let previous_eid = identity.eid.clone();
                self.application_state
                    .identity_repository
                    .rewrite_eid(
                        reservation.identity_id,
                        &previous_eid,
                        &reservation.requested_handle,
                        "reservation_approved",
                        now,
                    )
                    .await?;

                recorder
                    .record(
                        AuditEvent::forge(AuditAction::HandleChanged, LawfulBasis::Contract, now)
                            .with_identity(reservation.identity_id)
                            .with_actor(reviewer_id)
                            .with_detail("previous_eid", previous_eid)
                            .with_detail("new_eid", reservation.requested_handle.clone())
                            .with_detail("reason", "reservation_approved"),
                    )
                    .await;
            }

            // El handle acaba de cambiar de dueño efectivo.
            let _ = self
                .application_state
                .cache
                .delete(&keys::protection(&reservation.requested_handle))
                .await;
        }

        let audit_action = if approved {
            AuditAction::ReservationApproved
        } else {
            AuditAction::ReservationRejected
        };
        recorder
            .record(
                AuditEvent::forge(audit_action, LawfulBasis::Contract, now)
                    .with_identity(reservation.identity_id)
                    .with_actor(reviewer_id)
                    .with_detail("handle", reservation.requested_handle.clone())
                    .with_detail("reservation_id", reservation.id.to_string())
                    .with_detail(
                        "reason",
                        review_reason.unwrap_or_else(|| "<none>".to_string()),
                    ),
            )
            .await;

        info!(
            "⚖️ [GOVERNOR_VERDICT]: Reservation {} resolved ({}).",
            reservation.id,
            if approved { "approved" } else { "rejected" }
        );
        Ok(reservation)
    }

    /**
     * Apelación única dentro de la ventana de 30 días post-rechazo.
     */
    #[instrument(skip(self, appeal_justification))]
    pub async fn appeal_reservation(
        &self,
        reservation_id: Uuid,
        identity_id: Uuid,
        appeal_justification: String,
    ) -> Result<ReservationRequest, AuthorityError> {
        let now = self.application_state.clock.now();

        let reservation = self
            .application_state
            .reservation_repository
            .fetch(reservation_id)
            .await?
            .ok_or(AuthorityError::ReservationStateConflict)?;

        if reservation.identity_id != identity_id {
            return Err(AuthorityError::ReservationStateConflict);
        }
        if !reservation.can_appeal_at(now) {
            return Err(AuthorityError::ReservationStateConflict);
        }

        let appealed = self
            .application_state
            .reservation_repository
            .appeal(reservation_id, &appeal_justification, now)
            .await?;

        let recorder = AuditRecorder::new(self.application_state.clone());
        recorder
            .record(
                AuditEvent::forge(AuditAction::ReservationAppealed, LawfulBasis::Contract, now)
                    .with_identity(identity_id)
                    .with_actor(identity_id)
                    .with_detail("handle", appealed.requested_handle.clone())
                    .with_detail("reservation_id", appealed.id.to_string()),
            )
            .await;

        Ok(appealed)
    }

    /// Retiro voluntario de una reclamación pendiente.
    pub async fn withdraw_reservation(
        &self,
        reservation_id: Uuid,
        identity_id: Uuid,
    ) -> Result<(), AuthorityError> {
        let now = self.application_state.clock.now();
        self.application_state
            .reservation_repository
            .withdraw(reservation_id, identity_id, now)
            .await?;

        let recorder = AuditRecorder::new(self.application_state.clone());
        recorder
            .record(
                AuditEvent::forge(AuditAction::ReservationWithdrawn, LawfulBasis::Contract, now)
                    .with_identity(identity_id)
                    .with_actor(identity_id)
                    .with_detail("reservation_id", reservation_id.to_string()),
            )
            .await;
        Ok(())
    }

    // --- ADMINISTRACIÓN DEL REGISTRO ---

    /// Inserta una entidad protegida e invalida las vistas derivadas.
    pub async fn register_protected_entity(
        &self,
        entity: &ProtectedEntity,
    ) -> Result<(), AuthorityError> {
        self.application_state
            .protection_repository
            .insert_protected(entity)
            .await?;

        self.application_state.invalidate_protection_snapshot();
        let _ = self
            .application_state
            .cache
            .delete(&keys::protection(&entity.canonical_handle))
            .await;
        Ok(())
    }

    // --- FÍSICA INTERNA ---

    async fn compute_verdict(&self, normalized: &str) -> Result<ProtectionVerdict, AuthorityError> {
        // (a) RESERVAS DEL SISTEMA
        if let Some(reason) = self
            .application_state
            .protection_repository
            .reserved_reason(normalized)
            .await?
        {
            return Ok(ProtectionVerdict {
                protected: true,
                protection_kind: Some(ProtectionKind::System),
                category: None,
                reason: Some(reason),
                suggested_alternatives: self.forge_available_alternatives(normalized).await,
                requires_verification: false,
                similarity_score: None,
            });
        }

        // (b) COINCIDENCIA EXACTA POR CATEGORÍA (orden fijo)
        if let Some(entity) = self
            .application_state
            .protection_repository
            .fetch_exact_canonical(normalized)
            .await?
        {
            return Ok(ProtectionVerdict {
                protected: true,
                protection_kind: Some(ProtectionKind::Exact),
                category: Some(entity.category),
                reason: Some(format!("Reserved for {}", entity.display_name)),
                suggested_alternatives: self.forge_available_alternatives(normalized).await,
                requires_verification: entity.requires_verification,
                similarity_score: None,
            });
        }

        // (c) ESCANEO DIFUSO SOBRE EL SNAPSHOT
        let snapshot = self.acquire_snapshot().await?;
        let threshold = self.application_state.config.handle_similarity_threshold;

        if let Some(hit) = scan_registry(normalized, &snapshot, threshold) {
            let entity = &snapshot[hit.entity_index];
            return Ok(ProtectionVerdict {
                protected: true,
                protection_kind: Some(hit.kind),
                category: Some(entity.category),
                reason: Some(format!(
                    "Too similar to protected entity {} ('{}')",
                    entity.display_name, hit.matched_term
                )),
                suggested_alternatives: self.forge_available_alternatives(normalized).await,
                requires_verification: entity.requires_verification,
                similarity_score: (hit.similarity < 1.0).then_some(hit.similarity),
            });
        }

        Ok(ProtectionVerdict::clear())
    }

    /// Snapshot read-mostly del registro; se hidrata perezosamente.
    async fn acquire_snapshot(&self) -> Result<Vec<ProtectedEntity>, AuthorityError> {
        if let Ok(snapshot_guard) = self.application_state.protection_snapshot.read() {
            if let Some(snapshot) = snapshot_guard.as_ref() {
                return Ok(snapshot.clone());
            }
        }

        // La carga es frontera de componente: un fallo transitorio
        // admite exactamente un reintento antes de burbujear.
        let fresh_snapshot = crate::support::with_transient_retry("protection_registry_load", || async {
            self.application_state
                .protection_repository
                .load_registry()
                .await
                .map_err(AuthorityError::from)
        })
        .await?;

        if let Ok(mut snapshot_guard) = self.application_state.protection_snapshot.write() {
            *snapshot_guard = Some(fresh_snapshot.clone());
        }
        Ok(fresh_snapshot)
    }

    /// Candidatos de remediación filtrados por disponibilidad real.
    async fn forge_available_alternatives(&self, normalized: &str) -> Vec<String> {
        let current_year = self.application_state.clock.now().year();
        let candidates = forge_alternative_candidates(normalized, current_year);

        let mut available = Vec::with_capacity(MAX_SUGGESTED_ALTERNATIVES);
        for candidate in candidates {
            if available.len() >= MAX_SUGGESTED_ALTERNATIVES {
                break;
            }

            let taken = self
                .application_state
                .identity_repository
                .eid_exists(&candidate)
                .await
                .unwrap_or(true);
            if taken {
                continue;
            }

            let verdict = self.compute_candidate_verdict(&candidate).await;
            if !verdict {
                available.push(candidate);
            }
        }
        available
    }

    /// Escrutinio liviano de un candidato (sin cacheo ni recursión de
    /// alternativas). true = protegido.
    async fn compute_candidate_verdict(&self, candidate: &str) -> bool {
        if let Ok(Some(_)) = self
            .application_state
            .protection_repository
            .reserved_reason(candidate)
            .await
        {
            return true;
        }

        if let Ok(Some(_)) = self
            .application_state
            .protection_repository
            .fetch_exact_canonical(candidate)
            .await
        {
            return true;
        }

        if let Ok(snapshot) = self.acquire_snapshot().await {
            let threshold = self.application_state.config.handle_similarity_threshold;
            return scan_registry(candidate, &snapshot, threshold).is_some();
        }

        // Registro inalcanzable: el candidato se descarta (fail-secure).
        true
    }
}
// FIN DEL ARCHIVO [apps/authority/src/services/handle_governor.rs]

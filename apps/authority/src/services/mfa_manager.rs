// INICIO DEL ARCHIVO [apps/authority/src/services/mfa_manager.rs]
/*!
 * =================================================================
 * APARATO: MFA MANAGER (V4.2 - FACTOR GOVERNANCE)
 * CLASIFICACIÓN: SECURITY STRATUM (ESTRATO L4)
 * RESPONSABILIDAD: ENROLAMIENTO, DESAFÍOS Y CÓDIGOS DE RESPALDO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. POSSESSION PROOF: Ningún factor queda verificado sin una
 *    verificación exitosa previa; el primer factor verificado se
 *    promueve a primario automáticamente.
 * 2. FIVE STRIKES: El quinto fallo consecutivo desactiva el factor y
 *    emite evento de seguridad + señal al operador.
 * 3. SECRET AT REST: Todo material reposa cifrado (AES-256-GCM) con
 *    sal determinista por id de factor.
 * 4. SINGLE-USE CODES: Los códigos de respaldo se consumen con CAS
 *    de fila; el agotamiento dispara el aviso de regeneración.
 * =================================================================
 */

use crate::errors::AuthorityError;
use crate::services::audit_recorder::AuditRecorder;
use crate::services::notification_dispatcher::NotificationDispatcher;
use crate::state::AppState;
use crate::clock::Clock;
use entativa_core_secret_vault::SecretVaultEngine;
use entativa_domain_mfa::{
    current_totp_code, digest_backup_code, forge_backup_codes, forge_numeric_otp,
    generate_totp_secret, verify_totp, OTP_TTL_SECONDS,
};
use entativa_domain_models::audit::{AuditAction, AuditEvent, LawfulBasis};
use entativa_domain_models::mfa::{MfaKind, MfaMethod};
use entativa_domain_notification::{NotificationChannel, NotificationKind, NotificationPayload};
use entativa_infra_cache::keys;
use entativa_infra_cache::KeyValueStore;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Fallos consecutivos que incineran un factor.
const FACTOR_STRIKE_LIMIT: u32 = 5;

/// Resultado del canje de un código de respaldo.
#[derive(Debug, PartialEq, Eq)]
pub enum BackupConsumption {
    Accepted { remaining: u64 },
    Exhausted,
}

/// Gestor de autoridad única de factores secundarios.
pub struct MfaManager {
    application_state: AppState,
}

impl MfaManager {
    pub fn new(application_state: AppState) -> Self {
        Self { application_state }
    }

    // --- ENROLAMIENTO ---

    /**
     * Enrola un factor TOTP: semilla de 160 bits cifrada en reposo.
     * Retorna (id del factor, semilla base32 para el autenticador).
     * El factor queda NO verificado hasta la prueba de posesión.
     */
    #[instrument(skip(self))]
    pub async fn enroll_totp(&self, identity_id: Uuid) -> Result<(Uuid, String), AuthorityError> {
        let now = self.application_state.clock.now();
        let method_id = Uuid::new_v4();
        let seed_base32 = generate_totp_secret();

        let encrypted_secret = SecretVaultEngine::encrypt_at_rest(
            &seed_base32,
            &self.application_state.config.mfa_vault_master_key,
            &method_id.to_string(),
        )?;

        let method = MfaMethod {
            id: method_id,
            identity_id,
            kind: MfaKind::Totp,
            encrypted_secret,
            is_verified: false,
            is_primary: false,
            priority: 10,
            usage_count: 0,
            last_used_at: None,
            consecutive_failures: 0,
            is_active: true,
            created_at: now,
        };
        self.application_state
            .mfa_repository
            .insert_method(&method)
            .await?;

        self.audit_enrollment(identity_id, method_id, MfaKind::Totp, now)
            .await;
        Ok((method_id, seed_base32))
    }

    /**
     * Enrola un factor de canal (SMS/email). El secreto es el destino
     * (E.164 o email), cifrado en reposo; la posesión se prueba con
     * el primer OTP entregado.
     */
    #[instrument(skip(self, destination))]
    pub async fn enroll_channel(
        &self,
        identity_id: Uuid,
        kind: MfaKind,
        destination: &str,
    ) -> Result<Uuid, AuthorityError> {
        if !matches!(kind, MfaKind::Sms | MfaKind::Email) {
            return Err(AuthorityError::InputViolation {
                field: "kind".to_string(),
                violation: "CHANNEL_KIND_EXPECTED".to_string(),
            });
        }

        let now = self.application_state.clock.now();
        let method_id = Uuid::new_v4();

        let encrypted_secret = SecretVaultEngine::encrypt_at_rest(
            destination,
            &self.application_state.config.mfa_vault_master_key,
            &method_id.to_string(),
        )?;

        let method = MfaMethod {
            id: method_id,
            identity_id,
            kind,
            encrypted_secret,
            is_verified: false,
            is_primary: false,
            priority: 20,
            usage_count: 0,
            last_used_at: None,
            consecutive_failures: 0,
            is_active: true,
            created_at: now,
        };
        self.application_state
            .mfa_repository
            .insert_method(&method)
            .await?;

        // Primer OTP: prueba de posesión del destino.
        self.dispatch_channel_otp(&method).await?;

        self.audit_enrollment(identity_id, method_id, kind, now).await;
        Ok(method_id)
    }

    /**
     * Enrola el lote de códigos de respaldo (10 × 10). Los claros se
     * retornan UNA sola vez; solo los digests reposan en la bóveda.
     */
    #[instrument(skip(self))]
    pub async fn enroll_backup_codes(
        &self,
        identity_id: Uuid,
    ) -> Result<(Uuid, Vec<String>), AuthorityError> {
        let now = self.application_state.clock.now();
        let method_id = Uuid::new_v4();

        let encrypted_secret = SecretVaultEngine::encrypt_at_rest(
            "backup_codes_v1",
            &self.application_state.config.mfa_vault_master_key,
            &method_id.to_string(),
        )?;

        let method = MfaMethod {
            id: method_id,
            identity_id,
            kind: MfaKind::BackupCodes,
            encrypted_secret,
            is_verified: false,
            is_primary: false,
            priority: 90,
            usage_count: 0,
            last_used_at: None,
            consecutive_failures: 0,
            is_active: true,
            created_at: now,
        };
        self.application_state
            .mfa_repository
            .insert_method(&method)
            .await?;

        // La posesión del lote es inherente a su entrega.
        self.application_state
            .mfa_repository
            .mark_verified(method_id)
            .await?;

        let plaintext_codes = forge_backup_codes();
        let digests: Vec<String> = plaintext_codes
            .iter()
            .map(|code| digest_backup_code(code))
            .collect();
        self.application_state
            .mfa_repository
            .insert_backup_codes(method_id, &digests)
            .await?;

        self.audit_enrollment(identity_id, method_id, MfaKind::BackupCodes, now)
            .await;
        Ok((method_id, plaintext_codes))
    }

    /**
     * Prueba de posesión del enrolamiento: una verificación exitosa
     * sella is_verified y promueve a primario si es el único factor.
     */
    #[instrument(skip(self, submitted_code))]
    pub async fn confirm_enrollment(
        &self,
        identity_id: Uuid,
        method_id: Uuid,
        submitted_code: &str,
    ) -> Result<(), AuthorityError> {
        self.verify_challenge(identity_id, method_id, submitted_code)
            .await?;

        self.application_state
            .mfa_repository
            .mark_verified(method_id)
            .await?;

        // Primer factor verificado -> primario automático.
        let has_primary = self
            .application_state
            .mfa_repository
            .fetch_primary(identity_id)
            .await?
            .is_some();
        if !has_primary {
            self.application_state
                .mfa_repository
                .set_primary(identity_id, method_id)
                .await?;
        }
        Ok(())
    }

    /// Promoción explícita de un factor verificado a primario.
    pub async fn set_primary_factor(
        &self,
        identity_id: Uuid,
        method_id: Uuid,
    ) -> Result<(), AuthorityError> {
        self.application_state
            .mfa_repository
            .set_primary(identity_id, method_id)
            .await
            .map_err(AuthorityError::from)
    }

    // --- DESAFÍOS ---

    /// Despacha el OTP del desafío si el factor es de canal.
    pub async fn dispatch_channel_otp(&self, method: &MfaMethod) -> Result<(), AuthorityError> {
        let channel = match method.kind {
            MfaKind::Sms => NotificationChannel::Sms,
            MfaKind::Email => NotificationChannel::Email,
            _ => return Ok(()),
        };

        let destination = SecretVaultEngine::decrypt_at_rest(
            &method.encrypted_secret,
            &self.application_state.config.mfa_vault_master_key,
            &method.id.to_string(),
        )?;

        let otp = forge_numeric_otp();
        self.application_state
            .cache
            .put(
                &keys::mfa_otp(method.id),
                &otp,
                Some(chrono::Duration::seconds(OTP_TTL_SECONDS)),
            )
            .await?;

        let dispatcher = NotificationDispatcher::new(self.application_state.clone());
        let payload = NotificationPayload::forge(
            NotificationKind::MfaChallenge,
            destination,
            "NOTIF_MFA_CHALLENGE",
            format!("{{\"otp\":\"{}\"}}", otp),
            self.application_state.clock.now(),
        );
        dispatcher
            .dispatch(channel, payload, Some(method.identity_id))
            .await?;

        Ok(())
    }

    /**
     * Verifica un código contra el factor indicado.
     *
     * # Logic:
     * 1. TOTP: descifra la semilla y valida con ventana de skew.
     * 2. SMS/email: compara contra el OTP efímero (consumo al éxito).
     * 3. Backup: canje CAS del digest.
     * 4. Éxito -> sella uso y resetea strikes; fallo -> strike; al
     *    quinto, el factor se incinera con evento de seguridad.
     */
    #[instrument(skip(self, submitted_code))]
    pub async fn verify_challenge(
        &self,
        identity_id: Uuid,
        method_id: Uuid,
        submitted_code: &str,
    ) -> Result<(), AuthorityError> {
        let now = self.application_state.clock.now();

        let method = self
            .application_state
            .mfa_repository
            .fetch_method(method_id)
            .await?
            .filter(|method| method.identity_id == identity_id && method.is_active)
            .ok_or(AuthorityError::InvalidCredentials)?;

        let accepted = match method.kind {
            MfaKind::Totp => {
                let seed = SecretVaultEngine::decrypt_at_rest(
                    &method.encrypted_secret,
                    &self.application_state.config.mfa_vault_master_key,
                    &method.id.to_string(),
                )?;
                verify_totp(&seed, submitted_code)?
            }
            MfaKind::Sms | MfaKind::Email => {
                let otp_key = keys::mfa_otp(method.id);
                match self.application_state.cache.get(&otp_key).await? {
                    Some(expected_otp) if expected_otp == submitted_code.trim() => {
                        let _ = self.application_state.cache.delete(&otp_key).await;
                        true
                    }
                    _ => false,
                }
            }
            MfaKind::BackupCodes => {
                let digest = digest_backup_code(submitted_code);
                self.application_state
                    .mfa_repository
                    .consume_backup_code(method.id, &digest, now)
                    .await?
            }
            MfaKind::Webauthn => {
                // La ceremonia WebAuthn la ejecuta el verificador externo;
                // el núcleo solo custodia el registro del credential-id.
                return Err(AuthorityError::InputViolation {
                    field: "kind".to_string(),
                    violation: "WEBAUTHN_CEREMONY_IS_EXTERNAL".to_string(),
                });
            }
        };

        let recorder = AuditRecorder::new(self.application_state.clone());

        if accepted {
            self.application_state
                .mfa_repository
                .record_success(method.id, now)
                .await?;

            recorder
                .record(
                    AuditEvent::forge(AuditAction::MfaVerified, LawfulBasis::Contract, now)
                        .with_identity(identity_id)
                        .with_detail("method_id", method.id.to_string())
                        .with_detail("kind", method.kind.as_str().to_string()),
                )
                .await;

            // Aviso de regeneración al agotar el lote de respaldo.
            if method.kind == MfaKind::BackupCodes {
                let remaining = self
                    .application_state
                    .mfa_repository
                    .unused_backup_count(method.id)
                    .await?;
                if remaining == 0 {
                    info!(
                        "📉 [BACKUP_EXHAUSTED]: Identity {} consumed the full batch.",
                        identity_id
                    );
                }
            }
            return Ok(());
        }

        // STRIKE: al quinto fallo consecutivo el factor se incinera.
        let strikes = self
            .application_state
            .mfa_repository
            .record_failure(method.id)
            .await?;

        recorder
            .record(
                AuditEvent::forge(
                    AuditAction::MfaChallengeFailed,
                    LawfulBasis::LegitimateInterest,
                    now,
                )
                .with_identity(identity_id)
                .with_detail("method_id", method.id.to_string())
                .with_detail("kind", method.kind.as_str().to_string())
                .with_detail("consecutive_failures", strikes.to_string()),
            )
            .await;

        if strikes >= FACTOR_STRIKE_LIMIT {
            warn!(
                "⛔ [FACTOR_INCINERATED]: Method {} deactivated after {} strikes.",
                method.id, strikes
            );
            self.application_state
                .mfa_repository
                .deactivate(method.id)
                .await?;

            recorder
                .record(
                    AuditEvent::forge(
                        AuditAction::MfaFactorDeactivated,
                        LawfulBasis::LegitimateInterest,
                        now,
                    )
                    .with_identity(identity_id)
                    .with_detail("method_id", method.id.to_string())
                    .with_detail("kind", method.kind.as_str().to_string())
                    .with_detail("reason", "strike_limit"),
                )
                .await;
        }

        Err(AuthorityError::InvalidCredentials)
    }

    /// Regenera el lote de respaldo completo (reemplaza el anterior).
    #[instrument(skip(self))]
    pub async fn regenerate_backup_codes(
        &self,
        identity_id: Uuid,
        method_id: Uuid,
    ) -> Result<Vec<String>, AuthorityError> {
        let method = self
            .application_state
            .mfa_repository
            .fetch_method(method_id)
            .await?
            .filter(|m| m.identity_id == identity_id && m.kind == MfaKind::BackupCodes)
            .ok_or(AuthorityError::InvalidCredentials)?;

        let plaintext_codes = forge_backup_codes();
        let digests: Vec<String> = plaintext_codes
            .iter()
            .map(|code| digest_backup_code(code))
            .collect();
        self.application_state
            .mfa_repository
            .insert_backup_codes(method.id, &digests)
            .await?;

        Ok(plaintext_codes)
    }

    /// Códigos de respaldo aún canjeables del factor.
    pub async fn backup_codes_remaining(&self, method_id: Uuid) -> Result<u64, AuthorityError> {
        self.application_state
            .mfa_repository
            .unused_backup_count(method_id)
            .await
            .map_err(AuthorityError::from)
    }

    // --- FÍSICA INTERNA ---

    async fn audit_enrollment(
        &self,
        identity_id: Uuid,
        method_id: Uuid,
        kind: MfaKind,
        now: chrono::DateTime<chrono::Utc>,
    ) {
        let recorder = AuditRecorder::new(self.application_state.clone());
        recorder
            .record(
                AuditEvent::forge(AuditAction::MfaEnrolled, LawfulBasis::Contract, now)
                    .with_identity(identity_id)
                    .with_detail("method_id", method_id.to_string())
                    .with_detail("kind", kind.as_str().to_string()),
            )
            .await;
    }

    /// Acceso de soporte del Proving Grounds: código vigente de un
    /// factor TOTP (prueba de posesión simulada).
    pub async fn current_code_for_totp(&self, method_id: Uuid) -> Result<String, AuthorityError> {
        let method = self
            .application_state
            .mfa_repository
            .fetch_method(method_id)
            .await?
            .filter(|m| m.kind == MfaKind::Totp)
            .ok_or(AuthorityError::InvalidCredentials)?;

        let seed = SecretVaultEngine::decrypt_at_rest(
            &method.encrypted_secret,
            &self.application_state.config.mfa_vault_master_key,
            &method.id.to_string(),
        )?;
        Ok(current_totp_code(&seed)?)
    }
}
// FIN DEL ARCHIVO [apps/authority/src/services/mfa_manager.rs]

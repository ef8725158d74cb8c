// INICIO DEL ARCHIVO [apps/authority/src/services/session_authenticator.rs]
/*!
 * =================================================================
 * APARATO: SESSION AUTHENTICATOR (V5.1 - LOCKOUT PHYSICS)
 * CLASIFICACIÓN: SECURITY STRATUM (ESTRATO L4)
 * RESPONSABILIDAD: REGISTRO, LOGIN CON LOCKOUT Y CICLO DE SESIONES
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. GENERIC REJECTION: Todo fallo de verificación responde
 *    'invalid credentials'; la existencia de la cuenta jamás se
 *    revela (ni por mensaje ni por latencia: verificación bcrypt
 *    señuelo ante cuentas inexistentes).
 * 2. SLIDING LOCKOUT: Contador efímero con TTL = ventana (15 min) +
 *    contador durable; al umbral (5) se sella locked_until (+30 min).
 * 3. MFA GATE: Una identidad con factor primario verificado recibe
 *    un ticket de desafío en lugar de tokens.
 * 4. ADVISORY LEASE: Las escrituras por identidad (registro de
 *    contraseña) se serializan con el cerrojo consultivo de 30 s.
 * =================================================================
 */

use crate::errors::AuthorityError;
use crate::services::audit_recorder::AuditRecorder;
use crate::services::handle_governor::HandleGovernor;
use crate::services::mfa_manager::MfaManager;
use crate::services::rate_limiter::{LimitedAction, RateLimiter};
use crate::services::token_service::{SessionTokenBundle, TokenService};
use crate::state::AppState;
use crate::clock::Clock;
use crate::support::IdentityLease;
use entativa_core_credential::breach::fast_digest;
use entativa_core_credential::BreachOracle;
use entativa_core_credential::{evaluate_password, PasswordContext};
use entativa_core_token_forge::forge_opaque_secret;
use entativa_domain_models::audit::{AuditAction, AuditEvent, LawfulBasis};
use entativa_domain_models::identity::{
    Identity, IdentityStatus, Profile, RegisterIdentityPayload, VerificationStatus,
};
use entativa_domain_models::token::SecurityLevel;
use entativa_infra_cache::keys;
use entativa_infra_cache::KeyValueStore;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Material bcrypt señuelo para igualar el costo temporal cuando la
/// cuenta no existe (hash de material aleatorio irrelevante).
const DECOY_BCRYPT_HASH: &str = "$2b$12$9hVp5bhJpVxMBGqmuNQCOePaWBGXCQfWRUxyF7yJcXfhVJcm3nEHe";

/// TTL del ticket de desafío MFA (segundos).
const MFA_CHALLENGE_TTL_SECONDS: i64 = 300;

/// Resultado de una autenticación primaria exitosa.
#[derive(Debug)]
pub enum LoginOutcome {
    /// Sesión establecida: par de tokens emitido.
    Established(Box<SessionTokenBundle>),
    /// Factor primario activo: se exige superar el desafío MFA.
    MfaChallengeRequired {
        challenge_token: String,
        method_id: Uuid,
    },
}

/// Ticket interno del desafío de login en dos pasos.
#[derive(Debug, Serialize, Deserialize)]
struct MfaChallengeTicket {
    identity_id: Uuid,
    method_id: Uuid,
    client_ip: Option<String>,
    user_agent: Option<String>,
}

/// Autenticador de autoridad única de credenciales primarias.
pub struct SessionAuthenticator {
    application_state: AppState,
}

impl SessionAuthenticator {
    pub fn new(application_state: AppState) -> Self {
        Self { application_state }
    }

    // --- REGISTRO ---

    /**
     * Registra una identidad nueva con gobernanza completa.
     *
     * # Logic:
     * 1. Ventana de registro (3/24 h por IP).
     * 2. Gobernanza del eid: sintaxis + protección (fail-secure).
     * 3. Escrutinio de la contraseña: contexto personal, piso de
     *    entropía (40 bits) y oráculo de brechas.
     * 4. bcrypt (coste configurado) + filas Identity/Profile + audit.
     */
    #[instrument(skip(self, payload), fields(eid = %payload.eid))]
    pub async fn register(
        &self,
        payload: RegisterIdentityPayload,
    ) -> Result<Identity, AuthorityError> {
        let now = self.application_state.clock.now();
        let rate_limiter = RateLimiter::new(self.application_state.clone());

        let rate_subject = payload
            .request_ip
            .clone()
            .unwrap_or_else(|| payload.email.clone());
        rate_limiter
            .consume(LimitedAction::Register, &rate_subject)
            .await?;

        // 2. GOBERNANZA DEL EID
        let governor = HandleGovernor::new(self.application_state.clone());
        let verdict = governor.check_handle(&payload.eid).await?;
        if verdict.protected {
            return Err(AuthorityError::HandleProtected(Box::new(verdict)));
        }
        let normalized_eid =
            entativa_domain_governance::normalize_and_validate(&payload.eid)?;

        // 3. ESCRUTINIO DE LA CREDENCIAL
        let email_local_part = payload
            .email
            .split('@')
            .next()
            .map(|local| local.to_string());
        let scrutiny_context = PasswordContext {
            email_local_part,
            given_name: payload.given_name.clone(),
            family_name: payload.family_name.clone(),
            birth_year: payload.birth_year,
        };

        let report = evaluate_password(
            &payload.password,
            &scrutiny_context,
            self.application_state.config.min_password_entropy_bits,
        );
        if !report.accepted {
            return Err(AuthorityError::CredentialPolicyViolation(format!(
                "ENTROPY_FLOOR_VIOLATION ({:.1} bits observed, {} penalties)",
                report.entropy_bits,
                report.penalties.len()
            )));
        }

        let breach_digest = fast_digest(&payload.password);
        if self
            .application_state
            .breach_oracle
            .is_breached(&breach_digest)
            .await
            .map_err(AuthorityError::from)?
        {
            return Err(AuthorityError::CredentialPolicyViolation(
                "CREDENTIAL_BREACHED".to_string(),
            ));
        }

        // 4. CRISTALIZACIÓN
        let password_hash = bcrypt::hash(
            &payload.password,
            self.application_state.config.bcrypt_cost,
        )
        .map_err(|fault| AuthorityError::Fatal(format!("BCRYPT_ENGINE_FAULT: {}", fault)))?;

        let identity = Identity {
            id: Uuid::new_v4(),
            eid: normalized_eid,
            email: payload.email.to_lowercase(),
            phone_number: payload.phone_number.clone(),
            password_hash,
            status: IdentityStatus::Active,
            verification_status: VerificationStatus::Unverified,
            verification_badge: None,
            reputation_score: 50.0,
            failed_login_attempts: 0,
            locked_until: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
            created_ip: payload.request_ip.clone(),
            created_user_agent: payload.request_user_agent.clone(),
        };

        let mut profile = Profile::bootstrap_for(identity.id, now);
        profile.given_name = payload.given_name.clone();
        profile.family_name = payload.family_name.clone();
        profile.birth_year = payload.birth_year;

        self.application_state
            .identity_repository
            .register_identity(&identity, &profile)
            .await?;

        let recorder = AuditRecorder::new(self.application_state.clone());
        recorder
            .record(
                AuditEvent::forge(AuditAction::IdentityRegistered, LawfulBasis::Contract, now)
                    .with_identity(identity.id)
                    .with_detail("eid", identity.eid.clone())
                    .with_detail(
                        "email_domain",
                        identity
                            .email
                            .split('@')
                            .nth(1)
                            .unwrap_or("<malformed>")
                            .to_string(),
                    ),
            )
            .await;

        info!("🪪 [REGISTERED]: Identity [{}] established.", identity.eid);
        Ok(identity)
    }

    // --- LOGIN ---

    /**
     * Autenticación primaria con lockout de ventana deslizante.
     */
    #[instrument(skip(self, password), fields(subject = %email))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        user_agent: Option<String>,
        client_ip: Option<String>,
    ) -> Result<LoginOutcome, AuthorityError> {
        let now = self.application_state.clock.now();
        let rate_limiter = RateLimiter::new(self.application_state.clone());
        let recorder = AuditRecorder::new(self.application_state.clone());

        // Ventana por IP (endpoint). La ventana por identidad la realiza
        // el propio mecanismo de lockout: mismo tope, misma ventana.
        if let Some(ip) = &client_ip {
            rate_limiter.consume(LimitedAction::Login, ip).await?;
        }

        let identity = match self
            .application_state
            .identity_repository
            .fetch_by_email(&email.to_lowercase())
            .await?
        {
            Some(identity) => identity,
            None => {
                // Verificación señuelo: iguala el costo temporal para no
                // revelar la inexistencia de la cuenta.
                let _ = bcrypt::verify(password, DECOY_BCRYPT_HASH);
                recorder
                    .record(
                        AuditEvent::forge(AuditAction::LoginFailed, LawfulBasis::LegitimateInterest, now)
                            .with_detail("reason_code", "unknown_subject"),
                    )
                    .await;
                return Err(AuthorityError::InvalidCredentials);
            }
        };

        // VETO TEMPORAL VIGENTE
        if identity.is_locked_at(now) {
            recorder
                .record(
                    AuditEvent::forge(AuditAction::LoginFailed, LawfulBasis::LegitimateInterest, now)
                        .with_identity(identity.id)
                        .with_detail("reason_code", "locked"),
                )
                .await;
            return Err(AuthorityError::IdentityLocked {
                locked_until: identity
                    .locked_until
                    .map(|until| until.to_rfc3339())
                    .unwrap_or_else(|| "<status_locked>".to_string()),
            });
        }

        // Locked con veto ya vencido atraviesa: el reseteo post-éxito
        // restaura el estado. Suspended/Deleted jamás autentican.
        if matches!(
            identity.status,
            IdentityStatus::Suspended | IdentityStatus::Deleted
        ) {
            return Err(AuthorityError::InvalidCredentials);
        }

        // VERIFICACIÓN PRIMARIA (comparación de tiempo constante en bcrypt)
        let credential_accepted =
            bcrypt::verify(password, &identity.password_hash).unwrap_or(false);

        if !credential_accepted {
            return Err(self.process_login_failure(&identity, now).await);
        }

        // ÉXITO: reseteo de contadores y sello de último acceso.
        let _ = self
            .application_state
            .cache
            .delete(&keys::rate("login_fail", &identity.id.to_string()))
            .await;
        self.application_state
            .identity_repository
            .reset_login_state(identity.id, now)
            .await?;

        recorder
            .record(
                AuditEvent::forge(AuditAction::LoginSucceeded, LawfulBasis::Contract, now)
                    .with_identity(identity.id)
                    .with_detail("security_level", "standard"),
            )
            .await;

        // COMPUERTA MFA
        if let Some(primary_factor) = self
            .application_state
            .mfa_repository
            .fetch_primary(identity.id)
            .await?
        {
            let challenge_token = forge_opaque_secret();
            let ticket = MfaChallengeTicket {
                identity_id: identity.id,
                method_id: primary_factor.id,
                client_ip: client_ip.clone(),
                user_agent: user_agent.clone(),
            };
            let ticket_payload = serde_json::to_string(&ticket)
                .map_err(|fault| AuthorityError::Fatal(fault.to_string()))?;

            self.application_state
                .cache
                .put(
                    &keys::mfa_challenge(&challenge_token),
                    &ticket_payload,
                    Some(chrono::Duration::seconds(MFA_CHALLENGE_TTL_SECONDS)),
                )
                .await?;

            // Despacha el OTP si el factor es de canal (SMS/email).
            let mfa_manager = MfaManager::new(self.application_state.clone());
            mfa_manager.dispatch_channel_otp(&primary_factor).await?;

            return Ok(LoginOutcome::MfaChallengeRequired {
                challenge_token,
                method_id: primary_factor.id,
            });
        }

        let bundle = self
            .establish_session(&identity, user_agent, client_ip, SecurityLevel::Standard)
            .await?;
        Ok(LoginOutcome::Established(Box::new(bundle)))
    }

    /**
     * Segundo paso del login: canjea el ticket y el código MFA.
     */
    #[instrument(skip(self, challenge_token, submitted_code))]
    pub async fn complete_mfa_login(
        &self,
        challenge_token: &str,
        submitted_code: &str,
    ) -> Result<SessionTokenBundle, AuthorityError> {
        let challenge_key = keys::mfa_challenge(challenge_token);

        let ticket_payload = self
            .application_state
            .cache
            .get(&challenge_key)
            .await?
            .ok_or(AuthorityError::InvalidCredentials)?;
        let ticket: MfaChallengeTicket = serde_json::from_str(&ticket_payload)
            .map_err(|fault| AuthorityError::Fatal(fault.to_string()))?;

        let mfa_manager = MfaManager::new(self.application_state.clone());
        mfa_manager
            .verify_challenge(ticket.identity_id, ticket.method_id, submitted_code)
            .await?;

        // El ticket es de un solo canje.
        let _ = self.application_state.cache.delete(&challenge_key).await;

        let identity = self
            .application_state
            .identity_repository
            .fetch_by_id(ticket.identity_id)
            .await?
            .ok_or(AuthorityError::InvalidCredentials)?;

        self.establish_session(
            &identity,
            ticket.user_agent,
            ticket.client_ip,
            SecurityLevel::Elevated,
        )
        .await
    }

    // --- ROTACIÓN DE CONTRASEÑA ---

    /**
     * Cambio de contraseña con cascada de revocación total.
     *
     * # Atomicity:
     * Serializado por el cerrojo consultivo de la identidad (30 s).
     */
    #[instrument(skip(self, current_password, new_password))]
    pub async fn change_password(
        &self,
        identity_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthorityError> {
        let rate_limiter = RateLimiter::new(self.application_state.clone());
        rate_limiter
            .consume(LimitedAction::PasswordReset, &identity_id.to_string())
            .await?;

        let lease = IdentityLease::acquire(self.application_state.cache.clone(), identity_id).await?;

        let outcome = self
            .execute_password_rotation(identity_id, current_password, new_password)
            .await;

        lease.release().await;
        outcome
    }

    /// Revoca una sesión individual (logout).
    pub async fn logout(&self, session_id: Uuid, identity_id: Uuid) -> Result<(), AuthorityError> {
        let now = self.application_state.clock.now();
        let token_service = TokenService::new(self.application_state.clone());
        token_service
            .revoke_session(session_id, Some(identity_id), "logout")
            .await?;

        let recorder = AuditRecorder::new(self.application_state.clone());
        recorder
            .record(
                AuditEvent::forge(AuditAction::SessionRevoked, LawfulBasis::Contract, now)
                    .with_identity(identity_id)
                    .with_actor(identity_id)
                    .with_detail("session_id", session_id.to_string())
                    .with_detail("reason", "logout"),
            )
            .await;
        Ok(())
    }

    /// Revoca todas las sesiones de la identidad (logout-all).
    pub async fn logout_all(&self, identity_id: Uuid) -> Result<(), AuthorityError> {
        let now = self.application_state.clock.now();
        let token_service = TokenService::new(self.application_state.clone());
        token_service
            .revoke_all_for_identity(identity_id, Some(identity_id), "logout_all")
            .await?;

        let recorder = AuditRecorder::new(self.application_state.clone());
        recorder
            .record(
                AuditEvent::forge(AuditAction::SessionRevoked, LawfulBasis::Contract, now)
                    .with_identity(identity_id)
                    .with_actor(identity_id)
                    .with_detail("reason", "logout_all"),
            )
            .await;
        Ok(())
    }

    // --- FÍSICA INTERNA ---

    async fn establish_session(
        &self,
        identity: &Identity,
        user_agent: Option<String>,
        client_ip: Option<String>,
        security_level: SecurityLevel,
    ) -> Result<SessionTokenBundle, AuthorityError> {
        let token_service = TokenService::new(self.application_state.clone());
        token_service
            .issue_session_bundle(
                identity,
                None,
                Vec::new(),
                None,
                user_agent,
                client_ip,
                security_level,
            )
            .await
    }

    /// Contabiliza un fallo y decide el lockout; siempre produce el
    /// rechazo genérico (o el veto si el umbral se alcanzó).
    async fn process_login_failure(
        &self,
        identity: &Identity,
        now: chrono::DateTime<chrono::Utc>,
    ) -> AuthorityError {
        let recorder = AuditRecorder::new(self.application_state.clone());

        // Contador efímero de ventana deslizante.
        let window_key = keys::rate("login_fail", &identity.id.to_string());
        let windowed_count = self
            .application_state
            .cache
            .increment(
                &window_key,
                Some(self.application_state.config.failed_login_window()),
            )
            .await
            .unwrap_or(0);

        // Contador durable (rastro forense).
        let durable_count = self
            .application_state
            .identity_repository
            .record_login_failure(identity.id, now)
            .await
            .unwrap_or(0);

        recorder
            .record(
                AuditEvent::forge(AuditAction::LoginFailed, LawfulBasis::LegitimateInterest, now)
                    .with_identity(identity.id)
                    .with_detail("attempt_number", durable_count.to_string())
                    .with_detail("reason_code", "credential_mismatch"),
            )
            .await;

        // Decisión de lockout sobre la ventana deslizante. Un contador
        // efímero en 0 señala caché caído: decide el durable (conservador).
        let decisive_count = if windowed_count == 0 {
            durable_count as u64
        } else {
            windowed_count
        };
        if decisive_count >= self.application_state.config.failed_login_threshold as u64 {
            let locked_until = now + self.application_state.config.lockout_duration();

            if let Err(lockout_fault) = self
                .application_state
                .identity_repository
                .engage_lockout(identity.id, locked_until, now)
                .await
            {
                warn!("❌ [LOCKOUT_FAULT]: Veto persistence collapsed: {}", lockout_fault);
            }

            recorder
                .record(
                    AuditEvent::forge(
                        AuditAction::LockoutTriggered,
                        LawfulBasis::LegitimateInterest,
                        now,
                    )
                    .with_identity(identity.id)
                    .with_detail("locked_until", locked_until.to_rfc3339())
                    .with_detail("attempt_number", windowed_count.to_string()),
                )
                .await;
        }

        AuthorityError::InvalidCredentials
    }

    async fn execute_password_rotation(
        &self,
        identity_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthorityError> {
        let now = self.application_state.clock.now();

        let identity = self
            .application_state
            .identity_repository
            .fetch_by_id(identity_id)
            .await?
            .ok_or(AuthorityError::InvalidCredentials)?;

        if !bcrypt::verify(current_password, &identity.password_hash).unwrap_or(false) {
            return Err(AuthorityError::InvalidCredentials);
        }

        // Escrutinio del material nuevo con contexto personal.
        let profile = self
            .application_state
            .identity_repository
            .fetch_profile(identity_id)
            .await?;
        let scrutiny_context = PasswordContext {
            email_local_part: identity.email.split('@').next().map(|s| s.to_string()),
            given_name: profile.as_ref().and_then(|p| p.given_name.clone()),
            family_name: profile.as_ref().and_then(|p| p.family_name.clone()),
            birth_year: profile.as_ref().and_then(|p| p.birth_year),
        };

        let report = evaluate_password(
            new_password,
            &scrutiny_context,
            self.application_state.config.min_password_entropy_bits,
        );
        if !report.accepted {
            return Err(AuthorityError::CredentialPolicyViolation(
                "ENTROPY_FLOOR_VIOLATION".to_string(),
            ));
        }

        if self
            .application_state
            .breach_oracle
            .is_breached(&fast_digest(new_password))
            .await
            .map_err(AuthorityError::from)?
        {
            return Err(AuthorityError::CredentialPolicyViolation(
                "CREDENTIAL_BREACHED".to_string(),
            ));
        }

        let new_hash = bcrypt::hash(new_password, self.application_state.config.bcrypt_cost)
            .map_err(|fault| AuthorityError::Fatal(format!("BCRYPT_ENGINE_FAULT: {}", fault)))?;

        self.application_state
            .identity_repository
            .update_password_hash(identity_id, &new_hash, now)
            .await?;

        // Cascada total: toda sesión previa muere con la contraseña.
        let token_service = TokenService::new(self.application_state.clone());
        token_service
            .revoke_all_for_identity(identity_id, Some(identity_id), "password_changed")
            .await?;

        let recorder = AuditRecorder::new(self.application_state.clone());
        recorder
            .record(
                AuditEvent::forge(AuditAction::PasswordChanged, LawfulBasis::Contract, now)
                    .with_identity(identity_id)
                    .with_actor(identity_id)
                    .with_detail("strength_ordinal", report.strength.as_str().to_string()),
            )
            .await;

        Ok(())
    }
}
// FIN DEL ARCHIVO [apps/authority/src/services/session_authenticator.rs]

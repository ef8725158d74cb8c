// [apps/authority/src/services/mod.rs]
/*!
 * =================================================================
 * APARATO: SERVICE ACCESS MATRIX (V4.0)
 * CLASIFICACIÓN: APPLICATION SERVICES (ESTRATO L4)
 * RESPONSABILIDAD: ORQUESTACIÓN DE MOTORES DE DOMINIO
 * =================================================================
 */

// --- ESTRATO 1: SOPORTE TRANSVERSAL ---

/// Libro mayor de auditoría (C10) con espejo de trazas.
pub mod audit_recorder;
/// Ventanas deslizantes por (identidad, acción) y (ip, endpoint).
pub mod rate_limiter;
/// Proveedor opaco de geolocalización gruesa.
pub mod geolocation;

// --- ESTRATO 2: GOBERNANZA DE HANDLES (C4) ---

/// Escrutinio de protección, alternativas y workflow de reservas.
pub mod handle_governor;

// --- ESTRATO 3: CREDENCIALES Y SESIONES (C6/C7) ---

/// Emisión, validación, blacklist y revocación en cascada.
pub mod token_service;
/// Registro, login con lockout, logout y rotación de contraseña.
pub mod session_authenticator;

// --- ESTRATO 4: OAUTH2 Y FACTORES (C8/C5/C9) ---

/// Motor OAuth2/OIDC completo (authorize, token, revoke, introspect).
pub mod oauth_engine;
/// Enrolamiento, desafíos y códigos de respaldo MFA.
pub mod mfa_manager;
/// Despacho de señales con rate limiting por canal.
pub mod notification_dispatcher;

// --- ESTRATO 5: DAEMONS DE FONDO ---

/// Higiene perpetua: celdas efímeras y códigos vencidos.
pub mod hygiene_reaper;
/// Auto-curación de vetos de autenticación vencidos.
pub mod lockout_warden;

// --- RE-EXPORTACIONES SOBERANAS ---

pub use audit_recorder::AuditRecorder;
pub use handle_governor::HandleGovernor;
pub use hygiene_reaper::spawn_hygiene_reaper;
pub use lockout_warden::LockoutReleaseWarden;
pub use mfa_manager::MfaManager;
pub use notification_dispatcher::NotificationDispatcher;
pub use oauth_engine::OAuth2Engine;
pub use rate_limiter::RateLimiter;
pub use session_authenticator::SessionAuthenticator;
pub use token_service::TokenService;

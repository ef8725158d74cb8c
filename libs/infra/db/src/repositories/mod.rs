// [libs/infra/db/src/repositories/mod.rs]
/*!
 * =================================================================
 * APARATO: REPOSITORY ACCESS MATRIX (V5.0 - TOPOLOGY MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: ORQUESTACIÓN DE SUBSISTEMAS DE PERSISTENCIA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. ACCESS SOVEREIGNTY: Centraliza la visibilidad de los repositorios
 *    para la inyección de dependencias en el AppState de la Autoridad.
 * 2. NOMINAL PARITY: Cada repositorio es autoridad única de su tabla;
 *    ningún otro estrato emite SQL.
 *
 * # Mathematical Proof (Modular Encapsulation):
 * El barrel file actúa como una interfaz galvánica. Los sub-módulos
 * permanecen aislados, y solo las estructuras de autoridad
 * (Repositories) son expuestas al exterior, reduciendo el
 * acoplamiento sistémico.
 * =================================================================
 */

// --- ESTRATO 1: IDENTIDAD Y PERFIL ---

/// Ciclo de vida de identidades, lockout y reescritura de eid.
pub mod identity;

// --- ESTRATO 2: GOBERNANZA DE HANDLES ---

/// Registro categorizado de entidades protegidas y reservas de sistema.
pub mod protection;
/// Workflow de reclamaciones: envío, dictamen, apelación.
pub mod reservation;

// --- ESTRATO 3: OAUTH2 Y CREDENCIALES ---

/// Registro de clientes federados.
pub mod oauth_client;
/// Bóveda de tokens, códigos de autorización y revocación en cascada.
pub mod token;
/// Sesiones autenticadas y su tope por identidad.
pub mod session;

// --- ESTRATO 4: FACTORES Y CUMPLIMIENTO ---

/// Factores MFA y códigos de respaldo.
pub mod mfa;
/// Libro mayor de auditoría append-only.
pub mod audit;

// --- MAPEO COMPARTIDO (SSoT DE TRANSFORMACIÓN) ---
pub(crate) mod mapping;

// --- RE-EXPORTACIONES SOBERANAS (NOMINAL ACCESS API) ---

pub use audit::AuditRepository;
pub use identity::IdentityRepository;
pub use mfa::MfaRepository;
pub use oauth_client::OAuthClientRepository;
pub use protection::ProtectionRepository;
pub use reservation::ReservationRepository;
pub use session::SessionRepository;
pub use token::TokenRepository;

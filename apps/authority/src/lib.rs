// [apps/authority/src/lib.rs]
/*!
 * =================================================================
 * APARATO: AUTHORITY LIBRARY ROOT (V4.0 - SOVEREIGN AUTHORITY)
 * CLASIFICACIÓN: CRATE ROOT (ESTRATO L1-APP)
 * RESPONSABILIDAD: DEFINICIÓN SUPREMA DEL ÁRBOL DE MÓDULOS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. MODULE HIERARCHY HARDENING: Autoridad única de módulos para la
 *    resolución determinista de 'crate::' en librería y binarios.
 * 2. PUBLIC INTERFACE: Expone 'prelude' para la ignición mínima del
 *    Kernel desde main.rs y desde el Proving Grounds.
 *
 * # Mathematical Proof (Modular Encapsulation):
 * Al declarar 'pub mod' aquí, Rust genera un grafo de visibilidad
 * donde estado, servicios y configuración son hermanos bajo el mismo
 * tronco 'crate', habilitando la inyección de dependencias en tiempo
 * de compilación.
 * =================================================================
 */

// --- ESTRATO DE CONFIGURACIÓN Y TIEMPO ---
/// Opciones reconocidas del núcleo con sus defaults contractuales.
pub mod config;
/// Reloj inyectable del contexto de aplicación.
pub mod clock;

// --- ESTRATO DE ERRORES Y SOPORTE ---
/// Taxonomía de errores y traducción a códigos de alambre OAuth2.
pub mod errors;
/// Utilidades de scopes y reintento transitorio de frontera.
pub mod support;

// --- ESTRATO DE ESTADO (L1-APP) ---
/// Contexto explícito de aplicación (placa base neural).
pub mod state;

// --- ESTRATO DE SERVICIOS ---
/// Motores de dominio: gobernanza, sesiones, tokens, OAuth2, MFA.
pub mod services;

// --- ESTRATO DE IGNICIÓN ---
/// Núcleo de mando para la ignición de la Autoridad.
pub mod kernel;

/**
 * PRELUDIO DE LA AUTORIDAD
 *
 * Re-exportación estratégica de los componentes necesarios para la
 * ignición mínima del sistema. Reduce el acoplamiento en main.rs.
 */
pub mod prelude {
    pub use crate::clock::{Clock, FrozenClock, SystemClock};
    pub use crate::config::AuthorityConfig;
    pub use crate::errors::AuthorityError;
    pub use crate::kernel::AuthorityKernel;
    pub use crate::state::AppState;
}

// [libs/infra/db/src/errors.rs]
/*!
 * =================================================================
 * APARATO: DATABASE ERROR CATALOG (V3.1 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DE PERSISTENCIA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. CONFLICT AWARENESS: Distingue violaciones de unicidad (email,
 *    eid, handle canónico, reserva pendiente) de fallos de red, para
 *    que el motor superior emita el código de conflicto correcto.
 * 2. PANOPTICON COMPLIANCE: Formatea los mensajes con prefijos de
 *    estrato para su renderizado cromático en el libro de seguridad.
 * 3. ZERO ABBREVIATIONS: Nomenclatura nominal absoluta.
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    /// Error de enlace físico o de red con el cluster de Turso.
    #[error("[L3_DB_NET_FAULT]: DATABASE_UPLINK_SEVERED -> {0}")]
    ConnectionError(String),

    /// Fallo en la configuración del entorno (variables vacías o malformadas).
    #[error("[L3_DB_CONFIG_FAULT]: STRATEGIC_ENV_VOID -> {0}")]
    ConfigurationError(String),

    /// Error de sintaxis o ejecución devuelto por el motor libSQL.
    #[error("[L3_DB_QUERY_FAULT]: SQL_QUERY_REJECTED -> {0}")]
    QueryError(#[from] libsql::Error),

    /// Fallo en la transformación de tipos entre SQLite y el Dominio Rust.
    #[error("[L3_DB_MAPPING_FAULT]: DATA_MAPPING_VIOLATION -> {0}")]
    MappingError(String),

    /// Error al comprometer cambios en una secuencia multi-tabla.
    #[error("[L3_DB_FAULT]: TRANSACTION_COLLAPSE")]
    TransactionError,

    // --- ESTRATO DE IDENTIDAD ---

    /// La identidad solicitada no existe en la bóveda.
    #[error("[L3_IDENTITY_FAULT]: IDENTITY_NOT_FOUND")]
    IdentityNotFound,

    /// Violación de unicidad sobre el email registrado.
    #[error("[L3_IDENTITY_FAULT]: EMAIL_ALREADY_CLAIMED")]
    DuplicateEmail,

    /// Violación de unicidad sobre el eid (handle) registrado.
    #[error("[L3_IDENTITY_FAULT]: EID_ALREADY_CLAIMED")]
    DuplicateEid,

    // --- ESTRATO DE GOBERNANZA DE HANDLES ---

    /// El handle canónico ya existe en la unión de tablas categorizadas.
    #[error("[L3_GOVERNANCE_FAULT]: CANONICAL_HANDLE_COLLISION")]
    DuplicateProtectedHandle,

    /// Ya existe una reserva pendiente del mismo usuario por el mismo handle.
    #[error("[L3_GOVERNANCE_FAULT]: RESERVATION_ALREADY_PENDING")]
    DuplicatePendingReservation,

    /// La reserva no existe o no está en un estado apto para la operación.
    #[error("[L3_GOVERNANCE_FAULT]: RESERVATION_STATE_VIOLATION")]
    ReservationStateConflict,

    // --- ESTRATO OAUTH2 Y TOKENS ---

    /// El cliente OAuth2 no figura en el registro.
    #[error("[L3_OAUTH_FAULT]: CLIENT_NOT_FOUND")]
    ClientNotFound,

    /// La fila de token solicitada no existe.
    #[error("[L3_TOKEN_FAULT]: TOKEN_NOT_FOUND")]
    TokenNotFound,

    /// La sesión solicitada no existe.
    #[error("[L3_SESSION_FAULT]: SESSION_NOT_FOUND")]
    SessionNotFound,

    // --- ESTRATO MFA ---

    /// El factor MFA solicitado no existe o está inactivo.
    #[error("[L3_MFA_FAULT]: FACTOR_NOT_FOUND")]
    MfaMethodNotFound,
}

impl DbError {
    /// Clasifica un fallo de libSQL de violación UNIQUE hacia el conflicto
    /// semántico correcto del dominio, preservando el original si no aplica.
    pub fn from_unique_violation(error: libsql::Error) -> Self {
        let message = error.to_string();
        if message.contains("identities.email") {
            Self::DuplicateEmail
        } else if message.contains("identities.eid") {
            Self::DuplicateEid
        } else if message.contains("idx_reservations_pending") {
            Self::DuplicatePendingReservation
        } else if message.contains("canonical_handle") {
            Self::DuplicateProtectedHandle
        } else {
            Self::QueryError(error)
        }
    }

    pub fn is_unique_violation(error: &libsql::Error) -> bool {
        error.to_string().contains("UNIQUE constraint failed")
    }

    /// Un fallo transitorio habilita un único reintento en la frontera
    /// del componente; el resto de clases burbujea sin reintento.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ConnectionError(_) | Self::TransactionError)
    }
}

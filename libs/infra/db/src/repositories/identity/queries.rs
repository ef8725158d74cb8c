// [libs/infra/db/src/repositories/identity/queries.rs]
/*!
 * =================================================================
 * APARATO: IDENTITY SQL QUERIES (V5.0 - LOCKOUT PHYSICS)
 * CLASIFICACIÓN: INFRASTRUCTURE SQL (ESTRATO L3)
 * RESPONSABILIDAD: DEFINICIÓN DE ACCESOS ATÓMICOS A LA BÓVEDA DE IDENTIDAD
 *
 * VISION HIPER-HOLÍSTICA:
 * Implementa la física de estados del ciclo de vida de la identidad:
 * registro, lockout por ráfaga de fallos, reseteo post-login y la
 * reescritura gobernada del eid con rastro histórico.
 * =================================================================
 */

/// Proyección nominal completa de la fila de identidad.
/// El orden de columnas es contrato del mapeador; no reordenar.
pub const IDENTITY_COLUMNS: &str = "id, eid, email, phone_number, password_hash, status, \
     verification_status, verification_badge, reputation_score, failed_login_attempts, \
     locked_until, last_login_at, created_at, updated_at, created_ip, created_user_agent";

/// Incremento atómico del contador de fallos de autenticación.
///
/// # Physics:
/// El UPDATE actúa como semáforo de fila: dos ráfagas concurrentes
/// jamás observan el mismo contador. La fila actualizada retorna el
/// valor post-incremento para la decisión de lockout inmediata.
pub const RECORD_LOGIN_FAILURE: &str = r#"
    UPDATE identities
    SET
        failed_login_attempts = failed_login_attempts + 1,
        updated_at = ?2
    WHERE id = ?1
    RETURNING failed_login_attempts
"#;

/// Activa el veto temporal tras superar el umbral de fallos.
pub const ENGAGE_LOCKOUT: &str = r#"
    UPDATE identities
    SET
        status = 'locked',
        locked_until = ?2,
        updated_at = ?3
    WHERE id = ?1
"#;

/// Restaura el estado nominal tras una autenticación exitosa.
/// Limpia contador, veto y sella la marca de último acceso.
pub const RESET_LOGIN_STATE: &str = r#"
    UPDATE identities
    SET
        failed_login_attempts = 0,
        locked_until = NULL,
        status = CASE WHEN status = 'locked' THEN 'active' ELSE status END,
        last_login_at = ?2,
        updated_at = ?2
    WHERE id = ?1
"#;

/// Rotación del material bcrypt (cambio de contraseña).
pub const UPDATE_PASSWORD_HASH: &str = r#"
    UPDATE identities
    SET
        password_hash = ?2,
        updated_at = ?3
    WHERE id = ?1
"#;

/// Reescritura gobernada del eid (solo vía reserva aprobada).
pub const REWRITE_EID: &str = r#"
    UPDATE identities
    SET
        eid = ?2,
        updated_at = ?3
    WHERE id = ?1
"#;

/// Asignación de insignia tras la verificación de entidad protegida.
pub const ASSIGN_VERIFICATION: &str = r#"
    UPDATE identities
    SET
        verification_status = ?2,
        verification_badge = ?3,
        updated_at = ?4
    WHERE id = ?1
"#;

/// Protocolo de auto-curación: libera los vetos temporales vencidos.
///
/// # Physics:
/// Solo toca filas bajo veto CON fecha vencida; un Locked sin fecha es
/// bloqueo administrativo y queda intacto. Retorna los ids liberados
/// para el rastro del daemon de vigilancia.
pub const RELEASE_LAPSED_LOCKOUTS: &str = r#"
    UPDATE identities
    SET
        status = 'active',
        locked_until = NULL,
        updated_at = ?1
    WHERE status = 'locked'
      AND locked_until IS NOT NULL
      AND locked_until <= ?1
    RETURNING id
"#;

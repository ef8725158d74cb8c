// [libs/infra/db/src/repositories/token/queries.rs]
/*!
 * =================================================================
 * APARATO: TOKEN VAULT SQL QUERIES (V6.0 - REPLAY SHIELD)
 * CLASIFICACIÓN: INFRASTRUCTURE SQL (ESTRATO L3)
 * RESPONSABILIDAD: ACCESOS ATÓMICOS A LA BÓVEDA DE CREDENCIALES
 *
 * VISION HIPER-HOLÍSTICA:
 * Implementa la física anti-replay del núcleo: el consumo del código
 * de autorización es un compare-and-swap de fila, y toda revocación
 * en cascada retorna los jtis afectados para el blacklisting efímero.
 * =================================================================
 */

/// Proyección nominal completa de la fila de token.
/// El orden de columnas es contrato del mapeador; no reordenar.
pub const TOKEN_COLUMNS: &str = "id, kind, token_hash, subject_id, client_id, session_id, \
     auth_code_id, scopes_json, issued_at, expires_at, last_used_at, usage_count, \
     is_revoked, revoked_at, revoked_by, revocation_reason, device_fingerprint, \
     security_level, risk_score, api_key_prefix";

/// Proyección nominal de la fila de código de autorización.
pub const AUTH_CODE_COLUMNS: &str = "id, code_hash, client_id, identity_id, redirect_uri, \
     scopes_json, code_challenge, challenge_method, used, created_at, expires_at";

/// Compare-and-swap soberano del consumo de código.
///
/// # Physics:
/// El UPDATE solo procede si used=0 y el código sigue vigente. De dos
/// canjeadores concurrentes exactamente uno observa la fila retornada;
/// el perdedor cae al SELECT forense para clasificar replay/expiración.
pub const CONSUME_AUTH_CODE: &str = r#"
    UPDATE authorization_codes
    SET used = 1
    WHERE code_hash = ?1
      AND used = 0
      AND expires_at > ?2
    RETURNING id, code_hash, client_id, identity_id, redirect_uri,
              scopes_json, code_challenge, challenge_method, used, created_at, expires_at
"#;

/// Sello de uso de la credencial (validaciones exitosas).
pub const TOUCH_TOKEN_USAGE: &str = r#"
    UPDATE tokens
    SET
        last_used_at = ?2,
        usage_count = usage_count + 1
    WHERE id = ?1
"#;

/// Revocación individual con guardia de idempotencia.
pub const REVOKE_TOKEN: &str = r#"
    UPDATE tokens
    SET
        is_revoked = 1,
        revoked_at = ?2,
        revoked_by = ?3,
        revocation_reason = ?4
    WHERE id = ?1 AND is_revoked = 0
"#;

/// Revocación en cascada por sesión; retorna los jtis afectados.
pub const REVOKE_BY_SESSION: &str = r#"
    UPDATE tokens
    SET
        is_revoked = 1,
        revoked_at = ?2,
        revocation_reason = ?3
    WHERE session_id = ?1 AND is_revoked = 0
    RETURNING id, kind, expires_at
"#;

/// Defensa anti-replay: revoca toda credencial emitida desde el mismo
/// código de autorización.
pub const REVOKE_BY_AUTH_CODE: &str = r#"
    UPDATE tokens
    SET
        is_revoked = 1,
        revoked_at = ?2,
        revocation_reason = 'authorization_code_replay'
    WHERE auth_code_id = ?1 AND is_revoked = 0
    RETURNING id, kind, expires_at
"#;

/// Revocación total de una identidad (logout-all / incidente).
pub const REVOKE_BY_SUBJECT: &str = r#"
    UPDATE tokens
    SET
        is_revoked = 1,
        revoked_at = ?2,
        revoked_by = ?3,
        revocation_reason = ?4
    WHERE subject_id = ?1 AND is_revoked = 0
    RETURNING id, kind, expires_at
"#;

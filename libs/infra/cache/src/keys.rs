// [libs/infra/cache/src/keys.rs]
/*!
 * =================================================================
 * APARATO: EPHEMERAL KEY NAMESPACE (V1.2)
 * CLASIFICACIÓN: INFRASTRUCTURE SQL-ANALOG (ESTRATO L3)
 * RESPONSABILIDAD: GRAMÁTICA ÚNICA DEL ESPACIO DE LLAVES EFÍMERAS
 *
 * VISION HIPER-HOLÍSTICA:
 * Toda llave del KeyValueStore nace aquí. Un typo en una llave de
 * blacklist equivale a aceptar un token revocado; la gramática es
 * por tanto un aparato y no una convención.
 * =================================================================
 */

use uuid::Uuid;

/// Proyección cacheada de una sesión activa.
pub fn session(session_id: Uuid) -> String {
    format!("session:{}", session_id)
}

/// Marca de revocación de un JWT individual (por jti).
pub fn token_blacklist(jti: Uuid) -> String {
    format!("token:blacklist:{}", jti)
}

/// Bóveda efímera de códigos de autorización (indexada por digest).
pub fn auth_code(code_hash: &str) -> String {
    format!("authcode:{}", code_hash)
}

/// Contador de ventana deslizante para rate limiting.
pub fn rate(action: &str, subject: &str) -> String {
    format!("rate:{}:{}", action, subject)
}

/// Registro de autorización pendiente de consentimiento.
pub fn oauth_pending(request_id: Uuid) -> String {
    format!("oauth_pending:{}", request_id)
}

/// Veredicto de protección cacheado (handle ya normalizado).
pub fn protection(normalized_handle: &str) -> String {
    format!("protection:{}", normalized_handle)
}

/// Cerrojo consultivo por identidad (serialización de escrituras).
pub fn identity_lock(identity_id: Uuid) -> String {
    format!("lock:identity:{}", identity_id)
}

/// OTP efímero de un desafío MFA (SMS/email).
pub fn mfa_otp(method_id: Uuid) -> String {
    format!("mfa:otp:{}", method_id)
}

/// Ticket de desafío MFA pendiente (login en dos pasos).
pub fn mfa_challenge(challenge_token: &str) -> String {
    format!("mfa:challenge:{}", challenge_token)
}

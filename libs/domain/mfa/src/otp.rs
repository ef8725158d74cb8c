// INICIO DEL ARCHIVO [libs/domain/mfa/src/otp.rs]
/*!
 * =================================================================
 * APARATO: NUMERIC OTP FORGE (V1.2)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: OTPS DE 6 DÍGITOS PARA CANALES SMS/EMAIL
 *
 * VISION HIPER-HOLÍSTICA:
 * El OTP vive exclusivamente en el KeyValueStore bajo mfa:otp:{id}
 * con TTL de 300 s; este forjador solo produce el material.
 * =================================================================
 */

use rand::rngs::OsRng;
use rand::Rng;

/// Dígitos del OTP de canal.
pub const OTP_DIGITS: usize = 6;
/// TTL contractual del OTP en el estrato efímero (5 minutos).
pub const OTP_TTL_SECONDS: i64 = 300;

/// Forja un OTP numérico de 6 dígitos con padding de ceros.
pub fn forge_numeric_otp() -> String {
    let mut source_of_randomness = OsRng;
    let numeric_value: u32 = source_of_randomness.gen_range(0..1_000_000);
    format!("{:06}", numeric_value)
}

// FIN DEL ARCHIVO [libs/domain/mfa/src/otp.rs]

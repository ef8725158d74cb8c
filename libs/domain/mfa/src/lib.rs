
pub mod backup;
pub mod errors;
pub mod otp;
pub mod totp;

pub use backup::{digest_backup_code, forge_backup_codes, BACKUP_CODE_COUNT, BACKUP_CODE_LENGTH};
pub use errors::MfaEngineError;
pub use otp::{forge_numeric_otp, OTP_DIGITS, OTP_TTL_SECONDS};
pub use totp::{current_totp_code, generate_totp_secret, verify_totp};

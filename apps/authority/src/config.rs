// INICIO DEL ARCHIVO [apps/authority/src/config.rs]
/*!
 * =================================================================
 * APARATO: AUTHORITY CONFIGURATION (V3.0 - CONTRACT DEFAULTS)
 * CLASIFICACIÓN: APPLICATION CONFIG (ESTRATO L1-APP)
 * RESPONSABILIDAD: OPCIONES RECONOCIDAS DEL NÚCLEO Y SU HIDRATACIÓN
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. CONTRACT DEFAULTS: Cada opción porta su default contractual;
 *    la hidratación desde el entorno solo sobreescribe lo declarado.
 * 2. NO GLOBALS: La configuración viaja dentro del AppState; ningún
 *    servicio lee variables de entorno en caliente.
 * =================================================================
 */

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Política de rotación del refresh token.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RefreshRotationPolicy {
    /// Rota en cada refresh y revoca el anterior de inmediato (default).
    Always,
    /// Jamás rota: el refresh original vive hasta su expiración.
    Never,
    /// Rota con período de gracia para tolerar reintentos del cliente.
    WithGrace,
}

impl RefreshRotationPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "always" => Some(Self::Always),
            "never" => Some(Self::Never),
            "with-grace" => Some(Self::WithGrace),
            _ => None,
        }
    }
}

/// Configuración completa de la Autoridad (opciones §contract).
#[derive(Debug, Clone)]
pub struct AuthorityConfig {
    // --- IDENTIDAD DEL EMISOR ---
    pub issuer: String,
    pub audience: String,

    // --- VIDAS DE CREDENCIALES (segundos) ---
    pub access_token_ttl_seconds: u64,
    pub refresh_token_ttl_seconds: u64,
    pub auth_code_ttl_seconds: u64,
    pub clock_skew_seconds: u64,

    // --- ESCRUTINIO DE CREDENCIALES ---
    pub bcrypt_cost: u32,
    pub min_password_entropy_bits: f64,
    pub min_passphrase_entropy_bits: f64,

    // --- LOCKOUT ---
    pub failed_login_threshold: u32,
    pub failed_login_window_seconds: u64,
    pub lockout_duration_seconds: u64,

    // --- GOBERNANZA DE HANDLES ---
    pub handle_similarity_threshold: f64,
    pub protection_cache_ttl_seconds: u64,

    // --- SESIONES Y ROTACIÓN ---
    pub max_sessions_per_identity: usize,
    pub refresh_rotation: RefreshRotationPolicy,
    pub refresh_rotation_grace_seconds: u64,

    // --- BÓVEDA MFA ---
    pub mfa_vault_master_key: String,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            issuer: "https://id.entativa.com".to_string(),
            audience: "entativa-platforms".to_string(),
            access_token_ttl_seconds: 900,
            refresh_token_ttl_seconds: 2_592_000,
            auth_code_ttl_seconds: 600,
            clock_skew_seconds: 120,
            bcrypt_cost: 12,
            min_password_entropy_bits: 40.0,
            min_passphrase_entropy_bits: 50.0,
            failed_login_threshold: 5,
            failed_login_window_seconds: 900,
            lockout_duration_seconds: 1800,
            handle_similarity_threshold: 0.85,
            protection_cache_ttl_seconds: 7200,
            max_sessions_per_identity: 5,
            refresh_rotation: RefreshRotationPolicy::Always,
            refresh_rotation_grace_seconds: 0,
            mfa_vault_master_key: "insecure-dev-master-key".to_string(),
        }
    }
}

impl AuthorityConfig {
    /**
     * Hidrata la configuración desde el entorno del proceso.
     * Toda variable ausente o malformada conserva su default.
     */
    pub fn hydrate_from_environment() -> Self {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("ENTATIVA_ISSUER") {
            if !value.is_empty() {
                config.issuer = value;
            }
        }
        if let Ok(value) = std::env::var("ENTATIVA_AUDIENCE") {
            if !value.is_empty() {
                config.audience = value;
            }
        }

        hydrate_u64(&mut config.access_token_ttl_seconds, "ACCESS_TOKEN_TTL");
        hydrate_u64(&mut config.refresh_token_ttl_seconds, "REFRESH_TOKEN_TTL");
        hydrate_u64(&mut config.auth_code_ttl_seconds, "AUTH_CODE_TTL");
        hydrate_u64(&mut config.clock_skew_seconds, "CLOCK_SKEW");
        hydrate_u32(&mut config.bcrypt_cost, "BCRYPT_COST");
        hydrate_f64(&mut config.min_password_entropy_bits, "MIN_PASSWORD_ENTROPY_BITS");
        hydrate_f64(&mut config.min_passphrase_entropy_bits, "MIN_PASSPHRASE_ENTROPY_BITS");
        hydrate_u32(&mut config.failed_login_threshold, "FAILED_LOGIN_THRESHOLD");
        hydrate_u64(&mut config.failed_login_window_seconds, "FAILED_LOGIN_WINDOW");
        hydrate_u64(&mut config.lockout_duration_seconds, "LOCKOUT_DURATION");
        hydrate_f64(&mut config.handle_similarity_threshold, "HANDLE_SIMILARITY_THRESHOLD");
        hydrate_u64(&mut config.protection_cache_ttl_seconds, "PROTECTION_CACHE_TTL");
        hydrate_usize(&mut config.max_sessions_per_identity, "MAX_SESSIONS_PER_IDENTITY");
        hydrate_u64(&mut config.refresh_rotation_grace_seconds, "REFRESH_ROTATION_GRACE");

        if let Ok(value) = std::env::var("REFRESH_ROTATION") {
            if let Some(policy) = RefreshRotationPolicy::parse(&value) {
                config.refresh_rotation = policy;
            }
        }

        if let Ok(value) = std::env::var("MFA_VAULT_MASTER_KEY") {
            if !value.is_empty() {
                config.mfa_vault_master_key = value;
            }
        }

        config
    }

    // --- PROYECCIONES TEMPORALES (chrono) ---

    pub fn access_token_ttl(&self) -> Duration {
        Duration::seconds(self.access_token_ttl_seconds as i64)
    }

    pub fn refresh_token_ttl(&self) -> Duration {
        Duration::seconds(self.refresh_token_ttl_seconds as i64)
    }

    pub fn auth_code_ttl(&self) -> Duration {
        Duration::seconds(self.auth_code_ttl_seconds as i64)
    }

    pub fn failed_login_window(&self) -> Duration {
        Duration::seconds(self.failed_login_window_seconds as i64)
    }

    pub fn lockout_duration(&self) -> Duration {
        Duration::seconds(self.lockout_duration_seconds as i64)
    }

    pub fn protection_cache_ttl(&self) -> Duration {
        Duration::seconds(self.protection_cache_ttl_seconds as i64)
    }

    pub fn refresh_rotation_grace(&self) -> Duration {
        Duration::seconds(self.refresh_rotation_grace_seconds as i64)
    }
}

fn hydrate_u64(slot: &mut u64, variable: &str) {
    if let Ok(value) = std::env::var(variable) {
        if let Ok(parsed) = value.parse() {
            *slot = parsed;
        }
    }
}

fn hydrate_u32(slot: &mut u32, variable: &str) {
    if let Ok(value) = std::env::var(variable) {
        if let Ok(parsed) = value.parse() {
            *slot = parsed;
        }
    }
}

fn hydrate_f64(slot: &mut f64, variable: &str) {
    if let Ok(value) = std::env::var(variable) {
        if let Ok(parsed) = value.parse() {
            *slot = parsed;
        }
    }
}

fn hydrate_usize(slot: &mut usize, variable: &str) {
    if let Ok(value) = std::env::var(variable) {
        if let Ok(parsed) = value.parse() {
            *slot = parsed;
        }
    }
}
// FIN DEL ARCHIVO [apps/authority/src/config.rs]

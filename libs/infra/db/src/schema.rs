/**
 * =================================================================
 * APARATO: IDENTITY CORE DATABASE SCHEMA (V14.0 - FEDERATION STRATA)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: GOBERNANZA ESTRUCTURAL E IDEMPOTENCIA TOTAL
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. CATEGORY TABLES: Una tabla física por categoría protegida; la
 *    unicidad del handle canónico sobre la unión la custodia el
 *    repositorio de protección antes de cada inserción.
 * 2. PARTIAL UNIQUENESS: Índices parciales para 'una reserva pendiente
 *    por (identidad, handle)' y 'un factor MFA primario por identidad'.
 * 3. IDEMPOTENCIA: Gestión de errores para migraciones en caliente.
 * 4. PERFORMANCE: Índices de aceleración para revocación en cascada.
 * =================================================================
 */

use anyhow::{Context, Result};
use libsql::Connection;
use tracing::{debug, info, instrument, warn};

/**
 * ESTRATO 1: SOLIDIFICACIÓN (Génesis de Tablas)
 * Define las entidades durables del núcleo Entativa ID.
 */
const IDENTITY_TABLES: &[(&str, &str)] = &[
    ("TABLE_IDENTITIES", r#"
        CREATE TABLE IF NOT EXISTS identities (
            id TEXT PRIMARY KEY,
            eid TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            phone_number TEXT,
            password_hash TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'active',
            verification_status TEXT NOT NULL DEFAULT 'unverified',
            verification_badge TEXT,
            reputation_score REAL NOT NULL DEFAULT 50.0,
            failed_login_attempts INTEGER NOT NULL DEFAULT 0,
            locked_until TEXT,
            last_login_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            created_ip TEXT,
            created_user_agent TEXT
        );
    "#),
    ("TABLE_PROFILES", r#"
        CREATE TABLE IF NOT EXISTS profiles (
            identity_id TEXT PRIMARY KEY,
            display_name TEXT,
            given_name TEXT,
            family_name TEXT,
            biography TEXT,
            avatar_url TEXT,
            birth_year INTEGER,
            location TEXT,
            website_url TEXT,
            display_name_visibility TEXT NOT NULL DEFAULT 'public',
            email_visibility TEXT NOT NULL DEFAULT 'private',
            phone_visibility TEXT NOT NULL DEFAULT 'private',
            birth_visibility TEXT NOT NULL DEFAULT 'private',
            location_visibility TEXT NOT NULL DEFAULT 'friends',
            updated_at TEXT NOT NULL
        );
    "#),
    ("TABLE_RESERVED_HANDLES", r#"
        CREATE TABLE IF NOT EXISTS reserved_handles (
            handle TEXT PRIMARY KEY,
            reason TEXT NOT NULL,
            releasable INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );
    "#),
    ("TABLE_RESERVATION_REQUESTS", r#"
        CREATE TABLE IF NOT EXISTS reservation_requests (
            id TEXT PRIMARY KEY,
            identity_id TEXT NOT NULL,
            requested_handle TEXT NOT NULL,
            justification TEXT NOT NULL,
            evidence_uris_json TEXT NOT NULL DEFAULT '[]',
            status TEXT NOT NULL DEFAULT 'pending',
            reviewer_id TEXT,
            review_reason TEXT,
            appeal_justification TEXT,
            created_at TEXT NOT NULL,
            reviewed_at TEXT,
            appealed_at TEXT,
            updated_at TEXT NOT NULL
        );
    "#),
    ("TABLE_HANDLE_CHANGE_HISTORY", r#"
        CREATE TABLE IF NOT EXISTS handle_change_history (
            id TEXT PRIMARY KEY,
            identity_id TEXT NOT NULL,
            previous_eid TEXT NOT NULL,
            new_eid TEXT NOT NULL,
            reason TEXT NOT NULL,
            changed_at TEXT NOT NULL
        );
    "#),
    ("TABLE_OAUTH_CLIENTS", r#"
        CREATE TABLE IF NOT EXISTS oauth_clients (
            client_id TEXT PRIMARY KEY,
            client_secret_hash TEXT,
            client_name TEXT NOT NULL,
            redirect_uris_json TEXT NOT NULL DEFAULT '[]',
            allow_wildcard_redirects INTEGER NOT NULL DEFAULT 0,
            allowed_scopes_json TEXT NOT NULL DEFAULT '[]',
            allowed_grants_json TEXT NOT NULL DEFAULT '[]',
            pkce_policy TEXT NOT NULL DEFAULT 'optional',
            access_token_ttl_seconds INTEGER,
            refresh_token_ttl_seconds INTEGER,
            is_trusted INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'active',
            created_at TEXT NOT NULL
        );
    "#),
    ("TABLE_AUTHORIZATION_CODES", r#"
        CREATE TABLE IF NOT EXISTS authorization_codes (
            id TEXT PRIMARY KEY,
            code_hash TEXT NOT NULL UNIQUE,
            client_id TEXT NOT NULL,
            identity_id TEXT NOT NULL,
            redirect_uri TEXT NOT NULL,
            scopes_json TEXT NOT NULL DEFAULT '[]',
            code_challenge TEXT,
            challenge_method TEXT,
            used INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            expires_at TEXT NOT NULL
        );
    "#),
    ("TABLE_TOKENS", r#"
        CREATE TABLE IF NOT EXISTS tokens (
            id TEXT PRIMARY KEY,
            kind TEXT NOT NULL,
            token_hash TEXT NOT NULL UNIQUE,
            subject_id TEXT,
            client_id TEXT,
            session_id TEXT,
            auth_code_id TEXT,
            scopes_json TEXT NOT NULL DEFAULT '[]',
            issued_at TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            last_used_at TEXT,
            usage_count INTEGER NOT NULL DEFAULT 0,
            is_revoked INTEGER NOT NULL DEFAULT 0,
            revoked_at TEXT,
            revoked_by TEXT,
            revocation_reason TEXT,
            device_fingerprint TEXT,
            security_level TEXT NOT NULL DEFAULT 'standard',
            risk_score REAL NOT NULL DEFAULT 0.0,
            api_key_prefix TEXT
        );
    "#),
    ("TABLE_SESSIONS", r#"
        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            identity_id TEXT NOT NULL,
            user_agent TEXT,
            ip_address TEXT,
            geolocation TEXT,
            access_token_id TEXT NOT NULL,
            refresh_token_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            revoked_at TEXT
        );
    "#),
    ("TABLE_MFA_METHODS", r#"
        CREATE TABLE IF NOT EXISTS mfa_methods (
            id TEXT PRIMARY KEY,
            identity_id TEXT NOT NULL,
            kind TEXT NOT NULL,
            encrypted_secret TEXT NOT NULL,
            is_verified INTEGER NOT NULL DEFAULT 0,
            is_primary INTEGER NOT NULL DEFAULT 0,
            priority INTEGER NOT NULL DEFAULT 100,
            usage_count INTEGER NOT NULL DEFAULT 0,
            last_used_at TEXT,
            consecutive_failures INTEGER NOT NULL DEFAULT 0,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        );
    "#),
    ("TABLE_MFA_BACKUP_CODES", r#"
        CREATE TABLE IF NOT EXISTS mfa_backup_codes (
            id TEXT PRIMARY KEY,
            method_id TEXT NOT NULL,
            code_hash TEXT NOT NULL,
            used_at TEXT
        );
    "#),
    ("TABLE_AUDIT_EVENTS", r#"
        CREATE TABLE IF NOT EXISTS audit_events (
            id TEXT PRIMARY KEY,
            identity_id TEXT,
            actor_id TEXT,
            action TEXT NOT NULL,
            details_json TEXT NOT NULL DEFAULT '{}',
            ip_address TEXT,
            user_agent TEXT,
            occurred_at TEXT NOT NULL,
            lawful_basis TEXT NOT NULL
        );
    "#),
];

/// Gramática común de las tablas categorizadas del registro protegido.
const PROTECTED_TABLE_GRAMMAR: &str = r#"
    CREATE TABLE IF NOT EXISTS {table} (
        id TEXT PRIMARY KEY,
        canonical_handle TEXT NOT NULL UNIQUE,
        aliases_json TEXT NOT NULL DEFAULT '[]',
        display_name TEXT NOT NULL,
        metadata_json TEXT,
        requires_verification INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL
    );
"#;

/// Tablas físicas categorizadas, en el orden fijo de desempate.
pub const PROTECTED_CATEGORY_TABLES: &[(&str, &str)] = &[
    ("CELEBRITY", "protected_celebrities"),
    ("GOVERNMENT", "protected_government"),
    ("BUSINESS", "protected_business"),
    ("BRAND", "protected_brands"),
    ("ACADEMIC", "protected_academic"),
    ("MEDIA", "protected_media"),
    ("SPORTS", "protected_sports"),
    ("COMMUNITY", "protected_community"),
];

/**
 * ESTRATO 2: EVOLUCIÓN (Mutaciones de Columna)
 * Asegura que las tablas existentes se adapten a las nuevas capacidades.
 */
const EVOLUTIONARY_STRATA: &[(&str, &str)] = &[
    // --- FORENSE DE SESIONES ---
    ("SESSION_GEO", "ALTER TABLE sessions ADD COLUMN geolocation TEXT"),

    // --- RIESGO Y API KEYS ---
    ("TOKEN_RISK", "ALTER TABLE tokens ADD COLUMN risk_score REAL NOT NULL DEFAULT 0.0"),
    ("TOKEN_PREFIX", "ALTER TABLE tokens ADD COLUMN api_key_prefix TEXT"),

    // --- APELACIONES DE RESERVA ---
    ("RESERVATION_APPEAL", "ALTER TABLE reservation_requests ADD COLUMN appeal_justification TEXT"),
    ("RESERVATION_APPEALED_AT", "ALTER TABLE reservation_requests ADD COLUMN appealed_at TEXT"),
];

/**
 * ESTRATO 3: ENDURECIMIENTO (Índices de Aceleración)
 * Optimiza las rutas calientes: validación, revocación en cascada y auditoría.
 */
const ACCELERATION_INDEXES: &[(&str, &str)] = &[
    ("IDX_TOKENS_SESSION", "CREATE INDEX IF NOT EXISTS idx_tokens_session ON tokens(session_id);"),
    ("IDX_TOKENS_SUBJECT", "CREATE INDEX IF NOT EXISTS idx_tokens_subject ON tokens(subject_id, is_revoked);"),
    ("IDX_TOKENS_AUTHCODE", "CREATE INDEX IF NOT EXISTS idx_tokens_authcode ON tokens(auth_code_id);"),
    ("IDX_SESSIONS_IDENTITY", "CREATE INDEX IF NOT EXISTS idx_sessions_identity ON sessions(identity_id, revoked_at);"),
    ("IDX_AUTHCODES_EXPIRY", "CREATE INDEX IF NOT EXISTS idx_authcodes_expiry ON authorization_codes(expires_at);"),
    ("IDX_AUDIT_IDENTITY", "CREATE INDEX IF NOT EXISTS idx_audit_identity ON audit_events(identity_id, occurred_at);"),
    ("IDX_MFA_IDENTITY", "CREATE INDEX IF NOT EXISTS idx_mfa_identity ON mfa_methods(identity_id, is_active);"),
    ("IDX_BACKUP_METHOD", "CREATE INDEX IF NOT EXISTS idx_backup_method ON mfa_backup_codes(method_id, used_at);"),
    ("IDX_RESERVATIONS_IDENTITY", "CREATE INDEX IF NOT EXISTS idx_reservations_identity ON reservation_requests(identity_id);"),
    // Unicidad parcial: una sola reserva viva por (identidad, handle).
    ("IDX_RESERVATIONS_PENDING", "CREATE UNIQUE INDEX IF NOT EXISTS idx_reservations_pending ON reservation_requests(identity_id, requested_handle) WHERE status IN ('pending', 'appealed');"),
    // Unicidad parcial: un solo factor MFA primario por identidad.
    ("IDX_MFA_PRIMARY", "CREATE UNIQUE INDEX IF NOT EXISTS idx_mfa_primary ON mfa_methods(identity_id) WHERE is_primary = 1;"),
];

/**
 * Ejecuta la secuencia maestra de sincronización del esquema estructural.
 *
 * # Errors:
 * Retorna error si alguna tabla base falla en solidificarse, indicando
 * un colapso en el enlace con Turso.
 */
#[instrument(skip(database_connection))]
pub async fn apply_identity_core_schema(database_connection: &Connection) -> Result<()> {
    info!("🏗️ [SCHEMA_ENGINE]: Initiating structural synchronization V14.0...");

    solidify_base_strata(database_connection).await?;
    solidify_protected_registry(database_connection).await?;
    execute_evolutionary_repair(database_connection).await?;
    harden_access_layer(database_connection).await?;

    info!("✅ [SCHEMA_ENGINE]: Identity Ledger V14.0 level and certified.");
    Ok(())
}

async fn solidify_base_strata(db: &Connection) -> Result<()> {
    for (identifier, sql) in IDENTITY_TABLES {
        debug!("  ↳ Solidifying: {}", identifier);
        db.execute(*sql, ()).await
            .with_context(|| format!("CRITICAL_SOLIDIFICATION_FAULT: {}", identifier))?;
    }
    Ok(())
}

async fn solidify_protected_registry(db: &Connection) -> Result<()> {
    for (category_label, table_name) in PROTECTED_CATEGORY_TABLES {
        debug!("  ↳ Solidifying protected registry: {}", category_label);
        let sql = PROTECTED_TABLE_GRAMMAR.replace("{table}", table_name);
        db.execute(sql.as_str(), ()).await
            .with_context(|| format!("CRITICAL_SOLIDIFICATION_FAULT: PROTECTED_{}", category_label))?;
    }
    Ok(())
}

async fn execute_evolutionary_repair(db: &Connection) -> Result<()> {
    for (identifier, sql) in EVOLUTIONARY_STRATA {
        match db.execute(*sql, ()).await {
            Ok(_) => info!("  🟢 [REPAIR_OK]: Applied evolutionary stratum {}", identifier),
            Err(e) => {
                let message = e.to_string();
                if message.contains("duplicate column name") {
                    debug!("  ⚪ [REPAIR_SKIP]: {} already level.", identifier);
                } else {
                    warn!("  ⚠️ [REPAIR_BYPASS]: {} check incomplete: {}", identifier, message);
                }
            }
        }
    }
    Ok(())
}

async fn harden_access_layer(db: &Connection) -> Result<()> {
    for (identifier, sql) in ACCELERATION_INDEXES {
        debug!("  ↳ Hardening: {}", identifier);
        db.execute(*sql, ()).await
            .with_context(|| format!("CRITICAL_HARDENING_FAULT: {}", identifier))?;
    }
    Ok(())
}

// INICIO DEL ARCHIVO [apps/authority/src/bin/seed.rs]
//! =================================================================
//! APARATO: GENESIS REGISTRY SEEDER (V4.1 - PROTECTED STRATA)
//! CLASIFICACIÓN: INFRASTRUCTURE UTILITY (ESTRATO L3)
//! RESPONSABILIDAD: SEMBRADO ATÓMICO DEL REGISTRO PROTEGIDO Y CLIENTES
//! =================================================================

use chrono::Utc;
use dotenvy::dotenv;
use entativa_domain_models::oauth_client::{ClientStatus, GrantKind, OAuthClient, PkcePolicy};
use entativa_domain_models::protected_entity::{ProtectedCategory, ProtectedEntity};
use entativa_infra_db::repositories::{OAuthClientRepository, ProtectionRepository};
use entativa_infra_db::{DbError, TursoClient};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Registro curado inicial: (handle, display, categoría, aliases, metadata).
const GENESIS_PROTECTED_REGISTRY: &[(&str, &str, ProtectedCategory, &[&str], &str)] = &[
    ("elonmusk", "Elon Musk", ProtectedCategory::Business, &["elon"], r#"{"market_cap_usd":"1.1e12"}"#),
    ("billgates", "Bill Gates", ProtectedCategory::Business, &["gatesfoundation"], r#"{"org":"Gates Foundation"}"#),
    ("taylorswift", "Taylor Swift", ProtectedCategory::Celebrity, &["taylornation"], r#"{"grammy_wins":14}"#),
    ("rihanna", "Rihanna", ProtectedCategory::Celebrity, &["badgalriri"], "{}"),
    ("whitehouse", "The White House", ProtectedCategory::Government, &["potus"], r#"{"country":"US"}"#),
    ("nasa", "NASA", ProtectedCategory::Government, &["nasagov"], r#"{"founded":1958}"#),
    ("cocacola", "The Coca-Cola Company", ProtectedCategory::Brand, &["coke"], "{}"),
    ("nike", "Nike, Inc.", ProtectedCategory::Brand, &["nikesportswear"], "{}"),
    ("mit", "Massachusetts Institute of Technology", ProtectedCategory::Academic, &["mitnews"], r#"{"nobel_laureates":97}"#),
    ("bbcnews", "BBC News", ProtectedCategory::Media, &["bbc"], "{}"),
    ("fifa", "FIFA", ProtectedCategory::Sports, &["fifaworldcup"], "{}"),
];

/// Reservas de sistema jamás reclamables.
const GENESIS_RESERVED_HANDLES: &[(&str, &str)] = &[
    ("admin", "SYSTEM_RESERVED: administrative namespace"),
    ("root", "SYSTEM_RESERVED: administrative namespace"),
    ("support", "SYSTEM_RESERVED: support impersonation defense"),
    ("security", "SYSTEM_RESERVED: security team namespace"),
    ("entativa", "SYSTEM_RESERVED: platform brand"),
    ("api", "SYSTEM_RESERVED: infrastructure namespace"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter("info,entativa_infra_db=debug")
        .with_target(false)
        .init();

    info!("💠 [GENESIS_SEEDER]: Initiating protected registry hydration...");

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "file:entativa_authority.db".to_string());
    let database_token = std::env::var("TURSO_AUTH_TOKEN").ok();

    let database_client = match TursoClient::connect(&database_url, database_token).await {
        Ok(client) => client,
        Err(uplink_fault) => {
            error!("❌ [SEEDER_FAULT]: UPLINK_COLLAPSE: {}", uplink_fault);
            return Err(anyhow::anyhow!(uplink_fault));
        }
    };

    let protection_repository = ProtectionRepository::new(database_client.clone());
    let client_repository = OAuthClientRepository::new(database_client.clone());
    let now = Utc::now();

    // 1. RESERVAS DE SISTEMA
    info!("🛡️  [SEEDER]: Planting system reserved handles...");
    for (handle, reason) in GENESIS_RESERVED_HANDLES {
        protection_repository
            .insert_reserved(handle, reason, false, now)
            .await?;
    }

    // 2. REGISTRO CATEGORIZADO DE ENTIDADES PROTEGIDAS
    info!("🏛️  [SEEDER]: Crystallizing protected entity registry...");
    for (handle, display_name, category, aliases, metadata) in GENESIS_PROTECTED_REGISTRY {
        let entity = ProtectedEntity {
            id: Uuid::new_v4(),
            canonical_handle: (*handle).to_string(),
            aliases: aliases.iter().map(|a| (*a).to_string()).collect(),
            category: *category,
            display_name: (*display_name).to_string(),
            metadata_json: Some((*metadata).to_string()),
            requires_verification: true,
            created_at: now,
        };

        match protection_repository.insert_protected(&entity).await {
            Ok(()) => {}
            Err(DbError::DuplicateProtectedHandle) => {
                warn!("  ⚪ [SEEDER_SKIP]: [{}] already registered.", handle);
            }
            Err(seed_fault) => return Err(anyhow::anyhow!(seed_fault)),
        }
    }

    // 3. CLIENTES OAUTH2 DE GÉNESIS
    info!("🤝 [SEEDER]: Registering genesis OAuth2 clients...");

    // Cliente público (SPA/móvil): PKCE incondicional.
    client_repository
        .upsert_client(&OAuthClient {
            client_id: "web-app".to_string(),
            client_secret_hash: None,
            client_name: "Entativa Web".to_string(),
            redirect_uris: vec!["https://app.entativa.com/callback".to_string()],
            allow_wildcard_redirects: false,
            allowed_scopes: vec![
                "openid".to_string(),
                "profile".to_string(),
                "email".to_string(),
            ],
            allowed_grants: vec![GrantKind::AuthorizationCode, GrantKind::RefreshToken],
            pkce_policy: PkcePolicy::Required,
            access_token_ttl_seconds: None,
            refresh_token_ttl_seconds: None,
            is_trusted: false,
            status: ClientStatus::Active,
            created_at: now,
        })
        .await?;

    // Cliente confidencial interno (plataformas federadas).
    let federation_secret_hash = bcrypt::hash("genesis-federation-secret", 12)
        .map_err(|fault| anyhow::anyhow!("BCRYPT_ENGINE_FAULT: {}", fault))?;
    client_repository
        .upsert_client(&OAuthClient {
            client_id: "federation-core".to_string(),
            client_secret_hash: Some(federation_secret_hash),
            client_name: "Entativa Federation Core".to_string(),
            redirect_uris: vec!["https://federation.entativa.com/callback".to_string()],
            allow_wildcard_redirects: false,
            allowed_scopes: vec![
                "openid".to_string(),
                "profile".to_string(),
                "email".to_string(),
                "federation.sync".to_string(),
            ],
            allowed_grants: vec![
                GrantKind::AuthorizationCode,
                GrantKind::RefreshToken,
                GrantKind::ClientCredentials,
            ],
            pkce_policy: PkcePolicy::Optional,
            access_token_ttl_seconds: None,
            refresh_token_ttl_seconds: None,
            is_trusted: true,
            status: ClientStatus::Active,
            created_at: now,
        })
        .await?;

    let registry_population = protection_repository.count_entries().await?;
    info!(
        "🚀 [SEEDER]: Genesis hydration complete ({} protected entities).",
        registry_population
    );
    Ok(())
}
// FIN DEL ARCHIVO [apps/authority/src/bin/seed.rs]

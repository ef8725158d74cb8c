// INICIO DEL ARCHIVO [libs/infra/db/src/client.rs]
/*!
 * =================================================================
 * APARATO: IDENTITY LEDGER CLIENT (V4.0 - INTEGRITY HANDSHAKE)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: ENLACE AL MOTOR A Y APRETÓN DE MANOS DE IGNICIÓN
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. CONNECT PROFILES: La URL se clasifica en un perfil nominal
 *    (Memory / LocalFile / RemoteTurso); cada perfil porta sus
 *    propias exigencias (token para remoto, retención de enlace
 *    para RAM compartida).
 * 2. IGNITION HANDSHAKE: Una sola secuencia ordenada: pragmas de
 *    sesión -> esquema del núcleo -> sonda de integridad sobre las
 *    tablas críticas de identidad. Si la sonda no encuentra la
 *    bóveda de tokens o el libro de auditoría, la ignición aborta.
 * 3. RAM RETENTION: En perfil Memory el enlace del handshake se
 *    retiene de por vida; soltarlo dejaría que SQLite descarte el
 *    segmento compartido con todo el núcleo dentro.
 * =================================================================
 */

use crate::errors::DbError;
use crate::schema::apply_identity_core_schema;
use libsql::{Builder, Connection, Database};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Tablas cuya ausencia tras el handshake es colapso de ignición.
/// La sonda cubre una por estrato: identidades (raíz), tokens
/// (emisión), códigos (OAuth2) y auditoría (cumplimiento).
const INTEGRITY_PROBE_TABLES: [&str; 4] =
    ["identities", "tokens", "authorization_codes", "audit_events"];

/// Perfil de conexión derivado de la URL del despliegue.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConnectProfile {
    /// RAM compartida (tests / efímero). Exige retención del enlace.
    Memory,
    /// Archivo local (desarrollo y despliegues de nodo único).
    LocalFile,
    /// Cluster Turso remoto. Exige token de acceso.
    RemoteTurso,
}

impl ConnectProfile {
    fn classify(url: &str) -> Self {
        if url.contains(":memory:") || url.contains("mode=memory") {
            Self::Memory
        } else if url.starts_with("libsql://") || url.starts_with("https://") {
            Self::RemoteTurso
        } else {
            Self::LocalFile
        }
    }
}

/// Cliente del libro mayor de identidad (Motor A).
#[derive(Clone)]
pub struct TursoClient {
    ledger_driver: Arc<Database>,
    /// Enlace retenido del handshake; solo Some bajo perfil Memory,
    /// donde ancla el segmento compartido de SQLite.
    handshake_link_retained: Option<Arc<Connection>>,
}

impl TursoClient {
    /**
     * Establece el enlace y ejecuta el handshake de ignición.
     *
     * # Logic:
     * 1. Clasifica la URL en su perfil de conexión.
     * 2. Construye el driver (el perfil remoto exige token).
     * 3. Handshake sobre un único enlace: pragmas -> esquema ->
     *    sonda de integridad de las tablas críticas.
     * 4. Bajo perfil Memory, retiene ese mismo enlace de por vida.
     *
     * # Errors:
     * - `DbError::ConfigurationError`: URL vacía o token ausente.
     * - `DbError::ConnectionError`: driver o handshake colapsados.
     */
    #[instrument(skip(access_token))]
    pub async fn connect(ledger_url: &str, access_token: Option<String>) -> Result<Self, DbError> {
        if ledger_url.trim().is_empty() {
            return Err(DbError::ConfigurationError(
                "IDENTITY_LEDGER_URL_VOID".into(),
            ));
        }

        let profile = ConnectProfile::classify(ledger_url);
        info!(
            "🔌 [LEDGER]: Opening identity ledger link ({:?}) to [{}]",
            profile, ledger_url
        );

        let ledger_driver = match profile {
            ConnectProfile::RemoteTurso => {
                let token = access_token.ok_or_else(|| {
                    DbError::ConfigurationError(
                        "REMOTE_LEDGER_TOKEN_VOID: Turso access denied".into(),
                    )
                })?;
                Builder::new_remote(ledger_url.to_string(), token).build().await
            }
            ConnectProfile::Memory | ConnectProfile::LocalFile => {
                Builder::new_local(ledger_url).build().await
            }
        }
        .map_err(|fault| {
            DbError::ConnectionError(format!("LEDGER_DRIVER_IGNITION_FAILURE: {}", fault))
        })?;

        let ledger_driver = Arc::new(ledger_driver);

        // HANDSHAKE DE IGNICIÓN: un único enlace atraviesa las tres fases.
        let handshake_link = ledger_driver
            .connect()
            .map_err(|fault| DbError::ConnectionError(format!("HANDSHAKE_LINK_FAULT: {}", fault)))?;

        Self::apply_session_pragmas(&handshake_link).await;

        apply_identity_core_schema(&handshake_link)
            .await
            .map_err(|fault| DbError::ConnectionError(format!("SCHEMA_HANDSHAKE_FAULT: {}", fault)))?;

        Self::probe_core_integrity(&handshake_link).await?;

        // Bajo perfil Memory el enlace del handshake ancla el segmento
        // compartido; en los demás perfiles se deja caer.
        let handshake_link_retained = match profile {
            ConnectProfile::Memory => {
                info!("⚓ [LEDGER]: Shared-memory segment anchored by handshake link.");
                Some(Arc::new(handshake_link))
            }
            _ => None,
        };

        info!("✅ [LEDGER]: Identity ledger handshake complete; core tables certified.");
        Ok(Self {
            ledger_driver,
            handshake_link_retained,
        })
    }

    /// Enlace fresco para una operación de repositorio.
    pub fn acquire_connection(&self) -> Result<Connection, DbError> {
        self.ledger_driver.connect().map_err(|fault| {
            error!("⚠️ [LEDGER_FAULT]: Link allocation failed: {}", fault);
            DbError::ConnectionError(fault.to_string())
        })
    }

    /// Latido del enlace para los daemons de salud.
    pub async fn ping(&self) -> Result<(), DbError> {
        let link = self.acquire_connection()?;
        link.query("SELECT 1", ()).await?;
        Ok(())
    }

    // --- FASES INTERNAS DEL HANDSHAKE ---

    /// Pragmas de sesión del handshake. Best-effort: un backend que los
    /// rechace (Turso remoto) no aborta la ignición.
    async fn apply_session_pragmas(link: &Connection) {
        for pragma in ["PRAGMA foreign_keys = ON", "PRAGMA busy_timeout = 5000"] {
            if let Err(pragma_fault) = link.execute(pragma, ()).await {
                warn!("  ⚪ [HANDSHAKE_PRAGMA]: '{}' not honored: {}", pragma, pragma_fault);
            }
        }
    }

    /**
     * Sonda de integridad: las tablas críticas del núcleo deben ser
     * consultables tras el esquema. Una bóveda ausente es colapso de
     * ignición, jamás un fallo silencioso diferido al primer login.
     */
    async fn probe_core_integrity(link: &Connection) -> Result<(), DbError> {
        for table in INTEGRITY_PROBE_TABLES {
            let probe_statement = format!("SELECT COUNT(*) FROM {}", table);
            link.query(probe_statement.as_str(), ())
                .await
                .map_err(|fault| {
                    DbError::ConnectionError(format!(
                        "INTEGRITY_PROBE_FAULT: core table '{}' unreachable -> {}",
                        table, fault
                    ))
                })?;
        }
        Ok(())
    }
}
// FIN DEL ARCHIVO [libs/infra/db/src/client.rs]

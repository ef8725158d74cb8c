// [apps/authority/src/state/mod.rs]
/*!
 * =================================================================
 * APARATO: SOVEREIGN STATE AUTHORITY (V4.0 - FEDERATION GOLD)
 * CLASIFICACIÓN: APPLICATION STATE (ESTRATO L1-APP)
 * RESPONSABILIDAD: CONTEXTO EXPLÍCITO DE APLICACIÓN (PLACA BASE)
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. NO SINGLETONS: Todo punto de entrada recibe este contexto con
 *    los handles a los almacenes, la configuración y el reloj;
 *    ningún servicio toca estado global.
 * 2. COMPOSITION ROOT: Centraliza los 8 repositorios, el llavero
 *    RS256, el estrato efímero y los colaboradores externos
 *    (oráculo de brechas, sink de notificaciones, geolocalizador).
 * 3. SNAPSHOT STRATA: El snapshot read-mostly del registro protegido
 *    vive aquí para que todos los gobernadores compartan la vista.
 *
 * # Mathematical Proof (Deterministic State Hub):
 * El aparato garantiza coherencia 360°: cualquier invalidación del
 * registro protegido es visible instantáneamente por todo servicio
 * que consulte el snapshot, pues comparten el mismo Arc<RwLock>.
 * =================================================================
 */

use crate::clock::{Clock, SystemClock};
use crate::config::AuthorityConfig;
use crate::errors::AuthorityError;
use entativa_core_credential::{BloomBreachOracle, BreachOracle};
use entativa_core_token_forge::{TokenForge, TokenKeyring};
use entativa_domain_models::protected_entity::ProtectedEntity;
use entativa_domain_notification::{NotificationSink, TracingSink};
use entativa_infra_cache::{KeyValueStore, MemoryKeyValueStore};
use entativa_infra_db::repositories::{
    AuditRepository, IdentityRepository, MfaRepository, OAuthClientRepository,
    ProtectionRepository, ReservationRepository, SessionRepository, TokenRepository,
};
use entativa_infra_db::TursoClient;
use std::sync::{Arc, RwLock};
use tracing::debug;

use crate::services::geolocation::{GeoResolver, NoopGeoResolver};

/**
 * Contenedor de estado compartido (Thread-Safe) de la Autoridad.
 * Actúa como la placa base neural donde se conectan todos los estratos.
 */
#[derive(Clone)]
pub struct AppState {
    /// Configuración contractual del núcleo.
    pub config: Arc<AuthorityConfig>,
    /// Fuente única de tiempo del contexto.
    pub clock: Arc<dyn Clock>,
    /// Cliente táctico del Motor A (Turso / libSQL).
    pub database_client: TursoClient,
    /// Estrato efímero (sesiones, blacklist, contadores, códigos).
    pub cache: Arc<dyn KeyValueStore>,
    /// Llavero de firma RS256 rotable.
    pub keyring: Arc<TokenKeyring>,
    /// Motor de acuñación y validación JWT.
    pub token_forge: Arc<TokenForge>,
    /// Oráculo de brechas de credenciales (pluggable).
    pub breach_oracle: Arc<dyn BreachOracle>,
    /// Contrato único de despacho de notificaciones.
    pub notification_sink: Arc<dyn NotificationSink>,
    /// Proveedor opaco de geolocalización gruesa.
    pub geo_resolver: Arc<dyn GeoResolver>,
    /// Snapshot read-mostly del registro de entidades protegidas.
    pub protection_snapshot: Arc<RwLock<Option<Vec<ProtectedEntity>>>>,

    // --- REPOSITORIOS DE AUTORIDAD ÚNICA (L3) ---
    pub identity_repository: Arc<IdentityRepository>,
    pub protection_repository: Arc<ProtectionRepository>,
    pub reservation_repository: Arc<ReservationRepository>,
    pub oauth_client_repository: Arc<OAuthClientRepository>,
    pub token_repository: Arc<TokenRepository>,
    pub session_repository: Arc<SessionRepository>,
    pub mfa_repository: Arc<MfaRepository>,
    pub audit_repository: Arc<AuditRepository>,
}

impl AppState {
    /**
     * Forja el Estado Maestro con los colaboradores por defecto:
     * caché en memoria, oráculo Bloom local, sink de trazas y
     * geolocalizador nulo. Los despliegues federados sustituyen
     * cada colaborador vía `forge_with_collaborators`.
     */
    pub fn forge(
        database_client: TursoClient,
        config: AuthorityConfig,
    ) -> Result<Self, AuthorityError> {
        Self::forge_with_collaborators(
            database_client,
            config,
            Arc::new(SystemClock),
            Arc::new(MemoryKeyValueStore::new()),
            Arc::new(BloomBreachOracle::with_default_blocklist()),
            Arc::new(TracingSink),
            Arc::new(NoopGeoResolver),
        )
    }

    /// Ignición completa con colaboradores inyectados (DI total).
    pub fn forge_with_collaborators(
        database_client: TursoClient,
        config: AuthorityConfig,
        clock: Arc<dyn Clock>,
        cache: Arc<dyn KeyValueStore>,
        breach_oracle: Arc<dyn BreachOracle>,
        notification_sink: Arc<dyn NotificationSink>,
        geo_resolver: Arc<dyn GeoResolver>,
    ) -> Result<Self, AuthorityError> {
        debug!("🧬 [APP_STATE]: Executing sovereign ignition sequence V4.0...");

        // El llavero es material crítico: su colapso aborta la ignición.
        let keyring = Arc::new(TokenKeyring::ignite()?);
        let token_forge = Arc::new(TokenForge::new(
            keyring.clone(),
            config.issuer.clone(),
            config.audience.clone(),
            config.clock_skew_seconds,
        ));

        Ok(Self {
            config: Arc::new(config),
            clock,
            cache,
            keyring,
            token_forge,
            breach_oracle,
            notification_sink,
            geo_resolver,
            protection_snapshot: Arc::new(RwLock::new(None)),

            identity_repository: Arc::new(IdentityRepository::new(database_client.clone())),
            protection_repository: Arc::new(ProtectionRepository::new(database_client.clone())),
            reservation_repository: Arc::new(ReservationRepository::new(database_client.clone())),
            oauth_client_repository: Arc::new(OAuthClientRepository::new(database_client.clone())),
            token_repository: Arc::new(TokenRepository::new(database_client.clone())),
            session_repository: Arc::new(SessionRepository::new(database_client.clone())),
            mfa_repository: Arc::new(MfaRepository::new(database_client.clone())),
            audit_repository: Arc::new(AuditRepository::new(database_client.clone())),

            database_client,
        })
    }

    /// Invalida el snapshot del registro protegido (tras una mutación).
    pub fn invalidate_protection_snapshot(&self) {
        if let Ok(mut snapshot_guard) = self.protection_snapshot.write() {
            *snapshot_guard = None;
        }
    }
}

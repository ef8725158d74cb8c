// INICIO DEL ARCHIVO [apps/authority/src/kernel.rs]
/**
 * =================================================================
 * APARATO: AUTHORITY SOVEREIGN KERNEL (V4.1 - GUARD ACTIVE)
 * CLASIFICACIÓN: COMPOSITION ROOT (ESTRATO L1-APP)
 * RESPONSABILIDAD: BOOTSTRAP DE INFRAESTRUCTURA E IGNICIÓN SEGURA
 *
 * VISION HIPER-HOLÍSTICA:
 * Actúa como la placa base donde se conectan todos los servicios.
 * La ignición establece el enlace con el Motor A, forja el llavero
 * RS256 y enciende los daemons de higiene ANTES de aceptar trabajo.
 * =================================================================
 */

use crate::config::AuthorityConfig;
use crate::errors::AuthorityError;
use crate::services::{spawn_hygiene_reaper, LockoutReleaseWarden};
use crate::state::AppState;
use entativa_infra_db::TursoClient;
use tracing::{info, instrument};

pub struct AuthorityKernel {
    pub application_shared_state: AppState,
}

impl AuthorityKernel {
    /**
     * Realiza la ignición del cliente táctico y el estado neural.
     * Establece la conexión a la base de datos y forja el material
     * criptográfico antes de levantar servicios.
     *
     * # Errors:
     * - `AuthorityError::Fatal`: llavero RS256 incapaz de forjarse.
     * - `AuthorityError::ServiceUnavailable`: enlace DB colapsado.
     */
    #[instrument(skip(database_access_token, config))]
    pub async fn ignite(
        database_connection_url: &str,
        database_access_token: Option<String>,
        config: AuthorityConfig,
    ) -> Result<Self, AuthorityError> {
        let database_client = TursoClient::connect(database_connection_url, database_access_token)
            .await
            .map_err(AuthorityError::from)?;

        let application_shared_state = AppState::forge(database_client, config)?;

        info!(
            "🛰️  [KERNEL]: Authority core ignited (issuer [{}], keyring size {}).",
            application_shared_state.config.issuer,
            application_shared_state.keyring.ring_size()
        );

        Ok(Self {
            application_shared_state,
        })
    }

    /**
     * Lanza las operaciones autónomas de fondo: el reaper de higiene
     * (celdas efímeras + códigos vencidos) y el guardián de vetos
     * (auto-curación de lockouts lapsados).
     */
    pub async fn launch_sovereign_operations(&self) {
        spawn_hygiene_reaper(self.application_shared_state.clone()).await;

        LockoutReleaseWarden::new(self.application_shared_state.clone())
            .spawn_warden_daemon()
            .await;

        info!("🧹 [KERNEL]: Background hygiene and veto-warden strata online.");
    }
}
// FIN DEL ARCHIVO [apps/authority/src/kernel.rs]

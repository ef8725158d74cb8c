// [apps/authority/src/main.rs]
/*!
 * =================================================================
 * APARATO: AUTHORITY MAIN ENTRY POINT (V4.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L3)
 * RESPONSABILIDAD: BOOTSTRAP DE INFRAESTRUCTURA E IGNICIÓN SEGURA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. ZERO ABBREVIATIONS: Nomenclatura nominal absoluta en la captura
 *    de entorno y configuración.
 * 2. TRANSPORT EXTERNALITY: El transporte HTTP es un colaborador
 *    externo; este binario levanta el núcleo semántico, los daemons
 *    y queda a la espera de la señal de apagado.
 *
 * # Mathematical Proof (Deterministic Ignition):
 * El proceso garantiza que el llavero RS256 y el esquema del Motor A
 * estén cristalizados ANTES de declarar el núcleo operativo,
 * previniendo estados de carrera donde un consumidor solicite JWKS
 * aún no forjados.
 * =================================================================
 */

use dotenvy::dotenv;
use entativa_authority::prelude::*;
use entativa_shared_heimdall::init_tracing;
use tracing::{error, info};

/**
 * Punto de ignición supremo del binario de la Autoridad.
 */
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. CARGA DE ENTORNO SOBERANO
    dotenv().ok();

    // 2. INICIALIZACIÓN DE OBSERVABILIDAD NEURAL (HEIMDALL)
    init_tracing("entativa_authority");

    // 3. RUNTIME SOBERANO
    let runtime_authority = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime_authority.block_on(async {
        info!("🛰️  [AUTHORITY]: Global ignition sequence starting...");

        // 4. ADQUISICIÓN DE COORDENADAS TÁCTICAS
        let database_connection_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "file:entativa_authority.db".to_string());
        let database_access_token = std::env::var("TURSO_AUTH_TOKEN").ok();

        // 5. HIDRATACIÓN DE CONFIGURACIÓN CONTRACTUAL
        let configuration = AuthorityConfig::hydrate_from_environment();

        // 6. IGNICIÓN DEL KERNEL SOBERANO
        let kernel_instance = match AuthorityKernel::ignite(
            &database_connection_url,
            database_access_token,
            configuration,
        )
        .await
        {
            Ok(kernel) => kernel,
            Err(ignition_fault) => {
                error!("❌ [IGNITION_FAILED]: Authority core collapsed: {}", ignition_fault);
                std::process::exit(1);
            }
        };

        // 7. DAEMONS DE FONDO
        kernel_instance.launch_sovereign_operations().await;

        info!("✅ [AUTHORITY]: Identity core operational. Awaiting shutdown signal.");

        // 8. ESPERA DE LA SEÑAL DE APAGADO (el transporte vive afuera)
        if let Err(signal_fault) = tokio::signal::ctrl_c().await {
            error!("❌ [SIGNAL_FAULT]: Shutdown listener collapsed: {}", signal_fault);
        }
        info!("🛑 [AUTHORITY]: Shutdown signal received. Core draining.");
    });

    Ok(())
}

// INICIO DEL ARCHIVO [tests/mirror/libs/shared/heimdall/heimdall_integrity.test.rs]
/**
 * =================================================================
 * APARATO: HEIMDALL INTEGRITY TEST (V1.1)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar la ignición idempotente-única del observador.
 * =================================================================
 */

use entativa_shared_heimdall::init_tracing;

/**
 * CERTIFICACIÓN: La ignición instala suscriptor global y Phoenix
 * Shield sin pánico. Una segunda ignición en el MISMO proceso sí
 * entraría en pánico (contrato de suscriptor único), por lo que este
 * archivo contiene un solo test.
 */
#[test]
fn certify_single_ignition() {
    init_tracing("entativa_authority_test");

    tracing::info!("🧪 [PROVING_GROUNDS]: Heimdall strata operational.");
    tracing::debug!("debug trace emitted under test filter");
}
// FIN DEL ARCHIVO [tests/mirror/libs/shared/heimdall/heimdall_integrity.test.rs]

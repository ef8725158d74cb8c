// [libs/infra/db/src/repositories/mapping.rs]
/*!
 * =================================================================
 * APARATO: ROW MAPPING TOOLKIT (V2.0)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: TRANSFORMACIÓN SQLITE <-> DOMINIO SIN PÉRDIDA
 *
 * VISION HIPER-HOLÍSTICA:
 * Toda conversión de tipos entre el motor libSQL y el Dominio L2
 * pasa por este aparato. Un mapeo divergente en dos repositorios
 * equivale a dos verdades; aquí vive la única.
 * =================================================================
 */

use crate::errors::DbError;
use chrono::{DateTime, Utc};
use libsql::Row;
use uuid::Uuid;

/// Extrae un timestamp RFC 3339 opcional de la columna indicada.
pub fn extract_datetime(row: &Row, index: i32) -> Option<DateTime<Utc>> {
    row.get::<Option<String>>(index).ok().flatten().and_then(|ts| {
        DateTime::parse_from_rfc3339(&ts)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    })
}

/// Extrae un timestamp obligatorio; su ausencia es violación de mapeo.
pub fn require_datetime(row: &Row, index: i32, column: &str) -> Result<DateTime<Utc>, DbError> {
    extract_datetime(row, index)
        .ok_or_else(|| DbError::MappingError(format!("NON_TEMPORAL_CELL: {}", column)))
}

/// Extrae un UUID obligatorio de una columna TEXT.
pub fn require_uuid(row: &Row, index: i32, column: &str) -> Result<Uuid, DbError> {
    let raw: String = row.get(index)?;
    Uuid::parse_str(&raw)
        .map_err(|_| DbError::MappingError(format!("NON_UUID_CELL: {} -> {}", column, raw)))
}

/// Extrae un UUID opcional de una columna TEXT anulable.
pub fn extract_uuid(row: &Row, index: i32) -> Option<Uuid> {
    row.get::<Option<String>>(index)
        .ok()
        .flatten()
        .and_then(|raw| Uuid::parse_str(&raw).ok())
}

/// Rehidrata un arreglo de strings persistido como JSON.
pub fn extract_string_vec(row: &Row, index: i32, column: &str) -> Result<Vec<String>, DbError> {
    let raw: String = row.get(index)?;
    serde_json::from_str(&raw)
        .map_err(|_| DbError::MappingError(format!("NON_JSON_ARRAY_CELL: {}", column)))
}

/// Cristaliza un arreglo de strings hacia su celda JSON.
pub fn crystallize_string_vec(values: &[String]) -> Result<String, DbError> {
    serde_json::to_string(values)
        .map_err(|fault| DbError::MappingError(format!("SERIALIZATION_FAULT: {}", fault)))
}

/// Convierte la celda entera 0/1 de SQLite en booleano del dominio.
pub fn extract_bool(row: &Row, index: i32) -> Result<bool, DbError> {
    Ok(row.get::<i64>(index)? != 0)
}

/// Marca temporal canónica para celdas TEXT (RFC 3339).
pub fn stamp(moment: DateTime<Utc>) -> String {
    moment.to_rfc3339()
}

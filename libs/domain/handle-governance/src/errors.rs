// [libs/domain/handle-governance/src/errors.rs]
/*!
 * =================================================================
 * APARATO: HANDLE FAULT CATALOG (V2.0 - FIELD LEVEL)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: VIOLACIONES SINTÁCTICAS CON DETALLE DE CAMPO
 *
 * VISION HIPER-HOLÍSTICA:
 * Cada variante nombra la regla violada; el estrato de entrada las
 * reporta con detalle de campo y jamás las reintenta.
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandleFault {
    /// Longitud fuera del rango [3, 30] tras la normalización.
    #[error("[L2_HANDLE_FAULT]: LENGTH_OUT_OF_BOUNDS -> {observed} (expected 3..=30)")]
    LengthOutOfBounds { observed: usize },

    /// Carácter fuera del alfabeto [a-z0-9_.].
    #[error("[L2_HANDLE_FAULT]: FORBIDDEN_CHARACTER -> '{character}'")]
    ForbiddenCharacter { character: char },

    /// El primer carácter debe ser una letra.
    #[error("[L2_HANDLE_FAULT]: LEADING_CHARACTER_NOT_ALPHABETIC")]
    LeadingCharacterNotAlphabetic,

    /// Dos separadores consecutivos ('__', '..', '._', '_.').
    #[error("[L2_HANDLE_FAULT]: CONSECUTIVE_SEPARATORS")]
    ConsecutiveSeparators,

    /// El handle no puede terminar en separador.
    #[error("[L2_HANDLE_FAULT]: TRAILING_SEPARATOR")]
    TrailingSeparator,

    /// El handle quedó vacío tras la normalización.
    #[error("[L2_HANDLE_FAULT]: EMPTY_AFTER_NORMALIZATION")]
    EmptyAfterNormalization,
}

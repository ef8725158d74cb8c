// INICIO DEL ARCHIVO [libs/domain/handle-governance/src/alternatives.rs]
/*!
 * =================================================================
 * APARATO: ALTERNATIVE HANDLE FORGE (V2.0)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: CANDIDATOS DE REMEDIACIÓN PARA HANDLES VETADOS
 *
 * VISION HIPER-HOLÍSTICA:
 * El forjador produce la lista bruta de candidatos; el Gobernador
 * (L4) los filtra por disponibilidad real y recorta a 5. Todo
 * candidato respeta la gramática sintáctica (incluida la frontera
 * de 30 caracteres).
 * =================================================================
 */

use crate::syntax::{normalize_and_validate, HANDLE_MAX_LENGTH};
use rand::rngs::OsRng;
use rand::Rng;

/**
 * Forja la lista bruta de alternativas para un handle protegido.
 *
 * # Logic:
 * Recetas fijas: sufijos '_official' y '_verified', sufijo del año en
 * curso, prefijo 'real_' y sufijo numérico aleatorio de 3 dígitos.
 * Las recetas que rompen la gramática (p. ej. por longitud) se
 * descartan antes de retornar.
 */
pub fn forge_alternative_candidates(normalized_handle: &str, current_year: i32) -> Vec<String> {
    let mut source_of_randomness = OsRng;
    let random_suffix: u32 = source_of_randomness.gen_range(100..1000);

    let raw_recipes = [
        format!("{}_official", normalized_handle),
        format!("{}_verified", normalized_handle),
        format!("{}{}", normalized_handle, current_year),
        format!("real_{}", normalized_handle),
        format!("{}_{}", normalized_handle, random_suffix),
    ];

    raw_recipes
        .into_iter()
        .filter(|candidate| candidate.chars().count() <= HANDLE_MAX_LENGTH)
        .filter(|candidate| normalize_and_validate(candidate).is_ok())
        .collect()
}

// FIN DEL ARCHIVO [libs/domain/handle-governance/src/alternatives.rs]

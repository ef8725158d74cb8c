// INICIO DEL ARCHIVO [libs/domain/handle-governance/src/matcher.rs]
/*!
 * =================================================================
 * APARATO: FUZZY PROTECTION MATCHER (V3.2 - LEVENSHTEIN CORE)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: ESCRUTINIO DIFUSO CONTRA EL REGISTRO PROTEGIDO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. SIMILARITY PHYSICS: sim = (max_len - distancia) / max_len;
 *    protección a partir de sim >= 0.85.
 * 2. TIE-BREAK LADDER: exacto > alias-exacto > canónico-difuso >
 *    alias-difuso; dentro del mismo peldaño gana la mayor similitud;
 *    a igual similitud, la categoría de menor prioridad de despacho.
 * 3. LENGTH WINDOW: Un candidato cuya longitud difiere más que
 *    max_len·(1-umbral) no puede alcanzar el umbral; se descarta
 *    antes del paso Levenshtein sin alterar el resultado.
 *
 * # Mathematical Proof (Window Soundness):
 * La distancia Levenshtein acota |len(a)-len(b)| <= d. Si
 * |len(a)-len(b)| > max_len·(1-t) entonces d > max_len·(1-t) y por
 * tanto sim = 1 - d/max_len < t. El filtro jamás descarta un
 * candidato que hubiese superado el umbral.
 * =================================================================
 */

use entativa_domain_models::protected_entity::{ProtectedEntity, ProtectionKind};
use strsim::levenshtein;
use tracing::debug;

/// Coincidencia de protección contra el registro.
#[derive(Debug, Clone)]
pub struct ProtectionHit {
    /// Índice de la entidad coincidente dentro del snapshot recorrido.
    pub entity_index: usize,
    pub kind: ProtectionKind,
    /// Ratio de similitud [0.0, 1.0]; 1.0 en coincidencias exactas.
    pub similarity: f64,
    /// Término del registro que disparó la coincidencia.
    pub matched_term: String,
}

impl ProtectionHit {
    /// Peldaño de precedencia del tipo de coincidencia (menor gana).
    fn kind_rank(&self) -> u8 {
        match self.kind {
            ProtectionKind::System => 0,
            ProtectionKind::Exact => 0,
            ProtectionKind::AliasExact => 1,
            ProtectionKind::Fuzzy => 2,
            ProtectionKind::AliasFuzzy => 3,
        }
    }
}

/**
 * Escrutinio completo del handle normalizado contra el snapshot.
 *
 * El snapshot DEBE venir ordenado por precedencia de categoría
 * (ProtectedCategory::DISPATCH_ORDER), como lo entrega el repositorio;
 * el desempate a igual similitud se apoya en ese orden.
 */
pub fn scan_registry(
    normalized_handle: &str,
    registry_snapshot: &[ProtectedEntity],
    similarity_threshold: f64,
) -> Option<ProtectionHit> {
    let mut best_hit: Option<ProtectionHit> = None;

    for (entity_index, entity) in registry_snapshot.iter().enumerate() {
        // --- PELDAÑO EXACTO (canónico) ---
        if entity.canonical_handle == normalized_handle {
            consider(
                &mut best_hit,
                ProtectionHit {
                    entity_index,
                    kind: ProtectionKind::Exact,
                    similarity: 1.0,
                    matched_term: entity.canonical_handle.clone(),
                },
            );
            continue;
        }

        // --- PELDAÑO ALIAS-EXACTO ---
        if let Some(alias) = entity.aliases.iter().find(|alias| *alias == normalized_handle) {
            consider(
                &mut best_hit,
                ProtectionHit {
                    entity_index,
                    kind: ProtectionKind::AliasExact,
                    similarity: 1.0,
                    matched_term: alias.clone(),
                },
            );
            continue;
        }

        // --- PELDAÑO CANÓNICO-DIFUSO ---
        if let Some(similarity) =
            fuzzy_similarity(normalized_handle, &entity.canonical_handle, similarity_threshold)
        {
            consider(
                &mut best_hit,
                ProtectionHit {
                    entity_index,
                    kind: ProtectionKind::Fuzzy,
                    similarity,
                    matched_term: entity.canonical_handle.clone(),
                },
            );
        }

        // --- PELDAÑO ALIAS-DIFUSO ---
        for alias in &entity.aliases {
            if let Some(similarity) = fuzzy_similarity(normalized_handle, alias, similarity_threshold)
            {
                consider(
                    &mut best_hit,
                    ProtectionHit {
                        entity_index,
                        kind: ProtectionKind::AliasFuzzy,
                        similarity,
                        matched_term: alias.clone(),
                    },
                );
            }
        }
    }

    if let Some(hit) = &best_hit {
        debug!(
            "🎯 [FUZZY_HIT]: '{}' matched '{}' (sim {:.3}).",
            normalized_handle, hit.matched_term, hit.similarity
        );
    }
    best_hit
}

/// Similitud Levenshtein con ventana de longitud previa (sound pruning).
fn fuzzy_similarity(candidate: &str, registry_term: &str, threshold: f64) -> Option<f64> {
    let candidate_length = candidate.chars().count();
    let term_length = registry_term.chars().count();
    let max_length = candidate_length.max(term_length);

    if max_length == 0 {
        return None;
    }

    // Ventana de longitud: el candidato no puede alcanzar el umbral.
    let length_gap = candidate_length.abs_diff(term_length) as f64;
    if length_gap > max_length as f64 * (1.0 - threshold) {
        return None;
    }

    let distance = levenshtein(candidate, registry_term);
    let similarity = (max_length - distance) as f64 / max_length as f64;

    (similarity >= threshold).then_some(similarity)
}

/// Aplica la escalera de desempate contra el mejor hit vigente.
fn consider(best_hit: &mut Option<ProtectionHit>, challenger: ProtectionHit) {
    match best_hit {
        None => *best_hit = Some(challenger),
        Some(incumbent) => {
            let challenger_key = (challenger.kind_rank(), -challenger.similarity);
            let incumbent_key = (incumbent.kind_rank(), -incumbent.similarity);

            // El snapshot llega en orden de precedencia de categoría, por lo
            // que a claves iguales el incumbente (más temprano) retiene.
            if challenger_key < incumbent_key {
                *best_hit = Some(challenger);
            }
        }
    }
}

// FIN DEL ARCHIVO [libs/domain/handle-governance/src/matcher.rs]

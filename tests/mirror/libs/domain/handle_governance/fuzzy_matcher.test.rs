// INICIO DEL ARCHIVO [tests/mirror/libs/domain/handle_governance/fuzzy_matcher.test.rs]
/**
 * =================================================================
 * APARATO: FUZZY MATCHER TEST (V2.1)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar el umbral 0.85, la escalera de desempate y la
 *           solidez de la ventana de longitud.
 * =================================================================
 */

use chrono::Utc;
use entativa_domain_governance::{forge_alternative_candidates, scan_registry};
use entativa_domain_models::protected_entity::{
    ProtectedCategory, ProtectedEntity, ProtectionKind,
};
use uuid::Uuid;

fn entity(handle: &str, aliases: &[&str], category: ProtectedCategory) -> ProtectedEntity {
    ProtectedEntity {
        id: Uuid::new_v4(),
        canonical_handle: handle.to_string(),
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
        category,
        display_name: handle.to_string(),
        metadata_json: None,
        requires_verification: true,
        created_at: Utc::now(),
    }
}

#[test]
fn certify_contract_scenario_elonmuzk() {
    // Escenario contractual: distancia 1 sobre 8 -> sim = 0.875.
    let registry = vec![entity("elonmusk", &["elon"], ProtectedCategory::Business)];

    let hit = scan_registry("elonmuzk", &registry, 0.85).expect("protección esperada");
    assert_eq!(hit.kind, ProtectionKind::Fuzzy);
    assert!(
        hit.similarity >= 0.87 && hit.similarity <= 0.89,
        "sim fuera de la ventana contractual: {}",
        hit.similarity
    );
    assert_eq!(hit.matched_term, "elonmusk");
}

#[test]
fn certify_threshold_is_inclusive_at_085() {
    // 20 caracteres, distancia 3 -> sim = 17/20 = 0.85 exacto.
    let registry = vec![entity("abcdefghijklmnopqrst", &[], ProtectedCategory::Brand)];
    let hit = scan_registry("abcdefghijklmnopqxyz", &registry, 0.85);
    assert!(hit.is_some(), "el umbral es inclusivo");
    assert!((hit.unwrap().similarity - 0.85).abs() < 1e-9);
}

#[test]
fn certify_tie_break_ladder() {
    // El mismo handle aparece como alias de una entidad Y difuso de otra.
    let registry = vec![
        entity("taylorswift", &[], ProtectedCategory::Celebrity),
        entity("taylornation", &["taylorswif"], ProtectedCategory::Media),
    ];

    // alias-exacto (Media) vence a canónico-difuso (Celebrity, sim 0.909).
    let hit = scan_registry("taylorswif", &registry, 0.85).unwrap();
    assert_eq!(hit.kind, ProtectionKind::AliasExact);
    assert_eq!(hit.entity_index, 1);

    // Exacto canónico vence a todo.
    let exact = scan_registry("taylorswift", &registry, 0.85).unwrap();
    assert_eq!(exact.kind, ProtectionKind::Exact);
    assert_eq!(exact.entity_index, 0);
}

#[test]
fn certify_equal_similarity_resolves_by_category_precedence() {
    // Dos entidades a distancia 1 del candidato; igual similitud.
    // El snapshot llega en orden de precedencia: Celebrity primero.
    let registry = vec![
        entity("starlite", &[], ProtectedCategory::Celebrity),
        entity("starline", &[], ProtectedCategory::Brand),
    ];

    let hit = scan_registry("starlive", &registry, 0.85).unwrap();
    assert_eq!(hit.entity_index, 0, "a igual sim gana la categoría más temprana");
}

#[test]
fn certify_alias_fuzzy_is_last_rung() {
    let registry = vec![entity("nasa_official", &["nasagov"], ProtectedCategory::Government)];

    // 'nasagol' vs alias 'nasagov': dist 1 sobre 7 -> sim ≈ 0.857.
    let hit = scan_registry("nasagol", &registry, 0.85).unwrap();
    assert_eq!(hit.kind, ProtectionKind::AliasFuzzy);
    assert_eq!(hit.matched_term, "nasagov");
}

#[test]
fn certify_distant_material_is_clear() {
    let registry = vec![
        entity("elonmusk", &["elon"], ProtectedCategory::Business),
        entity("rihanna", &[], ProtectedCategory::Celebrity),
    ];

    for clear in ["alice", "mycoolhandle", "elonmusketeer99"] {
        assert!(
            scan_registry(clear, &registry, 0.85).is_none(),
            "falso positivo sobre: {}",
            clear
        );
    }
}

#[test]
fn certify_alternatives_escape_the_fuzzy_net() {
    let registry = vec![entity("elonmusk", &[], ProtectedCategory::Business)];

    // Toda receta de remediación queda fuera del umbral del difuso.
    for candidate in forge_alternative_candidates("elonmusk", 2026) {
        assert!(
            scan_registry(&candidate, &registry, 0.85).is_none(),
            "alternativa sugerida recae en protección: {}",
            candidate
        );
    }
}
// FIN DEL ARCHIVO [tests/mirror/libs/domain/handle_governance/fuzzy_matcher.test.rs]

// INICIO DEL ARCHIVO [tests/mirror/libs/domain/handle_governance/handle_syntax.test.rs]
/**
 * =================================================================
 * APARATO: HANDLE SYNTAX TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar la gramática completa del eid (NFC, alfabeto,
 *           fronteras y separadores).
 * =================================================================
 */

use entativa_domain_governance::{normalize_and_validate, HandleFault};

#[test]
fn certify_canonical_forms_pass() {
    for valid in ["abc", "alice", "alice_99", "a.b.c", "x1_y2.z3", "elonmusk"] {
        assert!(
            normalize_and_validate(valid).is_ok(),
            "forma canónica rechazada: {}",
            valid
        );
    }
}

#[test]
fn certify_case_folding_and_trim() {
    assert_eq!(normalize_and_validate("  ElonMusk  ").unwrap(), "elonmusk");
    assert_eq!(normalize_and_validate("ALICE_99").unwrap(), "alice_99");
}

#[test]
fn certify_nfc_normalization_precedes_validation() {
    // 'e' + combining acute (U+0301) se normaliza NFC hacia 'é',
    // que NO pertenece al alfabeto cerrado: rechazo por carácter.
    let decomposed = "caf\u{0065}\u{0301}";
    assert!(matches!(
        normalize_and_validate(decomposed),
        Err(HandleFault::ForbiddenCharacter { character: 'é' })
    ));
}

#[test]
fn certify_boundary_rules() {
    // Primer carácter debe ser letra.
    assert_eq!(
        normalize_and_validate("9lives"),
        Err(HandleFault::LeadingCharacterNotAlphabetic)
    );
    assert_eq!(
        normalize_and_validate("_alice"),
        Err(HandleFault::LeadingCharacterNotAlphabetic)
    );

    // Separador terminal vetado.
    assert_eq!(normalize_and_validate("alice_"), Err(HandleFault::TrailingSeparator));
    assert_eq!(normalize_and_validate("alice."), Err(HandleFault::TrailingSeparator));
}

#[test]
fn certify_separator_pairs_are_rejected() {
    for broken in ["a__b", "a..b", "a._b", "a_.b"] {
        assert_eq!(
            normalize_and_validate(broken),
            Err(HandleFault::ConsecutiveSeparators),
            "par de separadores admitido: {}",
            broken
        );
    }
}

#[test]
fn certify_length_window() {
    assert!(normalize_and_validate("ab").is_err());
    assert!(normalize_and_validate("abc").is_ok());
    assert!(normalize_and_validate(&"a".repeat(30)).is_ok());
    assert!(matches!(
        normalize_and_validate(&"a".repeat(31)),
        Err(HandleFault::LengthOutOfBounds { observed: 31 })
    ));
}

#[test]
fn certify_forbidden_alphabet_detail() {
    assert!(matches!(
        normalize_and_validate("alice-99"),
        Err(HandleFault::ForbiddenCharacter { character: '-' })
    ));
    assert!(matches!(
        normalize_and_validate("alice 99"),
        Err(HandleFault::ForbiddenCharacter { character: ' ' })
    ));
}
// FIN DEL ARCHIVO [tests/mirror/libs/domain/handle_governance/handle_syntax.test.rs]

// INICIO DEL ARCHIVO [tests/mirror/libs/core/credential_engine/password_scrutiny.test.rs]
/**
 * =================================================================
 * APARATO: PASSWORD SCRUTINY TEST (V2.1)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar la física del scoring aditivo, el piso de
 *           entropía y las penalizaciones contextuales.
 * =================================================================
 */

use entativa_core_credential::{evaluate_password, PasswordContext, StrengthOrdinal};

fn bare_context() -> PasswordContext {
    PasswordContext::default()
}

#[test]
fn certify_entropy_floor_governs_acceptance() {
    // 8 minúsculas puras: 8 · log2(26) ≈ 37.6 bits < 40 -> rechazo.
    let lowercase_only = evaluate_password("abcdwxyz", &bare_context(), 40.0);
    assert!(lowercase_only.entropy_bits < 40.0);
    assert!(!lowercase_only.accepted);

    // 8 chars con minúscula+dígito: 8 · log2(36) ≈ 41.4 bits -> admitido.
    let with_digits = evaluate_password("abcdwxy7", &bare_context(), 40.0);
    assert!(with_digits.entropy_bits >= 40.0);
    assert!(with_digits.accepted);

    // Debajo de la longitud mínima jamás se acepta, aun con entropía.
    let short_but_dense = evaluate_password("aB3$xyz", &bare_context(), 40.0);
    assert!(!short_but_dense.accepted);
}

#[test]
fn certify_class_diversity_raises_score() {
    let plain = evaluate_password("abcdefghij", &bare_context(), 40.0);
    let diverse = evaluate_password("aBcDeF9#ij", &bare_context(), 40.0);
    assert!(
        diverse.score > plain.score,
        "diversidad de clases debe elevar el puntaje ({} vs {})",
        diverse.score,
        plain.score
    );
}

#[test]
fn certify_dictionary_and_keyboard_penalties() {
    let dictionary_hit = evaluate_password("Xdragon77Z!", &bare_context(), 40.0);
    assert!(dictionary_hit
        .penalties
        .iter()
        .any(|p| p == "dictionary:dragon"));

    let keyboard_hit = evaluate_password("Hqwerty99#Kz", &bare_context(), 40.0);
    assert!(keyboard_hit
        .penalties
        .iter()
        .any(|p| p == "keyboard_run:qwerty"));

    let repeated = evaluate_password("aaaaB3$xyzw", &bare_context(), 40.0);
    assert!(repeated
        .penalties
        .iter()
        .any(|p| p == "repeated_characters"));
}

#[test]
fn certify_personal_context_substrings_are_penalized() {
    let context = PasswordContext {
        email_local_part: Some("marina.vega".to_string()),
        given_name: Some("Marina".to_string()),
        family_name: Some("Vega".to_string()),
        birth_year: Some(1991),
    };

    let with_name = evaluate_password("Marina#2024x", &context, 40.0);
    assert!(with_name.penalties.iter().any(|p| p == "personal:given_name"));

    let with_birth_year = evaluate_password("Zk$1991pqrs", &context, 40.0);
    assert!(with_birth_year
        .penalties
        .iter()
        .any(|p| p == "personal:birth_year"));

    // Sin material personal: sin penalización contextual.
    let clean = evaluate_password("Tk$7Qw9pLmzh", &context, 40.0);
    assert!(!clean.penalties.iter().any(|p| p.starts_with("personal:")));
}

#[test]
fn certify_ordinal_ladder_is_monotone() {
    let weak = evaluate_password("password", &bare_context(), 40.0);
    assert_eq!(weak.strength, StrengthOrdinal::Weak);

    let fortress = evaluate_password("N7#vQm2$LxPw9kZj4!uRb6TgY", &bare_context(), 40.0);
    assert!(fortress.strength >= StrengthOrdinal::Strong);
    assert!(fortress.score >= 65);
    assert!(fortress.accepted);

    assert!(weak.score < fortress.score);
}

#[test]
fn certify_score_is_clamped_to_contract_range() {
    // Saturación superior: jamás por encima de 100.
    let saturated = evaluate_password(
        "N7#vQm2$LxPw9kZj4!uRb6TgYN7#vQm2$LxPw9kZ",
        &bare_context(),
        40.0,
    );
    assert!(saturated.score <= 100);

    // Saturación inferior: el castigo masivo queda en 0.
    let doomed = evaluate_password("password12345qwerty", &bare_context(), 40.0);
    assert!(doomed.penalties.len() >= 3);
}
// FIN DEL ARCHIVO [tests/mirror/libs/core/credential_engine/password_scrutiny.test.rs]

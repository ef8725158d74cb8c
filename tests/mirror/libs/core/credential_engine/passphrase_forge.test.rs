// INICIO DEL ARCHIVO [tests/mirror/libs/core/credential_engine/passphrase_forge.test.rs]
/**
 * =================================================================
 * APARATO: PASSPHRASE FORGE TEST (V2.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE
 * OBJETIVO: Certificar el scoring de frases, el forjador CSPRNG y el
 *           oráculo de brechas probabilístico.
 * =================================================================
 */

use entativa_core_credential::breach::fast_digest;
use entativa_core_credential::{
    evaluate_passphrase, BloomBreachOracle, BreachOracle, PassphraseForge, PassphraseRecipe,
};

#[test]
fn certify_passphrase_floor_is_fifty_bits() {
    // Tres palabras únicas: 39 bits < 50 -> rechazo.
    let three_words = evaluate_passphrase("willow harbor comet", 50.0);
    assert!(three_words.entropy_bits < 50.0);
    assert!(!three_words.accepted);

    // Cuatro palabras únicas: 52 bits -> admitida.
    let four_words = evaluate_passphrase("willow harbor comet zenith", 50.0);
    assert!(four_words.entropy_bits >= 50.0);
    assert!(four_words.accepted);
    assert_eq!(four_words.word_count, 4);
    assert!((four_words.unique_ratio - 1.0).abs() < f64::EPSILON);
}

#[test]
fn certify_repetition_erodes_uniqueness_ratio() {
    let repeated = evaluate_passphrase("echo echo echo echo echo delta", 50.0);
    assert!(repeated.unique_ratio < 0.5);
    // Dos palabras únicas jamás alcanzan el piso.
    assert!(!repeated.accepted);
}

#[test]
fn certify_common_phrase_and_alphabetical_penalties() {
    let famous = evaluate_passphrase("correct horse battery staple prism", 50.0);
    assert!(famous
        .penalties
        .iter()
        .any(|p| p.starts_with("common_phrase:")));
    assert!(!famous.accepted, "una frase célebre jamás se acepta");

    let sorted_words = evaluate_passphrase("amber birch cedar delta ember", 50.0);
    assert!(sorted_words
        .penalties
        .iter()
        .any(|p| p == "alphabetical_word_order"));
}

#[test]
fn certify_forge_output_clears_its_own_scrutiny() {
    for _ in 0..8 {
        let forged = PassphraseForge::forge(&PassphraseRecipe::default())
            .expect("el forjador colapsó con la receta default");
        let report = evaluate_passphrase(&forged, 50.0);
        assert!(report.accepted, "material forjado rechazado: {}", forged);
        assert!(forged.contains('-'), "separador contractual ausente");
    }
}

#[test]
fn certify_secure_list_recipe() {
    let recipe = PassphraseRecipe {
        word_count: 4,
        use_secure_list: true,
        numeric_infix: false,
        separator: '.',
        required_bits: 50.0,
    };
    let forged = PassphraseForge::forge(&recipe).expect("receta segura colapsó");
    assert_eq!(forged.split('.').count(), 4);
}

#[tokio::test]
async fn certify_breach_oracle_bias() {
    let oracle = BloomBreachOracle::with_default_blocklist();
    assert!(oracle.seeded_entries() >= 64);

    // Material quemado: SIEMPRE detectado (cero falsos negativos).
    for burned in ["123456", "password", "qwerty123", "letmein"] {
        assert!(
            oracle.is_breached(&fast_digest(burned)).await.unwrap(),
            "credencial quemada no detectada: {}",
            burned
        );
    }

    // Material forjado: estadísticamente limpio.
    let forged = PassphraseForge::forge(&PassphraseRecipe::default()).unwrap();
    assert!(!oracle.is_breached(&fast_digest(&forged)).await.unwrap());
}
// FIN DEL ARCHIVO [tests/mirror/libs/core/credential_engine/passphrase_forge.test.rs]

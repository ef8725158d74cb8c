// INICIO DEL ARCHIVO [libs/core/credential-engine/src/passphrase.rs]
/*!
 * =================================================================
 * APARATO: PASSPHRASE SCRUTINY ENGINE (V2.2)
 * CLASIFICACIÓN: CORE SECURITY (ESTRATO L1)
 * RESPONSABILIDAD: SCORING DE FRASES DE PASO MULTI-PALABRA
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. WORD PHYSICS: Conteo de palabras, ratio de unicidad y longitud
 *    media componen el puntaje; frases célebres y orden alfabético
 *    lo penalizan.
 * 2. HIGHER FLOOR: El piso de entropía (50 bits) supera al de las
 *    contraseñas porque el espacio de diccionario es menor.
 *
 * # Mathematical Proof (Dictionary Entropy):
 * Modelando cada palabra única como una extracción de un diccionario
 * efectivo de 2^13 entradas, la entropía es u·13 bits (u = palabras
 * únicas), más la contribución marginal de los dígitos intercalados.
 * =================================================================
 */

use crate::password::StrengthOrdinal;
use crate::wordlists::COMMON_PHRASES;
use serde::Serialize;

/// Bits aportados por cada palabra única (diccionario efectivo 2^13).
const BITS_PER_UNIQUE_WORD: f64 = 13.0;

/// Bits aportados por cada dígito intercalado.
const BITS_PER_DIGIT: f64 = 3.32;

/// Informe del escrutinio de una passphrase.
#[derive(Debug, Clone, Serialize)]
pub struct PassphraseReport {
    pub score: u8,
    pub strength: StrengthOrdinal,
    pub entropy_bits: f64,
    pub word_count: usize,
    pub unique_ratio: f64,
    pub mean_word_length: f64,
    pub penalties: Vec<String>,
    pub required_bits: f64,
    pub accepted: bool,
}

/**
 * Ejecuta el escrutinio de una frase de paso.
 *
 * # Logic:
 * 1. Tokenización por separadores no alfanuméricos.
 * 2. Sub-scores: cantidad de palabras (0..35), ratio de unicidad
 *    (0..25), longitud media de palabra (0..20).
 * 3. Penalizaciones: frase célebre contenida (-30), orden
 *    alfabético estricto de palabras (-15).
 */
pub fn evaluate_passphrase(candidate: &str, required_bits: f64) -> PassphraseReport {
    let lowered = candidate.to_lowercase();

    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty() && token.chars().any(|c| c.is_ascii_alphabetic()))
        .collect();

    let word_count = words.len();

    let mut unique_words: Vec<&str> = words.clone();
    unique_words.sort_unstable();
    unique_words.dedup();
    let unique_count = unique_words.len();

    let unique_ratio = if word_count == 0 {
        0.0
    } else {
        unique_count as f64 / word_count as f64
    };

    let mean_word_length = if word_count == 0 {
        0.0
    } else {
        words.iter().map(|w| w.len()).sum::<usize>() as f64 / word_count as f64
    };

    let digit_count = lowered.chars().filter(|c| c.is_ascii_digit()).count();

    // 1. COMPOSICIÓN ADITIVA
    let word_score = (word_count.min(7) as f64 / 7.0) * 35.0;
    let uniqueness_score = unique_ratio * 25.0;
    let length_score = (mean_word_length / 8.0).min(1.0) * 20.0;

    // 2. ENTROPÍA DEL ESPACIO DE DICCIONARIO
    let entropy_bits = unique_count as f64 * BITS_PER_UNIQUE_WORD + digit_count as f64 * BITS_PER_DIGIT;
    let entropy_score = (entropy_bits / 90.0).min(1.0) * 20.0;

    // 3. PENALIZACIONES
    let mut penalty_total = 0.0;
    let mut penalties = Vec::new();

    for phrase in COMMON_PHRASES {
        if lowered.contains(phrase) {
            penalty_total += 30.0;
            penalties.push(format!("common_phrase:{}", phrase));
        }
    }

    if word_count >= 3 && is_strictly_alphabetical(&words) {
        penalty_total += 15.0;
        penalties.push("alphabetical_word_order".to_string());
    }

    let raw_score = word_score + uniqueness_score + length_score + entropy_score - penalty_total;
    let score = raw_score.clamp(0.0, 100.0).round() as u8;

    let accepted = entropy_bits >= required_bits && penalties.is_empty();

    PassphraseReport {
        score,
        strength: strength_from(score),
        entropy_bits,
        word_count,
        unique_ratio,
        mean_word_length,
        penalties,
        required_bits,
        accepted,
    }
}

fn strength_from(score: u8) -> StrengthOrdinal {
    match score {
        0..=24 => StrengthOrdinal::Weak,
        25..=44 => StrengthOrdinal::Fair,
        45..=64 => StrengthOrdinal::Medium,
        65..=84 => StrengthOrdinal::Strong,
        _ => StrengthOrdinal::VeryStrong,
    }
}

/// Orden alfabético estricto entre palabras consecutivas.
fn is_strictly_alphabetical(words: &[&str]) -> bool {
    words.windows(2).all(|pair| pair[0] < pair[1])
}

// FIN DEL ARCHIVO [libs/core/credential-engine/src/passphrase.rs]

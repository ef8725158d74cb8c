// INICIO DEL ARCHIVO [libs/core/credential-engine/src/password.rs]
/*!
 * =================================================================
 * APARATO: PASSWORD SCRUTINY ENGINE (V3.1 - CONTEXT AWARE)
 * CLASIFICACIÓN: CORE SECURITY (ESTRATO L1)
 * RESPONSABILIDAD: SCORING ADITIVO Y PENALIZACIONES CONTEXTUALES
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. ADDITIVE COMPOSITION: Longitud lineal [8,40] + diversidad de
 *    clases (+5 c/u) + entropía log2(pool^len), con recorte a [0,100].
 * 2. CONTEXT PENALTIES: Fragmentos de diccionario, ráfagas de teclado,
 *    repeticiones >3 y subcadenas personales (>=3) del email, nombre,
 *    apellido o año de nacimiento.
 * 3. ENTROPY FLOOR: La aceptación exige 40 bits; el scoring describe,
 *    el umbral decide.
 *
 * # Mathematical Proof (Entropy Model):
 * Con pool p y longitud n, el espacio de búsqueda es p^n y la entropía
 * log2(p^n) = n·log2(p). El modelo sobreestima credenciales con
 * estructura; las penalizaciones corrigen ese sesgo.
 * =================================================================
 */

use crate::wordlists::{DICTIONARY_FRAGMENTS, KEYBOARD_RUNS};
use serde::{Deserialize, Serialize};

/// Longitud mínima aceptable de una contraseña.
pub const MINIMUM_PASSWORD_LENGTH: usize = 8;

/// Longitud a partir de la cual el sub-score de longitud satura.
const LENGTH_SATURATION: usize = 40;

/// Clasificación ordinal de la fortaleza observada.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum StrengthOrdinal {
    Weak,
    Fair,
    Medium,
    Strong,
    VeryStrong,
}

impl StrengthOrdinal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weak => "weak",
            Self::Fair => "fair",
            Self::Medium => "medium",
            Self::Strong => "strong",
            Self::VeryStrong => "very-strong",
        }
    }

    fn from_score(score: u8) -> Self {
        match score {
            0..=24 => Self::Weak,
            25..=44 => Self::Fair,
            45..=64 => Self::Medium,
            65..=84 => Self::Strong,
            _ => Self::VeryStrong,
        }
    }
}

/// Contexto personal del solicitante para las penalizaciones de identidad.
#[derive(Debug, Clone, Default)]
pub struct PasswordContext {
    /// Parte local del email (antes de la arroba).
    pub email_local_part: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub birth_year: Option<i32>,
}

/// Informe completo del escrutinio.
#[derive(Debug, Clone, Serialize)]
pub struct PasswordReport {
    /// Puntaje aditivo recortado a [0, 100].
    pub score: u8,
    pub strength: StrengthOrdinal,
    pub entropy_bits: f64,
    /// Etiquetas de penalización aplicadas (rastro para remediación).
    pub penalties: Vec<String>,
    /// Umbral de entropía exigido por configuración.
    pub required_bits: f64,
    /// Veredicto de aceptación (longitud mínima + piso de entropía).
    pub accepted: bool,
}

/**
 * Ejecuta el escrutinio completo de una contraseña candidata.
 *
 * # Logic:
 * 1. Sub-score de longitud: lineal entre 8 y 40 caracteres (0..30).
 * 2. Diversidad: +5 por cada clase presente (minúscula, mayúscula,
 *    dígito, símbolo).
 * 3. Entropía: n·log2(pool), escalada hacia 0..40 con saturación en 80 bits.
 * 4. Penalizaciones sustractivas; recorte final a [0, 100].
 */
pub fn evaluate_password(
    candidate: &str,
    context: &PasswordContext,
    required_bits: f64,
) -> PasswordReport {
    let lowered = candidate.to_lowercase();
    let length = candidate.chars().count();

    // 1. SUB-SCORE DE LONGITUD (lineal en [8, 40])
    let length_score = if length < MINIMUM_PASSWORD_LENGTH {
        0.0
    } else {
        let normalized = (length.min(LENGTH_SATURATION) - MINIMUM_PASSWORD_LENGTH) as f64
            / (LENGTH_SATURATION - MINIMUM_PASSWORD_LENGTH) as f64;
        normalized * 30.0
    };

    // 2. DIVERSIDAD DE CLASES (+5 por clase)
    let has_lowercase = candidate.chars().any(|c| c.is_ascii_lowercase());
    let has_uppercase = candidate.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = candidate.chars().any(|c| c.is_ascii_digit());
    let has_symbol = candidate.chars().any(|c| !c.is_ascii_alphanumeric());

    let diversity_score = [has_lowercase, has_uppercase, has_digit, has_symbol]
        .iter()
        .filter(|present| **present)
        .count() as f64
        * 5.0;

    // 3. ENTROPÍA DEL ESPACIO DE BÚSQUEDA
    let mut pool_size = 0u32;
    if has_lowercase {
        pool_size += 26;
    }
    if has_uppercase {
        pool_size += 26;
    }
    if has_digit {
        pool_size += 10;
    }
    if has_symbol {
        pool_size += 32;
    }

    let entropy_bits = if pool_size == 0 {
        0.0
    } else {
        length as f64 * (pool_size as f64).log2()
    };
    let entropy_score = (entropy_bits / 80.0).min(1.0) * 40.0;

    // 4. PENALIZACIONES SUSTRACTIVAS
    let mut penalty_total = 0.0;
    let mut penalties = Vec::new();

    for fragment in DICTIONARY_FRAGMENTS {
        if lowered.contains(fragment) {
            penalty_total += 12.0;
            penalties.push(format!("dictionary:{}", fragment));
        }
    }

    for run in KEYBOARD_RUNS {
        if lowered.contains(run) {
            penalty_total += 15.0;
            penalties.push(format!("keyboard_run:{}", run));
        }
    }

    if has_repeated_run(candidate) {
        penalty_total += 10.0;
        penalties.push("repeated_characters".to_string());
    }

    for personal_label in personal_substring_hits(&lowered, context) {
        penalty_total += 15.0;
        penalties.push(personal_label);
    }

    let raw_score = length_score + diversity_score + entropy_score - penalty_total;
    let score = raw_score.clamp(0.0, 100.0).round() as u8;

    let accepted = length >= MINIMUM_PASSWORD_LENGTH && entropy_bits >= required_bits;

    PasswordReport {
        score,
        strength: StrengthOrdinal::from_score(score),
        entropy_bits,
        penalties,
        required_bits,
        accepted,
    }
}

/// Detecta más de 3 caracteres idénticos consecutivos.
fn has_repeated_run(candidate: &str) -> bool {
    let mut run_length = 1usize;
    let mut previous: Option<char> = None;

    for current in candidate.chars() {
        if Some(current) == previous {
            run_length += 1;
            if run_length > 3 {
                return true;
            }
        } else {
            run_length = 1;
            previous = Some(current);
        }
    }
    false
}

/// Subcadenas personales (longitud >= 3) presentes en la credencial.
/// Cada fuente penaliza a lo sumo una vez.
fn personal_substring_hits(lowered_candidate: &str, context: &PasswordContext) -> Vec<String> {
    let mut hits = Vec::new();

    let sources: [(&str, Option<String>); 4] = [
        ("email_local_part", context.email_local_part.clone()),
        ("given_name", context.given_name.clone()),
        ("family_name", context.family_name.clone()),
        ("birth_year", context.birth_year.map(|year| year.to_string())),
    ];

    for (label, source) in sources {
        let Some(material) = source else { continue };
        let material = material.to_lowercase();
        if material.len() < 3 {
            continue;
        }

        let windows_hit = (3..=material.len()).any(|window| {
            material
                .as_bytes()
                .windows(window)
                .filter_map(|w| std::str::from_utf8(w).ok())
                .any(|fragment| lowered_candidate.contains(fragment))
        });

        if windows_hit {
            hits.push(format!("personal:{}", label));
        }
    }
    hits
}

// FIN DEL ARCHIVO [libs/core/credential-engine/src/password.rs]

// INICIO DEL ARCHIVO [libs/core/credential-engine/src/generator.rs]
/*!
 * =================================================================
 * APARATO: PASSPHRASE FORGE (V2.1 - CSPRNG SEALED)
 * CLASIFICACIÓN: CORE SECURITY (ESTRATO L1)
 * RESPONSABILIDAD: GENERACIÓN DETERMINISTA-SEGURA DE FRASES DE PASO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. CSPRNG ONLY: Todo material aleatorio proviene de OsRng; jamás
 *    de un PRNG sembrable.
 * 2. SELF SCRUTINY: El forjador pasa cada candidata por su propio
 *    motor de escrutinio; jamás retorna material que no aprobaría.
 * =================================================================
 */

use crate::errors::CredentialError;
use crate::passphrase::evaluate_passphrase;
use crate::wordlists::{COMMON_WORDLIST, SECURE_WORDLIST};
use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::instrument;

/// Intentos máximos antes de declarar agotamiento del forjador.
const MAX_FORGE_ATTEMPTS: usize = 16;

/// Receta de forjado de una frase de paso.
#[derive(Debug, Clone)]
pub struct PassphraseRecipe {
    /// Cantidad de palabras a extraer (mínimo razonable: 4).
    pub word_count: usize,
    /// true -> lista segura (palabras largas); false -> lista común.
    pub use_secure_list: bool,
    /// Intercala un bloque numérico de dos dígitos en posición aleatoria.
    pub numeric_infix: bool,
    /// Separador entre palabras.
    pub separator: char,
    /// Piso de entropía que la candidata debe superar.
    pub required_bits: f64,
}

impl Default for PassphraseRecipe {
    fn default() -> Self {
        Self {
            word_count: 5,
            use_secure_list: false,
            numeric_infix: true,
            separator: '-',
            required_bits: 50.0,
        }
    }
}

/// Forjador de frases de paso sobre las listas curadas.
pub struct PassphraseForge;

impl PassphraseForge {
    /**
     * Forja una frase de paso que supera su propio escrutinio.
     *
     * # Errors:
     * - `CredentialError::ForgeExhaustion`: la receta es incapaz de
     *   producir material apto (p. ej. word_count demasiado bajo).
     */
    #[instrument(skip(recipe), fields(words = recipe.word_count))]
    pub fn forge(recipe: &PassphraseRecipe) -> Result<String, CredentialError> {
        let lexicon: &[&str] = if recipe.use_secure_list {
            SECURE_WORDLIST
        } else {
            COMMON_WORDLIST
        };

        let mut source_of_randomness = OsRng;

        for _ in 0..MAX_FORGE_ATTEMPTS {
            let mut selected_words: Vec<String> = Vec::with_capacity(recipe.word_count + 1);

            // Extracción sin reemplazo para maximizar la unicidad.
            let mut shuffled: Vec<&str> = lexicon.to_vec();
            shuffled.shuffle(&mut source_of_randomness);
            for word in shuffled.iter().take(recipe.word_count) {
                selected_words.push((*word).to_string());
            }

            if recipe.numeric_infix {
                let numeric_block = format!("{:02}", source_of_randomness.gen_range(0..100u32));
                let insertion_index = source_of_randomness.gen_range(0..=selected_words.len());
                selected_words.insert(insertion_index, numeric_block);
            }

            let candidate = selected_words.join(&recipe.separator.to_string());

            let report = evaluate_passphrase(&candidate, recipe.required_bits);
            if report.accepted {
                return Ok(candidate);
            }
        }

        Err(CredentialError::ForgeExhaustion)
    }
}

// FIN DEL ARCHIVO [libs/core/credential-engine/src/generator.rs]

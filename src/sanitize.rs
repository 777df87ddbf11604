//! Label sanitization
//!
//! Turns free text such as `"Fecha de Nacimiento (dd/mm/aaaa):"` into a
//! stable key such as `fecha_de_nacimiento_ddmmaaaa`.

use once_cell::sync::Lazy;
use regex::Regex;

// `\w` is Unicode-aware, so accented letters (á, ñ, ü, ...) survive.
static NON_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize arbitrary text into an identifier-safe key.
///
/// Punctuation is dropped, whitespace runs become a single `_`, the result
/// is lowercased and stripped of leading/trailing underscores. Input whose
/// only word characters are underscores collapses to a single `_` so that
/// any text holding a word character keeps a non-empty key. Whitespace and
/// punctuation alone sanitize to an empty string.
pub fn sanitize(text: &str) -> String {
    let stripped = NON_WORD_RE.replace_all(text, "");
    let joined = WHITESPACE_RE.replace_all(&stripped, "_").to_lowercase();
    let trimmed = joined.trim_matches('_');

    // Underscores here can only come from the input, not from whitespace
    if trimmed.is_empty() && stripped.contains('_') {
        return "_".to_string();
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_labels() {
        assert_eq!(sanitize("Nombre"), "nombre");
        assert_eq!(sanitize("Fecha de nacimiento"), "fecha_de_nacimiento");
        assert_eq!(sanitize("  DATOS   GENERALES  "), "datos_generales");
        assert_eq!(sanitize("Phone #:"), "phone");
    }

    #[test]
    fn test_accents_preserved() {
        assert_eq!(sanitize("Año de Emisión"), "año_de_emisión");
        assert_eq!(sanitize("Teléfono (móvil)"), "teléfono_móvil");
        assert_eq!(sanitize("Straße"), "straße");
    }

    #[test]
    fn test_empty_and_punctuation_only() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("   "), "");
        assert_eq!(sanitize("?!:."), "");
        assert_eq!(sanitize("? !"), "");
        assert_eq!(sanitize("- - -:"), "");
        assert_eq!(sanitize(" \t\n "), "");
    }

    #[test]
    fn test_underscores_trimmed() {
        assert_eq!(sanitize("__nombre__"), "nombre");
        assert_eq!(sanitize("Nombre ____"), "nombre");
        assert_eq!(sanitize("___"), "_");
        assert_eq!(sanitize(" _ _ "), "_");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Fecha de Nacimiento (dd/mm/aaaa):",
            "[ ] Acepta términos",
            "___",
            " _a_ b_ ",
            "İstanbul Şehir",
            "1. Número de cuenta",
            "",
        ];
        for sample in samples {
            let once = sanitize(sample);
            assert_eq!(sanitize(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_word_character_gives_non_empty() {
        for sample in ["a", "7", "_", "¿Qué?", "-- x --"] {
            assert!(!sanitize(sample).is_empty(), "empty for {:?}", sample);
        }
    }
}

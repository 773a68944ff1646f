use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

// Accented letters the punctuation filter must never turn into spaces.
const SPANISH_LETTERS: &[char] = &['á', 'é', 'í', 'ó', 'ú', 'ü', 'ñ'];

/// Canonical comparison form: lower-case, diacritic-free, punctuation
/// replaced by spaces, whitespace collapsed. Pure and total; idempotent.
pub fn normalize(text: &str) -> String {
    let decomposed = text
        .to_lowercase()
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .collect::<String>();

    let cleaned = decomposed
        .chars()
        .map(|ch| {
            if ch.is_alphanumeric()
                || ch == '_'
                || ch.is_whitespace()
                || SPANISH_LETTERS.contains(&ch)
            {
                ch
            } else {
                ' '
            }
        })
        .collect::<String>();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Substring containment with both sides normalized first. Matching logic
/// never sees raw text.
pub fn contains_any(text: &str, terms: &[&str]) -> bool {
    let haystack = normalize(text);
    terms.iter().any(|term| haystack.contains(&normalize(term)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_accents_and_punctuation() {
        assert_eq!(normalize("Árbol: ¡Hola!"), "arbol hola");
    }

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(normalize("  mucho \t espacio \n aqui  "), "mucho espacio aqui");
    }

    #[test]
    fn is_idempotent() {
        for raw in ["¿Cuánto cuesta Potasio K50?", "Árbol: ¡Hola!", "", "ñandú"] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn empty_input_yields_empty_string() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   ¡¿!?  "), "");
    }

    #[test]
    fn contains_any_normalizes_both_sides() {
        assert!(contains_any("¿CUÁNTO cuesta?", &["cuanto"]));
        assert!(contains_any("necesito envío a Lima", &["envio"]));
        assert!(!contains_any("necesito abono", &["precio"]));
    }
}

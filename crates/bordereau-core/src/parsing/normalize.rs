use unicode_normalization::UnicodeNormalization;

/// Normalize header or cell text for tolerant comparison.
///
/// Steps:
/// 1. Lowercase
/// 2. Decompose (NFD) and drop combining marks: "désignation" -> "designation"
/// 3. Fold the masculine ordinal "º" into the degree sign "°"
/// 4. Trim and collapse whitespace runs (including NBSP and line breaks)
///
/// Lowercasing happens first because some lowercase mappings emit
/// combining marks, which must not survive into the result.
pub fn normalize(raw: &str) -> String {
    let folded: String = raw
        .to_lowercase()
        .nfd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .map(|c| if c == 'º' { '°' } else { c })
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Check whether `text` contains `marker` once both are normalized.
///
/// Spaces are ignored on both sides so "n°prix" and "N°  Prix" both
/// match the marker "n° prix".
pub fn matches_marker(text: &str, marker: &str) -> bool {
    let haystack = compact(&normalize(text));
    let needle = compact(&normalize(marker));
    !needle.is_empty() && haystack.contains(&needle)
}

fn compact(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accents_and_case() {
        assert_eq!(normalize("Désignation"), "designation");
        assert_eq!(normalize("QUANTITÉ"), "quantite");
        assert_eq!(normalize("Unité"), "unite");
    }

    #[test]
    fn test_whitespace_collapsed() {
        assert_eq!(normalize("  N°   Prix \n"), "n° prix");
        assert_eq!(normalize("Montant\u{a0}Total HT"), "montant total ht");
    }

    #[test]
    fn test_equivalent_headers() {
        assert_eq!(normalize("N° PRIX"), normalize("n°  prix"));
        assert_eq!(normalize("Nº Prix"), "n° prix");
    }

    #[test]
    fn test_idempotent() {
        for s in ["N° PRIX", "  Désignation des ouvrages ", "P.U DH.HT", "", "Ça   va"] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_marker_ignores_spacing() {
        assert!(matches_marker("N°PRIX", "n° prix"));
        assert!(matches_marker("N°  Prix", "n° prix"));
        assert!(matches_marker("Quantités", "quantit"));
        assert!(!matches_marker("Désignation", "n° prix"));
    }

    #[test]
    fn test_empty_marker_never_matches() {
        assert!(!matches_marker("anything", "  "));
    }
}

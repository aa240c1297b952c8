use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse an amount or quantity cell into a Decimal.
///
/// Handles formats like:
/// - "12" / "10.5" -> plain numbers (including ones rendered from numeric cells)
/// - "10,5" -> decimal comma
/// - "1 250,00" / "1\u{a0}250,00" / "1'250.00" -> grouped thousands
/// - "1.250,00" / "1,250.00" -> the last separator is the decimal one
/// - "1 250,00 DH" / "300 €" -> trailing currency is ignored
///
/// Returns None for blank or non-numeric text. Callers decide what a missing
/// number means; nothing here fails.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let s = strip_currency(s.trim());
    if s.is_empty() {
        return None;
    }

    let compact: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\'' && *c != '’')
        .collect();

    let normalized = match (compact.rfind(','), compact.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => compact.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => compact.replace(',', ""),
        (Some(_), None) => compact.replace(',', "."),
        _ => compact,
    };

    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .ok()
}

/// Drop a trailing currency marker ("DH", "MAD", "€", ...) and the space before it.
fn strip_currency(s: &str) -> &str {
    s.trim_end_matches(|c: char| c.is_alphabetic() || matches!(c, '€' | '$' | '.'))
        .trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_integer() {
        assert_eq!(parse_amount("68"), Some(dec!(68)));
    }

    #[test]
    fn test_decimal_dot() {
        assert_eq!(parse_amount("10.5"), Some(dec!(10.5)));
    }

    #[test]
    fn test_decimal_comma() {
        assert_eq!(parse_amount("10,5"), Some(dec!(10.5)));
    }

    #[test]
    fn test_grouped_thousands() {
        assert_eq!(parse_amount("1 250,00"), Some(dec!(1250.00)));
        assert_eq!(parse_amount("1\u{a0}250,00"), Some(dec!(1250.00)));
        assert_eq!(parse_amount("1'250.50"), Some(dec!(1250.50)));
    }

    #[test]
    fn test_mixed_separators() {
        assert_eq!(parse_amount("1.250,75"), Some(dec!(1250.75)));
        assert_eq!(parse_amount("1,250.75"), Some(dec!(1250.75)));
    }

    #[test]
    fn test_currency_suffix() {
        assert_eq!(parse_amount("1 250,00 DH"), Some(dec!(1250.00)));
        assert_eq!(parse_amount("300 €"), Some(dec!(300)));
        assert_eq!(parse_amount("45 DH.HT"), Some(dec!(45)));
    }

    #[test]
    fn test_negative() {
        assert_eq!(parse_amount("-12,5"), Some(dec!(-12.5)));
    }

    #[test]
    fn test_whitespace_trimming() {
        assert_eq!(parse_amount("  68  "), Some(dec!(68)));
    }

    #[test]
    fn test_blank_is_none() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("   "), None);
    }

    #[test]
    fn test_text_is_none() {
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("forfait"), None);
        assert_eq!(parse_amount("-"), None);
    }
}

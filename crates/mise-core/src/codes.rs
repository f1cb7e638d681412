//! Barcode canonicalization and product-name cleanup.
//!
//! Catalogs exported from spreadsheets frequently carry barcodes as
//! scientific-notation numbers (`7.8913E+12`); [`normalize`] expands those
//! back into a plain digit string so every store indexes the same key.

/// Shortest code the catalog carries (EAN-8).
const MIN_CODE_LEN: usize = 8;

/// Substrings after which an externally-sourced product name is truncated.
const NAME_SEPARATORS: [&str; 4] = [" | ", " - ", " \u{2013} ", " \u{2014} "];

/// Canonicalizes a raw barcode into a digits-only key.
///
/// Inputs containing an `e`/`E` are treated as spreadsheet-exported
/// scientific notation: parsed as a float and rendered with no fractional
/// part. Everything else has its non-digit characters stripped. The float
/// path is a lossy approximation for codes that were rounded on export;
/// the rounding is intentional and must match what the exporting tool did.
///
/// Always returns a string; empty input yields an empty string.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    if trimmed.to_ascii_lowercase().contains('e') {
        if let Ok(value) = trimmed.parse::<f64>() {
            if value.is_finite() {
                let rendered = format!("{value:.0}");
                return rendered.chars().filter(char::is_ascii_digit).collect();
            }
        }
    }

    trimmed.chars().filter(char::is_ascii_digit).collect()
}

/// Whether a normalized code is long enough to look up.
#[must_use]
pub fn is_valid_code(normalized: &str) -> bool {
    normalized.len() >= MIN_CODE_LEN
}

/// Truncates an externally-sourced name at the first separator substring,
/// keeping only the text before it.
///
/// External catalogs pad names with site branding (`"Milk 2L | Brand X"`);
/// only the leading segment is stored.
#[must_use]
pub fn clean_product_name(raw: &str) -> String {
    let mut cut = raw.len();
    for sep in NAME_SEPARATORS {
        if let Some(idx) = raw.find(sep) {
            cut = cut.min(idx);
        }
    }
    raw[..cut].trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_expands_scientific_notation() {
        assert_eq!(normalize("7.8913E+12"), "7891300000000");
        assert_eq!(normalize("7.8913e+12"), "7891300000000");
    }

    #[test]
    fn normalize_strips_non_digits() {
        assert_eq!(normalize("789-1234.567890"), "7891234567890");
        assert_eq!(normalize(" 7891234567890 "), "7891234567890");
    }

    #[test]
    fn normalize_empty_and_garbage() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("abc"), "");
    }

    #[test]
    fn normalize_output_is_digits_only() {
        for raw in ["7.8913E+12", "-1.2e3", "78x91", "e", "1,5E+2"] {
            assert!(
                normalize(raw).chars().all(|c| c.is_ascii_digit()),
                "non-digit output for {raw:?}"
            );
        }
    }

    #[test]
    fn is_valid_code_rejects_short_codes() {
        assert!(!is_valid_code(""));
        assert!(!is_valid_code("1234567"));
        assert!(is_valid_code("12345678"));
        assert!(is_valid_code("7891234567890"));
    }

    #[test]
    fn clean_product_name_cuts_at_pipe() {
        assert_eq!(clean_product_name("Milk 2L | Brand X"), "Milk 2L");
    }

    #[test]
    fn clean_product_name_cuts_at_earliest_separator() {
        assert_eq!(
            clean_product_name("Arroz Tipo 1 - 5kg | Mercado"),
            "Arroz Tipo 1"
        );
        assert_eq!(clean_product_name("Sabonete \u{2013} Loja"), "Sabonete");
    }

    #[test]
    fn clean_product_name_passes_plain_names_through() {
        assert_eq!(clean_product_name("Arroz Tipo 1"), "Arroz Tipo 1");
        // A hyphen without surrounding spaces is part of the name.
        assert_eq!(clean_product_name("Coca-Cola 2L"), "Coca-Cola 2L");
    }
}

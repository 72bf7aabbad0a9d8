//! Common regex patterns for airline GST invoices.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // GSTIN: state code, PAN, entity number, 'Z', check character
    pub static ref GSTIN_PATTERN: Regex = Regex::new(
        r"\b\d{2}[A-Z]{5}\d{4}[A-Z][A-Z\d]Z[A-Z\d]\b"
    ).unwrap();

    pub static ref GSTIN_EXACT: Regex = Regex::new(
        r"^\d{2}[A-Z]{5}\d{4}[A-Z][A-Z\d]Z[A-Z\d]$"
    ).unwrap();

    // Labels that mark the recipient side of an invoice
    pub static ref CUSTOMER_LABEL: Regex = Regex::new(
        r"(?i)\b(?:customer|buyer|recipient|bill(?:ed)?\s*to)\b"
    ).unwrap();

    // First amount-like token inside a table cell
    pub static ref FIRST_AMOUNT: Regex = Regex::new(
        r"(\d[\d,]*\.?\d*)"
    ).unwrap();

    // Cleaned amount: digits with an optional fraction
    pub static ref PLAIN_AMOUNT: Regex = Regex::new(
        r"^\d+(?:\.\d*)?$"
    ).unwrap();

    // Day ordinals ("16th Nov 2024")
    pub static ref ORDINAL_SUFFIX: Regex = Regex::new(
        r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b"
    ).unwrap();

    pub static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();

    // Tax keywords used by the numeric fallback
    pub static ref TAX_KEYWORD: Regex = Regex::new(r"(?i)gst|tax").unwrap();
    pub static ref CGST_KEYWORD: Regex = Regex::new(r"(?i)cgst|central\s+(?:gst|tax)").unwrap();
    pub static ref SGST_KEYWORD: Regex = Regex::new(r"(?i)sgst|utgst|state\s+(?:gst|tax)").unwrap();
    pub static ref IGST_KEYWORD: Regex = Regex::new(r"(?i)igst|integrated\s+(?:gst|tax)").unwrap();
}

/// Compile a pattern that ships with the library.
///
/// Built-in patterns are fixed at compile time; the format profile tests
/// build every one of them.
pub(crate) fn builtin(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gstin_pattern() {
        let text = "GSTIN: 06AABCI2726B1ZA and 27AAACT2727Q1ZW";
        let found: Vec<&str> = GSTIN_PATTERN.find_iter(text).map(|m| m.as_str()).collect();
        assert_eq!(found, vec!["06AABCI2726B1ZA", "27AAACT2727Q1ZW"]);

        // Fourteenth character must be Z
        assert!(!GSTIN_PATTERN.is_match("06AABCI2726B1XA"));
        assert!(GSTIN_EXACT.is_match("06AABCI2726B1ZA"));
        assert!(!GSTIN_EXACT.is_match(" 06AABCI2726B1ZA"));
    }

    #[test]
    fn test_customer_label() {
        assert!(CUSTOMER_LABEL.is_match("Customer GSTIN"));
        assert!(CUSTOMER_LABEL.is_match("BILL TO:"));
        assert!(CUSTOMER_LABEL.is_match("Recipient details"));
        assert!(!CUSTOMER_LABEL.is_match("Supplier GSTIN"));
    }

    #[test]
    fn test_plain_amount() {
        assert!(PLAIN_AMOUNT.is_match("10000"));
        assert!(PLAIN_AMOUNT.is_match("10000.50"));
        assert!(PLAIN_AMOUNT.is_match("10000."));
        assert!(!PLAIN_AMOUNT.is_match("-5"));
        assert!(!PLAIN_AMOUNT.is_match("1e5"));
        assert!(!PLAIN_AMOUNT.is_match(""));
    }

    #[test]
    #[should_panic(expected = "invalid built-in pattern")]
    fn test_builtin_rejects_bad_pattern() {
        builtin("(unclosed");
    }
}

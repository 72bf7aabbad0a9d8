//! GSTIN (Indian GST identification number) extraction and validation.

use super::patterns::{CUSTOMER_LABEL, GSTIN_EXACT, GSTIN_PATTERN};
use super::FieldExtractor;

const GSTIN_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A GSTIN found in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GstinMatch {
    pub value: String,
    /// Line of its first occurrence.
    pub line_index: usize,
    /// Whether any occurrence sits under a customer label.
    pub customer_labeled: bool,
}

/// Issuer and customer GSTINs of one invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GstinAssignment {
    pub issuer: Option<String>,
    pub customer: Option<String>,
}

/// GSTIN field extractor.
pub struct GstinExtractor {
    validate: bool,
    label_aware: bool,
}

impl GstinExtractor {
    /// Create a new GSTIN extractor.
    pub fn new() -> Self {
        Self {
            validate: false,
            label_aware: true,
        }
    }

    /// Set whether to validate GSTIN check characters.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Set whether customer labels decide which GSTIN is the customer's.
    pub fn with_label_awareness(mut self, label_aware: bool) -> Self {
        self.label_aware = label_aware;
        self
    }

    /// Assign issuer and customer.
    ///
    /// Without labels the first distinct GSTIN is the issuer and the second
    /// the customer. With label awareness, the first labeled GSTIN is the
    /// customer and the first remaining one the issuer.
    pub fn assign(&self, text: &str) -> GstinAssignment {
        let found = self.extract_all(text);

        if self.label_aware {
            if let Some(customer) = found.iter().find(|m| m.customer_labeled) {
                let issuer = found.iter().find(|m| m.value != customer.value);
                return GstinAssignment {
                    issuer: issuer.map(|m| m.value.clone()),
                    customer: Some(customer.value.clone()),
                };
            }
        }

        let mut values = found.into_iter().map(|m| m.value);
        GstinAssignment {
            issuer: values.next(),
            customer: values.next(),
        }
    }
}

impl Default for GstinExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for GstinExtractor {
    type Output = GstinMatch;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    /// Distinct GSTINs in document order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let lines: Vec<&str> = text.lines().collect();
        let mut results: Vec<GstinMatch> = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            for m in GSTIN_PATTERN.find_iter(line) {
                let value = m.as_str();
                if self.validate && !validate_gstin_checksum(value) {
                    continue;
                }

                // A label line above counts only if it carries no GSTIN itself.
                let labeled = CUSTOMER_LABEL.is_match(&line[..m.start()])
                    || i.checked_sub(1).is_some_and(|p| {
                        CUSTOMER_LABEL.is_match(lines[p]) && !GSTIN_PATTERN.is_match(lines[p])
                    });

                match results.iter_mut().find(|r| r.value == value) {
                    Some(existing) => existing.customer_labeled |= labeled,
                    None => results.push(GstinMatch {
                        value: value.to_string(),
                        line_index: i,
                        customer_labeled: labeled,
                    }),
                }
            }
        }

        results
    }
}

/// Whether a string is a structurally valid GSTIN.
pub fn is_valid_gstin(value: &str) -> bool {
    GSTIN_EXACT.is_match(value)
}

/// Validate the GSTIN check character (mod-36 weighted sum).
///
/// Each of the first 14 characters is mapped to 0-35 and multiplied by
/// alternating factors 1 and 2; the quotient and remainder of each product
/// by 36 are summed, and the check character is `(36 - sum % 36) % 36`.
pub fn validate_gstin_checksum(gstin: &str) -> bool {
    let bytes = gstin.as_bytes();
    if bytes.len() != 15 {
        return false;
    }

    let position = |c: u8| GSTIN_ALPHABET.iter().position(|a| *a == c);

    let mut sum = 0;
    for (i, c) in bytes[..14].iter().enumerate() {
        let Some(value) = position(*c) else {
            return false;
        };
        let factor = if i % 2 == 0 { 1 } else { 2 };
        let product = value * factor;
        sum += product / 36 + product % 36;
    }

    let check = (36 - sum % 36) % 36;
    GSTIN_ALPHABET[check] == bytes[14]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validate_gstin_checksum() {
        assert!(validate_gstin_checksum("27AAPFU0939F1ZV"));
        assert!(validate_gstin_checksum("29AAGCB7383J1Z4"));
        assert!(!validate_gstin_checksum("27AAPFU0939F1ZA"));
        assert!(!validate_gstin_checksum("27AAPFU0939F1Z"));
        assert!(!validate_gstin_checksum("27aapfu0939f1zv"));
    }

    #[test]
    fn test_is_valid_gstin() {
        assert!(is_valid_gstin("27AAPFU0939F1ZV"));
        assert!(!is_valid_gstin("27AAPFU0939F1YV"));
        assert!(!is_valid_gstin("GSTIN 27AAPFU0939F1ZV"));
    }

    #[test]
    fn test_document_order_assignment() {
        let text = "Supplier GSTIN 27AAPFU0939F1ZV\nGSTIN 29AAGCB7383J1Z4";
        let assignment = GstinExtractor::new().assign(text);
        assert_eq!(assignment.issuer.as_deref(), Some("27AAPFU0939F1ZV"));
        assert_eq!(assignment.customer.as_deref(), Some("29AAGCB7383J1Z4"));
    }

    #[test]
    fn test_label_aware_assignment() {
        let text = "Customer GSTIN: 29AAGCB7383J1Z4\nAirline GSTIN: 27AAPFU0939F1ZV";
        let found = GstinExtractor::new().extract_all(text);
        assert!(found[0].customer_labeled);
        assert!(!found[1].customer_labeled);

        let assignment = GstinExtractor::new().assign(text);
        assert_eq!(assignment.issuer.as_deref(), Some("27AAPFU0939F1ZV"));
        assert_eq!(assignment.customer.as_deref(), Some("29AAGCB7383J1Z4"));

        let plain = GstinExtractor::new().with_label_awareness(false).assign(text);
        assert_eq!(plain.issuer.as_deref(), Some("29AAGCB7383J1Z4"));
        assert_eq!(plain.customer.as_deref(), Some("27AAPFU0939F1ZV"));
    }

    #[test]
    fn test_label_on_previous_line() {
        let text = "27AAPFU0939F1ZV\nBill To\n29AAGCB7383J1Z4";
        let found = GstinExtractor::new().extract_all(text);
        assert_eq!(found.len(), 2);
        assert!(!found[0].customer_labeled);
        assert!(found[1].customer_labeled);
        assert_eq!(found[1].line_index, 2);
    }

    #[test]
    fn test_repeated_gstin_is_counted_once() {
        let text = "27AAPFU0939F1ZV\nfooter 27AAPFU0939F1ZV\n29AAGCB7383J1Z4";
        let assignment = GstinExtractor::new().assign(text);
        assert_eq!(assignment.issuer.as_deref(), Some("27AAPFU0939F1ZV"));
        assert_eq!(assignment.customer.as_deref(), Some("29AAGCB7383J1Z4"));
    }

    #[test]
    fn test_checksum_filter() {
        let text = "27AAPFU0939F1ZA 29AAGCB7383J1Z4";
        let found = GstinExtractor::new().with_validation(true).extract_all(text);
        let values: Vec<&str> = found.iter().map(|m| m.value.as_str()).collect();
        assert_eq!(values, vec!["29AAGCB7383J1Z4"]);
    }

    #[test]
    fn test_no_gstin() {
        assert_eq!(GstinExtractor::new().assign("no identifiers"), GstinAssignment::default());
    }
}

//! Date parsing and restyling.

use chrono::NaiveDate;

use super::patterns::{ORDINAL_SUFFIX, WHITESPACE};

/// Date format records are restyled into.
pub const CANONICAL_DATE_FORMAT: &str = "%d-%m-%Y";

/// Remove day ordinals: "16th Nov 2024" becomes "16 Nov 2024".
fn strip_ordinal(value: &str) -> String {
    let stripped = ORDINAL_SUFFIX.replace_all(value.trim(), "$1");
    WHITESPACE.replace_all(&stripped, " ").into_owned()
}

/// Parse a date with the first format that accepts it.
pub fn parse_date(value: &str, formats: &[&str]) -> Option<NaiveDate> {
    let value = strip_ordinal(value);
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&value, fmt).ok())
}

/// Whether `value` is a valid date in `format`.
pub fn matches_format(value: &str, format: &str) -> bool {
    parse_date(value, &[format]).is_some()
}

/// Rewrite a date into [`CANONICAL_DATE_FORMAT`].
///
/// Returns `None` when none of the input formats parse the value, in which
/// case the original text should be kept.
pub fn restyle_date(value: &str, inputs: &[&str]) -> Option<String> {
    parse_date(value, inputs).map(|date| date.format(CANONICAL_DATE_FORMAT).to_string())
}

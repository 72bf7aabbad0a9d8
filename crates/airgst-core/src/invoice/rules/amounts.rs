//! Amount cleaning and plausibility checks.

use rust_decimal::Decimal;

use super::patterns::PLAIN_AMOUNT;

/// Clean a raw amount as it appears in a document.
///
/// Strips currency marks, whitespace, thousands separators and a trailing
/// decimal point. Returns `None` unless the result is a plain non-negative
/// number.
pub fn clean_amount(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches("Rs.")
        .trim_start_matches("Rs")
        .trim_start_matches("INR")
        .chars()
        .filter(|c| !matches!(c, ',' | '₹' | ' ' | '\u{00a0}'))
        .collect();
    let cleaned = cleaned.trim_end_matches('.');

    if PLAIN_AMOUNT.is_match(cleaned) {
        Some(cleaned.to_string())
    } else {
        None
    }
}

/// Format an amount with two decimal places.
pub fn format_amount(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

/// Whether a tax amount is plausible.
///
/// A tax must be smaller than the taxable value when that is known, and
/// smaller than `ceiling` otherwise.
pub fn within_tax_bounds(value: Decimal, taxable: Option<Decimal>, ceiling: Decimal) -> bool {
    if value.is_sign_negative() {
        return false;
    }
    match taxable {
        Some(taxable) if taxable > Decimal::ZERO => value < taxable,
        _ => value < ceiling,
    }
}

/// Whether two amounts agree to within one paisa. Amounts too far apart to
/// subtract never agree.
pub fn amounts_agree(a: Decimal, b: Decimal) -> bool {
    a.checked_sub(b).is_some_and(|d| d.abs() <= Decimal::new(1, 2))
}

//! Post-extraction reconciliation.
//!
//! Applies format quirks and tax arithmetic to an extracted record. Steps
//! run in a fixed order and only fill or correct fields; running the
//! reconciler twice gives the same record as running it once.

use std::fmt;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::models::{Field, InvoiceRecord};

use super::profile::FormatProfile;
use super::rules::{amounts_agree, format_amount, restyle_date};

/// Tax fields taking part in the domestic/integrated split.
const REGIME_TAXES: [Field; 3] = [Field::Cgst, Field::Sgst, Field::Igst];

/// A derivation or correction the reconciler refused or had to guess at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationInconsistency {
    pub field: Field,
    pub detail: String,
}

impl ReconciliationInconsistency {
    fn new(field: Field, detail: impl Into<String>) -> Self {
        Self {
            field,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for ReconciliationInconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.detail)
    }
}

/// Which side of a domestic/integrated conflict to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Regime {
    Domestic,
    Integrated,
}

/// Corrects and completes extracted records.
#[derive(Debug, Clone)]
pub struct Reconciler {
    default_currency: String,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new("INR")
    }
}

impl Reconciler {
    /// `default_currency` is used when the profile names none.
    pub fn new(default_currency: impl Into<String>) -> Self {
        Self {
            default_currency: default_currency.into(),
        }
    }

    /// Reconcile a record, discarding the notes.
    pub fn reconcile(&self, mut record: InvoiceRecord, profile: &FormatProfile) -> InvoiceRecord {
        self.reconcile_in_place(&mut record, profile);
        record
    }

    /// Reconcile a record in place and return what could not be settled.
    ///
    /// Error records are left untouched.
    pub fn reconcile_in_place(
        &self,
        record: &mut InvoiceRecord,
        profile: &FormatProfile,
    ) -> Vec<ReconciliationInconsistency> {
        let mut notes = Vec::new();
        if record.is_error() {
            return notes;
        }

        relabel(record, profile);
        enforce_exclusivity(record, &mut notes);
        derive_taxable(record, &mut notes);
        derive_total_incl(record, &mut notes);
        derive_total(record);
        derive_missing_tax(record, &mut notes);
        // Exclusivity or a derived value may leave the profile's lone
        // domestic value behind.
        relabel(record, profile);
        if notes.is_empty() {
            check_closure(record, &mut notes);
        }
        self.apply_currency(record, profile);
        restyle(record, profile);

        for note in &notes {
            warn!(field = %note.field, "Reconciliation: {}", note.detail);
        }
        notes
    }

    fn apply_currency(&self, record: &mut InvoiceRecord, profile: &FormatProfile) {
        if record.is_set(Field::Currency) {
            return;
        }
        let has_amount = Field::ALL
            .iter()
            .any(|f| f.is_amount() && record.is_set(*f));
        if has_amount {
            let currency = profile.default_currency().unwrap_or(self.default_currency.as_str());
            record.set(Field::Currency, currency);
        }
    }
}

fn is_nonzero(record: &InvoiceRecord, field: Field) -> bool {
    record.amount(field).is_some_and(|v| !v.is_zero())
}

fn is_zero_or_empty(record: &InvoiceRecord, field: Field) -> bool {
    !record.is_set(field) || record.amount(field).is_some_and(|v| v.is_zero())
}

/// Known tax amounts, CESS included.
fn tax_amounts(record: &InvoiceRecord) -> Vec<Decimal> {
    Field::TAXES.iter().filter_map(|f| record.amount(*f)).collect()
}

/// Sum that gives `None` instead of overflowing.
fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(value))
}

fn out_of_range(field: Field) -> ReconciliationInconsistency {
    ReconciliationInconsistency::new(field, "amounts out of range, nothing derived")
}

fn fill_zero(record: &mut InvoiceRecord, field: Field) {
    if !record.is_set(field) {
        record.set(field, "0");
    }
}

/// Move a lone domestic value to IGST for formats that print it under the
/// wrong label.
fn relabel(record: &mut InvoiceRecord, profile: &FormatProfile) {
    let Some(field) = profile.relabel() else {
        return;
    };
    let other = if field == Field::Cgst { Field::Sgst } else { Field::Cgst };

    if is_nonzero(record, field)
        && is_zero_or_empty(record, Field::Igst)
        && is_zero_or_empty(record, other)
    {
        let value = record.get(field).to_string();
        debug!(from = %field, "Relabeling {} as IGST", value);
        record.set(Field::Igst, value);
        record.set(Field::Cgst, "0");
        record.set(Field::Sgst, "0");
    }
}

/// Keep exactly one of the domestic pair and IGST non-zero.
fn enforce_exclusivity(record: &mut InvoiceRecord, notes: &mut Vec<ReconciliationInconsistency>) {
    let domestic = is_nonzero(record, Field::Cgst) || is_nonzero(record, Field::Sgst);
    let integrated = is_nonzero(record, Field::Igst);

    match (domestic, integrated) {
        (false, true) => {
            fill_zero(record, Field::Cgst);
            fill_zero(record, Field::Sgst);
        }
        (true, false) => fill_zero(record, Field::Igst),
        (true, true) => match closing_regime(record) {
            Some(Regime::Domestic) => {
                notes.push(ReconciliationInconsistency::new(
                    Field::Igst,
                    "both CGST/SGST and IGST found; totals match CGST/SGST, IGST zeroed",
                ));
                record.set(Field::Igst, "0");
            }
            Some(Regime::Integrated) | None => {
                notes.push(ReconciliationInconsistency::new(
                    Field::Cgst,
                    "both CGST/SGST and IGST found; keeping IGST",
                ));
                record.set(Field::Cgst, "0");
                record.set(Field::Sgst, "0");
            }
        },
        (false, false) => {}
    }
}

/// The regime whose taxes make taxable plus taxes equal the total.
fn closing_regime(record: &InvoiceRecord) -> Option<Regime> {
    let taxable = record.amount(Field::TaxableValue)?;
    let total = record.amount(Field::TotalInclTaxes)?;
    let cess = record.amount(Field::Cess).unwrap_or_default();

    let amount = |f| record.amount(f).unwrap_or_default();
    let closes = |taxes: &[Decimal]| {
        checked_sum(taxes.iter().copied().chain([taxable, cess]))
            .is_some_and(|sum| amounts_agree(sum, total))
    };

    if closes(&[amount(Field::Igst)]) {
        Some(Regime::Integrated)
    } else if closes(&[amount(Field::Cgst), amount(Field::Sgst)]) {
        Some(Regime::Domestic)
    } else {
        None
    }
}

fn derive_taxable(record: &mut InvoiceRecord, notes: &mut Vec<ReconciliationInconsistency>) {
    if record.is_set(Field::TaxableValue) {
        return;
    }
    let Some(total) = record.amount(Field::TotalInclTaxes) else {
        return;
    };
    let taxes = tax_amounts(record);
    if taxes.is_empty() {
        return;
    }
    let Some((taxes, taxable)) =
        checked_sum(taxes).and_then(|taxes| Some((taxes, total.checked_sub(taxes)?)))
    else {
        notes.push(out_of_range(Field::TaxableValue));
        return;
    };

    if taxable > Decimal::ZERO {
        debug!("Derived taxable value {}", taxable);
        record.set(Field::TaxableValue, format_amount(taxable));
    } else {
        notes.push(ReconciliationInconsistency::new(
            Field::TaxableValue,
            format!("total {total} minus taxes {taxes} is not positive"),
        ));
    }
}

fn derive_total_incl(record: &mut InvoiceRecord, notes: &mut Vec<ReconciliationInconsistency>) {
    if record.is_set(Field::TotalInclTaxes) {
        return;
    }
    let Some(taxable) = record.amount(Field::TaxableValue) else {
        return;
    };
    let taxes = tax_amounts(record);
    if taxes.is_empty() {
        return;
    }
    match checked_sum(taxes).and_then(|taxes| taxable.checked_add(taxes)) {
        Some(total) => record.set(Field::TotalInclTaxes, format_amount(total)),
        None => notes.push(out_of_range(Field::TotalInclTaxes)),
    }
}

/// The total before tax is the taxable value.
fn derive_total(record: &mut InvoiceRecord) {
    if record.is_set(Field::Total) {
        return;
    }
    if let Some(taxable) = record.amount(Field::TaxableValue) {
        record.set(Field::Total, format_amount(taxable));
    }
}

/// Fill unknown regime taxes from the totals: the one missing CGST, SGST or
/// IGST, or both halves of the domestic pair when IGST is an explicit zero.
fn derive_missing_tax(record: &mut InvoiceRecord, notes: &mut Vec<ReconciliationInconsistency>) {
    let missing: Vec<Field> = REGIME_TAXES.iter().copied().filter(|f| !record.is_set(*f)).collect();
    match missing.as_slice() {
        [_] => {}
        [Field::Cgst, Field::Sgst] if record.amount(Field::Igst).is_some_and(|v| v.is_zero()) => {}
        _ => return,
    }
    let (Some(taxable), Some(total)) = (
        record.amount(Field::TaxableValue),
        record.amount(Field::TotalInclTaxes),
    ) else {
        return;
    };

    let Some(derived) = checked_sum(tax_amounts(record))
        .and_then(|known| total.checked_sub(taxable)?.checked_sub(known))
    else {
        notes.push(out_of_range(missing[0]));
        return;
    };
    if amounts_agree(derived, Decimal::ZERO) {
        for field in &missing {
            record.set(*field, "0");
        }
        return;
    }
    if derived.is_sign_negative() || derived >= taxable {
        notes.push(ReconciliationInconsistency::new(
            missing[0],
            format!("derived value {derived} is implausible for taxable {taxable}"),
        ));
        return;
    }

    match missing.as_slice() {
        [first, second] => {
            let half = (derived / Decimal::from(2)).round_dp(2);
            debug!("Split {} into {} and {}", derived, first, second);
            record.set(*first, format_amount(half));
            record.set(*second, format_amount(derived - half));
        }
        _ => {
            debug!(field = %missing[0], "Derived {}", derived);
            record.set(missing[0], format_amount(derived));
        }
    }
}

/// Report extracted amounts that do not add up to the total.
fn check_closure(record: &InvoiceRecord, notes: &mut Vec<ReconciliationInconsistency>) {
    let (Some(taxable), Some(total)) = (
        record.amount(Field::TaxableValue),
        record.amount(Field::TotalInclTaxes),
    ) else {
        return;
    };
    let taxes = tax_amounts(record);
    if taxes.is_empty() {
        return;
    }
    let closes = checked_sum(taxes)
        .and_then(|taxes| taxes.checked_add(taxable))
        .is_some_and(|sum| amounts_agree(sum, total));
    if !closes {
        notes.push(ReconciliationInconsistency::new(
            Field::TotalInclTaxes,
            format!("taxable {taxable} plus taxes does not match total {total}"),
        ));
    }
}

fn restyle(record: &mut InvoiceRecord, profile: &FormatProfile) {
    let Some(restyle) = profile.date_restyle() else {
        return;
    };
    if !record.is_set(Field::Date) {
        return;
    }
    if let Some(date) = restyle_date(record.get(Field::Date), &restyle.inputs) {
        record.set(Field::Date, date);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::formats::profile;
    use crate::models::FormatTag;
    use pretty_assertions::assert_eq;

    fn record(format: FormatTag, values: &[(Field, &str)]) -> InvoiceRecord {
        let mut record = InvoiceRecord::new(format);
        for (field, value) in values {
            record.set(*field, *value);
        }
        record
    }

    fn reconcile(record: InvoiceRecord) -> InvoiceRecord {
        let profile = profile(record_format(&record));
        Reconciler::default().reconcile(record, profile)
    }

    fn record_format(record: &InvoiceRecord) -> FormatTag {
        FormatTag::ALL
            .into_iter()
            .find(|tag| tag.label() == record.get(Field::Airline))
            .unwrap_or(FormatTag::Indigo)
    }

    #[test]
    fn test_integrated_invoice() {
        let result = reconcile(record(
            FormatTag::Indigo,
            &[(Field::TaxableValue, "10000.00"), (Field::Igst, "500.00")],
        ));

        assert_eq!(result.get(Field::Cgst), "0");
        assert_eq!(result.get(Field::Sgst), "0");
        assert_eq!(result.get(Field::Igst), "500.00");
        assert_eq!(result.get(Field::TotalInclTaxes), "10500.00");
        assert_eq!(result.get(Field::Total), "10000.00");
        assert_eq!(result.get(Field::Currency), "INR");
    }

    #[test]
    fn test_total_before_tax_from_taxable() {
        let result = reconcile(record(
            FormatTag::Indigo,
            &[(Field::TaxableValue, "1000.00"), (Field::Cgst, "90.00"), (Field::Sgst, "90.00")],
        ));
        assert_eq!(result.get(Field::Total), "1000.00");
        assert_eq!(result.get(Field::TotalInclTaxes), "1180.00");

        let printed = reconcile(record(
            FormatTag::Indigo,
            &[(Field::TaxableValue, "1000"), (Field::Total, "1000.50")],
        ));
        assert_eq!(printed.get(Field::Total), "1000.50");

        let derived = reconcile(record(
            FormatTag::Indigo,
            &[(Field::TotalInclTaxes, "1050.00"), (Field::Igst, "50")],
        ));
        assert_eq!(derived.get(Field::Total), "1000.00");
    }

    #[test]
    fn test_domestic_invoice() {
        let result = reconcile(record(
            FormatTag::Indigo,
            &[(Field::TaxableValue, "1000"), (Field::Cgst, "90"), (Field::Sgst, "90")],
        ));

        assert_eq!(result.get(Field::Igst), "0");
        assert_eq!(result.get(Field::TotalInclTaxes), "1180.00");
    }

    #[test]
    fn test_existing_zero_is_kept() {
        let result = reconcile(record(
            FormatTag::Indigo,
            &[(Field::TaxableValue, "1000"), (Field::Igst, "50"), (Field::Cgst, "0.00")],
        ));
        assert_eq!(result.get(Field::Cgst), "0.00");
        assert_eq!(result.get(Field::Sgst), "0");
    }

    #[test]
    fn test_conflict_settled_by_totals() {
        let mut rec = record(
            FormatTag::Indigo,
            &[
                (Field::TaxableValue, "1000"),
                (Field::Cgst, "90"),
                (Field::Sgst, "90"),
                (Field::Igst, "50"),
                (Field::TotalInclTaxes, "1180"),
            ],
        );
        let notes = Reconciler::default().reconcile_in_place(&mut rec, profile(FormatTag::Indigo));

        assert_eq!(rec.get(Field::Igst), "0");
        assert_eq!(rec.get(Field::Cgst), "90");
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].field, Field::Igst);
    }

    #[test]
    fn test_conflict_defaults_to_igst() {
        let mut rec = record(
            FormatTag::Indigo,
            &[(Field::Cgst, "90"), (Field::Sgst, "90"), (Field::Igst, "50")],
        );
        let notes = Reconciler::default().reconcile_in_place(&mut rec, profile(FormatTag::Indigo));

        assert_eq!(rec.get(Field::Igst), "50");
        assert_eq!(rec.get(Field::Cgst), "0");
        assert_eq!(rec.get(Field::Sgst), "0");
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn test_derive_taxable() {
        let result = reconcile(record(
            FormatTag::Indigo,
            &[(Field::TotalInclTaxes, "1050.00"), (Field::Igst, "50")],
        ));
        assert_eq!(result.get(Field::TaxableValue), "1000.00");
    }

    #[test]
    fn test_derive_taxable_needs_a_tax() {
        let result = reconcile(record(FormatTag::Indigo, &[(Field::TotalInclTaxes, "1050")]));
        assert_eq!(result.get(Field::TaxableValue), "");
    }

    #[test]
    fn test_non_positive_taxable_is_discarded() {
        let mut rec = record(FormatTag::Indigo, &[(Field::TotalInclTaxes, "50"), (Field::Igst, "50")]);
        let notes = Reconciler::default().reconcile_in_place(&mut rec, profile(FormatTag::Indigo));

        assert_eq!(rec.get(Field::TaxableValue), "");
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].field, Field::TaxableValue);
    }

    #[test]
    fn test_derive_missing_tax() {
        let result = reconcile(record(
            FormatTag::Indigo,
            &[(Field::TaxableValue, "1000"), (Field::TotalInclTaxes, "1180"), (Field::Cgst, "90")],
        ));
        assert_eq!(result.get(Field::Igst), "0");
        assert_eq!(result.get(Field::Sgst), "90.00");
    }

    #[test]
    fn test_zero_igst_splits_remainder_into_domestic_pair() {
        let mut rec = record(
            FormatTag::Indigo,
            &[
                (Field::TaxableValue, "1000.00"),
                (Field::Igst, "0.00"),
                (Field::TotalInclTaxes, "1180.00"),
            ],
        );
        let notes = Reconciler::default().reconcile_in_place(&mut rec, profile(FormatTag::Indigo));

        assert!(notes.is_empty(), "{notes:?}");
        assert_eq!(rec.get(Field::Cgst), "90.00");
        assert_eq!(rec.get(Field::Sgst), "90.00");
        assert_eq!(rec.get(Field::Igst), "0.00");
    }

    #[test]
    fn test_domestic_split_keeps_odd_paisa() {
        let result = reconcile(record(
            FormatTag::Indigo,
            &[
                (Field::TaxableValue, "1000.00"),
                (Field::Igst, "0"),
                (Field::Cess, "5.00"),
                (Field::TotalInclTaxes, "1185.01"),
            ],
        ));
        assert_eq!(result.get(Field::Cgst), "90.00");
        assert_eq!(result.get(Field::Sgst), "90.01");
    }

    #[test]
    fn test_zero_igst_with_matching_total_zeroes_pair() {
        let result = reconcile(record(
            FormatTag::Indigo,
            &[(Field::TaxableValue, "1000"), (Field::Igst, "0"), (Field::TotalInclTaxes, "1000")],
        ));
        assert_eq!(result.get(Field::Cgst), "0");
        assert_eq!(result.get(Field::Sgst), "0");
    }

    #[test]
    fn test_overflowing_amounts_skip_derivation() {
        let huge = "70000000000000000000000000000";
        let mut rec = record(
            FormatTag::Indigo,
            &[(Field::TaxableValue, huge), (Field::Igst, "60000000000000000000000000000")],
        );
        let notes = Reconciler::default().reconcile_in_place(&mut rec, profile(FormatTag::Indigo));

        assert_eq!(rec.get(Field::TotalInclTaxes), "");
        assert_eq!(rec.get(Field::TaxableValue), huge);
        assert_eq!(rec.get(Field::Cgst), "0");
        assert_eq!(rec.get(Field::Currency), "INR");
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].field, Field::TotalInclTaxes);
    }

    #[test]
    fn test_overflow_near_max_everywhere() {
        let max = Decimal::MAX.to_string();
        let cases = [
            vec![(Field::TotalInclTaxes, max.as_str()), (Field::Igst, max.as_str())],
            vec![(Field::TaxableValue, max.as_str()), (Field::Cgst, max.as_str()), (Field::Sgst, max.as_str())],
            vec![
                (Field::TaxableValue, max.as_str()),
                (Field::TotalInclTaxes, max.as_str()),
                (Field::Cgst, max.as_str()),
                (Field::Sgst, max.as_str()),
                (Field::Igst, max.as_str()),
            ],
            vec![(Field::TaxableValue, max.as_str()), (Field::TotalInclTaxes, "1"), (Field::Cgst, "0")],
        ];

        for case in cases {
            let once = reconcile(record(FormatTag::Indigo, &case));
            assert_eq!(reconcile(once.clone()), once);
        }
    }

    #[test]
    fn test_mismatched_totals_are_reported() {
        let mut rec = record(
            FormatTag::Indigo,
            &[
                (Field::TaxableValue, "1000"),
                (Field::Cgst, "90"),
                (Field::Sgst, "90"),
                (Field::TotalInclTaxes, "5000"),
            ],
        );
        let notes = Reconciler::default().reconcile_in_place(&mut rec, profile(FormatTag::Indigo));

        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].field, Field::TotalInclTaxes);
        assert_eq!(rec.get(Field::TotalInclTaxes), "5000");
    }

    #[test]
    fn test_derived_tax_near_zero() {
        let result = reconcile(record(
            FormatTag::Indigo,
            &[
                (Field::TaxableValue, "1000.00"),
                (Field::TotalInclTaxes, "1000.01"),
                (Field::Cgst, "0"),
                (Field::Sgst, "0"),
            ],
        ));
        assert_eq!(result.get(Field::Igst), "0");
    }

    #[test]
    fn test_implausible_derived_tax_is_discarded() {
        let mut rec = record(
            FormatTag::Indigo,
            &[
                (Field::TaxableValue, "100"),
                (Field::TotalInclTaxes, "500"),
                (Field::Cgst, "0"),
                (Field::Sgst, "0"),
            ],
        );
        let notes = Reconciler::default().reconcile_in_place(&mut rec, profile(FormatTag::Indigo));

        assert_eq!(rec.get(Field::Igst), "");
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].field, Field::Igst);
    }

    #[test]
    fn test_relabel_lone_sgst() {
        let result = reconcile(record(
            FormatTag::SriLankan,
            &[(Field::TaxableValue, "5000"), (Field::Sgst, "250")],
        ));

        assert_eq!(result.get(Field::Igst), "250");
        assert_eq!(result.get(Field::Cgst), "0");
        assert_eq!(result.get(Field::Sgst), "0");
        assert_eq!(result.get(Field::TotalInclTaxes), "5250.00");
    }

    #[test]
    fn test_relabel_applies_to_derived_value() {
        let result = reconcile(record(
            FormatTag::SriLankan,
            &[
                (Field::TaxableValue, "5000"),
                (Field::TotalInclTaxes, "5250"),
                (Field::Cgst, "0"),
                (Field::Igst, "0"),
            ],
        ));
        assert_eq!(result.get(Field::Igst), "250.00");
        assert_eq!(result.get(Field::Sgst), "0");
    }

    #[test]
    fn test_relabel_after_conflict_is_stable() {
        let mut rec = record(
            FormatTag::SriLankan,
            &[
                (Field::TaxableValue, "5000"),
                (Field::Sgst, "250"),
                (Field::Igst, "40"),
                (Field::TotalInclTaxes, "5250"),
            ],
        );
        let notes = Reconciler::default().reconcile_in_place(&mut rec, profile(FormatTag::SriLankan));
        assert_eq!(notes.len(), 1);
        assert_eq!(rec.get(Field::Igst), "250");
        assert_eq!(rec.get(Field::Cgst), "0");
        assert_eq!(rec.get(Field::Sgst), "0");

        let again = reconcile(rec.clone());
        assert_eq!(again, rec);
    }

    #[test]
    fn test_relabel_only_for_profile() {
        let result = reconcile(record(
            FormatTag::Indigo,
            &[(Field::TaxableValue, "5000"), (Field::Sgst, "250")],
        ));
        assert_eq!(result.get(Field::Sgst), "250");
        assert_eq!(result.get(Field::Igst), "0");
    }

    #[test]
    fn test_currency_only_with_amounts() {
        let empty = reconcile(record(FormatTag::Indigo, &[(Field::Pnr, "X7YZ2Q")]));
        assert_eq!(empty.get(Field::Currency), "");

        let printed = reconcile(record(
            FormatTag::Indigo,
            &[(Field::TaxableValue, "100"), (Field::Currency, "USD")],
        ));
        assert_eq!(printed.get(Field::Currency), "USD");
    }

    #[test]
    fn test_reconciler_currency_fallback() {
        let bare = FormatProfile::builder(FormatTag::Indigo).build();
        let result = Reconciler::new("AED").reconcile(
            record(FormatTag::Indigo, &[(Field::TaxableValue, "100")]),
            &bare,
        );
        assert_eq!(result.get(Field::Currency), "AED");
    }

    #[test]
    fn test_date_restyle() {
        let result = reconcile(record(FormatTag::Kuwait, &[(Field::Date, "05-Jun-2024")]));
        assert_eq!(result.get(Field::Date), "05-06-2024");

        let result = reconcile(record(FormatTag::Oman, &[(Field::Date, "16th Nov 2024")]));
        assert_eq!(result.get(Field::Date), "16-11-2024");

        let kept = reconcile(record(FormatTag::Kuwait, &[(Field::Date, "sometime")]));
        assert_eq!(kept.get(Field::Date), "sometime");

        let untouched = reconcile(record(FormatTag::Indigo, &[(Field::Date, "05-Jun-2024")]));
        assert_eq!(untouched.get(Field::Date), "05-Jun-2024");
    }

    #[test]
    fn test_error_record_untouched() {
        let mut rec = InvoiceRecord::error("unreadable");
        let notes = Reconciler::default().reconcile_in_place(&mut rec, profile(FormatTag::Indigo));
        assert!(notes.is_empty());
        assert_eq!(rec, InvoiceRecord::error("unreadable"));
    }

    #[test]
    fn test_idempotent() {
        let cases = [
            record(FormatTag::Indigo, &[(Field::TaxableValue, "10000.00"), (Field::Igst, "500.00")]),
            record(FormatTag::Indigo, &[(Field::TotalInclTaxes, "1180"), (Field::Cgst, "90"), (Field::Sgst, "90")]),
            record(FormatTag::Indigo, &[(Field::Cgst, "90"), (Field::Igst, "50")]),
            record(FormatTag::SriLankan, &[(Field::TaxableValue, "5000"), (Field::Sgst, "250"), (Field::Date, "06/05/2024")]),
            record(FormatTag::SriLankan, &[(Field::TaxableValue, "5000"), (Field::TotalInclTaxes, "5250"), (Field::Cgst, "0"), (Field::Igst, "0")]),
            record(FormatTag::Kuwait, &[(Field::Date, "05-Jun-2024"), (Field::Cess, "10")]),
            record(FormatTag::Oman, &[(Field::TaxableValue, "100"), (Field::TotalInclTaxes, "500"), (Field::Cgst, "0"), (Field::Sgst, "0")]),
        ];

        for case in cases {
            let once = reconcile(case);
            let twice = reconcile(once.clone());
            assert_eq!(twice, once);
        }
    }

    #[test]
    fn test_closure_holds_after_reconcile() {
        let result = reconcile(record(
            FormatTag::Indigo,
            &[(Field::TaxableValue, "2000"), (Field::Cgst, "90"), (Field::Sgst, "90"), (Field::Cess, "5")],
        ));
        let taxable = result.amount(Field::TaxableValue).unwrap();
        let taxes = result.tax_total().unwrap();
        let total = result.amount(Field::TotalInclTaxes).unwrap();
        assert!(amounts_agree(taxable + taxes, total));
    }
}

//! Base rule lists shared by every format.
//!
//! Format profiles start from these lists and prepend or replace rules for
//! the fields their layouts print differently.

use std::sync::Arc;

use lazy_static::lazy_static;

use super::{ColumnMatch, PatternRule, TableLocator, TextRule};
use crate::models::Field;

/// Optional currency mark before an amount.
pub const CURRENCY_MARK: &str = r"(?:Rs\.?|INR|₹)?\s*";

/// Captured amount with thousands separators.
pub const AMOUNT: &str = r"(\d[\d,]*\.?\d*)";

/// Company name ending in a legal-form suffix, on one line.
pub const COMPANY_NAME: &str =
    r"((?i:[A-Z][A-Z0-9 &.,\-]+(?:PVT|LTD|LIMITED|PRIVATE|INC|CORP|LLC))\b)";

/// Labels that may follow a customer name on the same line.
pub const NAME_TRAILER: &str = r"(?i)\s+(?:Reference|Address|PLOT|GSTIN|State)\b";

/// Three-letter route pair such as `DEL-BOM` or `DEL → BOM`.
pub const ROUTE_PAIR: &str = r"\b([A-Z]{3})\s*[-–>→]\s*([A-Z]{3})\b";

lazy_static! {
    static ref GST_TABLE: Arc<TableLocator> = Arc::new(gst_table());
}

/// The common GST summary table: a header row naming IGST and CGST, with
/// each tax split into rate and amount sub-columns.
pub fn gst_table() -> TableLocator {
    TableLocator::new(&["igst", "cgst"])
        .skip(&["Tax %", "Amount"])
        .column(ColumnMatch::new(&[], &["sac"]))
        .column(ColumnMatch::new(&[], &["non"]))
        .column(ColumnMatch::new(&[], &["exempt"]))
        .column(ColumnMatch::new(&[Field::TaxableValue], &["taxable"]))
        .column(ColumnMatch::new(&[Field::Igst], &["igst"]).offset(1))
        .column(ColumnMatch::new(&[Field::Cgst], &["cgst"]).offset(1))
        .column(ColumnMatch::new(&[Field::Sgst], &["sgst"]).offset(1))
        .column(ColumnMatch::new(&[Field::Sgst], &["ugst"]).offset(1))
        .column(ColumnMatch::new(&[Field::Sgst], &["utgst"]).offset(1))
        .column(ColumnMatch::new(&[Field::Cess], &["cess"]).offset(1))
        .column(ColumnMatch::new(&[Field::TotalInclTaxes], &["total", "incl"]))
        .column(ColumnMatch::new(&[Field::Total], &["total"]))
}

/// Labeled amount: `label`, optional rate, optional currency mark, amount.
pub fn labeled_amount(label: &str) -> TextRule {
    TextRule::new(&format!(
        r"(?:{label})[:\s@]*(?:[\d.]+\s*%)?[:\s]*{CURRENCY_MARK}{AMOUNT}"
    ))
}

fn amount_after(label: &str) -> PatternRule {
    PatternRule::Text(TextRule::new(&format!(r"(?:{label})[:\s]*{CURRENCY_MARK}{AMOUNT}")))
}

fn customer_name(label: &str) -> PatternRule {
    PatternRule::Text(
        TextRule::new(&format!(r"(?:{label})[:\s]*\n?{COMPANY_NAME}")).truncate(NAME_TRAILER),
    )
}

/// Rules used when a format does not override a field.
pub fn base_rules(field: Field) -> Vec<PatternRule> {
    let table = PatternRule::Column(GST_TABLE.clone());

    match field {
        // Set from the profile and the GSTIN extractor.
        Field::Airline | Field::Gstin | Field::CustomerGstin => Vec::new(),
        Field::Number => vec![
            PatternRule::text(r"(?i:Invoice\s*(?:No\.?|Number))[:\s]+([A-Z0-9][A-Z0-9\-/]*\d[A-Z0-9\-/]*)"),
            PatternRule::text(r"(?i:Number)[:\s]+([A-Z0-9]*\d[A-Z0-9]*)"),
        ],
        Field::CustomerName => vec![
            customer_name(r"(?i:GSTIN\s*Customer\s*Name)"),
            customer_name(r"(?i:Customer\s*Name)"),
            customer_name(r"(?i:Bill(?:ed)?\s*To)"),
            customer_name(r"(?i:Sold\s*To)"),
        ],
        Field::Date => vec![
            TextRule::new(r"\b(\d{2}-\d{2}-\d{4})\b").date("%d-%m-%Y").into(),
            TextRule::new(r"\b(\d{2}/\d{2}/\d{4})\b").date("%d/%m/%Y").into(),
            TextRule::new(r"\b(\d{2}-[A-Za-z]{3}-\d{4})\b").date("%d-%b-%Y").into(),
            TextRule::new(r"\b(\d{2}/[A-Za-z]{3}/\d{4})\b").date("%d/%b/%Y").into(),
            TextRule::new(r"\b(\d{4}-\d{2}-\d{2})\b").date("%Y-%m-%d").into(),
        ],
        Field::Pnr => vec![PatternRule::text(r"(?i:PNR)(?:\s*(?i:No|Number)\.?)?[:\s]*([A-Z0-9]{6})\b")],
        Field::From => vec![
            TextRule::new(ROUTE_PAIR).into(),
            PatternRule::RowText(TextRule::new(ROUTE_PAIR)),
            PatternRule::text(r"\b(?i:From|Origin|Departure|Dept?)[:\s]*([A-Z]{3})\b"),
        ],
        Field::To => vec![
            TextRule::new(ROUTE_PAIR).group(2).into(),
            PatternRule::RowText(TextRule::new(ROUTE_PAIR).group(2)),
            PatternRule::text(r"\b(?i:To|Destination|Arrival|Arr)[:\s]*([A-Z]{3})\b"),
        ],
        Field::TaxableValue => vec![
            table,
            labeled_amount(r"(?i:Taxable)[:\s]*(?i:Value|Amount)?").into(),
            amount_after(r"(?i:Base\s*Fare)"),
            amount_after(r"\b(?i:Fare)"),
            amount_after(r"(?i:Taxable\s*Amt)"),
            PatternRule::row_label(r"(?i)taxable|base.*fare|fare"),
        ],
        Field::Cgst => vec![
            table,
            labeled_amount(r"(?i:CGST)").into(),
            labeled_amount(r"(?i:Central\s*GST)").into(),
            labeled_amount(r"(?i:C\.GST)").into(),
            PatternRule::row_label(r"(?i)\bCGST\b|Central.*GST"),
        ],
        Field::Sgst => vec![
            table,
            labeled_amount(r"(?i:SGST|UTGST)").into(),
            labeled_amount(r"(?i:State\s*GST)").into(),
            labeled_amount(r"(?i:S\.GST)").into(),
            PatternRule::row_label(r"(?i)\b(?:SGST|UTGST)\b|State.*GST"),
        ],
        Field::Igst => vec![
            table,
            labeled_amount(r"(?i:IGST)").into(),
            labeled_amount(r"(?i:Integrated\s*GST)").into(),
            labeled_amount(r"(?i:I\.GST)").into(),
            PatternRule::row_label(r"(?i)\bIGST\b|Integrated.*GST"),
        ],
        Field::Cess => vec![
            table,
            labeled_amount(r"(?i:CESS\s*Amt)").into(),
            labeled_amount(r"(?i:CESS)").into(),
            PatternRule::row_label(r"(?i)\bCESS\b"),
        ],
        Field::Total => vec![
            table,
            amount_after(r"(?i:Sub\s*-?\s*Total)"),
            amount_after(r"(?i:Total\s+(?:Value\s+)?(?:before|excl(?:uding|\.)?)\s+Tax(?:es)?)"),
        ],
        Field::TotalInclTaxes => vec![
            table,
            amount_after(r"(?i:Grand\s+Total)"),
            amount_after(r"(?i:Total\s*\(Incl\.?\s*Taxes?\))"),
            amount_after(r"(?i:Total\s+Invoice\s+(?:Value|Amount))"),
            amount_after(r"(?i:Total\s+Amount)"),
            amount_after(r"(?i:Net\s+Amount)"),
            amount_after(r"(?m:^)\s*(?i:Total)"),
        ],
        Field::Currency => vec![PatternRule::text(r"\b(INR|USD|EUR|GBP|AED)\b")],
    }
}

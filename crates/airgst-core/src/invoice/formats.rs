//! Built-in format profiles, one per supported airline.

use std::sync::Arc;

use lazy_static::lazy_static;

use super::profile::FormatProfile;
use super::rules::library::{labeled_amount, AMOUNT, NAME_TRAILER};
use super::rules::{ColumnMatch, PatternRule, RowLabelRule, TableLocator, TextRule};
use crate::models::{Field, FormatTag};

lazy_static! {
    static ref INDIGO: FormatProfile = indigo();
    static ref AIR_INDIA: FormatProfile = air_india();
    static ref AIR_INDIA_EXPRESS: FormatProfile = air_india_express();
    static ref KUWAIT: FormatProfile = kuwait();
    static ref OMAN: FormatProfile = oman();
    static ref QATAR: FormatProfile = qatar();
    static ref SRILANKAN: FormatProfile = srilankan();
    static ref TURKISH: FormatProfile = turkish();
    static ref MALAYSIA: FormatProfile = malaysia();
    static ref AKASA: FormatProfile = akasa();
}

/// The shared profile for a format.
pub fn profile(tag: FormatTag) -> &'static FormatProfile {
    match tag {
        FormatTag::Indigo => &INDIGO,
        FormatTag::AirIndia => &AIR_INDIA,
        FormatTag::AirIndiaExpress => &AIR_INDIA_EXPRESS,
        FormatTag::Kuwait => &KUWAIT,
        FormatTag::Oman => &OMAN,
        FormatTag::Qatar => &QATAR,
        FormatTag::SriLankan => &SRILANKAN,
        FormatTag::Turkish => &TURKISH,
        FormatTag::Malaysia => &MALAYSIA,
        FormatTag::Akasa => &AKASA,
    }
}

fn text(pattern: &str) -> PatternRule {
    PatternRule::text(pattern)
}

fn amount_after(label: &str) -> PatternRule {
    text(&format!(r"(?:{label})[:\s]*₹?\s*{AMOUNT}"))
}

fn indigo() -> FormatProfile {
    FormatProfile::builder(FormatTag::Indigo)
        .keywords(&["INDIGO", "INTERGLOBE"])
        .currency("INR")
        .build()
}

fn air_india() -> FormatProfile {
    let table = Arc::new(
        TableLocator::new(&["value of", "service"])
            .skip(&["Taxable*", "Non"])
            .priority(&["total"])
            .column(ColumnMatch::new(&[Field::TaxableValue], &["value of", "service"]))
            .column(ColumnMatch::new(&[], &["net", "taxable"]))
            .column(ColumnMatch::new(&[Field::Cgst], &["cgst"]))
            .column(ColumnMatch::new(&[Field::Sgst], &["sgst"]))
            .column(ColumnMatch::new(&[Field::Sgst], &["utgst"]))
            .column(ColumnMatch::new(&[Field::Igst], &["igst"]))
            .column(ColumnMatch::new(&[Field::TotalInclTaxes], &["total value"])),
    );
    let column = || PatternRule::Column(table.clone());

    FormatProfile::builder(FormatTag::AirIndia)
        .keywords(&["AIR INDIA", "AIRINDIA"])
        .replace(Field::Number, vec![
            text(r"(?i:Debit\s*Note\s*Number)[:\s]*([A-Z0-9]+)"),
            text(r"(?i:Invoice\s*(?:No|Number))[:\s]+([A-Z0-9][A-Z0-9\-/]*)"),
            text(r"(?i:Number)[:\s]+([A-Z0-9][A-Z0-9\-/]*)"),
        ])
        .replace(Field::CustomerName, vec![
            TextRule::new(
                r"(?i:Customer)\s*:[:\s]*((?i:[A-Z][A-Z0-9 &.,\-]+(?:LIMITED|LTD|PRIVATE|PVT|SERVICES|CO))\b)",
            )
            .truncate(NAME_TRAILER)
            .into(),
            TextRule::new(r"(?i:Customer)[:\s]*\n?([A-Z][A-Z0-9 &.,\-]+)")
                .truncate(NAME_TRAILER)
                .into(),
        ])
        .append(Field::Pnr, vec![text(r"(?i:Booking\s*(?:Ref|Reference))[:\s]*([A-Z0-9]{6})\b")])
        .prepend(Field::Date, vec![
            text(r"(?i:Debit\s*Note\s*Date|Invoice\s*Date)[:\s]*(\d{2}[-/]\d{2}[-/]\d{4})"),
            text(r"(?i:Date)[:\s]*(\d{2}[-/]\d{2}[-/]\d{4})"),
            text(r"(?i:Date)[:\s]*(\d{2}[-/][A-Za-z]{3}[-/]\d{4})"),
        ])
        .prepend(Field::From, vec![text(r"(?i:Routing)[:\s]*([A-Z]{3})([A-Z]{3})")])
        .prepend(Field::To, vec![TextRule::new(r"(?i:Routing)[:\s]*([A-Z]{3})([A-Z]{3})").group(2).into()])
        .prepend(Field::TaxableValue, vec![column(), text(&format!(r"(?i:Value\s+of\s+service)[:\s]*{AMOUNT}"))])
        .prepend(Field::Cgst, vec![column()])
        .prepend(Field::Sgst, vec![column()])
        .prepend(Field::Igst, vec![column()])
        .prepend(Field::TotalInclTaxes, vec![column(), text(&format!(r"(?i:Total\s+Value)[:\s]*{AMOUNT}"))])
        .currency("INR")
        .build()
}

fn air_india_express() -> FormatProfile {
    let table = Arc::new(
        TableLocator::new(&["taxable value", "igst"])
            .column(ColumnMatch::new(&[], &["sac"]))
            .column(ColumnMatch::new(&[], &["non"]))
            .column(ColumnMatch::new(&[Field::TaxableValue], &["taxable"]))
            .column(ColumnMatch::new(&[Field::Igst], &["igst", "amount"]))
            .column(ColumnMatch::new(&[], &["igst"]))
            .column(ColumnMatch::new(&[Field::TotalInclTaxes], &["total invoice"]))
            .column(ColumnMatch::new(&[Field::Total], &["total"])),
    );
    let column = || PatternRule::Column(table.clone());

    FormatProfile::builder(FormatTag::AirIndiaExpress)
        .keywords(&["AIR INDIA EXPRESS"])
        .prepend(Field::Number, vec![text(r"(?i:Invoice\s*Number)[:\s]*([A-Z0-9]*\d[A-Z0-9]*)")])
        .prepend(Field::CustomerName, vec![text(
            r"(?i:GSTIN\s*Customer\s*Name)[:\s]*((?i:[A-Z][A-Z ]+(?:LIMITED|LTD|SERVICES|PRIVATE|PVT))\b)",
        )])
        .prepend(Field::Date, vec![
            TextRule::new(r"(?i:Invoice\s*Date)[:\s]*(\d{2}-\d{2}-\d{4})").date("%d-%m-%Y").into(),
        ])
        .prepend(Field::From, vec![text(r"(?i:Flight\s*From)[:\s]*([A-Z]{3})\b")])
        .prepend(Field::To, vec![text(r"(?i:Flight\s*To)[:\s]*([A-Z]{3})\b")])
        .prepend(Field::TaxableValue, vec![column()])
        .prepend(Field::Igst, vec![column()])
        .prepend(Field::Total, vec![column()])
        .prepend(Field::TotalInclTaxes, vec![column()])
        .currency("INR")
        .build()
}

/// Tax line with an optional rate before the amount.
fn kuwait_tax(label: &str) -> PatternRule {
    text(&format!(r"(?i:{label})\s+(?:\d+(?:\.\d+)?\s*%?\s+)?{AMOUNT}"))
}

fn kuwait() -> FormatProfile {
    FormatProfile::builder(FormatTag::Kuwait)
        .keywords(&["KUWAIT AIRWAYS"])
        .prepend(Field::Number, vec![
            text(r"\b([A-Z]{3}/[A-Z][a-z]{2}/\d{2}/\d+)"),
            text(r"(?i:(?:Invoice|Ticket)\s*(?:No|Number))[:\s-]+([A-Z0-9][A-Z0-9\-/]*)"),
        ])
        .prepend(Field::CustomerName, vec![text(
            r"(?i:KUWAIT AIRWAYS COMPANY)\s+((?i:[A-Z][A-Z ]+(?:LIMITED|LTD|SERVICES|PRIVATE|PVT))\b)",
        )])
        .prepend(Field::Pnr, vec![text(r"(?i:Ticket\s*No)[:\s-]+(\d+)")])
        .prepend(Field::Date, vec![
            TextRule::new(r"\b(\d{2}-[A-Z][a-z]{2}-\d{4})\b").date("%d-%b-%Y").into(),
        ])
        .prepend(Field::TaxableValue, vec![
            text(&format!(r"996425\s+{AMOUNT}")),
            PatternRule::row_label(r"(?i)Total\s+Value\s+of\s+Services"),
        ])
        .prepend(Field::Cgst, vec![
            kuwait_tax(r"Central\s+Tax\s*\(CGST\)"),
            RowLabelRule::new(r"(?i)Central\s+Tax\s*\(CGST\)").last().into(),
        ])
        .prepend(Field::Sgst, vec![
            kuwait_tax(r"State\s+Tax\s*\(SGST\)"),
            RowLabelRule::new(r"(?i)State\s+Tax\s*\(SGST\)").last().into(),
        ])
        .prepend(Field::Igst, vec![
            kuwait_tax(r"Inter?grated\s+Tax\s*\(IGST\)"),
            RowLabelRule::new(r"(?i)Inter?grated\s+Tax\s*\(IGST\)").last().into(),
        ])
        .prepend(Field::TotalInclTaxes, vec![
            text(&format!(r"(?i:Total\s+Invoice\s+Value\s+including\s+taxes)[:\s]*{AMOUNT}")),
            PatternRule::row_text(&format!(r"(?i:Total\s+Invoice\s+Value\s+including\s+taxes)\D*{AMOUNT}")),
        ])
        .restyle_dates(&["%d-%b-%Y"])
        .currency("INR")
        .build()
}

/// Service line: SAC, fare, taxable value, rate, IGST amount, line total.
const OMAN_SERVICE_LINE: &str = r"996425\s+\d+\s+(\d+)\s+\d+\s+IGST:\s*(\d+)\s+(\d+)";

fn oman() -> FormatProfile {
    FormatProfile::builder(FormatTag::Oman)
        .keywords(&["OMAN AIR"])
        .prepend(Field::Number, vec![
            text(r"(?i:Invoice)\s+([A-Z]{3}[A-Z0-9]+IN\d+)"),
            text(r"(?i:Invoice)[:\s]+([A-Z0-9]*\d[A-Z0-9]*)\b"),
        ])
        .prepend(Field::Pnr, vec![text(r"(?i:Ticket/Document\s+number)[:\s]+(\d+)")])
        .prepend(Field::Date, vec![
            TextRule::new(r"(?i:Invoice\s+Date)[:\s]+(\d{1,2}(?:st|nd|rd|th)?\s+[A-Z][a-z]{2,}\s+\d{4})")
                .date("%d %b %Y")
                .into(),
        ])
        .prepend(Field::TaxableValue, vec![
            TextRule::new(OMAN_SERVICE_LINE).into(),
            text(r"(?i:Taxable\s+Value)\s+₹?\s*(\d+)"),
        ])
        .prepend(Field::Igst, vec![
            TextRule::new(OMAN_SERVICE_LINE).group(2).into(),
            text(r"IGST:\s*(\d+)"),
        ])
        .prepend(Field::TotalInclTaxes, vec![
            TextRule::new(OMAN_SERVICE_LINE).group(3).into(),
            text(r"(?i:Total\s+Invoice\s+Amount)\s+₹?\s*(\d+)"),
        ])
        .restyle_dates(&["%d %b %Y", "%d-%b-%Y"])
        .currency("INR")
        .build()
}

fn qatar() -> FormatProfile {
    FormatProfile::builder(FormatTag::Qatar)
        .keywords(&["QATAR AIRWAYS"])
        .prepend(Field::Number, vec![
            text(r"(?i:Invoice\s+No)[:\s]+(\d+[A-Z]+\d+)"),
            text(r"(?i:Invoice\s+No)[:\s]+([A-Z0-9]*\d[A-Z0-9]*)"),
        ])
        .prepend(Field::Pnr, vec![text(r"(?i:Ticket/\s*Document\s+Number)[:\s]+(\d+)")])
        .prepend(Field::Date, vec![
            TextRule::new(r"(?i:Invoice\s+Date)[:\s]+(\d{2}-\d{2}-\d{4})").date("%d-%m-%Y").into(),
        ])
        .prepend(Field::TaxableValue, vec![amount_after(r"(?i:Taxable\s+Value)")])
        .prepend(Field::Total, vec![amount_after(r"(?i:Total\s+Value)")])
        .prepend(Field::Igst, vec![
            PatternRule::row_text(&format!(r"(?i:IGST)\s*₹?\s*{AMOUNT}")),
            text(&format!(r"(?i:IGST)\s*₹?\s*{AMOUNT}")),
        ])
        .prepend(Field::TotalInclTaxes, vec![amount_after(r"(?i:Total\s+Invoice\s+Amount)")])
        .currency("INR")
        .build()
}

fn srilankan() -> FormatProfile {
    let route = r"\b([A-Z]{3})\\([A-Z]{3})\b";

    FormatProfile::builder(FormatTag::SriLankan)
        .keywords(&["SRILANKAN AIRLINES", "SRILANKA"])
        .prepend(Field::Number, vec![text(r"(?i:Serial\s+No)\.?[:\s]+(\d+)")])
        .prepend(Field::Pnr, vec![text(r"([A-Z0-9]{6})\s*\n\s*[A-Z]{3}\\[A-Z]{3}")])
        .prepend(Field::Date, vec![
            TextRule::new(r"(?i:Date)\s*:\s*(\d{1,2}/\d{1,2}/\d{4})").date("%m/%d/%Y").into(),
        ])
        .prepend(Field::From, vec![text(route)])
        .prepend(Field::To, vec![TextRule::new(route).group(2).into()])
        .prepend(Field::Currency, vec![text(r"Currency\s*:\s*([A-Z]{3})\b")])
        .prepend(Field::TaxableValue, vec![text(r"\b(?:Y|Class)\s+[A-Z0-9]+\s+(\d+)")])
        .prepend(Field::Sgst, vec![text(r"(?i:SGST)\s+(\d+)")])
        .prepend(Field::TotalInclTaxes, vec![text(r"(?i:Total)\s+(\d+)")])
        .relabel(Field::Sgst)
        .restyle_dates(&["%m/%d/%Y"])
        .currency("INR")
        .build()
}

/// Ticket line: total, taxable, then rate and amount for CGST, SGST and IGST.
const TURKISH_TICKET_LINE: &str =
    r"(\d+\.\d{2})\s+(\d+\.\d{2})\s+[\d.]+\s+([\d.]+)\s+[\d.]+\s+([\d.]+)\s+[\d.]+\s+([\d.]+)";

fn turkish() -> FormatProfile {
    let table = Arc::new(
        TableLocator::new(&["ticket", "taxable"])
            .column(ColumnMatch::new(&[], &["ticket"]))
            .column(ColumnMatch::new(&[], &["date"]))
            .column(ColumnMatch::new(&[Field::TaxableValue], &["taxable"]))
            .column(ColumnMatch::new(&[Field::TotalInclTaxes], &["total"]))
            .column(ColumnMatch::new(&[Field::Cgst], &["cgst"]).offset(1))
            .column(ColumnMatch::new(&[Field::Sgst], &["sgst"]).offset(1))
            .column(ColumnMatch::new(&[Field::Igst], &["igst"]).offset(1)),
    );
    let column = || PatternRule::Column(table.clone());
    let line = |group| -> PatternRule { TextRule::new(TURKISH_TICKET_LINE).group(group).into() };

    FormatProfile::builder(FormatTag::Turkish)
        .keywords(&["TURKISH AIRLINES"])
        .prepend(Field::Number, vec![text(r"(?i:Invoice\s+No)\s*:\s*([A-Z0-9/\-]+)")])
        .prepend(Field::Pnr, vec![text(r"\b(\d{13})\b")])
        .prepend(Field::Date, vec![
            TextRule::new(r"(?i:Invoice\s+Dt)\s*:\s*(\d{2}-\d{2}-\d{4})").date("%d-%m-%Y").into(),
        ])
        .prepend(Field::TotalInclTaxes, vec![column(), line(1)])
        .prepend(Field::TaxableValue, vec![column(), line(2)])
        .prepend(Field::Cgst, vec![column(), line(3)])
        .prepend(Field::Sgst, vec![column(), line(4)])
        .prepend(Field::Igst, vec![column(), line(5)])
        .currency("INR")
        .build()
}

fn malaysia() -> FormatProfile {
    FormatProfile::builder(FormatTag::Malaysia)
        .keywords(&["MALAYSIA AIRLINES", "MALAYSIAN AIRLINE SYSTEM"])
        .currency("INR")
        .build()
}

fn akasa() -> FormatProfile {
    FormatProfile::builder(FormatTag::Akasa)
        .keywords(&["AKASA AIR", "SNV AVIATION"])
        .prepend(Field::Cgst, vec![labeled_amount(r"(?i:Central\s+Tax)").into()])
        .prepend(Field::Sgst, vec![labeled_amount(r"(?i:State\s+Tax)").into()])
        .prepend(Field::Igst, vec![labeled_amount(r"(?i:Integrated\s+Tax)").into()])
        .currency("INR")
        .build()
}

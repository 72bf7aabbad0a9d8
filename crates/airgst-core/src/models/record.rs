//! The fixed invoice record schema.
//!
//! Every record carries the same ordered set of string fields. An empty
//! string is the unresolved state; it survives serialization unchanged so
//! exported rows always have the same columns.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::format::FormatTag;

/// Airline label used for records of documents that failed extraction.
pub const ERROR_LABEL: &str = "ERROR";

/// Invoice record fields, in export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Airline,
    Gstin,
    CustomerGstin,
    Number,
    CustomerName,
    Date,
    Pnr,
    From,
    To,
    TaxableValue,
    Cgst,
    Sgst,
    Igst,
    Cess,
    Total,
    TotalInclTaxes,
    Currency,
}

impl Field {
    /// Number of fields in the schema.
    pub const COUNT: usize = 17;

    /// All fields in export order.
    pub const ALL: [Field; Field::COUNT] = [
        Field::Airline,
        Field::Gstin,
        Field::CustomerGstin,
        Field::Number,
        Field::CustomerName,
        Field::Date,
        Field::Pnr,
        Field::From,
        Field::To,
        Field::TaxableValue,
        Field::Cgst,
        Field::Sgst,
        Field::Igst,
        Field::Cess,
        Field::Total,
        Field::TotalInclTaxes,
        Field::Currency,
    ];

    /// Tax components, domestic pair first.
    pub const TAXES: [Field; 4] = [Field::Cgst, Field::Sgst, Field::Igst, Field::Cess];

    /// Column header used in exports.
    pub fn header(self) -> &'static str {
        match self {
            Field::Airline => "Airline",
            Field::Gstin => "GSTIN",
            Field::CustomerGstin => "GSTIN of Customer",
            Field::Number => "Number",
            Field::CustomerName => "GSTIN Customer Name",
            Field::Date => "Date",
            Field::Pnr => "PNR",
            Field::From => "From",
            Field::To => "To",
            Field::TaxableValue => "Taxable Value",
            Field::Cgst => "CGST",
            Field::Sgst => "SGST",
            Field::Igst => "IGST",
            Field::Cess => "CESS",
            Field::Total => "Total",
            Field::TotalInclTaxes => "Total(Incl Taxes)",
            Field::Currency => "Currency",
        }
    }

    /// Position in the schema.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Fields holding plain decimal amounts.
    pub fn is_amount(self) -> bool {
        matches!(
            self,
            Field::TaxableValue
                | Field::Cgst
                | Field::Sgst
                | Field::Igst
                | Field::Cess
                | Field::Total
                | Field::TotalInclTaxes
        )
    }

    /// Tax component fields.
    pub fn is_tax(self) -> bool {
        Field::TAXES.contains(&self)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// One extracted invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceRecord {
    values: [String; Field::COUNT],
    error: Option<String>,
}

impl InvoiceRecord {
    /// Create an empty record labeled with the given format.
    pub fn new(format: FormatTag) -> Self {
        let mut record = Self::default();
        record.set(Field::Airline, format.label());
        record
    }

    /// Create the record that stands in for a document that failed extraction.
    pub fn error(reason: impl Into<String>) -> Self {
        let mut record = Self::default();
        record.set(Field::Airline, ERROR_LABEL);
        record.error = Some(reason.into());
        record
    }

    pub fn get(&self, field: Field) -> &str {
        &self.values[field.index()]
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values[field.index()] = value.into();
    }

    pub fn clear(&mut self, field: Field) {
        self.values[field.index()].clear();
    }

    /// Whether the field holds a non-empty value.
    pub fn is_set(&self, field: Field) -> bool {
        !self.values[field.index()].is_empty()
    }

    /// Parse an amount field. Empty or malformed values yield `None`.
    pub fn amount(&self, field: Field) -> Option<Decimal> {
        let value = self.get(field);
        if value.is_empty() {
            return None;
        }
        Decimal::from_str(value).ok()
    }

    /// Sum of the tax components that are known. `None` when no tax is
    /// known or the sum overflows.
    pub fn tax_total(&self) -> Option<Decimal> {
        let known: Vec<Decimal> = Field::TAXES.iter().filter_map(|f| self.amount(*f)).collect();
        if known.is_empty() {
            return None;
        }
        known
            .into_iter()
            .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(value))
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Failure reason for error records.
    pub fn error_reason(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Fields with their values, in export order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        Field::ALL.iter().map(move |f| (*f, self.get(*f)))
    }

    /// Values in export order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Number of populated fields, not counting the airline label.
    pub fn populated_count(&self) -> usize {
        self.iter()
            .filter(|(f, v)| *f != Field::Airline && !v.is_empty())
            .count()
    }
}

impl Serialize for InvoiceRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = Field::COUNT + usize::from(self.error.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.header(), value)?;
        }
        if let Some(error) = &self.error {
            map.serialize_entry("Error", error)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for InvoiceRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut raw = HashMap::<String, String>::deserialize(deserializer)?;
        let mut record = InvoiceRecord::default();
        for field in Field::ALL {
            if let Some(value) = raw.remove(field.header()) {
                record.set(field, value);
            }
        }
        record.error = raw.remove("Error");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_record_is_empty_except_label() {
        let record = InvoiceRecord::new(FormatTag::AirIndia);
        assert_eq!(record.get(Field::Airline), "AIR INDIA");
        assert_eq!(record.populated_count(), 0);
        assert!(!record.is_error());
    }

    #[test]
    fn test_error_record() {
        let record = InvoiceRecord::error("no pages");
        assert_eq!(record.get(Field::Airline), ERROR_LABEL);
        assert_eq!(record.error_reason(), Some("no pages"));
        assert!(record.is_error());
    }

    #[test]
    fn test_amount_and_tax_total() {
        let mut record = InvoiceRecord::new(FormatTag::Indigo);
        record.set(Field::Cgst, "250.50");
        record.set(Field::Sgst, "250.50");
        record.set(Field::Igst, "garbage");
        assert_eq!(record.amount(Field::Cgst), Some(Decimal::from_str("250.50").unwrap()));
        assert_eq!(record.amount(Field::Igst), None);
        assert_eq!(record.amount(Field::TaxableValue), None);
        assert_eq!(record.tax_total(), Some(Decimal::from_str("501.00").unwrap()));

        record.set(Field::Cgst, Decimal::MAX.to_string());
        record.set(Field::Sgst, Decimal::MAX.to_string());
        assert_eq!(record.tax_total(), None);
    }

    #[test]
    fn test_serialize_keeps_order_and_empty_fields() {
        let mut record = InvoiceRecord::new(FormatTag::Qatar);
        record.set(Field::Pnr, "ABC123");
        let json = serde_json::to_string(&record).unwrap();

        assert!(json.starts_with("{\"Airline\":\"QATAR AIRWAYS\",\"GSTIN\":\"\""));
        assert!(json.contains("\"PNR\":\"ABC123\""));
        assert!(json.ends_with("\"Currency\":\"\"}"));
        assert!(!json.contains("Error"));

        let back: InvoiceRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_serialize_error_record() {
        let record = InvoiceRecord::error("timed out");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["Airline"], "ERROR");
        assert_eq!(value["Error"], "timed out");
    }

    #[test]
    fn test_field_order_matches_index() {
        for (i, field) in Field::ALL.iter().enumerate() {
            assert_eq!(field.index(), i);
        }
        assert!(Field::Igst.is_tax());
        assert!(!Field::TaxableValue.is_tax());
        assert!(Field::TotalInclTaxes.is_amount());
        assert!(!Field::Date.is_amount());
    }
}

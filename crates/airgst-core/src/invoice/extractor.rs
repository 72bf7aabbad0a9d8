//! The unified field extractor.

use std::str::FromStr;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::content::{NormalizedContent, NumericToken};
use crate::models::config::ExtractionConfig;
use crate::models::{Field, InvoiceRecord};

use super::profile::FormatProfile;
use super::rules::patterns::{CGST_KEYWORD, GSTIN_PATTERN, IGST_KEYWORD, SGST_KEYWORD, TAX_KEYWORD};
use super::rules::{clean_amount, within_tax_bounds, GstinExtractor, PatternRule};
use super::table::{column_lookup, row_label_lookup, row_text_lookup};

/// Where a candidate value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Column,
    Other,
}

/// Fills an [`InvoiceRecord`] by walking a profile's rules over normalized
/// content.
pub struct UnifiedExtractor {
    config: ExtractionConfig,
    gstin: GstinExtractor,
    tax_ceiling: Decimal,
}

impl UnifiedExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        let gstin = GstinExtractor::new()
            .with_validation(config.validate_gstin_checksum)
            .with_label_awareness(config.label_aware_gstin);
        let tax_ceiling = Decimal::from_f64(config.tax_ceiling).unwrap_or(Decimal::MAX);

        Self {
            config,
            gstin,
            tax_ceiling,
        }
    }

    /// Extract every field. Fields no rule matches stay empty.
    pub fn extract(&self, content: &NormalizedContent, profile: &FormatProfile) -> InvoiceRecord {
        let mut record = InvoiceRecord::new(profile.tag());

        let gstins = self.gstin.assign(&content.full_text);
        if let Some(issuer) = gstins.issuer {
            record.set(Field::Gstin, issuer);
        }
        if let Some(customer) = gstins.customer {
            record.set(Field::CustomerGstin, customer);
        }

        // Schema order puts the taxable value before the taxes that are
        // checked against it.
        for field in Field::ALL {
            if matches!(field, Field::Airline | Field::Gstin | Field::CustomerGstin) {
                continue;
            }
            match self.extract_field(content, profile, field, &record) {
                Some(value) => record.set(field, value),
                None => trace!(field = %field, "No rule matched"),
            }
        }

        self.numeric_fallback(content, &mut record);

        debug!(
            format = %profile.tag(),
            populated = record.populated_count(),
            "Extracted {} fields",
            record.populated_count()
        );
        record
    }

    fn extract_field(
        &self,
        content: &NormalizedContent,
        profile: &FormatProfile,
        field: Field,
        record: &InvoiceRecord,
    ) -> Option<String> {
        let taxable = record.amount(Field::TaxableValue);
        let accept = |source: Source| move |raw: &str| self.accept(field, raw, taxable, source);

        for (index, rule) in profile.rules(field).iter().enumerate() {
            let found = match rule {
                PatternRule::Text(rule) => rule
                    .candidates(&content.full_text)
                    .find_map(|c| accept(Source::Other)(c.as_str())),
                PatternRule::Column(locator) => column_lookup(
                    &content.tables,
                    locator,
                    field,
                    self.config.table_lookahead_rows,
                    accept(Source::Column),
                ),
                PatternRule::RowLabel(rule) => {
                    row_label_lookup(&content.tables, rule, accept(Source::Other))
                }
                PatternRule::RowText(rule) => {
                    row_text_lookup(&content.tables, rule, accept(Source::Other))
                }
            };

            if let Some(value) = found {
                debug!(field = %field, rule = rule.kind(), index, "Matched {:?}", value);
                return Some(value);
            }
        }
        None
    }

    /// Clean a candidate and check it against the field's constraints.
    ///
    /// Amounts must be plain numbers; zero is only taken for taxes read
    /// from a table column. Taxes must be below the taxable value, or the
    /// ceiling when that is unknown.
    fn accept(&self, field: Field, raw: &str, taxable: Option<Decimal>, source: Source) -> Option<String> {
        if !field.is_amount() {
            let value = raw.trim();
            return (!value.is_empty()).then(|| value.to_string());
        }

        let cleaned = clean_amount(raw)?;
        let value = Decimal::from_str(&cleaned).ok()?;

        if value.is_zero() && !(source == Source::Column && field.is_tax()) {
            return None;
        }
        if field.is_tax() && !within_tax_bounds(value, taxable, self.tax_ceiling) {
            trace!(field = %field, "Rejected implausible tax {}", cleaned);
            return None;
        }
        Some(cleaned)
    }

    /// Look for tax amounts among numbers on tax lines when no labeled rule
    /// found any of CGST, SGST or IGST.
    fn numeric_fallback(&self, content: &NormalizedContent, record: &mut InvoiceRecord) {
        let Some(taxable) = record.amount(Field::TaxableValue) else {
            return;
        };
        if [Field::Cgst, Field::Sgst, Field::Igst].iter().any(|f| record.is_set(*f)) {
            return;
        }
        let Some(high) = taxable.to_f64().map(|t| t * self.config.fallback_tax_ratio) else {
            return;
        };

        let candidates: Vec<&NumericToken> = content
            .numeric_index
            .between(0.0, high)
            .iter()
            .filter(|t| TAX_KEYWORD.is_match(&t.context))
            .filter(|t| !GSTIN_PATTERN.is_match(&t.context))
            .filter(|t| !t.context.contains(&format!("{}%", t.raw)))
            .collect();

        for (field, keyword) in [
            (Field::Cgst, &*CGST_KEYWORD),
            (Field::Sgst, &*SGST_KEYWORD),
            (Field::Igst, &*IGST_KEYWORD),
        ] {
            let nearest = candidates
                .iter()
                .filter(|t| keyword.is_match(&t.context))
                .min_by_key(|t| t.line_index);
            let Some(token) = nearest else {
                continue;
            };
            if let Some(value) = self.accept(field, &token.raw, Some(taxable), Source::Other) {
                debug!(field = %field, line = token.line_index, "Numeric fallback found {}", value);
                record.set(field, value);
            }
        }
    }
}

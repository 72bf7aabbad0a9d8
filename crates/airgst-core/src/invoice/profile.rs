//! Format profiles.
//!
//! A profile holds everything that differs between airline layouts: the
//! classifier keywords, the per-field rule lists and the reconciliation
//! quirks. The extractor and reconciler are the same for every format.

use crate::models::{Field, FormatTag};

use super::rules::library::base_rules;
use super::rules::PatternRule;

/// Reformat dates printed in a layout-specific style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRestyle {
    /// chrono formats tried in order. Ordinal day suffixes are stripped first.
    pub inputs: Vec<&'static str>,
}

/// Extraction parameters for one invoice format.
#[derive(Debug, Clone)]
pub struct FormatProfile {
    tag: FormatTag,
    keywords: Vec<&'static str>,
    rules: Vec<Vec<PatternRule>>,
    relabel: Option<Field>,
    date_restyle: Option<DateRestyle>,
    default_currency: Option<&'static str>,
}

impl FormatProfile {
    /// Start a profile from the base rule lists.
    pub fn builder(tag: FormatTag) -> FormatProfileBuilder {
        FormatProfileBuilder {
            profile: Self {
                tag,
                keywords: Vec::new(),
                rules: Field::ALL.iter().map(|f| base_rules(*f)).collect(),
                relabel: None,
                date_restyle: None,
                default_currency: None,
            },
        }
    }

    pub fn tag(&self) -> FormatTag {
        self.tag
    }

    /// Value written to the record's airline field.
    pub fn label(&self) -> &'static str {
        self.tag.label()
    }

    /// Uppercase keywords identifying this format.
    pub fn keywords(&self) -> &[&'static str] {
        &self.keywords
    }

    /// Whether uppercased document text carries any of the keywords.
    pub fn matches(&self, upper_text: &str) -> bool {
        self.keywords.iter().any(|k| upper_text.contains(k))
    }

    /// Rules for a field, in evaluation order.
    pub fn rules(&self, field: Field) -> &[PatternRule] {
        &self.rules[field.index()]
    }

    /// Domestic tax field whose lone value is really IGST.
    pub fn relabel(&self) -> Option<Field> {
        self.relabel
    }

    pub fn date_restyle(&self) -> Option<&DateRestyle> {
        self.date_restyle.as_ref()
    }

    /// Currency for records whose document names none.
    pub fn default_currency(&self) -> Option<&'static str> {
        self.default_currency
    }
}

/// Builder for [`FormatProfile`].
pub struct FormatProfileBuilder {
    profile: FormatProfile,
}

impl FormatProfileBuilder {
    pub fn keywords(mut self, keywords: &[&'static str]) -> Self {
        self.profile.keywords = keywords.to_vec();
        self
    }

    /// Replace the rules for a field.
    pub fn replace(mut self, field: Field, rules: Vec<PatternRule>) -> Self {
        self.profile.rules[field.index()] = rules;
        self
    }

    /// Put rules ahead of the existing ones for a field.
    pub fn prepend(mut self, field: Field, rules: Vec<PatternRule>) -> Self {
        let existing = std::mem::take(&mut self.profile.rules[field.index()]);
        self.profile.rules[field.index()] = rules.into_iter().chain(existing).collect();
        self
    }

    /// Put rules after the existing ones for a field.
    pub fn append(mut self, field: Field, rules: Vec<PatternRule>) -> Self {
        self.profile.rules[field.index()].extend(rules);
        self
    }

    /// Move a lone CGST or SGST value to IGST during reconciliation.
    pub fn relabel(mut self, field: Field) -> Self {
        debug_assert!(matches!(field, Field::Cgst | Field::Sgst));
        self.profile.relabel = Some(field);
        self
    }

    pub fn restyle_dates(mut self, inputs: &[&'static str]) -> Self {
        self.profile.date_restyle = Some(DateRestyle {
            inputs: inputs.to_vec(),
        });
        self
    }

    pub fn currency(mut self, currency: &'static str) -> Self {
        self.profile.default_currency = Some(currency);
        self
    }

    pub fn build(self) -> FormatProfile {
        self.profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_starts_from_base_rules() {
        let profile = FormatProfile::builder(FormatTag::Akasa).build();
        assert_eq!(profile.label(), "AKASA AIR");
        assert_eq!(profile.rules(Field::Igst).len(), base_rules(Field::Igst).len());
        assert!(profile.rules(Field::Gstin).is_empty());
        assert!(profile.relabel().is_none());
    }

    #[test]
    fn test_prepend_and_replace() {
        let profile = FormatProfile::builder(FormatTag::Oman)
            .prepend(Field::Pnr, vec![PatternRule::text(r"Ticket\s+(\d+)")])
            .replace(Field::Currency, vec![])
            .build();

        let pnr = profile.rules(Field::Pnr);
        assert_eq!(pnr.len(), base_rules(Field::Pnr).len() + 1);
        match &pnr[0] {
            PatternRule::Text(rule) => assert_eq!(rule.pattern().as_str(), r"Ticket\s+(\d+)"),
            other => panic!("unexpected rule {}", other.kind()),
        }
        assert!(profile.rules(Field::Currency).is_empty());
    }

    #[test]
    fn test_keywords_and_quirks() {
        let profile = FormatProfile::builder(FormatTag::SriLankan)
            .keywords(&["SRILANKAN"])
            .relabel(Field::Sgst)
            .restyle_dates(&["%m/%d/%Y"])
            .currency("INR")
            .build();
        assert!(profile.matches("SRILANKAN AIRLINES LTD"));
        assert!(!profile.matches("srilankan airlines"));
        assert_eq!(profile.relabel(), Some(Field::Sgst));
        assert_eq!(profile.date_restyle().unwrap().inputs, vec!["%m/%d/%Y"]);
        assert_eq!(profile.default_currency(), Some("INR"));
    }
}

//! Declarative field rules for airline GST invoices.
//!
//! Every field has an ordered list of [`PatternRule`]s. The extractor walks
//! the list and the first rule that yields an accepted value wins, except
//! that priority rows inside a table may overwrite an earlier table value.

pub mod amounts;
pub mod dates;
pub mod gstin;
pub mod library;
pub mod patterns;

pub use amounts::{amounts_agree, clean_amount, format_amount, within_tax_bounds};
pub use dates::{parse_date, restyle_date, CANONICAL_DATE_FORMAT};
pub use gstin::{is_valid_gstin, validate_gstin_checksum, GstinAssignment, GstinExtractor, GstinMatch};

use std::sync::Arc;

use regex::Regex;

use crate::models::Field;
use crate::pdf::Cell;
use patterns::{builtin, WHITESPACE};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// One way of finding a field value.
#[derive(Debug, Clone)]
pub enum PatternRule {
    /// Regex over the full document text.
    Text(TextRule),
    /// Column under a recognized table header.
    Column(Arc<TableLocator>),
    /// Amount in the cells following a labeled cell.
    RowLabel(RowLabelRule),
    /// Regex over each table row's joined text.
    RowText(TextRule),
}

impl PatternRule {
    pub fn text(pattern: &str) -> Self {
        Self::Text(TextRule::new(pattern))
    }

    pub fn row_label(label: &str) -> Self {
        Self::RowLabel(RowLabelRule::new(label))
    }

    pub fn row_text(pattern: &str) -> Self {
        Self::RowText(TextRule::new(pattern))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Column(_) => "column",
            Self::RowLabel(_) => "row-label",
            Self::RowText(_) => "row-text",
        }
    }
}

impl From<TextRule> for PatternRule {
    fn from(rule: TextRule) -> Self {
        Self::Text(rule)
    }
}

impl From<RowLabelRule> for PatternRule {
    fn from(rule: RowLabelRule) -> Self {
        Self::RowLabel(rule)
    }
}

impl From<Arc<TableLocator>> for PatternRule {
    fn from(locator: Arc<TableLocator>) -> Self {
        Self::Column(locator)
    }
}

/// A regex whose capture group holds the value.
#[derive(Debug, Clone)]
pub struct TextRule {
    pattern: Regex,
    group: usize,
    date_format: Option<&'static str>,
    truncate_at: Option<Regex>,
}

impl TextRule {
    /// Create a rule from a built-in pattern.
    ///
    /// # Panics
    /// If `pattern` is not a valid regex. Compile patterns that come from
    /// outside the library first and use [`TextRule::from_regex`].
    pub fn new(pattern: &str) -> Self {
        Self::from_regex(builtin(pattern))
    }

    pub fn from_regex(pattern: Regex) -> Self {
        Self {
            pattern,
            group: 1,
            date_format: None,
            truncate_at: None,
        }
    }

    /// Take the value from capture group `group` instead of the first.
    pub fn group(mut self, group: usize) -> Self {
        self.group = group;
        self
    }

    /// Accept only values that parse with the given chrono format.
    pub fn date(mut self, format: &'static str) -> Self {
        self.date_format = Some(format);
        self
    }

    /// Cut the value at the first match of `pattern`.
    pub fn truncate(mut self, pattern: &str) -> Self {
        self.truncate_at = Some(builtin(pattern));
        self
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Cleaned values of every match in document order.
    pub fn candidates<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        self.pattern
            .captures_iter(text)
            .filter_map(move |caps| self.clean(caps.get(self.group)?.as_str()))
    }

    fn clean(&self, raw: &str) -> Option<String> {
        let mut value = raw;
        if let Some(m) = self.truncate_at.as_ref().and_then(|t| t.find(value)) {
            value = &value[..m.start()];
        }

        let value = WHITESPACE.replace_all(value.trim(), " ").into_owned();
        if value.is_empty() {
            return None;
        }

        match self.date_format {
            Some(format) if !dates::matches_format(&value, format) => None,
            _ => Some(value),
        }
    }
}

/// Maps header cells onto fields.
#[derive(Debug, Clone)]
pub struct ColumnMatch {
    fields: Vec<Field>,
    all_of: Vec<&'static str>,
    none_of: Vec<&'static str>,
    offset: usize,
}

impl ColumnMatch {
    /// Header cells containing every keyword (lowercase) belong to `fields`.
    ///
    /// An empty `fields` list claims the column without extracting from it.
    pub fn new(fields: &[Field], all_of: &[&'static str]) -> Self {
        Self {
            fields: fields.to_vec(),
            all_of: all_of.to_vec(),
            none_of: Vec::new(),
            offset: 0,
        }
    }

    pub fn excluding(mut self, none_of: &[&'static str]) -> Self {
        self.none_of = none_of.to_vec();
        self
    }

    /// Read values this many columns right of the header cell.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    fn matches(&self, cell: &str) -> bool {
        self.all_of.iter().all(|k| cell.contains(k)) && !self.none_of.iter().any(|k| cell.contains(k))
    }
}

/// Locates a table by its header row and maps its columns to fields.
#[derive(Debug, Clone)]
pub struct TableLocator {
    header: Vec<&'static str>,
    skip_markers: Vec<&'static str>,
    priority_marker: Vec<&'static str>,
    columns: Vec<ColumnMatch>,
}

impl TableLocator {
    /// A header row is one whose lowercased text contains every keyword.
    pub fn new(header: &[&'static str]) -> Self {
        Self {
            header: header.to_vec(),
            skip_markers: Vec::new(),
            priority_marker: vec!["grand", "total"],
            columns: Vec::new(),
        }
    }

    /// Rows containing any of these (case-sensitive) are sub-headers.
    pub fn skip(mut self, markers: &[&'static str]) -> Self {
        self.skip_markers = markers.to_vec();
        self
    }

    /// Rows containing every keyword (lowercase) overwrite earlier values.
    pub fn priority(mut self, marker: &[&'static str]) -> Self {
        self.priority_marker = marker.to_vec();
        self
    }

    /// Add a column mapping. Earlier mappings take precedence.
    pub fn column(mut self, column: ColumnMatch) -> Self {
        self.columns.push(column);
        self
    }

    pub fn is_header(&self, row_text: &str) -> bool {
        let lower = row_text.to_lowercase();
        self.header.iter().all(|k| lower.contains(k))
    }

    pub fn is_skipped(&self, row_text: &str) -> bool {
        self.skip_markers.iter().any(|m| row_text.contains(m))
    }

    pub fn is_priority(&self, row_text: &str) -> bool {
        let lower = row_text.to_lowercase();
        !self.priority_marker.is_empty() && self.priority_marker.iter().all(|k| lower.contains(k))
    }

    /// Column index holding `field` for the given header row.
    ///
    /// Each header cell is claimed by the first matching [`ColumnMatch`];
    /// when several cells map to the same field, the rightmost wins.
    pub fn column_for(&self, header: &[Cell], field: Field) -> Option<usize> {
        let mut found = None;
        for (j, cell) in header.iter().enumerate() {
            let Some(text) = cell else {
                continue;
            };
            let text = text.replace('\n', " ").to_lowercase();
            if let Some(column) = self.columns.iter().find(|c| c.matches(&text)) {
                if column.fields.contains(&field) {
                    found = Some(j + column.offset);
                }
            }
        }
        found
    }
}

/// Which numeric cell after the label holds the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellPick {
    /// First acceptable amount to the right of the label.
    #[default]
    First,
    /// Last acceptable amount in the row; skips rate columns.
    Last,
}

/// Finds a labeled row cell and reads the amount next to it.
#[derive(Debug, Clone)]
pub struct RowLabelRule {
    label: Regex,
    pick: CellPick,
}

impl RowLabelRule {
    pub fn new(label: &str) -> Self {
        Self {
            label: builtin(label),
            pick: CellPick::First,
        }
    }

    pub fn last(mut self) -> Self {
        self.pick = CellPick::Last;
        self
    }

    pub fn label(&self) -> &Regex {
        &self.label
    }

    pub fn pick(&self) -> CellPick {
        self.pick
    }
}

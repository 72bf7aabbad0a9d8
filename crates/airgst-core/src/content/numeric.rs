//! Index of every numeric token in a document.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NUMBER_TOKEN: Regex = Regex::new(r"\d[\d,]*(?:\.\d+)?").unwrap();
}

/// A number found in the text, with the lines around it.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericToken {
    /// Parsed value, thousands separators removed.
    pub value: f64,
    /// Text as it appeared.
    pub raw: String,
    /// Line the token was found on.
    pub line_index: usize,
    /// The full line.
    pub context: String,
    /// The previous line, empty on the first line.
    pub prev_context: String,
    /// The next line, empty on the last line.
    pub next_context: String,
}

/// Numeric tokens sorted ascending by value. Ties keep document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericIndex {
    tokens: Vec<NumericToken>,
}

impl NumericIndex {
    /// Index all numeric tokens in the given lines.
    pub fn build(lines: &[String]) -> Self {
        let mut tokens = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            for m in NUMBER_TOKEN.find_iter(line) {
                let raw = m.as_str().trim_end_matches(',');
                let Ok(value) = raw.replace(',', "").parse::<f64>() else {
                    continue;
                };
                tokens.push(NumericToken {
                    value,
                    raw: raw.to_string(),
                    line_index: i,
                    context: line.clone(),
                    prev_context: i.checked_sub(1).map(|p| lines[p].clone()).unwrap_or_default(),
                    next_context: lines.get(i + 1).cloned().unwrap_or_default(),
                });
            }
        }

        tokens.sort_by(|a, b| a.value.total_cmp(&b.value));
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NumericToken> {
        self.tokens.iter()
    }

    /// Tokens with `low < value < high`.
    pub fn between(&self, low: f64, high: f64) -> &[NumericToken] {
        let start = self.tokens.partition_point(|t| t.value <= low);
        let end = self.tokens.partition_point(|t| t.value < high);
        if start >= end {
            return &[];
        }
        &self.tokens[start..end]
    }
}

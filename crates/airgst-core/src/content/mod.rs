//! Normalized document content.
//!
//! Built once per document from its pages and read-only afterwards:
//! - `full_text`: all page text, newline-joined
//! - `lines`: `full_text` split on newlines
//! - `tables`: every table in page order
//! - `numeric_index`: numbers with their surrounding lines, sorted by value

mod numeric;

pub use numeric::{NumericIndex, NumericToken};

use tracing::{debug, warn};

use crate::error::{ExtractionError, PdfError};
use crate::pdf::{PageContent, PageSource, Table};

/// Document content in the form the extractor works on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedContent {
    pub full_text: String,
    pub lines: Vec<String>,
    pub tables: Vec<Table>,
    pub numeric_index: NumericIndex,
}

impl NormalizedContent {
    /// Build from already-extracted pages.
    pub fn from_pages(pages: &[PageContent]) -> Self {
        let texts: Vec<&str> = pages.iter().map(|p| p.text.as_str()).collect();
        let tables = pages.iter().flat_map(|p| p.tables.iter().cloned()).collect();
        Self::build(&texts, tables)
    }

    /// Build from plain text with no tables.
    pub fn from_text(text: &str) -> Self {
        Self::build(&[text], Vec::new())
    }

    fn build(texts: &[&str], tables: Vec<Table>) -> Self {
        let full_text = texts
            .iter()
            .map(|t| normalize_text(t))
            .collect::<Vec<_>>()
            .join("\n");
        let lines: Vec<String> = full_text.split('\n').map(str::to_string).collect();
        let numeric_index = NumericIndex::build(&lines);

        Self {
            full_text,
            lines,
            tables,
            numeric_index,
        }
    }

    /// No text and no tables.
    pub fn is_empty(&self) -> bool {
        self.full_text.trim().is_empty() && self.tables.is_empty()
    }
}

fn normalize_text(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\u{00a0}', " ")
}

/// Read every page of a document into normalized content.
///
/// A page whose text or tables cannot be read contributes nothing for that
/// part. The document fails only when it has no pages or no page could be
/// read at all. `max_pages` of 0 reads every page.
pub fn preprocess(
    source: &dyn PageSource,
    max_pages: usize,
) -> Result<NormalizedContent, ExtractionError> {
    let page_count = source.page_count();
    if page_count == 0 {
        return Err(ExtractionError::Unreadable(PdfError::NoPages));
    }

    let limit = if max_pages == 0 {
        page_count
    } else {
        page_count.min(max_pages as u32)
    };

    let mut pages = Vec::with_capacity(limit as usize);
    let mut unreadable = 0;

    for number in 1..=limit {
        let text = source.page_text(number).map_err(|e| {
            warn!(page = number, "Skipping page text: {}", e);
        });
        let tables = source.page_tables(number).map_err(|e| {
            warn!(page = number, "Skipping page tables: {}", e);
        });

        if text.is_err() && tables.is_err() {
            unreadable += 1;
        }

        pages.push(PageContent {
            number,
            text: text.unwrap_or_default(),
            tables: tables.unwrap_or_default(),
        });
    }

    if unreadable == limit {
        return Err(ExtractionError::NoReadablePages { pages: limit });
    }

    let content = NormalizedContent::from_pages(&pages);
    debug!(
        "Preprocessed {} pages: {} lines, {} tables, {} numeric tokens",
        limit,
        content.lines.len(),
        content.tables.len(),
        content.numeric_index.len()
    );
    Ok(content)
}

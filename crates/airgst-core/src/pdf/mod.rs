//! PDF processing module.
//!
//! Documents are read page by page through [`PageSource`]. Each page yields
//! best-effort text and the tables found from its ruling lines; a failure on
//! one page never prevents reading the others.

mod extractor;
pub mod graphics;
pub mod lattice;

pub use extractor::PdfExtractor;
#[cfg(test)]
pub(crate) use extractor::tests::sample_invoice_pdf;
pub use lattice::LatticeSettings;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// A table cell. `None` marks a grid position covered by a merged cell.
pub type Cell = Option<String>;

/// A table row.
pub type Row = Vec<Cell>;

/// A table found on a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Page number (1-indexed).
    pub page: u32,
    /// Rows, top to bottom.
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(page: u32, rows: Vec<Row>) -> Self {
        Self { page, rows }
    }

    /// Build a table from plain strings; empty strings become empty cells.
    pub fn from_strings(page: u32, rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|c| Some((*c).to_string())).collect())
            .collect();
        Self { page, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell text, if the cell exists and is not a merged placeholder.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }

    /// Non-empty cells of a row joined with single spaces.
    pub fn row_text(&self, row: usize) -> String {
        self.rows
            .get(row)
            .map(|cells| {
                cells
                    .iter()
                    .flatten()
                    .map(|c| c.trim())
                    .filter(|c| !c.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default()
    }
}

/// Content of one page as produced by a page source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContent {
    /// Page number (1-indexed).
    pub number: u32,
    /// Extracted text.
    pub text: String,
    /// Tables found on the page.
    pub tables: Vec<Table>,
}

impl PageContent {
    pub fn new(number: u32, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
            tables: Vec::new(),
        }
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }
}

/// Page-level access to a document.
pub trait PageSource {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Extract text from a specific page (1-indexed).
    fn page_text(&self, page: u32) -> Result<String>;

    /// Find tables on a specific page (1-indexed).
    fn page_tables(&self, page: u32) -> Result<Vec<Table>>;
}

/// Pages whose content was produced by an external extractor.
#[derive(Debug, Clone, Default)]
pub struct PreparedPages {
    pages: Vec<PageContent>,
}

impl PreparedPages {
    pub fn new(pages: Vec<PageContent>) -> Self {
        Self { pages }
    }

    fn page(&self, page: u32) -> Result<&PageContent> {
        (page as usize)
            .checked_sub(1)
            .and_then(|i| self.pages.get(i))
            .ok_or(PdfError::InvalidPage(page))
    }
}

impl PageSource for PreparedPages {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_text(&self, page: u32) -> Result<String> {
        Ok(self.page(page)?.text.clone())
    }

    fn page_tables(&self, page: u32) -> Result<Vec<Table>> {
        Ok(self.page(page)?.tables.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_text_skips_empty_and_merged_cells() {
        let table = Table::new(
            1,
            vec![vec![
                Some(" Taxable ".to_string()),
                None,
                Some(String::new()),
                Some("IGST".to_string()),
            ]],
        );
        assert_eq!(table.row_text(0), "Taxable IGST");
        assert_eq!(table.row_text(5), "");
        assert_eq!(table.cell(0, 1), None);
        assert_eq!(table.cell(0, 3), Some("IGST"));
    }

    #[test]
    fn test_prepared_pages() {
        let pages = PreparedPages::new(vec![
            PageContent::new(1, "first"),
            PageContent::new(2, "second").with_table(Table::from_strings(2, &[&["a", "b"]])),
        ]);
        assert_eq!(pages.page_count(), 2);
        assert_eq!(pages.page_text(2).unwrap(), "second");
        assert_eq!(pages.page_tables(2).unwrap().len(), 1);
        assert!(matches!(pages.page_text(0), Err(PdfError::InvalidPage(0))));
        assert!(matches!(pages.page_text(3), Err(PdfError::InvalidPage(3))));
    }
}

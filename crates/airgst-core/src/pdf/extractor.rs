//! PDF page text and table extraction using lopdf and pdf-extract.

use std::panic::{self, AssertUnwindSafe};

use lopdf::content::Content;
use lopdf::{Document, ObjectId};
use tracing::{debug, warn};

use super::lattice::{self, LatticeSettings};
use super::{graphics, PageSource, Result, Table};
use crate::error::PdfError;

/// PDF page reader.
///
/// Text comes from pdf-extract's layout-aware extraction when it succeeds for
/// the whole document, with lopdf's per-page extraction as the fallback.
/// Tables come from the ruling lines in each page's content stream.
pub struct PdfExtractor {
    document: Option<Document>,
    page_texts: Vec<String>,
    settings: LatticeSettings,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            page_texts: Vec::new(),
            settings: LatticeSettings::default(),
        }
    }

    /// Set the table finder tolerances.
    pub fn with_settings(mut self, settings: LatticeSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Load a PDF from bytes.
    pub fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        let raw_data = if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        self.page_texts = layout_text_by_pages(&raw_data);
        debug!(
            "Loaded PDF with {} pages ({} pages of layout text)",
            page_count,
            self.page_texts.len()
        );
        self.document = Some(doc);
        Ok(())
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or(PdfError::Parse("No document loaded".to_string()))
    }

    fn page_id(&self, page: u32) -> Result<ObjectId> {
        self.document()?
            .get_pages()
            .get(&page)
            .copied()
            .ok_or(PdfError::InvalidPage(page))
    }
}

/// pdf-extract panics on some malformed fonts; treat that like an error.
fn layout_text_by_pages(data: &[u8]) -> Vec<String> {
    match panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(data)
    })) {
        Ok(Ok(pages)) => pages,
        Ok(Err(e)) => {
            warn!("Layout text extraction failed, using per-page fallback: {}", e);
            Vec::new()
        }
        Err(_) => {
            warn!("Layout text extraction panicked, using per-page fallback");
            Vec::new()
        }
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSource for PdfExtractor {
    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn page_text(&self, page: u32) -> Result<String> {
        self.page_id(page)?;

        if let Some(text) = self.page_texts.get(page as usize - 1) {
            return Ok(text.clone());
        }

        self.document()?
            .extract_text(&[page])
            .map_err(|e| PdfError::PageRead {
                page,
                reason: e.to_string(),
            })
    }

    fn page_tables(&self, page: u32) -> Result<Vec<Table>> {
        let page_id = self.page_id(page)?;
        let read_error = |e: lopdf::Error| PdfError::PageRead {
            page,
            reason: e.to_string(),
        };

        let bytes = self.document()?.get_page_content(page_id).map_err(read_error)?;
        let content = Content::decode(&bytes).map_err(read_error)?;
        let page_graphics = graphics::interpret(&content.operations);

        let tables: Vec<Table> = lattice::find_tables(&page_graphics, &self.settings)
            .into_iter()
            .map(|rows| Table::new(page, rows))
            .collect();

        debug!("Found {} tables on page {}", tables.len(), page);
        Ok(tables)
    }
}

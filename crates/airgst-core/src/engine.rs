//! The extraction engine: PDF bytes in, reconciled record out.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::content::{preprocess, NormalizedContent};
use crate::error::ExtractionError;
use crate::invoice::{classify, profile, Result, Reconciler, UnifiedExtractor};
use crate::models::{FormatHint, FormatTag, GstConfig, InvoiceRecord};
use crate::pdf::{LatticeSettings, PageContent, PageSource, PdfExtractor, PreparedPages};

/// Result of extracting one document.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Reconciled record.
    pub record: InvoiceRecord,
    /// Format the record was extracted with.
    pub format: FormatTag,
    /// Reconciliation notes and other non-fatal problems.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// A document handed to the engine.
#[derive(Debug, Clone)]
pub enum DocumentInput {
    /// Raw PDF bytes.
    Bytes(Vec<u8>),
    /// Pages already read by another extractor.
    Pages(Vec<PageContent>),
}

/// Runs the preprocess, classify, extract and reconcile pipeline.
pub struct InvoiceEngine {
    config: GstConfig,
    extractor: UnifiedExtractor,
    reconciler: Reconciler,
}

impl InvoiceEngine {
    pub fn new(config: GstConfig) -> Self {
        let extractor = UnifiedExtractor::new(config.extraction.clone());
        let reconciler = Reconciler::new(config.extraction.default_currency.clone());
        Self {
            config,
            extractor,
            reconciler,
        }
    }

    pub fn config(&self) -> &GstConfig {
        &self.config
    }

    /// Extract a record from PDF bytes.
    pub fn extract(&self, data: &[u8], hint: &FormatHint) -> Result<InvoiceRecord> {
        self.extract_detailed(data, hint).map(|result| result.record)
    }

    /// Extract from PDF bytes, keeping the format and warnings.
    pub fn extract_detailed(&self, data: &[u8], hint: &FormatHint) -> Result<ExtractionResult> {
        guarded(|| {
            let mut pdf = PdfExtractor::new().with_settings(LatticeSettings::from(&self.config.pdf));
            pdf.load(data)?;
            self.extract_pages(&pdf, hint)
        })
    }

    /// Extract from any page source.
    pub fn extract_pages(&self, source: &dyn PageSource, hint: &FormatHint) -> Result<ExtractionResult> {
        let content = preprocess(source, self.config.pdf.max_pages)?;
        Ok(self.extract_content(&content, hint))
    }

    /// Extract from either kind of document input.
    pub fn extract_input(&self, input: &DocumentInput, hint: &FormatHint) -> Result<ExtractionResult> {
        match input {
            DocumentInput::Bytes(data) => self.extract_detailed(data, hint),
            DocumentInput::Pages(pages) => {
                let source = PreparedPages::new(pages.clone());
                guarded(|| self.extract_pages(&source, hint))
            }
        }
    }

    /// Run classification, extraction and reconciliation on prepared content.
    ///
    /// Never fails: content with no recognizable fields yields a record with
    /// only the airline label set.
    pub fn extract_content(&self, content: &NormalizedContent, hint: &FormatHint) -> ExtractionResult {
        let start = Instant::now();

        let format = match hint {
            FormatHint::Auto => classify(&content.full_text),
            FormatHint::Fixed(tag) => *tag,
        };
        let profile = profile(format);
        debug!("Using {} profile", format);

        let mut record = self.extractor.extract(content, profile);
        let mut warnings: Vec<String> = self
            .reconciler
            .reconcile_in_place(&mut record, profile)
            .iter()
            .map(ToString::to_string)
            .collect();
        if content.is_empty() {
            warnings.push("document has no text or tables".to_string());
        }

        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            format = %format,
            fields = record.populated_count(),
            "Extracted invoice in {}ms",
            processing_time_ms
        );

        ExtractionResult {
            record,
            format,
            warnings,
            processing_time_ms,
        }
    }

    /// Extract a record, turning any failure into an error record.
    pub fn extract_or_error(&self, data: &[u8], hint: &FormatHint) -> InvoiceRecord {
        match self.extract(data, hint) {
            Ok(record) => record,
            Err(e) => {
                warn!("Extraction failed: {}", e);
                InvoiceRecord::error(e.to_string())
            }
        }
    }
}

impl Default for InvoiceEngine {
    fn default() -> Self {
        Self::new(GstConfig::default())
    }
}

/// Run `f`, reporting a panic from a third-party parser as an error.
fn guarded<T>(f: impl FnOnce() -> Result<T>) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(ExtractionError::Panicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

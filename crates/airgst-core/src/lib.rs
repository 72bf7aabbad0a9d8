//! Core library for airline GST invoice extraction.
//!
//! This crate provides:
//! - PDF reading (page text and ruled tables)
//! - Content normalization with a numeric index for fallback lookups
//! - Format detection for ten airline invoice layouts
//! - Profile-driven field extraction and tax reconciliation
//! - A fixed-schema invoice record for CSV/JSON export

pub mod batch;
pub mod content;
pub mod engine;
pub mod error;
pub mod invoice;
pub mod models;
pub mod pdf;

pub use batch::{process_batch, BatchEntry, BatchInput, BatchProgress, DocumentStatus};
pub use content::{preprocess, NormalizedContent};
pub use engine::{DocumentInput, ExtractionResult, InvoiceEngine};
pub use error::{ExtractionError, GstError, PdfError, Result};
pub use invoice::{classify, FormatProfile, ReconciliationInconsistency, Reconciler, UnifiedExtractor};
pub use models::{Field, FormatHint, FormatTag, GstConfig, InvoiceRecord, ERROR_LABEL};
pub use pdf::{PageContent, PageSource, PdfExtractor, PreparedPages, Table};

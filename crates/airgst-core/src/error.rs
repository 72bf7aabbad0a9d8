//! Error types for the airgst-core library.

use thiserror::Error;

/// Main error type for the airgst library.
#[derive(Error, Debug)]
pub enum GstError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Invoice extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// A single page could not be read. Recoverable: the page is skipped.
    #[error("failed to read page {page}: {reason}")]
    PageRead { page: u32, reason: String },

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Whole-document extraction failures.
///
/// Any of these turns into an error record in batch mode; none of them
/// aborts the batch.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The document could not be opened at all.
    #[error("unreadable document: {0}")]
    Unreadable(#[from] PdfError),

    /// Every page failed to yield text or tables.
    #[error("no readable pages ({pages} attempted)")]
    NoReadablePages { pages: u32 },

    /// The per-document time budget was exceeded.
    #[error("extraction timed out after {0}s")]
    Timeout(u64),

    /// A third-party parser panicked while reading the document.
    #[error("extraction aborted: {0}")]
    Panicked(String),

    /// An explicit format tag did not name a known format.
    #[error("unknown format: {0}")]
    UnknownFormat(String),
}

/// Result type for the airgst library.
pub type Result<T> = std::result::Result<T, GstError>;

//! Data models: invoice records, format tags and configuration.

pub mod config;
pub mod format;
pub mod record;

pub use config::GstConfig;
pub use format::{FormatHint, FormatTag};
pub use record::{Field, InvoiceRecord, ERROR_LABEL};

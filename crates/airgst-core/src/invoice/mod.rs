//! Invoice field extraction module.
//!
//! Format detection, the per-format profiles, the unified extractor and the
//! reconciler that completes its output.

pub mod classifier;
pub mod extractor;
pub mod formats;
pub mod profile;
pub mod reconcile;
pub mod rules;
pub mod table;

pub use classifier::{classify, DEFAULT_FORMAT, DETECTION_ORDER};
pub use extractor::UnifiedExtractor;
pub use formats::profile;
pub use profile::{DateRestyle, FormatProfile, FormatProfileBuilder};
pub use reconcile::{ReconciliationInconsistency, Reconciler};

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

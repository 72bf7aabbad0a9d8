//! Format detection from document text.

use tracing::debug;

use super::formats::profile;
use crate::models::FormatTag;

/// Formats in detection order, most specific first.
///
/// Air India Express must be tried before Air India, whose keywords it
/// contains.
pub const DETECTION_ORDER: [FormatTag; 10] = [
    FormatTag::Turkish,
    FormatTag::SriLankan,
    FormatTag::Qatar,
    FormatTag::Oman,
    FormatTag::Kuwait,
    FormatTag::Malaysia,
    FormatTag::Akasa,
    FormatTag::AirIndiaExpress,
    FormatTag::AirIndia,
    FormatTag::Indigo,
];

/// Format used when no keyword matches.
pub const DEFAULT_FORMAT: FormatTag = FormatTag::Indigo;

/// Detect the invoice format from its text. Never fails.
pub fn classify(text: &str) -> FormatTag {
    let upper = text.to_uppercase();
    let tag = DETECTION_ORDER
        .iter()
        .copied()
        .find(|tag| profile(*tag).matches(&upper))
        .unwrap_or(DEFAULT_FORMAT);
    debug!("Classified document as {}", tag);
    tag
}

//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

/// Main configuration for the airgst pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GstConfig {
    /// PDF reading and table detection.
    pub pdf: PdfConfig,

    /// Field extraction and reconciliation.
    pub extraction: ExtractionConfig,

    /// Batch processing.
    pub batch: BatchConfig,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Ruling lines closer than this are snapped onto one coordinate.
    pub snap_tolerance: f32,

    /// Collinear segments separated by less than this are joined.
    pub join_tolerance: f32,

    /// Slack allowed when testing whether two ruling lines cross.
    pub intersection_tolerance: f32,

    /// Ruling lines shorter than this are ignored.
    pub edge_min_length: f32,

    /// Maximum pages to process (0 = unlimited).
    pub max_pages: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            snap_tolerance: 3.0,
            join_tolerance: 3.0,
            intersection_tolerance: 3.0,
            edge_min_length: 3.0,
            max_pages: 0,
        }
    }
}

/// Invoice extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Rows scanned below a located table header.
    pub table_lookahead_rows: usize,

    /// Upper bound for a tax amount when the taxable value is unknown.
    pub tax_ceiling: f64,

    /// Fallback tax lookup only accepts values below taxable times this ratio.
    pub fallback_tax_ratio: f64,

    /// Require GSTINs to pass the mod-36 check character test.
    pub validate_gstin_checksum: bool,

    /// Prefer GSTINs next to a customer label for the customer field.
    pub label_aware_gstin: bool,

    /// Currency used when amounts are present but no currency is printed.
    pub default_currency: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            table_lookahead_rows: 10,
            tax_ceiling: 100_000.0,
            fallback_tax_ratio: 0.5,
            validate_gstin_checksum: false,
            label_aware_gstin: true,
            default_currency: "INR".to_string(),
        }
    }
}

/// Batch processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Documents processed concurrently.
    pub jobs: usize,

    /// Per-document time budget in seconds (0 = unlimited).
    pub document_timeout_secs: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            jobs: 4,
            document_timeout_secs: 120,
        }
    }
}

impl GstConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

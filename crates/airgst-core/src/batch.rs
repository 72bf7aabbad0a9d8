//! Batch extraction with progress reporting.

use serde::Serialize;
use tracing::{info, warn};

use crate::engine::{DocumentInput, InvoiceEngine};
use crate::models::{FormatHint, InvoiceRecord};

/// One named document in a batch.
#[derive(Debug, Clone)]
pub struct BatchInput {
    pub name: String,
    pub source: DocumentInput,
}

impl BatchInput {
    pub fn new(name: impl Into<String>, source: DocumentInput) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }
}

/// One finalized record of a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub name: String,
    pub record: InvoiceRecord,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// State of the most recently finalized document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pending,
    Extracted,
    Failed,
}

/// Progress through a batch. Advances once per finalized record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchProgress {
    pub current: usize,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub status: DocumentStatus,
    pub message: String,
}

impl BatchProgress {
    pub fn new(total: usize) -> Self {
        Self {
            current: 0,
            total,
            succeeded: 0,
            failed: 0,
            status: DocumentStatus::Pending,
            message: String::new(),
        }
    }

    /// Record a finalized document.
    pub fn advance(&mut self, name: &str, record: &InvoiceRecord) {
        self.current += 1;
        if let Some(reason) = record.error_reason() {
            self.failed += 1;
            self.status = DocumentStatus::Failed;
            self.message = format!("{name}: {reason}");
        } else {
            self.succeeded += 1;
            self.status = DocumentStatus::Extracted;
            self.message = name.to_string();
        }
    }

    pub fn is_complete(&self) -> bool {
        self.current >= self.total
    }

    /// Fraction done, in `0.0..=1.0`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.current as f64 / self.total as f64
        }
    }
}

/// Extract every input in order.
///
/// A document that fails becomes an error record in its place; the batch
/// always yields one entry per input. `on_progress` sees the progress after
/// each document is finalized.
pub fn process_batch<F>(
    engine: &InvoiceEngine,
    inputs: &[BatchInput],
    hint: &FormatHint,
    mut on_progress: F,
) -> Vec<BatchEntry>
where
    F: FnMut(&BatchProgress),
{
    let mut progress = BatchProgress::new(inputs.len());
    let mut entries = Vec::with_capacity(inputs.len());

    for input in inputs {
        let entry = match engine.extract_input(&input.source, hint) {
            Ok(result) => BatchEntry {
                name: input.name.clone(),
                record: result.record,
                warnings: result.warnings,
            },
            Err(e) => {
                warn!(document = %input.name, "Extraction failed: {}", e);
                BatchEntry {
                    name: input.name.clone(),
                    record: InvoiceRecord::error(e.to_string()),
                    warnings: Vec::new(),
                }
            }
        };

        progress.advance(&entry.name, &entry.record);
        on_progress(&progress);
        entries.push(entry);
    }

    info!(
        "Batch finished: {} extracted, {} failed",
        progress.succeeded, progress.failed
    );
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Field;
    use crate::pdf::PageContent;
    use pretty_assertions::assert_eq;

    fn pages(text: &str) -> DocumentInput {
        DocumentInput::Pages(vec![PageContent::new(1, text)])
    }

    #[test]
    fn test_progress_advance() {
        let mut progress = BatchProgress::new(2);
        assert_eq!(progress.fraction(), 0.0);

        progress.advance("a.pdf", &InvoiceRecord::default());
        assert_eq!(progress.status, DocumentStatus::Extracted);
        assert_eq!(progress.message, "a.pdf");
        assert!(!progress.is_complete());

        progress.advance("b.pdf", &InvoiceRecord::error("broken"));
        assert_eq!(progress.status, DocumentStatus::Failed);
        assert_eq!(progress.message, "b.pdf: broken");
        assert_eq!((progress.succeeded, progress.failed), (1, 1));
        assert!(progress.is_complete());
        assert_eq!(progress.fraction(), 1.0);
    }

    #[test]
    fn test_batch_keeps_order_and_isolates_failures() {
        let inputs = vec![
            BatchInput::new("one", pages("Taxable Value 1,000.00\nIGST 50.00")),
            BatchInput::new("broken", DocumentInput::Bytes(b"%PDF-garbage".to_vec())),
            BatchInput::new("three", pages("Oman Air\nPNR: QWE123")),
        ];

        let mut seen = Vec::new();
        let entries = process_batch(&InvoiceEngine::default(), &inputs, &FormatHint::Auto, |p| {
            seen.push((p.current, p.status));
        });

        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["one", "broken", "three"]);

        assert!(!entries[0].record.is_error());
        assert_eq!(entries[0].record.get(Field::TotalInclTaxes), "1050.00");
        assert!(entries[1].record.is_error());
        assert_eq!(entries[1].record.get(Field::Airline), "ERROR");
        assert_eq!(entries[2].record.get(Field::Airline), "OMAN AIR");
        assert_eq!(entries[2].record.get(Field::Pnr), "QWE123");

        assert_eq!(
            seen,
            vec![
                (1, DocumentStatus::Extracted),
                (2, DocumentStatus::Failed),
                (3, DocumentStatus::Extracted),
            ]
        );
    }

    #[test]
    fn test_empty_batch() {
        let entries = process_batch(&InvoiceEngine::default(), &[], &FormatHint::Auto, |_| {
            panic!("no progress expected")
        });
        assert!(entries.is_empty());
    }
}

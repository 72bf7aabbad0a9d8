//! Batch processing command for multiple invoice files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use airgst_core::{BatchProgress, ExtractionError, Field, FormatHint, InvoiceEngine, InvoiceRecord};

use super::process::{format_record, OutputFormat};
use super::{is_supported, load_config, parse_hint, read_document};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory for per-file results and the summary
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Airline format, or "auto" to detect it per file
    #[arg(short, long, default_value = "auto")]
    airline: String,

    /// Skip the summary CSV
    #[arg(long)]
    no_summary: bool,

    /// Number of parallel workers (default from config)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Per-file time limit in seconds, 0 for none (default from config)
    #[arg(long)]
    timeout: Option<u64>,
}

/// Result of processing a single file.
struct FileResult {
    path: PathBuf,
    record: InvoiceRecord,
    warnings: Vec<String>,
}

impl FileResult {
    fn name(&self) -> &str {
        file_name(&self.path)
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let hint = parse_hint(&args.airline)?;
    let jobs = args.jobs.unwrap_or(config.batch.jobs).max(1);
    let timeout = args.timeout.unwrap_or(config.batch.document_timeout_secs);

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_supported(p))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );

    let engine = Arc::new(InvoiceEngine::new(config));
    let mut progress = BatchProgress::new(files.len());
    let mut results = Vec::with_capacity(files.len());

    // Records come back in input order; up to `jobs` files run at once.
    let mut pending = stream::iter(files)
        .map(|path| process_file(engine.clone(), path, hint, timeout))
        .buffered(jobs);

    while let Some(result) = pending.next().await {
        progress.advance(result.name(), &result.record);
        overall_pb.set_position(progress.current as u64);
        overall_pb.set_message(progress.message.clone());
        results.push(result);
    }

    overall_pb.finish_and_clear();

    if let Some(output_dir) = &args.output_dir {
        for result in results.iter().filter(|r| !r.record.is_error()) {
            let stem = result.path.file_stem().and_then(|s| s.to_str()).unwrap_or("invoice");
            let output_path = output_dir.join(format!("{}.{}", stem, args.format.extension()));
            fs::write(&output_path, format_record(&result.record, args.format)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if !args.no_summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<&FileResult> = results.iter().filter(|r| r.record.is_error()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(progress.succeeded).green(),
        style(progress.failed).red()
    );

    let warned = results.iter().filter(|r| !r.warnings.is_empty()).count();
    if warned > 0 {
        println!("   {} with reconciliation warnings", style(warned).yellow());
    }

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.record.error_reason().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Extract one file on the blocking pool, turning every failure into an
/// error record.
async fn process_file(engine: Arc<InvoiceEngine>, path: PathBuf, hint: FormatHint, timeout_secs: u64) -> FileResult {
    let task_path = path.clone();
    let task = tokio::task::spawn_blocking(move || -> Result<_, String> {
        let document = read_document(&task_path).map_err(|e| e.to_string())?;
        engine.extract_input(&document, &hint).map_err(|e| e.to_string())
    });

    let joined = if timeout_secs > 0 {
        match tokio::time::timeout(Duration::from_secs(timeout_secs), task).await {
            Ok(joined) => joined,
            Err(_) => Ok(Err(ExtractionError::Timeout(timeout_secs).to_string())),
        }
    } else {
        task.await
    };

    let outcome = joined.unwrap_or_else(|e| Err(ExtractionError::Panicked(e.to_string()).to_string()));

    match outcome {
        Ok(result) => FileResult {
            path,
            record: result.record,
            warnings: result.warnings,
        },
        Err(reason) => {
            warn!("Failed to process {}: {}", path.display(), reason);
            FileResult {
                path,
                record: InvoiceRecord::error(reason),
                warnings: Vec::new(),
            }
        }
    }
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|s| s.to_str()).unwrap_or("")
}

/// Write one row per file: file name, the record's fields in schema order,
/// the extraction date and the failure reason.
fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    let extraction_date = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let mut header = vec!["File Name"];
    header.extend(Field::ALL.iter().map(|f| f.header()));
    header.extend(["Extraction Date", "Error"]);
    wtr.write_record(&header)?;

    for result in results {
        let mut row = vec![result.name()];
        row.extend(result.record.values().iter().map(String::as_str));
        row.push(&extraction_date);
        row.push(result.record.error_reason().unwrap_or(""));
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

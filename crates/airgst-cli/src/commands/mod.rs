//! CLI subcommands and the helpers they share.

pub mod batch;
pub mod classify;
pub mod config;
pub mod process;

use std::fs;
use std::path::Path;

use airgst_core::models::GstConfig;
use airgst_core::{DocumentInput, FormatHint, PageContent};
use tracing::debug;

/// File extensions the CLI reads.
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["pdf", "txt"];

/// Load the config file given with `--config`, else the user's config
/// file if one exists, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<GstConfig> {
    if let Some(path) = config_path {
        return Ok(GstConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using config from {}", default_path.display());
        Ok(GstConfig::from_file(&default_path)?)
    } else {
        Ok(GstConfig::default())
    }
}

/// Parse an `--airline` value: `auto`, `any` or a format name.
pub fn parse_hint(airline: &str) -> anyhow::Result<FormatHint> {
    Ok(airline.parse::<FormatHint>()?)
}

pub fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

pub fn is_supported(path: &Path) -> bool {
    SUPPORTED_EXTENSIONS.contains(&extension(path).as_str())
}

/// Read a document from disk.
///
/// PDFs are passed as bytes; `.txt` files hold text already extracted from
/// an invoice and become a single page.
pub fn read_document(path: &Path) -> anyhow::Result<DocumentInput> {
    match extension(path).as_str() {
        "pdf" => Ok(DocumentInput::Bytes(fs::read(path)?)),
        "txt" => {
            let text = fs::read_to_string(path)?;
            Ok(DocumentInput::Pages(vec![PageContent::new(1, text)]))
        }
        other => anyhow::bail!("Unsupported file format: {}", other),
    }
}

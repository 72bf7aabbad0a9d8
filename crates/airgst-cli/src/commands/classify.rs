//! Classify command - detect the airline format of invoice files.

use std::path::PathBuf;

use clap::Args;
use console::style;

use airgst_core::pdf::{LatticeSettings, PdfExtractor, PreparedPages};
use airgst_core::{classify, preprocess, DocumentInput};

use super::{load_config, read_document};

/// Arguments for the classify command.
#[derive(Args)]
pub struct ClassifyArgs {
    /// Input files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

pub async fn run(args: ClassifyArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    for input in &args.inputs {
        if !input.exists() {
            anyhow::bail!("Input file not found: {}", input.display());
        }

        let content = match read_document(input)? {
            DocumentInput::Bytes(data) => {
                let mut pdf = PdfExtractor::new().with_settings(LatticeSettings::from(&config.pdf));
                pdf.load(&data)?;
                preprocess(&pdf, config.pdf.max_pages)?
            }
            DocumentInput::Pages(pages) => preprocess(&PreparedPages::new(pages), 0)?,
        };

        let tag = classify(&content.full_text);
        println!(
            "{}\t{}\t{}",
            input.display(),
            style(tag.as_str()).cyan(),
            tag.label()
        );
    }

    Ok(())
}

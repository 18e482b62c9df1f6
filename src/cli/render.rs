//! Render command: process one document.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::common::{DocumentArgs, print_diagnostics, read_document, read_imports, write_output};
use super::report::ReportFormat;
use crate::config::ProcessingConfig;
use crate::pipeline::process_document;

#[derive(Args)]
pub struct RenderCommand {
    /// Document to process.
    #[arg(value_name = "FILE")]
    file: PathBuf,

    #[command(flatten)]
    document: DocumentArgs,

    /// Also print the field report to stderr.
    #[arg(long, value_enum, value_name = "FORMAT")]
    report: Option<ReportFormat>,

    /// Write the result here instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

impl RenderCommand {
    pub async fn execute(self, config: ProcessingConfig, quiet: bool) -> Result<()> {
        let config = self.document.apply(config);
        let raw = read_document(&self.file).await?;
        let imports = read_imports(&self.document.imports).await?;

        tracing::debug!(file = %self.file.display(), imports = imports.len(), "rendering");
        let doc = process_document(&raw, &imports, &config)?;

        if !quiet {
            print_diagnostics(&self.file.display().to_string(), &doc.diagnostics);
        }
        write_output(self.output.as_deref(), &doc.content).await?;

        if let Some(format) = self.report {
            eprintln!("{}", format.render(&doc.field_report)?);
        }
        Ok(())
    }
}

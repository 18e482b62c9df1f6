//! Field report command.
//!
//! Processes a document and prints which placeholders were filled, which are
//! still empty and which were computed. With `--fail-on-missing` the command
//! exits non-zero while any field is empty, so it can gate a review or CI
//! step.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use std::fmt::Write as _;
use std::path::PathBuf;

use super::common::{DocumentArgs, print_diagnostics, read_document, read_imports};
use crate::config::ProcessingConfig;
use crate::pipeline::process_document;
use crate::tracking::{FieldReport, FieldStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Text,

    Json,
}

impl ReportFormat {
    pub fn render(self, report: &FieldReport) -> Result<String> {
        match self {
            ReportFormat::Text => Ok(format_field_report(report)),
            ReportFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        }
    }
}

#[derive(Args)]
pub struct ReportCommand {
    /// Document to inspect.
    #[arg(value_name = "FILE")]
    file: PathBuf,

    #[command(flatten)]
    document: DocumentArgs,

    #[arg(long, value_enum, default_value = "text")]
    format: ReportFormat,

    /// Exit with an error when any field is empty.
    #[arg(long)]
    fail_on_missing: bool,
}

impl ReportCommand {
    pub async fn execute(self, config: ProcessingConfig) -> Result<()> {
        let mut config = self.document.apply(config);
        config.enable_field_tracking = true;

        let raw = read_document(&self.file).await?;
        let imports = read_imports(&self.document.imports).await?;
        let doc = process_document(&raw, &imports, &config)?;

        print_diagnostics(&self.file.display().to_string(), &doc.diagnostics);
        println!("{}", self.format.render(&doc.field_report)?);

        if self.fail_on_missing && doc.field_report.empty > 0 {
            let names: Vec<&str> = doc.field_report.missing().map(|f| f.name.as_str()).collect();
            bail!("{} field(s) have no value: {}", names.len(), names.join(", "));
        }
        Ok(())
    }
}

/// Human-readable field report.
pub fn format_field_report(report: &FieldReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Fields: {} total, {} filled, {} empty, {} logic ({:.0}% complete)",
        report.total,
        report.filled,
        report.empty,
        report.logic,
        report.completeness() * 100.0
    );

    let width = report.fields.iter().map(|f| f.name.len()).max().unwrap_or(0);
    for field in &report.fields {
        let (tag, shown) = match field.status {
            FieldStatus::Filled => (
                "✓".green(),
                field.value.as_ref().map(ToString::to_string).unwrap_or_default(),
            ),
            FieldStatus::Empty => ("✗".red(), field.original_value.clone()),
            FieldStatus::Logic => (
                "ƒ".cyan(),
                field.value.as_ref().map(ToString::to_string).unwrap_or_default(),
            ),
        };
        let _ = writeln!(out, "  {tag} {:<width$}  {shown}", field.name);
    }

    out.trim_end().to_string()
}

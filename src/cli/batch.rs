//! Batch command: process every document under a directory.
//!
//! Documents are discovered with `walkdir`, processed concurrently by
//! [`process_batch`], and written under the output directory with the same
//! relative layout.

use anyhow::{Context, Result, anyhow, bail};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::common::{DocumentArgs, print_diagnostics, read_document, read_imports, write_output};
use crate::config::ProcessingConfig;
use crate::constants::{DOCUMENT_EXTENSIONS, MAX_PARALLELISM, OUTPUT_EXTENSION, default_max_parallel};
use crate::pipeline::{BatchInput, process_batch};

#[derive(Args)]
pub struct BatchCommand {
    /// Directory searched recursively for documents.
    #[arg(value_name = "DIR")]
    dir: PathBuf,

    /// Directory receiving the rendered documents.
    #[arg(long, value_name = "DIR")]
    out: PathBuf,

    /// Documents processed at once (default: number of CPU cores).
    #[arg(long, value_name = "NUM")]
    max_parallel: Option<usize>,

    #[command(flatten)]
    document: DocumentArgs,
}

impl BatchCommand {
    pub async fn execute(self, config: ProcessingConfig, quiet: bool) -> Result<()> {
        let max_parallel = self.max_parallel.unwrap_or_else(default_max_parallel);
        if max_parallel == 0 || max_parallel > MAX_PARALLELISM {
            bail!("--max-parallel must be between 1 and {MAX_PARALLELISM}, got {max_parallel}");
        }

        let config = self.document.apply(config);
        let imports = read_imports(&self.document.imports).await?;

        let sources = discover_documents(&self.dir, &self.out)?;
        if sources.is_empty() {
            if !quiet {
                println!("No documents found in {}", self.dir.display());
            }
            return Ok(());
        }

        let mut inputs = Vec::with_capacity(sources.len());
        for relative in &sources {
            let raw = read_document(&self.dir.join(relative)).await?;
            inputs.push(
                BatchInput::new(relative.to_string_lossy(), raw).with_imports(imports.clone()),
            );
        }

        tracing::debug!(documents = inputs.len(), max_parallel, "processing batch");
        let outputs = process_batch(inputs, &config, max_parallel).await;

        let total = outputs.len();
        let mut failed = 0;
        for (output, relative) in outputs.into_iter().zip(&sources) {
            match output.result {
                Ok(doc) => {
                    let target = self.out.join(relative).with_extension(OUTPUT_EXTENSION);
                    write_output(Some(&target), &doc.content).await?;
                    if !quiet {
                        print_diagnostics(&output.name, &doc.diagnostics);
                        println!("{} {}", "✓".green(), output.name);
                    }
                }
                Err(e) => {
                    failed += 1;
                    eprintln!("{} {}: {e}", "✗".red(), output.name);
                }
            }
        }

        if failed > 0 {
            return Err(anyhow!("{failed} of {total} documents failed"));
        }
        if !quiet {
            println!("Processed {total} document(s) into {}", self.out.display());
        }
        Ok(())
    }
}

/// Relative paths of documents under `dir`, sorted, skipping `out` and symlinks.
fn discover_documents(dir: &Path, out: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("{} is not a directory", dir.display());
    }

    let mut found = Vec::new();
    let walker = WalkDir::new(dir).follow_links(false).into_iter();
    for entry in walker.filter_entry(|e| e.path() != out) {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_document = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| DOCUMENT_EXTENSIONS.contains(&ext));
        if !is_document {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(dir)
            .with_context(|| format!("{} is outside {}", entry.path().display(), dir.display()))?;
        found.push(relative.to_path_buf());
    }

    found.sort();
    Ok(found)
}

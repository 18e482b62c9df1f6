//! Helpers shared by the CLI commands.
//!
//! File I/O lives here rather than in the library: the pipeline only sees
//! text and already-parsed metadata.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::config::ProcessingConfig;
use crate::core::{Diagnostic, RunContext, Severity};
use crate::markdown::import_metadata;
use crate::metadata::MetadataStore;

/// Options shared by every command that processes documents.
#[derive(Args, Debug, Clone, Default)]
pub struct DocumentArgs {
    /// Metadata file to merge (YAML, or a document with a metadata block).
    ///
    /// Repeat for several imports; earlier imports win over later ones and
    /// the document's own metadata wins over all of them.
    #[arg(short, long = "import", value_name = "FILE")]
    pub imports: Vec<PathBuf>,

    /// Wrap substituted values with status markup.
    #[arg(long)]
    pub highlight: bool,

    /// Fail on malformed metadata instead of continuing without it.
    #[arg(long)]
    pub strict: bool,

    /// Do not merge imported metadata.
    #[arg(long)]
    pub no_merge: bool,

    /// Continuous numbering: deeper levels are not reset.
    #[arg(long)]
    pub no_reset: bool,

    /// Do not indent headers below level one.
    #[arg(long)]
    pub no_indent: bool,
}

impl DocumentArgs {
    /// Overlay the flags that were given on `config`.
    #[must_use]
    pub fn apply(&self, mut config: ProcessingConfig) -> ProcessingConfig {
        config.highlight |= self.highlight;
        config.strict |= self.strict;
        config.disable_frontmatter_merge |= self.no_merge;
        config.no_reset |= self.no_reset;
        config.no_indent |= self.no_indent;
        config
    }
}

pub async fn read_document(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read document: {}", path.display()))
}

/// Read and parse import files in order.
///
/// A malformed import contributes an empty store and a warning; a missing
/// file is an error.
pub async fn read_imports(paths: &[PathBuf]) -> Result<Vec<MetadataStore>> {
    let mut stores = Vec::with_capacity(paths.len());
    for path in paths {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read import: {}", path.display()))?;

        let mut ctx = RunContext::new(false, false);
        stores.push(import_metadata(&content, &mut ctx));
        for diagnostic in ctx.diagnostics() {
            tracing::warn!("{}: {diagnostic}", path.display());
        }
    }
    Ok(stores)
}

/// Write `content` to `path`, creating parent directories, or to stdout.
pub async fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            tokio::fs::write(path, content)
                .await
                .with_context(|| format!("Failed to write output: {}", path.display()))
        }
        None => {
            print!("{content}");
            Ok(())
        }
    }
}

/// Print warnings to stderr. Info diagnostics only go to the log.
pub fn print_diagnostics(source: &str, diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        match diagnostic.severity {
            Severity::Warning => eprintln!("{} {source}: {}", "⚠".yellow(), diagnostic.message),
            Severity::Info => tracing::info!("{source}: {diagnostic}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_document_args_only_enable() {
        let config = ProcessingConfig {
            strict: true,
            ..ProcessingConfig::default()
        };
        let args = DocumentArgs {
            highlight: true,
            ..DocumentArgs::default()
        };
        let applied = args.apply(config);
        assert!(applied.highlight);
        assert!(applied.strict);
        assert!(!applied.no_reset);
    }

    #[tokio::test]
    async fn test_read_imports_in_order() -> Result<()> {
        let temp = TempDir::new()?;
        let first = temp.path().join("a.yml");
        let second = temp.path().join("b.md");
        std::fs::write(&first, "client: A\n")?;
        std::fs::write(&second, "---\nclient: B\nterm: 12\n---\nbody\n")?;

        let stores = read_imports(&[first, second]).await?;
        assert_eq!(stores.len(), 2);
        assert_eq!(stores[0].get("client").map(ToString::to_string).as_deref(), Some("A"));
        assert_eq!(stores[1].get("term").map(ToString::to_string).as_deref(), Some("12"));
        Ok(())
    }

    #[tokio::test]
    async fn test_read_imports_missing_file_fails() {
        let result = read_imports(&[PathBuf::from("/nonexistent/import.yml")]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_write_output_creates_parents() -> Result<()> {
        let temp = TempDir::new()?;
        let target = temp.path().join("nested/dir/out.md");
        write_output(Some(&target), "hello").await?;
        assert_eq!(std::fs::read_to_string(target)?, "hello");
        Ok(())
    }
}

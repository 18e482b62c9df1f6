//! Document pipeline.
//!
//! [`process_document`] runs the passes in their fixed order:
//!
//! 1. split the metadata block from the body
//! 2. merge imported metadata (main document wins)
//! 3. overlay the document's own layout keys on the configuration
//! 4. number headers and capture reference labels
//! 5. resolve `|key|` cross references
//! 6. expand loop and conditional blocks
//! 7. substitute the remaining placeholders
//!
//! Every run gets its own [`RunContext`], so [`process_batch`] can run many
//! documents at once on the blocking thread pool with a bounded number in
//! flight.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;

use crate::config::ProcessingConfig;
use crate::core::{Diagnostic, LexdownError, Result, RunContext};
use crate::crossref::resolve_references;
use crate::markdown::frontmatter::FrontmatterParser;
use crate::merge::{MergeLog, MergeOptions, merge_frontmatter};
use crate::metadata::MetadataStore;
use crate::numbering::{HeaderRecord, number_headers};
use crate::templating::{Delimiters, Evaluator, Scope, build_tree, expand_blocks, tokenize};
use crate::tracking::FieldReport;

/// Output of one document run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedDocument {
    /// Rendered body, without the metadata block.
    pub content: String,
    /// Main metadata after merging imports.
    #[serde(skip)]
    pub metadata: MetadataStore,
    pub field_report: FieldReport,
    pub diagnostics: Vec<Diagnostic>,
    pub headers: Vec<HeaderRecord>,
    #[serde(skip_serializing_if = "MergeLog::is_empty")]
    pub merge_log: MergeLog,
}

struct Rendered {
    content: String,
    metadata: MetadataStore,
    headers: Vec<HeaderRecord>,
    merge_log: MergeLog,
}

/// Process one document.
///
/// # Arguments
/// * `raw` - document text, metadata block first
/// * `imports` - already-parsed imported metadata, in document order
/// * `config` - processing options
///
/// # Errors
/// Only [`LexdownError::MalformedMetadata`] in strict mode. Everything else
/// degrades into diagnostics.
///
/// # Example
///
/// ```rust
/// use lexdown::config::ProcessingConfig;
/// use lexdown::pipeline::process_document;
///
/// let doc = process_document(
///     "---\nname: Acme\n---\nl. Parties\nHello {{name}}!\n",
///     &[],
///     &ProcessingConfig::default(),
/// )
/// .unwrap();
/// assert_eq!(doc.content.trim(), "Article 1. Parties\nHello Acme!");
/// assert_eq!(doc.field_report.filled, 1);
/// ```
pub fn process_document(
    raw: &str,
    imports: &[MetadataStore],
    config: &ProcessingConfig,
) -> Result<ProcessedDocument> {
    let mut ctx = RunContext::new(config.enable_field_tracking, config.highlight);
    let rendered = run_passes(raw, imports, config, &mut ctx)?;
    let (field_report, diagnostics) = ctx.finish();

    Ok(ProcessedDocument {
        content: rendered.content,
        metadata: rendered.metadata,
        field_report,
        diagnostics,
        headers: rendered.headers,
        merge_log: rendered.merge_log,
    })
}

/// Process one document with a caller-owned context.
///
/// The context is reset first; after the call it holds this run's ledger
/// and diagnostics.
pub fn process_document_with(
    raw: &str,
    imports: &[MetadataStore],
    config: &ProcessingConfig,
    ctx: &mut RunContext,
) -> Result<ProcessedDocument> {
    ctx.reset();
    let rendered = run_passes(raw, imports, config, ctx)?;

    Ok(ProcessedDocument {
        content: rendered.content,
        metadata: rendered.metadata,
        field_report: ctx.tracker().report(),
        diagnostics: ctx.diagnostics().to_vec(),
        headers: rendered.headers,
        merge_log: rendered.merge_log,
    })
}

fn run_passes(
    raw: &str,
    imports: &[MetadataStore],
    config: &ProcessingConfig,
    ctx: &mut RunContext,
) -> Result<Rendered> {
    let parsed = FrontmatterParser::new().parse(raw, config.strict, ctx)?;

    let (metadata, merge_log) = if config.disable_frontmatter_merge || imports.is_empty() {
        (parsed.metadata, MergeLog::default())
    } else {
        let options = MergeOptions {
            validate_types: config.validate_types,
            log_operations: config.log_imports,
        };
        let outcome = merge_frontmatter(&parsed.metadata, imports, &options);
        ctx.extend_diagnostics(outcome.diagnostics);
        (outcome.store, outcome.log)
    };

    // Reserved keys never survive a merge, so layout keys here come from the main document.
    let effective = config.from_metadata(&metadata);
    let numbering = effective.numbering_options(ctx);
    let numbered = number_headers(&parsed.body, &numbering, ctx);
    tracing::debug!(headers = numbered.headers.len(), references = numbered.references.len(), "numbered headers");

    let body = resolve_references(&numbered.content, &numbered.references, ctx);

    let delimiters = Delimiters::with_patterns(&effective.field_patterns, ctx);
    let nodes = build_tree(tokenize(&body, &delimiters), ctx);
    let evaluator = Evaluator::new(&metadata);
    let scope = Scope::root(&metadata);
    let nodes = expand_blocks(nodes, &evaluator, &scope, ctx);
    let content = evaluator.render_nodes(&nodes, &scope, ctx);

    tracing::debug!(
        fields = ctx.tracker().report().total,
        diagnostics = ctx.diagnostics().len(),
        "rendered document"
    );

    Ok(Rendered {
        content,
        metadata,
        headers: numbered.headers,
        merge_log,
    })
}

/// One document queued for [`process_batch`].
#[derive(Debug, Clone)]
pub struct BatchInput {
    /// Caller-chosen identifier, usually the source path.
    pub name: String,
    pub raw: String,
    pub imports: Vec<MetadataStore>,
}

impl BatchInput {
    pub fn new(name: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw: raw.into(),
            imports: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_imports(mut self, imports: Vec<MetadataStore>) -> Self {
        self.imports = imports;
        self
    }
}

/// Result for one batch entry.
#[derive(Debug)]
pub struct BatchOutput {
    pub name: String,
    pub result: Result<ProcessedDocument>,
}

/// Process documents concurrently, at most `max_parallel` at a time.
///
/// Results come back in input order. A document that fails (strict-mode
/// metadata error, or a worker that panicked) does not affect the others.
pub async fn process_batch(
    inputs: Vec<BatchInput>,
    config: &ProcessingConfig,
    max_parallel: usize,
) -> Vec<BatchOutput> {
    let concurrency = max_parallel.max(1);
    let config = Arc::new(config.clone());
    let total = inputs.len();

    tracing::debug!(documents = total, concurrency, "starting batch");

    let mut outputs: Vec<(usize, BatchOutput)> = stream::iter(inputs.into_iter().enumerate())
        .map(|(index, input)| {
            let config = Arc::clone(&config);
            async move {
                let name = input.name.clone();
                let result = tokio::task::spawn_blocking(move || {
                    process_document(&input.raw, &input.imports, &config)
                })
                .await
                .map_err(|e| LexdownError::WorkerFailed {
                    reason: format!("{name}: {e}"),
                })
                .and_then(|result| result);

                if let Err(e) = &result {
                    tracing::warn!("Failed to process {name}: {e}");
                }
                (index, BatchOutput { name, result })
            }
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;

    outputs.sort_by_key(|(index, _)| *index);

    let failed = outputs.iter().filter(|(_, output)| output.result.is_err()).count();
    tracing::debug!(documents = total, failed, "finished batch");

    outputs.into_iter().map(|(_, output)| output).collect()
}

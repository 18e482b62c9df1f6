//! lexdown - structuring and templating for legal Markdown
//!
//! lexdown turns a Markdown document with a YAML metadata block into a
//! finished legal text: headers are numbered from per-level templates,
//! `|key|` cross references are replaced with the label of the header they
//! point to, imported metadata is merged in, and `{{ }}` placeholders,
//! loops and conditionals are filled from the metadata. Every placeholder
//! is recorded in a field report so a reviewer can see what is still
//! missing.
//!
//! # Pipeline
//!
//! ```text
//! raw text ─► frontmatter ─► merge ─► numbering ─► crossref ─► blocks ─► fields ─► output
//!                                                                   │
//!                                                        field report + diagnostics
//! ```
//!
//! # Modules
//!
//! ## Engine
//! - [`pipeline`] - [`process_document`](pipeline::process_document) and bounded batch processing
//! - [`markdown`] - metadata block extraction
//! - [`merge`] - frontmatter merging with reserved-key filtering
//! - [`numbering`] - header numbering
//! - [`crossref`] - cross-reference resolution
//! - [`templating`] - placeholders, helpers, loops and conditionals
//! - [`tracking`] - the field ledger and highlight markup
//!
//! ## Supporting Modules
//! - [`core`] - errors, diagnostics and the per-run context
//! - [`metadata`] - the metadata value model
//! - [`config`] - processing configuration
//! - [`cli`] - the `lexdown` command
//!
//! # Example
//!
//! ```rust
//! use lexdown::config::ProcessingConfig;
//! use lexdown::pipeline::process_document;
//!
//! let raw = "---\nclient: Acme\n---\nl. Scope |scope|\nThis agreement with {{client}} is defined in |scope|\n";
//! let doc = process_document(raw, &[], &ProcessingConfig::default()).unwrap();
//!
//! assert!(doc.content.contains("Article 1. Scope"));
//! assert!(doc.content.contains("with Acme is defined in Article 1."));
//! assert_eq!(doc.field_report.filled, 1);
//! assert_eq!(doc.field_report.logic, 1);
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! lexdown render contract.md --import parties.yml -o contract.out.md
//! lexdown report contract.md --format json
//! lexdown batch contracts/ --out rendered/ --max-parallel 4
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod crossref;
pub mod markdown;
pub mod merge;
pub mod metadata;
pub mod numbering;
pub mod pipeline;
pub mod templating;
pub mod tracking;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

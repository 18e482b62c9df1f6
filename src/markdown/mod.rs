//! Markdown document handling.
//!
//! A lexdown document is Markdown with a leading YAML metadata block:
//!
//! ```markdown
//! ---
//! client:
//!   name: Acme Ltd
//! effective_date: 2024-03-01
//! level-one: "Article %n."
//! ---
//! l. Definitions |defs|
//! In this agreement {{client.name}} ...
//! ```
//!
//! [`frontmatter`] splits the block from the body and converts the YAML
//! into a [`MetadataStore`](crate::metadata::MetadataStore). Imported
//! documents go through [`frontmatter::import_metadata`], which only keeps
//! their metadata.

pub mod frontmatter;

pub use frontmatter::{FrontmatterParser, ParsedDocument, import_metadata, parse_metadata};

//! Metadata block extraction with a raw gray_matter engine.
//!
//! The metadata block is extracted as *raw text* first (so malformed YAML can
//! still be separated from the body) and only then parsed with serde_yaml into
//! a [`MetadataStore`]. Malformed YAML degrades to an empty store plus a
//! diagnostic unless strict mode asks for a hard failure.
//!
//! # Example
//!
//! ```rust
//! use lexdown::core::RunContext;
//! use lexdown::markdown::frontmatter::FrontmatterParser;
//!
//! let parser = FrontmatterParser::new();
//! let mut ctx = RunContext::new(true, false);
//! let doc = parser
//!     .parse("---\nclient: Acme\n---\nHello {{client}}\n", false, &mut ctx)
//!     .unwrap();
//!
//! assert!(doc.has_metadata_block());
//! assert_eq!(doc.metadata.get("client").unwrap().to_string(), "Acme");
//! assert!(doc.body.contains("Hello {{client}}"));
//! ```

use gray_matter::{Matter, Pod, engine::Engine};
use std::fmt::Debug;

use crate::core::{DiagnosticKind, LexdownError, Result, RunContext};
use crate::metadata::{Mapping, MetadataStore, Value};

const BLOCK_DELIMITER: &str = "---";

/// gray_matter engine that returns the raw block text without parsing it.
struct RawFrontmatter;

impl Engine for RawFrontmatter {
    fn parse(content: &str) -> std::result::Result<Pod, gray_matter::Error> {
        Ok(Pod::String(content.to_string()))
    }
}

/// A document split into its metadata and body.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Parsed metadata (empty when absent or malformed).
    pub metadata: MetadataStore,

    /// The body with the metadata block removed.
    pub body: String,

    /// The raw metadata block text, if one was present.
    pub raw_metadata: Option<String>,
}

impl ParsedDocument {
    pub fn has_metadata_block(&self) -> bool {
        self.raw_metadata.is_some()
    }
}

/// Splits raw document text into metadata and body.
pub struct FrontmatterParser {
    raw_matter: Matter<RawFrontmatter>,
}

impl Clone for FrontmatterParser {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl Debug for FrontmatterParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrontmatterParser").finish()
    }
}

impl Default for FrontmatterParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrontmatterParser {
    pub fn new() -> Self {
        Self {
            raw_matter: Matter::new(),
        }
    }

    /// Split and parse a document.
    ///
    /// # Arguments
    /// * `content` - raw document text (metadata block + body)
    /// * `strict` - fail on malformed metadata instead of degrading
    /// * `ctx` - run context receiving diagnostics
    ///
    /// # Errors
    /// [`LexdownError::MalformedMetadata`] when `strict` is set and the block
    /// is not a valid YAML mapping.
    pub fn parse(&self, content: &str, strict: bool, ctx: &mut RunContext) -> Result<ParsedDocument> {
        let raw_metadata = self.extract_raw_frontmatter(content);
        let body = match raw_metadata {
            Some(_) => self.strip_frontmatter(content),
            None => content.to_string(),
        };

        let metadata = match raw_metadata.as_deref() {
            Some(raw) => match parse_metadata(raw) {
                Ok(store) => store,
                Err(e) if strict => return Err(e),
                Err(e) => {
                    tracing::warn!("Unable to parse metadata block, continuing without metadata: {e}");
                    ctx.warn(
                        DiagnosticKind::MalformedMetadata,
                        format!("{e}; the document is processed with empty metadata"),
                    );
                    MetadataStore::new()
                }
            },
            None => MetadataStore::new(),
        };

        Ok(ParsedDocument {
            metadata,
            body,
            raw_metadata,
        })
    }

    /// Content with the metadata block removed.
    pub fn strip_frontmatter(&self, content: &str) -> String {
        self.raw_matter
            .parse::<String>(content)
            .map(|result| result.content)
            .unwrap_or_else(|_| content.to_string())
    }

    /// The raw metadata block text, if a block is present.
    ///
    /// An empty block (`---` immediately followed by `---`) yields an empty
    /// string.
    pub fn extract_raw_frontmatter(&self, content: &str) -> Option<String> {
        match self.raw_matter.parse::<String>(content) {
            Ok(result) => match result.data {
                Some(text) => Some(text),
                None if opens_with_block(content) => Some(String::new()),
                None => None,
            },
            Err(_) => None,
        }
    }
}

fn opens_with_block(content: &str) -> bool {
    let mut lines = content.lines().map(str::trim_end);
    lines.next() == Some(BLOCK_DELIMITER) && lines.any(|line| line == BLOCK_DELIMITER)
}

/// Parse YAML metadata text into a store.
///
/// An empty or null document yields an empty store; anything other than a
/// mapping at the top level is malformed.
///
/// # Errors
/// [`LexdownError::MalformedMetadata`] for invalid YAML or a non-mapping root.
pub fn parse_metadata(yaml: &str) -> Result<MetadataStore> {
    let parsed: serde_yaml::Value =
        serde_yaml::from_str(yaml).map_err(|e| LexdownError::MalformedMetadata {
            reason: e.to_string(),
        })?;

    match Value::from_yaml(parsed) {
        Value::Null => Ok(MetadataStore::new()),
        Value::Mapping(map) => Ok(MetadataStore::from_mapping(map)),
        other => Err(LexdownError::MalformedMetadata {
            reason: format!("expected a mapping at the top level, found a {}", other.kind()),
        }),
    }
}

/// Parse only the metadata of an imported document, leniently.
///
/// Import files are read by the host; a malformed import contributes nothing.
pub fn import_metadata(content: &str, ctx: &mut RunContext) -> MetadataStore {
    let parser = FrontmatterParser::new();
    let raw = parser.extract_raw_frontmatter(content).unwrap_or_else(|| content.to_string());
    match parse_metadata(&raw) {
        Ok(store) => store,
        Err(e) => {
            ctx.warn(DiagnosticKind::MalformedMetadata, format!("imported metadata ignored: {e}"));
            MetadataStore::from_mapping(Mapping::new())
        }
    }
}

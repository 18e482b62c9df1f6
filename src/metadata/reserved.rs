//! Keys that only the main document may set.
//!
//! Imported documents contribute content metadata (parties, amounts, dates),
//! never pipeline behaviour. Any top-level key listed here, or starting with
//! one of the reserved prefixes, is dropped from an imported store before the
//! merge writes anything.

/// Exact top-level key names reserved for the main document.
pub static RESERVED_KEYS: &[&str] = &[
    // header numbering templates and layout
    "level-one",
    "level-two",
    "level-three",
    "level-four",
    "level-five",
    "level-indent",
    "no-reset",
    "no-indent",
    "numbering-mode",
    // pipeline configuration
    "pipeline",
    "pipeline-config",
    "force_commands",
    "force-commands",
    "commands",
    "field-patterns",
    "disable-frontmatter-merge",
    "validate-types",
    "log-imports",
    "enable-field-tracking",
    // output directives
    "output",
    "output-path",
    "output-filename",
    "meta-yaml-output",
    "meta-json-output",
    "meta-output-path",
];

/// Reserved key prefixes.
pub static RESERVED_PREFIXES: &[&str] = &["pipeline.", "pipeline-", "output-", "meta-output", "lexdown."];

/// Check whether a top-level key is reserved.
///
/// Matching is case-sensitive, like every other metadata key.
///
/// # Examples
/// ```
/// use lexdown::metadata::is_reserved_key;
///
/// assert!(is_reserved_key("level-one"));
/// assert!(is_reserved_key("output-format"));
/// assert!(!is_reserved_key("client"));
/// ```
#[must_use]
pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key) || RESERVED_PREFIXES.iter().any(|prefix| key.starts_with(prefix))
}

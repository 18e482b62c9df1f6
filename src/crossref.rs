//! Cross-reference resolution.
//!
//! Pass one happens during numbering: every header carrying a `|key|`
//! suffix stores its formatted label in a [`ReferenceMap`]. Pass two,
//! [`resolve_references`], scans the numbered body and replaces each
//! `|key|` occurrence whose key is known. Unknown keys stay as written.
//!
//! # Example
//!
//! ```rust
//! use lexdown::core::RunContext;
//! use lexdown::crossref::{ReferenceMap, resolve_references};
//!
//! let mut labels = ReferenceMap::default();
//! labels.insert("pay", "Article 2.");
//!
//! let mut ctx = RunContext::new(true, false);
//! let out = resolve_references("See |pay| and |nope|.", &labels, &mut ctx);
//! assert_eq!(out, "See Article 2. and |nope|.");
//! ```

use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::core::RunContext;
use crate::metadata::Value;

/// A `|key|` occurrence in body text.
static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\|([A-Za-z0-9_.\-]+)\|").expect("valid regex"));

/// Ledger namespace for resolved references.
pub const LEDGER_PREFIX: &str = "crossref.";

/// Reference key → formatted header label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceMap {
    labels: HashMap<String, String>,
}

impl ReferenceMap {
    /// Insert a label, returning the label it replaced.
    pub fn insert(&mut self, key: impl Into<String>, label: impl Into<String>) -> Option<String> {
        self.labels.insert(key.into(), label.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.labels.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Replace every known `|key|` in `content` with its label.
///
/// Fenced code blocks are left untouched. Each substitution is recorded in
/// the ledger as a logic field named `crossref.<key>`.
pub fn resolve_references(content: &str, labels: &ReferenceMap, ctx: &mut RunContext) -> String {
    if labels.is_empty() || !content.contains('|') {
        return content.to_string();
    }

    let mut resolved = 0usize;
    let mut fence: Option<&str> = None;
    let mut out = Vec::new();

    for line in content.split('\n') {
        let trimmed = line.trim_start();
        if let Some(marker) = fence {
            if trimmed.starts_with(marker) {
                fence = None;
            }
            out.push(line.to_string());
            continue;
        }
        if let Some(marker) = ["```", "~~~"].into_iter().find(|m| trimmed.starts_with(m)) {
            fence = Some(marker);
            out.push(line.to_string());
            continue;
        }

        let replaced = REFERENCE.replace_all(line, |caps: &Captures| {
            let key = &caps[1];
            match labels.get(key) {
                Some(label) => {
                    resolved += 1;
                    let field = format!("{LEDGER_PREFIX}{key}");
                    let status =
                        ctx.tracker_mut().record(&field, Some(&Value::from(label)), &caps[0], true);
                    ctx.present(label, &field, status)
                }
                None => caps[0].to_string(),
            }
        });
        out.push(replaced.into_owned());
    }

    tracing::debug!(resolved, known = labels.len(), "resolved cross references");
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::FieldStatus;

    fn labels() -> ReferenceMap {
        let mut map = ReferenceMap::default();
        map.insert("defs", "Article 1.");
        map.insert("pay", "Section 2.");
        map
    }

    #[test]
    fn test_resolves_known_keys_and_tracks_them() {
        let mut ctx = RunContext::new(true, false);
        let out = resolve_references("As defined in |defs|, see |pay| and |defs|.", &labels(), &mut ctx);
        assert_eq!(out, "As defined in Article 1., see Section 2. and Article 1..");

        let field = ctx.tracker().get("crossref.defs").unwrap();
        assert_eq!(field.status, FieldStatus::Logic);
        assert_eq!(field.occurrences, 2);
        assert_eq!(field.original_value, "|defs|");
    }

    #[test]
    fn test_unknown_keys_are_left_alone() {
        let mut ctx = RunContext::new(true, false);
        let out = resolve_references("| a | b |\n|unknown|", &labels(), &mut ctx);
        assert_eq!(out, "| a | b |\n|unknown|");
        assert_eq!(ctx.tracker().report().total, 0);
    }

    #[test]
    fn test_fenced_code_is_not_resolved() {
        let mut ctx = RunContext::new(false, false);
        let out = resolve_references("```\n|defs|\n```\n|defs|", &labels(), &mut ctx);
        assert_eq!(out, "```\n|defs|\n```\nArticle 1.");
    }

    #[test]
    fn test_highlighted_references() {
        let mut ctx = RunContext::new(true, true);
        let out = resolve_references("see |pay|", &labels(), &mut ctx);
        assert_eq!(
            out,
            "see <span class=\"legal-field highlight\" data-field=\"crossref.pay\">Section 2.</span>"
        );
    }
}

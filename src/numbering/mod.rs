//! Header numbering engine.
//!
//! Consumes the body once: [`tokenizer::scan_headers`] produces the ordered
//! header stream, [`NumberingState`] advances the five counter slots for each
//! header, and [`template::format_label`] renders the label. Every header with
//! a reference key contributes its label to the [`ReferenceMap`] used by the
//! cross-reference pass.
//!
//! # Counter rules
//!
//! - Level 5 directly after level 5 increments slot 5 only; level 5 after any
//!   other level restarts slot 5 at 1.
//! - Any other level initializes unset shallower slots to 1 (skipped levels),
//!   increments its own slot and, unless continuous numbering is on, zeroes
//!   every deeper slot.
//! - Levels outside `1..=5` are passed through untouched and do not change
//!   the counters.
//!
//! # Example
//!
//! ```rust
//! use lexdown::core::RunContext;
//! use lexdown::numbering::{NumberingOptions, number_headers};
//!
//! let mut ctx = RunContext::new(false, false);
//! let numbered = number_headers("l. Intro\nl. Terms", &NumberingOptions::default(), &mut ctx);
//! assert_eq!(numbered.content, "Article 1. Intro\nArticle 2. Terms");
//! ```

pub mod template;
pub mod tokenizer;

use serde::Serialize;

use crate::core::{DiagnosticKind, RunContext};
use crate::crossref::ReferenceMap;

pub use template::{DEFAULT_TEMPLATES, LEVEL_KEYS, LevelTemplates, NumberingMode, format_label, to_alpha, to_roman};
pub use tokenizer::{HeaderSyntax, HeaderToken, scan_headers};

/// Deepest supported header level.
pub const MAX_LEVEL: usize = 5;

/// Options for one numbering pass.
#[derive(Debug, Clone)]
pub struct NumberingOptions {
    pub templates: LevelTemplates,
    pub mode: NumberingMode,
    /// Continuous numbering: deeper counters are not reset.
    pub continuous: bool,
    /// Spaces of indentation per level below one; `None` disables indentation.
    pub level_indent: Option<f64>,
}

impl Default for NumberingOptions {
    fn default() -> Self {
        Self {
            templates: LevelTemplates::default(),
            mode: NumberingMode::Auto,
            continuous: false,
            level_indent: None,
        }
    }
}

/// One emitted header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderRecord {
    pub line: usize,
    pub level: usize,
    pub text: String,
    /// Formatted label (template output, trimmed).
    pub label: String,
    /// Counter slots at emission time.
    pub counters: [u32; MAX_LEVEL],
    pub reference: Option<String>,
}

/// Counter state machine.
#[derive(Debug, Clone, Default)]
pub struct NumberingState {
    counters: [u32; MAX_LEVEL],
    previous_level: usize,
    continuous: bool,
}

impl NumberingState {
    pub fn new(continuous: bool) -> Self {
        Self {
            continuous,
            ..Self::default()
        }
    }

    /// Advance for a header at `level` (`1..=5`) and return the counter snapshot.
    pub fn advance(&mut self, level: usize) -> [u32; MAX_LEVEL] {
        debug_assert!((1..=MAX_LEVEL).contains(&level));
        let idx = level - 1;

        // skipped intermediate levels start at 1
        for slot in &mut self.counters[..idx] {
            if *slot == 0 {
                *slot = 1;
            }
        }

        if level == MAX_LEVEL {
            if self.previous_level == MAX_LEVEL {
                self.counters[idx] += 1;
            } else {
                self.counters[idx] = 1;
            }
        } else {
            self.counters[idx] += 1;
            if !self.continuous {
                for slot in &mut self.counters[idx + 1..] {
                    *slot = 0;
                }
            }
        }

        self.previous_level = level;
        self.counters
    }

    pub fn counters(&self) -> &[u32; MAX_LEVEL] {
        &self.counters
    }
}

/// Output of the numbering pass.
#[derive(Debug, Clone, Default)]
pub struct NumberedBody {
    pub content: String,
    pub headers: Vec<HeaderRecord>,
    pub references: ReferenceMap,
}

/// Number and format every header in `body`.
pub fn number_headers(body: &str, options: &NumberingOptions, ctx: &mut RunContext) -> NumberedBody {
    let tokens = scan_headers(body);
    if tokens.is_empty() {
        return NumberedBody {
            content: body.to_string(),
            ..NumberedBody::default()
        };
    }

    let hierarchical = options.templates.resolve_mode(options.mode);
    tracing::debug!(headers = tokens.len(), hierarchical, "numbering headers");

    let mut state = NumberingState::new(options.continuous);
    let mut lines: Vec<String> = body.split('\n').map(str::to_string).collect();
    let mut headers = Vec::with_capacity(tokens.len());
    let mut references = ReferenceMap::default();

    for token in tokens {
        if !(1..=MAX_LEVEL).contains(&token.level) {
            tracing::trace!(line = token.line, level = token.level, "header level out of range, left as-is");
            continue;
        }

        let counters = state.advance(token.level);
        let label = format_label(options.templates.get(token.level), token.level, &counters, hierarchical)
            .trim()
            .to_string();

        let indent = match options.level_indent {
            Some(per_level) => " ".repeat(((token.level - 1) as f64 * per_level.max(0.0)).round() as usize),
            None => String::new(),
        };
        let mut rendered = if token.text.is_empty() {
            format!("{indent}{label}")
        } else {
            format!("{indent}{label} {}", token.text)
        };
        if lines[token.line].ends_with('\r') {
            rendered.push('\r');
        }
        lines[token.line] = rendered;

        if let Some(key) = &token.reference {
            if let Some(previous) = references.insert(key.clone(), label.clone()) {
                ctx.warn(
                    DiagnosticKind::DuplicateReference,
                    format!("reference '{key}' defined more than once; '{previous}' replaced by '{label}'"),
                );
            }
        }

        headers.push(HeaderRecord {
            line: token.line,
            level: token.level,
            text: token.text,
            label,
            counters,
            reference: token.reference,
        });
    }

    NumberedBody {
        content: lines.join("\n"),
        headers,
        references,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(body: &str, options: &NumberingOptions) -> (NumberedBody, RunContext) {
        let mut ctx = RunContext::new(false, false);
        let out = number_headers(body, options, &mut ctx);
        (out, ctx)
    }

    fn templates(overrides: [Option<&str>; 5]) -> LevelTemplates {
        let mut ctx = RunContext::new(false, false);
        LevelTemplates::new(&overrides.map(|t| t.map(str::to_string)), &mut ctx)
    }

    #[test]
    fn test_level_one_sequence() {
        let options = NumberingOptions {
            templates: templates([Some("Article %n."), None, None, None, None]),
            ..NumberingOptions::default()
        };
        let (out, _) = number("l. Intro\nl. Terms", &options);
        assert_eq!(out.content, "Article 1. Intro\nArticle 2. Terms");
    }

    #[test]
    fn test_default_nested_numbering_resets_deeper_levels() {
        let body = "l. A\nll. B\nlll. C\nlll. D\nll. E\nlll. F\nl. G\nll. H";
        let (out, _) = number(body, &NumberingOptions::default());
        assert_eq!(
            out.content,
            "Article 1. A\nSection 1. B\n(1) C\n(2) D\nSection 2. E\n(1) F\nArticle 2. G\nSection 1. H"
        );
    }

    #[test]
    fn test_continuous_numbering_keeps_deeper_counters() {
        let options = NumberingOptions {
            continuous: true,
            ..NumberingOptions::default()
        };
        let (out, _) = number("l. A\nll. B\nl. C\nll. D", &options);
        assert_eq!(out.content, "Article 1. A\nSection 1. B\nArticle 2. C\nSection 2. D");
    }

    #[test]
    fn test_skipped_levels_initialize_to_one() {
        let options = NumberingOptions {
            templates: templates([None, None, Some("%n.%s.%t"), None, None]),
            ..NumberingOptions::default()
        };
        let (out, _) = number("lll. Deep", &options);
        assert_eq!(out.content, "1.1.1 Deep");
        assert_eq!(out.headers[0].counters, [1, 1, 1, 0, 0]);
    }

    #[test]
    fn test_level_five_rules() {
        let mut state = NumberingState::new(false);
        state.advance(1);
        state.advance(4);
        assert_eq!(state.advance(5)[4], 1);
        assert_eq!(state.advance(5)[4], 2);
        assert_eq!(state.advance(5)[4], 3);
        state.advance(4);
        assert_eq!(state.counters()[3], 2);
        assert_eq!(state.advance(5)[4], 1);
    }

    #[test]
    fn test_level_five_restarts_even_in_continuous_mode() {
        let mut state = NumberingState::new(true);
        state.advance(5);
        state.advance(5);
        state.advance(4);
        assert_eq!(state.advance(5)[4], 1);
    }

    #[test]
    fn test_hierarchical_mode_applies_to_all_levels() {
        let options = NumberingOptions {
            templates: templates([Some("%n."), Some("%n.%s"), Some("%n.%s.%t"), None, None]),
            ..NumberingOptions::default()
        };
        let (out, _) = number("l. A\nll. B\nlll. C\nl. D\nll. E", &options);
        assert_eq!(out.content, "1. A\n1.1 B\n1.1.1 C\n2. D\n2.1 E");
    }

    #[test]
    fn test_explicit_flat_mode_overrides_detection() {
        let options = NumberingOptions {
            templates: templates([Some("%n."), Some("%n.%s"), Some("%n.%s.%t"), None, None]),
            mode: NumberingMode::Flat,
            ..NumberingOptions::default()
        };
        let (out, _) = number("l. A\nll. B", &options);
        assert_eq!(out.content, "1. A\n1.1 B");
        let (out, _) = number("l. A\nll. B\nll. C", &options);
        assert_eq!(out.content, "1. A\n1.1 B\n2.2 C");
    }

    #[test]
    fn test_indentation() {
        let options = NumberingOptions {
            level_indent: Some(2.0),
            ..NumberingOptions::default()
        };
        let (out, _) = number("l. A\nll. B\nlll. C", &options);
        assert_eq!(out.content, "Article 1. A\n  Section 1. B\n    (1) C");
    }

    #[test]
    fn test_out_of_range_level_passes_through() {
        let (out, _) = number("l. A\nllllll. Six\nll. B", &NumberingOptions::default());
        assert_eq!(out.content, "Article 1. A\nllllll. Six\nSection 1. B");
        assert_eq!(out.headers.len(), 2);
    }

    #[test]
    fn test_reference_labels_and_duplicates() {
        let (out, ctx) = number("l. Definitions |defs|\nl. Payment |pay|\nl. Again |defs|", &NumberingOptions::default());
        assert_eq!(out.references.get("pay"), Some("Article 2."));
        assert_eq!(out.references.get("defs"), Some("Article 3."));
        assert_eq!(ctx.diagnostics().len(), 1);
        assert_eq!(ctx.diagnostics()[0].kind, DiagnosticKind::DuplicateReference);
        assert_eq!(out.content, "Article 1. Definitions\nArticle 2. Payment\nArticle 3. Again");
    }

    #[test]
    fn test_numbering_monotonic_within_level() {
        let body: String = (0..30).map(|_| "ll. Clause\n").collect();
        let (out, _) = number(&format!("l. Top\n{body}"), &NumberingOptions::default());
        let seconds: Vec<u32> = out.headers.iter().filter(|h| h.level == 2).map(|h| h.counters[1]).collect();
        assert!(seconds.windows(2).all(|w| w[1] == w[0] + 1));
        assert_eq!(seconds.first(), Some(&1));
    }
}

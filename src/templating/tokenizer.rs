//! Single-pass placeholder scanner.
//!
//! Produces a position-ordered token stream over the body: literal text,
//! placeholders, and (for the default `{{ }}` delimiters only) block markers.
//! Extra delimiter pairs from configuration produce placeholders only.
//!
//! A placeholder never spans lines. An opening delimiter without a closing
//! delimiter on the same line is literal text. A block marker that is alone
//! on its line (apart from spaces and tabs) removes that whole line, so
//! `{{#each}}` / `{{/each}}` lines leave no blank lines behind.

use crate::config::FieldPattern;
use crate::core::{DiagnosticKind, RunContext};

pub const DEFAULT_OPEN: &str = "{{";
pub const DEFAULT_CLOSE: &str = "}}";

/// Kind of block introduced by an opening marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// `{{#name}}`: loop over a sequence or render once when truthy.
    Section,
    /// `{{#each name}}`
    Each,
    /// `{{#if name}}`
    If,
    /// `{{#unless name}}`
    Unless,
}

impl BlockKind {
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            BlockKind::Section => None,
            BlockKind::Each => Some("each"),
            BlockKind::If => Some("if"),
            BlockKind::Unless => Some("unless"),
        }
    }
}

/// One scanned token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Text(String),
    Field {
        expr: String,
        raw: String,
    },
    Open {
        kind: BlockKind,
        name: String,
        raw: String,
    },
    Else {
        raw: String,
    },
    Close {
        name: String,
        raw: String,
    },
}

/// The set of placeholder delimiter pairs for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    pairs: Vec<(String, String)>,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            pairs: vec![(DEFAULT_OPEN.to_string(), DEFAULT_CLOSE.to_string())],
        }
    }
}

impl Delimiters {
    /// Default delimiters plus valid custom pairs.
    ///
    /// Pairs with an empty side, or identical to the default pair, are
    /// skipped; empty ones produce an `InvalidFieldPattern` diagnostic.
    pub fn with_patterns(patterns: &[FieldPattern], ctx: &mut RunContext) -> Self {
        let mut delimiters = Self::default();
        for pattern in patterns {
            if let Err(e) = pattern.validate() {
                ctx.warn(DiagnosticKind::InvalidFieldPattern, e.to_string());
                continue;
            }
            let pair = (pattern.open.clone(), pattern.close.clone());
            if !delimiters.pairs.contains(&pair) {
                delimiters.pairs.push(pair);
            }
        }
        // longest opener first so `{{{` style pairs win over `{{`
        delimiters.pairs[1..].sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        delimiters
    }

    fn is_default(&self, index: usize) -> bool {
        index == 0
    }

    /// Earliest opening delimiter at or after `from`: (position, pair index).
    fn next_open(&self, src: &str, from: usize) -> Option<(usize, usize)> {
        let mut best: Option<(usize, usize)> = None;
        for (i, (open, _)) in self.pairs.iter().enumerate() {
            if let Some(pos) = src[from..].find(open.as_str()) {
                let pos = from + pos;
                let better = match best {
                    None => true,
                    Some((best_pos, best_i)) => {
                        pos < best_pos || (pos == best_pos && open.len() > self.pairs[best_i].0.len())
                    }
                };
                if better {
                    best = Some((pos, i));
                }
            }
        }
        best
    }
}

/// Scan `src` into tokens.
pub fn tokenize(src: &str, delimiters: &Delimiters) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut cursor = 0;

    while let Some((start, pair)) = delimiters.next_open(src, cursor) {
        let (open, close) = &delimiters.pairs[pair];
        let inner_start = start + open.len();
        let line_end = src[inner_start..].find('\n').map_or(src.len(), |p| inner_start + p);

        let Some(close_rel) = src[inner_start..line_end].find(close.as_str()) else {
            text.push_str(&src[cursor..inner_start]);
            cursor = inner_start;
            continue;
        };
        let inner_end = inner_start + close_rel;
        let end = inner_end + close.len();
        let inner = src[inner_start..inner_end].trim();
        let raw = &src[start..end];

        if inner.is_empty() {
            text.push_str(&src[cursor..end]);
            cursor = end;
            continue;
        }

        text.push_str(&src[cursor..start]);
        if !text.is_empty() {
            tokens.push(Token::Text(std::mem::take(&mut text)));
        }

        let token = if delimiters.is_default(pair) {
            classify(inner, raw)
        } else {
            Token::Field {
                expr: inner.to_string(),
                raw: raw.to_string(),
            }
        };
        tokens.push(token);
        cursor = end;
    }

    text.push_str(&src[cursor..]);
    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }
    trim_standalone_markers(tokens)
}

fn is_marker(token: &Token) -> bool {
    matches!(token, Token::Open { .. } | Token::Else { .. } | Token::Close { .. })
}

fn is_blank(s: &str) -> bool {
    s.chars().all(|c| c == ' ' || c == '\t' || c == '\r')
}

/// Drop the line of every block marker that stands alone on it.
fn trim_standalone_markers(mut tokens: Vec<Token>) -> Vec<Token> {
    let last = tokens.len().saturating_sub(1);
    let standalone: Vec<bool> = (0..tokens.len())
        .map(|i| {
            if !is_marker(&tokens[i]) {
                return false;
            }
            let before = match i.checked_sub(1).map(|j| &tokens[j]) {
                None => true,
                Some(Token::Text(t)) => match t.rfind('\n') {
                    Some(p) => is_blank(&t[p + 1..]),
                    None => i == 1 && is_blank(t),
                },
                Some(_) => false,
            };
            let after = match tokens.get(i + 1) {
                None => true,
                Some(Token::Text(t)) => match t.find('\n') {
                    Some(p) => is_blank(&t[..p]),
                    None => i + 1 == last && is_blank(t),
                },
                Some(_) => false,
            };
            before && after
        })
        .collect();

    for (i, _) in standalone.iter().enumerate().filter(|(_, s)| **s) {
        if let Some(Token::Text(t)) = i.checked_sub(1).and_then(|j| tokens.get_mut(j)) {
            let keep = t.rfind('\n').map_or(0, |p| p + 1);
            t.truncate(keep);
        }
        if let Some(Token::Text(t)) = tokens.get_mut(i + 1) {
            match t.find('\n') {
                Some(p) => {
                    t.drain(..=p);
                }
                None => t.clear(),
            }
        }
    }

    tokens.retain(|t| !matches!(t, Token::Text(s) if s.is_empty()));
    tokens
}

/// Decide whether default-delimited content is a block marker.
fn classify(inner: &str, raw: &str) -> Token {
    let raw = raw.to_string();
    if inner == "else" {
        return Token::Else {
            raw,
        };
    }
    if let Some(name) = inner.strip_prefix('/') {
        return Token::Close {
            name: name.trim().to_string(),
            raw,
        };
    }
    if let Some(rest) = inner.strip_prefix('#') {
        let rest = rest.trim();
        let (kind, name) = match rest.split_once(char::is_whitespace) {
            Some(("each", name)) => (BlockKind::Each, name.trim()),
            Some(("if", name)) => (BlockKind::If, name.trim()),
            Some(("unless", name)) => (BlockKind::Unless, name.trim()),
            _ => (BlockKind::Section, rest),
        };
        return Token::Open {
            kind,
            name: name.to_string(),
            raw,
        };
    }
    Token::Field {
        expr: inner.to_string(),
        raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(expr: &str, raw: &str) -> Token {
        Token::Field {
            expr: expr.into(),
            raw: raw.into(),
        }
    }

    #[test]
    fn test_text_and_fields() {
        let tokens = tokenize("Hello {{ name }}!", &Delimiters::default());
        assert_eq!(
            tokens,
            vec![Token::Text("Hello ".into()), field("name", "{{ name }}"), Token::Text("!".into())]
        );
    }

    #[test]
    fn test_block_markers() {
        let tokens = tokenize("{{#items}}{{name}}{{else}}none{{/items}}{{#each a}}{{#if b}}", &Delimiters::default());
        assert!(matches!(&tokens[0], Token::Open { kind: BlockKind::Section, name, .. } if name == "items"));
        assert_eq!(tokens[1], field("name", "{{name}}"));
        assert!(matches!(&tokens[2], Token::Else { .. }));
        assert!(matches!(&tokens[4], Token::Close { name, .. } if name == "items"));
        assert!(matches!(&tokens[5], Token::Open { kind: BlockKind::Each, name, .. } if name == "a"));
        assert!(matches!(&tokens[6], Token::Open { kind: BlockKind::If, name, .. } if name == "b"));
    }

    #[test]
    fn test_unclosed_and_empty_placeholders_are_text() {
        let tokens = tokenize("a {{ b\n}} c {{}} d", &Delimiters::default());
        assert_eq!(tokens, vec![Token::Text("a {{ b\n}} c {{}} d".into())]);
    }

    #[test]
    fn test_standalone_markers_take_their_line() {
        let tokens = tokenize("{{#each items}}\n- {{this}}\n  {{/each}}  \nafter", &Delimiters::default());
        assert!(matches!(&tokens[0], Token::Open { kind: BlockKind::Each, .. }));
        assert_eq!(tokens[1], Token::Text("- ".into()));
        assert_eq!(tokens[2], field("this", "{{this}}"));
        assert_eq!(tokens[3], Token::Text("\n".into()));
        assert!(matches!(&tokens[4], Token::Close { .. }));
        assert_eq!(tokens[5], Token::Text("after".into()));
    }

    #[test]
    fn test_inline_markers_keep_surrounding_text() {
        let tokens = tokenize("a {{#if x}}b{{/if}} c\n", &Delimiters::default());
        assert_eq!(tokens[0], Token::Text("a ".into()));
        assert_eq!(tokens[2], Token::Text("b".into()));
        assert_eq!(tokens[4], Token::Text(" c\n".into()));
    }

    #[test]
    fn test_custom_delimiters() {
        let mut ctx = RunContext::new(false, false);
        let patterns = vec![
            FieldPattern::new("<<", ">>"),
            FieldPattern::new("", "]]"),
        ];
        let delimiters = Delimiters::with_patterns(&patterns, &mut ctx);
        let tokens = tokenize("<<client>> and {{fee}} and <<#x>>", &delimiters);
        assert_eq!(tokens[0], field("client", "<<client>>"));
        assert_eq!(tokens[2], field("fee", "{{fee}}"));
        assert_eq!(tokens[4], field("#x", "<<#x>>"));
        assert_eq!(ctx.diagnostics().len(), 1);
        assert_eq!(ctx.diagnostics()[0].kind, DiagnosticKind::InvalidFieldPattern);
    }
}

//! Single-pass header scan.
//!
//! Produces a line-ordered stream of [`HeaderToken`]s. Two surface syntaxes
//! map to the same `(level, text)` pair:
//!
//! ```text
//! l. Definitions          lll. Notices |notices|
//! l1. Definitions         l3. Notices |notices|
//! ```
//!
//! Fenced code blocks are skipped.

use regex::Regex;
use std::sync::LazyLock;

/// Trailing `|key|` that attaches a reference key to a header.
static REFERENCE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\|([A-Za-z0-9_.\-]+)\|\s*$").expect("valid regex"));

/// Which surface syntax introduced a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderSyntax {
    /// `l.`, `ll.`, `lll.` ...
    Repeated,
    /// `l1.`, `l2.` ...
    Numbered,
}

/// One header occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderToken {
    /// Zero-based line index in the body.
    pub line: usize,
    /// Declared level. May be outside `1..=5`.
    pub level: usize,
    pub syntax: HeaderSyntax,
    /// Header text with the marker and reference key removed.
    pub text: String,
    pub reference: Option<String>,
}

/// Scan `body` for header lines.
pub fn scan_headers(body: &str) -> Vec<HeaderToken> {
    let mut tokens = Vec::new();
    let mut fence: Option<&str> = None;

    for (line_no, line) in body.split('\n').enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let trimmed = line.trim_start();

        if let Some(marker) = fence {
            if trimmed.starts_with(marker) {
                fence = None;
            }
            continue;
        }
        if trimmed.starts_with("```") {
            fence = Some("```");
            continue;
        }
        if trimmed.starts_with("~~~") {
            fence = Some("~~~");
            continue;
        }

        if let Some(token) = parse_header_line(line_no, trimmed) {
            tokens.push(token);
        }
    }

    tokens
}

/// Recognize a header marker at the start of an (already left-trimmed) line.
fn parse_header_line(line: usize, trimmed: &str) -> Option<HeaderToken> {
    let letters = trimmed.bytes().take_while(|&b| b == b'l').count();
    if letters == 0 {
        return None;
    }
    let after_letters = &trimmed[letters..];

    let (level, syntax, rest) = if let Some(rest) = after_letters.strip_prefix('.') {
        (letters, HeaderSyntax::Repeated, rest)
    } else if letters == 1 {
        let digits = after_letters.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        let rest = after_letters[digits..].strip_prefix('.')?;
        let level = after_letters[..digits].parse().ok()?;
        (level, HeaderSyntax::Numbered, rest)
    } else {
        return None;
    };

    // the marker must be followed by whitespace or end the line
    if !(rest.is_empty() || rest.starts_with([' ', '\t'])) {
        return None;
    }

    let mut text = rest.trim().to_string();
    let mut reference = None;
    if let Some(caps) = REFERENCE_SUFFIX.captures(&text) {
        reference = Some(caps[1].to_string());
        let start = caps.get(0).map_or(text.len(), |m| m.start());
        text.truncate(start);
    }

    Some(HeaderToken {
        line,
        level,
        syntax,
        text,
        reference,
    })
}

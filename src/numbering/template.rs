//! Level templates and label formatting.
//!
//! # Placeholder tokens
//!
//! | Token | Meaning |
//! |---|---|
//! | `%n` | current level's number (level one's in hierarchical mode) |
//! | `%s` `%t` `%f` `%i` | level 2, 3, 4, 5 numbers |
//! | `%c` | current level as lowercase letters (`a`, ..., `z`, `aa`) |
//! | `%r` | current level as lowercase roman numerals |
//! | `%0Nn` ... `%0Ni` | zero-padded numeric variants, width `N` |
//! | `%%` | a literal `%` |
//!
//! Anything else after `%` is copied verbatim.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::core::{DiagnosticKind, RunContext};

/// Default templates for levels one to five.
pub const DEFAULT_TEMPLATES: [&str; 5] = ["Article %n.", "Section %n.", "(%n)", "(%c)", "(%r)"];

/// Metadata / config key names for each level's template.
pub const LEVEL_KEYS: [&str; 5] = ["level-one", "level-two", "level-three", "level-four", "level-five"];

/// `%n.%s.%t` (with optional zero padding) in the level-three template.
static CHAINED_LEVEL_THREE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%(?:0\d+)?n\.%(?:0\d+)?s\.%(?:0\d+)?t").expect("valid regex")
});

/// How `%n` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberingMode {
    /// Infer from the level-three template (see [`LevelTemplates::resolve_mode`]).
    #[default]
    Auto,
    /// `%n` is always the current level's number.
    Flat,
    /// `%n` is always level one's number (`1.2.3` style numbering).
    Hierarchical,
}

impl std::str::FromStr for NumberingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(NumberingMode::Auto),
            "flat" => Ok(NumberingMode::Flat),
            "hierarchical" | "academic" => Ok(NumberingMode::Hierarchical),
            other => Err(format!("unknown numbering mode '{other}'")),
        }
    }
}

/// The five per-level templates for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelTemplates {
    templates: [String; 5],
}

impl Default for LevelTemplates {
    fn default() -> Self {
        Self {
            templates: DEFAULT_TEMPLATES.map(str::to_string),
        }
    }
}

impl LevelTemplates {
    /// Build templates from optional overrides, defaulting absent or blank ones.
    ///
    /// Blank overrides produce an `InvalidTemplate` diagnostic.
    pub fn new(overrides: &[Option<String>; 5], ctx: &mut RunContext) -> Self {
        let mut templates = Self::default();
        for (i, template) in overrides.iter().enumerate() {
            match template {
                Some(t) if t.trim().is_empty() => ctx.warn(
                    DiagnosticKind::InvalidTemplate,
                    format!("'{}' is empty; using default '{}'", LEVEL_KEYS[i], DEFAULT_TEMPLATES[i]),
                ),
                Some(t) => templates.templates[i] = t.clone(),
                None => {}
            }
        }
        templates
    }

    /// Template for a level in `1..=5`.
    pub fn get(&self, level: usize) -> &str {
        &self.templates[level.clamp(1, 5) - 1]
    }

    /// Decide whether `%n` means level one for every level of this document.
    ///
    /// In `Auto` mode the document is hierarchical when the level-three
    /// template chains `%n.%s.%t`. The decision is made once and applies to
    /// all five templates.
    pub fn resolve_mode(&self, requested: NumberingMode) -> bool {
        match requested {
            NumberingMode::Flat => false,
            NumberingMode::Hierarchical => true,
            NumberingMode::Auto => is_chained(self.get(3)),
        }
    }
}

/// True when a template chains level numbers like `%n.%s.%t`.
pub fn is_chained(template: &str) -> bool {
    CHAINED_LEVEL_THREE.is_match(template)
}

/// Render a label from a template and the counter snapshot.
///
/// # Arguments
/// * `template` - the level's template
/// * `level` - current level, `1..=5`
/// * `counters` - the five counter slots at emission time
/// * `hierarchical` - whether `%n` refers to level one
pub fn format_label(template: &str, level: usize, counters: &[u32; 5], hierarchical: bool) -> String {
    let current = counters[level.clamp(1, 5) - 1];
    let number_for = |token: char| -> Option<u32> {
        match token {
            'n' if hierarchical => Some(counters[0]),
            'n' => Some(current),
            's' => Some(counters[1]),
            't' => Some(counters[2]),
            'f' => Some(counters[3]),
            'i' => Some(counters[4]),
            _ => None,
        }
    };

    let mut out = String::with_capacity(template.len() + 8);
    let mut chars = template.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }

        let rest = &template[pos + 1..];
        match rest.chars().next() {
            Some('%') => {
                out.push('%');
                chars.next();
            }
            Some('c') => {
                out.push_str(&to_alpha(current));
                chars.next();
            }
            Some('r') => {
                out.push_str(&to_roman(current));
                chars.next();
            }
            Some('0') => {
                let digits: String = rest[1..].chars().take_while(char::is_ascii_digit).collect();
                let token = rest[1 + digits.len()..].chars().next();
                match (digits.parse::<usize>(), token.and_then(number_for)) {
                    (Ok(width), Some(n)) => {
                        out.push_str(&format!("{n:0width$}"));
                        // skip '0', the width digits and the token letter
                        for _ in 0..digits.len() + 2 {
                            chars.next();
                        }
                    }
                    _ => out.push('%'),
                }
            }
            Some(token) => match number_for(token) {
                Some(n) => {
                    out.push_str(&n.to_string());
                    chars.next();
                }
                None => out.push('%'),
            },
            None => out.push('%'),
        }
    }

    out
}

/// 1 → `a`, 26 → `z`, 27 → `aa`. Zero renders as the empty string.
pub fn to_alpha(mut n: u32) -> String {
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push((b'a' + (n % 26) as u8) as char);
        n /= 26;
    }
    letters.iter().rev().collect()
}

/// Lowercase roman numerals. Zero renders as the empty string.
pub fn to_roman(mut n: u32) -> String {
    const TABLE: [(u32, &str); 13] = [
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];

    let mut out = String::new();
    for (value, numeral) in TABLE {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    out
}

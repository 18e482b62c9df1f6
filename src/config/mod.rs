//! Processing configuration.
//!
//! A [`ProcessingConfig`] is assembled in layers:
//!
//! 1. Built-in defaults
//! 2. An optional TOML file (`--config lexdown.toml`)
//! 3. Layout keys in the main document's own metadata block
//!    (see [`ProcessingConfig::from_metadata`])
//!
//! ```toml
//! level-one = "Article %n."
//! level-two = "Section %n.%s"
//! level-three = "%n.%s.%t"
//! level-indent = 1.5
//! numbering-mode = "auto"
//! enable-field-tracking = true
//!
//! [[field-patterns]]
//! open = "<<"
//! close = ">>"
//! ```

mod parser;

pub use parser::{parse_config, parse_config_str};

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::{LexdownError, Result, RunContext};
use crate::metadata::{MetadataStore, Value};
use crate::numbering::{LEVEL_KEYS, LevelTemplates, NumberingMode, NumberingOptions};

/// Default indentation, in spaces, per level below one.
pub const DEFAULT_LEVEL_INDENT: f64 = 2.0;

/// An extra placeholder delimiter pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPattern {
    pub open: String,
    pub close: String,
}

impl FieldPattern {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    /// Delimiters must be non-empty and free of whitespace and newlines.
    pub fn validate(&self) -> Result<()> {
        let reject = |reason: &str| {
            Err(LexdownError::InvalidFieldPattern {
                open: self.open.clone(),
                close: self.close.clone(),
                reason: reason.to_string(),
            })
        };
        if self.open.is_empty() || self.close.is_empty() {
            return reject("delimiters must not be empty");
        }
        if self.open.chars().chain(self.close.chars()).any(char::is_whitespace) {
            return reject("delimiters must not contain whitespace");
        }
        Ok(())
    }
}

/// Options for one document run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProcessingConfig {
    pub level_one: Option<String>,
    pub level_two: Option<String>,
    pub level_three: Option<String>,
    pub level_four: Option<String>,
    pub level_five: Option<String>,

    /// Spaces of indentation per level below one.
    pub level_indent: f64,

    /// Continuous numbering: deeper counters are not reset.
    pub no_reset: bool,

    pub no_indent: bool,

    pub disable_frontmatter_merge: bool,

    /// Report type mismatches between main and imported metadata.
    pub validate_types: bool,

    /// Record added / overridden / filtered keys during merge.
    pub log_imports: bool,

    pub enable_field_tracking: bool,

    /// Wrap substituted text with status markup.
    pub highlight: bool,

    /// Fail on malformed metadata instead of degrading.
    pub strict: bool,

    pub numbering_mode: NumberingMode,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub field_patterns: Vec<FieldPattern>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            level_one: None,
            level_two: None,
            level_three: None,
            level_four: None,
            level_five: None,
            level_indent: DEFAULT_LEVEL_INDENT,
            no_reset: false,
            no_indent: false,
            disable_frontmatter_merge: false,
            validate_types: true,
            log_imports: false,
            enable_field_tracking: true,
            highlight: false,
            strict: false,
            numbering_mode: NumberingMode::Auto,
            field_patterns: Vec::new(),
        }
    }
}

impl ProcessingConfig {
    /// Load and validate a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = parse_config(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<()> {
        if !self.level_indent.is_finite() || self.level_indent < 0.0 {
            return Err(LexdownError::InvalidConfig {
                reason: format!("level-indent must be a non-negative number, got {}", self.level_indent),
            });
        }
        for pattern in &self.field_patterns {
            pattern.validate()?;
        }
        Ok(())
    }

    pub fn level_templates(&self) -> [Option<String>; 5] {
        [
            self.level_one.clone(),
            self.level_two.clone(),
            self.level_three.clone(),
            self.level_four.clone(),
            self.level_five.clone(),
        ]
    }

    fn level_slot(&mut self, level: usize) -> &mut Option<String> {
        match level {
            1 => &mut self.level_one,
            2 => &mut self.level_two,
            3 => &mut self.level_three,
            4 => &mut self.level_four,
            _ => &mut self.level_five,
        }
    }

    /// Overlay layout keys from the main document's metadata.
    ///
    /// Recognized keys: `level-one` .. `level-five`, `level-indent`,
    /// `no-reset`, `no-indent`, `numbering-mode`. Values of the wrong type are
    /// ignored with a warning.
    #[must_use]
    pub fn from_metadata(&self, metadata: &MetadataStore) -> Self {
        let mut config = self.clone();

        for (i, key) in LEVEL_KEYS.iter().enumerate() {
            match metadata.get(key) {
                None | Some(Value::Null) => {}
                Some(Value::Mapping(_) | Value::Sequence(_)) => {
                    tracing::warn!("Ignoring '{key}': expected a template string");
                }
                Some(value) => *config.level_slot(i + 1) = Some(value.to_string()),
            }
        }

        if let Some(value) = metadata.get("level-indent") {
            match value.as_f64() {
                Some(n) if n.is_finite() && n >= 0.0 => config.level_indent = n,
                _ => tracing::warn!("Ignoring 'level-indent': expected a non-negative number, got '{value}'"),
            }
        }

        for (key, slot) in [("no-reset", &mut config.no_reset), ("no-indent", &mut config.no_indent)] {
            if let Some(value) = metadata.get(key) {
                match value.as_bool() {
                    Some(b) => *slot = b,
                    None => tracing::warn!("Ignoring '{key}': expected true or false, got '{value}'"),
                }
            }
        }

        if let Some(value) = metadata.get("numbering-mode") {
            match value.to_string().parse() {
                Ok(mode) => config.numbering_mode = mode,
                Err(e) => tracing::warn!("Ignoring 'numbering-mode': {e}"),
            }
        }

        config
    }

    /// Numbering options for this configuration.
    pub fn numbering_options(&self, ctx: &mut RunContext) -> NumberingOptions {
        NumberingOptions {
            templates: LevelTemplates::new(&self.level_templates(), ctx),
            mode: self.numbering_mode,
            continuous: self.no_reset,
            level_indent: (!self.no_indent).then_some(self.level_indent),
        }
    }
}

//! Field-tracking ledger.
//!
//! Every placeholder the evaluator resolves (or fails to resolve) and every
//! cross-reference the resolver substitutes is recorded here. The ledger is
//! owned by the per-run [`RunContext`](crate::core::RunContext), so two
//! documents processed at the same time never share one.
//!
//! # Status rules
//!
//! A field's status is a pure function of the resolved value and whether
//! logic was involved:
//! - `logic` if a helper, ternary or cross-reference produced it
//! - otherwise `empty` if the value is absent, null or the empty string
//! - otherwise `filled`
//!
//! # Example
//!
//! ```rust
//! use lexdown::metadata::Value;
//! use lexdown::tracking::{FieldStatus, FieldTracker};
//!
//! let mut tracker = FieldTracker::new(true);
//! tracker.record("name", Some(&Value::from("Acme")), "{{name}}", false);
//! tracker.record("missing", None, "{{missing}}", false);
//!
//! let report = tracker.report();
//! assert_eq!(report.total, 2);
//! assert_eq!(report.filled, 1);
//! assert_eq!(report.empty, 1);
//! ```

use serde::Serialize;
use std::collections::HashMap;

use crate::metadata::Value;

/// Prefix every highlight wrapper starts with; used as the double-wrap guard.
const HIGHLIGHT_PREFIX: &str = "<span class=\"legal-field";

/// Resolution status of a tracked field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldStatus {
    Filled,
    Empty,
    Logic,
}

impl FieldStatus {
    #[must_use]
    pub fn classify(value: Option<&Value>, has_logic: bool) -> Self {
        if has_logic {
            FieldStatus::Logic
        } else if value.is_none_or(Value::is_blank) {
            FieldStatus::Empty
        } else {
            FieldStatus::Filled
        }
    }

    /// CSS class used by the highlight markup.
    pub fn css_class(self) -> &'static str {
        match self {
            FieldStatus::Filled => "imported-value",
            FieldStatus::Empty => "missing-value",
            FieldStatus::Logic => "highlight",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldStatus::Filled => "filled",
            FieldStatus::Empty => "empty",
            FieldStatus::Logic => "logic",
        }
    }
}

/// One tracked field (last write wins, occurrences accumulate).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedField {
    pub name: String,
    pub status: FieldStatus,
    pub value: Option<Value>,
    /// The unresolved placeholder text as it appeared in the source.
    pub original_value: String,
    pub has_logic: bool,
    pub occurrences: usize,
}

/// Summary consumed by highlighting and quality-gate tooling.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldReport {
    pub total: usize,
    pub filled: usize,
    pub empty: usize,
    pub logic: usize,
    pub fields: Vec<TrackedField>,
}

impl FieldReport {
    /// Fields a reviewer still has to fill in.
    pub fn missing(&self) -> impl Iterator<Item = &TrackedField> {
        self.fields.iter().filter(|f| f.status == FieldStatus::Empty)
    }

    /// Share of fields that are not empty, in `0.0..=1.0` (1.0 for no fields).
    pub fn completeness(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            (self.total - self.empty) as f64 / self.total as f64
        }
    }
}

/// Run-scoped field registry.
#[derive(Debug, Default)]
pub struct FieldTracker {
    enabled: bool,
    fields: Vec<TrackedField>,
    index: HashMap<String, usize>,
}

impl FieldTracker {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record one occurrence of a field and return its status.
    ///
    /// The status is computed even when tracking is disabled so callers can
    /// still decide how to render the occurrence.
    pub fn record(
        &mut self,
        name: &str,
        value: Option<&Value>,
        original: &str,
        has_logic: bool,
    ) -> FieldStatus {
        let status = FieldStatus::classify(value, has_logic);
        if !self.enabled {
            return status;
        }

        tracing::trace!(field = name, status = status.as_str(), "tracked field");

        match self.index.get(name) {
            Some(&i) => {
                let field = &mut self.fields[i];
                field.status = status;
                field.value = value.cloned();
                field.original_value = original.to_string();
                field.has_logic = has_logic;
                field.occurrences += 1;
            }
            None => {
                self.index.insert(name.to_string(), self.fields.len());
                self.fields.push(TrackedField {
                    name: name.to_string(),
                    status,
                    value: value.cloned(),
                    original_value: original.to_string(),
                    has_logic,
                    occurrences: 1,
                });
            }
        }
        status
    }

    pub fn get(&self, name: &str) -> Option<&TrackedField> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    #[must_use]
    pub fn report(&self) -> FieldReport {
        let count = |status| self.fields.iter().filter(|f| f.status == status).count();
        FieldReport {
            total: self.fields.len(),
            filled: count(FieldStatus::Filled),
            empty: count(FieldStatus::Empty),
            logic: count(FieldStatus::Logic),
            fields: self.fields.clone(),
        }
    }

    /// Clear every recorded field. Called at the start of each run.
    pub fn reset(&mut self) {
        self.fields.clear();
        self.index.clear();
    }
}

/// Wrap resolved text with status-tagged markup.
///
/// Text that is already wrapped is returned unchanged.
#[must_use]
pub fn wrap_field(text: &str, name: &str, status: FieldStatus) -> String {
    if text.starts_with(HIGHLIGHT_PREFIX) {
        return text.to_string();
    }
    format!(
        "{HIGHLIGHT_PREFIX} {}\" data-field=\"{}\">{}</span>",
        status.css_class(),
        escape_attribute(name),
        text
    )
}

fn escape_attribute(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;").replace('<', "&lt;").replace('>', "&gt;")
}

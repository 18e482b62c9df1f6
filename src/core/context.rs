//! Per-run context for one document.
//!
//! [`RunContext`] is created at the start of [`process_document`] and passed
//! explicitly through every pass. It owns the field ledger and the diagnostics
//! list, so nothing in the engine holds process-wide mutable state and
//! documents can be processed concurrently without coordination.
//!
//! [`process_document`]: crate::pipeline::process_document

use super::diagnostic::{Diagnostic, DiagnosticKind};
use crate::tracking::{FieldReport, FieldStatus, FieldTracker, wrap_field};

/// Context for a single document run.
#[derive(Debug, Default)]
pub struct RunContext {
    tracker: FieldTracker,
    diagnostics: Vec<Diagnostic>,
    highlight: bool,
}

impl RunContext {
    /// Create a fresh context.
    ///
    /// # Arguments
    /// * `track_fields` - record resolved fields in the ledger
    /// * `highlight` - wrap substituted text with status markup
    #[must_use]
    pub fn new(track_fields: bool, highlight: bool) -> Self {
        Self {
            tracker: FieldTracker::new(track_fields),
            diagnostics: Vec::new(),
            highlight,
        }
    }

    /// Clear the ledger and diagnostics so the context can start a new run.
    pub fn reset(&mut self) {
        self.tracker.reset();
        self.diagnostics.clear();
    }

    pub fn tracker(&self) -> &FieldTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut FieldTracker {
        &mut self.tracker
    }

    pub fn highlight(&self) -> bool {
        self.highlight
    }

    /// Apply highlight markup to a substitution when highlighting is enabled.
    pub fn present(&self, text: &str, field: &str, status: FieldStatus) -> String {
        if self.highlight {
            wrap_field(text, field, status)
        } else {
            text.to_string()
        }
    }

    pub fn warn(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let diagnostic = Diagnostic::warning(kind, message);
        tracing::debug!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }

    pub fn info(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let diagnostic = Diagnostic::info(kind, message);
        tracing::debug!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }

    pub fn extend_diagnostics(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Finish the run, returning the field report and the collected diagnostics.
    pub fn finish(self) -> (FieldReport, Vec<Diagnostic>) {
        (self.tracker.report(), self.diagnostics)
    }
}

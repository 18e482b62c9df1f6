//! Non-fatal diagnostics collected during a document run.
//!
//! Local failures (a missing field, an unknown helper, a reference key defined
//! twice, an import trying to set a reserved key) never abort processing. They
//! are recorded here so the host can log them, and the document is still
//! rendered with the problem visible in the output.

use serde::Serialize;
use std::fmt;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

/// What kind of problem a diagnostic describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    MalformedMetadata,
    TypeMismatch,
    ReservedKeyFiltered,
    DuplicateReference,
    UnknownHelper,
    HelperFailed,
    InvalidTemplate,
    InvalidFieldPattern,
    InvalidExpression,
    UnbalancedBlock,
    MissingField,
}

/// A single non-fatal finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            message: message.into(),
        }
    }

    pub fn info(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
        };
        write!(f, "{level}: {}", self.message)
    }
}

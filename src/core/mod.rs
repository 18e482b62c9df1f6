//! Core types shared by every pass.
//!
//! - [`error`] - [`LexdownError`], [`ErrorContext`] and [`user_friendly_error`]
//! - [`diagnostic`] - non-fatal [`Diagnostic`] records
//! - [`context`] - the per-run [`RunContext`] carrying the field ledger
//!
//! # Error Handling Pattern
//!
//! Only structurally invalid input in strict mode, or an unusable
//! configuration, surfaces as a [`LexdownError`]. Everything else degrades
//! gracefully and is reported through [`RunContext::warn`].

pub mod context;
pub mod diagnostic;
pub mod error;

pub use context::RunContext;
pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use error::{ErrorContext, LexdownError, Result, user_friendly_error};

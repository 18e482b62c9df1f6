//! Integration test suite for lexdown
//!
//! End-to-end tests of the public pipeline API and the `lexdown` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **pipeline**: `process_document` over complete documents
//! - **numbering**: header numbering and cross references through the pipeline
//! - **merge**: imported metadata and reserved keys
//! - **templates**: placeholders, helpers, loops and the field report
//! - **batch**: concurrent processing of many documents
//! - **cli**: the `render`, `report` and `batch` commands

mod batch;
mod cli;
mod merge;
mod numbering;
mod pipeline;
mod templates;

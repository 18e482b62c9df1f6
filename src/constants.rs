//! Constants shared by the pipeline and the CLI.

/// Default CPU core count when detection fails.
///
/// Used as a fallback when `std::thread::available_parallelism()` returns an error.
pub const FALLBACK_CORE_COUNT: usize = 4;

/// Upper bound for `--max-parallel`.
pub const MAX_PARALLELISM: usize = 256;

/// File extensions treated as documents by `lexdown batch`.
pub const DOCUMENT_EXTENSIONS: &[&str] = &["md", "markdown", "lmd"];

/// Extension written by `lexdown batch` for rendered output.
pub const OUTPUT_EXTENSION: &str = "md";

/// Default number of documents processed at once: one per core.
pub fn default_max_parallel() -> usize {
    std::thread::available_parallelism().map(std::num::NonZero::get).unwrap_or(FALLBACK_CORE_COUNT)
}

//! Test utilities for lexdown
//!
//! Logging setup and document fixtures shared by unit and integration tests.
//!
//! # Example
//!
//! ```rust,no_run
//! use lexdown::test_utils::{DocumentFixture, init_test_logging};
//!
//! init_test_logging(None);
//! let dir = tempfile::tempdir().unwrap();
//! let path = DocumentFixture::services_agreement("msa").write_to(dir.path()).unwrap();
//! assert!(path.exists());
//! ```

pub mod fixtures;

pub use fixtures::{DocumentFixture, ImportFixture};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. With `None`, logging is enabled only
/// when `RUST_LOG` is set.
///
/// ```bash
/// RUST_LOG=lexdown=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

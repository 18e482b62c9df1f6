//! Generic TOML configuration parsing.
//!
//! ```rust,no_run
//! use lexdown::config::{ProcessingConfig, parse_config};
//! use std::path::Path;
//!
//! # fn example() -> lexdown::core::Result<()> {
//! let config: ProcessingConfig = parse_config(Path::new("lexdown.toml"))?;
//! println!("level one renders as {:?}", config.level_one);
//! # Ok(())
//! # }
//! ```

use serde::de::DeserializeOwned;
use std::path::Path;

use crate::core::Result;

/// Parse a TOML configuration file into `T`.
///
/// # Errors
///
/// Returns [`LexdownError::Io`](crate::core::LexdownError::Io) when the file
/// cannot be read and [`LexdownError::ConfigParse`](crate::core::LexdownError::ConfigParse)
/// when it is not valid TOML for `T`.
pub fn parse_config<T: DeserializeOwned>(path: &Path) -> Result<T> {
    tracing::debug!("Loading configuration from {}", path.display());
    let content = std::fs::read_to_string(path)?;
    parse_config_str(&content)
}

/// Parse TOML text into `T`.
pub fn parse_config_str<T: DeserializeOwned>(content: &str) -> Result<T> {
    Ok(toml::from_str(content)?)
}

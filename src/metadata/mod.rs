//! Metadata substrate shared by every pass.
//!
//! - [`value`] - the tagged [`Value`] type and ordered [`Mapping`]
//! - [`path`] - dotted / indexed [`FieldPath`]s
//! - [`store`] - the per-run [`MetadataStore`]
//! - [`reserved`] - keys imported documents may not set

pub mod path;
pub mod reserved;
pub mod store;
pub mod value;

pub use path::{FieldPath, Segment};
pub use reserved::{RESERVED_KEYS, RESERVED_PREFIXES, is_reserved_key};
pub use store::MetadataStore;
pub use value::{Mapping, Value, ValueKind};

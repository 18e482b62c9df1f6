//! Frontmatter merging.
//!
//! Imported metadata is folded into the main document's metadata one import
//! at a time, in document order. The rules:
//!
//! - A key absent from the accumulated store is added.
//! - A key already present keeps its value (the main document, then earlier
//!   imports, win). Nested mappings are merged key by key; sequences and
//!   scalars are never merged element-wise.
//! - Reserved keys ([`is_reserved_key`]) are removed from every import
//!   before anything is written.
//!
//! # Example
//!
//! ```rust
//! use lexdown::markdown::frontmatter::parse_metadata;
//! use lexdown::merge::{MergeOptions, merge_frontmatter};
//!
//! let main = parse_metadata("cap: 500\n").unwrap();
//! let import = parse_metadata("cap: 2000\nclient: X\n").unwrap();
//!
//! let outcome = merge_frontmatter(&main, &[import], &MergeOptions::default());
//! assert_eq!(outcome.store.get("cap").unwrap().to_string(), "500");
//! assert_eq!(outcome.store.get("client").unwrap().to_string(), "X");
//! ```

use serde::Serialize;

use crate::core::{Diagnostic, DiagnosticKind};
use crate::metadata::{Mapping, MetadataStore, Value, is_reserved_key};

/// Merge behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOptions {
    /// Emit a `TypeMismatch` diagnostic when a kept value and a discarded
    /// import value have different types.
    pub validate_types: bool,
    /// Record every added / overridden / filtered key in the [`MergeLog`].
    pub log_operations: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            validate_types: true,
            log_operations: false,
        }
    }
}

/// What happened to one imported key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeAction {
    /// The key was new and was added.
    Added,
    /// The key already existed; the import's value was discarded.
    Overridden,
    /// The key is reserved and was dropped.
    Filtered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOperation {
    pub action: MergeAction,
    /// Dotted path of the key.
    pub key: String,
    /// Position of the import in document order.
    pub import_index: usize,
}

/// Operation log of one merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeLog {
    pub operations: Vec<MergeOperation>,
}

impl MergeLog {
    fn push(&mut self, action: MergeAction, key: String, import_index: usize) {
        tracing::debug!(?action, key = %key, import_index, "merge");
        self.operations.push(MergeOperation {
            action,
            key,
            import_index,
        });
    }

    pub fn keys(&self, action: MergeAction) -> impl Iterator<Item = &str> {
        self.operations.iter().filter(move |op| op.action == action).map(|op| op.key.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Result of [`merge_frontmatter`].
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub store: MetadataStore,
    pub log: MergeLog,
    pub diagnostics: Vec<Diagnostic>,
}

struct Merger<'o> {
    options: &'o MergeOptions,
    log: MergeLog,
    diagnostics: Vec<Diagnostic>,
    import_index: usize,
}

impl Merger<'_> {
    fn record(&mut self, action: MergeAction, key: String) {
        if self.options.log_operations {
            self.log.push(action, key, self.import_index);
        }
    }

    fn merge_mapping(&mut self, target: &mut Mapping, incoming: Mapping, prefix: &str) {
        for (key, value) in incoming {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };

            match target.get_mut(&key) {
                None => {
                    target.insert(key, value);
                    self.record(MergeAction::Added, path);
                }
                Some(Value::Mapping(existing)) if matches!(value, Value::Mapping(_)) => {
                    if let Value::Mapping(nested) = value {
                        self.merge_mapping(existing, nested, &path);
                    }
                }
                Some(existing) => {
                    if self.options.validate_types {
                        self.check_types(existing, &value, &path);
                    }
                    self.record(MergeAction::Overridden, path);
                }
            }
        }
    }

    fn check_types(&mut self, kept: &Value, discarded: &Value, path: &str) {
        if matches!(kept, Value::Null) || matches!(discarded, Value::Null) {
            return;
        }
        if kept.kind() != discarded.kind() {
            self.diagnostics.push(Diagnostic::warning(
                DiagnosticKind::TypeMismatch,
                format!(
                    "'{path}' is a {} but import #{} provides a {}; keeping the existing value",
                    kept.kind(),
                    self.import_index + 1,
                    discarded.kind()
                ),
            ));
        }
    }
}

/// Merge imported stores into the main store.
///
/// The inputs are not modified; merging the same inputs again gives the same
/// result.
pub fn merge_frontmatter(
    main: &MetadataStore,
    imports: &[MetadataStore],
    options: &MergeOptions,
) -> MergeOutcome {
    let mut merged = main.root().clone();
    let mut merger = Merger {
        options,
        log: MergeLog::default(),
        diagnostics: Vec::new(),
        import_index: 0,
    };

    for (index, import) in imports.iter().enumerate() {
        merger.import_index = index;

        let mut allowed = Mapping::new();
        for (key, value) in import.root().iter() {
            if is_reserved_key(key) {
                merger.diagnostics.push(Diagnostic::info(
                    DiagnosticKind::ReservedKeyFiltered,
                    format!("import #{} tried to set reserved key '{key}'; ignored", index + 1),
                ));
                merger.record(MergeAction::Filtered, key.clone());
            } else {
                allowed.insert(key.clone(), value.clone());
            }
        }

        merger.merge_mapping(&mut merged, allowed, "");
    }

    tracing::debug!(
        imports = imports.len(),
        keys = merged.len(),
        diagnostics = merger.diagnostics.len(),
        "merged frontmatter"
    );

    MergeOutcome {
        store: MetadataStore::from_mapping(merged),
        log: merger.log,
        diagnostics: merger.diagnostics,
    }
}

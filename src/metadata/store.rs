//! The metadata store: parsed front-matter for one document run.

use serde::{Serialize, Serializer};

use super::path::FieldPath;
use super::value::{Mapping, Value};

/// Ordered tree of key → value bindings.
///
/// Created per document run, written only by the merge phase and read-only
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataStore {
    root: Mapping,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_mapping(root: Mapping) -> Self {
        Self {
            root,
        }
    }

    pub fn root(&self) -> &Mapping {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Look up a dotted/indexed path string.
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.get_path(&FieldPath::parse(path)?)
    }

    pub fn get_path(&self, path: &FieldPath) -> Option<&Value> {
        self.root.get_path(path)
    }

    /// Insert a top-level binding.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.root.insert(key, value)
    }

    /// Every addressable dotted path (mappings descended, sequences not).
    ///
    /// Used for "did you mean" suggestions on missing fields.
    pub fn known_paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_paths(&self.root, "", &mut out);
        out
    }
}

impl Serialize for MetadataStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.root.serialize(serializer)
    }
}

impl From<Mapping> for MetadataStore {
    fn from(root: Mapping) -> Self {
        Self::from_mapping(root)
    }
}

fn collect_paths(map: &Mapping, prefix: &str, out: &mut Vec<String>) {
    for (key, value) in map.iter() {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        if let Value::Mapping(child) = value {
            collect_paths(child, &path, out);
        }
        out.push(path);
    }
}

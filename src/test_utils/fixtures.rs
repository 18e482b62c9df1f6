//! Test fixtures for sample documents and metadata imports.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// A document file written into a test directory.
#[derive(Clone, Debug)]
pub struct DocumentFixture {
    /// Path relative to the directory it is written to.
    pub path: String,
    pub content: String,
}

impl DocumentFixture {
    /// Services agreement exercising numbering, references, fields and a loop.
    pub fn services_agreement(name: &str) -> Self {
        Self {
            path: format!("{name}.md"),
            content: r#"---
client:
  name: Acme Ltd
  jurisdiction: England
provider: Example Services LLP
effective_date: 2024-03-01
fee: 1500
deliverables:
  - name: Discovery report
    weeks: 2
  - name: Implementation
    weeks: 6
---
l. Definitions |defs|
ll. Parties
This agreement is made between {{client.name}} and {{provider}} on {{formatDate effective_date "Do MMMM YYYY"}}.
l. Services |services|
Terms used here are defined in |defs|.
{{#each deliverables}}
- {{@number}}. {{name}} ({{weeks}} weeks)
{{/each}}
l. Fees
The fee is {{formatCurrency fee "GBP"}}, governed by the laws of {{client.jurisdiction}}.
"#
            .to_string(),
        }
    }

    /// Document whose placeholders have no metadata at all.
    pub fn unfilled(name: &str) -> Self {
        Self {
            path: format!("{name}.md"),
            content: "l. Parties\nBetween {{client.name}} and {{provider}}.\n".to_string(),
        }
    }

    /// Document with a metadata block that is not valid YAML.
    pub fn malformed(name: &str) -> Self {
        Self {
            path: format!("{name}.md"),
            content: "---\nclient: [unclosed\n---\nHello {{client}}\n".to_string(),
        }
    }

    /// Document with the given text.
    pub fn simple(name: &str, content: &str) -> Self {
        Self {
            path: format!("{name}.md"),
            content: content.to_string(),
        }
    }

    /// Write the document to a directory
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let file_path = dir.join(&self.path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&file_path, &self.content)?;
        Ok(file_path)
    }
}

/// A metadata import file.
#[derive(Clone, Debug)]
pub struct ImportFixture {
    pub path: String,
    pub content: String,
}

impl ImportFixture {
    /// Plain YAML import.
    pub fn yaml(name: &str, yaml: &str) -> Self {
        Self {
            path: format!("{name}.yml"),
            content: yaml.to_string(),
        }
    }

    /// Import trying to override layout keys it is not allowed to set.
    pub fn hostile(name: &str) -> Self {
        Self::yaml(name, "level-one: 'Hacked %n'\noutput-path: /tmp/evil\nprovider: Imported Provider\n")
    }

    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let file_path = dir.join(&self.path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&file_path, &self.content)?;
        Ok(file_path)
    }
}

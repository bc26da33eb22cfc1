//! The top-level schema model and snapshot loading.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Sequence, Table};
use crate::error::{SchemaError, SchemaResult};

/// A complete relational schema: one default namespace, its tables and
/// sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Name of the default namespace.
    #[serde(default)]
    pub name: String,
    /// Additional namespaces declared by the schema.
    #[serde(default)]
    pub namespaces: Vec<String>,
    /// Tables in declaration order.
    #[serde(default)]
    pub tables: Vec<Table>,
    /// Sequences in declaration order.
    #[serde(default)]
    pub sequences: Vec<Sequence>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Append a table, builder style.
    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    /// Append a sequence, builder style.
    pub fn with_sequence(mut self, sequence: Sequence) -> Self {
        self.sequences.push(sequence);
        self
    }

    /// Declare an additional namespace, builder style.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespaces.push(namespace.into());
        self
    }

    /// Add a table, rejecting duplicates.
    pub fn add_table(&mut self, table: Table) -> SchemaResult<()> {
        if self.has_table(&table.name) {
            return Err(SchemaError::duplicate("table", table.name));
        }
        self.tables.push(table);
        Ok(())
    }

    /// Add a sequence, rejecting duplicates.
    pub fn add_sequence(&mut self, sequence: Sequence) -> SchemaResult<()> {
        if self.has_sequence(&sequence.name) {
            return Err(SchemaError::duplicate("sequence", sequence.name));
        }
        self.sequences.push(sequence);
        Ok(())
    }

    /// Whether a table with this name exists.
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.iter().any(|t| t.name == name)
    }

    /// Get a table by name.
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Remove a table by name, returning it.
    pub fn drop_table(&mut self, name: &str) -> Option<Table> {
        let position = self.tables.iter().position(|t| t.name == name)?;
        Some(self.tables.remove(position))
    }

    /// Whether a sequence with this name exists.
    pub fn has_sequence(&self, name: &str) -> bool {
        self.sequences.iter().any(|s| s.name == name)
    }

    /// Get a sequence by name.
    pub fn get_sequence(&self, name: &str) -> Option<&Sequence> {
        self.sequences.iter().find(|s| s.name == name)
    }

    /// Parse a schema snapshot from TOML.
    pub fn from_toml_str(content: &str) -> SchemaResult<Self> {
        let schema: Self =
            toml::from_str(content).map_err(|e| SchemaError::TomlError { source: e })?;
        schema.check_duplicates()?;
        Ok(schema)
    }

    /// Parse a schema snapshot from JSON.
    pub fn from_json_str(content: &str) -> SchemaResult<Self> {
        let schema: Self =
            serde_json::from_str(content).map_err(|e| SchemaError::JsonError { source: e })?;
        schema.check_duplicates()?;
        Ok(schema)
    }

    /// Load a schema snapshot, choosing the format from the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        debug!(path = %path.display(), format = %extension, "Loading schema snapshot");

        match extension.as_str() {
            "toml" => Self::from_toml_str(&content),
            "json" => Self::from_json_str(&content),
            _ => Err(SchemaError::UnsupportedFormat {
                path: path.display().to_string(),
                extension,
            }),
        }
    }

    fn check_duplicates(&self) -> SchemaResult<()> {
        for (i, table) in self.tables.iter().enumerate() {
            if self.tables[..i].iter().any(|t| t.name == table.name) {
                return Err(SchemaError::duplicate("table", &table.name));
            }
        }
        for (i, sequence) in self.sequences.iter().enumerate() {
            if self.sequences[..i].iter().any(|s| s.name == sequence.name) {
                return Err(SchemaError::duplicate("sequence", &sequence.name));
            }
        }
        Ok(())
    }
}

//! Tables and the objects that hang off them.

use serde::{Deserialize, Serialize};

use super::ColumnType;
use crate::error::{SchemaError, SchemaResult};
use crate::name::Asset;

fn default_not_null() -> bool {
    true
}

/// A table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Logical type.
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Declared length, for length-bound types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    /// Numeric precision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    /// Numeric scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    /// Fixed-length storage (`CHAR` rather than `VARCHAR`).
    #[serde(default)]
    pub fixed: bool,
    /// Unsigned numeric storage.
    #[serde(default)]
    pub unsigned: bool,
    /// Value generated by the database.
    #[serde(default)]
    pub autoincrement: bool,
    /// Whether NULL is rejected.
    #[serde(default = "default_not_null")]
    pub not_null: bool,
    /// Default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Column comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Raw type definition that overrides type inference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_definition: Option<String>,
}

impl Column {
    /// Create a NOT NULL column of the given type.
    pub fn new(name: impl Into<String>, column_type: impl Into<ColumnType>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
            length: None,
            precision: None,
            scale: None,
            fixed: false,
            unsigned: false,
            autoincrement: false,
            not_null: true,
            default: None,
            comment: None,
            column_definition: None,
        }
    }

    /// Set the length.
    pub fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Set precision and scale.
    pub fn precision(mut self, precision: u32, scale: u32) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    /// Set whether NULL is rejected.
    pub fn not_null(mut self, not_null: bool) -> Self {
        self.not_null = not_null;
        self
    }

    /// Allow NULL values.
    pub fn nullable(self) -> Self {
        self.not_null(false)
    }

    /// Set the default value.
    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Set the comment.
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Set a raw type definition.
    pub fn column_definition(mut self, definition: impl Into<String>) -> Self {
        self.column_definition = Some(definition.into());
        self
    }

    /// Mark as fixed-length.
    pub fn fixed(mut self, fixed: bool) -> Self {
        self.fixed = fixed;
        self
    }

    /// Mark as unsigned.
    pub fn unsigned(mut self, unsigned: bool) -> Self {
        self.unsigned = unsigned;
        self
    }

    /// Mark as auto-incrementing.
    pub fn autoincrement(mut self, autoincrement: bool) -> Self {
        self.autoincrement = autoincrement;
        self
    }

    /// Whether the column accepts NULL.
    pub fn is_nullable(&self) -> bool {
        !self.not_null
    }
}

impl Asset for Column {
    fn name(&self) -> &str {
        &self.name
    }
}

/// An index over one or more columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// Index name.
    pub name: String,
    /// Indexed column names, in index order.
    pub columns: Vec<String>,
    /// Whether the index enforces uniqueness.
    #[serde(default, rename = "unique")]
    pub is_unique: bool,
    /// Whether the index is the primary key.
    #[serde(default, rename = "primary")]
    pub is_primary: bool,
}

impl Index {
    /// Create a plain (non-unique) index.
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            is_unique: false,
            is_primary: false,
        }
    }

    /// Create a unique index.
    pub fn unique<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            is_unique: true,
            ..Self::new(name, columns)
        }
    }

    /// Create a primary key index. Primary indexes are always unique.
    pub fn primary<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            is_unique: true,
            is_primary: true,
            ..Self::new(name, columns)
        }
    }

    /// Whether the index covers exactly one column.
    pub fn is_single_column(&self) -> bool {
        self.columns.len() == 1
    }
}

impl Asset for Index {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyConstraint {
    /// Constraint name. May be namespace-qualified.
    pub name: String,
    /// Declared namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Columns on the owning table.
    pub local_columns: Vec<String>,
    /// Referenced table, possibly dotted (`"ns.table"`).
    pub foreign_table_name: String,
    /// Columns on the referenced table.
    pub foreign_columns: Vec<String>,
}

impl ForeignKeyConstraint {
    /// Create a foreign key constraint.
    pub fn new<L, F, S1, S2>(
        name: impl Into<String>,
        local_columns: L,
        foreign_table_name: impl Into<String>,
        foreign_columns: F,
    ) -> Self
    where
        L: IntoIterator<Item = S1>,
        S1: Into<String>,
        F: IntoIterator<Item = S2>,
        S2: Into<String>,
    {
        Self {
            name: name.into(),
            namespace: None,
            local_columns: local_columns.into_iter().map(Into::into).collect(),
            foreign_table_name: foreign_table_name.into(),
            foreign_columns: foreign_columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Whether this key references `table` (compared by full name).
    pub fn references(&self, table: &str) -> bool {
        self.foreign_table_name == table
    }
}

impl Asset for ForeignKeyConstraint {
    fn name(&self) -> &str {
        &self.name
    }

    fn declared_namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

/// A table definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Table name. May be namespace-qualified.
    pub name: String,
    /// Declared namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Columns in declaration order.
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Indexes in declaration order.
    #[serde(default)]
    pub indexes: Vec<Index>,
    /// Foreign keys in declaration order.
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyConstraint>,
}

impl Table {
    /// Create an empty table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            columns: Vec::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Append a column.
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Append an index.
    pub fn with_index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    /// Append a primary key index named `primary`.
    pub fn with_primary_key<I, S>(self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_index(Index::primary("primary", columns))
    }

    /// Append a foreign key.
    pub fn with_foreign_key(mut self, foreign_key: ForeignKeyConstraint) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    /// Whether the table has a column with this name.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Get a column by name.
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get a column by name, failing if it does not exist.
    pub fn column(&self, name: &str) -> SchemaResult<&Column> {
        self.get_column(name)
            .ok_or_else(|| SchemaError::unknown_column(&self.name, name))
    }

    /// Get an index by name.
    pub fn get_index(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.name == name)
    }

    /// Get the primary key index, if any.
    pub fn primary_key(&self) -> Option<&Index> {
        self.indexes.iter().find(|i| i.is_primary)
    }

    /// Get a foreign key by name.
    pub fn get_foreign_key(&self, name: &str) -> Option<&ForeignKeyConstraint> {
        self.foreign_keys.iter().find(|fk| fk.name == name)
    }
}

impl Asset for Table {
    fn name(&self) -> &str {
        &self.name
    }

    fn declared_namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::QualifiedName;

    #[test]
    fn test_column_defaults() {
        let column = Column::new("id", ColumnType::Integer);
        assert!(column.not_null);
        assert!(!column.is_nullable());
        assert!(column.length.is_none());
    }

    #[test]
    fn test_primary_index_is_unique() {
        let index = Index::primary("pk", ["id"]);
        assert!(index.is_primary);
        assert!(index.is_unique);
    }

    #[test]
    fn test_table_lookup() {
        let table = Table::new("users")
            .with_column(Column::new("id", ColumnType::Integer))
            .with_primary_key(["id"]);

        assert!(table.has_column("id"));
        assert!(!table.has_column("email"));
        assert_eq!(table.primary_key().map(|i| i.columns.clone()), Some(vec!["id".to_string()]));
        assert!(matches!(
            table.column("email"),
            Err(SchemaError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn test_table_qualified_name() {
        let table = Table::new("users").with_namespace("app");
        let name = QualifiedName::from_asset(&table);
        assert_eq!(name.namespace_name(), Some("app"));
        assert_eq!(name.name(), "users");

        let dotted = Table::new("app.users");
        let name = QualifiedName::from_asset(&dotted);
        assert_eq!(name.namespace_name(), Some("app"));
        assert_eq!(name.name(), "users");
    }

    #[test]
    fn test_column_deserialize_defaults() {
        let column: Column = serde_json::from_str(r#"{"name": "title", "type": "string", "length": 80}"#)
            .unwrap();
        assert_eq!(column.column_type, ColumnType::String);
        assert_eq!(column.length, Some(80));
        assert!(column.not_null);
    }
}

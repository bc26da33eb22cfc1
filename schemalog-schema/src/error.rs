//! Error types for loading and inspecting schema models.

// These warnings are false positives - the fields are used by derive macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur while loading or querying a schema model.
#[derive(Error, Debug, Diagnostic)]
pub enum SchemaError {
    /// Error reading a snapshot file.
    #[error("failed to read file: {path}")]
    #[diagnostic(code(schemalog::schema::io_error))]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("failed to parse TOML snapshot")]
    #[diagnostic(code(schemalog::schema::toml_error))]
    TomlError {
        #[source]
        source: toml::de::Error,
    },

    /// JSON parsing error.
    #[error("failed to parse JSON snapshot")]
    #[diagnostic(code(schemalog::schema::json_error))]
    JsonError {
        #[source]
        source: serde_json::Error,
    },

    /// Snapshot file with an extension we cannot read.
    #[error("unsupported snapshot format `{extension}` for {path}")]
    #[diagnostic(
        code(schemalog::schema::unsupported_format),
        help("use a `.toml` or `.json` snapshot file")
    )]
    UnsupportedFormat { path: String, extension: String },

    /// The same asset was declared twice.
    #[error("duplicate {kind} `{name}`")]
    #[diagnostic(code(schemalog::schema::duplicate))]
    DuplicateAsset { kind: String, name: String },

    /// A column was looked up on a table that does not have it.
    #[error("table `{table}` has no column `{column}`")]
    #[diagnostic(code(schemalog::schema::unknown_column))]
    UnknownColumn { table: String, column: String },
}

impl SchemaError {
    /// Create a duplicate asset error.
    pub fn duplicate(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DuplicateAsset {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create an unknown column error.
    pub fn unknown_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            table: table.into(),
            column: column.into(),
        }
    }
}

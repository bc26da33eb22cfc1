//! Error types for changelog generation.

// These warnings are false positives - the fields are used by derive macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use schemalog_schema::SchemaError;
use thiserror::Error;

/// Result type alias for changelog operations.
pub type ChangelogResult<T> = Result<T, ChangelogError>;

/// Errors that can occur while generating a changelog.
#[derive(Debug, Error, Diagnostic)]
pub enum ChangelogError {
    /// An emission call arrived before `started`.
    #[error("changelog output used before `started` was called")]
    #[diagnostic(code(schemalog::changelog::not_started))]
    NotStarted,

    /// An emission call arrived after `terminated`.
    #[error("changelog output used after `terminated` was called")]
    #[diagnostic(code(schemalog::changelog::already_terminated))]
    AlreadyTerminated,

    /// An added index names a column neither the table nor the diff knows.
    #[error("index `{index}` on table `{table}` references unknown column `{column}`")]
    #[diagnostic(
        code(schemalog::changelog::unknown_index_column),
        help("the column must exist on the table or be added by the same diff")
    )]
    UnknownIndexColumn {
        table: String,
        index: String,
        column: String,
    },

    /// Writing the rendered changelog failed.
    #[error("I/O error: {0}")]
    #[diagnostic(code(schemalog::changelog::io))]
    Io(#[from] std::io::Error),

    /// Loading or querying the schema model failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] SchemaError),

    /// Invalid configuration file.
    #[error("configuration error: {message}")]
    #[diagnostic(code(schemalog::changelog::config))]
    Config { message: String },

    /// The current schema could not be introspected.
    #[error("introspection error: {0}")]
    #[diagnostic(code(schemalog::changelog::introspection))]
    Introspection(String),

    /// The schemas could not be compared.
    #[error("comparison error: {0}")]
    #[diagnostic(code(schemalog::changelog::comparison))]
    Comparison(String),

    /// General changelog error.
    #[error("changelog error: {0}")]
    #[diagnostic(code(schemalog::changelog::other))]
    Other(String),
}

impl ChangelogError {
    /// Create an unknown index column error.
    pub fn unknown_index_column(
        table: impl Into<String>,
        index: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        Self::UnknownIndexColumn {
            table: table.into(),
            index: index.into(),
            column: column.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an introspection error.
    pub fn introspection(msg: impl Into<String>) -> Self {
        Self::Introspection(msg.into())
    }

    /// Create a comparison error.
    pub fn comparison(msg: impl Into<String>) -> Self {
        Self::Comparison(msg.into())
    }

    /// Create an other error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Check if this error comes from misusing the output lifecycle.
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Self::NotStarted | Self::AlreadyTerminated)
    }
}

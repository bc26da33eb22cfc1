//! SQL dialect platforms.
//!
//! A [`Platform`] renders the two pieces of dialect SQL a changelog needs:
//! the statement creating a namespace, and a column's native type
//! declaration (used when platform types are requested).

// These warnings are false positives - the fields are used by derive macros
#![allow(unused_assignments)]

use std::fmt::Debug;
use std::sync::Arc;

use miette::Diagnostic;
use schemalog_schema::{Column, ColumnType};
use thiserror::Error;

/// Recoverable failure reported by a platform.
#[derive(Debug, Error, Diagnostic)]
pub enum PlatformError {
    /// The dialect cannot express the operation.
    #[error("operation `{operation}` is not supported by platform `{platform}`")]
    #[diagnostic(code(schemalog::platform::not_supported))]
    NotSupported { platform: String, operation: String },
}

impl PlatformError {
    /// Create a not supported error.
    pub fn not_supported(platform: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::NotSupported {
            platform: platform.into(),
            operation: operation.into(),
        }
    }
}

/// Dialect-specific SQL rendering.
pub trait Platform: Debug + Send + Sync {
    /// Dialect name.
    fn name(&self) -> &str;

    /// Statement creating `namespace`.
    fn create_schema_sql(&self, namespace: &str) -> Result<String, PlatformError>;

    /// Native type declaration for `column`, e.g. `VARCHAR(255)`.
    fn column_declaration_sql(&self, column: &Column) -> String;
}

/// The platform used before a run binds one.
pub fn default_platform() -> Arc<dyn Platform> {
    Arc::new(MySqlPlatform)
}

fn length_or(column: &Column, default: u32) -> u32 {
    column.length.unwrap_or(default)
}

fn numeric(column: &Column) -> String {
    format!(
        "NUMERIC({}, {})",
        column.precision.unwrap_or(10),
        column.scale.unwrap_or(0)
    )
}

fn custom(name: &str) -> String {
    name.to_uppercase()
}

/// MySQL / MariaDB.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlPlatform;

impl Platform for MySqlPlatform {
    fn name(&self) -> &str {
        "mysql"
    }

    fn create_schema_sql(&self, _namespace: &str) -> Result<String, PlatformError> {
        Err(PlatformError::not_supported(self.name(), "create schema"))
    }

    fn column_declaration_sql(&self, column: &Column) -> String {
        let mut sql = match &column.column_type {
            ColumnType::Integer => "INT".to_string(),
            ColumnType::SmallInt => "SMALLINT".to_string(),
            ColumnType::BigInt => "BIGINT".to_string(),
            ColumnType::String if column.fixed => format!("CHAR({})", length_or(column, 255)),
            ColumnType::String => format!("VARCHAR({})", length_or(column, 255)),
            ColumnType::Text => "LONGTEXT".to_string(),
            ColumnType::Boolean => "TINYINT(1)".to_string(),
            ColumnType::Float => "DOUBLE PRECISION".to_string(),
            ColumnType::Decimal => numeric(column),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::DateTime | ColumnType::DateTimeTz => "DATETIME".to_string(),
            ColumnType::Time => "TIME".to_string(),
            ColumnType::Json => "JSON".to_string(),
            ColumnType::Binary if column.fixed => format!("BINARY({})", length_or(column, 255)),
            ColumnType::Binary => format!("VARBINARY({})", length_or(column, 255)),
            ColumnType::Blob => "LONGBLOB".to_string(),
            ColumnType::Guid => "CHAR(36)".to_string(),
            ColumnType::Custom(name) => custom(name),
        };

        let integral = matches!(
            column.column_type,
            ColumnType::Integer | ColumnType::SmallInt | ColumnType::BigInt
        );
        if integral && column.unsigned {
            sql.push_str(" UNSIGNED");
        }
        if integral && column.autoincrement {
            sql.push_str(" AUTO_INCREMENT");
        }

        sql
    }
}

/// PostgreSQL.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgreSqlPlatform;

impl Platform for PostgreSqlPlatform {
    fn name(&self) -> &str {
        "postgresql"
    }

    fn create_schema_sql(&self, namespace: &str) -> Result<String, PlatformError> {
        Ok(format!("CREATE SCHEMA {}", namespace))
    }

    fn column_declaration_sql(&self, column: &Column) -> String {
        match &column.column_type {
            ColumnType::Integer if column.autoincrement => "SERIAL".to_string(),
            ColumnType::Integer => "INT".to_string(),
            ColumnType::SmallInt if column.autoincrement => "SMALLSERIAL".to_string(),
            ColumnType::SmallInt => "SMALLINT".to_string(),
            ColumnType::BigInt if column.autoincrement => "BIGSERIAL".to_string(),
            ColumnType::BigInt => "BIGINT".to_string(),
            ColumnType::String if column.fixed => format!("CHAR({})", length_or(column, 255)),
            ColumnType::String => format!("VARCHAR({})", length_or(column, 255)),
            ColumnType::Text => "TEXT".to_string(),
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::Float => "DOUBLE PRECISION".to_string(),
            ColumnType::Decimal => numeric(column),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::DateTime => "TIMESTAMP(0) WITHOUT TIME ZONE".to_string(),
            ColumnType::DateTimeTz => "TIMESTAMP(0) WITH TIME ZONE".to_string(),
            ColumnType::Time => "TIME(0) WITHOUT TIME ZONE".to_string(),
            ColumnType::Json => "JSON".to_string(),
            ColumnType::Binary | ColumnType::Blob => "BYTEA".to_string(),
            ColumnType::Guid => "UUID".to_string(),
            ColumnType::Custom(name) => custom(name),
        }
    }
}

/// SQLite.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlitePlatform;

impl Platform for SqlitePlatform {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn create_schema_sql(&self, _namespace: &str) -> Result<String, PlatformError> {
        Err(PlatformError::not_supported(self.name(), "create schema"))
    }

    fn column_declaration_sql(&self, column: &Column) -> String {
        match &column.column_type {
            ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::SmallInt => "SMALLINT".to_string(),
            ColumnType::BigInt => "BIGINT".to_string(),
            ColumnType::String if column.fixed => format!("CHAR({})", length_or(column, 255)),
            ColumnType::String => format!("VARCHAR({})", length_or(column, 255)),
            ColumnType::Text | ColumnType::Json => "CLOB".to_string(),
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::Float => "DOUBLE PRECISION".to_string(),
            ColumnType::Decimal => numeric(column),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::DateTime | ColumnType::DateTimeTz => "DATETIME".to_string(),
            ColumnType::Time => "TIME".to_string(),
            ColumnType::Binary | ColumnType::Blob => "BLOB".to_string(),
            ColumnType::Guid => "CHAR(36)".to_string(),
            ColumnType::Custom(name) => custom(name),
        }
    }
}

/// Microsoft SQL Server.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerPlatform;

impl Platform for SqlServerPlatform {
    fn name(&self) -> &str {
        "mssql"
    }

    fn create_schema_sql(&self, namespace: &str) -> Result<String, PlatformError> {
        Ok(format!("CREATE SCHEMA {}", namespace))
    }

    fn column_declaration_sql(&self, column: &Column) -> String {
        let mut sql = match &column.column_type {
            ColumnType::Integer => "INT".to_string(),
            ColumnType::SmallInt => "SMALLINT".to_string(),
            ColumnType::BigInt => "BIGINT".to_string(),
            ColumnType::String if column.fixed => format!("NCHAR({})", length_or(column, 255)),
            ColumnType::String => format!("NVARCHAR({})", length_or(column, 255)),
            ColumnType::Text => "VARCHAR(MAX)".to_string(),
            ColumnType::Boolean => "BIT".to_string(),
            ColumnType::Float => "FLOAT".to_string(),
            ColumnType::Decimal => numeric(column),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::DateTime => "DATETIME2(6)".to_string(),
            ColumnType::DateTimeTz => "DATETIMEOFFSET(6)".to_string(),
            ColumnType::Time => "TIME(0)".to_string(),
            // MSSQL 2016+ stores JSON as text
            ColumnType::Json => "NVARCHAR(MAX)".to_string(),
            ColumnType::Binary => format!("VARBINARY({})", length_or(column, 255)),
            ColumnType::Blob => "VARBINARY(MAX)".to_string(),
            ColumnType::Guid => "UNIQUEIDENTIFIER".to_string(),
            ColumnType::Custom(name) => custom(name),
        };

        if column.autoincrement {
            sql.push_str(" IDENTITY");
        }

        sql
    }
}

//! # schemalog-schema
//!
//! Relational schema model for schemalog.
//!
//! This crate provides:
//! - Schema model types (tables, columns, indexes, foreign keys, sequences)
//! - Asset naming and namespace qualification
//! - Index classification into primary, unique and other buckets
//! - Schema diff model and a name-based schema differ
//! - Snapshot loading from `.toml` and `.json` files
//!
//! ## Example
//!
//! ```rust,ignore
//! use schemalog_schema::{Schema, SchemaDiffer};
//!
//! let current = Schema::from_file("snapshots/current.toml")?;
//! let desired = Schema::from_file("snapshots/desired.toml")?;
//!
//! let diff = SchemaDiffer::new(desired).with_source(current).diff();
//! println!("{}", diff.summary());
//! ```

pub mod ast;
pub mod diff;
pub mod error;
pub mod index_columns;
pub mod name;

pub use ast::*;
pub use diff::{
    ColumnDiff, OrphanedForeignKey, RemovedForeignKey, SchemaDiff, SchemaDiffer, TableDiff,
    compare_schemas,
};
pub use error::{SchemaError, SchemaResult};
pub use index_columns::IndexColumns;
pub use name::{Asset, QualifiedName};

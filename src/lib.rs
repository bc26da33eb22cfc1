//! # Schemalog
//!
//! Translate relational schemas and schema diffs into declarative database
//! changelogs.
//!
//! Schemalog provides:
//! - A schema model loadable from TOML or JSON snapshots
//! - A name-based schema differ
//! - A changelog emitter producing Liquibase-style XML change sets
//! - Dialect platforms for MySQL, PostgreSQL, SQLite and SQL Server
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use schemalog::prelude::*;
//!
//! let schema = Schema::new("app").with_table(
//!     Table::new("users")
//!         .with_column(Column::new("id", ColumnType::Integer))
//!         .with_column(Column::new("email", ColumnType::String).length(255))
//!         .with_primary_key(["id"]),
//! );
//!
//! let generator = ChangelogGenerator::new(Arc::new(PostgreSqlPlatform), schema);
//! let options = ChangelogOptions::new().change_set_unique_id(false);
//! let document = generator.changelog(Some(options), None)?;
//!
//! assert!(document.to_xml().contains(r#"<column name="email" type="varchar(255)">"#));
//! # Ok::<(), schemalog::ChangelogError>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Schema model, diffs and snapshot loading.
pub mod schema {
    pub use schemalog_schema::*;
}

/// Changelog emission, platforms and generation runs.
pub mod changelog {
    pub use schemalog_changelog::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::changelog::{
        ChangelogConfig, ChangelogGenerator, ChangelogOptions, ChangelogOutput, Document,
        DomChangelogOutput, MySqlPlatform, Platform, PostgreSqlPlatform, SchemaFile,
        SqlServerPlatform, SqlitePlatform, StreamingChangelogOutput,
    };
    pub use crate::schema::{
        Column, ColumnType, ForeignKeyConstraint, Index, Schema, SchemaDiff, Sequence, Table,
        compare_schemas,
    };
}

// Re-export key types at the crate root
pub use changelog::{ChangelogError, ChangelogResult, logging};
pub use schema::{SchemaError, SchemaResult};

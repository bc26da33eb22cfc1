//! # schemalog-changelog
//!
//! Changelog generation for schemalog.
//!
//! This crate provides:
//! - The [`ChangelogOutput`] capability receiving schema and diff events
//! - [`ChangelogEmitter`], rendering those events as change sets into a
//!   [`Document`] or straight to a writer
//! - SQL dialect [`Platform`]s used for schema creation and native types
//! - [`ChangelogGenerator`], running full and diff changelogs
//! - `schemalog.toml` configuration and logging bootstrap
//!
//! ## Example
//!
//! ```rust,ignore
//! use schemalog_changelog::{ChangelogConfig, ChangelogGenerator, SchemaFile};
//!
//! let config = ChangelogConfig::from_file("schemalog.toml")?;
//! let generator = ChangelogGenerator::from_config(config, SchemaFile::new("schema.toml"))
//!     .with_introspector(SchemaFile::new("snapshots/current.toml"));
//!
//! let document = generator.diff_changelog(None, None)?;
//! std::fs::write("changelog.xml", document.to_xml())?;
//! ```

pub mod config;
pub mod document;
pub mod driver;
pub mod emitter;
pub mod error;
pub mod id;
pub mod logging;
pub mod options;
pub mod output;
pub mod platform;

pub use config::{ChangelogConfig, DiffConfig, PlatformKind};
pub use document::{Document, Element, Node, XML_DECLARATION};
pub use driver::{
    ChangelogGenerator, NameComparator, SchemaComparator, SchemaFile, SchemaIntrospector,
    SchemaSource,
};
pub use emitter::{
    ChangelogEmitter, ChangelogSink, DomChangelogOutput, DomSink, ROOT_ELEMENT, StreamSink,
    StreamingChangelogOutput,
};
pub use error::{ChangelogError, ChangelogResult};
pub use id::{ChangeSetIdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use options::{ChangelogOptions, DEFAULT_CHANGE_SET_AUTHOR};
pub use output::ChangelogOutput;
pub use platform::{
    MySqlPlatform, Platform, PlatformError, PostgreSqlPlatform, SqlServerPlatform, SqlitePlatform,
    default_platform,
};

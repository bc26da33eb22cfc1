//! Changelog generation runs.
//!
//! [`ChangelogGenerator`] obtains the schemas a run needs from its
//! collaborators and drives a [`ChangelogOutput`] through them in a fixed
//! order.
//!
//! ```rust
//! use schemalog_changelog::{ChangelogGenerator, ChangelogOptions, MySqlPlatform};
//! use schemalog_schema::{Column, ColumnType, Schema, Table};
//! use std::sync::Arc;
//!
//! let schema = Schema::new("app").with_table(
//!     Table::new("users")
//!         .with_column(Column::new("id", ColumnType::Integer))
//!         .with_primary_key(["id"]),
//! );
//!
//! let generator = ChangelogGenerator::new(Arc::new(MySqlPlatform), schema);
//! let options = ChangelogOptions::new().change_set_unique_id(false);
//! let document = generator.changelog(Some(options), None).unwrap();
//!
//! assert!(document.to_xml().contains(r#"id="create-table-users""#));
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use schemalog_schema::{Schema, SchemaDiff, compare_schemas};
use tracing::{debug, info};

use crate::config::ChangelogConfig;
use crate::document::Document;
use crate::emitter::DomChangelogOutput;
use crate::error::{ChangelogError, ChangelogResult};
use crate::options::ChangelogOptions;
use crate::output::ChangelogOutput;
use crate::platform::Platform;

/// Provider of the desired schema, typically built from application
/// mappings.
pub trait SchemaSource {
    /// Build the desired schema.
    fn schema(&self) -> ChangelogResult<Schema>;
}

impl SchemaSource for Schema {
    fn schema(&self) -> ChangelogResult<Schema> {
        Ok(self.clone())
    }
}

/// Provider of the current schema of a live database.
pub trait SchemaIntrospector {
    /// Read the current schema.
    fn introspect(&self) -> ChangelogResult<Schema>;
}

impl<F> SchemaIntrospector for F
where
    F: Fn() -> ChangelogResult<Schema>,
{
    fn introspect(&self) -> ChangelogResult<Schema> {
        self()
    }
}

/// The diff algorithm turning one schema into another.
pub trait SchemaComparator {
    /// Compute the diff turning `from` into `to`.
    fn compare(&self, from: &Schema, to: &Schema) -> ChangelogResult<SchemaDiff>;
}

/// Compares schemas by asset name, see [`schemalog_schema::SchemaDiffer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NameComparator;

impl SchemaComparator for NameComparator {
    fn compare(&self, from: &Schema, to: &Schema) -> ChangelogResult<SchemaDiff> {
        Ok(compare_schemas(from, to))
    }
}

/// A schema snapshot file (TOML or JSON), read on every use.
///
/// Serves both as a desired-schema source and as a stand-in for a live
/// database when introspecting.
#[derive(Debug, Clone)]
pub struct SchemaFile {
    path: PathBuf,
}

impl SchemaFile {
    /// Point at a snapshot file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The snapshot path.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl SchemaSource for SchemaFile {
    fn schema(&self) -> ChangelogResult<Schema> {
        Ok(Schema::from_file(&self.path)?)
    }
}

impl SchemaIntrospector for SchemaFile {
    fn introspect(&self) -> ChangelogResult<Schema> {
        Ok(Schema::from_file(&self.path)?)
    }
}

/// Generates changelogs for full schemas and schema diffs.
pub struct ChangelogGenerator {
    platform: Arc<dyn Platform>,
    source: Box<dyn SchemaSource>,
    introspector: Option<Box<dyn SchemaIntrospector>>,
    comparator: Box<dyn SchemaComparator>,
    config: ChangelogConfig,
}

impl ChangelogGenerator {
    /// Create a generator for `platform` reading the desired schema from
    /// `source`.
    pub fn new(platform: Arc<dyn Platform>, source: impl SchemaSource + 'static) -> Self {
        Self {
            platform,
            source: Box::new(source),
            introspector: None,
            comparator: Box::new(NameComparator),
            config: ChangelogConfig::default(),
        }
    }

    /// Create a generator whose platform and defaults come from `config`.
    pub fn from_config(config: ChangelogConfig, source: impl SchemaSource + 'static) -> Self {
        Self::new(config.platform.platform(), source).with_config(config)
    }

    /// Set the introspector used by diff runs.
    pub fn with_introspector(mut self, introspector: impl SchemaIntrospector + 'static) -> Self {
        self.introspector = Some(Box::new(introspector));
        self
    }

    /// Replace the diff algorithm.
    pub fn with_comparator(mut self, comparator: impl SchemaComparator + 'static) -> Self {
        self.comparator = Box::new(comparator);
        self
    }

    /// Replace the configuration. The platform is left unchanged.
    pub fn with_config(mut self, config: ChangelogConfig) -> Self {
        self.config = config;
        self
    }

    /// The target platform.
    pub fn platform(&self) -> &Arc<dyn Platform> {
        &self.platform
    }

    /// The configuration.
    pub fn config(&self) -> &ChangelogConfig {
        &self.config
    }

    /// Generate the changelog creating `schema`, or the source schema when
    /// none is given.
    ///
    /// `options` default to the configured output options.
    pub fn changelog(
        &self,
        options: Option<ChangelogOptions>,
        schema: Option<&Schema>,
    ) -> ChangelogResult<Document> {
        self.changelog_with(self.dom_output(options), schema)
    }

    /// Drive `output` through every asset of the schema.
    ///
    /// Order: the schema namespace, then each table followed by its
    /// foreign keys, then the sequences.
    pub fn changelog_with<O: ChangelogOutput>(
        &self,
        mut output: O,
        schema: Option<&Schema>,
    ) -> ChangelogResult<O::Output> {
        let owned;
        let schema = match schema {
            Some(schema) => schema,
            None => {
                owned = self.source.schema()?;
                &owned
            }
        };

        output.started(Arc::clone(&self.platform))?;

        output.create_schema(&schema.name)?;
        for table in &schema.tables {
            output.create_table(table)?;
            for foreign_key in &table.foreign_keys {
                output.create_foreign_key(foreign_key, table)?;
            }
        }
        for sequence in &schema.sequences {
            output.create_sequence(sequence)?;
        }

        output.terminated()?;

        info!(
            schema = %schema.name,
            tables = schema.tables.len(),
            sequences = schema.sequences.len(),
            "Generated changelog"
        );
        output.finish()
    }

    /// Generate the changelog migrating the current database to `schema`,
    /// or to the source schema when none is given.
    pub fn diff_changelog(
        &self,
        options: Option<ChangelogOptions>,
        schema: Option<&Schema>,
    ) -> ChangelogResult<Document> {
        self.diff_changelog_with(self.dom_output(options), schema)
    }

    /// Introspect the database, compare it with the desired schema and
    /// drive `output` through the diff.
    ///
    /// Configured bookkeeping tables are removed from the current schema
    /// before comparing.
    pub fn diff_changelog_with<O: ChangelogOutput>(
        &self,
        output: O,
        schema: Option<&Schema>,
    ) -> ChangelogResult<O::Output> {
        let introspector = self
            .introspector
            .as_deref()
            .ok_or_else(|| ChangelogError::introspection("no schema introspector configured"))?;

        let mut current = introspector.introspect()?;
        for name in &self.config.diff.ignored_tables {
            if current.drop_table(name).is_some() {
                debug!(table = %name, "Ignoring bookkeeping table");
            }
        }

        let diff = match schema {
            Some(desired) => self.comparator.compare(&current, desired)?,
            None => self.comparator.compare(&current, &self.source.schema()?)?,
        };

        self.diff_changelog_from_schema_diff_with(output, &diff)
    }

    /// Generate the changelog of a precomputed diff.
    pub fn diff_changelog_from_schema_diff(
        &self,
        diff: &SchemaDiff,
        options: Option<ChangelogOptions>,
    ) -> ChangelogResult<Document> {
        self.diff_changelog_from_schema_diff_with(self.dom_output(options), diff)
    }

    /// Drive `output` through the buckets of `diff`.
    ///
    /// Order: new namespaces, orphaned foreign keys, changed sequences,
    /// removed sequences, new sequences, new tables each followed by its
    /// foreign keys, removed tables, changed tables.
    pub fn diff_changelog_from_schema_diff_with<O: ChangelogOutput>(
        &self,
        mut output: O,
        diff: &SchemaDiff,
    ) -> ChangelogResult<O::Output> {
        output.started(Arc::clone(&self.platform))?;

        for namespace in &diff.new_namespaces {
            output.create_schema(namespace)?;
        }
        for orphan in &diff.orphaned_foreign_keys {
            output.drop_foreign_key(&orphan.foreign_key, &orphan.local_table)?;
        }
        for sequence in &diff.changed_sequences {
            output.alter_sequence(sequence)?;
        }
        for sequence in &diff.removed_sequences {
            output.drop_sequence(sequence)?;
        }
        for sequence in &diff.new_sequences {
            output.create_sequence(sequence)?;
        }
        for table in &diff.new_tables {
            output.create_table(table)?;
            for foreign_key in &table.foreign_keys {
                output.create_foreign_key(foreign_key, table)?;
            }
        }
        for table in &diff.removed_tables {
            output.drop_table(table)?;
        }
        for table_diff in &diff.changed_tables {
            output.alter_table(table_diff)?;
        }

        output.terminated()?;

        info!(summary = %diff.summary(), "Generated diff changelog");
        output.finish()
    }

    fn dom_output(&self, options: Option<ChangelogOptions>) -> DomChangelogOutput {
        DomChangelogOutput::new(options.unwrap_or_else(|| self.config.output.clone()))
    }
}

impl std::fmt::Debug for ChangelogGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangelogGenerator")
            .field("platform", &self.platform.name())
            .field("introspector", &self.introspector.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

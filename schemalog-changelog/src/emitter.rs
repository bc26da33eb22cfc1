//! The schema-to-changelog translation engine.
//!
//! [`ChangelogEmitter`] turns schema and diff events into change sets. It
//! does not care where finished nodes go: a [`ChangelogSink`] receives
//! every completed top-level node. [`DomSink`] collects them into a
//! [`Document`], [`StreamSink`] writes each one as soon as it is complete.
//! Both produce byte-identical text.

use std::io::Write;
use std::sync::{Arc, LazyLock};

use regex_lite::Regex;
use schemalog_schema::{
    Column, ColumnDiff, ForeignKeyConstraint, IndexColumns, QualifiedName, Sequence,
    Table, TableDiff,
};
use tracing::{debug, trace, warn};

use crate::document::{Document, Element, Node, XML_DECLARATION};
use crate::error::{ChangelogError, ChangelogResult};
use crate::id::{ChangeSetIdGenerator, UuidIdGenerator, sanitize_id};
use crate::options::ChangelogOptions;
use crate::output::ChangelogOutput;
use crate::platform::{Platform, default_platform};

/// Name of the changelog root element.
pub const ROOT_ELEMENT: &str = "databaseChangeLog";

static PARENTHESIZED: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\(.*?\)").ok());

/// Destination of finished changelog nodes.
pub trait ChangelogSink {
    /// What the sink yields once finished.
    type Output;

    /// Open the changelog root.
    fn open(&mut self) -> ChangelogResult<()>;

    /// Receive a finished child of the root.
    fn append(&mut self, node: Node) -> ChangelogResult<()>;

    /// Close the changelog root.
    fn close(&mut self) -> ChangelogResult<()>;

    /// Consume the sink.
    fn into_output(self) -> ChangelogResult<Self::Output>;
}

/// Collects the changelog into an in-memory [`Document`].
#[derive(Debug, Clone, Default)]
pub struct DomSink {
    document: Document,
    root: Option<Element>,
}

impl DomSink {
    /// Create a sink with an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink appending to an existing document.
    pub fn with_document(document: Document) -> Self {
        Self {
            document,
            root: None,
        }
    }

    /// The document built so far. The root only appears once closed.
    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl ChangelogSink for DomSink {
    type Output = Document;

    fn open(&mut self) -> ChangelogResult<()> {
        self.root = Some(Element::new(ROOT_ELEMENT));
        Ok(())
    }

    fn append(&mut self, node: Node) -> ChangelogResult<()> {
        match self.root.as_mut() {
            Some(root) => {
                root.push(node);
                Ok(())
            }
            None => Err(ChangelogError::NotStarted),
        }
    }

    fn close(&mut self) -> ChangelogResult<()> {
        let root = self.root.take().ok_or(ChangelogError::NotStarted)?;
        self.document.push(root);
        Ok(())
    }

    fn into_output(self) -> ChangelogResult<Document> {
        Ok(self.document)
    }
}

/// Writes the changelog incrementally to any [`Write`].
#[derive(Debug)]
pub struct StreamSink<W: Write> {
    writer: W,
    has_children: bool,
}

impl<W: Write> StreamSink<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            has_children: false,
        }
    }
}

impl<W: Write> ChangelogSink for StreamSink<W> {
    type Output = W;

    fn open(&mut self) -> ChangelogResult<()> {
        writeln!(self.writer, "{}", XML_DECLARATION)?;
        Ok(())
    }

    fn append(&mut self, node: Node) -> ChangelogResult<()> {
        // The root start tag waits for the first child so an empty
        // changelog can self-close.
        let mut buf = String::new();
        if !self.has_children {
            buf.push('<');
            buf.push_str(ROOT_ELEMENT);
            buf.push('>');
            self.has_children = true;
        }
        buf.push('\n');
        node.render(&mut buf, 1);
        self.writer.write_all(buf.as_bytes())?;
        Ok(())
    }

    fn close(&mut self) -> ChangelogResult<()> {
        if self.has_children {
            writeln!(self.writer, "\n</{}>", ROOT_ELEMENT)?;
        } else {
            writeln!(self.writer, "<{}/>", ROOT_ELEMENT)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    fn into_output(self) -> ChangelogResult<W> {
        Ok(self.writer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Started,
    Terminated,
}

/// Changelog output building an in-memory document.
pub type DomChangelogOutput = ChangelogEmitter<DomSink>;

/// Changelog output streaming to a writer.
pub type StreamingChangelogOutput<W> = ChangelogEmitter<StreamSink<W>>;

/// Translates schema and diff events into change sets.
pub struct ChangelogEmitter<S: ChangelogSink> {
    sink: S,
    options: ChangelogOptions,
    ids: Box<dyn ChangeSetIdGenerator>,
    platform: Arc<dyn Platform>,
    state: State,
    change_sets: usize,
    unsupported: usize,
}

impl ChangelogEmitter<DomSink> {
    /// Create an output building a fresh document.
    pub fn new(options: ChangelogOptions) -> Self {
        Self::with_sink(DomSink::new(), options)
    }
}

impl<W: Write> ChangelogEmitter<StreamSink<W>> {
    /// Create an output streaming to `writer`.
    pub fn streaming(writer: W, options: ChangelogOptions) -> Self {
        Self::with_sink(StreamSink::new(writer), options)
    }
}

impl<S: ChangelogSink> ChangelogEmitter<S> {
    /// Create an output delivering nodes to `sink`.
    pub fn with_sink(sink: S, options: ChangelogOptions) -> Self {
        Self {
            sink,
            options,
            ids: Box::new(UuidIdGenerator),
            platform: default_platform(),
            state: State::Idle,
            change_sets: 0,
            unsupported: 0,
        }
    }

    /// Replace the generator of unique change-set id tokens.
    pub fn with_id_generator(mut self, ids: impl ChangeSetIdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// The options of this run.
    pub fn options(&self) -> &ChangelogOptions {
        &self.options
    }

    /// The platform currently bound.
    pub fn platform(&self) -> &dyn Platform {
        self.platform.as_ref()
    }

    /// The sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Number of change sets emitted so far.
    pub fn change_set_count(&self) -> usize {
        self.change_sets
    }

    /// Number of changes degraded to a comment so far.
    pub fn unsupported_count(&self) -> usize {
        self.unsupported
    }

    /// Resolve the type token written for `column`.
    ///
    /// An explicit column definition is used verbatim. Otherwise the type
    /// comes from the platform declaration (parenthesized parts removed)
    /// or the logical type name, and the length is appended.
    pub fn column_type(&self, column: &Column) -> String {
        if let Some(definition) = column.column_definition.as_deref().filter(|d| !d.is_empty()) {
            return definition.to_string();
        }

        let mut sql_type = if self.options.use_platform_types {
            let declaration = self.platform.column_declaration_sql(column);
            match PARENTHESIZED.as_ref() {
                Some(re) => re.replace_all(&declaration, "").into_owned(),
                None => declaration,
            }
        } else {
            match column.column_type.name() {
                "integer" => "int",
                "float" => "double",
                "string" => "varchar",
                other => other,
            }
            .to_string()
        };

        if let Some(length) = column.length {
            sql_type.push_str(&format!("({})", length));
        }

        sql_type
    }

    fn ensure_started(&self) -> ChangelogResult<()> {
        match self.state {
            State::Idle => Err(ChangelogError::NotStarted),
            State::Started => Ok(()),
            State::Terminated => Err(ChangelogError::AlreadyTerminated),
        }
    }

    fn change_set(&mut self, slug: &str) -> Element {
        let mut id = sanitize_id(slug);
        if self.options.change_set_unique_id {
            id.push('-');
            id.push_str(&self.ids.next_token());
        }

        Element::new("changeSet")
            .attr("author", self.options.change_set_author.as_str())
            .attr("id", id)
    }

    fn commit(&mut self, change_set: Element) -> ChangelogResult<()> {
        debug!(
            id = change_set.attribute("id").unwrap_or_default(),
            units = change_set.children().len(),
            "Emitting change set"
        );
        self.change_sets += 1;
        self.sink.append(change_set.into())
    }

    fn unsupported(&mut self, text: String) -> Node {
        warn!(comment = %text.trim(), "Change is not expressible in the changelog");
        self.unsupported += 1;
        Node::comment(text)
    }

    fn fill_column(&self, column: &Column, index_columns: &IndexColumns) -> Element {
        let name = QualifiedName::from_asset(column);
        let mut element = Element::new("column")
            .attr("name", name.name())
            .attr("type", self.column_type(column));

        if let Some(remarks) = column.comment.as_deref().filter(|c| !c.is_empty()) {
            element.set_attribute("remarks", remarks);
        }
        if let Some(default) = column.default.as_deref() {
            element.set_attribute("defaultValue", default);
        }

        let primary_key = index_columns.is_primary(&column.name);
        let unique = index_columns.unique_index(&column.name);
        let nullable = column.is_nullable();

        if primary_key || !nullable || unique.is_some() {
            let mut constraints = Element::new("constraints");
            if primary_key {
                constraints.set_attribute("primaryKey", "true");
            }
            if !nullable {
                constraints.set_attribute("nullable", "false");
            }
            if let Some(index) = unique {
                constraints.set_attribute("unique", "true");
                if !index.name.is_empty() {
                    constraints.set_attribute("uniqueConstraintName", index.name.as_str());
                }
            }
            element.push(constraints);
        }

        element
    }

    fn fill_foreign_key(
        &self,
        foreign_key: &ForeignKeyConstraint,
        table_name: &QualifiedName,
    ) -> Element {
        let referenced = QualifiedName::from_qualified_name(&foreign_key.foreign_table_name);

        Element::new("addForeignKeyConstraint")
            .attr("constraintName", foreign_key.name.as_str())
            .attr_opt("baseTableSchemaName", table_name.namespace_name())
            .attr("baseTableName", table_name.name())
            .attr("baseColumnNames", foreign_key.local_columns.join(","))
            .attr_opt("referencedTableSchemaName", referenced.namespace_name())
            .attr("referencedTableName", referenced.name())
            .attr("referencedColumnNames", foreign_key.foreign_columns.join(","))
    }

    fn alter_table_rename(
        &self,
        diff: &TableDiff,
        table_name: QualifiedName,
        change_set: &mut Element,
    ) -> QualifiedName {
        match diff.new_name.as_deref() {
            Some(new_name) if new_name != table_name.name() => {
                trace!(from = %table_name, to = new_name, "renameTable");
                change_set.push(
                    Element::new("renameTable")
                        .attr_opt("schemaName", table_name.namespace_name())
                        .attr("oldTableName", table_name.name())
                        .attr("newTableName", new_name),
                );
                table_name.with_name(new_name)
            }
            _ => table_name,
        }
    }

    fn alter_table_added_indexes(
        &self,
        diff: &TableDiff,
        table_name: &QualifiedName,
        index_columns: &IndexColumns,
        change_set: &mut Element,
    ) -> ChangelogResult<()> {
        for index in diff.added_indexes.values() {
            let mut create_index = table_unit("createIndex", table_name)
                .attr("indexName", index.name.as_str())
                .attr("unique", if index.is_unique { "true" } else { "false" });

            for column_name in &index.columns {
                let column = diff.resolve_column(column_name).ok_or_else(|| {
                    ChangelogError::unknown_index_column(
                        &diff.from_table.name,
                        &index.name,
                        column_name,
                    )
                })?;
                create_index.push(self.fill_column(column, index_columns));
            }

            change_set.push(create_index);
        }
        Ok(())
    }

    fn alter_table_changed_column(
        &mut self,
        column_diff: &ColumnDiff,
        table_name: &QualifiedName,
        change_set: &mut Element,
    ) {
        let old_name = column_diff.old_column_name();
        let new_name = QualifiedName::from_asset(&column_diff.column);

        if old_name.name() != new_name.name() {
            change_set.push(
                table_unit("renameColumn", table_name)
                    .attr("oldColumnName", old_name.name())
                    .attr("newColumnName", new_name.name()),
            );
        }

        let mut properties = column_diff.changed_properties.clone();
        if let Some(position) = properties.iter().position(|p| p == "type") {
            properties.remove(position);
            change_set.push(
                table_unit("modifyDataType", table_name)
                    .attr("columnName", new_name.name())
                    .attr("newDataType", self.column_type(&column_diff.column)),
            );
        }

        if !properties.is_empty() {
            let comment = self.unsupported(format!(
                " Some column property changes are not supported (column: {} for properties [{}])",
                column_diff.old_column_name,
                properties.join(", ")
            ));
            change_set.push(comment);
        }
    }
}

/// An element carrying the optional `schemaName` and the `tableName`.
fn table_unit(name: &str, table_name: &QualifiedName) -> Element {
    Element::new(name)
        .attr_opt("schemaName", table_name.namespace_name())
        .attr("tableName", table_name.name())
}

impl<S: ChangelogSink> ChangelogOutput for ChangelogEmitter<S> {
    type Output = S::Output;

    fn started(&mut self, platform: Arc<dyn Platform>) -> ChangelogResult<()> {
        match self.state {
            State::Idle => {}
            State::Started => return Err(ChangelogError::other("changelog output already started")),
            State::Terminated => return Err(ChangelogError::AlreadyTerminated),
        }

        debug!(platform = platform.name(), "Changelog started");
        self.platform = platform;
        self.sink.open()?;
        self.state = State::Started;
        Ok(())
    }

    fn create_schema(&mut self, namespace: &str) -> ChangelogResult<()> {
        self.ensure_started()?;

        let sql = match self.platform.create_schema_sql(namespace) {
            Ok(sql) => sql,
            Err(e) => {
                debug!(error = %e, namespace, "Falling back to generic CREATE SCHEMA");
                format!("CREATE SCHEMA `{}`", namespace)
            }
        };

        let change_set = self
            .change_set(&format!("create-schema-{}", namespace))
            .child(Element::new("sql").child(Node::text(sql)));
        self.commit(change_set)
    }

    fn drop_foreign_key(
        &mut self,
        foreign_key: &ForeignKeyConstraint,
        table: &Table,
    ) -> ChangelogResult<()> {
        self.ensure_started()?;

        let table_name = QualifiedName::from_asset(table);
        let foreign_key_name = QualifiedName::from_asset(foreign_key);

        let change_set = self
            .change_set(&format!("drop-foreign-key-{}", foreign_key.name))
            .child(
                Element::new("dropForeignKeyConstraint")
                    .attr_opt("baseTableSchemaName", table_name.namespace_name())
                    .attr("baseTableName", table_name.name())
                    .attr("constraintName", foreign_key_name.name()),
            );
        self.commit(change_set)
    }

    fn alter_sequence(&mut self, sequence: &Sequence) -> ChangelogResult<()> {
        self.ensure_started()?;

        let comment = self.unsupported(format!(
            " alterSequence is not supported (sequence: {})",
            sequence.name
        ));
        self.sink.append(comment)
    }

    fn drop_sequence(&mut self, sequence: &Sequence) -> ChangelogResult<()> {
        self.ensure_started()?;

        let sequence_name = QualifiedName::from_asset(sequence);
        let change_set = self
            .change_set(&format!("drop-sequence-{}", sequence.name))
            .child(
                Element::new("dropSequence")
                    .attr_opt("schemaName", sequence_name.namespace_name())
                    .attr("sequenceName", sequence_name.name()),
            );
        self.commit(change_set)
    }

    fn create_sequence(&mut self, sequence: &Sequence) -> ChangelogResult<()> {
        self.ensure_started()?;

        let sequence_name = QualifiedName::from_asset(sequence);
        let change_set = self
            .change_set(&format!("create-sequence-{}", sequence.name))
            .child(
                Element::new("createSequence")
                    .attr_opt("schemaName", sequence_name.namespace_name())
                    .attr("sequenceName", sequence_name.name())
                    .attr("startValue", sequence.initial_value.to_string()),
            );
        self.commit(change_set)
    }

    fn create_table(&mut self, table: &Table) -> ChangelogResult<()> {
        self.ensure_started()?;

        let table_name = QualifiedName::from_asset(table);
        let index_columns = IndexColumns::new(table);
        let mut change_set = self.change_set(&format!("create-table-{}", table.name));

        let mut create_table = table_unit("createTable", &table_name);
        for column in &table.columns {
            create_table.push(self.fill_column(column, &index_columns));
        }
        change_set.push(create_table);

        for index in index_columns.other_indexes() {
            trace!(table = %table_name, index = %index.name, "createIndex");
            let mut create_index =
                table_unit("createIndex", &table_name).attr("indexName", index.name.as_str());
            if index.is_unique {
                create_index.set_attribute("unique", "true");
            }
            for column in &index.columns {
                create_index.push(Element::new("column").attr("name", column.as_str()));
            }
            change_set.push(create_index);
        }

        self.commit(change_set)
    }

    fn create_foreign_key(
        &mut self,
        foreign_key: &ForeignKeyConstraint,
        table: &Table,
    ) -> ChangelogResult<()> {
        self.ensure_started()?;

        let unit = self.fill_foreign_key(foreign_key, &QualifiedName::from_asset(table));
        let change_set = self
            .change_set(&format!("create-foreign-keys-{}", table.name))
            .child(unit);
        self.commit(change_set)
    }

    fn drop_table(&mut self, table: &Table) -> ChangelogResult<()> {
        self.ensure_started()?;

        let table_name = QualifiedName::from_asset(table);
        let change_set = self
            .change_set(&format!("drop-table-{}", table.name))
            .child(table_unit("dropTable", &table_name));
        self.commit(change_set)
    }

    fn alter_table(&mut self, diff: &TableDiff) -> ChangelogResult<()> {
        self.ensure_started()?;

        let from_table = &diff.from_table;
        let mut change_set = self.change_set(&format!("alter-table-{}", from_table.name));

        let table_name =
            self.alter_table_rename(diff, QualifiedName::from_asset(from_table), &mut change_set);
        let index_columns = IndexColumns::new(from_table);

        if !diff.added_columns.is_empty() {
            let mut add_column = table_unit("addColumn", &table_name);
            for column in diff.added_columns.values() {
                add_column.push(self.fill_column(column, &index_columns));
            }
            change_set.push(add_column);
        }

        self.alter_table_added_indexes(diff, &table_name, &index_columns, &mut change_set)?;

        for foreign_key in &diff.added_foreign_keys {
            change_set.push(self.fill_foreign_key(foreign_key, &table_name));
        }

        for (old_name, column) in &diff.renamed_columns {
            change_set.push(
                table_unit("renameColumn", &table_name)
                    .attr("oldColumnName", old_name.as_str())
                    .attr("newColumnName", QualifiedName::from_asset(column).name()),
            );
        }

        for (old_name, index) in &diff.renamed_indexes {
            let comment = self.unsupported(format!(
                " renameIndex is not supported (index: {} => {})",
                old_name, index.name
            ));
            change_set.push(comment);
        }

        for column_diff in &diff.changed_columns {
            self.alter_table_changed_column(column_diff, &table_name, &mut change_set);
        }

        for index in &diff.changed_indexes {
            let comment = self.unsupported(format!(
                " index changes are not supported (index: {})",
                index.name
            ));
            change_set.push(comment);
        }

        for foreign_key in &diff.changed_foreign_keys {
            let comment = self.unsupported(format!(
                " foreign key changes are not supported (foreignKey: {})",
                foreign_key.name
            ));
            change_set.push(comment);
        }

        for column in diff.removed_columns.values() {
            change_set.push(
                table_unit("dropColumn", &table_name)
                    .attr("columnName", QualifiedName::from_asset(column).name()),
            );
        }

        for index in diff.removed_indexes.values() {
            change_set.push(
                table_unit("dropIndex", &table_name)
                    .attr("indexName", QualifiedName::from_asset(index).name()),
            );
        }

        for removed in &diff.removed_foreign_keys {
            change_set.push(
                Element::new("dropForeignKeyConstraint")
                    .attr_opt("baseTableSchemaName", table_name.namespace_name())
                    .attr("baseTableName", table_name.name())
                    .attr("constraintName", removed.qualified_name().name()),
            );
        }

        self.commit(change_set)
    }

    fn terminated(&mut self) -> ChangelogResult<()> {
        self.ensure_started()?;

        self.sink.close()?;
        self.state = State::Terminated;
        debug!(
            change_sets = self.change_sets,
            unsupported = self.unsupported,
            "Changelog terminated"
        );
        Ok(())
    }

    fn finish(self) -> ChangelogResult<S::Output> {
        self.sink.into_output()
    }
}

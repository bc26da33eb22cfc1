//! Schema diffs and a name-based schema differ.

use indexmap::IndexMap;
use tracing::debug;

use crate::ast::{Column, ForeignKeyConstraint, Index, Schema, Sequence, Table};
use crate::name::{Asset, QualifiedName};

/// A diff between two schemas.
#[derive(Debug, Clone, Default)]
pub struct SchemaDiff {
    /// Namespaces to create.
    pub new_namespaces: Vec<String>,
    /// Foreign keys left pointing at removed tables.
    pub orphaned_foreign_keys: Vec<OrphanedForeignKey>,
    /// Sequences whose definition changed.
    pub changed_sequences: Vec<Sequence>,
    /// Sequences to drop.
    pub removed_sequences: Vec<Sequence>,
    /// Sequences to create.
    pub new_sequences: Vec<Sequence>,
    /// Tables to create.
    pub new_tables: Vec<Table>,
    /// Tables to drop.
    pub removed_tables: Vec<Table>,
    /// Tables to alter.
    pub changed_tables: Vec<TableDiff>,
}

impl SchemaDiff {
    /// Check if there are any differences.
    pub fn is_empty(&self) -> bool {
        self.new_namespaces.is_empty()
            && self.orphaned_foreign_keys.is_empty()
            && self.changed_sequences.is_empty()
            && self.removed_sequences.is_empty()
            && self.new_sequences.is_empty()
            && self.new_tables.is_empty()
            && self.removed_tables.is_empty()
            && self.changed_tables.is_empty()
    }

    /// Get a human-readable summary of the diff.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        if !self.new_namespaces.is_empty() {
            parts.push(format!("Create {} namespaces", self.new_namespaces.len()));
        }
        if !self.orphaned_foreign_keys.is_empty() {
            parts.push(format!(
                "Drop {} orphaned foreign keys",
                self.orphaned_foreign_keys.len()
            ));
        }
        if !self.changed_sequences.is_empty() {
            parts.push(format!("Alter {} sequences", self.changed_sequences.len()));
        }
        if !self.removed_sequences.is_empty() {
            parts.push(format!("Drop {} sequences", self.removed_sequences.len()));
        }
        if !self.new_sequences.is_empty() {
            parts.push(format!("Create {} sequences", self.new_sequences.len()));
        }
        if !self.new_tables.is_empty() {
            parts.push(format!("Create {} tables", self.new_tables.len()));
        }
        if !self.removed_tables.is_empty() {
            parts.push(format!("Drop {} tables", self.removed_tables.len()));
        }
        if !self.changed_tables.is_empty() {
            parts.push(format!("Alter {} tables", self.changed_tables.len()));
        }

        if parts.is_empty() {
            "No changes".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// A foreign key together with the table that owns it.
#[derive(Debug, Clone)]
pub struct OrphanedForeignKey {
    /// The constraint.
    pub foreign_key: ForeignKeyConstraint,
    /// The table the constraint is declared on.
    pub local_table: Table,
}

/// A removed foreign key, known either by name or by full definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovedForeignKey {
    /// Only the (possibly dotted) constraint name is known.
    Name(String),
    /// The full constraint definition is known.
    Constraint(ForeignKeyConstraint),
}

impl RemovedForeignKey {
    /// Resolve either form into a qualified constraint name.
    pub fn qualified_name(&self) -> QualifiedName {
        match self {
            Self::Name(name) => QualifiedName::from_qualified_name(name),
            Self::Constraint(fk) => QualifiedName::from_asset(fk),
        }
    }
}

impl From<ForeignKeyConstraint> for RemovedForeignKey {
    fn from(fk: ForeignKeyConstraint) -> Self {
        Self::Constraint(fk)
    }
}

impl From<&str> for RemovedForeignKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for RemovedForeignKey {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// The changes to a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDiff {
    /// Name of the column before the change.
    pub old_column_name: String,
    /// The column after the change.
    pub column: Column,
    /// Names of the changed properties, in detection order.
    pub changed_properties: Vec<String>,
}

impl ColumnDiff {
    /// Create a column diff with no changed properties.
    pub fn new(old_column_name: impl Into<String>, column: Column) -> Self {
        Self {
            old_column_name: old_column_name.into(),
            column,
            changed_properties: Vec::new(),
        }
    }

    /// Set the changed properties, builder style.
    pub fn with_changed_properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.changed_properties = properties.into_iter().map(Into::into).collect();
        self
    }

    /// Whether a property is listed as changed.
    pub fn has_changed(&self, property: &str) -> bool {
        self.changed_properties.iter().any(|p| p == property)
    }

    /// Qualified previous name of the column.
    pub fn old_column_name(&self) -> QualifiedName {
        QualifiedName::from_asset(self.old_column_name.as_str())
    }
}

/// The changes to a single table.
#[derive(Debug, Clone)]
pub struct TableDiff {
    /// The table before the change.
    pub from_table: Table,
    /// New table name, when renamed.
    pub new_name: Option<String>,
    /// Columns to add, keyed by name.
    pub added_columns: IndexMap<String, Column>,
    /// Renamed columns, keyed by old name.
    pub renamed_columns: IndexMap<String, Column>,
    /// Columns whose definition changed.
    pub changed_columns: Vec<ColumnDiff>,
    /// Columns to drop, keyed by name.
    pub removed_columns: IndexMap<String, Column>,
    /// Indexes to add, keyed by name.
    pub added_indexes: IndexMap<String, Index>,
    /// Renamed indexes, keyed by old name.
    pub renamed_indexes: IndexMap<String, Index>,
    /// Indexes whose definition changed.
    pub changed_indexes: Vec<Index>,
    /// Indexes to drop, keyed by name.
    pub removed_indexes: IndexMap<String, Index>,
    /// Foreign keys to add.
    pub added_foreign_keys: Vec<ForeignKeyConstraint>,
    /// Foreign keys whose definition changed.
    pub changed_foreign_keys: Vec<ForeignKeyConstraint>,
    /// Foreign keys to drop.
    pub removed_foreign_keys: Vec<RemovedForeignKey>,
}

impl TableDiff {
    /// Create an empty diff for `from_table`.
    pub fn new(from_table: Table) -> Self {
        Self {
            from_table,
            new_name: None,
            added_columns: IndexMap::new(),
            renamed_columns: IndexMap::new(),
            changed_columns: Vec::new(),
            removed_columns: IndexMap::new(),
            added_indexes: IndexMap::new(),
            renamed_indexes: IndexMap::new(),
            changed_indexes: Vec::new(),
            removed_indexes: IndexMap::new(),
            added_foreign_keys: Vec::new(),
            changed_foreign_keys: Vec::new(),
            removed_foreign_keys: Vec::new(),
        }
    }

    /// Check if the diff carries any change.
    pub fn is_empty(&self) -> bool {
        self.new_name.is_none()
            && self.added_columns.is_empty()
            && self.renamed_columns.is_empty()
            && self.changed_columns.is_empty()
            && self.removed_columns.is_empty()
            && self.added_indexes.is_empty()
            && self.renamed_indexes.is_empty()
            && self.changed_indexes.is_empty()
            && self.removed_indexes.is_empty()
            && self.added_foreign_keys.is_empty()
            && self.changed_foreign_keys.is_empty()
            && self.removed_foreign_keys.is_empty()
    }

    /// Resolve a column by name from the existing table, then from the
    /// columns added by this diff.
    pub fn resolve_column(&self, name: &str) -> Option<&Column> {
        self.from_table
            .get_column(name)
            .or_else(|| self.added_columns.get(name))
    }
}

/// Schema differ comparing assets by name.
///
/// Renames are never detected: a renamed table or column shows up as a
/// removal plus an addition.
pub struct SchemaDiffer {
    /// Source schema (current database state).
    source: Option<Schema>,
    /// Target schema (desired state).
    target: Schema,
}

impl SchemaDiffer {
    /// Create a new differ with only the target schema.
    pub fn new(target: Schema) -> Self {
        Self {
            source: None,
            target,
        }
    }

    /// Set the source schema.
    pub fn with_source(mut self, source: Schema) -> Self {
        self.source = Some(source);
        self
    }

    /// Compute the diff between schemas.
    pub fn diff(&self) -> SchemaDiff {
        let empty = Schema::default();
        compare_schemas(self.source.as_ref().unwrap_or(&empty), &self.target)
    }
}

/// Compute the diff turning `from` into `to`.
pub fn compare_schemas(from: &Schema, to: &Schema) -> SchemaDiff {
    let mut result = SchemaDiff::default();

    let from_namespaces = namespaces_of(from);
    for namespace in namespaces_of(to) {
        if !from_namespaces.contains(&namespace) {
            result.new_namespaces.push(namespace);
        }
    }

    for table in &to.tables {
        match from.get_table(&table.name) {
            None => result.new_tables.push(table.clone()),
            Some(from_table) => {
                let diff = diff_tables(from_table, table);
                if !diff.is_empty() {
                    result.changed_tables.push(diff);
                }
            }
        }
    }

    for table in &from.tables {
        if !to.has_table(&table.name) {
            result.removed_tables.push(table.clone());
        }
    }

    // Keys on surviving tables that still point at a dropped table.
    for removed in &result.removed_tables {
        for table in &from.tables {
            if !to.has_table(&table.name) {
                continue;
            }
            for fk in &table.foreign_keys {
                if fk.references(&removed.name) {
                    result.orphaned_foreign_keys.push(OrphanedForeignKey {
                        foreign_key: fk.clone(),
                        local_table: table.clone(),
                    });
                }
            }
        }
    }

    // An orphaned key is dropped once, ahead of the table alterations.
    for orphan in &result.orphaned_foreign_keys {
        let orphan_name = QualifiedName::from_asset(&orphan.foreign_key);
        for diff in &mut result.changed_tables {
            if diff.from_table.name == orphan.local_table.name {
                diff.removed_foreign_keys
                    .retain(|removed| removed.qualified_name() != orphan_name);
            }
        }
    }
    result.changed_tables.retain(|diff| !diff.is_empty());

    for sequence in &to.sequences {
        match from.get_sequence(&sequence.name) {
            None => result.new_sequences.push(sequence.clone()),
            Some(old) if sequence_changed(old, sequence) => {
                result.changed_sequences.push(sequence.clone())
            }
            Some(_) => {}
        }
    }

    for sequence in &from.sequences {
        if !to.has_sequence(&sequence.name) {
            result.removed_sequences.push(sequence.clone());
        }
    }

    debug!(summary = %result.summary(), "Compared schemas");

    result
}

fn namespaces_of(schema: &Schema) -> Vec<String> {
    let mut namespaces: Vec<String> = Vec::new();
    let mut push = |ns: &str| {
        if !ns.is_empty() && !namespaces.iter().any(|n| n == ns) {
            namespaces.push(ns.to_string());
        }
    };

    for ns in &schema.namespaces {
        push(ns);
    }
    for table in &schema.tables {
        if let Some(ns) = table.namespace_name() {
            push(ns);
        }
    }
    for sequence in &schema.sequences {
        if let Some(ns) = sequence.namespace_name() {
            push(ns);
        }
    }

    namespaces
}

fn sequence_changed(from: &Sequence, to: &Sequence) -> bool {
    from.initial_value != to.initial_value || from.allocation_size != to.allocation_size
}

/// Diff two versions of the same table.
pub fn diff_tables(from: &Table, to: &Table) -> TableDiff {
    let mut diff = TableDiff::new(from.clone());

    for column in &to.columns {
        match from.get_column(&column.name) {
            None => {
                diff.added_columns.insert(column.name.clone(), column.clone());
            }
            Some(old) => {
                let properties = changed_column_properties(old, column);
                if !properties.is_empty() {
                    diff.changed_columns.push(
                        ColumnDiff::new(&old.name, column.clone())
                            .with_changed_properties(properties),
                    );
                }
            }
        }
    }

    for column in &from.columns {
        if !to.has_column(&column.name) {
            diff.removed_columns.insert(column.name.clone(), column.clone());
        }
    }

    for index in &to.indexes {
        match from.get_index(&index.name) {
            None => {
                diff.added_indexes.insert(index.name.clone(), index.clone());
            }
            Some(old) if old != index => diff.changed_indexes.push(index.clone()),
            Some(_) => {}
        }
    }

    for index in &from.indexes {
        if to.get_index(&index.name).is_none() {
            diff.removed_indexes.insert(index.name.clone(), index.clone());
        }
    }

    for fk in &to.foreign_keys {
        match from.get_foreign_key(&fk.name) {
            None => diff.added_foreign_keys.push(fk.clone()),
            Some(old) if old != fk => diff.changed_foreign_keys.push(fk.clone()),
            Some(_) => {}
        }
    }

    for fk in &from.foreign_keys {
        if to.get_foreign_key(&fk.name).is_none() {
            diff.removed_foreign_keys
                .push(RemovedForeignKey::Constraint(fk.clone()));
        }
    }

    diff
}

/// Names of the properties that differ between two versions of a column.
pub fn changed_column_properties(from: &Column, to: &Column) -> Vec<String> {
    let mut properties = Vec::new();

    if from.column_type != to.column_type {
        properties.push("type");
    }
    if from.length != to.length {
        properties.push("length");
    }
    if from.precision != to.precision {
        properties.push("precision");
    }
    if from.scale != to.scale {
        properties.push("scale");
    }
    if from.fixed != to.fixed {
        properties.push("fixed");
    }
    if from.unsigned != to.unsigned {
        properties.push("unsigned");
    }
    if from.autoincrement != to.autoincrement {
        properties.push("autoincrement");
    }
    if from.not_null != to.not_null {
        properties.push("notnull");
    }
    if from.default != to.default {
        properties.push("default");
    }
    if from.comment != to.comment {
        properties.push("comment");
    }
    if from.column_definition != to.column_definition {
        properties.push("columnDefinition");
    }

    properties.into_iter().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ColumnType;
    use pretty_assertions::assert_eq;

    fn users() -> Table {
        Table::new("users")
            .with_column(Column::new("id", ColumnType::Integer))
            .with_column(Column::new("email", ColumnType::String).length(255))
            .with_primary_key(["id"])
    }

    #[test]
    fn test_schema_diff_empty() {
        let diff = SchemaDiff::default();
        assert!(diff.is_empty());
        assert_eq!(diff.summary(), "No changes");
    }

    #[test]
    fn test_schema_diff_summary() {
        let mut diff = SchemaDiff::default();
        diff.new_tables.push(users());
        diff.removed_sequences.push(Sequence::new("old_seq"));

        let summary = diff.summary();
        assert!(summary.contains("Create 1 tables"));
        assert!(summary.contains("Drop 1 sequences"));
    }

    #[test]
    fn test_differ_without_source_creates_everything() {
        let target = Schema::new("public")
            .with_table(users())
            .with_sequence(Sequence::new("users_seq"));

        let diff = SchemaDiffer::new(target).diff();

        assert_eq!(diff.new_tables.len(), 1);
        assert_eq!(diff.new_sequences.len(), 1);
        assert!(diff.removed_tables.is_empty());
        assert!(diff.changed_tables.is_empty());
    }

    #[test]
    fn test_diff_added_removed_changed_columns() {
        let from = users().with_column(Column::new("legacy", ColumnType::Text));
        let to = Table::new("users")
            .with_column(Column::new("id", ColumnType::BigInt))
            .with_column(Column::new("email", ColumnType::String).length(320))
            .with_column(Column::new("name", ColumnType::String).nullable())
            .with_primary_key(["id"]);

        let diff = diff_tables(&from, &to);

        assert_eq!(diff.added_columns.keys().collect::<Vec<_>>(), ["name"]);
        assert_eq!(diff.removed_columns.keys().collect::<Vec<_>>(), ["legacy"]);
        assert_eq!(diff.changed_columns.len(), 2);
        assert_eq!(diff.changed_columns[0].changed_properties, ["type"]);
        assert_eq!(diff.changed_columns[1].changed_properties, ["length"]);
        assert!(diff.changed_indexes.is_empty());
    }

    #[test]
    fn test_diff_indexes_and_foreign_keys() {
        let from = users()
            .with_index(Index::new("idx_email", ["email"]))
            .with_foreign_key(ForeignKeyConstraint::new("fk_team", ["team_id"], "teams", ["id"]));
        let to = users()
            .with_index(Index::unique("idx_email", ["email"]))
            .with_index(Index::new("idx_id_email", ["id", "email"]))
            .with_foreign_key(ForeignKeyConstraint::new("fk_org", ["org_id"], "orgs", ["id"]));

        let diff = diff_tables(&from, &to);

        assert_eq!(diff.changed_indexes.len(), 1);
        assert_eq!(diff.added_indexes.keys().collect::<Vec<_>>(), ["idx_id_email"]);
        assert_eq!(diff.added_foreign_keys.len(), 1);
        assert_eq!(
            diff.removed_foreign_keys[0].qualified_name().name(),
            "fk_team"
        );
    }

    #[test]
    fn test_orphaned_foreign_keys() {
        let teams = Table::new("teams").with_column(Column::new("id", ColumnType::Integer));
        let members = Table::new("members")
            .with_column(Column::new("team_id", ColumnType::Integer))
            .with_foreign_key(ForeignKeyConstraint::new("fk_team", ["team_id"], "teams", ["id"]));

        let from = Schema::new("public").with_table(teams).with_table(members.clone());
        let to = Schema::new("public").with_table(members);

        let diff = compare_schemas(&from, &to);

        assert_eq!(diff.removed_tables.len(), 1);
        assert_eq!(diff.orphaned_foreign_keys.len(), 1);
        assert_eq!(diff.orphaned_foreign_keys[0].local_table.name, "members");
    }

    #[test]
    fn test_orphaned_foreign_key_is_not_dropped_twice() {
        let legacy = Table::new("legacy").with_column(Column::new("id", ColumnType::Integer));
        let from = Schema::new("public").with_table(legacy).with_table(
            users()
                .with_column(Column::new("legacy_id", ColumnType::Integer))
                .with_foreign_key(ForeignKeyConstraint::new(
                    "fk_users_legacy",
                    ["legacy_id"],
                    "legacy",
                    ["id"],
                ))
                .with_foreign_key(ForeignKeyConstraint::new("fk_team", ["id"], "teams", ["id"])),
        );
        let to = Schema::new("public").with_table(
            users().with_column(Column::new("legacy_id", ColumnType::Integer)),
        );

        let diff = compare_schemas(&from, &to);

        assert_eq!(diff.orphaned_foreign_keys.len(), 1);
        assert_eq!(diff.orphaned_foreign_keys[0].foreign_key.name, "fk_users_legacy");
        assert_eq!(diff.changed_tables.len(), 1);
        let removed: Vec<_> = diff.changed_tables[0]
            .removed_foreign_keys
            .iter()
            .map(|fk| fk.qualified_name().name().to_string())
            .collect();
        assert_eq!(removed, ["fk_team"]);
    }

    #[test]
    fn test_table_diff_emptied_by_orphans_is_dropped() {
        let legacy = Table::new("legacy").with_column(Column::new("id", ColumnType::Integer));
        let users_with_fk = users().with_foreign_key(ForeignKeyConstraint::new(
            "fk_users_legacy",
            ["id"],
            "legacy",
            ["id"],
        ));
        let from = Schema::new("public").with_table(legacy).with_table(users_with_fk);
        let to = Schema::new("public").with_table(users());

        let diff = compare_schemas(&from, &to);

        assert_eq!(diff.orphaned_foreign_keys.len(), 1);
        assert!(diff.changed_tables.is_empty());
        assert_eq!(
            diff.summary(),
            "Drop 1 orphaned foreign keys, Drop 1 tables"
        );
    }

    #[test]
    fn test_new_namespaces_and_changed_sequences() {
        let from = Schema::new("public").with_sequence(Sequence::new("seq"));
        let to = Schema::new("public")
            .with_table(Table::new("billing.invoices"))
            .with_sequence(Sequence::new("seq").initial_value(100));

        let diff = compare_schemas(&from, &to);

        assert_eq!(diff.new_namespaces, ["billing"]);
        assert_eq!(diff.changed_sequences.len(), 1);
    }

    #[test]
    fn test_removed_foreign_key_forms_resolve_alike() {
        let by_name = RemovedForeignKey::from("ns.fk_a");
        let by_constraint = RemovedForeignKey::from(ForeignKeyConstraint::new(
            "ns.fk_a",
            ["a"],
            "ns.other",
            ["id"],
        ));

        assert_eq!(by_name.qualified_name(), by_constraint.qualified_name());
    }

    #[test]
    fn test_resolve_column_prefers_existing_table() {
        let mut diff = TableDiff::new(users());
        diff.added_columns
            .insert("nickname".into(), Column::new("nickname", ColumnType::String));

        assert!(diff.resolve_column("email").is_some());
        assert!(diff.resolve_column("nickname").is_some());
        assert!(diff.resolve_column("missing").is_none());
    }
}

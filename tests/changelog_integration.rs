//! Integration tests for full and diff changelog generation.
//!
//! The fixture schema mirrors a small application: an integer-keyed
//! table, a string-keyed table, a table with secondary indexes and a
//! table whose column names are SQL keywords.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use schemalog::changelog::{
    ChangelogEmitter, ChangelogError, ChangelogGenerator, ChangelogOptions, DomSink,
    MySqlPlatform, SequentialIdGenerator,
};
use schemalog::schema::{Column, ColumnType, Index, Schema, Table};

fn fixture_schema() -> Schema {
    Schema::new("test")
        .with_table(
            Table::new("Bar")
                .with_column(Column::new("id", ColumnType::String).length(255))
                .with_primary_key(["id"]),
        )
        .with_table(
            Table::new("Foo")
                .with_column(Column::new("id", ColumnType::Integer).autoincrement(true))
                .with_primary_key(["id"]),
        )
        .with_table(
            Table::new("IndexColumns")
                .with_column(Column::new("id", ColumnType::Integer).autoincrement(true))
                .with_column(Column::new("date", ColumnType::Date).nullable())
                .with_column(Column::new("libelle", ColumnType::String).length(255).nullable())
                .with_column(
                    Column::new("commentaire", ColumnType::String)
                        .length(500)
                        .nullable(),
                )
                .with_primary_key(["id"])
                .with_index(Index::new("IDX_9BEF3AA1AA9E377A", ["date"]))
                .with_index(Index::new("IDX_9BEF3AA1A4D60759", ["libelle"]))
                .with_index(Index::new("IDX_9BEF3AA167F068BC", ["commentaire"])),
        )
        .with_table(
            Table::new("ReservedKeywords")
                .with_column(Column::new("id", ColumnType::Integer).autoincrement(true))
                .with_column(Column::new("from", ColumnType::Date))
                .with_column(Column::new("to", ColumnType::DateTime))
                .with_primary_key(["id"]),
        )
}

const FIXTURE_TABLES: &str = r#"  <changeSet author="schemalog" id="create-table-Bar">
    <createTable tableName="Bar">
      <column name="id" type="varchar(255)">
        <constraints primaryKey="true" nullable="false"/>
      </column>
    </createTable>
  </changeSet>
  <changeSet author="schemalog" id="create-table-Foo">
    <createTable tableName="Foo">
      <column name="id" type="int">
        <constraints primaryKey="true" nullable="false"/>
      </column>
    </createTable>
  </changeSet>
  <changeSet author="schemalog" id="create-table-IndexColumns">
    <createTable tableName="IndexColumns">
      <column name="id" type="int">
        <constraints primaryKey="true" nullable="false"/>
      </column>
      <column name="date" type="date"/>
      <column name="libelle" type="varchar(255)"/>
      <column name="commentaire" type="varchar(500)"/>
    </createTable>
    <createIndex tableName="IndexColumns" indexName="IDX_9BEF3AA1AA9E377A">
      <column name="date"/>
    </createIndex>
    <createIndex tableName="IndexColumns" indexName="IDX_9BEF3AA1A4D60759">
      <column name="libelle"/>
    </createIndex>
    <createIndex tableName="IndexColumns" indexName="IDX_9BEF3AA167F068BC">
      <column name="commentaire"/>
    </createIndex>
  </changeSet>
  <changeSet author="schemalog" id="create-table-ReservedKeywords">
    <createTable tableName="ReservedKeywords">
      <column name="id" type="int">
        <constraints primaryKey="true" nullable="false"/>
      </column>
      <column name="from" type="date">
        <constraints nullable="false"/>
      </column>
      <column name="to" type="datetime">
        <constraints nullable="false"/>
      </column>
    </createTable>
  </changeSet>
"#;

fn generator() -> ChangelogGenerator {
    schemalog::logging::init();
    ChangelogGenerator::new(Arc::new(MySqlPlatform), fixture_schema())
}

fn fixed_ids() -> Option<ChangelogOptions> {
    Some(ChangelogOptions::new().change_set_unique_id(false))
}

#[test]
fn test_create_with_default_options() {
    let document = generator().changelog(fixed_ids(), None).unwrap();

    let expected = format!(
        "<?xml version=\"1.0\"?>\n<databaseChangeLog>\n  <changeSet author=\"schemalog\" id=\"create-schema-test\">\n    <sql>CREATE SCHEMA `test`</sql>\n  </changeSet>\n{}</databaseChangeLog>\n",
        FIXTURE_TABLES
    );
    assert_eq!(document.to_xml(), expected);
}

#[test]
fn test_update_from_empty_database() {
    let generator = generator().with_introspector(|| Ok::<_, ChangelogError>(Schema::new("test")));
    let document = generator.diff_changelog(fixed_ids(), None).unwrap();

    let expected = format!(
        "<?xml version=\"1.0\"?>\n<databaseChangeLog>\n{}</databaseChangeLog>\n",
        FIXTURE_TABLES
    );
    assert_eq!(document.to_xml(), expected);
}

#[test]
fn test_update_from_up_to_date_database() {
    let current = fixture_schema()
        .with_table(Table::new("liquibase"))
        .with_table(Table::new("liquibase_lock"));
    let generator = generator().with_introspector(move || Ok::<_, ChangelogError>(current.clone()));

    let document = generator.diff_changelog(fixed_ids(), None).unwrap();
    assert_eq!(
        document.to_xml(),
        "<?xml version=\"1.0\"?>\n<databaseChangeLog/>\n"
    );
}

#[test]
fn test_unique_ids_are_suffixed() {
    let document = generator().changelog(None, None).unwrap();
    let root = document.root().unwrap();

    let ids: Vec<&str> = root
        .elements_named("changeSet")
        .filter_map(|c| c.attribute("id"))
        .collect();
    assert_eq!(ids.len(), 5);

    for (id, slug) in ids.iter().zip([
        "create-schema-test",
        "create-table-Bar",
        "create-table-Foo",
        "create-table-IndexColumns",
        "create-table-ReservedKeywords",
    ]) {
        let token = id
            .strip_prefix(slug)
            .and_then(|rest| rest.strip_prefix('-'))
            .unwrap();
        assert_eq!(token.len(), 13);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }
}

#[test]
fn test_deterministic_ids_with_custom_output() {
    let output = ChangelogEmitter::with_sink(DomSink::new(), ChangelogOptions::new())
        .with_id_generator(SequentialIdGenerator::new());
    let schema = Schema::new("test").with_table(Table::new("Foo_Bar.v2"));

    let document = generator().changelog_with(output, Some(&schema)).unwrap();
    let xml = document.to_xml();

    assert!(xml.contains(r#"id="create-schema-test-0000000000000""#));
    assert!(xml.contains(r#"id="create-table-Foo-Bar-v2-0000000000001""#));
}

#[test]
fn test_streaming_matches_dom() {
    let dom_options = ChangelogOptions::new()
        .change_set_unique_id(false)
        .use_platform_types(true);
    let stream_options = dom_options.clone();

    let document = generator().changelog(Some(dom_options), None).unwrap();
    let bytes = generator()
        .changelog_with(
            ChangelogEmitter::streaming(Vec::new(), stream_options),
            None,
        )
        .unwrap();

    assert_eq!(String::from_utf8(bytes).unwrap(), document.to_xml());
}

#[test]
fn test_platform_types() {
    let options = ChangelogOptions::new()
        .change_set_unique_id(false)
        .use_platform_types(true);
    let document = generator().changelog(Some(options), None).unwrap();
    let xml = document.to_xml();

    assert!(xml.contains(r#"<column name="id" type="VARCHAR(255)">"#));
    assert!(xml.contains(r#"<column name="id" type="INT AUTO_INCREMENT">"#));
    assert!(xml.contains(r#"<column name="commentaire" type="VARCHAR(500)"/>"#));
    assert!(xml.contains(r#"<column name="to" type="DATETIME">"#));
}

#[test]
fn test_output_reused_after_terminated_fails() {
    use schemalog::changelog::ChangelogOutput;

    let mut output = ChangelogEmitter::new(ChangelogOptions::new());
    output.started(Arc::new(MySqlPlatform)).unwrap();
    output.terminated().unwrap();

    let err = output.create_schema("test").unwrap_err();
    assert!(matches!(err, ChangelogError::AlreadyTerminated));
    assert!(err.is_lifecycle());
}

#[test]
fn test_namespaced_foreign_keys_and_sequences() {
    use schemalog::changelog::PostgreSqlPlatform;
    use schemalog::schema::{ForeignKeyConstraint, Sequence};

    let schema = Schema::new("billing")
        .with_table(
            Table::new("billing.invoices")
                .with_column(Column::new("id", ColumnType::BigInt))
                .with_column(Column::new("customer_id", ColumnType::Integer))
                .with_primary_key(["id"])
                .with_foreign_key(ForeignKeyConstraint::new(
                    "fk_invoices_customer",
                    ["customer_id"],
                    "crm.customers",
                    ["id"],
                )),
        )
        .with_sequence(Sequence::new("billing.invoice_seq").initial_value(1000));

    let generator = ChangelogGenerator::new(Arc::new(PostgreSqlPlatform), schema);
    let xml = generator.changelog(fixed_ids(), None).unwrap().to_xml();

    insta::assert_snapshot!(xml.trim_end(), @r#"
    <?xml version="1.0"?>
    <databaseChangeLog>
      <changeSet author="schemalog" id="create-schema-billing">
        <sql>CREATE SCHEMA billing</sql>
      </changeSet>
      <changeSet author="schemalog" id="create-table-billing-invoices">
        <createTable schemaName="billing" tableName="invoices">
          <column name="id" type="bigint">
            <constraints primaryKey="true" nullable="false"/>
          </column>
          <column name="customer_id" type="int">
            <constraints nullable="false"/>
          </column>
        </createTable>
      </changeSet>
      <changeSet author="schemalog" id="create-foreign-keys-billing-invoices">
        <addForeignKeyConstraint constraintName="fk_invoices_customer" baseTableSchemaName="billing" baseTableName="invoices" baseColumnNames="customer_id" referencedTableSchemaName="crm" referencedTableName="customers" referencedColumnNames="id"/>
      </changeSet>
      <changeSet author="schemalog" id="create-sequence-billing-invoice-seq">
        <createSequence schemaName="billing" sequenceName="invoice_seq" startValue="1000"/>
      </changeSet>
    </databaseChangeLog>
    "#);
}

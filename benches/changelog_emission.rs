//! Benchmarks for changelog emission.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use schemalog::changelog::{ChangelogEmitter, ChangelogGenerator, ChangelogOptions, PostgreSqlPlatform};
use schemalog::schema::{
    Column, ColumnType, ForeignKeyConstraint, Index, Schema, Sequence, Table, compare_schemas,
};

/// A schema of `tables` tables, each with a few columns, one secondary
/// index and a foreign key to the previous table.
fn schema(tables: usize) -> Schema {
    let mut schema = Schema::new("bench");
    for i in 0..tables {
        let mut table = Table::new(format!("table_{}", i))
            .with_column(Column::new("id", ColumnType::BigInt).autoincrement(true))
            .with_column(Column::new("name", ColumnType::String).length(120))
            .with_column(Column::new("note", ColumnType::Text).nullable())
            .with_column(Column::new("created_at", ColumnType::DateTime))
            .with_primary_key(["id"])
            .with_index(Index::new(format!("idx_{}_created", i), ["created_at"]));
        if i > 0 {
            table = table
                .with_column(Column::new("parent_id", ColumnType::BigInt).nullable())
                .with_foreign_key(ForeignKeyConstraint::new(
                    format!("fk_{}_parent", i),
                    ["parent_id"],
                    format!("table_{}", i - 1),
                    ["id"],
                ));
        }
        schema = schema.with_table(table);
    }
    schema.with_sequence(Sequence::new("bench_seq"))
}

/// Benchmark full changelogs into a document.
fn bench_full_changelog(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_changelog");

    for tables in [10, 100] {
        let generator = ChangelogGenerator::new(Arc::new(PostgreSqlPlatform), schema(tables));
        group.throughput(Throughput::Elements(tables as u64));

        group.bench_with_input(BenchmarkId::new("dom", tables), &tables, |b, _| {
            b.iter(|| black_box(generator.changelog(None, None)))
        });

        group.bench_with_input(BenchmarkId::new("dom_to_xml", tables), &tables, |b, _| {
            b.iter(|| {
                let document = generator.changelog(None, None).ok();
                black_box(document.map(|d| d.to_xml()))
            })
        });

        group.bench_with_input(BenchmarkId::new("streaming", tables), &tables, |b, _| {
            b.iter(|| {
                let output = ChangelogEmitter::streaming(Vec::new(), ChangelogOptions::new());
                black_box(generator.changelog_with(output, None))
            })
        });
    }

    group.finish();
}

/// Benchmark diff computation and diff changelogs.
fn bench_diff_changelog(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_changelog");

    let current = schema(50);
    let mut desired = schema(60);
    for table in desired.tables.iter_mut().step_by(5) {
        table.columns.push(Column::new("extra", ColumnType::Boolean).nullable());
    }

    group.bench_function("compare_schemas", |b| {
        b.iter(|| black_box(compare_schemas(&current, &desired)))
    });

    let diff = compare_schemas(&current, &desired);
    let generator = ChangelogGenerator::new(Arc::new(PostgreSqlPlatform), desired.clone());
    group.bench_function("from_schema_diff", |b| {
        b.iter(|| black_box(generator.diff_changelog_from_schema_diff(&diff, None)))
    });

    group.finish();
}

/// Benchmark column type resolution.
fn bench_column_type(c: &mut Criterion) {
    let mut group = c.benchmark_group("column_type");

    let column = Column::new("amount", ColumnType::Decimal).precision(12, 2);

    let logical = ChangelogEmitter::new(ChangelogOptions::new());
    group.bench_function("logical", |b| b.iter(|| black_box(logical.column_type(&column))));

    let native = ChangelogEmitter::new(ChangelogOptions::new().use_platform_types(true));
    group.bench_function("platform", |b| b.iter(|| black_box(native.column_type(&column))));

    group.finish();
}

criterion_group!(
    benches,
    bench_full_changelog,
    bench_diff_changelog,
    bench_column_type,
);

criterion_main!(benches);

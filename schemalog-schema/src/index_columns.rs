//! Classification of a table's indexes into constraint buckets.

use indexmap::IndexMap;

use crate::ast::{Index, Table};

/// A table's indexes partitioned by how they surface in a changelog.
///
/// Every index lands in exactly one bucket, first matching rule wins:
///
/// 1. primary indexes contribute their columns to the primary key list;
/// 2. unique single-column indexes are keyed by their column name
///    (a later index on the same column replaces an earlier one);
/// 3. everything else is kept as a standalone index.
#[derive(Debug, Clone, Default)]
pub struct IndexColumns {
    primary_indexes: usize,
    primary_columns: Vec<String>,
    unique_columns: IndexMap<String, Index>,
    other_indexes: Vec<Index>,
}

impl IndexColumns {
    /// Classify the indexes of `table`.
    pub fn new(table: &Table) -> Self {
        Self::from_indexes(&table.indexes)
    }

    /// Classify a slice of indexes, in the order given.
    pub fn from_indexes<'a>(indexes: impl IntoIterator<Item = &'a Index>) -> Self {
        let mut result = Self::default();

        for index in indexes {
            if index.is_primary {
                result.primary_indexes += 1;
                result.primary_columns.extend(index.columns.iter().cloned());
            } else if index.is_unique && index.is_single_column() {
                result
                    .unique_columns
                    .insert(index.columns[0].clone(), index.clone());
            } else {
                result.other_indexes.push(index.clone());
            }
        }

        result
    }

    /// Columns of the primary key, in index order.
    pub fn primary_key_columns(&self) -> &[String] {
        &self.primary_columns
    }

    /// Alias of [`IndexColumns::primary_key_columns`].
    pub fn primary_columns(&self) -> &[String] {
        self.primary_key_columns()
    }

    /// Unique single-column indexes keyed by column name.
    pub fn unique_columns(&self) -> &IndexMap<String, Index> {
        &self.unique_columns
    }

    /// Indexes that are neither primary nor unique single-column.
    pub fn other_indexes(&self) -> &[Index] {
        &self.other_indexes
    }

    /// Whether `column` is part of the primary key.
    pub fn is_primary(&self, column: &str) -> bool {
        self.primary_columns.iter().any(|c| c == column)
    }

    /// The unique index constraining `column` on its own, if any.
    pub fn unique_index(&self, column: &str) -> Option<&Index> {
        self.unique_columns.get(column)
    }

    /// Number of indexes that went through classification, minus unique
    /// indexes replaced by a later one on the same column.
    pub fn index_count(&self) -> usize {
        self.primary_indexes + self.unique_columns.len() + self.other_indexes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition() {
        let table = Table::new("t")
            .with_index(Index::primary("pk", ["a", "b"]))
            .with_index(Index::unique("uniq_c", ["c"]))
            .with_index(Index::unique("uniq_de", ["d", "e"]))
            .with_index(Index::new("idx_f", ["f"]));

        let columns = IndexColumns::new(&table);

        assert_eq!(columns.primary_key_columns(), ["a", "b"]);
        assert_eq!(columns.primary_columns(), columns.primary_key_columns());
        assert_eq!(columns.unique_columns().len(), 1);
        assert_eq!(columns.unique_index("c").map(|i| i.name.as_str()), Some("uniq_c"));
        let others: Vec<_> = columns.other_indexes().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(others, ["uniq_de", "idx_f"]);
    }

    #[test]
    fn test_every_index_lands_in_one_bucket() {
        let indexes = vec![
            Index::primary("pk", ["id"]),
            Index::unique("u1", ["email"]),
            Index::unique("u2", ["email", "tenant"]),
            Index::new("i1", ["created_at"]),
            Index::new("i2", ["a", "b"]),
            Index::unique("u3", ["slug"]),
        ];

        let columns = IndexColumns::from_indexes(&indexes);

        assert_eq!(columns.index_count(), indexes.len());
    }

    #[test]
    fn test_single_column_primary_is_not_unique_bucket() {
        let table = Table::new("t").with_index(Index::primary("pk", ["id"]));
        let columns = IndexColumns::new(&table);

        assert!(columns.is_primary("id"));
        assert!(columns.unique_columns().is_empty());
        assert!(columns.other_indexes().is_empty());
    }

    #[test]
    fn test_unique_collision_last_write_wins() {
        let table = Table::new("t")
            .with_index(Index::unique("first", ["email"]))
            .with_index(Index::unique("second", ["email"]));

        let columns = IndexColumns::new(&table);

        assert_eq!(columns.unique_columns().len(), 1);
        assert_eq!(columns.unique_index("email").map(|i| i.name.as_str()), Some("second"));
    }

    #[test]
    fn test_composite_primary_flattened_in_order() {
        let table = Table::new("t")
            .with_index(Index::primary("pk", ["tenant", "id"]))
            .with_index(Index::new("idx", ["tenant"]));

        let columns = IndexColumns::new(&table);

        assert!(columns.is_primary("tenant"));
        assert!(columns.is_primary("id"));
        assert_eq!(columns.primary_key_columns(), ["tenant", "id"]);
        assert_eq!(columns.other_indexes().len(), 1);
    }
}

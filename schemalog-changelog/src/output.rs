//! The changelog output capability.

use std::sync::Arc;

use schemalog_schema::{ForeignKeyConstraint, Sequence, Table, TableDiff};

use crate::error::ChangelogResult;
use crate::platform::Platform;

/// Receiver of schema and diff events, producing a changelog.
///
/// A run calls [`started`](ChangelogOutput::started) once, any number of
/// emission methods, then [`terminated`](ChangelogOutput::terminated).
/// Emission before `started` fails with
/// [`NotStarted`](crate::ChangelogError::NotStarted); anything after
/// `terminated` fails with
/// [`AlreadyTerminated`](crate::ChangelogError::AlreadyTerminated).
pub trait ChangelogOutput {
    /// What the output yields once finished.
    type Output;

    /// Bind the run to a platform and open the changelog root.
    fn started(&mut self, platform: Arc<dyn Platform>) -> ChangelogResult<()>;

    /// Create a namespace.
    fn create_schema(&mut self, namespace: &str) -> ChangelogResult<()>;

    /// Drop a foreign key declared on `table`.
    fn drop_foreign_key(
        &mut self,
        foreign_key: &ForeignKeyConstraint,
        table: &Table,
    ) -> ChangelogResult<()>;

    /// Record a sequence change. Not expressible, so only a comment is
    /// emitted.
    fn alter_sequence(&mut self, sequence: &Sequence) -> ChangelogResult<()>;

    /// Drop a sequence.
    fn drop_sequence(&mut self, sequence: &Sequence) -> ChangelogResult<()>;

    /// Create a sequence.
    fn create_sequence(&mut self, sequence: &Sequence) -> ChangelogResult<()>;

    /// Create a table with its columns and secondary indexes.
    fn create_table(&mut self, table: &Table) -> ChangelogResult<()>;

    /// Add a foreign key to `table`.
    fn create_foreign_key(
        &mut self,
        foreign_key: &ForeignKeyConstraint,
        table: &Table,
    ) -> ChangelogResult<()>;

    /// Drop a table.
    fn drop_table(&mut self, table: &Table) -> ChangelogResult<()>;

    /// Apply every change of a table diff in one change set.
    fn alter_table(&mut self, diff: &TableDiff) -> ChangelogResult<()>;

    /// Close the changelog root.
    fn terminated(&mut self) -> ChangelogResult<()>;

    /// Consume the output and return its result.
    fn finish(self) -> ChangelogResult<Self::Output>
    where
        Self: Sized;
}

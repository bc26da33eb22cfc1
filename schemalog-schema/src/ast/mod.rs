//! Schema model types.

mod schema;
mod sequence;
mod table;
mod types;

pub use schema::Schema;
pub use sequence::Sequence;
pub use table::{Column, ForeignKeyConstraint, Index, Table};
pub use types::ColumnType;

//! Logical column types.

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Platform-independent column type.
///
/// The logical name is what a column carries before any dialect-specific
/// rendering. Unknown names are preserved as [`ColumnType::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    /// 32-bit integer.
    Integer,
    /// 16-bit integer.
    SmallInt,
    /// 64-bit integer.
    BigInt,
    /// Variable-length string.
    String,
    /// Unbounded text.
    Text,
    /// Boolean.
    Boolean,
    /// Double precision floating point.
    Float,
    /// Fixed precision decimal.
    Decimal,
    /// Calendar date.
    Date,
    /// Date and time without zone.
    DateTime,
    /// Date and time with zone.
    DateTimeTz,
    /// Time of day.
    Time,
    /// JSON document.
    Json,
    /// Variable-length binary string.
    Binary,
    /// Binary large object.
    Blob,
    /// UUID / GUID.
    Guid,
    /// Any other logical type name.
    Custom(SmolStr),
}

impl ColumnType {
    /// The logical type name.
    pub fn name(&self) -> &str {
        match self {
            Self::Integer => "integer",
            Self::SmallInt => "smallint",
            Self::BigInt => "bigint",
            Self::String => "string",
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::DateTimeTz => "datetimetz",
            Self::Time => "time",
            Self::Json => "json",
            Self::Binary => "binary",
            Self::Blob => "blob",
            Self::Guid => "guid",
            Self::Custom(name) => name.as_str(),
        }
    }

    /// Parse a logical type name. Never fails; unknown names become `Custom`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "integer" => Self::Integer,
            "smallint" => Self::SmallInt,
            "bigint" => Self::BigInt,
            "string" => Self::String,
            "text" => Self::Text,
            "boolean" => Self::Boolean,
            "float" => Self::Float,
            "decimal" => Self::Decimal,
            "date" => Self::Date,
            "datetime" => Self::DateTime,
            "datetimetz" => Self::DateTimeTz,
            "time" => Self::Time,
            "json" => Self::Json,
            "binary" => Self::Binary,
            "blob" => Self::Blob,
            "guid" => Self::Guid,
            other => Self::Custom(SmolStr::new(other)),
        }
    }

    /// Whether values of this type are sized by a length.
    pub fn is_length_bound(&self) -> bool {
        matches!(self, Self::String | Self::Binary)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for ColumnType {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<&str> for ColumnType {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

impl From<ColumnType> for String {
    fn from(ty: ColumnType) -> Self {
        ty.name().to_string()
    }
}

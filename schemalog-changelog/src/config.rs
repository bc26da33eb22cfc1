//! Configuration file parsing for `schemalog.toml`.
//!
//! ```toml
//! platform = "postgresql"
//!
//! [output]
//! use_platform_types = false
//! change_set_unique_id = true
//! change_set_author = "schemalog"
//!
//! [diff]
//! ignored_tables = ["liquibase", "liquibase_lock"]
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ChangelogError, ChangelogResult};
use crate::options::ChangelogOptions;
use crate::platform::{MySqlPlatform, Platform, PostgreSqlPlatform, SqlServerPlatform, SqlitePlatform};

/// Main configuration structure for `schemalog.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChangelogConfig {
    /// Target database dialect.
    #[serde(default)]
    pub platform: PlatformKind,

    /// Change-set rendering options.
    #[serde(default)]
    pub output: ChangelogOptions,

    /// Diff mode settings.
    #[serde(default)]
    pub diff: DiffConfig,
}

impl ChangelogConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> ChangelogResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ChangelogError::config(format!("failed to read {}: {}", path.display(), e))
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> ChangelogResult<Self> {
        toml::from_str(content).map_err(|e| ChangelogError::config(e.to_string()))
    }
}

/// Supported database dialects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    /// MySQL / MariaDB.
    #[default]
    MySql,
    /// PostgreSQL.
    #[serde(alias = "postgres")]
    PostgreSql,
    /// SQLite.
    Sqlite,
    /// Microsoft SQL Server.
    #[serde(alias = "sqlserver")]
    Mssql,
}

impl PlatformKind {
    /// Instantiate the dialect.
    pub fn platform(self) -> Arc<dyn Platform> {
        match self {
            Self::MySql => Arc::new(MySqlPlatform),
            Self::PostgreSql => Arc::new(PostgreSqlPlatform),
            Self::Sqlite => Arc::new(SqlitePlatform),
            Self::Mssql => Arc::new(SqlServerPlatform),
        }
    }
}

/// Diff mode configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DiffConfig {
    /// Bookkeeping tables removed from the current schema before comparing.
    #[serde(default = "default_ignored_tables")]
    pub ignored_tables: Vec<String>,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            ignored_tables: default_ignored_tables(),
        }
    }
}

fn default_ignored_tables() -> Vec<String> {
    vec!["liquibase".to_string(), "liquibase_lock".to_string()]
}

//! Per-run changelog output options.

use serde::{Deserialize, Serialize};

/// Author written on every change set unless configured otherwise.
pub const DEFAULT_CHANGE_SET_AUTHOR: &str = "schemalog";

/// Options controlling how change sets are rendered.
///
/// Options are frozen once an output is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangelogOptions {
    /// Render native platform types instead of logical type names.
    #[serde(default)]
    pub use_platform_types: bool,

    /// Suffix change-set ids with a unique token.
    #[serde(default = "default_true")]
    pub change_set_unique_id: bool,

    /// Author attribute of every change set.
    #[serde(default = "default_author")]
    pub change_set_author: String,
}

impl Default for ChangelogOptions {
    fn default() -> Self {
        Self {
            use_platform_types: false,
            change_set_unique_id: true,
            change_set_author: default_author(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_author() -> String {
    DEFAULT_CHANGE_SET_AUTHOR.to_string()
}

impl ChangelogOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Render native platform types.
    pub fn use_platform_types(mut self, enabled: bool) -> Self {
        self.use_platform_types = enabled;
        self
    }

    /// Suffix change-set ids with a unique token.
    pub fn change_set_unique_id(mut self, enabled: bool) -> Self {
        self.change_set_unique_id = enabled;
        self
    }

    /// Set the change-set author.
    pub fn change_set_author(mut self, author: impl Into<String>) -> Self {
        self.change_set_author = author.into();
        self
    }
}

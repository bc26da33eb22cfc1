//! Sequence definitions.

use serde::{Deserialize, Serialize};

use crate::name::Asset;

fn default_one() -> i64 {
    1
}

/// A database sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    /// Sequence name. May be namespace-qualified.
    pub name: String,
    /// Declared namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// First value handed out.
    #[serde(default = "default_one")]
    pub initial_value: i64,
    /// Increment between values.
    #[serde(default = "default_one")]
    pub allocation_size: i64,
}

impl Sequence {
    /// Create a sequence starting at 1.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            initial_value: 1,
            allocation_size: 1,
        }
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the initial value.
    pub fn initial_value(mut self, value: i64) -> Self {
        self.initial_value = value;
        self
    }

    /// Set the allocation size.
    pub fn allocation_size(mut self, size: i64) -> Self {
        self.allocation_size = size;
        self
    }
}

impl Asset for Sequence {
    fn name(&self) -> &str {
        &self.name
    }

    fn declared_namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

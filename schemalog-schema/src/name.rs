//! Asset naming and namespace qualification.
//!
//! Every named schema object (table, column, index, foreign key, sequence)
//! implements [`Asset`]. An asset name may already carry its namespace
//! (`"app.users"`), or the namespace may be declared next to a bare name.
//! [`QualifiedName`] normalizes both shapes into a `(namespace, name)` pair.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named schema object that may live inside a namespace.
pub trait Asset {
    /// The name exactly as declared. May be dotted (`"ns.name"`).
    fn name(&self) -> &str;

    /// The namespace explicitly declared on the asset, if any.
    fn declared_namespace(&self) -> Option<&str> {
        None
    }

    /// The namespace this asset belongs to.
    ///
    /// An explicitly declared namespace wins; otherwise the part of the
    /// name before the first dot is used.
    fn namespace_name(&self) -> Option<&str> {
        match self.declared_namespace() {
            Some(ns) if !ns.is_empty() => Some(ns),
            _ => self.name().split_once('.').map(|(ns, _)| ns),
        }
    }

    /// The shortest name that identifies this asset inside `namespace`.
    fn shortest_name(&self, namespace: &str) -> &str {
        let name = self.name();
        name.strip_prefix(namespace)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(name)
    }
}

/// A `(namespace, local name)` pair.
///
/// `name` is always the final, local segment; it is never the full dotted
/// string when a namespace could be determined.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedName {
    name: String,
    namespace_name: Option<String>,
}

impl QualifiedName {
    /// Create a qualified name from its parts.
    pub fn new(name: impl Into<String>, namespace_name: Option<String>) -> Self {
        Self {
            name: name.into(),
            namespace_name: namespace_name.filter(|ns| !ns.is_empty()),
        }
    }

    /// Split a possibly dotted identifier at its first dot.
    ///
    /// `"a.b.c"` yields namespace `a` and name `b.c`; `"name"` has no
    /// namespace.
    pub fn from_qualified_name(qualified_name: &str) -> Self {
        match qualified_name.split_once('.') {
            Some((namespace, name)) => Self::new(name, Some(namespace.to_string())),
            None => Self::new(qualified_name, None),
        }
    }

    /// Build a qualified name from an asset that knows its own namespace.
    pub fn from_asset<A: Asset + ?Sized>(asset: &A) -> Self {
        match asset.namespace_name() {
            Some(namespace) if !namespace.is_empty() => Self::new(
                asset.shortest_name(namespace),
                Some(namespace.to_string()),
            ),
            _ => Self::new(asset.name(), None),
        }
    }

    /// The local name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The namespace, if any.
    pub fn namespace_name(&self) -> Option<&str> {
        self.namespace_name.as_deref()
    }

    /// Replace the local name, keeping the namespace.
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace_name: self.namespace_name.clone(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace_name {
            Some(ns) => write!(f, "{}.{}", ns, self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl Asset for str {
    fn name(&self) -> &str {
        self
    }
}

impl Asset for String {
    fn name(&self) -> &str {
        self
    }
}

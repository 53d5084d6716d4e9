//! Store target and behavior configuration.
//!
//! A [`GraphConfig`] is resolved once and threaded through
//! [`SimpleGraph::with_config`](crate::SimpleGraph::with_config); every
//! operation afterwards connects to the same [`StoreTarget`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Where the graph lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreTarget {
    /// A SQLite database file. A connection is opened per operation.
    File(PathBuf),
    /// A private in-memory database shared by all operations of one graph.
    Memory,
}

impl StoreTarget {
    pub fn file<P: AsRef<Path>>(path: P) -> Self {
        StoreTarget::File(path.as_ref().to_path_buf())
    }

    /// Resolves a database file name inside a directory.
    ///
    /// ```rust
    /// use simplegraph::StoreTarget;
    /// let target = StoreTarget::in_dir("/tmp", "database.sqlite");
    /// assert_eq!(target, StoreTarget::file("/tmp/database.sqlite"));
    /// ```
    pub fn in_dir<D: AsRef<Path>, N: AsRef<Path>>(dir: D, name: N) -> Self {
        StoreTarget::File(dir.as_ref().join(name))
    }
}

/// What happens when an identical `(source, target, properties)` edge is inserted twice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EdgeConflict {
    /// The new row silently replaces the old one; one row remains.
    #[default]
    Replace,
    /// The duplicate insert fails with a constraint violation.
    Reject,
}

impl EdgeConflict {
    /// Conflict clause used in the `edges` table definition.
    pub fn as_sql(self) -> &'static str {
        match self {
            EdgeConflict::Replace => "REPLACE",
            EdgeConflict::Reject => "ABORT",
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            EdgeConflict::Replace => "replace",
            EdgeConflict::Reject => "reject",
        }
    }

    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value {
            "replace" => Some(EdgeConflict::Replace),
            "reject" => Some(EdgeConflict::Reject),
            _ => None,
        }
    }
}

/// Complete configuration for opening a graph.
///
/// # Default Configuration
///
/// ```rust
/// use simplegraph::{EdgeConflict, GraphConfig, StoreTarget};
/// let config = GraphConfig::default();
/// assert_eq!(config.target, StoreTarget::Memory);
/// assert_eq!(config.edge_conflict, EdgeConflict::Replace);
/// assert_eq!(config.batch_size, 500);
/// assert!(config.pragma_settings.is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct GraphConfig {
    pub target: StoreTarget,

    /// Duplicate edge policy, fixed in the schema when the store is first created.
    ///
    /// **Default:** [`EdgeConflict::Replace`]
    pub edge_conflict: EdgeConflict,

    /// Maximum rows per bulk insert statement.
    ///
    /// Keeps the number of bound parameters (3 per edge row) below SQLite's
    /// variable limit. Larger bulk calls are split into several statements
    /// inside one transaction.
    pub batch_size: usize,

    /// Extra `PRAGMA` settings applied to every connection after `foreign_keys = ON`.
    pub pragma_settings: HashMap<String, String>,
}

impl GraphConfig {
    pub fn new(target: StoreTarget) -> Self {
        Self {
            target,
            edge_conflict: EdgeConflict::default(),
            batch_size: 500,
            pragma_settings: HashMap::new(),
        }
    }

    pub fn file<P: AsRef<Path>>(path: P) -> Self {
        Self::new(StoreTarget::file(path))
    }

    pub fn memory() -> Self {
        Self::new(StoreTarget::Memory)
    }

    pub fn with_edge_conflict(mut self, edge_conflict: EdgeConflict) -> Self {
        self.edge_conflict = edge_conflict;
        self
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self::memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_dir_joins_path() {
        let target = StoreTarget::in_dir("/tmp", "database.sqlite");
        assert_eq!(target, StoreTarget::File(PathBuf::from("/tmp/database.sqlite")));
    }

    #[test]
    fn test_edge_conflict_names_roundtrip() {
        for policy in [EdgeConflict::Replace, EdgeConflict::Reject] {
            assert_eq!(EdgeConflict::parse(policy.as_str()), Some(policy));
        }
        assert_eq!(EdgeConflict::parse("ignore"), None);
    }

    #[test]
    fn test_file_constructor_keeps_defaults() {
        let cfg = GraphConfig::file("graph.db").with_edge_conflict(EdgeConflict::Reject);
        assert_eq!(cfg.target, StoreTarget::file("graph.db"));
        assert_eq!(cfg.edge_conflict, EdgeConflict::Reject);
        assert_eq!(cfg.batch_size, 500);
    }
}

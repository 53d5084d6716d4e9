//! Edge mutations for SimpleGraph.

use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    errors::GraphError,
    statements::{INSERT_EDGE, flatten_edge_args},
};

use super::{
    SimpleGraph,
    core::{execute, text},
};

impl SimpleGraph {
    /// Adds the edge `source -> target`; `properties` defaults to `{}`.
    ///
    /// Both endpoints must exist. Inserting an identical `(source, target,
    /// properties)` triple again follows the store's [`EdgeConflict`](crate::EdgeConflict) policy.
    pub fn connect(
        &self,
        source: &str,
        target: &str,
        properties: Option<&Value>,
    ) -> Result<usize, GraphError> {
        let properties = properties
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        let inserted = self.with_connection(|conn| {
            execute(
                conn,
                INSERT_EDGE,
                &[text(source), text(target), text(&properties.to_string())],
            )
        })?;
        debug!(source, target, "edge added");
        Ok(inserted)
    }

    /// Adds `sources[i] -> targets[i]` for every `i` in one transaction.
    pub fn bulk_connect<S, T>(
        &self,
        sources: &[S],
        targets: &[T],
        properties: Option<&[Value]>,
    ) -> Result<usize, GraphError>
    where
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let defaults;
        let properties = match properties {
            Some(properties) => properties,
            None => {
                defaults = vec![Value::Object(Map::new()); sources.len()];
                &defaults[..]
            }
        };
        let args = flatten_edge_args(sources, targets, properties)?;
        self.bulk_insert(INSERT_EDGE, args, 3)
    }
}

//! Reachability queries for SimpleGraph.

use tracing::debug;

use crate::{
    errors::GraphError,
    traversal::{Direction, RowTag, Traversal, TraversalRow, collect_ids, reconstruct},
};

use super::{SimpleGraph, types::GraphEntry};

impl SimpleGraph {
    /// Ids reachable from `seed` along `direction`, in discovery order.
    ///
    /// With a `target`, stops as soon as it is reached; an unreachable target
    /// yields the full closure. A seed that is not a node yields nothing.
    pub fn traverse(
        &self,
        seed: &str,
        direction: Direction,
        target: Option<&str>,
    ) -> Result<Vec<String>, GraphError> {
        let sql = Traversal::ids(direction).statement();
        debug!(seed, ?direction, ?target, "traverse");
        self.with_connection(|conn| {
            let mut stmt = conn.prepare_cached(&sql).map_err(GraphError::from_sqlite)?;
            let rows = stmt
                .query_map([seed], |row| row.get::<_, String>(0))
                .map_err(GraphError::from_sqlite)?;
            let ids = collect_ids(rows.map(|row| row.map_err(GraphError::from_sqlite)), target)?;
            Ok(ids)
        })
    }

    /// Like [`traverse`](Self::traverse) but returns bodies and the edges walked.
    ///
    /// Each reached node is followed by the edges found while expanding it.
    pub fn traverse_with_bodies(
        &self,
        seed: &str,
        direction: Direction,
        target: Option<&str>,
    ) -> Result<Vec<GraphEntry>, GraphError> {
        let sql = Traversal::bodies(direction).statement();
        debug!(seed, ?direction, ?target, "traverse with bodies");
        self.with_connection(|conn| {
            let mut stmt = conn.prepare_cached(&sql).map_err(GraphError::from_sqlite)?;
            let rows = stmt
                .query_map([seed], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                    ))
                })
                .map_err(GraphError::from_sqlite)?;
            let rows = rows.map(|row| -> Result<TraversalRow, GraphError> {
                let (id, tag, payload) = row.map_err(GraphError::from_sqlite)?;
                Ok(TraversalRow {
                    id,
                    tag: RowTag::parse(&tag)?,
                    payload,
                })
            });
            let entries = reconstruct(rows, target)?;
            Ok(entries)
        })
    }
}

//! Direct neighborhood of one node.

use crate::{
    errors::GraphError,
    statements::{SELECT_EDGES_EITHER, SELECT_EDGES_INBOUND, SELECT_EDGES_OUTBOUND},
    traversal::Direction,
};

use super::{
    SimpleGraph,
    core::{query_rows, text},
    types::{Edge, edge_from_parts, edge_row},
};

impl SimpleGraph {
    /// Edges touching `id` on the given side; a self-loop is reported once.
    ///
    /// An unknown id has no edges, so the result is empty rather than an error.
    pub fn connections(&self, id: &str, direction: Direction) -> Result<Vec<Edge>, GraphError> {
        let rows = self.with_connection(|conn| match direction {
            Direction::Inbound => query_rows(conn, SELECT_EDGES_INBOUND, &[text(id)], edge_row),
            Direction::Outbound => query_rows(conn, SELECT_EDGES_OUTBOUND, &[text(id)], edge_row),
            Direction::Both => query_rows(conn, SELECT_EDGES_EITHER, &[text(id), text(id)], edge_row),
        })?;
        rows.into_iter().map(edge_from_parts).collect()
    }

    pub fn connections_in(&self, id: &str) -> Result<Vec<Edge>, GraphError> {
        self.connections(id, Direction::Inbound)
    }

    pub fn connections_out(&self, id: &str) -> Result<Vec<Edge>, GraphError> {
        self.connections(id, Direction::Outbound)
    }
}

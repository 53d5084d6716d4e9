//! Fixed statement text and the bulk insert codec.

use rusqlite::types::Value as SqlValue;
use serde_json::Value;

use crate::errors::GraphError;

pub const INSERT_NODE: &str = "INSERT INTO nodes VALUES(json(?))";
pub const INSERT_EDGE: &str = "INSERT INTO edges VALUES(?, ?, json(?))";
pub const UPDATE_NODE: &str = "UPDATE nodes SET body = json(?) WHERE id = ?";
pub const DELETE_NODE: &str = "DELETE FROM nodes WHERE id = ?";
/// Deletes every edge where the id is source or target.
pub const DELETE_EDGES: &str = "DELETE FROM edges WHERE source = ? OR target = ?";
pub const SELECT_NODE_EXISTS: &str = "SELECT 1 FROM nodes WHERE id = ?";
pub const SELECT_ALL_BODIES: &str = "SELECT body FROM nodes";
pub const SELECT_ALL_IDS: &str = "SELECT id FROM nodes";
pub const SELECT_ALL_EDGES: &str = "SELECT source, target, properties FROM edges";
pub const SELECT_EDGES_INBOUND: &str =
    "SELECT source, target, properties FROM edges WHERE target = ?";
pub const SELECT_EDGES_OUTBOUND: &str =
    "SELECT source, target, properties FROM edges WHERE source = ?";
pub const SELECT_EDGES_EITHER: &str = "SELECT source, target, properties FROM edges WHERE source = ? \
     UNION SELECT source, target, properties FROM edges WHERE target = ?";

const VALUES_MARKER: &str = "VALUES";

/// Derives an N-row insert from a 1-row insert by repeating its value tuple.
///
/// ```rust
/// use simplegraph::statements::{bulk_insert_statement, INSERT_NODE};
/// let sql = bulk_insert_statement(INSERT_NODE, 3).unwrap();
/// assert_eq!(sql, "INSERT INTO nodes VALUES(json(?)),(json(?)),(json(?))");
/// ```
pub fn bulk_insert_statement(template: &str, rows: usize) -> Result<String, GraphError> {
    if rows == 0 {
        return Err(GraphError::malformed("bulk insert needs at least one row"));
    }
    let template = template.trim();
    let mut parts = template.split(VALUES_MARKER);
    let (Some(head), Some(tuple), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(GraphError::malformed(format!(
            "insert template must contain exactly one {VALUES_MARKER} marker: {template}"
        )));
    };
    let tuples = vec![tuple; rows].join(",");
    Ok(format!("{head}{VALUES_MARKER}{tuples}"))
}

/// Flattens parallel edge lists into `(source, target, properties)` triples.
///
/// Every list must have the same length; otherwise nothing is produced.
pub fn flatten_edge_args<S, T>(
    sources: &[S],
    targets: &[T],
    properties: &[Value],
) -> Result<Vec<SqlValue>, GraphError>
where
    S: AsRef<str>,
    T: AsRef<str>,
{
    let len = sources.len();
    if targets.len() != len {
        return Err(GraphError::mismatched("targets", len, targets.len()));
    }
    if properties.len() != len {
        return Err(GraphError::mismatched("properties", len, properties.len()));
    }
    let mut args = Vec::with_capacity(len * 3);
    for ((source, target), props) in sources.iter().zip(targets).zip(properties) {
        args.push(SqlValue::Text(source.as_ref().to_string()));
        args.push(SqlValue::Text(target.as_ref().to_string()));
        args.push(SqlValue::Text(props.to_string()));
    }
    Ok(args)
}

pub(crate) fn placeholder_count(sql: &str) -> usize {
    sql.matches('?').count()
}

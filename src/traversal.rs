//! Recursive closure statements and reconstruction of their row streams.
//!
//! The closure query emits rows `(x, tag, payload)`. A `node` row carries a
//! reached node and its body; an `in` or `out` row carries the far endpoint
//! of an edge found while expanding some node, plus the edge properties. The
//! query emits a node's own row before the edge rows produced by expanding
//! it, so [`reconstruct`] recovers each edge's near endpoint from row order
//! alone: it is the most recent node row.

use ahash::AHashSet;
use serde_json::Value;

use crate::{
    errors::GraphError,
    graph::{Edge, GraphEntry, Node, types::parse_document},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Follow edges backwards, target to source.
    Inbound,
    /// Follow edges forwards, source to target.
    Outbound,
    Both,
}

impl Direction {
    pub fn inbound(self) -> bool {
        matches!(self, Direction::Inbound | Direction::Both)
    }

    pub fn outbound(self) -> bool {
        matches!(self, Direction::Outbound | Direction::Both)
    }
}

pub const NODE_TAG: &str = "node";
pub const INBOUND_TAG: &str = "in";
pub const OUTBOUND_TAG: &str = "out";

/// Shape of a closure query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Traversal {
    pub direction: Direction,
    pub with_bodies: bool,
}

impl Traversal {
    pub fn ids(direction: Direction) -> Self {
        Self {
            direction,
            with_bodies: false,
        }
    }

    pub fn bodies(direction: Direction) -> Self {
        Self {
            direction,
            with_bodies: true,
        }
    }

    /// Renders the recursive closure; binds exactly one parameter, the seed id.
    pub fn statement(&self) -> String {
        let columns = if self.with_bodies { "x, y, obj" } else { "x" };
        let node_cols = |source: &str| {
            if self.with_bodies {
                format!("{source}, '{NODE_TAG}', body")
            } else {
                source.to_string()
            }
        };
        let edge_cols = |endpoint: &str, tag: &str| {
            if self.with_bodies {
                format!("{endpoint}, '{tag}', properties")
            } else {
                endpoint.to_string()
            }
        };

        let mut parts = vec![format!("SELECT {} FROM nodes WHERE id = ?", node_cols("id"))];
        // id rows would only repeat x; bodies need the node row per reached id
        if self.with_bodies {
            parts.push(format!("SELECT {} FROM nodes JOIN traverse ON id = x", node_cols("id")));
        }
        if self.direction.inbound() {
            parts.push(format!(
                "SELECT {} FROM edges JOIN traverse ON target = x",
                edge_cols("source", INBOUND_TAG)
            ));
        }
        if self.direction.outbound() {
            parts.push(format!(
                "SELECT {} FROM edges JOIN traverse ON source = x",
                edge_cols("target", OUTBOUND_TAG)
            ));
        }
        format!(
            "WITH RECURSIVE traverse({columns}) AS (\n  {}\n) SELECT {columns} FROM traverse",
            parts.join("\n  UNION\n  ")
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowTag {
    Node,
    Inbound,
    Outbound,
}

impl RowTag {
    pub fn parse(tag: &str) -> Result<Self, GraphError> {
        match tag {
            NODE_TAG => Ok(RowTag::Node),
            INBOUND_TAG => Ok(RowTag::Inbound),
            OUTBOUND_TAG => Ok(RowTag::Outbound),
            other => Err(GraphError::query(format!("unknown traversal row tag {other:?}"))),
        }
    }
}

/// One raw row of a closure query with bodies.
#[derive(Clone, Debug, PartialEq)]
pub struct TraversalRow {
    pub id: String,
    pub tag: RowTag,
    pub payload: Option<String>,
}

impl TraversalRow {
    pub fn new<S: Into<String>>(id: S, tag: RowTag, payload: Option<&str>) -> Self {
        Self {
            id: id.into(),
            tag,
            payload: payload.map(str::to_string),
        }
    }
}

/// Rebuilds ordered node and edge entries from closure rows.
///
/// Stops right after the node row for `target`, when one is given. Rows are
/// pulled lazily, so an early stop leaves the rest of the stream unread.
pub fn reconstruct<I>(rows: I, target: Option<&str>) -> Result<Vec<GraphEntry>, GraphError>
where
    I: IntoIterator<Item = Result<TraversalRow, GraphError>>,
{
    let mut entries = Vec::new();
    let mut current_origin: Option<String> = None;
    for row in rows {
        let TraversalRow { id, tag, payload } = row?;
        match tag {
            RowTag::Node => {
                let body = match payload {
                    Some(text) => parse_document(Some(text))?,
                    None => Value::Null,
                };
                current_origin = Some(id.clone());
                let reached_target = target == Some(id.as_str());
                entries.push(GraphEntry::Node(Node { id, body }));
                if reached_target {
                    break;
                }
            }
            RowTag::Inbound | RowTag::Outbound => {
                let origin = current_origin.clone().ok_or_else(|| {
                    GraphError::query(format!("edge row for {id} arrived before any node row"))
                })?;
                let label = parse_document(payload)?;
                let edge = if tag == RowTag::Outbound {
                    Edge::new(origin, id, label)
                } else {
                    Edge::new(id, origin, label)
                };
                entries.push(GraphEntry::Edge(edge));
            }
        }
    }
    Ok(entries)
}

/// Collects reachable ids in discovery order, each once, stopping after `target`.
pub fn collect_ids<I>(rows: I, target: Option<&str>) -> Result<Vec<String>, GraphError>
where
    I: IntoIterator<Item = Result<String, GraphError>>,
{
    let mut seen = AHashSet::new();
    let mut ids = Vec::new();
    for row in rows {
        let id = row?;
        let reached_target = target == Some(id.as_str());
        if seen.insert(id.clone()) {
            ids.push(id);
        }
        if reached_target {
            break;
        }
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn node(id: &str) -> Result<TraversalRow, GraphError> {
        let body = format!(r#"{{"id":"{id}"}}"#);
        Ok(TraversalRow::new(id, RowTag::Node, Some(body.as_str())))
    }

    fn out(id: &str) -> Result<TraversalRow, GraphError> {
        Ok(TraversalRow::new(id, RowTag::Outbound, Some("{}")))
    }

    fn inbound(id: &str, label: &str) -> Result<TraversalRow, GraphError> {
        Ok(TraversalRow::new(id, RowTag::Inbound, Some(label)))
    }

    #[test]
    fn test_outbound_statement_text() {
        let sql = Traversal::ids(Direction::Outbound).statement();
        assert_eq!(
            sql,
            "WITH RECURSIVE traverse(x) AS (\n  \
             SELECT id FROM nodes WHERE id = ?\n  UNION\n  \
             SELECT target FROM edges JOIN traverse ON source = x\n\
             ) SELECT x FROM traverse"
        );
    }

    #[test]
    fn test_bodies_statement_includes_tags() {
        let sql = Traversal::bodies(Direction::Both).statement();
        assert!(sql.starts_with("WITH RECURSIVE traverse(x, y, obj) AS ("));
        assert!(sql.contains("SELECT id, 'node', body FROM nodes WHERE id = ?"));
        assert!(sql.contains("SELECT source, 'in', properties FROM edges JOIN traverse ON target = x"));
        assert!(sql.contains("SELECT target, 'out', properties FROM edges JOIN traverse ON source = x"));
        assert!(sql.contains("SELECT id, 'node', body FROM nodes JOIN traverse ON id = x"));
        assert!(sql.ends_with("SELECT x, y, obj FROM traverse"));
        assert_eq!(sql.matches('?').count(), 1);
    }

    #[test]
    fn test_inbound_statement_has_no_outbound_step() {
        let sql = Traversal::bodies(Direction::Inbound).statement();
        assert!(sql.contains("'in'"));
        assert!(!sql.contains("'out'"));
    }

    #[test]
    fn test_edges_pair_with_current_origin() {
        let rows = vec![
            node("a"),
            out("b"),
            inbound("c", r#"{"w":2}"#),
            node("b"),
            out("d"),
        ];
        let entries = reconstruct(rows, None).unwrap();
        let edges: Vec<&Edge> = entries.iter().filter_map(GraphEntry::as_edge).collect();
        assert_eq!(edges[0], &Edge::new("a", "b", json!({})));
        assert_eq!(edges[1], &Edge::new("c", "a", json!({"w": 2})));
        assert_eq!(edges[2], &Edge::new("b", "d", json!({})));
        assert_eq!(entries[3].as_node().unwrap().body, json!({"id": "b"}));
    }

    #[test]
    fn test_interleaved_origins_follow_row_order() {
        // edges of "a" resume after "b" was expanded
        let rows = vec![node("a"), node("b"), out("c"), node("a"), out("d")];
        let entries = reconstruct(rows, None).unwrap();
        assert_eq!(entries[2].as_edge().unwrap(), &Edge::new("b", "c", json!({})));
        assert_eq!(entries[4].as_edge().unwrap(), &Edge::new("a", "d", json!({})));
    }

    #[test]
    fn test_stops_after_target_node_row() {
        let rows = vec![node("a"), out("b"), node("b"), out("c"), node("c")];
        let entries = reconstruct(rows, Some("b")).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2].as_node().unwrap().id, "b");
    }

    #[test]
    fn test_edge_row_matching_target_does_not_stop() {
        let rows = vec![node("a"), out("b"), node("b")];
        let entries = reconstruct(rows, Some("b")).unwrap();
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn test_edge_before_node_is_error() {
        let err = reconstruct(vec![out("b")], None).expect_err("no origin");
        assert!(matches!(err, GraphError::QueryError(_)));
    }

    #[test]
    fn test_unknown_tag_rejected() {
        assert!(RowTag::parse("->").is_err());
        assert_eq!(RowTag::parse("out").unwrap(), RowTag::Outbound);
    }

    #[test]
    fn test_collect_ids_dedups_and_stops() {
        let rows = || ["a", "b", "a", "c", "d"].map(|id| Ok(id.to_string()));
        assert_eq!(collect_ids(rows(), None).unwrap(), vec!["a", "b", "c", "d"]);
        assert_eq!(collect_ids(rows(), Some("c")).unwrap(), vec!["a", "b", "c"]);
    }
}

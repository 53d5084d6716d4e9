use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::GraphError;

/// A stored node: its id and the JSON body the id was read from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: String,
    pub body: Value,
}

/// A directed edge; `label` is the stored properties document (`{}` when empty).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub label: Value,
}

impl Edge {
    pub fn new<S: Into<String>, T: Into<String>>(source: S, target: T, label: Value) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            label,
        }
    }
}

/// One entry of a traversal that carries bodies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GraphEntry {
    Node(Node),
    Edge(Edge),
}

impl GraphEntry {
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            GraphEntry::Node(node) => Some(node),
            GraphEntry::Edge(_) => None,
        }
    }

    pub fn as_edge(&self) -> Option<&Edge> {
        match self {
            GraphEntry::Edge(edge) => Some(edge),
            GraphEntry::Node(_) => None,
        }
    }
}

/// Returns the string `id` stored in a body, if any.
///
/// `null` counts as absent; a non-string or empty id is rejected.
pub fn body_identifier(body: &Value) -> Result<Option<&str>, GraphError> {
    let object = body
        .as_object()
        .ok_or_else(|| GraphError::malformed("node body must be a JSON object"))?;
    match object.get("id") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(id)) if id.is_empty() => {
            Err(GraphError::malformed("node id must not be empty"))
        }
        Some(Value::String(id)) => Ok(Some(id.as_str())),
        Some(other) => Err(GraphError::malformed(format!(
            "node id must be a string, found {other}"
        ))),
    }
}

/// Produces the body to store: the body's own `id` wins, otherwise `identifier` is injected.
pub fn with_identifier(body: &Value, identifier: &str) -> Result<Value, GraphError> {
    if body_identifier(body)?.is_some() {
        return Ok(body.clone());
    }
    if identifier.is_empty() {
        return Err(GraphError::malformed("node id must not be empty"));
    }
    let mut object: Map<String, Value> = body.as_object().cloned().unwrap_or_default();
    object.insert("id".to_string(), Value::String(identifier.to_string()));
    Ok(Value::Object(object))
}

/// Random 128-bit identifier rendered as 32 lowercase hex digits.
pub fn generate_identifier() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

pub(crate) fn parse_document(text: Option<String>) -> Result<Value, GraphError> {
    match text {
        None => Ok(Value::Object(Map::new())),
        Some(text) if text.is_empty() => Ok(Value::Object(Map::new())),
        Some(text) => serde_json::from_str(&text)
            .map_err(|e| GraphError::query(format!("stored document is not JSON: {e}"))),
    }
}

pub(crate) fn edge_row(
    row: &rusqlite::Row<'_>,
) -> Result<(String, String, Option<String>), rusqlite::Error> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

pub(crate) fn edge_from_parts(
    (source, target, properties): (String, String, Option<String>),
) -> Result<Edge, GraphError> {
    Ok(Edge {
        source,
        target,
        label: parse_document(properties)?,
    })
}

pub(crate) fn node_from_body(body: String) -> Result<Node, GraphError> {
    let body: Value = serde_json::from_str(&body)
        .map_err(|e| GraphError::query(format!("stored body is not JSON: {e}")))?;
    let id = body_identifier(&body)?
        .ok_or_else(|| GraphError::query("stored body has no id"))?
        .to_string();
    Ok(Node { id, body })
}

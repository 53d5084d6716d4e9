//! Node mutations for SimpleGraph.

use ahash::AHashSet;
use rusqlite::{TransactionBehavior, types::Value as SqlValue};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    errors::GraphError,
    statements::{DELETE_EDGES, DELETE_NODE, INSERT_NODE, UPDATE_NODE},
};

use super::{
    SimpleGraph,
    core::{execute, text},
    types::{body_identifier, generate_identifier, with_identifier},
};

impl SimpleGraph {
    /// Stores `body` as a new node and returns the id it was stored under.
    ///
    /// `id` is injected only when the body carries none; an `id` already in
    /// the body wins. Fails with `ConstraintViolation` if the id is taken.
    pub fn add_node(&self, id: &str, body: &Value) -> Result<String, GraphError> {
        let body = with_identifier(body, id)?;
        let stored_id = stored_identifier(&body)?;
        self.with_connection(|conn| execute(conn, INSERT_NODE, &[text(&body.to_string())]))?;
        debug!(id = %stored_id, "node added");
        Ok(stored_id)
    }

    /// Stores `body` under a freshly generated id unless it already has one.
    pub fn add_node_with_generated_id(&self, body: &Value) -> Result<String, GraphError> {
        self.add_node(&generate_identifier(), body)
    }

    /// Inserts many nodes in one transaction; all or none are stored.
    pub fn add_nodes<S: AsRef<str>>(&self, ids: &[S], bodies: &[Value]) -> Result<usize, GraphError> {
        if ids.len() != bodies.len() {
            return Err(GraphError::mismatched("bodies", ids.len(), bodies.len()));
        }
        let args = ids
            .iter()
            .zip(bodies)
            .map(|(id, body)| -> Result<SqlValue, GraphError> {
                Ok(text(&with_identifier(body, id.as_ref())?.to_string()))
            })
            .collect::<Result<Vec<SqlValue>, GraphError>>()?;
        self.bulk_insert(INSERT_NODE, args, 1)
    }

    /// Replaces the body of an existing node.
    ///
    /// The body may omit its `id`, which is then re-injected; a body naming a
    /// different id is rejected.
    pub fn update_node_body(&self, id: &str, body: &Value) -> Result<(), GraphError> {
        let body = body_for(id, body)?;
        let affected = self.with_connection(|conn| {
            execute(conn, UPDATE_NODE, &[text(&body.to_string()), text(id)])
        })?;
        if affected == 0 {
            return Err(GraphError::not_found(format!("node {id}")));
        }
        Ok(())
    }

    /// Updates the node if it exists, inserts it otherwise.
    ///
    /// The existence check and the write run as separate operations, so a
    /// concurrent writer can still win the race for a fresh id.
    pub fn upsert_node(&self, id: &str, body: &Value) -> Result<(), GraphError> {
        let body = body_for(id, body)?;
        if self.node_exists(id)? {
            self.update_node_body(id, &body)
        } else {
            self.add_node(id, &body).map(|_| ())
        }
    }

    /// Upserts many nodes in one transaction; all or none are written.
    ///
    /// Each pair behaves like [`upsert_node`](Self::upsert_node): an existing
    /// node has its body replaced, a missing one is inserted.
    pub fn upsert_nodes<S: AsRef<str>>(&self, ids: &[S], bodies: &[Value]) -> Result<usize, GraphError> {
        if ids.len() != bodies.len() {
            return Err(GraphError::mismatched("bodies", ids.len(), bodies.len()));
        }
        if ids.is_empty() {
            return Ok(0);
        }
        let rows = ids
            .iter()
            .zip(bodies)
            .map(|(id, body)| -> Result<(&str, String), GraphError> {
                Ok((id.as_ref(), body_for(id.as_ref(), body)?.to_string()))
            })
            .collect::<Result<Vec<_>, GraphError>>()?;
        self.with_connection(|conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(GraphError::from_sqlite)?;
            let mut inserted = 0;
            for (id, body) in &rows {
                if execute(&tx, UPDATE_NODE, &[text(body), text(id)])? == 0 {
                    execute(&tx, INSERT_NODE, &[text(body)])?;
                    inserted += 1;
                }
            }
            tx.commit().map_err(GraphError::from_sqlite)?;
            debug!(nodes = rows.len(), inserted, "nodes upserted");
            Ok(rows.len())
        })
    }

    /// Shallow-merges the keys of `patch` into the stored body and returns the result.
    ///
    /// A missing node is created from `patch`.
    pub fn merge_node(&self, id: &str, patch: &Value) -> Result<Value, GraphError> {
        let patch = body_for(id, patch)?;
        let Some(existing) = self.find_node_optional(id)? else {
            self.add_node(id, &patch)?;
            return Ok(patch);
        };
        let mut merged = match existing.body {
            Value::Object(object) => object,
            _ => return Err(GraphError::query(format!("stored body of {id} is not an object"))),
        };
        if let Value::Object(fields) = patch {
            merged.extend(fields);
        }
        let merged = Value::Object(merged);
        self.update_node_body(id, &merged)?;
        Ok(merged)
    }

    pub fn remove_node(&self, id: &str) -> Result<(), GraphError> {
        self.remove_nodes(&[id]).map(|_| ())
    }

    /// Deletes nodes together with every edge touching them.
    ///
    /// Runs in one transaction: if any id does not exist, nothing is removed.
    /// Repeated ids count once; returns the number of distinct nodes removed.
    pub fn remove_nodes<S: AsRef<str>>(&self, ids: &[S]) -> Result<usize, GraphError> {
        let mut seen = AHashSet::with_capacity(ids.len());
        let ids: Vec<&str> = ids
            .iter()
            .map(|id| id.as_ref())
            .filter(|id| seen.insert(*id))
            .collect();
        if ids.is_empty() {
            return Ok(0);
        }
        self.with_connection(|conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(GraphError::from_sqlite)?;
            let mut edges_removed = 0;
            for &id in &ids {
                edges_removed += execute(&tx, DELETE_EDGES, &[text(id), text(id)])?;
                if execute(&tx, DELETE_NODE, &[text(id)])? == 0 {
                    warn!(id, "remove_nodes rolled back: node not found");
                    return Err(GraphError::not_found(format!("node {id}")));
                }
            }
            tx.commit().map_err(GraphError::from_sqlite)?;
            debug!(nodes = ids.len(), edges = edges_removed, "nodes removed");
            Ok(ids.len())
        })
    }
}

/// Body stored for an explicit `id`: rejects a conflicting id, injects a missing one.
fn body_for(id: &str, body: &Value) -> Result<Value, GraphError> {
    match body_identifier(body)? {
        Some(own) if own != id => Err(GraphError::malformed(format!(
            "body id {own} does not match node {id}"
        ))),
        _ => with_identifier(body, id),
    }
}

fn stored_identifier(body: &Value) -> Result<String, GraphError> {
    body_identifier(body)?
        .map(str::to_string)
        .ok_or_else(|| GraphError::malformed("node body has no id"))
}

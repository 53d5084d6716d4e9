//! Lookups and body searches for SimpleGraph.

use serde_json::Value;

use crate::{
    errors::GraphError,
    query::{ResultColumn, SearchMode, SearchQuery, SearchStatement, WhereClause, property_search},
    statements::{SELECT_ALL_BODIES, SELECT_ALL_EDGES, SELECT_ALL_IDS, SELECT_NODE_EXISTS},
};

use super::{
    SimpleGraph,
    core::{query_optional, query_rows, text},
    types::{Edge, Node, edge_from_parts, edge_row, node_from_body, parse_document},
};

impl SimpleGraph {
    pub fn find_node(&self, id: &str) -> Result<Node, GraphError> {
        self.find_node_optional(id)?
            .ok_or_else(|| GraphError::not_found(format!("node {id}")))
    }

    pub fn node_exists(&self, id: &str) -> Result<bool, GraphError> {
        let found = self.with_connection(|conn| {
            query_optional(conn, SELECT_NODE_EXISTS, &[text(id)], |row| row.get::<_, i64>(0))
        })?;
        Ok(found.is_some())
    }

    /// Runs a rendered search; each result is a body or, for id searches, a JSON string.
    pub fn find_nodes(&self, statement: &SearchStatement) -> Result<Vec<Value>, GraphError> {
        let rows = self.with_connection(|conn| {
            query_rows(conn, &statement.sql, &statement.params, |row| {
                row.get::<_, String>(0)
            })
        })?;
        match statement.column {
            ResultColumn::Id => Ok(rows.into_iter().map(Value::String).collect()),
            ResultColumn::Body => rows
                .into_iter()
                .map(|body| parse_document(Some(body)))
                .collect(),
        }
    }

    /// Nodes whose body fields all match `fields` under `mode`.
    pub fn find_nodes_by(
        &self,
        fields: &serde_json::Map<String, Value>,
        mode: SearchMode,
    ) -> Result<Vec<Node>, GraphError> {
        let statement = property_search(fields, mode)?;
        self.node_rows(&statement.sql, &statement.params)
    }

    pub fn all_nodes(&self) -> Result<Vec<Node>, GraphError> {
        self.node_rows(SELECT_ALL_BODIES, &[])
    }

    pub fn all_node_ids(&self) -> Result<Vec<String>, GraphError> {
        self.with_connection(|conn| query_rows(conn, SELECT_ALL_IDS, &[], |row| row.get(0)))
    }

    pub fn all_edges(&self) -> Result<Vec<Edge>, GraphError> {
        let rows = self.with_connection(|conn| query_rows(conn, SELECT_ALL_EDGES, &[], edge_row))?;
        rows.into_iter().map(edge_from_parts).collect()
    }

    pub(crate) fn find_node_optional(&self, id: &str) -> Result<Option<Node>, GraphError> {
        let statement = SearchQuery::new(ResultColumn::Body)
            .clause(WhereClause::id(id))
            .render()?;
        let body = self.with_connection(|conn| {
            query_optional(conn, &statement.sql, &statement.params, |row| {
                row.get::<_, String>(0)
            })
        })?;
        body.map(node_from_body).transpose()
    }

    fn node_rows(
        &self,
        sql: &str,
        params: &[rusqlite::types::Value],
    ) -> Result<Vec<Node>, GraphError> {
        let bodies = self.with_connection(|conn| {
            query_rows(conn, sql, params, |row| row.get::<_, String>(0))
        })?;
        bodies.into_iter().map(node_from_body).collect()
    }
}

use rusqlite::{Connection, OptionalExtension, TransactionBehavior};
use tracing::{debug, info};

use crate::{config::EdgeConflict, errors::GraphError};

pub const SCHEMA_VERSION: i64 = 1;

fn schema_statements(edge_conflict: EdgeConflict) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS nodes (
            body TEXT,
            id   TEXT GENERATED ALWAYS AS (json_extract(body, '$.id')) VIRTUAL NOT NULL UNIQUE
        );
        CREATE INDEX IF NOT EXISTS id_idx ON nodes(id);
        CREATE TABLE IF NOT EXISTS edges (
            source     TEXT,
            target     TEXT,
            properties TEXT,
            UNIQUE(source, target, properties) ON CONFLICT {conflict},
            FOREIGN KEY(source) REFERENCES nodes(id),
            FOREIGN KEY(target) REFERENCES nodes(id)
        );
        CREATE INDEX IF NOT EXISTS source_idx ON edges(source);
        CREATE INDEX IF NOT EXISTS target_idx ON edges(target);
        CREATE TABLE IF NOT EXISTS graph_meta (
            id             INTEGER PRIMARY KEY CHECK (id = 1),
            schema_version INTEGER NOT NULL,
            edge_conflict  TEXT NOT NULL
        );
        "#,
        conflict = edge_conflict.as_sql()
    )
}

/// Applies the schema and the meta row as one all-or-nothing unit.
pub fn ensure_schema(conn: &mut Connection, edge_conflict: EdgeConflict) -> Result<(), GraphError> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| GraphError::schema(e.to_string()))?;
    tx.execute_batch(&schema_statements(edge_conflict))
        .map_err(|e| GraphError::schema(e.to_string()))?;
    ensure_meta(&tx, edge_conflict)?;
    tx.commit().map_err(|e| GraphError::schema(e.to_string()))?;
    debug!(edge_conflict = edge_conflict.as_str(), "schema ensured");
    Ok(())
}

pub fn read_schema_version(conn: &Connection) -> Result<i64, GraphError> {
    conn.query_row(
        "SELECT schema_version FROM graph_meta WHERE id=1",
        [],
        |row| row.get(0),
    )
    .map_err(|e| GraphError::schema(e.to_string()))
}

/// Duplicate edge policy the store was created with.
pub fn read_edge_conflict(conn: &Connection) -> Result<EdgeConflict, GraphError> {
    let stored: String = conn
        .query_row(
            "SELECT edge_conflict FROM graph_meta WHERE id=1",
            [],
            |row| row.get(0),
        )
        .map_err(|e| GraphError::schema(e.to_string()))?;
    EdgeConflict::parse(&stored)
        .ok_or_else(|| GraphError::schema(format!("unknown edge conflict policy {stored}")))
}

fn ensure_meta(conn: &Connection, edge_conflict: EdgeConflict) -> Result<(), GraphError> {
    let existing: Option<(i64, String)> = conn
        .query_row(
            "SELECT schema_version, edge_conflict FROM graph_meta WHERE id=1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(|e| GraphError::schema(e.to_string()))?;
    match existing {
        Some((version, stored)) => {
            if version > SCHEMA_VERSION {
                return Err(GraphError::schema(format!(
                    "database schema version {version} is newer than supported {SCHEMA_VERSION}"
                )));
            }
            if stored != edge_conflict.as_str() {
                return Err(GraphError::schema(format!(
                    "store was created with edge conflict policy {stored}, configured {}",
                    edge_conflict.as_str()
                )));
            }
        }
        None => {
            conn.execute(
                "INSERT INTO graph_meta(id, schema_version, edge_conflict) VALUES(1, ?1, ?2)",
                rusqlite::params![SCHEMA_VERSION, edge_conflict.as_str()],
            )
            .map_err(|e| GraphError::schema(e.to_string()))?;
            info!(
                version = SCHEMA_VERSION,
                edge_conflict = edge_conflict.as_str(),
                "initialized graph schema"
            );
        }
    }
    Ok(())
}

//! Core SimpleGraph struct, construction and shared statement helpers.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params_from_iter, types::Value as SqlValue};
use tracing::{debug, info};

use crate::{
    config::{EdgeConflict, GraphConfig, StoreTarget},
    errors::GraphError,
    provider::{ConnectionProvider, prefer_wal},
    schema::{ensure_schema, read_edge_conflict, read_schema_version},
    statements::{bulk_insert_statement, placeholder_count},
};

/// Property graph stored in one SQLite database.
///
/// Holds no connection of its own beyond the provider: each operation
/// acquires a handle, does its work and releases the handle before
/// returning, so a `SimpleGraph` can be shared across threads.
pub struct SimpleGraph {
    pub(crate) provider: ConnectionProvider,
    pub(crate) config: GraphConfig,
}

impl SimpleGraph {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GraphError> {
        Self::with_config(GraphConfig::file(path))
    }

    pub fn open_in_memory() -> Result<Self, GraphError> {
        Self::with_config(GraphConfig::memory())
    }

    /// Resolves the configured target and applies the schema in one transaction.
    pub fn with_config(config: GraphConfig) -> Result<Self, GraphError> {
        if config.batch_size == 0 {
            return Err(GraphError::malformed("batch_size must be at least 1"));
        }
        let provider = ConnectionProvider::new(&config)?;
        provider.with_connection(|conn| {
            if matches!(provider.target(), StoreTarget::File(_)) {
                prefer_wal(conn);
            }
            ensure_schema(conn, config.edge_conflict)
        })?;
        info!(
            store = ?config.target,
            edge_conflict = config.edge_conflict.as_str(),
            "opened graph store"
        );
        Ok(Self { provider, config })
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn schema_version(&self) -> Result<i64, GraphError> {
        self.with_connection(|conn| read_schema_version(conn))
    }

    /// Duplicate edge policy recorded in the store itself.
    pub fn edge_conflict(&self) -> Result<EdgeConflict, GraphError> {
        self.with_connection(|conn| read_edge_conflict(conn))
    }

    pub(crate) fn with_connection<R, F>(&self, f: F) -> Result<R, GraphError>
    where
        F: FnOnce(&mut Connection) -> Result<R, GraphError>,
    {
        self.provider.with_connection(f)
    }

    /// Inserts rows through the bulk form of `template`, `batch_size` rows per
    /// statement, all inside one transaction.
    pub(crate) fn bulk_insert(
        &self,
        template: &str,
        args: Vec<SqlValue>,
        params_per_row: usize,
    ) -> Result<usize, GraphError> {
        if args.is_empty() {
            return Ok(0);
        }
        let chunk_len = self.config.batch_size * params_per_row;
        self.with_connection(|conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(GraphError::from_sqlite)?;
            let mut inserted = 0;
            for chunk in args.chunks(chunk_len) {
                let sql = bulk_insert_statement(template, chunk.len() / params_per_row)?;
                inserted += execute(&tx, &sql, chunk)?;
            }
            tx.commit().map_err(GraphError::from_sqlite)?;
            debug!(rows = inserted, "bulk insert committed");
            Ok(inserted)
        })
    }
}

/// Executes one statement after checking its placeholders match `params`.
pub(crate) fn execute(conn: &Connection, sql: &str, params: &[SqlValue]) -> Result<usize, GraphError> {
    check_arity(sql, params)?;
    debug!(sql, params = params.len(), "execute");
    conn.execute(sql, params_from_iter(params.iter()))
        .map_err(GraphError::from_sqlite)
}

/// Runs a query whose rows are mapped by `f`, collecting every row.
pub(crate) fn query_rows<T, F>(
    conn: &Connection,
    sql: &str,
    params: &[SqlValue],
    f: F,
) -> Result<Vec<T>, GraphError>
where
    F: FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
{
    check_arity(sql, params)?;
    debug!(sql, params = params.len(), "query");
    let mut stmt = conn.prepare_cached(sql).map_err(GraphError::from_sqlite)?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), f)
        .map_err(GraphError::from_sqlite)?;
    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(GraphError::from_sqlite)?);
    }
    Ok(result)
}

pub(crate) fn query_optional<T, F>(
    conn: &Connection,
    sql: &str,
    params: &[SqlValue],
    f: F,
) -> Result<Option<T>, GraphError>
where
    F: FnOnce(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
{
    check_arity(sql, params)?;
    debug!(sql, params = params.len(), "query row");
    conn.query_row(sql, params_from_iter(params.iter()), f)
        .optional()
        .map_err(GraphError::from_sqlite)
}

pub(crate) fn text(value: &str) -> SqlValue {
    SqlValue::Text(value.to_string())
}

fn check_arity(sql: &str, params: &[SqlValue]) -> Result<(), GraphError> {
    let expected = placeholder_count(sql);
    if expected != params.len() {
        return Err(GraphError::malformed(format!(
            "statement expects {expected} parameters, got {}",
            params.len()
        )));
    }
    Ok(())
}

//! Resolves the configured [`StoreTarget`] to a connection for one operation.

use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::Connection;
use tracing::{debug, warn};

use crate::{
    config::{GraphConfig, StoreTarget},
    errors::GraphError,
};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct ConnectionProvider {
    target: StoreTarget,
    pragma_settings: Vec<(String, String)>,
    // SQLite in-memory databases are private to their connection, so the
    // memory target keeps exactly one and serializes access to it.
    shared: Option<Mutex<Connection>>,
}

impl ConnectionProvider {
    pub fn new(config: &GraphConfig) -> Result<Self, GraphError> {
        let mut pragma_settings: Vec<(String, String)> = config
            .pragma_settings
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        pragma_settings.sort();
        let shared = match &config.target {
            StoreTarget::Memory => {
                let conn = Connection::open_in_memory()
                    .map_err(|e| GraphError::unavailable(e.to_string()))?;
                configure(&conn, &pragma_settings)?;
                Some(Mutex::new(conn))
            }
            StoreTarget::File(_) => None,
        };
        Ok(Self {
            target: config.target.clone(),
            pragma_settings,
            shared,
        })
    }

    pub fn target(&self) -> &StoreTarget {
        &self.target
    }

    /// Runs `f` with a connection that is released before this returns.
    pub fn with_connection<R, F>(&self, f: F) -> Result<R, GraphError>
    where
        F: FnOnce(&mut Connection) -> Result<R, GraphError>,
    {
        match (&self.target, &self.shared) {
            (_, Some(shared)) => {
                let mut guard = shared.lock();
                f(&mut *guard)
            }
            (StoreTarget::File(path), None) => {
                let mut conn = Connection::open(path).map_err(|e| {
                    GraphError::unavailable(format!("{}: {e}", path.display()))
                })?;
                conn.busy_timeout(BUSY_TIMEOUT)
                    .map_err(|e| GraphError::unavailable(e.to_string()))?;
                configure(&conn, &self.pragma_settings)?;
                f(&mut conn)
            }
            (StoreTarget::Memory, None) => Err(GraphError::unavailable(
                "in-memory store has no shared connection",
            )),
        }
    }
}

fn configure(conn: &Connection, pragma_settings: &[(String, String)]) -> Result<(), GraphError> {
    conn.pragma_update(None, "foreign_keys", true)
        .map_err(|e| GraphError::unavailable(e.to_string()))?;
    for (key, value) in pragma_settings {
        let pragma_sql = format!("PRAGMA {key} = {value}");
        match conn.execute(&pragma_sql, []) {
            Ok(_) => {}
            // Some PRAGMAs echo their new value as a row.
            Err(rusqlite::Error::ExecuteReturnedResults) => {}
            Err(e) => {
                return Err(GraphError::unavailable(format!(
                    "PRAGMA {key} = {value}: {e}"
                )));
            }
        }
        debug!(pragma = key.as_str(), value = value.as_str(), "applied pragma");
    }
    Ok(())
}

/// Switches a file database to WAL, falling back to DELETE where WAL is unsupported.
pub(crate) fn prefer_wal(conn: &Connection) {
    if let Err(wal_err) = conn.pragma_update(None, "journal_mode", "WAL") {
        debug!(error = %wal_err, "WAL unavailable, falling back to DELETE journal");
        if let Err(e) = conn.pragma_update(None, "journal_mode", "DELETE") {
            warn!(error = %e, "could not set journal_mode = DELETE; keeping current mode");
        }
    }
}

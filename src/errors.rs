use rusqlite::ErrorCode;
use thiserror::Error;

/// Error type for simplegraph operations.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("mismatched lengths: {what} expected {expected}, found {found}")]
    MismatchedLengths {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("schema error: {0}")]
    SchemaError(String),
    #[error("query error: {0}")]
    QueryError(String),
}

impl GraphError {
    pub fn constraint<T: Into<String>>(msg: T) -> Self {
        GraphError::ConstraintViolation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        GraphError::NotFound(msg.into())
    }

    pub fn malformed<T: Into<String>>(msg: T) -> Self {
        GraphError::MalformedInput(msg.into())
    }

    pub fn unavailable<T: Into<String>>(msg: T) -> Self {
        GraphError::StoreUnavailable(msg.into())
    }

    pub fn schema<T: Into<String>>(msg: T) -> Self {
        GraphError::SchemaError(msg.into())
    }

    pub fn query<T: Into<String>>(msg: T) -> Self {
        GraphError::QueryError(msg.into())
    }

    pub fn mismatched(what: &'static str, expected: usize, found: usize) -> Self {
        GraphError::MismatchedLengths {
            what,
            expected,
            found,
        }
    }

    /// Classifies a store error into the graph error taxonomy.
    pub fn from_sqlite(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::QueryReturnedNoRows => GraphError::not_found(err.to_string()),
            rusqlite::Error::SqliteFailure(failure, _) => match failure.code {
                ErrorCode::ConstraintViolation => GraphError::constraint(err.to_string()),
                ErrorCode::CannotOpen
                | ErrorCode::NotADatabase
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::PermissionDenied
                | ErrorCode::SystemIoFailure => GraphError::unavailable(err.to_string()),
                _ => GraphError::query(err.to_string()),
            },
            _ => GraphError::query(err.to_string()),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, GraphError::NotFound(_))
    }
}

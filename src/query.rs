//! Search statement builder.
//!
//! A search is a [`SearchQuery`] made of [`WhereClause`]s. Each clause renders
//! its SQL fragment and its bound parameter in the same call, so the text and
//! the parameter order cannot drift apart. Values are never interpolated;
//! only JSON keys are, and those are validated first.

use rusqlite::types::Value as SqlValue;
use serde_json::Value;

use crate::errors::GraphError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    And,
    Or,
}

impl Combinator {
    fn as_sql(self) -> &'static str {
        match self {
            Combinator::And => "AND",
            Combinator::Or => "OR",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Predicate {
    Equals,
    Like,
}

impl Predicate {
    fn as_sql(self) -> &'static str {
        match self {
            Predicate::Equals => "=",
            Predicate::Like => "LIKE",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ClauseShape {
    /// `nodes.id = ?`
    IdLookup,
    /// `json_extract(body, '$.key') <predicate> ?`
    KeyValue { key: String, predicate: Predicate },
    /// Matches one element produced by the `json_tree` join, optionally only under `key`.
    Tree {
        key: Option<String>,
        predicate: Predicate,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct WhereClause {
    pub combinator: Option<Combinator>,
    pub shape: ClauseShape,
    pub value: SqlValue,
}

/// One rendered condition and the parameter it binds.
#[derive(Clone, Debug, PartialEq)]
pub struct Fragment {
    pub sql: String,
    pub param: SqlValue,
}

impl WhereClause {
    pub fn id<S: Into<String>>(id: S) -> Self {
        Self {
            combinator: None,
            shape: ClauseShape::IdLookup,
            value: SqlValue::Text(id.into()),
        }
    }

    pub fn key_value<K: Into<String>>(key: K, predicate: Predicate, value: &Value) -> Self {
        Self {
            combinator: None,
            shape: ClauseShape::KeyValue {
                key: key.into(),
                predicate,
            },
            value: json_to_sql(value),
        }
    }

    pub fn tree(key: Option<&str>, predicate: Predicate, value: &Value) -> Self {
        Self {
            combinator: None,
            shape: ClauseShape::Tree {
                key: key.map(str::to_string),
                predicate,
            },
            value: json_to_sql(value),
        }
    }

    pub fn and(mut self) -> Self {
        self.combinator = Some(Combinator::And);
        self
    }

    pub fn or(mut self) -> Self {
        self.combinator = Some(Combinator::Or);
        self
    }

    pub fn render(&self) -> Result<Fragment, GraphError> {
        let condition = match &self.shape {
            ClauseShape::IdLookup => "nodes.id = ?".to_string(),
            ClauseShape::KeyValue { key, predicate } => {
                validate_key(key)?;
                format!("json_extract(body, '$.{key}') {} ?", predicate.as_sql())
            }
            ClauseShape::Tree {
                key: Some(key),
                predicate,
            } => {
                validate_key(key)?;
                format!(
                    "(json_tree.key = '{key}' AND json_tree.value {} ?)",
                    predicate.as_sql()
                )
            }
            ClauseShape::Tree {
                key: None,
                predicate,
            } => format!("json_tree.value {} ?", predicate.as_sql()),
        };
        let sql = match self.combinator {
            Some(combinator) => format!("{} {condition}", combinator.as_sql()),
            None => condition,
        };
        Ok(Fragment {
            sql,
            param: self.value.clone(),
        })
    }

    fn uses_tree(&self) -> bool {
        matches!(self.shape, ClauseShape::Tree { .. })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResultColumn {
    Id,
    #[default]
    Body,
}

impl ResultColumn {
    fn as_sql(self) -> &'static str {
        match self {
            // json_tree has its own id column
            ResultColumn::Id => "nodes.id",
            ResultColumn::Body => "body",
        }
    }
}

/// `json_tree` expansion of each node body, optionally rooted at `$.key`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeJoin {
    pub key: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchQuery {
    pub column: ResultColumn,
    pub tree: Option<TreeJoin>,
    pub clauses: Vec<WhereClause>,
}

/// Rendered search text with positional parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchStatement {
    pub sql: String,
    pub params: Vec<SqlValue>,
    pub column: ResultColumn,
}

impl SearchQuery {
    pub fn new(column: ResultColumn) -> Self {
        Self {
            column,
            tree: None,
            clauses: Vec::new(),
        }
    }

    pub fn with_tree(mut self, key: Option<&str>) -> Self {
        self.tree = Some(TreeJoin {
            key: key.map(str::to_string),
        });
        self
    }

    pub fn clause(mut self, clause: WhereClause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn render(&self) -> Result<SearchStatement, GraphError> {
        self.validate()?;
        let mut sql = String::from("SELECT ");
        if self.tree.is_some() {
            // a node matches once per matching tree element
            sql.push_str("DISTINCT ");
        }
        sql.push_str(self.column.as_sql());
        sql.push_str(" FROM nodes");
        if let Some(tree) = &self.tree {
            match &tree.key {
                Some(key) => {
                    validate_key(key)?;
                    sql.push_str(&format!(", json_tree(body, '$.{key}')"));
                }
                None => sql.push_str(", json_tree(body)"),
            }
        }
        let mut params = Vec::with_capacity(self.clauses.len());
        if !self.clauses.is_empty() {
            sql.push_str(" WHERE");
            for clause in &self.clauses {
                let fragment = clause.render()?;
                sql.push(' ');
                sql.push_str(&fragment.sql);
                params.push(fragment.param);
            }
        }
        Ok(SearchStatement {
            sql,
            params,
            column: self.column,
        })
    }

    fn validate(&self) -> Result<(), GraphError> {
        for (idx, clause) in self.clauses.iter().enumerate() {
            if idx == 0 && clause.combinator.is_some() {
                return Err(GraphError::malformed(
                    "first clause cannot start with AND/OR",
                ));
            }
            if idx > 0 && clause.combinator.is_none() {
                return Err(GraphError::malformed(format!(
                    "clause {idx} needs AND/OR to join the previous clause"
                )));
            }
            if clause.uses_tree() && self.tree.is_none() {
                return Err(GraphError::malformed(
                    "tree clause requires a json_tree join",
                ));
            }
        }
        Ok(())
    }
}

/// How a field→value map is matched by [`property_search`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchMode {
    Equals,
    StartsWith,
    Contains,
}

impl SearchMode {
    pub fn predicate(self) -> Predicate {
        match self {
            SearchMode::Equals => Predicate::Equals,
            SearchMode::StartsWith | SearchMode::Contains => Predicate::Like,
        }
    }

    pub fn bind(self, value: &Value) -> SqlValue {
        match self {
            SearchMode::Equals => json_to_sql(value),
            SearchMode::StartsWith => SqlValue::Text(format!("{}%", plain_text(value))),
            SearchMode::Contains => SqlValue::Text(format!("%{}%", plain_text(value))),
        }
    }
}

/// Builds a body search matching every field, combined with `AND`.
///
/// Fields are rendered and bound in one pass, so the i-th parameter always
/// belongs to the i-th rendered field whatever order the map yields.
///
/// ```rust
/// use serde_json::json;
/// use simplegraph::{SearchMode, property_search};
/// let fields = json!({"name": "Steve"});
/// let stmt = property_search(fields.as_object().unwrap(), SearchMode::StartsWith).unwrap();
/// assert_eq!(stmt.sql, "SELECT body FROM nodes WHERE json_extract(body, '$.name') LIKE ?");
/// ```
pub fn property_search<'a, I>(fields: I, mode: SearchMode) -> Result<SearchStatement, GraphError>
where
    I: IntoIterator<Item = (&'a String, &'a Value)>,
{
    let mut query = SearchQuery::new(ResultColumn::Body);
    for (idx, (key, value)) in fields.into_iter().enumerate() {
        let mut clause = WhereClause {
            combinator: None,
            shape: ClauseShape::KeyValue {
                key: key.clone(),
                predicate: mode.predicate(),
            },
            value: mode.bind(value),
        };
        if idx > 0 {
            clause = clause.and();
        }
        query = query.clause(clause);
    }
    query.render()
}

/// Converts a JSON value into the SQLite value `json_extract` would yield for it.
pub fn json_to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn validate_key(key: &str) -> Result<(), GraphError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '[' | ']'));
    if valid {
        Ok(())
    } else {
        Err(GraphError::malformed(format!("invalid JSON key {key:?}")))
    }
}

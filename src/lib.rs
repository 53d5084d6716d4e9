//! Property graph stored in a single SQLite database with JSON node bodies.
//!
//! Nodes are JSON objects keyed by their `id` field; edges are directed
//! `(source, target)` pairs carrying an optional JSON properties document.
//! Searches run against the bodies through `json_extract` and `json_tree`,
//! and reachability is answered by one recursive query per call.
//!
//! ```rust
//! use serde_json::json;
//! use simplegraph::{Direction, SimpleGraph};
//!
//! let graph = SimpleGraph::open_in_memory().unwrap();
//! graph.add_node("1", &json!({"name": "Alice"})).unwrap();
//! graph.add_node("2", &json!({"name": "Bob"})).unwrap();
//! graph.connect("1", "2", None).unwrap();
//! assert_eq!(graph.traverse("1", Direction::Outbound, None).unwrap(), vec!["1", "2"]);
//! ```

pub mod config;
pub mod errors;
pub mod graph;
pub mod provider;
pub mod query;
pub mod schema;
pub mod statements;
pub mod traversal;

pub use crate::config::{EdgeConflict, GraphConfig, StoreTarget};
pub use crate::errors::GraphError;
pub use crate::graph::{
    Edge, GraphEntry, Node, SimpleGraph, body_identifier, generate_identifier, with_identifier,
};
pub use crate::query::{
    Combinator, Predicate, ResultColumn, SearchMode, SearchQuery, SearchStatement, WhereClause,
    property_search,
};
pub use crate::traversal::{Direction, Traversal};

mod core;
mod edge_ops;
mod neighbor_ops;
mod node_ops;
mod search_ops;
mod traverse_ops;
pub(crate) mod types;

pub use core::SimpleGraph;
pub use types::{Edge, GraphEntry, Node, body_identifier, generate_identifier, with_identifier};

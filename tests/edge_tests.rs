use serde_json::json;
use simplegraph::{Direction, EdgeConflict, Edge, GraphConfig, GraphError, SimpleGraph};

fn graph_with(conflict: EdgeConflict) -> SimpleGraph {
    let graph = SimpleGraph::with_config(GraphConfig::memory().with_edge_conflict(conflict))
        .expect("graph");
    for id in ["a", "b", "c"] {
        graph.add_node(id, &json!({"name": id})).expect("add");
    }
    graph
}

#[test]
fn test_connect_defaults_to_empty_properties() {
    let graph = graph_with(EdgeConflict::Replace);
    graph.connect("a", "b", None).expect("edge");
    assert_eq!(graph.all_edges().expect("edges"), vec![Edge::new("a", "b", json!({}))]);
}

#[test]
fn test_connect_requires_existing_endpoints() {
    let graph = graph_with(EdgeConflict::Replace);
    let err = graph.connect("a", "ghost", None).expect_err("dangling");
    assert!(matches!(err, GraphError::ConstraintViolation(_)));
    assert!(graph.all_edges().expect("edges").is_empty());
}

#[test]
fn test_replace_policy_keeps_one_copy_of_duplicate() {
    let graph = graph_with(EdgeConflict::Replace);
    let label = json!({"action": "founded"});
    graph.connect("a", "b", Some(&label)).expect("first");
    graph.connect("a", "b", Some(&label)).expect("duplicate replaces");
    assert_eq!(graph.all_edges().expect("edges").len(), 1);
}

#[test]
fn test_reject_policy_fails_duplicate() {
    let graph = graph_with(EdgeConflict::Reject);
    let label = json!({"action": "founded"});
    graph.connect("a", "b", Some(&label)).expect("first");
    let err = graph
        .connect("a", "b", Some(&label))
        .expect_err("duplicate rejected");
    assert!(matches!(err, GraphError::ConstraintViolation(_)));
    assert_eq!(graph.all_edges().expect("edges").len(), 1);
}

#[test]
fn test_distinct_properties_are_distinct_edges() {
    for conflict in [EdgeConflict::Replace, EdgeConflict::Reject] {
        let graph = graph_with(conflict);
        graph.connect("a", "b", None).expect("plain");
        graph
            .connect("a", "b", Some(&json!({"w": 1})))
            .expect("weighted");
        assert_eq!(graph.all_edges().expect("edges").len(), 2);
    }
}

#[test]
fn test_bulk_connect() {
    let graph = graph_with(EdgeConflict::Replace);
    let inserted = graph
        .bulk_connect(&["a", "b"], &["b", "c"], Some(&[json!({"w": 1}), json!({"w": 2})]))
        .expect("bulk");
    assert_eq!(inserted, 2);
    let edges = graph.all_edges().expect("edges");
    assert_eq!(edges[0], Edge::new("a", "b", json!({"w": 1})));
    assert_eq!(edges[1], Edge::new("b", "c", json!({"w": 2})));
}

#[test]
fn test_bulk_connect_without_properties() {
    let graph = graph_with(EdgeConflict::Replace);
    graph
        .bulk_connect(&["a", "a"], &["b", "c"], None)
        .expect("bulk");
    assert!(
        graph
            .all_edges()
            .expect("edges")
            .iter()
            .all(|edge| edge.label == json!({}))
    );
}

#[test]
fn test_bulk_connect_mismatched_lengths() {
    let graph = graph_with(EdgeConflict::Replace);
    let err = graph
        .bulk_connect(&["a", "b"], &["c"], None)
        .expect_err("mismatch");
    assert!(matches!(
        err,
        GraphError::MismatchedLengths {
            what: "targets",
            ..
        }
    ));
    assert!(graph.all_edges().expect("edges").is_empty());
}

#[test]
fn test_bulk_connect_is_all_or_nothing() {
    let graph = graph_with(EdgeConflict::Replace);
    let err = graph
        .bulk_connect(&["a", "b"], &["b", "ghost"], None)
        .expect_err("dangling");
    assert!(matches!(err, GraphError::ConstraintViolation(_)));
    assert!(graph.all_edges().expect("edges").is_empty());
}

#[test]
fn test_connections_by_direction() {
    let graph = graph_with(EdgeConflict::Replace);
    graph.connect("a", "b", None).expect("edge");
    graph.connect("c", "b", Some(&json!({"w": 3}))).expect("edge");
    graph.connect("b", "a", None).expect("edge");

    let inbound = graph.connections("b", Direction::Inbound).expect("in");
    assert_eq!(inbound.len(), 2);
    assert!(inbound.iter().all(|edge| edge.target == "b"));
    assert!(inbound.contains(&Edge::new("c", "b", json!({"w": 3}))));

    let outbound = graph.connections_out("b").expect("out");
    assert_eq!(outbound, vec![Edge::new("b", "a", json!({}))]);

    assert_eq!(graph.connections("b", Direction::Both).expect("both").len(), 3);
    assert!(graph.connections_in("ghost").expect("none").is_empty());
}

#[test]
fn test_self_loop_reported_once() {
    let graph = graph_with(EdgeConflict::Replace);
    graph.connect("a", "a", None).expect("loop");
    let both = graph.connections("a", Direction::Both).expect("both");
    assert_eq!(both, vec![Edge::new("a", "a", json!({}))]);
}

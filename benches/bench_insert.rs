use std::time::Duration;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde_json::{Value, json};
use simplegraph::SimpleGraph;

const EDGE_SEED: u64 = 0xA17C;
const SAMPLE_SIZE: usize = 20;
const WARM_UP: Duration = Duration::from_millis(300);
const MEASURE: Duration = Duration::from_millis(500);
const SCALES: &[usize] = &[1_000, 10_000];

struct Dataset {
    ids: Vec<String>,
    bodies: Vec<Value>,
    sources: Vec<String>,
    targets: Vec<String>,
}

fn dataset(nodes: usize) -> Dataset {
    let ids: Vec<String> = (0..nodes).map(|i| format!("n{i}")).collect();
    let bodies = (0..nodes)
        .map(|i| json!({"name": format!("node {i}"), "rank": i % 17}))
        .collect();
    let mut rng = StdRng::seed_from_u64(EDGE_SEED + nodes as u64);
    let mut sources = Vec::with_capacity(nodes * 3);
    let mut targets = Vec::with_capacity(nodes * 3);
    for _ in 0..nodes * 3 {
        sources.push(ids[rng.gen_range(0..nodes)].clone());
        targets.push(ids[rng.gen_range(0..nodes)].clone());
    }
    Dataset {
        ids,
        bodies,
        sources,
        targets,
    }
}

fn bench_add_node_one_by_one(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_node");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    for &nodes in SCALES {
        let data = dataset(nodes);
        group.bench_function(BenchmarkId::from_parameter(nodes), |b| {
            b.iter(|| {
                let graph = SimpleGraph::open_in_memory().expect("graph");
                for (id, body) in data.ids.iter().zip(&data.bodies) {
                    graph.add_node(id, body).expect("node insert");
                }
            });
        });
    }
    group.finish();
}

fn bench_add_nodes_bulk(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_nodes_bulk");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    for &nodes in SCALES {
        let data = dataset(nodes);
        group.bench_function(BenchmarkId::from_parameter(nodes), |b| {
            b.iter(|| {
                let graph = SimpleGraph::open_in_memory().expect("graph");
                graph.add_nodes(&data.ids, &data.bodies).expect("bulk insert");
            });
        });
    }
    group.finish();
}

fn bench_bulk_connect(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk_connect");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    for &nodes in SCALES {
        let data = dataset(nodes);
        group.bench_function(BenchmarkId::from_parameter(nodes), |b| {
            b.iter(|| {
                let graph = SimpleGraph::open_in_memory().expect("graph");
                graph.add_nodes(&data.ids, &data.bodies).expect("bulk insert");
                graph
                    .bulk_connect(&data.sources, &data.targets, None)
                    .expect("bulk connect");
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = insert_benches;
    config = Criterion::default();
    targets = bench_add_node_one_by_one, bench_add_nodes_bulk, bench_bulk_connect
);
criterion_main!(insert_benches);

//! Benchmarks for full layout passes over generated protocols.
//!
//! Run with: cargo bench -p pv-layout --bench layout_bench

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pv_layout::{GraphConfig, Registry, compute_metrics, layout};
use serde_json::{Value, json};

fn segment(i: usize) -> Value {
    json!({
        "namespace": "segment", "name": "_", "label": format!("Step {i}"),
        "process": { "namespace": "timer", "data": { "duration": i * 10 } }
    })
}

/// `width` parallel branches of `depth` sequential repeat-wrapped steps.
fn protocol(width: usize, depth: usize) -> Value {
    let branches: Vec<Value> = (0..width)
        .map(|b| {
            let steps: Vec<Value> = (0..depth)
                .map(|s| {
                    json!({
                        "namespace": "repeat", "name": "_", "count": 2,
                        "child": { "namespace": "state", "name": "_", "child": segment(b * depth + s) }
                    })
                })
                .collect();
            json!({ "namespace": "sequence", "name": "_", "children": steps })
        })
        .collect();
    json!({ "namespace": "parallel", "name": "_", "children": branches })
}

fn bench_layout(c: &mut Criterion) {
    let registry = Registry::with_builtins();
    let config = GraphConfig::default();
    let mut group = c.benchmark_group("layout");
    for (width, depth) in [(2, 10), (8, 25), (16, 60)] {
        let tree = protocol(width, depth);
        let id = format!("{width}x{depth}");
        group.bench_with_input(BenchmarkId::new("metrics", &id), &tree, |b, tree| {
            b.iter(|| compute_metrics(&registry, &config, black_box(tree), None));
        });
        group.bench_with_input(BenchmarkId::new("full_pass", &id), &tree, |b, tree| {
            b.iter(|| layout(&registry, &config, black_box(tree), None, None));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_layout);
criterion_main!(benches);

//! Layout and reconciliation benchmarks.
//!
//! Measures the cost of building a layout tree for a large document, the
//! first full sync against an empty scene, and the steady-state passes that
//! run on every store notification.

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::collections::BTreeMap;
use topoview::layout::{DepthExpandPolicy, FontSpec, LayoutContext, LayoutParams, LayoutTree};
use topoview::model::{MarkerMap, NodeId, Size, SourceNode};
use topoview::scene::{Reconciler, RecordingBackend, UpdateMode};

/// `fanout` children per node, `depth` levels below the root.
fn build_document(fanout: usize, depth: usize) -> SourceNode {
    fn level(prefix: &str, fanout: usize, remaining: usize) -> SourceNode {
        let id = NodeId::new(prefix).expect("non-empty id");
        let mut node = SourceNode::new(id, "host").with_data(serde_json::json!({
            "severity": { "warn": 1 }
        }));
        if remaining > 0 {
            for i in 0..fanout {
                node = node.with_child(level(&format!("{prefix}/{i}"), fanout, remaining - 1));
            }
        }
        node
    }
    level("root", fanout, depth)
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let params = LayoutParams::default();
    let font = FontSpec::default();
    let markers = MarkerMap::new();
    let expanded = BTreeMap::new();

    for depth in [1usize, 2, 3] {
        let doc = build_document(10, depth);
        let policy = DepthExpandPolicy { max_depth: depth };
        let ctx = LayoutContext {
            params: &params,
            font: Some(&font),
            policy: &policy,
            expanded: &expanded,
            markers: &markers,
        };
        group.bench_with_input(BenchmarkId::new("from_source", depth), &doc, |b, doc| {
            b.iter(|| LayoutTree::from_source(black_box(doc), &ctx).expect("layout"));
        });
    }
    group.finish();
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    let params = LayoutParams::default();
    let font = FontSpec::default();
    let markers = MarkerMap::new();
    let expanded = BTreeMap::new();
    let doc = build_document(10, 3);
    let policy = DepthExpandPolicy { max_depth: 3 };
    let ctx = LayoutContext {
        params: &params,
        font: Some(&font),
        policy: &policy,
        expanded: &expanded,
        markers: &markers,
    };
    let tree = LayoutTree::from_source(&doc, &ctx).expect("layout");
    let size = Size::new(1920.0, 1080.0);

    group.bench_function("initial_full_sync", |b| {
        b.iter(|| {
            let mut backend = RecordingBackend::new(size);
            let mut reconciler = Reconciler::default();
            reconciler.sync(black_box(&tree), UpdateMode::Full, &mut backend)
        });
    });

    let mut backend = RecordingBackend::new(size);
    let mut reconciler = Reconciler::default();
    reconciler.sync(&tree, UpdateMode::Full, &mut backend);

    for mode in [UpdateMode::Full, UpdateMode::Partial] {
        group.bench_function(format!("steady_state_{mode:?}").to_lowercase(), |b| {
            b.iter(|| reconciler.sync(black_box(&tree), mode, &mut backend));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_layout, bench_reconcile);
criterion_main!(benches);

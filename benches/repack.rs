//! Conversion pipeline benchmarks.
//!
//! Measures the two hot stages on synthetic weight trees:
//! 1. unflatten + digit-key normalization of a flat dictionary
//! 2. leaf-list traversal + rank-4 repacking

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use texpack::{normalize, repack_tree, unflatten, ChannelGrouping, Tensor, TreeValue};

/// Build a flat dictionary of `params` conv layers, keys `model.<i>.weight`.
fn synthetic_flat(params: usize, features: usize, channels: usize) -> TreeValue {
    let mut entries = Vec::with_capacity(params * 2);
    for i in 0..params {
        let count = features * channels * 3 * 3;
        let data: Vec<f64> = (0..count).map(|v| v as f64).collect();
        let weight = Tensor::new(vec![features, channels, 3, 3], data).unwrap();
        entries.push((format!("model.{i}.weight"), weight.to_tree()));
        entries.push((
            format!("model.{i}.bias"),
            TreeValue::Array(vec![TreeValue::Scalar(0.0); features]),
        ));
    }
    TreeValue::Map(entries)
}

fn bench_nest(c: &mut Criterion) {
    let flat = synthetic_flat(12, 16, 16);
    c.bench_function("unflatten_normalize_12_layers", |b| {
        b.iter(|| {
            let nested = unflatten(black_box(&flat), ".").unwrap();
            normalize(nested)
        })
    });
}

fn bench_repack(c: &mut Criterion) {
    let flat = synthetic_flat(12, 16, 16);
    let tree = normalize(unflatten(&flat, ".").unwrap());
    c.bench_function("repack_12_layers", |b| {
        b.iter(|| repack_tree(black_box(&tree), &ChannelGrouping::default()).unwrap())
    });
}

criterion_group!(benches, bench_nest, bench_repack);
criterion_main!(benches);
